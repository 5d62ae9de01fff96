//! Screen compositor: one background thread that periodically renders every
//! panel through a shared sink

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use crate::map::{MapObserver, Snapshot};
use crate::render::{Panel, PanelObserver, RenderSink};
use crate::simulation::Alarm;

struct Shared {
    panels: Vec<Arc<Panel>>,
    /// The render mutex; whoever holds it owns the output surface
    sink: Mutex<Box<dyn RenderSink>>,
    running: AtomicBool,
    interval: Duration,
}

impl Shared {
    fn refresh(&self) {
        for panel in &self.panels {
            let mut sink = self.sink.lock();
            if let Err(err) = panel.render(sink.as_mut()) {
                tracing::warn!(%err, "panel render failed");
            }
        }
    }

    fn run(&self) {
        while self.running.load(Ordering::Acquire) {
            self.refresh();
            thread::sleep(self.interval);
        }
    }
}

pub struct Screen {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    /// Set by `stop`; activity triggers no longer restart the loop
    halted: AtomicBool,
}

impl Screen {
    pub fn new(panels: Vec<Arc<Panel>>, sink: Box<dyn RenderSink>, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                panels,
                sink: Mutex::new(sink),
                running: AtomicBool::new(false),
                interval,
            }),
            worker: Mutex::new(None),
            halted: AtomicBool::new(false),
        }
    }

    /// Build a screen and register it as an observer of each of its panels
    pub fn attach(panels: Vec<Arc<Panel>>, sink: Box<dyn RenderSink>, interval: Duration) -> Arc<Self> {
        let screen = Arc::new(Self::new(panels, sink, interval));
        let observer: Arc<dyn PanelObserver> = screen.clone();
        for panel in &screen.shared.panels {
            panel.subscribe(Arc::downgrade(&observer));
        }
        screen
    }

    pub fn panels(&self) -> &[Arc<Panel>] {
        &self.shared.panels
    }

    /// Sum of every panel's extent; panels are placed by their own origins
    pub fn canvas_size(&self) -> (usize, usize) {
        self.shared
            .panels
            .iter()
            .fold((0, 0), |(w, h), p| (w + p.width(), h + p.height()))
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Spawn the refresh thread unless it is already running
    pub fn start(&self) {
        self.launch(false);
    }

    fn launch(&self, lazy: bool) {
        let mut worker = self.worker.lock();
        if lazy && self.halted.load(Ordering::Acquire) {
            return;
        }
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return;
        }
        self.halted.store(false, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("screen-refresh".into())
            .spawn(move || shared.run());
        match spawned {
            Ok(handle) => {
                tracing::debug!(panels = self.shared.panels.len(), "screen refresh started");
                *worker = Some(handle);
            }
            Err(err) => {
                tracing::error!(%err, "failed to spawn screen refresh thread");
                self.shared.running.store(false, Ordering::Release);
            }
        }
    }

    /// Render every panel once on the calling thread
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    /// Stop the refresh thread and wait for it; no render is in flight once
    /// this returns
    pub fn stop(&self) {
        let mut worker = self.worker.lock();
        self.halted.store(true, Ordering::Release);
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                tracing::error!("screen refresh thread panicked");
            }
            tracing::debug!("screen refresh stopped");
        }
    }

    /// Ring the bell on the shared sink, between panel renders
    pub fn bell(&self) {
        if let Err(err) = self.shared.sink.lock().bell() {
            tracing::warn!(%err, "bell failed");
        }
    }

    /// Lazy start on first activity; ignored once stopped
    fn wake(&self) {
        if !self.is_running() {
            self.launch(true);
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PanelObserver for Screen {
    fn panel_updated(&self, _panel: &Panel) {
        self.wake();
    }
}

impl Alarm for Screen {
    fn sound(&self) {
        self.bell();
    }
}

impl MapObserver for Screen {
    fn movement_observed(&self, _snapshot: &Snapshot) {
        self.wake();
    }
}
