//! Obstacle mover - one periodic worker thread per obstacle
//!
//! Every worker sleeps one interval, asks the shared director for a move
//! against the latest snapshot and applies it. Refused moves are dropped for
//! that tick. Once `terminate` returns no worker touches the map again.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, trace, warn};

use crate::core::error::{Result, SimError};
use crate::core::types::Position;
use crate::director::Director;
use crate::entity::{Agent, Obstacle};
use crate::map::Map;

/// Letters reserved for the avatar and the sensors, in either case
pub const EXCLUDED_SYMBOLS: [char; 8] = ['R', 'r', 'X', 'x', 'C', 'c', 'M', 'm'];

/// Symbols obstacles may be given
pub fn symbol_pool() -> Vec<char> {
    ('A'..='Z').filter(|c| !EXCLUDED_SYMBOLS.contains(c)).collect()
}

#[derive(Default)]
struct Workers {
    handles: Vec<JoinHandle<()>>,
    populated: bool,
}

pub struct ObstacleMover {
    map: Arc<Map>,
    obstacles: Vec<Obstacle>,
    director: Arc<dyn Director>,
    interval: Duration,
    terminated: Arc<AtomicBool>,
    /// Guards both the worker list and the populate latch
    workers: Mutex<Workers>,
}

impl std::fmt::Debug for ObstacleMover {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObstacleMover")
            .field("obstacles", &self.obstacles)
            .field("interval", &self.interval)
            .field("terminated", &self.terminated.load(Ordering::Relaxed))
            .finish()
    }
}

impl ObstacleMover {
    /// Reserve `count` distinct symbols and `count` distinct empty cells
    ///
    /// Nothing is placed on the map until [`populate`](Self::populate).
    pub fn new<R: Rng + ?Sized>(
        map: Arc<Map>,
        count: usize,
        interval: Duration,
        director: Arc<dyn Director>,
        rng: &mut R,
    ) -> Result<Self> {
        let pool = symbol_pool();
        if count > pool.len() {
            return Err(SimError::Configuration(format!(
                "{} obstacles requested but only {} symbols are available",
                count,
                pool.len()
            )));
        }

        let symbols: Vec<char> = pool.choose_multiple(rng, count).copied().collect();
        let snapshot = map.snapshot();
        let mut taken: Vec<Position> = Vec::with_capacity(count);
        let mut obstacles = Vec::with_capacity(count);
        for symbol in symbols {
            if snapshot.position_of(symbol).is_some() {
                return Err(SimError::Configuration(format!(
                    "symbol '{}' is already on the map",
                    symbol
                )));
            }
            let at = snapshot.random_vacancy(rng, &taken)?;
            taken.push(at);
            obstacles.push(Obstacle::new(symbol, at));
        }

        Ok(Self {
            map,
            obstacles,
            director,
            interval,
            terminated: Arc::new(AtomicBool::new(false)),
            workers: Mutex::new(Workers::default()),
        })
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn symbols(&self) -> Vec<char> {
        self.obstacles.iter().map(|o| o.symbol()).collect()
    }

    /// Cells the obstacles start on
    pub fn origins(&self) -> Vec<Position> {
        self.obstacles.iter().map(|o| o.origin()).collect()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Put every obstacle on the map and start one worker each
    ///
    /// A second call, or a call after `terminate`, does nothing.
    pub fn populate(&self) -> Result<()> {
        let mut workers = self.workers.lock();
        if workers.populated || self.is_terminated() {
            return Ok(());
        }

        let agents: Vec<&dyn Agent> = self.obstacles.iter().map(|o| o as &dyn Agent).collect();
        self.map.install_all(&agents)?;
        workers.populated = true;

        for obstacle in &self.obstacles {
            let worker = Worker {
                obstacle: obstacle.clone(),
                map: Arc::clone(&self.map),
                director: Arc::clone(&self.director),
                interval: self.interval,
                terminated: Arc::clone(&self.terminated),
            };
            let handle = thread::Builder::new()
                .name(format!("obstacle-{}", obstacle.symbol()))
                .spawn(move || worker.run())?;
            workers.handles.push(handle);
        }

        debug!(count = workers.handles.len(), "obstacle workers started");
        Ok(())
    }

    /// Stop every worker and wait for it to exit
    pub fn terminate(&self) {
        let mut workers = self.workers.lock();
        self.terminated.store(true, Ordering::Release);

        let handles = std::mem::take(&mut workers.handles);
        if handles.is_empty() {
            return;
        }
        let count = handles.len();
        for handle in handles {
            if handle.join().is_err() {
                warn!("obstacle worker panicked");
            }
        }
        debug!(count, "obstacle workers joined");
    }
}

impl Drop for ObstacleMover {
    fn drop(&mut self) {
        self.terminate();
    }
}

struct Worker {
    obstacle: Obstacle,
    map: Arc<Map>,
    director: Arc<dyn Director>,
    interval: Duration,
    terminated: Arc<AtomicBool>,
}

impl Worker {
    fn run(self) {
        let symbol = self.obstacle.symbol();
        loop {
            thread::sleep(self.interval);
            if self.terminated.load(Ordering::Acquire) {
                break;
            }

            let snapshot = self.map.snapshot();
            let Some(at) = snapshot.position_of(symbol) else {
                warn!(%symbol, "obstacle vanished from the map");
                break;
            };
            let intent = self.director.decide(at, &snapshot);
            match self.map.apply(&self.obstacle, intent) {
                Ok(()) => {}
                Err(err) if err.is_illegal_move() => trace!(%symbol, %err, "move refused"),
                Err(err) => {
                    warn!(%symbol, %err, "obstacle worker stopping");
                    break;
                }
            }
        }
    }
}
