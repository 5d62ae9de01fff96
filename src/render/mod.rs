//! Terminal rendering: panels, the log board and the screen compositor
//!
//! Panels only ever draw through a [`RenderSink`], so the whole pipeline can
//! run against an in-memory canvas in tests.

pub mod colors;
pub mod log_board;
pub mod panel;
pub mod screen;

pub use colors::ColorFilter;
pub use log_board::LogBoard;
pub use panel::{Cell, Panel, PanelObserver};
pub use screen::Screen;

use std::io::{self, BufWriter, Stdout, Write};
use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};
use parking_lot::Mutex;

/// Output surface that can place one colored glyph at a time
pub trait RenderSink: Send {
    /// Draw `glyph` at screen cell (x, y), then restore the default colors
    fn put(&mut self, x: u16, y: u16, glyph: char, fg: Color, bg: Color) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;

    /// Sound the terminal bell
    fn bell(&mut self) -> io::Result<()>;
}

/// Writes to stdout through crossterm, batching commands until flush
pub struct TerminalSink {
    out: BufWriter<Stdout>,
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            out: BufWriter::new(io::stdout()),
        }
    }
}

impl RenderSink for TerminalSink {
    fn put(&mut self, x: u16, y: u16, glyph: char, fg: Color, bg: Color) -> io::Result<()> {
        queue!(
            self.out,
            MoveTo(x, y),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(glyph),
            ResetColor
        )
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn bell(&mut self) -> io::Result<()> {
        self.out.write_all(b"\x07")?;
        self.out.flush()
    }
}

/// What a [`MemorySink`] has seen so far
#[derive(Debug, Default)]
pub struct Canvas {
    pub cells: AHashMap<(u16, u16), (char, Color, Color)>,
    pub puts: usize,
    /// Time of every flush, one per rendered panel
    pub flushes: Vec<Instant>,
    pub bells: usize,
}

impl Canvas {
    pub fn glyph(&self, x: u16, y: u16) -> Option<char> {
        self.cells.get(&(x, y)).map(|&(g, _, _)| g)
    }

    /// Glyphs of one screen row between two columns
    pub fn text(&self, y: u16, from: u16, to: u16) -> String {
        (from..to)
            .map(|x| self.glyph(x, y).unwrap_or(' '))
            .collect()
    }
}

/// In-memory sink; clones share the same canvas
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    canvas: Arc<Mutex<Canvas>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_canvas<R>(&self, f: impl FnOnce(&Canvas) -> R) -> R {
        f(&self.canvas.lock())
    }

    pub fn flush_count(&self) -> usize {
        self.canvas.lock().flushes.len()
    }
}

impl RenderSink for MemorySink {
    fn put(&mut self, x: u16, y: u16, glyph: char, fg: Color, bg: Color) -> io::Result<()> {
        let mut canvas = self.canvas.lock();
        canvas.cells.insert((x, y), (glyph, fg, bg));
        canvas.puts += 1;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.canvas.lock().flushes.push(Instant::now());
        Ok(())
    }

    fn bell(&mut self) -> io::Result<()> {
        self.canvas.lock().bells += 1;
        Ok(())
    }
}
