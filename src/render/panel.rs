//! Fixed-size buffer of colored glyphs with a dirty flag
//!
//! Writes replace the whole buffer and are clipped to the panel bounds.
//! Every mutation notifies the registered observers synchronously, on the
//! writing thread, after the buffer lock has been released.

use std::sync::Weak;

use crossterm::style::Color;
use parking_lot::{Mutex, RwLock};

use crate::core::error::Result;
use crate::core::types::Position;
use crate::render::RenderSink;

/// One glyph of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

pub trait PanelObserver: Send + Sync {
    fn panel_updated(&self, panel: &Panel);
}

#[derive(Debug)]
struct Buffer {
    cells: Vec<Cell>,
    dirty: bool,
}

pub struct Panel {
    height: usize,
    width: usize,
    origin: Position,
    background: Color,
    buffer: Mutex<Buffer>,
    observers: RwLock<Vec<Weak<dyn PanelObserver>>>,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("origin", &self.origin)
            .finish()
    }
}

impl Panel {
    pub fn new(height: usize, width: usize, origin: Position, background: Color) -> Self {
        Self {
            height,
            width,
            origin,
            background,
            buffer: Mutex::new(Buffer {
                cells: vec![Self::blank(background); height * width],
                dirty: false,
            }),
            observers: RwLock::new(Vec::new()),
        }
    }

    fn blank(background: Color) -> Cell {
        Cell {
            glyph: ' ',
            color: background,
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer.lock().dirty
    }

    /// Observers are held weakly so a panel never keeps its screen alive
    pub fn subscribe(&self, observer: Weak<dyn PanelObserver>) {
        self.observers.write().push(observer);
    }

    /// Replace the content with newline-delimited text in one color
    pub fn write(&self, text: &str, color: Color) {
        self.mutate(|buffer, panel| {
            for (row, line) in text.split('\n').take(panel.height).enumerate() {
                for (col, glyph) in line.chars().take(panel.width).enumerate() {
                    buffer.cells[row * panel.width + col] = Cell { glyph, color };
                }
            }
        });
    }

    /// Replace the content with a flat stream of colored glyphs; `'\n'`
    /// advances to the next row
    pub fn write_cells<I>(&self, cells: I)
    where
        I: IntoIterator<Item = (char, Color)>,
    {
        self.mutate(|buffer, panel| {
            let (mut row, mut col) = (0usize, 0usize);
            for (glyph, color) in cells {
                if glyph == '\n' {
                    row += 1;
                    col = 0;
                    continue;
                }
                if row < panel.height && col < panel.width {
                    buffer.cells[row * panel.width + col] = Cell { glyph, color };
                }
                col += 1;
            }
        });
    }

    pub fn clear(&self) {
        self.mutate(|_, _| {});
    }

    /// Project the buffer onto `sink` at the panel's screen offset
    pub fn render(&self, sink: &mut dyn RenderSink) -> Result<()> {
        let mut buffer = self.buffer.lock();
        for row in 0..self.height {
            for col in 0..self.width {
                let (Ok(x), Ok(y)) = (
                    u16::try_from(self.origin.x + col as i32),
                    u16::try_from(self.origin.y + row as i32),
                ) else {
                    continue;
                };
                let cell = buffer.cells[row * self.width + col];
                sink.put(x, y, cell.glyph, cell.color, self.background)?;
            }
        }
        sink.flush()?;
        buffer.dirty = false;
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.height && col < self.width {
            Some(self.buffer.lock().cells[row * self.width + col])
        } else {
            None
        }
    }

    /// Glyphs of one row, trailing blanks included
    pub fn row_text(&self, row: usize) -> String {
        if row >= self.height {
            return String::new();
        }
        let buffer = self.buffer.lock();
        buffer.cells[row * self.width..(row + 1) * self.width]
            .iter()
            .map(|c| c.glyph)
            .collect()
    }

    /// Clear, apply `fill`, mark dirty, then notify observers
    fn mutate(&self, fill: impl FnOnce(&mut Buffer, &Panel)) {
        {
            let mut buffer = self.buffer.lock();
            buffer.cells.fill(Self::blank(self.background));
            fill(&mut *buffer, self);
            buffer.dirty = true;
        }
        self.notify();
    }

    fn notify(&self) {
        let observers: Vec<_> = self
            .observers
            .read()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for observer in observers {
            observer.panel_updated(self);
        }
    }
}
