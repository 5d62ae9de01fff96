//! Proximity camera: a full-grid view tinted around the avatar

use std::sync::Arc;

use crossterm::style::Color;

use crate::core::types::Position;
use crate::map::Snapshot;
use crate::render::colors::{ColorFilter, HIGHLIGHT, NEUTRAL};
use crate::render::Panel;

#[derive(Debug)]
pub struct ProximityCamera {
    target: char,
    range: f64,
    filter: Arc<ColorFilter>,
    panel: Arc<Panel>,
}

impl ProximityCamera {
    pub const SYMBOL: char = 'x';
    pub const DEFAULT_RANGE: f64 = 3.5;

    /// Camera following the agent `target`
    pub fn new(target: char, range: f64, filter: Arc<ColorFilter>, panel: Arc<Panel>) -> Self {
        Self {
            target,
            range,
            filter,
            panel,
        }
    }

    pub fn panel(&self) -> &Arc<Panel> {
        &self.panel
    }

    fn color_for(&self, glyph: char, distance: Option<f64>) -> Color {
        let near = distance.is_some_and(|d| d <= self.range);
        match (glyph == Self::SYMBOL, near) {
            (_, true) => HIGHLIGHT,
            (true, false) => self.filter.lookup(Self::SYMBOL),
            (false, false) => NEUTRAL,
        }
    }

    /// Redraw the whole grid onto the camera panel
    pub fn observe(&self, snapshot: &Snapshot) {
        let target = snapshot.position_of(self.target);
        let mut view = Vec::with_capacity((snapshot.width() + 1) * snapshot.height());

        for (y, row) in snapshot.rows().enumerate() {
            for (x, &glyph) in row.iter().enumerate() {
                let here = Position::new(x as i32, y as i32);
                let distance = target.map(|t| t.distance(&here));
                view.push((glyph, self.color_for(glyph, distance)));
            }
            view.push(('\n', NEUTRAL));
        }

        self.panel.write_cells(view);
    }
}
