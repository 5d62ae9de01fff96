//! Color definitions for panels and sensor views

use ahash::AHashMap;
use crossterm::style::Color;

/// Background color shared by the map and log panels
pub const BACKGROUND: Color = Color::Black;

/// Default glyph color when nothing else applies
pub const NEUTRAL: Color = Color::White;

/// Cells the proximity camera considers close to the avatar
pub const HIGHLIGHT: Color = Color::Cyan;

/// Motion entries logged closer than the alarm threshold
pub const ALARM: Color = Color::Red;

/// Motion entries logged inside range but beyond the alarm threshold
pub const NOTICE: Color = Color::Yellow;

/// Per-symbol color overrides consulted by sensor views
#[derive(Debug, Clone, Default)]
pub struct ColorFilter {
    colors: AHashMap<char, Color>,
}

impl ColorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: char, color: Color) {
        self.colors.insert(symbol, color);
    }

    /// Color registered for `symbol`, or [`NEUTRAL`]
    pub fn lookup(&self, symbol: char) -> Color {
        self.colors.get(&symbol).copied().unwrap_or(NEUTRAL)
    }
}

/// Color of a motion entry at `distance`
pub fn closeness_color(distance: f64, close: f64) -> Color {
    if distance <= close {
        ALARM
    } else {
        NOTICE
    }
}
