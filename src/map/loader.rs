//! Load maps from plain-text files
//!
//! One line per row. `#` is a wall, a space is an empty cell and the avatar
//! symbol marks the avatar's start. Rows may be ragged.

use std::path::Path;

use crate::core::error::{Result, SimError};
use crate::map::grid::{glyphs, Map};

/// Parses map text, accepting only a fixed set of glyphs
pub struct MapLoader {
    allowed: Vec<char>,
    required: Vec<char>,
}

impl MapLoader {
    /// Loader for maps containing walls, empty cells and the given agents,
    /// each of which must appear exactly once
    pub fn new(agents: &[char]) -> Self {
        let mut allowed = vec![glyphs::WALL, glyphs::EMPTY];
        allowed.extend_from_slice(agents);
        Self {
            allowed,
            required: agents.to_vec(),
        }
    }

    pub fn load_from_file(&self, path: &Path) -> Result<Map> {
        let content = std::fs::read_to_string(path)?;
        self.load_from_str(&content)
    }

    pub fn load_from_str(&self, text: &str) -> Result<Map> {
        let rows: Vec<Vec<char>> = text
            .lines()
            .map(|line| line.trim_end_matches('\r').chars().collect())
            .collect();

        for (y, row) in rows.iter().enumerate() {
            if let Some((x, glyph)) = row
                .iter()
                .enumerate()
                .find(|(_, g)| !self.allowed.contains(g))
            {
                return Err(SimError::MapFormat(format!(
                    "unexpected glyph '{}' at row {}, column {}",
                    glyph, y, x
                )));
            }
        }

        let map = Map::from_rows(&rows)?;
        for &symbol in &self.required {
            if map.position_of(symbol).is_none() {
                return Err(SimError::MapFormat(format!(
                    "map has no '{}' start cell",
                    symbol
                )));
            }
        }

        Ok(map)
    }
}
