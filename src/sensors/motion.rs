//! Motion detector: logs agents that moved within its radius

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::core::types::Position;
use crate::map::Snapshot;
use crate::render::colors::closeness_color;
use crate::render::LogBoard;

#[derive(Debug)]
pub struct MotionDetector {
    position: Position,
    tracked: Vec<char>,
    radius: f64,
    close: f64,
    board: Arc<LogBoard>,
    last_seen: Mutex<AHashMap<char, Position>>,
}

impl MotionDetector {
    pub const SYMBOL: char = 'm';

    /// `known` seeds the last-seen positions so agents that have not moved
    /// since construction stay quiet
    pub fn new(
        position: Position,
        tracked: Vec<char>,
        radius: f64,
        close: f64,
        board: Arc<LogBoard>,
        known: impl IntoIterator<Item = (char, Position)>,
    ) -> Self {
        let last_seen = known
            .into_iter()
            .filter(|(s, _)| tracked.contains(s))
            .collect();
        Self {
            position,
            tracked,
            radius,
            close,
            board,
            last_seen: Mutex::new(last_seen),
        }
    }

    pub fn board(&self) -> &Arc<LogBoard> {
        &self.board
    }

    pub fn observe(&self, snapshot: &Snapshot) {
        let mut last_seen = self.last_seen.lock();
        for &symbol in &self.tracked {
            let Some(now) = snapshot.position_of(symbol) else {
                continue;
            };
            let distance = now.distance(&self.position);
            if distance > self.radius || last_seen.get(&symbol) == Some(&now) {
                continue;
            }

            self.board.add(
                &symbol.to_string(),
                &format!("distance {:.2}", distance),
                closeness_color(distance, self.close),
            );
            last_seen.insert(symbol, now);
        }
    }
}
