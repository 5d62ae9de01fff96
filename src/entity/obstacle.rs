use crate::core::types::Position;
use crate::entity::Agent;

/// An autonomously wandering agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Obstacle {
    symbol: char,
    origin: Position,
}

impl Obstacle {
    pub fn new(symbol: char, origin: Position) -> Self {
        Self { symbol, origin }
    }
}

impl Agent for Obstacle {
    fn symbol(&self) -> char {
        self.symbol
    }

    fn origin(&self) -> Position {
        self.origin
    }
}
