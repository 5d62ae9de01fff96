//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Cell coordinates on the grid (x = column, y = row, origin top-left)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two cells
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// The neighbouring cell an intent points at (self for Stay/Quit)
    pub fn step(&self, intent: MoveIntent) -> Self {
        let (dx, dy) = intent.delta();
        Self::new(self.x + dx, self.y + dy)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single move decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveIntent {
    Up,
    Down,
    Left,
    Right,
    /// No movement this tick
    Stay,
    Quit,
}

impl MoveIntent {
    /// The four movement directions, in sampling order
    pub const DIRECTIONS: [MoveIntent; 4] = [
        MoveIntent::Up,
        MoveIntent::Down,
        MoveIntent::Left,
        MoveIntent::Right,
    ];

    pub fn delta(&self) -> (i32, i32) {
        match self {
            MoveIntent::Up => (0, -1),
            MoveIntent::Down => (0, 1),
            MoveIntent::Left => (-1, 0),
            MoveIntent::Right => (1, 0),
            MoveIntent::Stay | MoveIntent::Quit => (0, 0),
        }
    }

    /// Returns true if applying this intent would change a position
    pub fn is_move(&self) -> bool {
        self.delta() != (0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_euclidean() {
        let a = Position::new(0, 0);
        let b = Position::new(3, 4);
        assert!((a.distance(&b) - 5.0).abs() < f64::EPSILON);
        assert!((b.distance(&a) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_step_directions() {
        let origin = Position::new(5, 5);
        assert_eq!(origin.step(MoveIntent::Up), Position::new(5, 4));
        assert_eq!(origin.step(MoveIntent::Down), Position::new(5, 6));
        assert_eq!(origin.step(MoveIntent::Left), Position::new(4, 5));
        assert_eq!(origin.step(MoveIntent::Right), Position::new(6, 5));
        assert_eq!(origin.step(MoveIntent::Stay), origin);
        assert_eq!(origin.step(MoveIntent::Quit), origin);
    }

    #[test]
    fn test_only_directions_move() {
        for intent in MoveIntent::DIRECTIONS {
            assert!(intent.is_move());
        }
        assert!(!MoveIntent::Stay.is_move());
        assert!(!MoveIntent::Quit.is_move());
    }
}
