//! Agents living on the grid

pub mod avatar;
pub mod obstacle;

pub use avatar::{Avatar, CollisionObserver};
pub use obstacle::Obstacle;

use crate::core::types::Position;

/// Anything the map can hold, identified by a unique symbol
pub trait Agent: Send + Sync {
    fn symbol(&self) -> char;

    /// Cell the agent occupies when installed
    fn origin(&self) -> Position;
}
