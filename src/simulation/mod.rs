//! Simulation runtime: obstacle workers, stop conditions and the
//! composition root

pub mod diagnostician;
pub mod obstacles;
pub mod orchestrator;

pub use diagnostician::{Alarm, Diagnostician, TerminationReason};
pub use obstacles::{symbol_pool, ObstacleMover, EXCLUDED_SYMBOLS};
pub use orchestrator::Simulation;
