//! Grid Sentinel - terminal grid simulation
//!
//! An avatar moves among wandering obstacles and passive sensors on a
//! bounded grid while several panels render live views of the run.

pub mod core;
pub mod director;
pub mod entity;
pub mod identity;
pub mod map;
pub mod render;
pub mod sensors;
pub mod simulation;
