//! The grid collaborator: shared state, snapshots, observers and loading

pub mod grid;
pub mod loader;

pub use grid::{glyphs, Map, MapObserver, Snapshot};
pub use loader::MapLoader;
