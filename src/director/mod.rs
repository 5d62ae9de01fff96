//! Move-decision strategies
//!
//! A director looks at a frozen snapshot and returns one [`MoveIntent`].
//! Directors never mutate the map; applying the decision is the caller's job.

pub mod brownian;
pub mod interactive;

pub use brownian::BrownianDirector;
pub use interactive::{InteractiveDirector, Key, KeySource, ScriptedKeys, TerminalKeys};

use std::str::FromStr;
use std::sync::Arc;

use crate::core::error::SimError;
use crate::core::types::{MoveIntent, Position};
use crate::map::Snapshot;
use crate::render::Panel;

pub trait Director: Send + Sync {
    fn decide(&self, at: Position, snapshot: &Snapshot) -> MoveIntent;
}

/// Director kinds selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorKind {
    Unknown,
    Human,
    Brownian,
}

impl FromStr for DirectorKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unknown" => Ok(DirectorKind::Unknown),
            "human" => Ok(DirectorKind::Human),
            "brownian" => Ok(DirectorKind::Brownian),
            other => Err(SimError::Configuration(format!(
                "unknown director kind '{}' (expected unknown, human or brownian)",
                other
            ))),
        }
    }
}

impl DirectorKind {
    /// Build a director of this kind; the interactive one prompts on `menu`
    /// and the random ones draw from `seed` when given
    pub fn create(self, menu: Option<Arc<Panel>>, seed: Option<u64>) -> Arc<dyn Director> {
        match (self, seed) {
            (DirectorKind::Unknown | DirectorKind::Brownian, Some(seed)) => {
                Arc::new(BrownianDirector::with_seed(seed))
            }
            (DirectorKind::Unknown | DirectorKind::Brownian, None) => Arc::new(BrownianDirector::new()),
            (DirectorKind::Human, _) => Arc::new(InteractiveDirector::new(TerminalKeys, menu)),
        }
    }
}
