//! The player-controlled agent

use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::error::Result;
use crate::core::types::{MoveIntent, Position};
use crate::director::Director;
use crate::entity::Agent;
use crate::map::Map;

/// Notified whenever the avatar bumps into something
pub trait CollisionObserver: Send + Sync {
    fn collision_observed(&self, avatar: &Avatar);
}

pub struct Avatar {
    origin: Position,
    director: RwLock<Arc<dyn Director>>,
    observers: RwLock<Vec<Arc<dyn CollisionObserver>>>,
}

impl Avatar {
    pub const SYMBOL: char = 'R';

    pub fn new(origin: Position, director: Arc<dyn Director>) -> Self {
        Self {
            origin,
            director: RwLock::new(director),
            observers: RwLock::new(Vec::new()),
        }
    }

    /// Swap the decision strategy
    pub fn associate(&self, director: Arc<dyn Director>) {
        *self.director.write() = director;
    }

    pub fn subscribe(&self, observer: Arc<dyn CollisionObserver>) {
        self.observers.write().push(observer);
    }

    /// Current cell, as recorded by the map
    pub fn position(&self, map: &Map) -> Position {
        map.position_of(Self::SYMBOL).unwrap_or(self.origin)
    }

    /// Ask the director for the next move against a frozen snapshot
    pub fn act(&self, map: &Map) -> MoveIntent {
        let snapshot = map.snapshot();
        let at = snapshot.position_of(Self::SYMBOL).unwrap_or(self.origin);
        let director = self.director.read().clone();
        director.decide(at, &snapshot)
    }

    /// Apply a move; a refused move counts as a collision instead of failing
    pub fn advance(&self, map: &Map, intent: MoveIntent) -> Result<()> {
        match map.apply(self, intent) {
            Ok(()) => Ok(()),
            Err(e) if e.is_illegal_move() => {
                tracing::debug!(%e, "avatar collision");
                let observers = self.observers.read().clone();
                for observer in observers {
                    observer.collision_observed(self);
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Agent for Avatar {
    fn symbol(&self) -> char {
        Self::SYMBOL
    }

    fn origin(&self) -> Position {
        self.origin
    }
}
