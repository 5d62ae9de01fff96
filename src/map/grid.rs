//! Shared grid state with atomic snapshots and synchronous observers

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::core::error::{Result, SimError};
use crate::core::types::{MoveIntent, Position};
use crate::entity::Agent;

/// Map glyphs that are not agents
pub mod glyphs {
    pub const WALL: char = '#';
    pub const EMPTY: char = ' ';
}

/// Receives every map mutation, on the mutating thread, before the
/// mutating call returns
pub trait MapObserver: Send + Sync {
    fn movement_observed(&self, snapshot: &Snapshot);
}

/// Immutable copy of the grid at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    width: usize,
    height: usize,
    cells: Vec<char>,
    agents: BTreeMap<char, Position>,
}

impl Snapshot {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Glyph at a position, `None` outside the grid
    pub fn at(&self, pos: Position) -> Option<char> {
        self.index(pos).map(|i| self.cells[i])
    }

    pub fn is_inside(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Inside the grid and empty
    pub fn is_available(&self, pos: Position) -> bool {
        self.at(pos) == Some(glyphs::EMPTY)
    }

    pub fn is_on_boundary(&self, pos: Position) -> bool {
        self.is_inside(pos)
            && (pos.x == 0
                || pos.y == 0
                || pos.x as usize == self.width - 1
                || pos.y as usize == self.height - 1)
    }

    /// Current position of an agent symbol
    pub fn position_of(&self, symbol: char) -> Option<Position> {
        self.agents.get(&symbol).copied()
    }

    /// Every position holding `glyph`, row-major
    pub fn find(&self, glyph: char) -> Vec<Position> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == glyph)
            .map(|(i, _)| Position::new((i % self.width) as i32, (i / self.width) as i32))
            .collect()
    }

    /// Uniformly chosen empty cell not listed in `taken`
    pub fn random_vacancy<R: Rng + ?Sized>(&self, rng: &mut R, taken: &[Position]) -> Result<Position> {
        self.pick_vacancy(rng, taken, |_| true)
    }

    /// Like [`random_vacancy`](Self::random_vacancy) but never on the
    /// boundary, so a fixed agent cannot block a doorway
    pub fn random_inner_vacancy<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        taken: &[Position],
    ) -> Result<Position> {
        self.pick_vacancy(rng, taken, |p| !self.is_on_boundary(p))
    }

    fn pick_vacancy<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        taken: &[Position],
        accept: impl Fn(Position) -> bool,
    ) -> Result<Position> {
        self.find(glyphs::EMPTY)
            .into_iter()
            .filter(|p| !taken.contains(p) && accept(*p))
            .collect::<Vec<_>>()
            .choose(rng)
            .copied()
            .ok_or_else(|| SimError::Configuration("no empty cell left on the map".into()))
    }

    /// Every agent symbol with its position, in symbol order
    pub fn agents(&self) -> impl Iterator<Item = (char, Position)> + '_ {
        self.agents.iter().map(|(&s, &p)| (s, p))
    }

    /// Rows of glyphs, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[char]> {
        self.cells.chunks(self.width.max(1))
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 {
            return None;
        }
        let (x, y) = (pos.x as usize, pos.y as usize);
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    fn set(&mut self, pos: Position, glyph: char) {
        if let Some(i) = self.index(pos) {
            self.cells[i] = glyph;
        }
    }
}

/// The playing field shared by the avatar thread and every obstacle worker
///
/// All mutations go through the write lock and are checked against the
/// current state, so readers never observe a torn move. Observers see the
/// snapshots in mutation order: a mutation and its notification run under
/// the publish lock, which the next mutation must wait for.
///
/// Observers must not mutate the map from their callback.
pub struct Map {
    state: RwLock<Snapshot>,
    observers: RwLock<Vec<Arc<dyn MapObserver>>>,
    publish: Mutex<()>,
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("observers", &self.observers.read().len())
            .finish()
    }
}

impl Map {
    /// Build from rows of glyphs; rows shorter than the widest are padded
    /// with empty cells. Any glyph that is neither wall nor empty is taken
    /// to be an agent and indexed by symbol.
    pub fn from_rows(rows: &[Vec<char>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(SimError::MapFormat("map has no cells".into()));
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut agents = BTreeMap::new();
        for (y, row) in rows.iter().enumerate() {
            for x in 0..width {
                let glyph = row.get(x).copied().unwrap_or(glyphs::EMPTY);
                if glyph != glyphs::WALL && glyph != glyphs::EMPTY {
                    let pos = Position::new(x as i32, y as i32);
                    if agents.insert(glyph, pos).is_some() {
                        return Err(SimError::MapFormat(format!(
                            "agent '{}' appears more than once",
                            glyph
                        )));
                    }
                }
                cells.push(glyph);
            }
        }

        Ok(Self::from_snapshot(Snapshot {
            width,
            height,
            cells,
            agents,
        }))
    }

    /// An open grid with no walls
    pub fn open(width: usize, height: usize) -> Self {
        Self::from_snapshot(Snapshot {
            width,
            height,
            cells: vec![glyphs::EMPTY; width * height],
            agents: BTreeMap::new(),
        })
    }

    /// A walled room with a one-cell doorway in the middle of the bottom wall
    pub fn room(width: usize, height: usize) -> Self {
        let mut snapshot = Self::open(width, height).snapshot();
        for x in 0..width as i32 {
            snapshot.set(Position::new(x, 0), glyphs::WALL);
            snapshot.set(Position::new(x, height as i32 - 1), glyphs::WALL);
        }
        for y in 0..height as i32 {
            snapshot.set(Position::new(0, y), glyphs::WALL);
            snapshot.set(Position::new(width as i32 - 1, y), glyphs::WALL);
        }
        snapshot.set(
            Position::new(width as i32 / 2, height as i32 - 1),
            glyphs::EMPTY,
        );
        Self::from_snapshot(snapshot)
    }

    fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
            observers: RwLock::new(Vec::new()),
            publish: Mutex::new(()),
        }
    }

    pub fn width(&self) -> usize {
        self.state.read().width
    }

    pub fn height(&self) -> usize {
        self.state.read().height
    }

    /// Consistent copy of the whole grid
    pub fn snapshot(&self) -> Snapshot {
        self.state.read().clone()
    }

    pub fn is_available(&self, pos: Position) -> bool {
        self.state.read().is_available(pos)
    }

    pub fn is_inside(&self, pos: Position) -> bool {
        self.state.read().is_inside(pos)
    }

    pub fn is_on_boundary(&self, pos: Position) -> bool {
        self.state.read().is_on_boundary(pos)
    }

    pub fn find(&self, glyph: char) -> Vec<Position> {
        self.state.read().find(glyph)
    }

    pub fn position_of(&self, symbol: char) -> Option<Position> {
        self.state.read().position_of(symbol)
    }

    /// Register an observer for the lifetime of the map
    pub fn subscribe(&self, observer: Arc<dyn MapObserver>) {
        self.observers.write().push(observer);
    }

    /// Place an agent on its origin cell, which must be empty
    pub fn install(&self, agent: &dyn Agent) -> Result<()> {
        let _publish = self.publish.lock();
        let snapshot = {
            let mut state = self.state.write();
            Self::place(&mut state, agent.symbol(), agent.origin())?;
            state.clone()
        };
        self.notify(&snapshot);
        Ok(())
    }

    /// Place several agents, notifying observers once
    pub fn install_all(&self, agents: &[&dyn Agent]) -> Result<()> {
        let _publish = self.publish.lock();
        let snapshot = {
            let mut state = self.state.write();
            for agent in agents {
                Self::place(&mut state, agent.symbol(), agent.origin())?;
            }
            state.clone()
        };
        self.notify(&snapshot);
        Ok(())
    }

    /// Move an agent one cell in the direction of `intent`
    ///
    /// Stay and Quit leave the grid untouched and notify nobody. A target
    /// outside the grid or not empty yields `IllegalMove`.
    pub fn apply(&self, agent: &dyn Agent, intent: MoveIntent) -> Result<()> {
        if !intent.is_move() {
            return Ok(());
        }

        let symbol = agent.symbol();
        let _publish = self.publish.lock();
        let snapshot = {
            let mut state = self.state.write();
            let from = state
                .position_of(symbol)
                .ok_or(SimError::UnknownAgent(symbol))?;
            let target = from.step(intent);
            if !state.is_available(target) {
                return Err(SimError::IllegalMove { symbol, target });
            }
            state.set(from, glyphs::EMPTY);
            state.set(target, symbol);
            state.agents.insert(symbol, target);
            state.clone()
        };
        self.notify(&snapshot);
        Ok(())
    }

    fn place(state: &mut Snapshot, symbol: char, at: Position) -> Result<()> {
        if state.agents.contains_key(&symbol) {
            return Err(SimError::Configuration(format!(
                "agent '{}' is already on the map",
                symbol
            )));
        }
        if !state.is_available(at) {
            return Err(SimError::IllegalMove { symbol, target: at });
        }
        state.set(at, symbol);
        state.agents.insert(symbol, at);
        Ok(())
    }

    fn notify(&self, snapshot: &Snapshot) {
        // Clone the list so observers may subscribe others without deadlocking
        let observers: Vec<_> = self.observers.read().iter().cloned().collect();
        for observer in observers {
            observer.movement_observed(snapshot);
        }
    }
}
