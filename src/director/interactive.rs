//! Keyboard-driven director

use std::collections::VecDeque;
use std::sync::Arc;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::Color;
use parking_lot::Mutex;

use crate::core::types::{MoveIntent, Position};
use crate::director::Director;
use crate::map::Snapshot;
use crate::render::Panel;

/// The keys the simulation cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Char(char),
    Other,
}

impl Key {
    fn to_intent(self) -> MoveIntent {
        match self {
            Key::Up => MoveIntent::Up,
            Key::Down => MoveIntent::Down,
            Key::Left => MoveIntent::Left,
            Key::Right => MoveIntent::Right,
            Key::Char('q') | Key::Char('Q') => MoveIntent::Quit,
            Key::Char(_) | Key::Other => MoveIntent::Stay,
        }
    }
}

/// Blocking source of key presses; `None` means input is gone for good
pub trait KeySource: Send + Sync {
    fn read_key(&self) -> Option<Key>;
}

/// Reads key presses from the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalKeys;

impl KeySource for TerminalKeys {
    fn read_key(&self) -> Option<Key> {
        loop {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    return Some(match key.code {
                        KeyCode::Up => Key::Up,
                        KeyCode::Down => Key::Down,
                        KeyCode::Left => Key::Left,
                        KeyCode::Right => Key::Right,
                        KeyCode::Char(c) => Key::Char(c),
                        _ => Key::Other,
                    });
                }
                Ok(_) => continue,
                Err(err) => {
                    tracing::error!(?err, "failed to read key");
                    return None;
                }
            }
        }
    }
}

/// Replays a fixed key sequence, then reports input exhausted
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    keys: Mutex<VecDeque<Key>>,
}

impl ScriptedKeys {
    pub fn new(keys: impl IntoIterator<Item = Key>) -> Self {
        Self {
            keys: Mutex::new(keys.into_iter().collect()),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn read_key(&self) -> Option<Key> {
        self.keys.lock().pop_front()
    }
}

/// Prompts on the menu panel, then blocks for one key press
pub struct InteractiveDirector<K: KeySource> {
    keys: K,
    menu: Option<Arc<Panel>>,
}

impl<K: KeySource> InteractiveDirector<K> {
    pub fn new(keys: K, menu: Option<Arc<Panel>>) -> Self {
        Self { keys, menu }
    }
}

impl<K: KeySource> Director for InteractiveDirector<K> {
    fn decide(&self, _at: Position, snapshot: &Snapshot) -> MoveIntent {
        if let Some(menu) = &self.menu {
            menu.write(
                &format!(
                    "Map of {} x {}\n    | press q to quit\n    | your move?",
                    snapshot.height(),
                    snapshot.width()
                ),
                Color::Yellow,
            );
        }

        // Lost input ends the run rather than spinning on empty reads
        self.keys.read_key().map_or(MoveIntent::Quit, Key::to_intent)
    }
}
