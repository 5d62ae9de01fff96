//! Panel showing a rolling message history per key, one column per key

use std::collections::VecDeque;
use std::sync::Arc;

use crossterm::style::Color;
use parking_lot::Mutex;

use crate::render::colors::NEUTRAL;
use crate::render::Panel;

#[derive(Debug)]
struct Column {
    key: String,
    entries: VecDeque<(String, Color)>,
}

/// Columns appear in the order their keys were first seen
pub struct LogBoard {
    panel: Arc<Panel>,
    column_width: usize,
    columns: Mutex<Vec<Column>>,
}

impl std::fmt::Debug for LogBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBoard")
            .field("panel", &self.panel)
            .field("column_width", &self.column_width)
            .finish()
    }
}

impl LogBoard {
    pub fn new(panel: Arc<Panel>, column_width: usize) -> Self {
        Self {
            panel,
            column_width,
            columns: Mutex::new(Vec::new()),
        }
    }

    pub fn panel(&self) -> &Arc<Panel> {
        &self.panel
    }

    /// Entries kept per key; the oldest is dropped once a key reaches this
    /// count plus one
    pub fn retention(&self) -> usize {
        self.panel.height() + 1
    }

    /// Append one entry under `key` and republish the board
    pub fn add(&self, key: &str, message: &str, color: Color) {
        let mut columns = self.columns.lock();
        let index = match columns.iter().position(|c| c.key == key) {
            Some(index) => index,
            None => {
                columns.push(Column {
                    key: key.to_string(),
                    entries: VecDeque::new(),
                });
                columns.len() - 1
            }
        };

        let entries = &mut columns[index].entries;
        entries.push_back((message.to_string(), color));
        while entries.len() > self.retention() {
            entries.pop_front();
        }

        self.publish_locked(&columns);
    }

    /// Redraw every column in one full-panel write
    pub fn publish(&self) {
        let columns = self.columns.lock();
        self.publish_locked(&columns);
    }

    /// Messages currently retained for `key`, oldest first
    pub fn entries(&self, key: &str) -> Vec<(String, Color)> {
        self.columns
            .lock()
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// The most recent entries that fit are shown; the oldest of them sits
    /// on the bottom row and newer ones stack upward
    fn publish_locked(&self, columns: &[Column]) {
        let height = self.panel.height();
        let mut content = Vec::with_capacity(height * (columns.len() * self.column_width + 1));

        for row in 0..height {
            let slot = height - 1 - row;
            for column in columns {
                let len = column.entries.len();
                let shown = len.min(height);
                let entry = if slot < shown {
                    column.entries.get(len - shown + slot)
                } else {
                    None
                };

                let (text, color) = match entry {
                    Some((message, color)) => (format!("| {} | {}", column.key, message), *color),
                    None => (String::new(), NEUTRAL),
                };
                content.extend(
                    text.chars()
                        .chain(std::iter::repeat(' '))
                        .take(self.column_width)
                        .map(|glyph| (glyph, color)),
                );
            }
            content.push(('\n', NEUTRAL));
        }

        self.panel.write_cells(content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Position;

    fn board(height: usize, width: usize, column_width: usize) -> LogBoard {
        let panel = Arc::new(Panel::new(height, width, Position::new(0, 0), Color::Black));
        LogBoard::new(panel, column_width)
    }

    #[test]
    fn test_entries_stack_upward_from_bottom() {
        let board = board(3, 40, 20);
        board.add("A", "first", Color::Red);
        board.add("A", "second", Color::Yellow);

        let panel = board.panel();
        assert_eq!(panel.row_text(2).trim(), "| A | first");
        assert_eq!(panel.row_text(1).trim(), "| A | second");
        assert_eq!(panel.row_text(0).trim(), "");
        assert_eq!(panel.cell(1, 0).unwrap().color, Color::Yellow);
    }

    #[test]
    fn test_full_column_shows_most_recent_window() {
        let board = board(2, 40, 20);
        for i in 0..3 {
            board.add("A", &format!("m{}", i), Color::Red);
        }
        assert_eq!(board.entries("A").len(), 3);

        let panel = board.panel();
        assert_eq!(panel.row_text(1).trim(), "| A | m1");
        assert_eq!(panel.row_text(0).trim(), "| A | m2");
    }

    #[test]
    fn test_columns_in_first_seen_order() {
        let board = board(2, 40, 10);
        board.add("B", "b1", Color::Red);
        board.add("A", "a1", Color::Red);

        let bottom = board.panel().row_text(1);
        assert_eq!(&bottom[..10], "| B | b1  ");
        assert_eq!(&bottom[10..20], "| A | a1  ");
    }

    #[test]
    fn test_long_messages_truncated_to_column() {
        let board = board(1, 20, 8);
        board.add("K", "a very long message", Color::Red);
        board.add("L", "x", Color::Red);
        let row = board.panel().row_text(0);
        assert_eq!(&row[..8], "| K | a ");
        assert_eq!(&row[8..16], "| L | x ");
    }

    #[test]
    fn test_retention_per_key_is_independent() {
        let board = board(3, 40, 20);
        for i in 0..10 {
            board.add("A", &format!("a{}", i), Color::Red);
        }
        board.add("B", "b0", Color::Red);

        let a = board.entries("A");
        assert_eq!(a.len(), board.retention());
        assert_eq!(a.first().unwrap().0, "a6");
        assert_eq!(a.last().unwrap().0, "a9");
        assert_eq!(board.entries("B").len(), 1);
        assert!(board.entries("C").is_empty());
    }

    #[test]
    fn test_publish_without_entries_blanks_panel() {
        let board = board(2, 10, 5);
        board.publish();
        assert!(board.panel().is_dirty());
        assert_eq!(board.panel().row_text(0), " ".repeat(10));
    }
}
