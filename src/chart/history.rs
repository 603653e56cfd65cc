//! Bounded undo history of chart snapshots.

use std::collections::VecDeque;

use super::{ChartState, IndexBuffer, PaletteStore};
use crate::models::DisplayParams;

/// Maximum number of undo steps kept per session
pub const HISTORY_LIMIT: usize = 20;

/// Deep copy of the undoable chart state
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    buffer: IndexBuffer,
    palette: PaletteStore,
    display: DisplayParams,
}

/// Snapshot stack; the oldest entry is evicted past the limit
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(limit.min(HISTORY_LIMIT) + 1),
            limit: limit.max(1),
        }
    }

    /// Record the current state. Skipped when no buffer exists yet.
    pub fn snapshot(&mut self, state: &ChartState) -> bool {
        let Some(buffer) = &state.buffer else {
            return false;
        };
        self.entries.push_back(HistoryEntry {
            buffer: buffer.clone(),
            palette: state.palette.clone(),
            display: state.display.clone(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        true
    }

    /// Restore the most recent snapshot. `false` when there is nothing to undo.
    pub fn undo(&mut self, state: &mut ChartState) -> bool {
        let Some(entry) = self.entries.pop_back() else {
            return false;
        };
        state.buffer = Some(entry.buffer);
        state.palette = entry.palette;
        state.display = entry.display;
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
