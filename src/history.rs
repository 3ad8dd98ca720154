//! Snapshot-based undo/redo history.

use crate::chain::Selection;
use crate::item::DocumentItem;

/// Default maximum number of undo snapshots to retain.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Value copy of a document: items (soft breaks excluded) and selection.
///
/// Snapshots never share structure with the live chain, so later edits
/// cannot reach into history.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub items: Vec<DocumentItem>,
    pub selection: Option<Selection>,
}

/// Undo/redo stacks with bounded memory usage.
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    /// Oldest snapshots are dropped past this depth.
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity,
        }
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record the state before a destructive edit. Clears the redo stack.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        self.redo_stack.clear();
        if self.undo_stack.len() > self.capacity {
            let excess = self.undo_stack.len() - self.capacity;
            self.undo_stack.drain(..excess);
        }
    }

    /// Step back: returns the state to restore and keeps `current` for redo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
