//! Snapshot-based undo/redo history.
//!
//! Callers snapshot the edited state *before* a change with [`EditHistory::record`].
//! Continuous gestures (dragging an interval edge) wrap their many updates in
//! a batch: the state is snapshotted once at [`EditHistory::begin_batch`] and
//! pushed as a single undo step at [`EditHistory::commit_batch`].

/// Default number of undo steps retained.
pub const DEFAULT_HISTORY_DEPTH: usize = 100;

/// Undo/redo stacks over whole-state snapshots.
#[derive(Debug, Clone)]
pub struct EditHistory<T> {
    undo: Vec<T>,
    redo: Vec<T>,
    pending: Option<T>,
    max_depth: usize,
}

impl<T: Clone + PartialEq> EditHistory<T> {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            pending: None,
            max_depth: max_depth.max(1),
        }
    }

    /// Push a pre-change snapshot. Ignored while a batch is open.
    pub fn record(&mut self, before: &T) {
        if self.pending.is_some() {
            return;
        }
        self.push_undo(before.clone());
    }

    /// Open a batch. Nested calls keep the first snapshot.
    pub fn begin_batch(&mut self, current: &T) {
        if self.pending.is_none() {
            self.pending = Some(current.clone());
        }
    }

    /// Close the batch; a batch that changed nothing leaves no undo step.
    pub fn commit_batch(&mut self, current: &T) {
        if let Some(before) = self.pending.take() {
            if &before != current {
                self.push_undo(before);
            }
        }
    }

    /// Whether a batch is currently open.
    pub fn in_batch(&self) -> bool {
        self.pending.is_some()
    }

    /// Step back. Returns the state to restore.
    pub fn undo(&mut self, current: &T) -> Option<T> {
        let previous = self.undo.pop()?;
        self.redo.push(current.clone());
        Some(previous)
    }

    /// Step forward. Returns the state to restore.
    pub fn redo(&mut self, current: &T) -> Option<T> {
        let next = self.redo.pop()?;
        self.undo.push(current.clone());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.pending = None;
    }

    fn push_undo(&mut self, snapshot: T) {
        self.undo.push(snapshot);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
        self.redo.clear();
    }
}

impl<T: Clone + PartialEq> Default for EditHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DEPTH)
    }
}
