use serde_json::Value;
use tracing::trace;

use crate::error::ChartSyncResult;

use super::{HistoryCursor, HistoryEntry, NavigationEvent, NavigationHistory};

/// In-memory navigation stack with browser semantics.
///
/// Starts with a single `null` state for the initial page load. Pushing
/// discards every state ahead of the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryHistory {
    states: Vec<Value>,
    cursor: usize,
    push_count: usize,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: vec![Value::Null],
            cursor: 0,
            push_count: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of push operations performed over the lifetime of the stack.
    #[must_use]
    pub fn push_count(&self) -> usize {
        self.push_count
    }

    #[must_use]
    pub fn current(&self) -> &Value {
        &self.states[self.cursor]
    }

    #[must_use]
    pub fn current_entry(&self) -> Option<HistoryEntry> {
        HistoryEntry::from_state(self.current())
    }

    #[must_use]
    pub fn states(&self) -> &[Value] {
        &self.states
    }

    /// Pushes a state that is not a chart entry.
    pub fn push_state(&mut self, state: Value) {
        self.states.truncate(self.cursor + 1);
        self.states.push(state);
        self.cursor = self.states.len() - 1;
        self.push_count += 1;
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.cursor + 1 < self.states.len()
    }

    /// Moves one state back and returns the navigation event for it.
    pub fn back(&mut self) -> Option<NavigationEvent> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        trace!(cursor = self.cursor, "history back");
        Some(NavigationEvent::new(self.current().clone()))
    }

    /// Moves one state forward and returns the navigation event for it.
    pub fn forward(&mut self) -> Option<NavigationEvent> {
        if !self.can_go_forward() {
            return None;
        }
        self.cursor += 1;
        trace!(cursor = self.cursor, "history forward");
        Some(NavigationEvent::new(self.current().clone()))
    }
}

impl NavigationHistory for MemoryHistory {
    fn push_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()> {
        let state = entry.to_state()?;
        self.push_state(state);
        Ok(())
    }

    fn replace_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()> {
        self.states[self.cursor] = entry.to_state()?;
        Ok(())
    }
}

impl HistoryCursor for MemoryHistory {
    fn back(&mut self) -> Option<NavigationEvent> {
        MemoryHistory::back(self)
    }

    fn forward(&mut self) -> Option<NavigationEvent> {
        MemoryHistory::forward(self)
    }
}
