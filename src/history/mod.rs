//! Navigation history contract for shared chart ranges.
//!
//! Every user-driven range change is pushed as a new back-navigable state and
//! the initial view of a group replaces the current state. States are plain
//! JSON objects `{ "id": <token>, "from": <min>, "to": <max> }` so they can
//! live in the same history stack as states owned by other page components.

mod memory;

pub use memory::MemoryHistory;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::TimeRange;
use crate::error::{ChartSyncError, ChartSyncResult};

/// Opaque token grouping viewports and the history entries they own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    pub fn new(token: impl Into<String>) -> ChartSyncResult<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(ChartSyncError::InvalidData(
                "identity token must not be empty".to_owned(),
            ));
        }
        Ok(Self(token))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdentityToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Persisted `(token, range)` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistoryState", into = "HistoryState")]
pub struct HistoryEntry {
    pub token: IdentityToken,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryState {
    id: String,
    from: f64,
    to: f64,
}

impl TryFrom<HistoryState> for HistoryEntry {
    type Error = ChartSyncError;

    fn try_from(state: HistoryState) -> Result<Self, Self::Error> {
        Ok(Self {
            token: IdentityToken::new(state.id)?,
            range: TimeRange::new(state.from, state.to)?,
        })
    }
}

impl From<HistoryEntry> for HistoryState {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            id: entry.token.0,
            from: entry.range.min(),
            to: entry.range.max(),
        }
    }
}

impl HistoryEntry {
    #[must_use]
    pub fn new(token: IdentityToken, range: TimeRange) -> Self {
        Self { token, range }
    }

    pub fn to_state(&self) -> ChartSyncResult<Value> {
        serde_json::to_value(self).map_err(|e| {
            ChartSyncError::InvalidData(format!("failed to serialize history entry: {e}"))
        })
    }

    /// Decodes a history state; anything that is not a well-formed chart
    /// entry yields `None`.
    #[must_use]
    pub fn from_state(state: &Value) -> Option<Self> {
        if state.is_null() {
            return None;
        }
        Self::deserialize(state).ok()
    }
}

/// State delivered when the user navigates back or forward.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationEvent {
    pub state: Value,
}

impl NavigationEvent {
    #[must_use]
    pub fn new(state: Value) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn entry(&self) -> Option<HistoryEntry> {
        HistoryEntry::from_state(&self.state)
    }
}

/// Write side of a navigation history.
pub trait NavigationHistory {
    /// Adds a new back-navigable state after the current one.
    fn push_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()>;

    /// Overwrites the current state without adding a back-stack position.
    fn replace_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()>;
}

/// Back/forward movement for histories that own their stack.
pub trait HistoryCursor {
    fn back(&mut self) -> Option<NavigationEvent>;
    fn forward(&mut self) -> Option<NavigationEvent>;
}
