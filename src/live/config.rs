use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ChartSyncError, ChartSyncResult};

/// Gate consulted before a feeder starts and before every tick.
pub type RunningPredicate = Arc<dyn Fn() -> bool + Send + Sync>;

/// Live polling options a page passes per chart group.
#[derive(Clone, Default)]
pub struct LiveOptions {
    pub live: bool,
    /// `None` means always running once started.
    pub is_running: Option<RunningPredicate>,
}

impl LiveOptions {
    #[must_use]
    pub fn live() -> Self {
        Self {
            live: true,
            is_running: None,
        }
    }

    #[must_use]
    pub fn with_is_running(mut self, predicate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_running = Some(Arc::new(predicate));
        self
    }

    /// Evaluates the running predicate; absent means running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.is_running.as_ref().is_none_or(|predicate| predicate())
    }
}

impl fmt::Debug for LiveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveOptions")
            .field("live", &self.live)
            .field("is_running", &self.is_running.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

/// Timer settings of a live feeder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeederConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Upper bound for one tick's fetches; the coalesced redraw runs when it
    /// elapses even if some fetches are still outstanding.
    #[serde(default = "default_tick_timeout_ms")]
    pub tick_timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    3_000
}

fn default_tick_timeout_ms() -> u64 {
    2_500
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            tick_timeout_ms: default_tick_timeout_ms(),
        }
    }
}

impl FeederConfig {
    #[must_use]
    pub fn new(poll_interval_ms: u64, tick_timeout_ms: u64) -> Self {
        Self {
            poll_interval_ms,
            tick_timeout_ms,
        }
    }

    #[must_use]
    pub fn poll_interval(self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn tick_timeout(self) -> Duration {
        Duration::from_millis(self.tick_timeout_ms)
    }

    pub fn validate(self) -> ChartSyncResult<Self> {
        if self.poll_interval_ms == 0 {
            return Err(ChartSyncError::InvalidData(
                "poll interval must be > 0".to_owned(),
            ));
        }
        if self.tick_timeout_ms == 0 {
            return Err(ChartSyncError::InvalidData(
                "tick timeout must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }

    pub fn from_json_str(input: &str) -> ChartSyncResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartSyncError::InvalidData(format!("failed to parse feeder config: {e}"))
        })?;
        config.validate()
    }
}
