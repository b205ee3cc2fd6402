use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{RangePreset, TimeRange};
use crate::error::{ChartSyncError, ChartSyncResult};
use crate::history::{HistoryEntry, IdentityToken, NavigationEvent, NavigationHistory};

use super::{ChartView, SuppressionGate};

/// Result of one range-change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeChangeOutcome {
    /// Recorded in history and applied to `propagated` other viewports.
    Broadcast { propagated: usize },
    /// Echo of a synchronization step; nothing recorded or propagated.
    Suppressed,
}

/// Counters describing what a controller has done so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncStats {
    pub history_pushes: usize,
    pub suppressed_echoes: usize,
    pub navigations_applied: usize,
    pub redraw_passes: usize,
}

/// Keeps every viewport of one group on the same visible time range.
///
/// User-driven changes are pushed to navigation history and copied to the
/// other members; changes caused by the copy itself, by history restores or by
/// coalesced redraws are recognized as echoes and dropped.
#[derive(Debug)]
pub struct ViewportSyncController<V: ChartView> {
    token: IdentityToken,
    viewports: Vec<V>,
    gate: SuppressionGate,
    min_range_ms: f64,
    stats: SyncStats,
}

impl<V: ChartView> ViewportSyncController<V> {
    /// Creates a controller over a fixed, non-empty set of viewports.
    pub fn new(token: IdentityToken, viewports: Vec<V>) -> ChartSyncResult<Self> {
        if viewports.is_empty() {
            return Err(ChartSyncError::InvalidData(format!(
                "chart group `{token}` needs at least one viewport"
            )));
        }
        Ok(Self {
            token,
            viewports,
            gate: SuppressionGate::default(),
            min_range_ms: 1.0,
            stats: SyncStats::default(),
        })
    }

    /// Group-wide floor for the narrowest zoom window, in milliseconds.
    ///
    /// Viewports configured with a larger minimum still win.
    pub fn with_min_range_ms(mut self, min_range_ms: f64) -> ChartSyncResult<Self> {
        if !min_range_ms.is_finite() || min_range_ms < 0.0 {
            return Err(ChartSyncError::InvalidData(
                "min range must be finite and >= 0".to_owned(),
            ));
        }
        self.min_range_ms = min_range_ms;
        Ok(self)
    }

    #[must_use]
    pub fn token(&self) -> &IdentityToken {
        &self.token
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    #[must_use]
    pub fn viewports(&self) -> &[V] {
        &self.viewports
    }

    pub fn viewport(&self, index: usize) -> ChartSyncResult<&V> {
        self.check_index(index)?;
        Ok(&self.viewports[index])
    }

    /// Mutable access for data setup; range changes made here bypass sync.
    pub fn viewport_mut(&mut self, index: usize) -> ChartSyncResult<&mut V> {
        self.check_index(index)?;
        Ok(&mut self.viewports[index])
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.gate.is_engaged()
    }

    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Shared range, read from the first viewport.
    #[must_use]
    pub fn shared_range(&self) -> Option<TimeRange> {
        self.viewports.first().and_then(ChartView::visible_range)
    }

    /// Records the initial view as the current history entry.
    ///
    /// Uses replace, never push, so the initial view is the base of the
    /// navigation stack. Returns `false` when the first viewport has no time
    /// axis; history is left untouched in that case.
    pub fn initialize<H: NavigationHistory>(&mut self, history: &mut H) -> ChartSyncResult<bool> {
        let Some(range) = self.shared_range() else {
            warn!(token = %self.token, "first viewport has no time axis; skipping history init");
            return Ok(false);
        };
        history.replace_entry(&HistoryEntry::new(self.token.clone(), range))?;
        debug!(
            token = %self.token,
            min = range.min(),
            max = range.max(),
            "history initialized"
        );
        Ok(true)
    }

    /// Handles a range-change notification from viewport `origin`.
    ///
    /// Outside of a synchronization step the change is pushed to history and
    /// applied to every other viewport; inside one it is an echo and ignored.
    pub fn on_range_changed<H: NavigationHistory>(
        &mut self,
        origin: usize,
        new_range: TimeRange,
        history: &mut H,
    ) -> ChartSyncResult<RangeChangeOutcome> {
        self.check_index(origin)?;
        if self.gate.is_engaged() {
            self.stats.suppressed_echoes += 1;
            trace!(token = %self.token, origin, "suppressed range echo");
            return Ok(RangeChangeOutcome::Suppressed);
        }

        history.push_entry(&HistoryEntry::new(self.token.clone(), new_range))?;
        self.stats.history_pushes += 1;

        let propagated = self.apply_range_suppressed(new_range, Some(origin), history)?;
        debug!(
            token = %self.token,
            origin,
            min = new_range.min(),
            max = new_range.max(),
            propagated,
            "range broadcast"
        );
        Ok(RangeChangeOutcome::Broadcast { propagated })
    }

    /// Restores a range from back/forward navigation.
    ///
    /// Returns `true` when the event carried an entry for this group.
    /// Entries of other groups and foreign or malformed states are ignored.
    pub fn on_history_navigated(&mut self, event: &NavigationEvent) -> ChartSyncResult<bool> {
        let Some(entry) = event.entry() else {
            trace!(token = %self.token, "ignoring non-chart history state");
            return Ok(false);
        };
        if entry.token != self.token {
            return Ok(false);
        }

        let applied = self.apply_range_suppressed(entry.range, None, &mut EchoOnlyHistory)?;
        self.stats.navigations_applied += 1;
        debug!(
            token = %self.token,
            min = entry.range.min(),
            max = entry.range.max(),
            applied,
            "range restored from history"
        );
        Ok(true)
    }

    /// User zoom or pan on viewport `origin`.
    ///
    /// The range is widened to the group's minimum span (the largest minimum
    /// of the group and its viewports), applied to `origin`, then handled as a
    /// range-change notification from that viewport.
    pub fn user_set_range<H: NavigationHistory>(
        &mut self,
        origin: usize,
        range: TimeRange,
        history: &mut H,
    ) -> ChartSyncResult<RangeChangeOutcome> {
        self.check_index(origin)?;
        let range = range.widened_to(self.effective_min_range_ms());
        self.viewports[origin].set_visible_range(range)?;
        self.on_range_changed(origin, range, history)
    }

    /// Range selector button pressed on viewport `origin`.
    pub fn select_preset<H: NavigationHistory>(
        &mut self,
        origin: usize,
        preset: RangePreset,
        history: &mut H,
    ) -> ChartSyncResult<RangeChangeOutcome> {
        self.check_index(origin)?;
        let full = self.viewports[origin]
            .full_range()
            .ok_or(ChartSyncError::MissingTimeAxis)?;
        self.user_set_range(origin, preset.resolve(full), history)
    }

    /// Redraws every viewport once with echo suppression engaged.
    ///
    /// Range moves caused by the redraw (a window following live data) are
    /// routed as notifications and therefore never reach history.
    pub fn redraw_suppressed(&mut self) -> ChartSyncResult<()> {
        self.suppressed(|this| {
            for index in 0..this.viewports.len() {
                if let Some(moved) = this.viewports[index].redraw()? {
                    this.on_range_changed(index, moved, &mut EchoOnlyHistory)?;
                }
            }
            Ok(())
        })?;
        self.stats.redraw_passes += 1;
        Ok(())
    }

    /// Applies `range` to every viewport except `skip` and suppresses the
    /// notifications those programmatic changes emit.
    ///
    /// Returns how many viewports changed.
    fn apply_range_suppressed<H: NavigationHistory>(
        &mut self,
        range: TimeRange,
        skip: Option<usize>,
        history: &mut H,
    ) -> ChartSyncResult<usize> {
        self.suppressed(|this| {
            let mut changed = 0;
            for index in 0..this.viewports.len() {
                if Some(index) == skip {
                    continue;
                }
                match this.viewports[index].set_visible_range(range) {
                    Ok(true) => {
                        changed += 1;
                        this.on_range_changed(index, range, history)?;
                    }
                    Ok(false) => {}
                    Err(ChartSyncError::MissingTimeAxis) => {
                        warn!(token = %this.token, index, "viewport has no time axis; skipping");
                    }
                    Err(err) => return Err(err),
                }
            }
            Ok(changed)
        })
    }

    fn suppressed<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> ChartSyncResult<T>,
    ) -> ChartSyncResult<T> {
        let previously_engaged = self.gate.engage();
        let out = f(self);
        self.gate.restore(previously_engaged);
        out
    }

    fn effective_min_range_ms(&self) -> f64 {
        self.viewports
            .iter()
            .map(ChartView::min_range_ms)
            .fold(self.min_range_ms, f64::max)
    }

    fn check_index(&self, index: usize) -> ChartSyncResult<()> {
        if index >= self.viewports.len() {
            return Err(ChartSyncError::UnknownViewport {
                token: self.token.to_string(),
                index,
                len: self.viewports.len(),
            });
        }
        Ok(())
    }
}

/// History sink for paths that only ever produce suppressed echoes.
///
/// Any write reaching it means an echo escaped the gate.
struct EchoOnlyHistory;

impl NavigationHistory for EchoOnlyHistory {
    fn push_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()> {
        Err(ChartSyncError::InvalidData(format!(
            "history push for `{}` attempted while echoes are suppressed",
            entry.token
        )))
    }

    fn replace_entry(&mut self, entry: &HistoryEntry) -> ChartSyncResult<()> {
        Err(ChartSyncError::InvalidData(format!(
            "history replace for `{}` attempted while echoes are suppressed",
            entry.token
        )))
    }
}
