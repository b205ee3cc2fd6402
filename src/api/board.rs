use std::sync::{Arc, Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{RangePreset, TimeRange};
use crate::error::{ChartSyncError, ChartSyncResult};
use crate::history::{HistoryCursor, IdentityToken, NavigationEvent, NavigationHistory};

use super::{ChartView, RangeChangeOutcome, ViewportSyncController};

/// Handle to a group shared between its board and a live feeder.
pub type SharedGroup<V> = Arc<Mutex<ViewportSyncController<V>>>;

/// Locks a shared group, mapping poisoning to [`ChartSyncError::LockPoisoned`].
pub fn lock_group<V: ChartView>(
    group: &SharedGroup<V>,
) -> ChartSyncResult<MutexGuard<'_, ViewportSyncController<V>>> {
    group.lock().map_err(|_| ChartSyncError::LockPoisoned)
}

/// Owner of every chart group on a page and of the navigation history they
/// share.
///
/// Groups are registered explicitly and routed by identity token; there is no
/// page-global registry.
#[derive(Debug)]
pub struct ChartBoard<V: ChartView, H: NavigationHistory> {
    history: H,
    groups: IndexMap<IdentityToken, SharedGroup<V>>,
}

impl<V: ChartView, H: NavigationHistory> ChartBoard<V, H> {
    #[must_use]
    pub fn new(history: H) -> Self {
        Self {
            history,
            groups: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut H {
        &mut self.history
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &IdentityToken> {
        self.groups.keys()
    }

    /// Registers a group and records its initial view in history.
    ///
    /// Returns the shared handle, e.g. for a live feeder.
    pub fn add_group(
        &mut self,
        mut controller: ViewportSyncController<V>,
    ) -> ChartSyncResult<SharedGroup<V>> {
        let token = controller.token().clone();
        if self.groups.contains_key(&token) {
            return Err(ChartSyncError::DuplicateGroup(token.to_string()));
        }

        controller.initialize(&mut self.history)?;
        let group = Arc::new(Mutex::new(controller));
        self.groups.insert(token.clone(), Arc::clone(&group));
        debug!(token = %token, groups = self.groups.len(), "chart group registered");
        Ok(group)
    }

    pub fn group(&self, token: &IdentityToken) -> ChartSyncResult<&SharedGroup<V>> {
        self.groups
            .get(token)
            .ok_or_else(|| ChartSyncError::UnknownGroup(token.to_string()))
    }

    /// Visible range currently shared by the group.
    pub fn shared_range(&self, token: &IdentityToken) -> ChartSyncResult<Option<TimeRange>> {
        Ok(lock_group(self.group(token)?)?.shared_range())
    }

    pub fn user_set_range(
        &mut self,
        token: &IdentityToken,
        origin: usize,
        range: TimeRange,
    ) -> ChartSyncResult<RangeChangeOutcome> {
        let Self { history, groups } = self;
        let group = groups
            .get(token)
            .ok_or_else(|| ChartSyncError::UnknownGroup(token.to_string()))?;
        lock_group(group)?.user_set_range(origin, range, history)
    }

    pub fn select_preset(
        &mut self,
        token: &IdentityToken,
        origin: usize,
        preset: RangePreset,
    ) -> ChartSyncResult<RangeChangeOutcome> {
        let Self { history, groups } = self;
        let group = groups
            .get(token)
            .ok_or_else(|| ChartSyncError::UnknownGroup(token.to_string()))?;
        lock_group(group)?.select_preset(origin, preset, history)
    }

    /// Delivers a navigation event to every group.
    ///
    /// Returns the token of the group that applied it, if any.
    pub fn dispatch_navigation(
        &self,
        event: &NavigationEvent,
    ) -> ChartSyncResult<Option<IdentityToken>> {
        let mut applied = None;
        for (token, group) in &self.groups {
            if lock_group(group)?.on_history_navigated(event)? {
                applied = Some(token.clone());
            }
        }
        trace!(applied = ?applied, "navigation dispatched");
        Ok(applied)
    }
}

/// What a back/forward step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Already at the end of history in that direction.
    EndOfHistory,
    /// The state reached belongs to no registered group.
    Unclaimed,
    /// The group with this token restored its range.
    Applied(IdentityToken),
}

impl<V: ChartView, H: NavigationHistory + HistoryCursor> ChartBoard<V, H> {
    /// Steps history back and restores the range of the group it belongs to.
    pub fn navigate_back(&mut self) -> ChartSyncResult<NavigationOutcome> {
        let event = self.history.back();
        self.route_step(event)
    }

    /// Steps history forward and restores the range of the group it belongs to.
    pub fn navigate_forward(&mut self) -> ChartSyncResult<NavigationOutcome> {
        let event = self.history.forward();
        self.route_step(event)
    }

    fn route_step(&self, event: Option<NavigationEvent>) -> ChartSyncResult<NavigationOutcome> {
        let Some(event) = event else {
            return Ok(NavigationOutcome::EndOfHistory);
        };
        Ok(match self.dispatch_navigation(&event)? {
            Some(token) => NavigationOutcome::Applied(token),
            None => NavigationOutcome::Unclaimed,
        })
    }
}
