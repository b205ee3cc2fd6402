use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, timeout};
use tracing::{debug, trace, warn};

use crate::api::{ChartView, ViewportSyncController};
use crate::core::DataPoint;
use crate::error::{ChartSyncError, ChartSyncResult};

use super::{FeederConfig, LiveOptions, PointSource, RunningPredicate};

/// Position of a series inside a chart group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesSlot {
    pub viewport: usize,
    pub series: usize,
}

/// One incremental fetch planned for a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub slot: SeriesSlot,
    pub url: String,
    /// Timestamp of the newest point the series holds.
    pub from: Option<f64>,
}

pub type FetchPlan = SmallVec<[FetchRequest; 4]>;

/// Chart state a feeder writes into.
pub trait LiveTarget {
    /// One request per line series with a source URL.
    fn plan_fetches(&self) -> FetchPlan;

    /// Appends fetched samples without redrawing; returns how many were kept.
    fn apply_points(&mut self, slot: SeriesSlot, points: &[DataPoint]) -> ChartSyncResult<usize>;

    /// Single redraw closing a tick; must not record history.
    fn coalesced_redraw(&mut self) -> ChartSyncResult<()>;
}

impl<V: ChartView> LiveTarget for ViewportSyncController<V> {
    fn plan_fetches(&self) -> FetchPlan {
        self.viewports()
            .iter()
            .enumerate()
            .flat_map(|(viewport, view)| {
                view.series()
                    .iter()
                    .enumerate()
                    .filter(|(_, series)| series.is_pollable())
                    .filter_map(move |(series, line)| {
                        line.url.as_ref().map(|url| FetchRequest {
                            slot: SeriesSlot { viewport, series },
                            url: url.clone(),
                            from: line.last_time(),
                        })
                    })
            })
            .collect()
    }

    fn apply_points(&mut self, slot: SeriesSlot, points: &[DataPoint]) -> ChartSyncResult<usize> {
        let view = self.viewport_mut(slot.viewport)?;
        let mut kept = 0;
        for point in points {
            if view.append_point(slot.series, *point)? {
                kept += 1;
            }
        }
        Ok(kept)
    }

    fn coalesced_redraw(&mut self) -> ChartSyncResult<()> {
        self.redraw_suppressed()
    }
}

/// Summary of one polling tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub issued: usize,
    pub completed: usize,
    pub failed: usize,
    pub appended: usize,
    /// The tick deadline elapsed before every fetch settled.
    pub timed_out: bool,
}

/// Why a feeder task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeederStop {
    /// The running predicate returned `false` at the start of a tick.
    PredicateFalse,
    /// The shared chart state became unusable.
    TargetPoisoned,
}

/// Polls new trailing points for every line series of a live chart group.
#[derive(Debug)]
pub struct LivePointFeeder<S: PointSource> {
    source: S,
    config: FeederConfig,
    ticks: u64,
}

impl<S: PointSource + 'static> LivePointFeeder<S> {
    pub fn new(source: S, config: FeederConfig) -> ChartSyncResult<Self> {
        Ok(Self {
            source,
            config: config.validate()?,
            ticks: 0,
        })
    }

    #[must_use]
    pub fn config(&self) -> FeederConfig {
        self.config
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Spawns the polling task on the current tokio runtime.
    ///
    /// Returns `Ok(None)` without spawning when the group is not live or the
    /// running predicate is already false.
    pub fn start<T>(
        target: Arc<Mutex<T>>,
        options: LiveOptions,
        config: FeederConfig,
        source: S,
    ) -> ChartSyncResult<Option<JoinHandle<FeederStop>>>
    where
        T: LiveTarget + Send + 'static,
    {
        if !options.live {
            trace!("group is not live; feeder not started");
            return Ok(None);
        }
        if !options.is_running() {
            debug!("running predicate is false; feeder not started");
            return Ok(None);
        }

        let feeder = Self::new(source, config)?;
        debug!(
            poll_interval_ms = config.poll_interval_ms,
            tick_timeout_ms = config.tick_timeout_ms,
            "live feeder started"
        );
        Ok(Some(tokio::spawn(feeder.run(target, options.is_running))))
    }

    /// Ticks every poll interval until the running predicate turns false.
    ///
    /// The first tick fires one interval after the call.
    pub async fn run<T>(
        mut self,
        target: Arc<Mutex<T>>,
        is_running: Option<RunningPredicate>,
    ) -> FeederStop
    where
        T: LiveTarget + Send + 'static,
    {
        let mut timer = interval(self.config.poll_interval());
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        timer.tick().await;

        loop {
            timer.tick().await;
            if is_running.as_ref().is_some_and(|predicate| !predicate()) {
                debug!(ticks = self.ticks, "running predicate turned false; feeder stopped");
                return FeederStop::PredicateFalse;
            }

            match self.tick(&*target).await {
                Ok(report) => trace!(?report, "tick complete"),
                Err(ChartSyncError::LockPoisoned) => {
                    warn!(ticks = self.ticks, "chart state poisoned; feeder stopped");
                    return FeederStop::TargetPoisoned;
                }
                Err(err) => warn!(error = %err, "live tick failed"),
            }
        }
    }

    /// Runs one polling tick: plan, fetch concurrently, append, redraw once.
    ///
    /// The chart lock is held only while planning and while applying, never
    /// while fetches are in flight.
    pub async fn tick<T: LiveTarget>(&mut self, target: &Mutex<T>) -> ChartSyncResult<TickReport> {
        self.ticks += 1;
        let plan = lock_target(target)?.plan_fetches();
        let mut report = TickReport {
            issued: plan.len(),
            ..TickReport::default()
        };

        let source = &self.source;
        let mut pending: FuturesUnordered<_> = plan
            .into_iter()
            .map(|request| async move {
                let result = source.fetch_since(&request.url, request.from).await;
                (request, result)
            })
            .collect();

        let mut settled = Vec::with_capacity(report.issued);
        let joined = timeout(self.config.tick_timeout(), async {
            while let Some(outcome) = pending.next().await {
                settled.push(outcome);
            }
        })
        .await;
        if joined.is_err() {
            report.timed_out = true;
            warn!(
                outstanding = pending.len(),
                timeout_ms = self.config.tick_timeout_ms,
                "tick deadline elapsed with fetches outstanding"
            );
        }
        drop(pending);

        let mut target = lock_target(target)?;
        for (request, result) in settled {
            report.completed += 1;
            match result {
                Ok(points) => report.appended += target.apply_points(request.slot, &points)?,
                Err(err) => {
                    report.failed += 1;
                    debug!(url = %request.url, error = %err, "metric fetch failed");
                }
            }
        }
        target.coalesced_redraw()?;
        Ok(report)
    }
}

fn lock_target<T>(target: &Mutex<T>) -> ChartSyncResult<MutexGuard<'_, T>> {
    target.lock().map_err(|_| ChartSyncError::LockPoisoned)
}
