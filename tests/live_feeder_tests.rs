use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chart_sync::api::{ChartView, ChartViewport, ViewportConfig, ViewportSyncController};
use chart_sync::core::{DataPoint, Series, TimeRange};
use chart_sync::history::IdentityToken;
use chart_sync::live::{FeederConfig, FeederStop, LiveOptions, LivePointFeeder, PointSource};
use chart_sync::render::NullRenderer;
use chart_sync::{ChartSyncError, ChartSyncResult};
use tokio::sync::Notify;

type Viewport = ChartViewport<NullRenderer>;
type Group = Arc<Mutex<ViewportSyncController<Viewport>>>;

#[derive(Clone)]
enum Script {
    Points(Vec<DataPoint>),
    Fail,
    Stall,
    Gate(Arc<Notify>, Vec<DataPoint>),
}

#[derive(Default)]
struct Inner {
    scripts: Mutex<HashMap<String, Script>>,
    requests: Mutex<Vec<(String, Option<f64>)>>,
}

/// In-memory point source answering each URL from a script.
#[derive(Clone, Default)]
struct ScriptedSource {
    inner: Arc<Inner>,
}

impl ScriptedSource {
    fn with(self, url: &str, script: Script) -> Self {
        self.inner
            .scripts
            .lock()
            .expect("scripts")
            .insert(url.to_owned(), script);
        self
    }

    fn requests(&self) -> Vec<(String, Option<f64>)> {
        self.inner.requests.lock().expect("requests").clone()
    }
}

impl PointSource for ScriptedSource {
    fn fetch_since(
        &self,
        url: &str,
        from: Option<f64>,
    ) -> impl Future<Output = ChartSyncResult<Vec<DataPoint>>> + Send {
        self.inner
            .requests
            .lock()
            .expect("requests")
            .push((url.to_owned(), from));
        let script = self.inner.scripts.lock().expect("scripts").get(url).cloned();
        async move {
            match script {
                Some(Script::Points(points)) => Ok(points),
                Some(Script::Fail) | None => {
                    Err(ChartSyncError::Fetch("scripted failure".to_owned()))
                }
                Some(Script::Stall) => std::future::pending().await,
                Some(Script::Gate(gate, points)) => {
                    gate.notified().await;
                    Ok(points)
                }
            }
        }
    }
}

fn history_points() -> Vec<DataPoint> {
    (0..=10)
        .map(|i| DataPoint::new(i as f64 * 1_000.0, i as f64))
        .collect()
}

fn line_viewport(url: &str) -> Viewport {
    let series = Series::line(url)
        .with_url(url)
        .with_points(history_points())
        .expect("points");
    ChartViewport::new(
        NullRenderer::default(),
        ViewportConfig::titled(url),
        vec![series],
    )
    .expect("viewport")
}

fn shared_group(viewports: Vec<Viewport>) -> Group {
    let controller =
        ViewportSyncController::new(IdentityToken::new("live-run").expect("token"), viewports)
            .expect("controller");
    Arc::new(Mutex::new(controller))
}

fn points(raw: &[(f64, f64)]) -> Vec<DataPoint> {
    raw.iter().copied().map(DataPoint::from).collect()
}

fn render_counts(group: &Group) -> Vec<usize> {
    group
        .lock()
        .expect("group")
        .viewports()
        .iter()
        .map(|view| view.renderer().render_count)
        .collect()
}

#[tokio::test]
async fn tick_appends_all_series_and_redraws_once() {
    let source = ScriptedSource::default()
        .with(
            "mem://cpu",
            Script::Points(points(&[(11_000.0, 1.0), (12_000.0, 2.0), (13_000.0, 3.0)])),
        )
        .with("mem://mem", Script::Points(Vec::new()));
    let group = shared_group(vec![line_viewport("mem://cpu"), line_viewport("mem://mem")]);
    let mut feeder = LivePointFeeder::new(source, FeederConfig::default()).expect("feeder");

    let report = feeder.tick(&group).await.expect("tick");

    assert_eq!(report.issued, 2);
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.appended, 3);
    assert!(!report.timed_out);
    assert_eq!(render_counts(&group), vec![1, 1]);

    let controller = group.lock().expect("group");
    let stats = controller.stats();
    assert_eq!(stats.redraw_passes, 1);
    assert_eq!(stats.history_pushes, 0);
    assert_eq!(stats.suppressed_echoes, 1);
    assert_eq!(
        controller.viewports()[0].visible_range(),
        Some(TimeRange::new(0.0, 13_000.0).expect("range"))
    );
    assert_eq!(controller.viewports()[0].series()[0].points().len(), 14);
}

#[tokio::test]
async fn group_without_pollable_series_still_redraws() {
    let navigator = Series::navigator("overview")
        .with_url("mem://overview")
        .with_points(history_points())
        .expect("points");
    let viewport = ChartViewport::new(
        NullRenderer::default(),
        ViewportConfig::titled("overview"),
        vec![navigator],
    )
    .expect("viewport");
    let source = ScriptedSource::default();
    let group = shared_group(vec![viewport]);
    let mut feeder = LivePointFeeder::new(source.clone(), FeederConfig::default()).expect("feeder");

    let report = feeder.tick(&group).await.expect("tick");

    assert_eq!(report.issued, 0);
    assert!(source.requests().is_empty());
    assert_eq!(render_counts(&group), vec![1]);
    assert_eq!(group.lock().expect("group").stats().redraw_passes, 1);
}

#[tokio::test]
async fn requests_carry_newest_timestamp_and_skip_navigators() {
    let navigator = Series::navigator("overview")
        .with_url("mem://overview")
        .with_points(history_points())
        .expect("points");
    let line = Series::line("cpu")
        .with_url("mem://cpu")
        .with_points(history_points())
        .expect("points");
    let viewport = ChartViewport::new(
        NullRenderer::default(),
        ViewportConfig::titled("cpu"),
        vec![line, navigator],
    )
    .expect("viewport");
    let source = ScriptedSource::default().with("mem://cpu", Script::Points(Vec::new()));
    let group = shared_group(vec![viewport]);
    let mut feeder = LivePointFeeder::new(source.clone(), FeederConfig::default()).expect("feeder");

    feeder.tick(&group).await.expect("tick");

    assert_eq!(
        source.requests(),
        vec![("mem://cpu".to_owned(), Some(10_000.0))]
    );
}

#[tokio::test]
async fn failed_fetch_contributes_nothing() {
    let source = ScriptedSource::default()
        .with("mem://cpu", Script::Fail)
        .with("mem://mem", Script::Points(points(&[(10_500.0, 7.0)])));
    let group = shared_group(vec![line_viewport("mem://cpu"), line_viewport("mem://mem")]);
    let mut feeder = LivePointFeeder::new(source, FeederConfig::default()).expect("feeder");

    let report = feeder.tick(&group).await.expect("tick");

    assert_eq!(report.failed, 1);
    assert_eq!(report.appended, 1);
    assert_eq!(render_counts(&group), vec![1, 1]);
    let controller = group.lock().expect("group");
    assert_eq!(controller.viewports()[0].series()[0].points().len(), 11);
    assert_eq!(controller.viewports()[1].series()[0].last_time(), Some(10_500.0));
}

#[tokio::test]
async fn stale_points_are_dropped() {
    let source = ScriptedSource::default().with(
        "mem://cpu",
        Script::Points(points(&[(9_000.0, 1.0), (10_000.0, 1.0)])),
    );
    let group = shared_group(vec![line_viewport("mem://cpu")]);
    let mut feeder = LivePointFeeder::new(source, FeederConfig::default()).expect("feeder");

    let report = feeder.tick(&group).await.expect("tick");

    assert_eq!(report.appended, 0);
    assert_eq!(group.lock().expect("group").stats().suppressed_echoes, 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_fetch_is_cut_off_by_tick_timeout() {
    let source = ScriptedSource::default()
        .with("mem://cpu", Script::Stall)
        .with("mem://mem", Script::Points(points(&[(11_000.0, 1.0)])));
    let group = shared_group(vec![line_viewport("mem://cpu"), line_viewport("mem://mem")]);
    let mut feeder =
        LivePointFeeder::new(source, FeederConfig::new(3_000, 500)).expect("feeder");

    let report = feeder.tick(&group).await.expect("tick");

    assert!(report.timed_out);
    assert_eq!(report.issued, 2);
    assert_eq!(report.completed, 1);
    assert_eq!(report.appended, 1);
    assert_eq!(render_counts(&group), vec![1, 1]);
}

#[tokio::test]
async fn redraw_waits_for_every_fetch() {
    let first = Arc::new(Notify::new());
    let second = Arc::new(Notify::new());
    let source = ScriptedSource::default()
        .with(
            "mem://cpu",
            Script::Gate(Arc::clone(&first), points(&[(11_000.0, 1.0)])),
        )
        .with(
            "mem://mem",
            Script::Gate(Arc::clone(&second), points(&[(11_000.0, 2.0)])),
        );
    let group = shared_group(vec![line_viewport("mem://cpu"), line_viewport("mem://mem")]);
    let task_group = Arc::clone(&group);
    let handle = tokio::spawn(async move {
        let mut feeder = LivePointFeeder::new(source, FeederConfig::default()).expect("feeder");
        feeder.tick(&task_group).await
    });

    tokio::task::yield_now().await;
    first.notify_one();
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
    assert_eq!(render_counts(&group), vec![0, 0]);
    assert_eq!(
        group.lock().expect("group").viewports()[0].series()[0].points().len(),
        11
    );

    second.notify_one();
    let report = handle.await.expect("join").expect("tick");

    assert_eq!(report.completed, 2);
    assert_eq!(report.appended, 2);
    assert_eq!(render_counts(&group), vec![1, 1]);
}

#[tokio::test(start_paused = true)]
async fn feeder_stops_once_predicate_turns_false() {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    let source = ScriptedSource::default().with("mem://cpu", Script::Points(Vec::new()));
    let group = shared_group(vec![line_viewport("mem://cpu")]);
    let options = LiveOptions::live().with_is_running(move || flag.load(Ordering::SeqCst));

    let handle = LivePointFeeder::start(
        Arc::clone(&group),
        options,
        FeederConfig::default(),
        source.clone(),
    )
    .expect("start")
    .expect("feeder spawned");

    tokio::time::sleep(Duration::from_millis(3_100)).await;
    assert_eq!(source.requests().len(), 1);

    running.store(false, Ordering::SeqCst);
    let stop = handle.await.expect("join");

    assert_eq!(stop, FeederStop::PredicateFalse);
    assert_eq!(source.requests().len(), 1);
    assert_eq!(group.lock().expect("group").stats().redraw_passes, 1);
}

#[test]
fn start_is_a_no_op_when_not_live_or_not_running() {
    let source = ScriptedSource::default();
    let group = shared_group(vec![line_viewport("mem://cpu")]);

    let not_live = LivePointFeeder::start(
        Arc::clone(&group),
        LiveOptions::default(),
        FeederConfig::default(),
        source.clone(),
    )
    .expect("start");
    assert!(not_live.is_none());

    let stopped = LivePointFeeder::start(
        Arc::clone(&group),
        LiveOptions::live().with_is_running(|| false),
        FeederConfig::default(),
        source.clone(),
    )
    .expect("start");
    assert!(stopped.is_none());
    assert!(source.requests().is_empty());
}

#[test]
fn start_rejects_zero_interval() {
    let group = shared_group(vec![line_viewport("mem://cpu")]);
    let err = LivePointFeeder::start(
        group,
        LiveOptions::live(),
        FeederConfig::new(0, 100),
        ScriptedSource::default(),
    )
    .expect_err("zero interval");
    assert!(matches!(err, ChartSyncError::InvalidData(_)));
}
