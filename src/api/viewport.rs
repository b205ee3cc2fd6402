use tracing::{debug, trace};

use crate::core::{DataPoint, Series, TimeRange, TimeScale, data_extent, points_in_time_window};
use crate::error::{ChartSyncError, ChartSyncResult};
use crate::render::{RenderFrame, Renderer, SeriesFrame};

use super::ViewportConfig;

/// Contract a chart instance exposes to range synchronization and live feeding.
///
/// Implemented by [`ChartViewport`] for headless use and by host adapters that
/// wrap a real charting backend.
pub trait ChartView {
    /// Currently visible window, `None` when the chart has no time axis.
    fn visible_range(&self) -> Option<TimeRange>;

    /// Extent of the data held on the time axis, `None` without an axis.
    fn full_range(&self) -> Option<TimeRange>;

    /// Programmatically moves the visible window.
    ///
    /// Returns `true` when the chart would emit a range-change notification.
    /// Fails with [`ChartSyncError::MissingTimeAxis`] when there is no axis.
    fn set_visible_range(&mut self, range: TimeRange) -> ChartSyncResult<bool>;

    fn series(&self) -> &[Series];

    /// Narrowest window a user zoom may produce on this chart, in milliseconds.
    fn min_range_ms(&self) -> f64 {
        0.0
    }

    /// Appends one sample to a series without redrawing.
    fn append_point(&mut self, series_index: usize, point: DataPoint) -> ChartSyncResult<bool>;

    /// Draws the chart. Returns the new visible range when the redraw moved it.
    fn redraw(&mut self) -> ChartSyncResult<Option<TimeRange>>;
}

/// Headless chart instance backed by a [`TimeScale`] and a [`Renderer`].
///
/// When the visible window covers the whole data extent (the `All` preset),
/// a redraw after live appends grows the window with the data.
#[derive(Debug)]
pub struct ChartViewport<R: Renderer> {
    renderer: R,
    config: ViewportConfig,
    time_scale: Option<TimeScale>,
    series: Vec<Series>,
    redraw_count: usize,
}

impl<R: Renderer> ChartViewport<R> {
    pub fn new(renderer: R, config: ViewportConfig, series: Vec<Series>) -> ChartSyncResult<Self> {
        config.validate()?;
        let time_scale = initial_time_scale(&config, &series)?;
        if time_scale.is_none() {
            debug!(title = %config.title, "viewport created without time axis");
        }
        Ok(Self {
            renderer,
            config,
            time_scale,
            series,
            redraw_count: 0,
        })
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.title
    }

    #[must_use]
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    #[must_use]
    pub fn time_scale(&self) -> Option<TimeScale> {
        self.time_scale
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn redraw_count(&self) -> usize {
        self.redraw_count
    }

    fn build_frame(&self, visible: TimeRange) -> RenderFrame {
        self.series.iter().fold(
            RenderFrame::new(self.config.size, self.config.title.clone(), visible),
            |frame, series| {
                frame.with_series(SeriesFrame {
                    name: series.name.clone(),
                    kind: series.kind,
                    points: points_in_time_window(series.points(), visible).to_vec(),
                })
            },
        )
    }

    /// Brings the axis in line with the data held after appends.
    ///
    /// Returns the new visible range when it moved.
    fn sync_axis_with_data(&mut self) -> ChartSyncResult<Option<TimeRange>> {
        let Some(mut scale) = self.time_scale else {
            self.time_scale = initial_time_scale(&self.config, &self.series)?;
            return Ok(self.time_scale.map(TimeScale::visible_range));
        };

        let follows_data = scale.shows_full_range();
        let mut grew = false;
        for series in &self.series {
            if let Some(last) = series.last_time() {
                grew |= scale.extend_full_to(last)?;
            }
        }

        let moved = grew && follows_data && scale.reset_visible_range_to_full();
        self.time_scale = Some(scale);
        Ok(moved.then(|| scale.visible_range()))
    }
}

fn initial_time_scale(
    config: &ViewportConfig,
    series: &[Series],
) -> ChartSyncResult<Option<TimeScale>> {
    if data_extent(series.iter().map(Series::points))?.is_none() {
        return Ok(None);
    }
    let mut scale =
        TimeScale::from_series_points(series.iter().map(Series::points), config.min_range_ms)?;
    scale.set_visible_range(config.initial_preset.resolve(scale.full_range()));
    Ok(Some(scale))
}

impl<R: Renderer> ChartView for ChartViewport<R> {
    fn visible_range(&self) -> Option<TimeRange> {
        self.time_scale.map(TimeScale::visible_range)
    }

    fn full_range(&self) -> Option<TimeRange> {
        self.time_scale.map(TimeScale::full_range)
    }

    fn set_visible_range(&mut self, range: TimeRange) -> ChartSyncResult<bool> {
        let scale = self
            .time_scale
            .as_mut()
            .ok_or(ChartSyncError::MissingTimeAxis)?;
        let changed = scale.set_visible_range(range);
        trace!(
            title = %self.config.title,
            min = range.min(),
            max = range.max(),
            changed,
            "set visible range"
        );
        Ok(changed)
    }

    fn series(&self) -> &[Series] {
        &self.series
    }

    fn min_range_ms(&self) -> f64 {
        self.config.min_range_ms
    }

    fn append_point(&mut self, series_index: usize, point: DataPoint) -> ChartSyncResult<bool> {
        let len = self.series.len();
        let series = self.series.get_mut(series_index).ok_or_else(|| {
            ChartSyncError::InvalidData(format!(
                "series index {series_index} out of bounds for {len} series"
            ))
        })?;
        Ok(series.append_point(point))
    }

    fn redraw(&mut self) -> ChartSyncResult<Option<TimeRange>> {
        let moved = self.sync_axis_with_data()?;
        let Some(scale) = self.time_scale else {
            debug!(title = %self.config.title, "skipping redraw of viewport without data");
            return Ok(None);
        };

        let frame = self.build_frame(scale.visible_range());
        self.renderer.render(&frame)?;
        self.redraw_count += 1;
        trace!(
            title = %self.config.title,
            points = frame.point_count(),
            redraws = self.redraw_count,
            "viewport redrawn"
        );
        Ok(moved)
    }
}
