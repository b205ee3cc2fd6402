use crate::core::{DataPoint, TimeRange};
use crate::error::{ChartSyncError, ChartSyncResult};
use serde::{Deserialize, Serialize};

/// Time axis model with separate full and visible ranges.
///
/// `full` tracks the fitted data range.
/// `visible` is the window the axis currently shows, set by zoom/pan, by
/// navigation restores, or by realtime growth while the axis shows everything.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    full: TimeRange,
    visible: TimeRange,
}

impl TimeScale {
    /// Creates a scale with matching full and visible ranges.
    pub fn new(time_start: f64, time_end: f64) -> ChartSyncResult<Self> {
        let range = TimeRange::from_unordered(time_start, time_end)?;
        Ok(Self {
            full: range,
            visible: range,
        })
    }

    /// Fits full and visible ranges to the extent of all `series` points.
    ///
    /// A single timestamp is widened to `min_span` so the axis never collapses.
    pub fn from_series_points<'a, I>(series: I, min_span: f64) -> ChartSyncResult<Self>
    where
        I: IntoIterator<Item = &'a [DataPoint]>,
    {
        let full = data_extent(series)?
            .ok_or_else(|| {
                ChartSyncError::InvalidData("time scale cannot be built from empty data".to_owned())
            })?
            .widened_to(min_span);
        Ok(Self {
            full,
            visible: full,
        })
    }

    #[must_use]
    pub fn full_range(self) -> TimeRange {
        self.full
    }

    #[must_use]
    pub fn visible_range(self) -> TimeRange {
        self.visible
    }

    /// Whether the visible window currently covers the whole fitted range.
    #[must_use]
    pub fn shows_full_range(self) -> bool {
        self.visible.approx_eq(self.full, 1e-9)
    }

    /// Overrides the visible range without modifying the full fitted range.
    ///
    /// Returns `true` when the visible range actually changed.
    pub fn set_visible_range(&mut self, range: TimeRange) -> bool {
        if self.visible == range {
            return false;
        }
        self.visible = range;
        true
    }

    pub fn reset_visible_range_to_full(&mut self) -> bool {
        self.set_visible_range(self.full)
    }

    /// Grows the full range so it covers `time`.
    ///
    /// Returns `true` when the full range changed.
    pub fn extend_full_to(&mut self, time: f64) -> ChartSyncResult<bool> {
        if !time.is_finite() {
            return Err(ChartSyncError::InvalidData(
                "time values must be finite".to_owned(),
            ));
        }
        if self.full.contains(time) {
            return Ok(false);
        }
        self.full = self.full.union(TimeRange::new(time, time)?);
        Ok(true)
    }
}

/// Returns the covering range of all points, or `None` when there are none.
pub fn data_extent<'a, I>(series: I) -> ChartSyncResult<Option<TimeRange>>
where
    I: IntoIterator<Item = &'a [DataPoint]>,
{
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for points in series {
        for point in points {
            if !point.x.is_finite() {
                return Err(ChartSyncError::InvalidData(
                    "time values must be finite".to_owned(),
                ));
            }
            min = min.min(point.x);
            max = max.max(point.x);
        }
    }

    if min > max {
        return Ok(None);
    }
    TimeRange::new(min, max).map(Some)
}
