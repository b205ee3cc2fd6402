use serde::{Deserialize, Serialize};

use crate::error::{ChartSyncError, ChartSyncResult};

/// Visible window on a time axis, in millisecond timestamps.
///
/// Both bounds are finite and `min <= max`; constructors reject anything else,
/// so a held `TimeRange` is always ordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTimeRange", into = "RawTimeRange")]
pub struct TimeRange {
    min: f64,
    max: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawTimeRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawTimeRange> for TimeRange {
    type Error = ChartSyncError;

    fn try_from(raw: RawTimeRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl From<TimeRange> for RawTimeRange {
    fn from(range: TimeRange) -> Self {
        Self {
            min: range.min,
            max: range.max,
        }
    }
}

impl TimeRange {
    pub fn new(min: f64, max: f64) -> ChartSyncResult<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ChartSyncError::InvalidRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Builds a range from two bounds given in any order.
    pub fn from_unordered(a: f64, b: f64) -> ChartSyncResult<Self> {
        Self::new(a.min(b), a.max(b))
    }

    #[must_use]
    pub fn min(self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(self, time: f64) -> bool {
        time >= self.min && time <= self.max
    }

    /// Widens the range symmetrically until it spans at least `min_span`.
    #[must_use]
    pub fn widened_to(self, min_span: f64) -> Self {
        if !min_span.is_finite() || self.span() >= min_span {
            return self;
        }
        let center = self.min + self.span() / 2.0;
        let half = min_span / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest range covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: TimeRange) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Compares bounds with an absolute tolerance.
    #[must_use]
    pub fn approx_eq(self, other: TimeRange, epsilon: f64) -> bool {
        (self.min - other.min).abs() <= epsilon && (self.max - other.max).abs() <= epsilon
    }
}

impl From<TimeRange> for (f64, f64) {
    fn from(range: TimeRange) -> Self {
        (range.min, range.max)
    }
}

impl TryFrom<(f64, f64)> for TimeRange {
    type Error = ChartSyncError;

    fn try_from((min, max): (f64, f64)) -> Result<Self, Self::Error> {
        Self::new(min, max)
    }
}
