use serde::{Deserialize, Deserializer, Serialize};
use tracing::trace;

use crate::core::DataPoint;
use crate::error::{ChartSyncError, ChartSyncResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Metric line; the only kind live polling feeds.
    #[default]
    Line,
    /// Overview series drawn in the navigator strip.
    Navigator,
}

/// One data series of a chart viewport.
///
/// Serialized with the same keys a dashboard page uses to describe its series:
/// `name`, `type`, `url`, `data` (`[timestamp_ms, value]` pairs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: SeriesKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "data", default, deserialize_with = "deserialize_sorted_points")]
    points: Vec<DataPoint>,
}

fn deserialize_sorted_points<'de, D>(deserializer: D) -> Result<Vec<DataPoint>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut points = Vec::<DataPoint>::deserialize(deserializer)?;
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
    Ok(points)
}

impl Series {
    #[must_use]
    pub fn line(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: SeriesKind::Line,
            url: None,
            points: Vec::new(),
        }
    }

    #[must_use]
    pub fn navigator(name: impl Into<String>) -> Self {
        Self {
            kind: SeriesKind::Navigator,
            ..Self::line(name)
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Replaces the series data, sorting it by timestamp.
    pub fn with_points(mut self, points: Vec<DataPoint>) -> ChartSyncResult<Self> {
        self.set_points(points)?;
        Ok(self)
    }

    pub fn set_points(&mut self, mut points: Vec<DataPoint>) -> ChartSyncResult<()> {
        if points.iter().any(|point| !point.is_finite()) {
            return Err(ChartSyncError::InvalidData(format!(
                "series `{}` contains non-finite samples",
                self.name
            )));
        }
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        self.points = points;
        Ok(())
    }

    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[must_use]
    pub fn last_time(&self) -> Option<f64> {
        self.points.last().map(|point| point.x)
    }

    /// Whether live polling should fetch for this series.
    #[must_use]
    pub fn is_pollable(&self) -> bool {
        self.kind == SeriesKind::Line && self.url.is_some()
    }

    /// Appends a sample at the tail.
    ///
    /// Samples that are not strictly newer than the latest held sample are
    /// dropped; returns whether the sample was appended.
    pub fn append_point(&mut self, point: DataPoint) -> bool {
        if !point.is_finite() {
            return false;
        }
        if self.last_time().is_some_and(|last| point.x <= last) {
            trace!(series = %self.name, time = point.x, "drop stale point");
            return false;
        }
        self.points.push(point);
        true
    }
}
