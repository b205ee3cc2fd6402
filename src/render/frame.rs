use crate::core::{DataPoint, SeriesKind, SurfaceSize, TimeRange};
use crate::error::{ChartSyncError, ChartSyncResult};

/// Visible slice of one series for a draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesFrame {
    pub name: String,
    pub kind: SeriesKind,
    pub points: Vec<DataPoint>,
}

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub size: SurfaceSize,
    pub title: String,
    pub visible_range: TimeRange,
    pub series: Vec<SeriesFrame>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(size: SurfaceSize, title: impl Into<String>, visible_range: TimeRange) -> Self {
        Self {
            size,
            title: title.into(),
            visible_range,
            series: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_series(mut self, series: SeriesFrame) -> Self {
        self.series.push(series);
        self
    }

    pub fn validate(&self) -> ChartSyncResult<()> {
        if !self.size.is_valid() {
            return Err(ChartSyncError::InvalidViewport {
                width: self.size.width,
                height: self.size.height,
            });
        }

        for series in &self.series {
            if series
                .points
                .iter()
                .any(|point| !self.visible_range.contains(point.x))
            {
                return Err(ChartSyncError::InvalidData(format!(
                    "series `{}` frame contains points outside the visible range",
                    series.name
                )));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|series| series.points.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.point_count() == 0
    }
}
