use crate::core::TimeRange;
use crate::error::ChartSyncResult;
use crate::render::{RenderFrame, Renderer};

/// No-op renderer used by tests and headless hosts.
///
/// It still validates frame content and keeps counters so tests can assert
/// how many draw passes a viewport performed.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub render_count: usize,
    pub last_point_count: usize,
    pub last_visible_range: Option<TimeRange>,
}

impl Renderer for NullRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartSyncResult<()> {
        frame.validate()?;
        self.render_count += 1;
        self.last_point_count = frame.point_count();
        self.last_visible_range = Some(frame.visible_range);
        Ok(())
    }
}
