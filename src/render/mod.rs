mod frame;
mod null_renderer;

pub use frame::{RenderFrame, SeriesFrame};
pub use null_renderer::NullRenderer;

use crate::error::ChartSyncResult;

/// Contract implemented by any drawing backend.
///
/// Backends receive a fully materialized `RenderFrame` so drawing code stays
/// isolated from range synchronization and live polling.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartSyncResult<()>;
}
