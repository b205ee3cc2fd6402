//! chart-sync: shared time ranges for groups of metric charts.
//!
//! Viewports in a group follow the same visible window, every user-driven
//! window change becomes a navigation history entry, back/forward restores it,
//! and live groups poll their metrics backend for new trailing points with one
//! coalesced redraw per tick.

pub mod api;
pub mod core;
pub mod error;
pub mod history;
pub mod live;
pub mod render;
pub mod telemetry;

pub use api::{ChartBoard, ChartViewport, ViewportSyncController};
pub use error::{ChartSyncError, ChartSyncResult};
pub use history::{HistoryEntry, IdentityToken, MemoryHistory};
pub use live::{FeederConfig, LiveOptions, LivePointFeeder};
