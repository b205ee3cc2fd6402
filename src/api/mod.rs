//! Range synchronization for groups of chart viewports.

mod board;
mod controller;
mod gate;
mod viewport;
mod viewport_config;

pub use board::{ChartBoard, NavigationOutcome, SharedGroup, lock_group};
pub use controller::{RangeChangeOutcome, SyncStats, ViewportSyncController};
pub use gate::SuppressionGate;
pub use viewport::{ChartView, ChartViewport};
pub use viewport_config::ViewportConfig;
