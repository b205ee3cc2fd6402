pub mod range_preset;
pub mod series;
pub mod time_range;
pub mod time_scale;
pub mod types;
pub mod windowing;

pub use range_preset::RangePreset;
pub use series::{Series, SeriesKind};
pub use time_range::TimeRange;
pub use time_scale::{TimeScale, data_extent};
pub use types::{DataPoint, SurfaceSize};
pub use windowing::points_in_time_window;
