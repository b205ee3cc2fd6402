//! Live polling of metric points for chart groups.

mod config;
mod feeder;
mod source;

pub use config::{FeederConfig, LiveOptions, RunningPredicate};
pub use feeder::{
    FeederStop, FetchPlan, FetchRequest, LivePointFeeder, LiveTarget, SeriesSlot, TickReport,
};
pub use source::{HttpPointSource, PointSource, format_from};
