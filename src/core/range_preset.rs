use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::TimeRange;
use crate::error::ChartSyncError;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;

/// Range selector buttons offered above a metrics chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RangePreset {
    #[serde(rename = "1s")]
    OneSecond,
    #[serde(rename = "5s")]
    FiveSeconds,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "5h")]
    FiveHours,
    #[default]
    #[serde(rename = "All")]
    All,
}

impl RangePreset {
    pub const ALL_PRESETS: [RangePreset; 7] = [
        RangePreset::OneSecond,
        RangePreset::FiveSeconds,
        RangePreset::OneMinute,
        RangePreset::FiveMinutes,
        RangePreset::OneHour,
        RangePreset::FiveHours,
        RangePreset::All,
    ];

    /// Window length in milliseconds, `None` for [`RangePreset::All`].
    #[must_use]
    pub fn span_ms(self) -> Option<f64> {
        match self {
            Self::OneSecond => Some(SECOND_MS),
            Self::FiveSeconds => Some(5.0 * SECOND_MS),
            Self::OneMinute => Some(MINUTE_MS),
            Self::FiveMinutes => Some(5.0 * MINUTE_MS),
            Self::OneHour => Some(HOUR_MS),
            Self::FiveHours => Some(5.0 * HOUR_MS),
            Self::All => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::OneSecond => "1s",
            Self::FiveSeconds => "5s",
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::OneHour => "1h",
            Self::FiveHours => "5h",
            Self::All => "All",
        }
    }

    /// Resolves the preset to a window anchored at the end of `full`.
    #[must_use]
    pub fn resolve(self, full: TimeRange) -> TimeRange {
        match self.span_ms() {
            Some(span) if span < full.span() => {
                TimeRange::new(full.max() - span, full.max()).unwrap_or(full)
            }
            _ => full,
        }
    }
}

impl fmt::Display for RangePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RangePreset {
    type Err = ChartSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_PRESETS
            .into_iter()
            .find(|preset| preset.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ChartSyncError::InvalidData(format!("unknown range preset `{s}`")))
    }
}
