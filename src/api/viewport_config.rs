use serde::{Deserialize, Serialize};

use crate::core::{RangePreset, SurfaceSize};
use crate::error::{ChartSyncError, ChartSyncResult};

/// Per-viewport setup.
///
/// Serializable so dashboards can describe their charts in JSON next to the
/// series definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub size: SurfaceSize,
    /// Narrowest window a zoom may produce, in milliseconds.
    #[serde(default = "default_min_range_ms")]
    pub min_range_ms: f64,
    /// Range selector button active on first render.
    #[serde(default)]
    pub initial_preset: RangePreset,
}

fn default_min_range_ms() -> f64 {
    1.0
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            size: SurfaceSize::default(),
            min_range_ms: default_min_range_ms(),
            initial_preset: RangePreset::default(),
        }
    }
}

impl ViewportConfig {
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: SurfaceSize) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_initial_preset(mut self, preset: RangePreset) -> Self {
        self.initial_preset = preset;
        self
    }

    pub fn validate(&self) -> ChartSyncResult<()> {
        if !self.size.is_valid() {
            return Err(ChartSyncError::InvalidViewport {
                width: self.size.width,
                height: self.size.height,
            });
        }
        if !self.min_range_ms.is_finite() || self.min_range_ms < 0.0 {
            return Err(ChartSyncError::InvalidData(
                "min range must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }

    pub fn from_json_str(input: &str) -> ChartSyncResult<Self> {
        let config: Self = serde_json::from_str(input).map_err(|e| {
            ChartSyncError::InvalidData(format!("failed to parse viewport config: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }
}
