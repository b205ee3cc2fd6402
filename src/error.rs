use thiserror::Error;

pub type ChartSyncResult<T> = Result<T, ChartSyncError>;

#[derive(Debug, Error)]
pub enum ChartSyncError {
    #[error("invalid time range: min={min}, max={max}")]
    InvalidRange { min: f64, max: f64 },

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("viewport index {index} out of bounds for group `{token}` of size {len}")]
    UnknownViewport {
        token: String,
        index: usize,
        len: usize,
    },

    #[error("no chart group registered for token `{0}`")]
    UnknownGroup(String),

    #[error("chart group `{0}` is already registered")]
    DuplicateGroup(String),

    #[error("viewport has no time axis")]
    MissingTimeAxis,

    #[error("metrics fetch failed: {0}")]
    Fetch(String),

    #[error("failed to decode metrics payload: {0}")]
    Decode(String),

    #[error("shared chart state lock is poisoned")]
    LockPoisoned,
}

impl From<reqwest::Error> for ChartSyncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Fetch(err.to_string())
        }
    }
}
