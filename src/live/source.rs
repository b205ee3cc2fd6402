use std::future::Future;
use std::time::Duration;

use reqwest::Url;
use tracing::trace;

use crate::core::DataPoint;
use crate::error::{ChartSyncError, ChartSyncResult};

/// Backend answering incremental metric queries.
///
/// `from` is the timestamp of the newest point the series already holds;
/// `None` asks for everything.
pub trait PointSource: Send + Sync {
    fn fetch_since(
        &self,
        url: &str,
        from: Option<f64>,
    ) -> impl Future<Output = ChartSyncResult<Vec<DataPoint>>> + Send;
}

/// Formats a millisecond timestamp for the `from` query parameter.
///
/// Whole numbers are written without a fractional part, the way the metrics
/// backend emits them.
#[must_use]
pub fn format_from(from: f64) -> String {
    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;
    if from.fract() == 0.0 && from.abs() < MAX_EXACT_INTEGER {
        format!("{}", from as i64)
    } else {
        format!("{from}")
    }
}

/// `PointSource` over HTTP: `GET <url>&from=<ts>` returning `[[ts, value], ...]`.
#[derive(Debug, Clone)]
pub struct HttpPointSource {
    client: reqwest::Client,
    base_url: Option<Url>,
    request_timeout: Duration,
}

impl Default for HttpPointSource {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

impl HttpPointSource {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: None,
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Resolves relative series URLs such as `/metrics?run=3&name=cpu`.
    pub fn with_base_url(mut self, base_url: &str) -> ChartSyncResult<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            ChartSyncError::InvalidData(format!("invalid base url `{base_url}`: {e}"))
        })?;
        self.base_url = Some(parsed);
        Ok(self)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the request URL, keeping any query pairs already on `url`.
    pub fn request_url(&self, url: &str, from: Option<f64>) -> ChartSyncResult<Url> {
        let mut resolved = match (Url::parse(url), &self.base_url) {
            (Ok(absolute), _) => absolute,
            (Err(_), Some(base)) => base.join(url).map_err(|e| {
                ChartSyncError::InvalidData(format!("invalid series url `{url}`: {e}"))
            })?,
            (Err(e), None) => {
                return Err(ChartSyncError::InvalidData(format!(
                    "invalid series url `{url}`: {e}"
                )));
            }
        };
        if let Some(from) = from {
            resolved
                .query_pairs_mut()
                .append_pair("from", &format_from(from));
        }
        Ok(resolved)
    }
}

impl PointSource for HttpPointSource {
    fn fetch_since(
        &self,
        url: &str,
        from: Option<f64>,
    ) -> impl Future<Output = ChartSyncResult<Vec<DataPoint>>> + Send {
        let request = self.request_url(url, from);
        let client = self.client.clone();
        let timeout = self.request_timeout;
        async move {
            let url = request?;
            trace!(%url, "fetch metric points");
            let response = client.get(url.clone()).timeout(timeout).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ChartSyncError::Fetch(format!("HTTP {status} from {url}")));
            }
            let points: Vec<DataPoint> = response.json().await?;
            Ok(points)
        }
    }
}
