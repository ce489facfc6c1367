//! HTTP time source

use async_trait::async_trait;
use curfew_util::Hour;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::{TimeError, TimeResult, TimeSource, hour_from_body};

/// Fetches the hour from a remote JSON time endpoint
#[derive(Debug, Clone)]
pub struct HttpTimeSource {
    client: Client,
    endpoint: String,
}

impl HttpTimeSource {
    /// Create a source for `endpoint`, failing requests after `timeout`
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> TimeResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| TimeError::network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl TimeSource for HttpTimeSource {
    async fn fetch_current_hour(&self) -> TimeResult<Hour> {
        debug!(url = %self.endpoint, "Fetching current time");

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| TimeError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TimeError::network(format!("unexpected status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TimeError::network(format!("failed to read body: {}", e)))?;

        let hour = hour_from_body(&body)?;
        debug!(url = %self.endpoint, hour = %hour, "Time fetch complete");
        Ok(hour)
    }

    fn describe(&self) -> String {
        format!("http ({})", self.endpoint)
    }
}
