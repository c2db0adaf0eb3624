use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::ChartError;

/// HTTP access to the chart data endpoints and the charting library CDN.
#[derive(Debug, Clone)]
pub struct ChartClient {
    http: reqwest::Client,
}

impl ChartClient {
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, ChartError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { http })
    }

    /// GET `url` and parse the body as JSON.
    ///
    /// # Errors
    ///
    /// On transport failure, a non-2xx status, or a body that is not JSON.
    pub async fn fetch_json(&self, url: &Url) -> Result<Value, ChartError> {
        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChartError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.bytes().await?;

        Ok(serde_json::from_slice(&body)?)
    }

    /// Download a script so it can be injected into the page.
    ///
    /// # Errors
    ///
    /// On transport failure or a non-2xx status.
    pub async fn fetch_script(&self, url: &str) -> Result<String, ChartError> {
        let response = self.http.get(url).send().await?.error_for_status()?;

        Ok(response.text().await?)
    }
}
