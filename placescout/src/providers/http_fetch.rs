//! Plain HTTP page fetcher.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

use super::protocols::PageFetcher;
use crate::errors::ProviderError;

const WEB: &str = "web";

/// Fetches pages with a shared reqwest client.
#[derive(Debug, Clone, Default)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Wraps an existing client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(
        &self,
        url: &str,
        timeout: Duration,
        headers: &HashMap<String, String>,
    ) -> Result<String, ProviderError> {
        let mut request = self.client.get(url).timeout(timeout);
        for (key, value) in headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::transport(WEB, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::status(WEB, status.as_u16(), String::new()));
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::decode(WEB, e.to_string()))
    }
}
