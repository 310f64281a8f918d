// HTTP client for the history endpoint
use crate::application::sample_sources::{HistoricalSource, TransportError};
use crate::domain::sample::SampleColumns;
use crate::infrastructure::wire::decode_batch;
use async_trait::async_trait;
use reqwest::StatusCode;

#[derive(Debug, Clone)]
pub struct HttpBatchSource {
    client: reqwest::Client,
    url: String,
}

impl HttpBatchSource {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl HistoricalSource for HttpBatchSource {
    async fn fetch_batch(&self) -> Result<SampleColumns, TransportError> {
        tracing::debug!("Fetching historical batch from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        decode_batch(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}
