// Source traits for historical batches and the live sample channel
use crate::domain::sample::{SampleColumns, SampleRow};
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("source responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("could not decode payload: {0}")]
    Decode(String),
}

/// Lifecycle and data notifications from the live channel, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    Opened,
    Sample(SampleRow),
    /// A frame arrived that could not be turned into a sample.
    Malformed { reason: String },
    /// Transport trouble. A `Closed` event follows when the channel goes down.
    Error { reason: String },
    Closed,
}

#[async_trait]
pub trait HistoricalSource: Send + Sync {
    /// Fetch the one-time historical batch, already sentinel-normalized.
    async fn fetch_batch(&self) -> Result<SampleColumns, TransportError>;
}

pub trait LiveSource: Send + Sync {
    /// Open the live channel. Connecting happens lazily when the stream is polled.
    fn subscribe(&self) -> BoxStream<'static, LiveEvent>;
}
