// JSON payloads exchanged with the network monitor server
use crate::domain::sample::{reading_from_batch, reading_from_live, SampleColumns, SampleRow};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    #[error("batch frame columns differ in length")]
    ShapeMismatch,
}

/// Body of the history endpoint. Ping flags are JSON-truthy values.
#[derive(Debug, Deserialize)]
pub struct BatchPayload {
    pub timestamps: Vec<i64>,
    pub download: Vec<Option<f64>>,
    pub upload: Vec<Option<f64>>,
    pub ping: Vec<Value>,
}

impl From<BatchPayload> for SampleColumns {
    fn from(payload: BatchPayload) -> Self {
        SampleColumns {
            timestamps: payload.timestamps,
            download: payload.download.into_iter().map(reading_from_batch).collect(),
            upload: payload.upload.into_iter().map(reading_from_batch).collect(),
            ping: payload.ping.iter().map(is_truthy).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LivePayload {
    pub timestamp: i64,
    #[serde(default)]
    pub download: Option<f64>,
    #[serde(default)]
    pub upload: Option<f64>,
    pub ping: Value,
}

/// Live frames come either as one record or as a batch-shaped record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LiveFrame {
    Single(LivePayload),
    Batch(BatchPayload),
}

pub fn decode_batch(body: &str) -> Result<SampleColumns, DecodeError> {
    let payload: BatchPayload = serde_json::from_str(body)?;
    Ok(payload.into())
}

pub fn decode_live_frame(text: &str) -> Result<Vec<SampleRow>, DecodeError> {
    match serde_json::from_str::<LiveFrame>(text)? {
        LiveFrame::Single(payload) => Ok(vec![SampleRow::new(
            payload.timestamp,
            reading_from_live(payload.download),
            reading_from_live(payload.upload),
            is_truthy(&payload.ping),
        )]),
        LiveFrame::Batch(payload) => {
            let len = payload.timestamps.len();
            if payload.download.len() != len || payload.upload.len() != len || payload.ping.len() != len {
                return Err(DecodeError::ShapeMismatch);
            }

            Ok(payload
                .timestamps
                .into_iter()
                .zip(payload.download)
                .zip(payload.upload)
                .zip(payload.ping.iter())
                .map(|(((timestamp, download), upload), ping)| {
                    SampleRow::new(
                        timestamp,
                        reading_from_live(download),
                        reading_from_live(upload),
                        is_truthy(ping),
                    )
                })
                .collect())
        }
    }
}

/// JSON truthiness: `false`, `null`, `0`, `NaN` and `""` are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
