// Bounded multi-series sample buffer
use super::sample::{ping_level, Reading, SampleColumns, SampleRow, SeriesId, SeriesValue};
use serde::Serialize;
use std::collections::VecDeque;
use thiserror::Error;

pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error(
        "column lengths differ: timestamps={timestamps}, download={download}, upload={upload}, ping={ping}"
    )]
    ShapeMismatch {
        timestamps: usize,
        download: usize,
        upload: usize,
        ping: usize,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Oldest entries dropped from every series to stay within capacity.
    pub trimmed: usize,
    /// The new timestamp is earlier than the previous last one.
    pub out_of_order: bool,
}

/// Four parallel series sharing one index space. Index `i` in any series
/// always refers to the same sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleBuffer {
    #[serde(skip)]
    capacity: usize,
    timestamps: VecDeque<i64>,
    download: VecDeque<Reading>,
    upload: VecDeque<Reading>,
    ping: VecDeque<f64>,
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            timestamps: VecDeque::new(),
            download: VecDeque::new(),
            upload: VecDeque::new(),
            ping: VecDeque::new(),
        }
    }

    /// Replace all contents with a historical batch, keeping the newest
    /// `capacity` rows. Returns the number of leading rows dropped.
    pub fn replace(&mut self, columns: SampleColumns) -> Result<usize, BufferError> {
        let SampleColumns {
            timestamps,
            download,
            upload,
            ping,
        } = columns;

        let len = timestamps.len();
        if download.len() != len || upload.len() != len || ping.len() != len {
            return Err(BufferError::ShapeMismatch {
                timestamps: len,
                download: download.len(),
                upload: upload.len(),
                ping: ping.len(),
            });
        }

        if let Some(position) = timestamps.windows(2).position(|pair| pair[1] < pair[0]) {
            tracing::warn!(
                "Historical batch is not time-ordered at index {}: {} follows {}",
                position + 1,
                timestamps[position + 1],
                timestamps[position]
            );
        }

        self.timestamps = timestamps.into();
        self.download = download.into();
        self.upload = upload.into();
        self.ping = ping.into_iter().map(ping_level).collect();

        Ok(self.enforce_capacity())
    }

    pub fn append(&mut self, row: SampleRow) -> AppendOutcome {
        let out_of_order = self
            .timestamps
            .back()
            .is_some_and(|&last| row.timestamp < last);

        if out_of_order {
            tracing::warn!(
                "Accepting out-of-order sample: timestamp {} precedes {}",
                row.timestamp,
                self.timestamps.back().copied().unwrap_or_default()
            );
        }

        self.timestamps.push_back(row.timestamp);
        self.download.push_back(row.download);
        self.upload.push_back(row.upload);
        self.ping.push_back(ping_level(row.ping));

        AppendOutcome {
            trimmed: self.enforce_capacity(),
            out_of_order,
        }
    }

    /// Drop the same oldest prefix from every series.
    fn enforce_capacity(&mut self) -> usize {
        let excess = self.timestamps.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.timestamps.drain(..excess);
            self.download.drain(..excess);
            self.upload.drain(..excess);
            self.ping.drain(..excess);
        }
        excess
    }

    pub fn latest_index(&self) -> Option<usize> {
        self.timestamps.len().checked_sub(1)
    }

    pub fn value_at(&self, series: SeriesId, index: usize) -> Option<SeriesValue> {
        match series {
            SeriesId::Time => self.timestamps.get(index).copied().map(SeriesValue::Timestamp),
            SeriesId::Download => self.download.get(index).copied().map(SeriesValue::Throughput),
            SeriesId::Upload => self.upload.get(index).copied().map(SeriesValue::Throughput),
            SeriesId::Ping => self.ping.get(index).copied().map(SeriesValue::PingLevel),
        }
    }

    /// Throughput column for `series`; `None` for the time and ping series.
    pub fn throughput(&self, series: SeriesId) -> Option<&VecDeque<Reading>> {
        match series {
            SeriesId::Download => Some(&self.download),
            SeriesId::Upload => Some(&self.upload),
            SeriesId::Time | SeriesId::Ping => None,
        }
    }

    pub fn timestamps(&self) -> &VecDeque<i64> {
        &self.timestamps
    }

    pub fn ping_levels(&self) -> &VecDeque<f64> {
        &self.ping
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
