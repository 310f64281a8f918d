// Summary deriver - Status panel and hover legend rows computed from the buffer
use crate::domain::sample::{ping_succeeded, Reading, SeriesId, SeriesValue};
use crate::domain::sample_buffer::SampleBuffer;
use chrono::{DateTime, FixedOffset, Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Display;

const GMT_ABBREVIATIONS: [(&str, &str); 8] = [
    ("GMT-0400", "EDT"),
    ("GMT-4", "EDT"),
    ("GMT-0500", "EST"),
    ("GMT-5", "EST"),
    ("GMT-0700", "PDT"),
    ("GMT-7", "PDT"),
    ("GMT-0800", "PST"),
    ("GMT-8", "PST"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PingOutcome {
    Success,
    Failure,
}

impl PingOutcome {
    pub fn from_level(level: f64) -> Self {
        if ping_succeeded(level) {
            PingOutcome::Success
        } else {
            PingOutcome::Failure
        }
    }
}

/// One row of the status panel or the hover legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub date: String,
    pub time: String,
    pub download: Option<i64>,
    pub upload: Option<i64>,
    pub ping: Option<PingOutcome>,
}

/// Per-series cursor positions reported by the chart. They can differ
/// slightly between series because each series skips gaps on its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CursorIndices {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub time: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub download: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub upload: Option<usize>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ping: Option<usize>,
}

/// Query strings send an unset cursor as `series=`.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Zone timestamps are rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    Local,
    Fixed(FixedOffset),
}

struct RenderedTime {
    date: String,
    time: String,
    long_form: String,
}

impl DisplayZone {
    fn render(&self, timestamp_ms: i64) -> Option<RenderedTime> {
        let utc = DateTime::from_timestamp_millis(timestamp_ms)?;
        Some(match self {
            DisplayZone::Local => render_in(&utc.with_timezone(&Local)),
            DisplayZone::Fixed(offset) => render_in(&utc.with_timezone(offset)),
        })
    }
}

fn render_in<Tz: TimeZone>(at: &DateTime<Tz>) -> RenderedTime
where
    Tz::Offset: Display,
{
    RenderedTime {
        date: at.format("%-m/%-d/%Y").to_string(),
        time: at.format("%-I:%M:%S %p").to_string(),
        long_form: at.format("%a %b %d %Y %H:%M:%S GMT%z").to_string(),
    }
}

/// Look up the US zone abbreviation for a rendered date string. Only a
/// single unambiguous `GMT-<digits>` token is considered.
pub fn timezone_abbreviation(rendered: &str) -> Option<&'static str> {
    let mut offsets = rendered.match_indices("GMT-").filter_map(|(start, token)| {
        let digits_start = start + token.len();
        let digits = rendered[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        (digits > 0).then(|| &rendered[start..digits_start + digits])
    });

    let offset = offsets.next()?;
    if offsets.next().is_some() {
        return None;
    }

    GMT_ABBREVIATIONS
        .iter()
        .find(|(gmt, _)| *gmt == offset)
        .map(|(_, abbreviation)| *abbreviation)
}

fn floor_reading(reading: Reading) -> Option<i64> {
    reading.map(|value| value.floor() as i64)
}

#[derive(Debug, Clone, Copy)]
pub struct SummaryDeriver {
    zone: DisplayZone,
}

impl SummaryDeriver {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone }
    }

    /// Status panel row. Download and upload fall back independently to the
    /// most recent present value in their own series.
    pub fn latest_summary(&self, buffer: &SampleBuffer) -> Option<SummaryRow> {
        let index = buffer.latest_index()?;
        let timestamp = buffer.timestamps().get(index).copied()?;
        let ping = buffer.ping_levels().get(index).copied()?;

        let (date, time) = self.date_and_time(timestamp);
        Some(SummaryRow {
            date,
            time,
            download: floor_reading(Self::last_present(buffer, SeriesId::Download, index)),
            upload: floor_reading(Self::last_present(buffer, SeriesId::Upload, index)),
            ping: Some(PingOutcome::from_level(ping)),
        })
    }

    /// Legend row at the chart cursor. Gaps are reported as gaps.
    pub fn hover_summary(&self, buffer: &SampleBuffer, cursor: &CursorIndices) -> Option<SummaryRow> {
        let timestamp = match buffer.value_at(SeriesId::Time, cursor.time?)? {
            SeriesValue::Timestamp(timestamp) => timestamp,
            _ => return None,
        };

        let (date, time) = self.date_and_time(timestamp);
        Some(SummaryRow {
            date,
            time,
            download: floor_reading(Self::exact(buffer, SeriesId::Download, cursor.download)),
            upload: floor_reading(Self::exact(buffer, SeriesId::Upload, cursor.upload)),
            ping: cursor
                .ping
                .and_then(|index| buffer.value_at(SeriesId::Ping, index))
                .and_then(|value| match value {
                    SeriesValue::PingLevel(level) => Some(PingOutcome::from_level(level)),
                    _ => None,
                }),
        })
    }

    fn last_present(buffer: &SampleBuffer, series: SeriesId, index: usize) -> Reading {
        buffer
            .throughput(series)?
            .range(..=index)
            .rev()
            .find_map(|reading| *reading)
    }

    fn exact(buffer: &SampleBuffer, series: SeriesId, index: Option<usize>) -> Reading {
        match buffer.value_at(series, index?)? {
            SeriesValue::Throughput(reading) => reading,
            _ => None,
        }
    }

    fn date_and_time(&self, timestamp: i64) -> (String, String) {
        match self.zone.render(timestamp) {
            Some(rendered) => {
                let time = match timezone_abbreviation(&rendered.long_form) {
                    Some(abbreviation) => format!("{} {}", rendered.time, abbreviation),
                    None => rendered.time,
                };
                (rendered.date, time)
            }
            None => {
                tracing::warn!("Timestamp {} is outside the renderable range", timestamp);
                (String::new(), timestamp.to_string())
            }
        }
    }
}
