// Sample domain model - one timestamped network reading and its column form

/// A throughput measurement in Mbps; `None` means no measurement was taken.
pub type Reading = Option<f64>;

/// Plotted level for a successful ping. Failures plot at zero.
pub const PING_SUCCESS_LEVEL: f64 = 0.2;

/// Sentinel the live stream uses for "no reading".
pub const LIVE_NO_READING: f64 = -1.0;

pub fn ping_level(successful: bool) -> f64 {
    if successful { PING_SUCCESS_LEVEL } else { 0.0 }
}

pub fn ping_succeeded(level: f64) -> bool {
    level > 0.0
}

/// Historical batches mark a missing measurement with 0 (older servers) or null.
pub fn reading_from_batch(value: Option<f64>) -> Reading {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Live frames mark a missing measurement with -1 or null.
pub fn reading_from_live(value: Option<f64>) -> Reading {
    value.filter(|v| v.is_finite() && *v != LIVE_NO_READING && *v >= 0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleRow {
    pub timestamp: i64,
    pub download: Reading,
    pub upload: Reading,
    pub ping: bool,
}

impl SampleRow {
    pub fn new(timestamp: i64, download: Reading, upload: Reading, ping: bool) -> Self {
        Self {
            timestamp,
            download,
            upload,
            ping,
        }
    }
}

/// A historical batch after sentinel normalization. Column lengths are not
/// checked here; the buffer refuses mismatched shapes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleColumns {
    pub timestamps: Vec<i64>,
    pub download: Vec<Reading>,
    pub upload: Vec<Reading>,
    pub ping: Vec<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesId {
    Time,
    Download,
    Upload,
    Ping,
}

/// Raw value stored at one index of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesValue {
    Timestamp(i64),
    Throughput(Reading),
    PingLevel(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_zero_and_null_are_absent() {
        assert_eq!(reading_from_batch(Some(0.0)), None);
        assert_eq!(reading_from_batch(None), None);
        assert_eq!(reading_from_batch(Some(50.5)), Some(50.5));
    }

    #[test]
    fn test_live_sentinel_is_absent() {
        assert_eq!(reading_from_live(Some(-1.0)), None);
        assert_eq!(reading_from_live(None), None);
        assert_eq!(reading_from_live(Some(f64::NAN)), None);
        assert_eq!(reading_from_live(Some(0.0)), Some(0.0));
        assert_eq!(reading_from_live(Some(20.0)), Some(20.0));
    }

    #[test]
    fn test_ping_levels() {
        assert_eq!(ping_level(true), PING_SUCCESS_LEVEL);
        assert_eq!(ping_level(false), 0.0);
        assert!(ping_succeeded(ping_level(true)));
        assert!(!ping_succeeded(ping_level(false)));
    }
}
