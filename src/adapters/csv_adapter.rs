//! CSV bar series adapter.
//!
//! Expects a header row naming timestamp/open/high/low/close columns (case
//! insensitive; `datetime` and `date` are accepted for the timestamp). Rows
//! with a missing or unparseable OHLC value are dropped, not errors. Bars
//! come back sorted by timestamp with duplicate timestamps removed
//! (first occurrence wins).

use crate::domain::error::WalkforgeError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::path::PathBuf;

pub struct CsvBarAdapter {
    path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ts);
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts);
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_price(field: Option<&str>) -> Option<f64> {
    let value: f64 = field?.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

impl DataPort for CsvBarAdapter {
    fn fetch_bars(&self) -> Result<Vec<OhlcvBar>, WalkforgeError> {
        let mut rdr = csv::Reader::from_path(&self.path).map_err(|e| WalkforgeError::Data {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;

        let headers = rdr.headers().map_err(|e| WalkforgeError::Data {
            reason: format!("CSV header error: {}", e),
        })?;

        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.contains(&h.trim().to_lowercase().as_str()))
        };
        let ts_idx = find(&["timestamp", "datetime", "date"]).ok_or(WalkforgeError::Data {
            reason: "missing timestamp column".into(),
        })?;
        let open_idx = find(&["open"]).ok_or(WalkforgeError::Data {
            reason: "missing open column".into(),
        })?;
        let high_idx = find(&["high"]).ok_or(WalkforgeError::Data {
            reason: "missing high column".into(),
        })?;
        let low_idx = find(&["low"]).ok_or(WalkforgeError::Data {
            reason: "missing low column".into(),
        })?;
        let close_idx = find(&["close"]).ok_or(WalkforgeError::Data {
            reason: "missing close column".into(),
        })?;

        let mut bars = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| WalkforgeError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let Some(timestamp) = record.get(ts_idx).and_then(parse_timestamp) else {
                continue;
            };
            let (Some(open), Some(high), Some(low), Some(close)) = (
                parse_price(record.get(open_idx)),
                parse_price(record.get(high_idx)),
                parse_price(record.get(low_idx)),
                parse_price(record.get(close_idx)),
            ) else {
                continue;
            };

            bars.push(OhlcvBar {
                timestamp,
                open,
                high,
                low,
                close,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }
}
