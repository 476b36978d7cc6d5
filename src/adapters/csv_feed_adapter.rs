//! CSV feed adapter: one `<SYMBOL>.csv` per symbol in a directory.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. Timestamps are
//! `%Y-%m-%d %H:%M:%S`, or a bare `%Y-%m-%d` read as midnight.

use crate::domain::error::ConfluenceError;
use crate::domain::observation::PriceObservation;
use crate::ports::feed_port::FeedPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct CsvFeedAdapter {
    base_path: PathBuf,
}

impl CsvFeedAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

fn feed_error(reason: impl Into<String>) -> ConfluenceError {
    ConfluenceError::Feed {
        reason: reason.into(),
    }
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ConfluenceError> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(value, DATE_FORMAT).map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|e| feed_error(format!("invalid timestamp '{}': {}", value, e)))
}

fn parse_field<T: std::str::FromStr>(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
    line: u64,
) -> Result<T, ConfluenceError>
where
    T::Err: std::fmt::Display,
{
    record
        .get(index)
        .ok_or_else(|| feed_error(format!("line {}: missing {} column", line, name)))?
        .trim()
        .parse()
        .map_err(|e| feed_error(format!("line {}: invalid {} value: {}", line, name, e)))
}

impl FeedPort for CsvFeedAdapter {
    fn fetch(&self, symbol: &str) -> Result<Vec<PriceObservation>, ConfluenceError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path)
            .map_err(|e| feed_error(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut observations = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| feed_error(format!("CSV parse error: {}", e)))?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let timestamp = parse_timestamp(
                record
                    .get(0)
                    .ok_or_else(|| feed_error(format!("line {}: missing timestamp", line)))?,
            )?;

            observations.push(PriceObservation {
                timestamp,
                open: parse_field(&record, 1, "open", line)?,
                high: parse_field(&record, 2, "high", line)?,
                low: parse_field(&record, 3, "low", line)?,
                close: parse_field(&record, 4, "close", line)?,
                volume: parse_field(&record, 5, "volume", line)?,
            });
        }

        observations.sort_by_key(|o| o.timestamp);
        tracing::debug!(symbol, count = observations.len(), "loaded feed");
        Ok(observations)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ConfluenceError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            feed_error(format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| feed_error(format!("directory entry error: {}", e)))?;
            let name = entry.file_name();
            if let Some(symbol) = name.to_string_lossy().strip_suffix(".csv") {
                symbols.push(symbol.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}
