//! CSV price file adapter.
//!
//! Files carry a fixed number of leading non-data lines (three for the usual
//! yfinance export: field names, ticker row, index name row) followed by
//! headerless records in positional order:
//! `date, adjusted_close, close, high, low, open, volume`.

use crate::domain::config::TickerSource;
use crate::domain::error::AnalysisError;
use crate::domain::price::{PriceBar, RAW_COLUMNS, RawSeries};
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use tracing::debug;

pub struct CsvAdapter {
    skip_rows: usize,
}

impl CsvAdapter {
    pub fn new(skip_rows: usize) -> Self {
        Self { skip_rows }
    }
}

impl DataPort for CsvAdapter {
    fn load_series(&self, source: &TickerSource) -> Result<RawSeries, AnalysisError> {
        let content = fs::read_to_string(&source.path).map_err(|e| AnalysisError::Load {
            ticker: source.ticker.clone(),
            path: source.path.clone(),
            reason: e.to_string(),
        })?;
        parse_series(&source.ticker, &source.path, &content, self.skip_rows)
    }
}

pub fn parse_series(
    ticker: &str,
    path: &Path,
    content: &str,
    skip_rows: usize,
) -> Result<RawSeries, AnalysisError> {
    let load_error = |reason: String| AnalysisError::Load {
        ticker: ticker.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let body: String = content.split_inclusive('\n').skip(skip_rows).collect();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| load_error(format!("CSV parse error: {}", e)))?;
        let line = record
            .position()
            .map(|p| p.line() as usize + skip_rows)
            .unwrap_or(skip_rows + bars.len() + 1);

        if record.len() < RAW_COLUMNS {
            return Err(AnalysisError::Shape {
                ticker: ticker.to_string(),
                line,
                expected: RAW_COLUMNS,
                found: record.len(),
            });
        }

        let field = |idx: usize, name: &str| -> Result<f64, AnalysisError> {
            let raw = record[idx].trim();
            let value = raw
                .parse::<f64>()
                .map_err(|e| load_error(format!("invalid {} value at line {}: {}", name, line, e)))?;
            if !value.is_finite() {
                return Err(load_error(format!(
                    "non-finite {} value '{}' at line {}",
                    name, raw, line
                )));
            }
            Ok(value)
        };

        let date = parse_date(&record[0])
            .ok_or_else(|| load_error(format!("invalid date '{}' at line {}", &record[0], line)))?;
        let adjusted_close = field(1, "adjusted close")?;
        let close = field(2, "close")?;
        let high = field(3, "high")?;
        let low = field(4, "low")?;
        let open = field(5, "open")?;
        let volume = parse_volume(&record[6])
            .ok_or_else(|| load_error(format!("invalid volume '{}' at line {}", &record[6], line)))?;

        bars.push(PriceBar {
            date,
            open,
            high,
            low,
            close,
            adjusted_close,
            volume,
        });
    }

    if bars.is_empty() {
        return Err(load_error(format!(
            "no data rows after skipping {} header lines",
            skip_rows
        )));
    }

    debug!(ticker, rows = bars.len(), path = %path.display(), "parsed price file");
    Ok(RawSeries::new(ticker, bars))
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` with or without a `+HH:MM`
/// offset, and RFC 3339. Only the calendar date is kept.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%:z")
                .ok()
                .map(|dt| dt.date_naive())
        })
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

fn parse_volume(raw: &str) -> Option<i64> {
    let s = raw.trim();
    s.parse::<i64>().ok().or_else(|| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0)
            .map(|v| v as i64)
    })
}
