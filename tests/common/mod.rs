#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tickerlens::domain::config::TickerSource;
use tickerlens::domain::error::AnalysisError;
pub use tickerlens::domain::price::{PriceBar, RawSeries};
use tickerlens::ports::data_port::DataPort;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn load_series(&self, source: &TickerSource) -> Result<RawSeries, AnalysisError> {
        let load_error = |reason: String| AnalysisError::Load {
            ticker: source.ticker.clone(),
            path: source.path.clone(),
            reason,
        };
        if let Some(reason) = self.errors.get(&source.ticker) {
            return Err(load_error(reason.clone()));
        }
        match self.data.get(&source.ticker) {
            Some(bars) => Ok(RawSeries::new(source.ticker.clone(), bars.clone())),
            None => Err(load_error("no such file".into())),
        }
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

/// One bar per calendar day starting at `start`.
pub fn bars_from_closes(start: &str, closes: &[f64]) -> Vec<PriceBar> {
    let start = date(start);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::flat(start + Duration::days(i as i64), c))
        .collect()
}

/// Closes compounded from `base`; the first return is ignored.
pub fn closes_from_returns(base: f64, returns: &[f64]) -> Vec<f64> {
    let mut closes = Vec::with_capacity(returns.len());
    let mut close = base;
    for (i, r) in returns.iter().enumerate() {
        if i > 0 {
            close *= 1.0 + r;
        }
        closes.push(close);
    }
    closes
}

/// Small repeating returns in [-0.004, 0.004]; `step` varies the pattern.
pub fn wobble(len: usize, step: usize) -> Vec<f64> {
    (0..len)
        .map(|i| 0.002 * (((i * step) % 5) as f64 - 2.0))
        .collect()
}

/// Writes a yfinance-style file: three header lines then positional rows.
pub fn write_price_csv(dir: &Path, ticker: &str, bars: &[PriceBar]) {
    let mut content = String::new();
    content.push_str("Price,Adj Close,Close,High,Low,Open,Volume\n");
    writeln!(content, "Ticker,{t},{t},{t},{t},{t},{t}", t = ticker).unwrap();
    content.push_str("Date,,,,,,\n");
    for b in bars {
        writeln!(
            content,
            "{},{},{},{},{},{},{}",
            b.date, b.adjusted_close, b.close, b.high, b.low, b.open, b.volume
        )
        .unwrap();
    }
    std::fs::write(dir.join(format!("{}_data.csv", ticker)), content).unwrap();
}
