//! Analysis configuration and its validation.
//!
//! A single [`AnalysisConfig`] is built up front (from an INI file through
//! [`ConfigPort`], or from built-in defaults) and passed explicitly into the
//! pipeline.

use crate::domain::aggregate::{DEFAULT_TOP_N, DEFAULT_TOP_N_PER_TICKER};
use crate::domain::enrich::MetricWindows;
use crate::domain::error::AnalysisError;
use crate::ports::config_port::ConfigPort;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_TICKERS: [&str; 3] = ["AAPL", "MSFT", "GOOGL"];
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_FILE_PATTERN: &str = "{ticker}_data.csv";
pub const DEFAULT_SKIP_ROWS: usize = 3;
pub const DEFAULT_CHART_PATH: &str = "closing_prices.svg";
pub const DEFAULT_CHART_TITLE: &str = "Closing Prices Over Time";

const TICKER_PLACEHOLDER: &str = "{ticker}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickerSource {
    pub ticker: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub top_n: usize,
    pub top_n_per_ticker: usize,
    pub chart_path: PathBuf,
    pub chart_title: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            top_n_per_ticker: DEFAULT_TOP_N_PER_TICKER,
            chart_path: PathBuf::from(DEFAULT_CHART_PATH),
            chart_title: DEFAULT_CHART_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Ticker symbols in load order.
    pub tickers: Vec<String>,
    pub data_dir: PathBuf,
    pub file_pattern: String,
    /// Explicit file locations that bypass `data_dir` + `file_pattern`.
    pub path_overrides: BTreeMap<String, PathBuf>,
    pub skip_rows: usize,
    pub windows: MetricWindows,
    pub report: ReportSettings,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            file_pattern: DEFAULT_FILE_PATTERN.to_string(),
            path_overrides: BTreeMap::new(),
            skip_rows: DEFAULT_SKIP_ROWS,
            windows: MetricWindows::default(),
            report: ReportSettings::default(),
        }
    }
}

impl AnalysisConfig {
    /// Ticker → file mapping in ticker order.
    pub fn sources(&self) -> Vec<TickerSource> {
        self.tickers
            .iter()
            .map(|ticker| TickerSource {
                ticker: ticker.clone(),
                path: self.path_for(ticker),
            })
            .collect()
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        match self.path_overrides.get(ticker) {
            Some(path) => path.clone(),
            None => source_path(&self.data_dir, &self.file_pattern, ticker),
        }
    }
}

pub fn source_path(data_dir: &Path, pattern: &str, ticker: &str) -> PathBuf {
    data_dir.join(pattern.replace(TICKER_PLACEHOLDER, ticker))
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum TickerListError {
    #[error("empty token in ticker list")]
    EmptyToken,

    #[error("duplicate ticker: {0}")]
    DuplicateTicker(String),
}

/// Comma separated, trimmed and upper-cased; order is kept.
pub fn parse_tickers(input: &str) -> Result<Vec<String>, TickerListError> {
    let mut tickers = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(TickerListError::EmptyToken);
        }
        let ticker = trimmed.to_uppercase();
        if !seen.insert(ticker.clone()) {
            return Err(TickerListError::DuplicateTicker(ticker));
        }
        tickers.push(ticker);
    }

    Ok(tickers)
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, AnalysisError> {
    let defaults = AnalysisConfig::default();

    let tickers = match config.get_string("data", "tickers") {
        Some(list) => parse_tickers(&list).map_err(|e| invalid("data", "tickers", e.to_string()))?,
        None => defaults.tickers,
    };

    let data_dir = config
        .get_string("data", "data_dir")
        .map(PathBuf::from)
        .unwrap_or(defaults.data_dir);
    let file_pattern = config
        .get_string("data", "file_pattern")
        .unwrap_or(defaults.file_pattern);

    let path_overrides = tickers
        .iter()
        .filter_map(|t| {
            config
                .get_string("paths", t)
                .filter(|p| !p.trim().is_empty())
                .map(|p| (t.clone(), PathBuf::from(p.trim())))
        })
        .collect();

    for key in config.keys("paths") {
        if !tickers.iter().any(|t| t.eq_ignore_ascii_case(&key)) {
            warn!(ticker = %key, "path override ignored: ticker is not configured");
        }
    }

    let windows = MetricWindows {
        short: get_count(config, "metrics", "short_window", defaults.windows.short)?,
        long: get_count(config, "metrics", "long_window", defaults.windows.long)?,
        volatility: get_count(config, "metrics", "volatility_window", defaults.windows.volatility)?,
    };

    let report = ReportSettings {
        top_n: get_count(config, "report", "top_n", defaults.report.top_n)?,
        top_n_per_ticker: get_count(
            config,
            "report",
            "top_n_per_ticker",
            defaults.report.top_n_per_ticker,
        )?,
        chart_path: config
            .get_string("report", "chart_path")
            .map(PathBuf::from)
            .unwrap_or(defaults.report.chart_path),
        chart_title: config
            .get_string("report", "chart_title")
            .unwrap_or(defaults.report.chart_title),
    };

    let built = AnalysisConfig {
        tickers,
        data_dir,
        file_pattern,
        path_overrides,
        skip_rows: get_count(config, "data", "skip_rows", defaults.skip_rows)?,
        windows,
        report,
    };
    validate_analysis_config(&built)?;
    Ok(built)
}

pub fn validate_analysis_config(config: &AnalysisConfig) -> Result<(), AnalysisError> {
    if config.tickers.is_empty() {
        return Err(AnalysisError::ConfigMissing {
            section: "data".into(),
            key: "tickers".into(),
        });
    }
    let uncovered = config
        .tickers
        .iter()
        .any(|t| !config.path_overrides.contains_key(t));
    if uncovered && !config.file_pattern.contains(TICKER_PLACEHOLDER) {
        return Err(invalid(
            "data",
            "file_pattern",
            format!("file_pattern must contain {}", TICKER_PLACEHOLDER),
        ));
    }
    if config.windows.short < 1 {
        return Err(invalid("metrics", "short_window", "short_window must be at least 1"));
    }
    if config.windows.long < 1 {
        return Err(invalid("metrics", "long_window", "long_window must be at least 1"));
    }
    if config.windows.volatility < 2 {
        return Err(invalid(
            "metrics",
            "volatility_window",
            "volatility_window must be at least 2",
        ));
    }
    if config.report.top_n < 1 {
        return Err(invalid("report", "top_n", "top_n must be at least 1"));
    }
    if config.report.top_n_per_ticker < 1 {
        return Err(invalid(
            "report",
            "top_n_per_ticker",
            "top_n_per_ticker must be at least 1",
        ));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> AnalysisError {
    AnalysisError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Non-negative integer setting. Text that is not an integer is rejected
/// rather than silently replaced by the default.
fn get_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, AnalysisError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("{} must be an integer", key)))?;
    usize::try_from(value).map_err(|_| invalid(section, key, format!("{} must be non-negative", key)))
}
