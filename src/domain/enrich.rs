//! Per-ticker derived metrics: daily return, moving averages, volatility.
//!
//! The merged table is split into one partition per ticker, each partition is
//! ordered by date, and every rolling window runs inside a single partition.
//! Results are written back to the row they were computed for, so the
//! enriched table keeps the merged table's row order.

use crate::domain::error::AnalysisError;
use crate::domain::merge::MergedTable;
use crate::domain::price::PriceBar;
use crate::domain::rolling::{pct_change, rolling_mean, rolling_std};
use std::collections::HashMap;
use tracing::debug;

/// Trailing window lengths, in rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricWindows {
    pub short: usize,
    pub long: usize,
    pub volatility: usize,
}

impl Default for MetricWindows {
    fn default() -> Self {
        Self {
            short: 7,
            long: 30,
            volatility: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub ticker: String,
    pub bar: PriceBar,
    /// Simple return against the previous row of the same ticker.
    pub daily_return: Option<f64>,
    /// Moving average of close over `MetricWindows::short` rows (7 by default).
    pub ma_short: Option<f64>,
    /// Moving average of close over `MetricWindows::long` rows (30 by default).
    pub ma_long: Option<f64>,
    /// Sample standard deviation of `daily_return` over `MetricWindows::volatility` rows.
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct EnrichedTable {
    pub tickers: Vec<String>,
    pub windows: MetricWindows,
    pub rows: Vec<EnrichedRow>,
}

impl EnrichedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows of one ticker in table order.
    pub fn rows_for<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a EnrichedRow> + 'a {
        self.rows.iter().filter(move |r| r.ticker == ticker)
    }

    /// Rows of one ticker ordered by date (stable for equal dates).
    pub fn partition(&self, ticker: &str) -> Vec<&EnrichedRow> {
        let mut rows: Vec<&EnrichedRow> = self.rows.iter().filter(|r| r.ticker == ticker).collect();
        rows.sort_by_key(|r| r.bar.date);
        rows
    }
}

/// Row indices of one ticker, ordered by date.
#[derive(Debug, Clone)]
pub struct Partition {
    pub ticker: String,
    pub rows: Vec<usize>,
}

/// Split the table by ticker, in order of first appearance.
pub fn partition_by_ticker(table: &MergedTable) -> Vec<Partition> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut partitions: Vec<Partition> = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let idx = *slot.entry(row.ticker.as_str()).or_insert_with(|| {
            partitions.push(Partition {
                ticker: row.ticker.clone(),
                rows: Vec::new(),
            });
            partitions.len() - 1
        });
        partitions[idx].rows.push(i);
    }

    for p in &mut partitions {
        p.rows.sort_by_key(|&i| table.rows[i].bar.date);
    }
    partitions
}

struct Derived {
    daily_return: Option<f64>,
    ma_short: Option<f64>,
    ma_long: Option<f64>,
    volatility: Option<f64>,
}

pub fn enrich(table: &MergedTable, windows: MetricWindows) -> Result<EnrichedTable, AnalysisError> {
    let mut derived: Vec<Option<Derived>> = (0..table.len()).map(|_| None).collect();

    for partition in partition_by_ticker(table) {
        if let Some(&stray) = partition
            .rows
            .iter()
            .find(|&&i| table.rows[i].ticker != partition.ticker)
        {
            return Err(AnalysisError::computation(format!(
                "row {} ({}) placed in partition {}",
                stray, table.rows[stray].ticker, partition.ticker
            )));
        }

        let closes: Vec<f64> = partition
            .rows
            .iter()
            .map(|&i| table.rows[i].bar.close)
            .collect();
        let close_values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();

        let returns = pct_change(&closes);
        let ma_short = rolling_mean(&close_values, windows.short);
        let ma_long = rolling_mean(&close_values, windows.long);
        let volatility = rolling_std(&returns, windows.volatility);

        let n = partition.rows.len();
        if [returns.len(), ma_short.len(), ma_long.len(), volatility.len()]
            .iter()
            .any(|&len| len != n)
        {
            return Err(AnalysisError::computation(format!(
                "derived columns for {} do not match its {} rows",
                partition.ticker, n
            )));
        }

        debug!(
            ticker = %partition.ticker,
            rows = n,
            defined_volatility = volatility.iter().flatten().count(),
            "computed partition metrics"
        );

        for (pos, &row) in partition.rows.iter().enumerate() {
            derived[row] = Some(Derived {
                daily_return: returns[pos],
                ma_short: ma_short[pos],
                ma_long: ma_long[pos],
                volatility: volatility[pos],
            });
        }
    }

    let rows = table
        .rows
        .iter()
        .zip(derived)
        .enumerate()
        .map(|(i, (row, d))| {
            let d = d.ok_or_else(|| {
                AnalysisError::computation(format!("row {} was not assigned a partition", i))
            })?;
            Ok(EnrichedRow {
                ticker: row.ticker.clone(),
                bar: row.bar.clone(),
                daily_return: d.daily_return,
                ma_short: d.ma_short,
                ma_long: d.ma_long,
                volatility: d.volatility,
            })
        })
        .collect::<Result<Vec<_>, AnalysisError>>()?;

    Ok(EnrichedTable {
        tickers: table.tickers.clone(),
        windows,
        rows,
    })
}
