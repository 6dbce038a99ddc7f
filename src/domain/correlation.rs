//! Cross-ticker correlation of daily returns.
//!
//! Returns are pivoted into one column per ticker, aligned on date. Each pair
//! of columns is correlated over the dates where both are defined.

use crate::domain::enrich::EnrichedTable;
use crate::domain::error::AnalysisError;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Date × ticker grid of daily returns.
#[derive(Debug, Clone)]
pub struct ReturnsPivot {
    pub dates: Vec<NaiveDate>,
    pub tickers: Vec<String>,
    /// `cells[date][ticker]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl ReturnsPivot {
    pub fn column(&self, ticker: &str) -> Option<Vec<Option<f64>>> {
        let t = self.tickers.iter().position(|x| x == ticker)?;
        Some(self.cells.iter().map(|row| row[t]).collect())
    }
}

/// Fails if a ticker has two rows on the same date.
pub fn pivot_returns(table: &EnrichedTable) -> Result<ReturnsPivot, AnalysisError> {
    let dates: Vec<NaiveDate> = table
        .rows
        .iter()
        .map(|r| r.bar.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let date_pos: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, &d)| (d, i)).collect();
    let ticker_pos: HashMap<&str, usize> = table
        .tickers
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let width = table.tickers.len();
    let mut cells = vec![vec![None; width]; dates.len()];
    let mut seen = vec![vec![false; width]; dates.len()];

    for row in &table.rows {
        let Some(&t) = ticker_pos.get(row.ticker.as_str()) else {
            continue;
        };
        let d = date_pos[&row.bar.date];
        if seen[d][t] {
            return Err(AnalysisError::computation(format!(
                "{} has more than one row on {}",
                row.ticker, row.bar.date
            )));
        }
        seen[d][t] = true;
        cells[d][t] = row.daily_return;
    }

    Ok(ReturnsPivot {
        dates,
        tickers: table.tickers.clone(),
        cells,
    })
}

/// Pearson coefficient over positions where both inputs are defined.
///
/// `None` with fewer than two complete pairs or when either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxx, mut syy, mut sxy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

/// Symmetric ticker × ticker matrix.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub tickers: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.tickers.iter().position(|x| x == a)?;
        let j = self.tickers.iter().position(|x| x == b)?;
        self.values[i][j]
    }
}

pub fn correlate(pivot: &ReturnsPivot) -> CorrelationMatrix {
    let columns: Vec<Vec<Option<f64>>> = (0..pivot.tickers.len())
        .map(|t| pivot.cells.iter().map(|row| row[t]).collect())
        .collect();
    let k = columns.len();
    let mut values = vec![vec![None; k]; k];

    for i in 0..k {
        // A column correlates perfectly with itself unless it is degenerate.
        values[i][i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
        if values[i][i].is_none() {
            warn!(ticker = %pivot.tickers[i], "returns are constant or too short to correlate");
        }
        for j in i + 1..k {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        tickers: pivot.tickers.clone(),
        values,
    }
}

pub fn correlation_matrix(table: &EnrichedTable) -> Result<CorrelationMatrix, AnalysisError> {
    Ok(correlate(&pivot_returns(table)?))
}
