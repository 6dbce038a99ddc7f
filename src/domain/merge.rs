//! Long-form table of every ticker's rows, indexed by date.

use crate::domain::price::{PriceBar, RawSeries};
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub ticker: String,
    pub bar: PriceBar,
}

/// Row-wise union of all raw series.
///
/// Rows appear in ticker insertion order, each ticker's rows in source order.
/// Nothing is sorted, dropped or deduplicated.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub tickers: Vec<String>,
    pub rows: Vec<MergedRow>,
    pub date_index: BTreeMap<NaiveDate, Vec<usize>>,
}

impl MergedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows sharing `date`, in table order.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<&MergedRow> {
        self.date_index
            .get(&date)
            .map(|idx| idx.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// Distinct dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.date_index.keys().copied().collect()
    }
}

pub fn merge(series: Vec<RawSeries>) -> MergedTable {
    let capacity = series.iter().map(RawSeries::len).sum();
    let mut tickers = Vec::with_capacity(series.len());
    let mut rows = Vec::with_capacity(capacity);

    for s in series {
        if !tickers.contains(&s.ticker) {
            tickers.push(s.ticker.clone());
        }
        rows.extend(s.bars.into_iter().map(|bar| MergedRow {
            ticker: s.ticker.clone(),
            bar,
        }));
    }

    let mut date_index: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        date_index.entry(row.bar.date).or_default().push(i);
    }

    MergedTable {
        tickers,
        rows,
        date_index,
    }
}
