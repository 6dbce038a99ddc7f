//! Daily price bar and per-ticker raw series.

use chrono::NaiveDate;

/// Number of positional columns in a raw price file.
pub const RAW_COLUMNS: usize = 7;

/// One trading day for one ticker, exactly as sourced.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adjusted_close: f64,
    pub volume: i64,
}

impl PriceBar {
    /// A bar where every price field equals `close`. Handy for synthetic series.
    pub fn flat(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            open: close,
            high: close,
            low: close,
            close,
            adjusted_close: close,
            volume: 0,
        }
    }
}

/// The rows of one ticker in source order.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub ticker: String,
    pub bars: Vec<PriceBar>,
}

impl RawSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        Self {
            ticker: ticker.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// First and last date in source order, if any rows exist.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.bars.iter().map(|b| b.date).min()?;
        let last = self.bars.iter().map(|b| b.date).max()?;
        Some((first, last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn flat_bar_copies_close() {
        let bar = PriceBar::flat(date(2), 101.5);
        assert_eq!(bar.open, 101.5);
        assert_eq!(bar.high, 101.5);
        assert_eq!(bar.low, 101.5);
        assert_eq!(bar.adjusted_close, 101.5);
        assert_eq!(bar.volume, 0);
    }

    #[test]
    fn date_range_ignores_source_order() {
        let series = RawSeries::new(
            "AAPL",
            vec![
                PriceBar::flat(date(5), 1.0),
                PriceBar::flat(date(2), 1.0),
                PriceBar::flat(date(9), 1.0),
            ],
        );
        assert_eq!(series.date_range(), Some((date(2), date(9))));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn empty_series_has_no_range() {
        let series = RawSeries::new("AAPL", Vec::new());
        assert!(series.is_empty());
        assert_eq!(series.date_range(), None);
    }
}
