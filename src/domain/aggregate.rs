//! Read-only summary views over the enriched table.
//!
//! - Monthly mean of daily returns per ticker
//! - Highest-volatility rows across all tickers
//! - Highest-volatility rows within each ticker

use crate::domain::enrich::{EnrichedRow, EnrichedTable};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_TOP_N_PER_TICKER: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Month × ticker grid of mean daily returns.
#[derive(Debug, Clone)]
pub struct MonthlyReturns {
    pub tickers: Vec<String>,
    pub months: Vec<YearMonth>,
    /// `values[month][ticker]`, aligned with `months` and `tickers`.
    pub values: Vec<Vec<Option<f64>>>,
}

impl MonthlyReturns {
    pub fn get(&self, month: YearMonth, ticker: &str) -> Option<f64> {
        let m = self.months.iter().position(|&x| x == month)?;
        let t = self.tickers.iter().position(|x| x == ticker)?;
        self.values[m][t]
    }
}

pub fn monthly_returns(table: &EnrichedTable) -> MonthlyReturns {
    let column: HashMap<&str, usize> = table
        .tickers
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    // (sum, count) of defined returns per ticker, keyed by month.
    let mut buckets: BTreeMap<YearMonth, Vec<(f64, usize)>> = BTreeMap::new();

    for row in &table.rows {
        let Some(&t) = column.get(row.ticker.as_str()) else {
            continue;
        };
        let cells = buckets
            .entry(YearMonth::of(row.bar.date))
            .or_insert_with(|| vec![(0.0, 0); table.tickers.len()]);
        if let Some(r) = row.daily_return {
            cells[t].0 += r;
            cells[t].1 += 1;
        }
    }

    let months: Vec<YearMonth> = buckets.keys().copied().collect();
    let values = buckets
        .into_values()
        .map(|cells| {
            cells
                .into_iter()
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect()
        })
        .collect();

    MonthlyReturns {
        tickers: table.tickers.clone(),
        months,
        values,
    }
}

/// Rows ordered by volatility, highest first.
#[derive(Debug, Clone, Default)]
pub struct VolatilityRanking<'a> {
    pub rows: Vec<&'a EnrichedRow>,
}

impl<'a> VolatilityRanking<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a EnrichedRow> + '_ {
        self.rows.iter().copied()
    }
}

/// Stable descending sort on volatility; rows without a finite value are
/// dropped, equal values keep their incoming order.
pub fn rank_by_volatility<'a, I>(rows: I, n: usize) -> VolatilityRanking<'a>
where
    I: IntoIterator<Item = &'a EnrichedRow>,
{
    let mut ranked: Vec<(f64, &'a EnrichedRow)> = rows
        .into_iter()
        .filter_map(|r| r.volatility.filter(|v| v.is_finite()).map(|v| (v, r)))
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    ranked.truncate(n);

    VolatilityRanking {
        rows: ranked.into_iter().map(|(_, r)| r).collect(),
    }
}

pub fn top_volatility(table: &EnrichedTable, n: usize) -> VolatilityRanking<'_> {
    rank_by_volatility(&table.rows, n)
}

#[derive(Debug, Clone)]
pub struct TickerRanking<'a> {
    pub ticker: String,
    pub ranking: VolatilityRanking<'a>,
}

/// Top `n` rows of each ticker independently, grouped in ticker order.
pub fn top_volatility_per_ticker(table: &EnrichedTable, n: usize) -> Vec<TickerRanking<'_>> {
    table
        .tickers
        .iter()
        .map(|ticker| TickerRanking {
            ticker: ticker.clone(),
            ranking: rank_by_volatility(table.rows_for(ticker), n),
        })
        .collect()
}

/// Concatenate per-ticker rankings into one sequence.
pub fn flatten<'a>(groups: &[TickerRanking<'a>]) -> Vec<&'a EnrichedRow> {
    groups.iter().flat_map(|g| g.ranking.iter()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enrich::MetricWindows;
    use crate::domain::price::PriceBar;
    use approx::assert_abs_diff_eq;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn row(ticker: &str, day: &str, ret: Option<f64>, vol: Option<f64>) -> EnrichedRow {
        EnrichedRow {
            ticker: ticker.into(),
            bar: PriceBar::flat(date(day), 100.0),
            daily_return: ret,
            ma_short: None,
            ma_long: None,
            volatility: vol,
        }
    }

    fn table(rows: Vec<EnrichedRow>) -> EnrichedTable {
        let mut tickers: Vec<String> = Vec::new();
        for r in &rows {
            if !tickers.contains(&r.ticker) {
                tickers.push(r.ticker.clone());
            }
        }
        EnrichedTable {
            tickers,
            windows: MetricWindows::default(),
            rows,
        }
    }

    #[test]
    fn year_month_display() {
        assert_eq!(YearMonth::of(date("2024-02-10")).to_string(), "2024-02");
        assert_eq!(YearMonth::of(date("2023-12-31")).to_string(), "2023-12");
    }

    #[test]
    fn monthly_mean_skips_undefined_returns() {
        let t = table(vec![
            row("AAPL", "2024-01-02", None, None),
            row("AAPL", "2024-01-03", Some(0.02), None),
            row("AAPL", "2024-01-04", Some(0.04), None),
            row("AAPL", "2024-02-01", Some(-0.01), None),
        ]);
        let m = monthly_returns(&t);

        assert_eq!(m.months.len(), 2);
        assert_abs_diff_eq!(
            m.get(YearMonth { year: 2024, month: 1 }, "AAPL").unwrap(),
            0.03,
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            m.get(YearMonth { year: 2024, month: 2 }, "AAPL").unwrap(),
            -0.01,
            epsilon = 1e-12
        );
    }

    #[test]
    fn monthly_all_undefined_is_undefined() {
        let t = table(vec![
            row("AAPL", "2024-01-02", None, None),
            row("MSFT", "2024-01-02", Some(0.01), None),
        ]);
        let m = monthly_returns(&t);
        let jan = YearMonth { year: 2024, month: 1 };

        assert_eq!(m.get(jan, "AAPL"), None);
        assert_eq!(m.get(jan, "MSFT"), Some(0.01));
    }

    #[test]
    fn monthly_grid_has_one_column_per_ticker() {
        let t = table(vec![
            row("AAPL", "2024-01-31", Some(0.01), None),
            row("MSFT", "2024-03-01", Some(0.02), None),
        ]);
        let m = monthly_returns(&t);

        assert_eq!(m.tickers, vec!["AAPL", "MSFT"]);
        assert_eq!(m.months.len(), 2);
        assert!(m.values.iter().all(|r| r.len() == 2));
        assert_eq!(m.get(YearMonth { year: 2024, month: 3 }, "AAPL"), None);
    }

    #[test]
    fn global_ranking_is_descending_and_truncated() {
        let t = table(vec![
            row("AAPL", "2024-01-01", None, Some(0.1)),
            row("AAPL", "2024-01-02", None, Some(0.5)),
            row("MSFT", "2024-01-01", None, None),
            row("MSFT", "2024-01-02", None, Some(0.3)),
        ]);
        let ranking = top_volatility(&t, 2);

        let vols: Vec<f64> = ranking.iter().map(|r| r.volatility.unwrap()).collect();
        assert_eq!(vols, vec![0.5, 0.3]);
    }

    #[test]
    fn ranking_excludes_undefined_even_when_short() {
        let t = table(vec![
            row("AAPL", "2024-01-01", None, None),
            row("AAPL", "2024-01-02", None, Some(0.2)),
        ]);
        let ranking = top_volatility(&t, 10);
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn ranking_skips_non_finite_volatility() {
        let t = table(vec![
            row("AAPL", "2024-01-01", None, Some(f64::NAN)),
            row("AAPL", "2024-01-02", None, Some(0.2)),
            row("AAPL", "2024-01-03", None, Some(f64::INFINITY)),
        ]);
        let ranking = top_volatility(&t, 3);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking.rows[0].volatility, Some(0.2));
    }

    #[test]
    fn ties_keep_table_order() {
        let t = table(vec![
            row("MSFT", "2024-01-05", None, Some(0.2)),
            row("AAPL", "2024-01-01", None, Some(0.2)),
            row("AAPL", "2024-01-02", None, Some(0.2)),
        ]);
        let ranking = top_volatility(&t, 3);

        let order: Vec<(&str, String)> = ranking
            .iter()
            .map(|r| (r.ticker.as_str(), r.bar.date.to_string()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("MSFT", "2024-01-05".to_string()),
                ("AAPL", "2024-01-01".to_string()),
                ("AAPL", "2024-01-02".to_string()),
            ]
        );
    }

    #[test]
    fn per_ticker_ranking_is_independent() {
        let t = table(vec![
            row("AAPL", "2024-01-01", None, Some(0.9)),
            row("AAPL", "2024-01-02", None, Some(0.8)),
            row("AAPL", "2024-01-03", None, Some(0.7)),
            row("MSFT", "2024-01-01", None, Some(0.1)),
            row("MSFT", "2024-01-02", None, Some(0.2)),
        ]);
        let groups = top_volatility_per_ticker(&t, 2);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].ticker, "AAPL");
        assert_eq!(groups[1].ticker, "MSFT");
        let msft: Vec<f64> = groups[1].ranking.iter().map(|r| r.volatility.unwrap()).collect();
        assert_eq!(msft, vec![0.2, 0.1]);

        let flat = flatten(&groups);
        assert_eq!(flat.len(), 4);
        assert_eq!(flat[0].volatility, Some(0.9));
        assert_eq!(flat[2].ticker, "MSFT");
    }

    #[test]
    fn per_ticker_ranking_keeps_empty_groups() {
        let t = table(vec![
            row("AAPL", "2024-01-01", None, None),
            row("MSFT", "2024-01-01", None, Some(0.1)),
        ]);
        let groups = top_volatility_per_ticker(&t, 3);
        assert!(groups[0].ranking.is_empty());
        assert_eq!(groups[1].ranking.len(), 1);
    }
}
