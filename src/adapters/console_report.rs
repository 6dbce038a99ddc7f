//! Plain-text report writer.
//!
//! Produces four aligned tables:
//! - Monthly mean returns (month × ticker)
//! - Highest-volatility rows across all tickers
//! - Highest-volatility rows per ticker
//! - Return correlation matrix (ticker × ticker)

use crate::domain::aggregate::{MonthlyReturns, TickerRanking};
use crate::domain::correlation::CorrelationMatrix;
use crate::domain::enrich::{EnrichedRow, MetricWindows};
use crate::domain::error::AnalysisError;
use crate::domain::pipeline::AnalysisReport;
use crate::ports::report_port::ReportPort;
use std::io::Write;

const MISSING: &str = "-";
const MIN_COLUMN_WIDTH: usize = 10;

pub struct ConsoleReportAdapter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReportAdapter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportPort for ConsoleReportAdapter<W> {
    fn write_report(&mut self, report: &AnalysisReport<'_>) -> Result<(), AnalysisError> {
        self.out.write_all(format_report(report).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

pub fn format_report(report: &AnalysisReport<'_>) -> String {
    let windows = report.table.windows;
    let mut output = String::new();

    output.push_str("=== Monthly Returns ===\n");
    output.push_str(&format_monthly_returns(&report.monthly));

    output.push_str("\n=== High Volatility Periods ===\n");
    output.push_str(&format_volatility_rows(&report.top_volatility.rows, windows));

    output.push_str("\n=== High Volatility By Company ===\n");
    output.push_str(&format_per_ticker(&report.top_volatility_per_ticker, windows));

    output.push_str("\n=== Return Correlation ===\n");
    output.push_str(&format_correlation(&report.correlation));
    output
}

fn cell(value: Option<f64>, precision: usize, width: usize) -> String {
    match value {
        Some(v) => format!("{:>width$.precision$}", v, width = width, precision = precision),
        None => format!("{:>width$}", MISSING, width = width),
    }
}

fn column_width(tickers: &[String]) -> usize {
    tickers
        .iter()
        .map(|t| t.len() + 2)
        .max()
        .unwrap_or(0)
        .max(MIN_COLUMN_WIDTH)
}

pub fn format_monthly_returns(monthly: &MonthlyReturns) -> String {
    if monthly.months.is_empty() {
        return "No returns data available.\n".to_string();
    }

    let width = column_width(&monthly.tickers);
    let mut output = format!("{:<8}", "Month");
    for ticker in &monthly.tickers {
        output.push_str(&format!("{:>width$}", ticker, width = width));
    }
    output.push('\n');

    for (month, values) in monthly.months.iter().zip(&monthly.values) {
        output.push_str(&format!("{:<8}", month.to_string()));
        for &v in values {
            output.push_str(&cell(v, 6, width));
        }
        output.push('\n');
    }
    output
}

pub fn format_volatility_rows(rows: &[&EnrichedRow], windows: MetricWindows) -> String {
    if rows.is_empty() {
        return "No volatility data available.\n".to_string();
    }

    let ticker_width = rows
        .iter()
        .map(|r| r.ticker.len() + 2)
        .max()
        .unwrap_or(0)
        .max(8);
    let short_header = format!("MA({})", windows.short);
    let long_header = format!("MA({})", windows.long);
    let vol_header = format!("VOL({})", windows.volatility);

    let mut output = format!(
        "{:<12}{:<tw$}{:>12}{:>12}{:>12}{:>12}{:>12}\n",
        "Date",
        "Ticker",
        "Close",
        "Return",
        short_header,
        long_header,
        vol_header,
        tw = ticker_width
    );
    for row in rows {
        output.push_str(&format!(
            "{:<12}{:<tw$}{:>12.2}{}{}{}{}\n",
            row.bar.date.to_string(),
            row.ticker,
            row.bar.close,
            cell(row.daily_return, 6, 12),
            cell(row.ma_short, 2, 12),
            cell(row.ma_long, 2, 12),
            cell(row.volatility, 6, 12),
            tw = ticker_width
        ));
    }
    output
}

pub fn format_per_ticker(groups: &[TickerRanking<'_>], windows: MetricWindows) -> String {
    if groups.is_empty() {
        return "No volatility data available.\n".to_string();
    }

    let mut output = String::new();
    for group in groups {
        output.push_str(&format!("{}:\n", group.ticker));
        output.push_str(&format_volatility_rows(&group.ranking.rows, windows));
    }
    output
}

pub fn format_correlation(matrix: &CorrelationMatrix) -> String {
    if matrix.tickers.is_empty() {
        return "No correlation data available.\n".to_string();
    }

    let width = column_width(&matrix.tickers);
    let mut output = format!("{:<width$}", "", width = width);
    for ticker in &matrix.tickers {
        output.push_str(&format!("{:>width$}", ticker, width = width));
    }
    output.push('\n');

    for (ticker, values) in matrix.tickers.iter().zip(&matrix.values) {
        output.push_str(&format!("{:<width$}", ticker, width = width));
        for &v in values {
            output.push_str(&cell(v, 4, width));
        }
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregate::{VolatilityRanking, YearMonth};
    use crate::domain::enrich::EnrichedTable;
    use crate::domain::price::PriceBar;
    use chrono::NaiveDate;

    fn row(ticker: &str, day: u32, vol: Option<f64>) -> EnrichedRow {
        EnrichedRow {
            ticker: ticker.into(),
            bar: PriceBar::flat(NaiveDate::from_ymd_opt(2024, 2, day).unwrap(), 123.456),
            daily_return: Some(0.0125),
            ma_short: Some(120.0),
            ma_long: None,
            volatility: vol,
        }
    }

    #[test]
    fn monthly_grid_marks_missing_cells() {
        let monthly = MonthlyReturns {
            tickers: vec!["AAPL".into(), "MSFT".into()],
            months: vec![YearMonth { year: 2024, month: 1 }],
            values: vec![vec![Some(0.001234), None]],
        };
        let text = format_monthly_returns(&monthly);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Month"));
        assert!(lines[0].contains("AAPL"));
        assert!(lines[1].starts_with("2024-01"));
        assert!(lines[1].contains("0.001234"));
        assert!(lines[1].trim_end().ends_with('-'));
    }

    #[test]
    fn empty_monthly_grid() {
        let monthly = MonthlyReturns {
            tickers: vec!["AAPL".into()],
            months: Vec::new(),
            values: Vec::new(),
        };
        assert_eq!(format_monthly_returns(&monthly), "No returns data available.\n");
    }

    #[test]
    fn volatility_rows_show_window_headers() {
        let r = row("AAPL", 5, Some(0.0211));
        let text = format_volatility_rows(&[&r], MetricWindows::default());

        assert!(text.contains("MA(7)"));
        assert!(text.contains("MA(30)"));
        assert!(text.contains("VOL(30)"));
        assert!(text.contains("2024-02-05"));
        assert!(text.contains("123.46"));
        assert!(text.contains("0.021100"));
    }

    #[test]
    fn correlation_grid_is_square() {
        let matrix = CorrelationMatrix {
            tickers: vec!["AAPL".into(), "MSFT".into()],
            values: vec![vec![Some(1.0), Some(0.5)], vec![Some(0.5), Some(1.0)]],
        };
        let text = format_correlation(&matrix);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("AAPL"));
        assert!(lines[1].contains("1.0000"));
        assert!(lines[2].contains("0.5000"));
    }

    #[test]
    fn adapter_writes_all_sections() {
        let table = EnrichedTable {
            tickers: vec!["AAPL".into()],
            windows: MetricWindows::default(),
            rows: vec![row("AAPL", 1, Some(0.02))],
        };
        let report = AnalysisReport {
            table: &table,
            monthly: MonthlyReturns {
                tickers: table.tickers.clone(),
                months: vec![YearMonth { year: 2024, month: 2 }],
                values: vec![vec![Some(0.0125)]],
            },
            top_volatility: VolatilityRanking {
                rows: vec![&table.rows[0]],
            },
            top_volatility_per_ticker: vec![TickerRanking {
                ticker: "AAPL".into(),
                ranking: VolatilityRanking {
                    rows: vec![&table.rows[0]],
                },
            }],
            correlation: CorrelationMatrix {
                tickers: table.tickers.clone(),
                values: vec![vec![None]],
            },
        };

        let mut adapter = ConsoleReportAdapter::new(Vec::new());
        adapter.write_report(&report).unwrap();
        let text = String::from_utf8(adapter.into_inner()).unwrap();

        assert!(text.contains("=== Monthly Returns ==="));
        assert!(text.contains("=== High Volatility Periods ==="));
        assert!(text.contains("=== High Volatility By Company ==="));
        assert!(text.contains("AAPL:"));
        assert!(text.contains("=== Return Correlation ==="));
    }
}
