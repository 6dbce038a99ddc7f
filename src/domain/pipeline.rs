//! Stage wiring: load → merge → enrich → summarize.
//!
//! Every stage finishes before the next begins and any error ends the run.

use crate::domain::aggregate::{
    monthly_returns, top_volatility, top_volatility_per_ticker, MonthlyReturns, TickerRanking,
    VolatilityRanking,
};
use crate::domain::config::{AnalysisConfig, ReportSettings};
use crate::domain::correlation::{correlation_matrix, CorrelationMatrix};
use crate::domain::enrich::{enrich, EnrichedTable};
use crate::domain::error::AnalysisError;
use crate::domain::merge::merge;
use crate::domain::price::RawSeries;
use crate::ports::data_port::DataPort;
use tracing::info;

/// Everything printed at the end of a run. Rankings borrow from the table.
#[derive(Debug, Clone)]
pub struct AnalysisReport<'a> {
    pub table: &'a EnrichedTable,
    pub monthly: MonthlyReturns,
    pub top_volatility: VolatilityRanking<'a>,
    pub top_volatility_per_ticker: Vec<TickerRanking<'a>>,
    pub correlation: CorrelationMatrix,
}

pub fn load_all(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
) -> Result<Vec<RawSeries>, AnalysisError> {
    let sources = config.sources();
    let mut loaded = Vec::with_capacity(sources.len());

    for source in &sources {
        let series = data_port.load_series(source)?;
        info!(
            ticker = %source.ticker,
            rows = series.len(),
            path = %source.path.display(),
            "loaded price series"
        );
        loaded.push(series);
    }
    Ok(loaded)
}

pub fn prepare(
    data_port: &dyn DataPort,
    config: &AnalysisConfig,
) -> Result<EnrichedTable, AnalysisError> {
    let series = load_all(data_port, config)?;
    let merged = merge(series);
    info!(
        tickers = merged.tickers.len(),
        rows = merged.len(),
        dates = merged.dates().len(),
        "merged price series"
    );
    enrich(&merged, config.windows)
}

pub fn summarize<'a>(
    table: &'a EnrichedTable,
    settings: &ReportSettings,
) -> Result<AnalysisReport<'a>, AnalysisError> {
    let monthly = monthly_returns(table);
    let top = top_volatility(table, settings.top_n);
    let per_ticker = top_volatility_per_ticker(table, settings.top_n_per_ticker);
    let correlation = correlation_matrix(table)?;

    info!(
        months = monthly.months.len(),
        ranked = top.len(),
        "summarized enriched table"
    );

    Ok(AnalysisReport {
        table,
        monthly,
        top_volatility: top,
        top_volatility_per_ticker: per_ticker,
        correlation,
    })
}
