//! Price data access port.

use crate::domain::config::TickerSource;
use crate::domain::error::AnalysisError;
use crate::domain::price::RawSeries;

pub trait DataPort {
    /// Load one ticker's raw series. Any failure is fatal to the run.
    fn load_series(&self, source: &TickerSource) -> Result<RawSeries, AnalysisError>;
}
