//! Chart rendering port.

use crate::domain::enrich::EnrichedTable;
use crate::domain::error::AnalysisError;
use std::path::Path;

/// Renders closing price over time, one line per ticker.
pub trait ChartPort {
    fn render(&self, table: &EnrichedTable, title: &str, output: &Path) -> Result<(), AnalysisError>;
}
