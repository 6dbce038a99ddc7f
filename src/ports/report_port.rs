//! Report output port.

use crate::domain::error::AnalysisError;
use crate::domain::pipeline::AnalysisReport;

/// Sink for the textual summary of an analysis run.
pub trait ReportPort {
    fn write_report(&mut self, report: &AnalysisReport<'_>) -> Result<(), AnalysisError>;
}
