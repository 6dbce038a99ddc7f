//! Port traits separating the pipeline from its inputs and outputs.

pub mod chart_port;
pub mod config_port;
pub mod data_port;
pub mod report_port;
