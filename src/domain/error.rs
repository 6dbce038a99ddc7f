//! Domain error types.

use std::path::PathBuf;

/// Top-level error type for tickerlens.
///
/// Every variant is fatal: the pipeline has no partial-success mode, so errors
/// travel up to the CLI unchanged and end the run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("failed to load {ticker} from {}: {reason}", path.display())]
    Load {
        ticker: String,
        path: PathBuf,
        reason: String,
    },

    #[error("malformed {ticker} data at line {line}: expected {expected} columns, found {found}")]
    Shape {
        ticker: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("computation invariant violated: {reason}")]
    Computation { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    pub(crate) fn computation(reason: impl Into<String>) -> Self {
        AnalysisError::Computation {
            reason: reason.into(),
        }
    }

    /// Process exit status for this error class.
    pub fn exit_status(&self) -> u8 {
        match self {
            AnalysisError::Io(_) => 1,
            AnalysisError::ConfigParse { .. }
            | AnalysisError::ConfigMissing { .. }
            | AnalysisError::ConfigInvalid { .. } => 2,
            AnalysisError::Load { .. } | AnalysisError::Shape { .. } => 3,
            AnalysisError::Computation { .. } => 4,
        }
    }
}

impl From<&AnalysisError> for std::process::ExitCode {
    fn from(err: &AnalysisError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}
