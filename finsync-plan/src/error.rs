//! Error types for finsync-plan.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from plan IO. The planner itself is pure and
/// infallible; per-record problems degrade to warnings and counters.
#[derive(Debug, Error)]
pub enum PlanError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV read/write error, with annotated path.
    #[error("CSV error at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Plan JSON serialization/deserialization error.
    #[error("plan JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A structurally invalid snapshot file: the key column is absent.
    /// Fatal: no output is produced from such an input.
    #[error("{path}: required column '{column}' is missing")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Convenience constructor for [`PlanError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> PlanError {
    PlanError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`PlanError::Csv`].
pub(crate) fn csv_err(path: impl Into<PathBuf>, source: csv::Error) -> PlanError {
    PlanError::Csv {
        path: path.into(),
        source,
    }
}
