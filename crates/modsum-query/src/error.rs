//! Error types for queries and YAML conversion

use modsum_summary::{SummaryError, SymbolId};
use thiserror::Error;

/// Misuse of the query API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// E-USAGE-001: Liveness queried before a merge computed it
    #[error("liveness of module '{module}' has not been computed; merge it first")]
    NotMerged { module: String },

    /// E-USAGE-002: ID was never interned in the queried store
    #[error("unknown symbol: {id}")]
    UnknownSymbol { id: SymbolId },
}

impl UsageError {
    pub fn code(&self) -> &'static str {
        match self {
            UsageError::NotMerged { .. } => "E-USAGE-001",
            UsageError::UnknownSymbol { .. } => "E-USAGE-002",
        }
    }
}

/// Errors converting between text and stores
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("invalid summary YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("inconsistent summary: {0}")]
    Summary(#[from] SummaryError),
}
