//! Error types for symbol lookups

use crate::SymbolId;
use thiserror::Error;

/// Errors from symbol table lookups
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    /// E-SYMBOL-001: ID was never handed out by this table
    #[error("unknown symbol: {id}")]
    UnknownSymbol { id: SymbolId },
}

impl SymbolError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SymbolError::UnknownSymbol { .. } => "E-SYMBOL-001",
        }
    }
}
