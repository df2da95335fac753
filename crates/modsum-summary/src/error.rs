//! Error types for building and populating summary stores

use modsum_symbols::{SymbolError, SymbolId};
use thiserror::Error;

/// Errors from recording summary information
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SummaryError {
    /// E-SUMMARY-001: ID not interned in the store's symbol table
    #[error("unknown symbol: {id}")]
    UnknownSymbol { id: SymbolId },

    /// E-SUMMARY-002: ID is interned but no function is recorded for it
    #[error("no function recorded for {id}")]
    UnknownFunction { id: SymbolId },

    /// E-SUMMARY-003: ID is interned but no type is recorded for it
    #[error("no type recorded for {id}")]
    UnknownType { id: SymbolId },

    /// E-SUMMARY-004: Same function or type recorded twice
    #[error("duplicate definition: {name}")]
    DuplicateDefinition { name: String },

    /// E-SUMMARY-005: Derived vtable has fewer slots than its base
    #[error("vtable of {name} has {slots} slots but its base {base} has {base_slots}")]
    VtableShorterThanBase {
        name: String,
        base: String,
        slots: usize,
        base_slots: usize,
    },
}

impl SummaryError {
    /// Error code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            SummaryError::UnknownSymbol { .. } => "E-SUMMARY-001",
            SummaryError::UnknownFunction { .. } => "E-SUMMARY-002",
            SummaryError::UnknownType { .. } => "E-SUMMARY-003",
            SummaryError::DuplicateDefinition { .. } => "E-SUMMARY-004",
            SummaryError::VtableShorterThanBase { .. } => "E-SUMMARY-005",
        }
    }
}

impl From<SymbolError> for SummaryError {
    fn from(err: SymbolError) -> Self {
        match err {
            SymbolError::UnknownSymbol { id } => SummaryError::UnknownSymbol { id },
        }
    }
}
