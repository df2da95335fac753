//! Non-fatal diagnostics produced while merging

use modsum_summary::{CallKind, SymbolId};
use std::fmt;
use thiserror::Error;

/// Why an edge could not be tied to a definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The callee is not defined in any input
    UndefinedCallee,
    /// No vtable slot or witness entry holds the callee
    NoDispatchEntry,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::UndefinedCallee => write!(f, "callee is not defined in any input"),
            UnresolvedReason::NoDispatchEntry => write!(f, "no dispatch table entry holds the callee"),
        }
    }
}

/// Problems found while merging
///
/// None of these stop a merge: partial link sets are expected, so the
/// affected edge or record is dropped and merging continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MergeDiagnostic {
    /// W-MERGE-001: Edge dropped or left without dispatch targets
    #[error("{kind} call from '{caller}' to '{callee}' is unresolved: {reason}")]
    UnresolvedEdge {
        caller: String,
        callee: String,
        kind: CallKind,
        reason: UnresolvedReason,
    },

    /// W-MERGE-002: Two inputs define the same qualified name; the first wins
    #[error("'{name}' is defined more than once; keeping the definition from the first input")]
    DuplicateDefinition { name: String, module: String },

    /// W-MERGE-003: A subtype's vtable is shorter than its base's
    #[error("vtable of '{ty}' ends before its base's; slots from {slot} on are inherited")]
    InconsistentVtable { ty: String, slot: usize },

    /// W-MERGE-004: An input refers to an ID missing from its own symbol table
    #[error("module '{module}' refers to {id}, which its symbol table does not contain")]
    DanglingSymbol { module: String, id: SymbolId },
}

impl MergeDiagnostic {
    /// Warning code for machine-readable output
    pub fn code(&self) -> &'static str {
        match self {
            MergeDiagnostic::UnresolvedEdge { .. } => "W-MERGE-001",
            MergeDiagnostic::DuplicateDefinition { .. } => "W-MERGE-002",
            MergeDiagnostic::InconsistentVtable { .. } => "W-MERGE-003",
            MergeDiagnostic::DanglingSymbol { .. } => "W-MERGE-004",
        }
    }
}
