//! modsum-merge: Cross-module merge and liveness propagation
//!
//! Combines per-module summaries into one `combined` store and computes
//! which functions are reachable from preserved roots.
//!
//! # Passes
//!
//! - **Combine**: qualifies locally defined names with their module,
//!   resolves references across inputs, and drops edges to functions no
//!   input defines ([`MergeDiagnostic::UnresolvedEdge`]).
//! - **Liveness**: a worklist fixed point seeded from preserved (and
//!   already live) functions. Direct edges mark their callee; virtual edges
//!   mark the matching slot in the receiver type and every subtype; witness
//!   edges mark every conformance's implementation of the requirement.
//!
//! Functions left dead afterwards are candidates for elimination.
//!
//! # Usage
//!
//! ```
//! use modsum_merge::{merge, MergeOptions};
//! use modsum_summary::{CallKind, FunctionFlags, ModuleSummaryStore};
//!
//! let mut a = ModuleSummaryStore::begin_module("A");
//! let main = a.record_function("main", FunctionFlags::PRESERVED).unwrap();
//! a.record_call(main, "B.helper", CallKind::Direct).unwrap();
//!
//! let mut b = ModuleSummaryStore::begin_module("B");
//! b.record_function("helper", FunctionFlags::empty()).unwrap();
//! b.record_function("unused", FunctionFlags::empty()).unwrap();
//!
//! let merged = merge(&[a.finish(), b.finish()], &MergeOptions::default());
//! assert_eq!(merged.is_live("B.helper"), Some(true));
//! assert_eq!(merged.is_live("B.unused"), Some(false));
//! ```

mod diagnostic;
mod dispatch;
mod liveness;
mod merged;
mod resolve;
mod trace;

pub use diagnostic::{MergeDiagnostic, UnresolvedReason};
pub use dispatch::{DispatchIndex, DispatchTargets};
pub use merged::MergedStore;
pub use trace::{LiveReason, LivenessTrace};

use modsum_summary::ModuleSummaryStore;

/// Module name of a merged store
///
/// Inputs carrying this name are treated as earlier merge results and
/// keep their names verbatim.
pub const COMBINED_MODULE_NAME: &str = "combined";

/// Merge settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Report why this (merged) function name ends up live
    pub trace_symbol: Option<String>,
}

/// Combine the inputs and propagate liveness
pub fn merge(inputs: &[ModuleSummaryStore], options: &MergeOptions) -> MergedStore {
    let inputs: Vec<&ModuleSummaryStore> = inputs.iter().collect();
    let mut merged = MergedStore::combine(&inputs);
    merged.propagate_liveness(options);
    merged
}
