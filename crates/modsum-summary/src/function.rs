//! Function summaries and call edges

use bitflags::bitflags;
use modsum_symbols::SymbolId;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags! {
    /// Per-function flags, stored on disk as a varint bit mask
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FunctionFlags: u32 {
        /// Reachable from a preserved root (set by the merge engine)
        const LIVE = 1 << 0;
        /// Entry point or externally visible; always a liveness root
        const PRESERVED = 1 << 1;
        /// Body cannot be replaced at runtime
        const FIXED_CONTENTS = 1 << 2;
    }
}

/// How a call site reaches its callee
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    /// Statically bound call
    Direct,
    /// Class method dispatch through a vtable slot
    Virtual,
    /// Protocol requirement dispatch through a witness table
    Witness,
}

impl CallKind {
    /// On-disk encoding
    pub fn as_raw(self) -> u64 {
        match self {
            CallKind::Direct => 0,
            CallKind::Virtual => 1,
            CallKind::Witness => 2,
        }
    }

    /// Decode the on-disk encoding
    pub fn from_raw(raw: u64) -> Option<CallKind> {
        match raw {
            0 => Some(CallKind::Direct),
            1 => Some(CallKind::Virtual),
            2 => Some(CallKind::Witness),
            _ => None,
        }
    }

    /// Lowercase name used in text output
    pub fn as_str(self) -> &'static str {
        match self {
            CallKind::Direct => "direct",
            CallKind::Virtual => "virtual",
            CallKind::Witness => "witness",
        }
    }

    /// Whether the target is only known through a dispatch table
    pub fn is_dynamic(self) -> bool {
        !matches!(self, CallKind::Direct)
    }
}

impl fmt::Display for CallKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A potential call target recorded for a function
///
/// For `Virtual` edges the callee is the implementation found in the
/// statically named receiver's vtable; for `Witness` edges it is the
/// protocol requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallEdge {
    pub callee: SymbolId,
    pub kind: CallKind,
    /// Dispatch must stay dynamic; never devirtualized
    pub preserved: bool,
}

impl CallEdge {
    pub fn new(callee: SymbolId, kind: CallKind) -> Self {
        Self {
            callee,
            kind,
            preserved: false,
        }
    }

    pub fn direct(callee: SymbolId) -> Self {
        Self::new(callee, CallKind::Direct)
    }

    pub fn preserved(mut self) -> Self {
        self.preserved = true;
        self
    }
}

/// Summary of one defined function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSummary {
    id: SymbolId,
    debug_name: Option<String>,
    flags: FunctionFlags,
    calls: Vec<CallEdge>,
}

impl FunctionSummary {
    /// Create a summary with no calls
    pub fn new(id: SymbolId, flags: FunctionFlags) -> Self {
        Self {
            id,
            debug_name: None,
            flags,
            calls: Vec::new(),
        }
    }

    /// Append a call edge (recording order is preserved)
    pub fn add_call(&mut self, edge: CallEdge) {
        self.calls.push(edge);
    }

    pub fn with_call(mut self, edge: CallEdge) -> Self {
        self.add_call(edge);
        self
    }

    pub fn with_debug_name(mut self, name: impl Into<String>) -> Self {
        self.debug_name = Some(name.into());
        self
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn debug_name(&self) -> Option<&str> {
        self.debug_name.as_deref()
    }

    pub fn flags(&self) -> FunctionFlags {
        self.flags
    }

    pub fn calls(&self) -> &[CallEdge] {
        &self.calls
    }

    pub fn is_live(&self) -> bool {
        self.flags.contains(FunctionFlags::LIVE)
    }

    pub fn is_preserved(&self) -> bool {
        self.flags.contains(FunctionFlags::PRESERVED)
    }

    pub fn has_fixed_contents(&self) -> bool {
        self.flags.contains(FunctionFlags::FIXED_CONTENTS)
    }

    /// Set the live flag; returns true on the false -> true transition
    pub(crate) fn mark_live(&mut self) -> bool {
        if self.is_live() {
            return false;
        }
        self.flags.insert(FunctionFlags::LIVE);
        true
    }

    pub(crate) fn set_debug_name(&mut self, name: Option<String>) {
        self.debug_name = name;
    }
}
