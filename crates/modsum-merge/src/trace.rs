//! Record of why each function became live

use modsum_summary::{ModuleSummaryStore, SymbolId};
use std::collections::{HashMap, HashSet};
use std::fmt::Write;

/// How a function became live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveReason {
    /// Flagged preserved: a liveness root
    Preserved,
    /// Already live in an input store
    LiveInInput,
    /// Called directly from `from`
    StaticRef { from: SymbolId },
    /// Reached through a vtable or witness table from `from`
    IndirectRef { from: SymbolId },
}

impl LiveReason {
    /// The function whose edge caused this one to be marked
    pub fn referrer(self) -> Option<SymbolId> {
        match self {
            LiveReason::StaticRef { from } | LiveReason::IndirectRef { from } => Some(from),
            LiveReason::Preserved | LiveReason::LiveInInput => None,
        }
    }
}

/// First reason recorded for every live function
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivenessTrace {
    reasons: HashMap<SymbolId, LiveReason>,
}

impl LivenessTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason; the first one recorded for a function is kept
    pub fn record(&mut self, function: SymbolId, reason: LiveReason) {
        self.reasons.entry(function).or_insert(reason);
    }

    pub fn reason(&self, function: SymbolId) -> Option<LiveReason> {
        self.reasons.get(&function).copied()
    }

    pub fn len(&self) -> usize {
        self.reasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    /// The chain of referrers from `function` back to a root
    pub fn chain(&self, function: SymbolId) -> Vec<(SymbolId, LiveReason)> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = function;
        while let Some(reason) = self.reason(current) {
            if !seen.insert(current) {
                break;
            }
            chain.push((current, reason));
            match reason.referrer() {
                Some(from) => current = from,
                None => break,
            }
        }
        chain
    }

    /// Human-readable explanation of why `name` is live or dead
    pub fn explain(&self, store: &ModuleSummaryStore, name: &str) -> String {
        let Some(function) = store.function_by_name(name) else {
            return format!("no function named '{name}'\n");
        };
        let chain = self.chain(function.id());
        if chain.is_empty() {
            return format!("'{name}' is dead\n");
        }

        let display = |id: SymbolId| store.symbols().get(id).unwrap_or("<unknown>");
        let mut out = format!("'{name}' is live:\n");
        for (id, reason) in chain {
            let line = match reason {
                LiveReason::Preserved => format!("  {} is preserved", display(id)),
                LiveReason::LiveInInput => format!("  {} was already live", display(id)),
                LiveReason::StaticRef { from } => {
                    format!("  {} is called from {}", display(id), display(from))
                }
                LiveReason::IndirectRef { from } => {
                    format!("  {} is dispatched to from {}", display(id), display(from))
                }
            };
            let _ = writeln!(out, "{line}");
        }
        out
    }
}
