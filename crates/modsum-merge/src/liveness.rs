//! Worklist fixed point over the merged call graph

use crate::dispatch::DispatchIndex;
use crate::trace::{LiveReason, LivenessTrace};
use crate::{MergeDiagnostic, UnresolvedReason};
use modsum_summary::{CallEdge, CallKind, ModuleSummaryStore, SymbolId};
use std::collections::VecDeque;
use tracing::{debug, trace};

/// Mark everything reachable from the roots live
///
/// Roots are preserved functions and functions already live in the store.
/// A function is enqueued only when its flag flips, so each is processed
/// once and the loop terminates on cyclic graphs. Returns the number of
/// functions newly marked live.
pub(crate) fn propagate(
    store: &mut ModuleSummaryStore,
    trace_log: &mut LivenessTrace,
    diagnostics: &mut Vec<MergeDiagnostic>,
) -> usize {
    let index = DispatchIndex::build(store);
    let mut worklist = VecDeque::new();
    let mut marked = 0;

    let roots: Vec<(SymbolId, bool)> = store
        .functions()
        .filter(|f| f.is_preserved() || f.is_live())
        .map(|f| (f.id(), f.is_preserved()))
        .collect();
    for (root, preserved) in roots {
        if store.mark_live(root).unwrap_or(false) {
            marked += 1;
        }
        let reason = if preserved {
            LiveReason::Preserved
        } else {
            LiveReason::LiveInInput
        };
        trace_log.record(root, reason);
        worklist.push_back(root);
    }

    while let Some(caller) = worklist.pop_front() {
        let calls: Vec<CallEdge> = store
            .function(caller)
            .map(|f| f.calls().to_vec())
            .unwrap_or_default();

        for edge in calls {
            let targets = index.targets(store, &edge);
            if !targets.resolved {
                diagnostics.push(MergeDiagnostic::UnresolvedEdge {
                    caller: symbol_name(store, caller),
                    callee: symbol_name(store, edge.callee),
                    kind: edge.kind,
                    reason: UnresolvedReason::NoDispatchEntry,
                });
            }

            let reason = match edge.kind {
                CallKind::Direct => LiveReason::StaticRef { from: caller },
                CallKind::Virtual | CallKind::Witness => LiveReason::IndirectRef { from: caller },
            };
            for target in targets.implementations {
                match store.mark_live(target) {
                    Ok(true) => {
                        debug!(function = %symbol_name(store, target), kind = %edge.kind, "marked live");
                        trace_log.record(target, reason);
                        worklist.push_back(target);
                        marked += 1;
                    }
                    Ok(false) => {}
                    Err(_) => {
                        trace!(symbol = %symbol_name(store, target), "target is not a defined function");
                    }
                }
            }
        }
    }

    store.mark_liveness_computed();
    marked
}

fn symbol_name(store: &ModuleSummaryStore, id: SymbolId) -> String {
    store
        .symbols()
        .get(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}
