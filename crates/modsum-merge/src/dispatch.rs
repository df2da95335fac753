//! Dispatch table index: which implementations a dynamic call may reach

use modsum_summary::{CallEdge, CallKind, ModuleSummaryStore, SymbolId};
use std::collections::{HashMap, HashSet};

/// Implementations an edge may reach at runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTargets {
    /// Candidate implementations, sorted and deduplicated
    pub implementations: Vec<SymbolId>,
    /// False if a dynamic edge matched no vtable slot or witness entry
    pub resolved: bool,
}

/// Reverse indexes over a store's type summaries
#[derive(Debug, Clone, Default)]
pub struct DispatchIndex {
    /// Base type -> types naming it as their base
    subtypes: HashMap<SymbolId, Vec<SymbolId>>,
    /// Implementation -> every `(type, slot)` holding it
    slot_owners: HashMap<SymbolId, Vec<(SymbolId, usize)>>,
    /// Protocol requirement -> every conformance's implementation
    witnesses: HashMap<SymbolId, Vec<SymbolId>>,
}

impl DispatchIndex {
    pub fn build(store: &ModuleSummaryStore) -> Self {
        let mut index = DispatchIndex::default();
        for ty in store.types() {
            if let Some(base) = ty.base {
                index.subtypes.entry(base).or_default().push(ty.id);
            }
            for (slot, implementation) in ty.vtable_slots.iter().enumerate() {
                index
                    .slot_owners
                    .entry(*implementation)
                    .or_default()
                    .push((ty.id, slot));
            }
            for (requirement, implementation) in &ty.witness_entries {
                index
                    .witnesses
                    .entry(*requirement)
                    .or_default()
                    .push(*implementation);
            }
        }
        index
    }

    /// Every transitive subtype of `ty`, not including `ty` itself
    pub fn subtypes_of(&self, ty: SymbolId) -> Vec<SymbolId> {
        let mut seen = HashSet::from([ty]);
        let mut stack = vec![ty];
        let mut result = Vec::new();
        while let Some(current) = stack.pop() {
            for &sub in self.subtypes.get(&current).into_iter().flatten() {
                if seen.insert(sub) {
                    result.push(sub);
                    stack.push(sub);
                }
            }
        }
        result.sort();
        result
    }

    /// `(type, slot)` pairs holding an implementation
    pub fn slot_owners(&self, implementation: SymbolId) -> &[(SymbolId, usize)] {
        self.slot_owners
            .get(&implementation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Implementations of a protocol requirement across all conformances
    pub fn witness_implementations(&self, requirement: SymbolId) -> &[SymbolId] {
        self.witnesses
            .get(&requirement)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Implementations an edge may reach
    ///
    /// A virtual edge names the implementation in the statically known
    /// receiver's vtable. Every slot holding it, in that type and in every
    /// subtype, is a candidate. A witness edge conservatively reaches every
    /// conformance's implementation of its requirement.
    pub fn targets(&self, store: &ModuleSummaryStore, edge: &CallEdge) -> DispatchTargets {
        let mut targets = DispatchTargets {
            resolved: true,
            ..DispatchTargets::default()
        };

        match edge.kind {
            CallKind::Direct => targets.implementations.push(edge.callee),
            CallKind::Virtual => {
                let owners = self.slot_owners(edge.callee);
                targets.resolved = !owners.is_empty();
                targets.implementations.push(edge.callee);
                for &(ty, slot) in owners {
                    for sub in self.subtypes_of(ty) {
                        let entry = store
                            .type_summary(sub)
                            .and_then(|summary| summary.vtable_slots.get(slot));
                        if let Some(implementation) = entry {
                            targets.implementations.push(*implementation);
                        }
                    }
                }
            }
            CallKind::Witness => {
                let implementations = self.witness_implementations(edge.callee);
                targets.resolved = !implementations.is_empty();
                targets.implementations.extend_from_slice(implementations);
            }
        }

        targets.implementations.sort();
        targets.implementations.dedup();
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modsum_summary::{FunctionFlags, TypeSummary};

    /// `A { a.f }`, `B: A { b.f }`, `C: B { c.f, c.g }`, `D: A { d.f }`
    fn make_hierarchy() -> ModuleSummaryStore {
        let mut builder = ModuleSummaryStore::begin_module("m");
        for name in ["a.f", "b.f", "c.f", "c.g", "d.f"] {
            builder.record_function(name, FunctionFlags::empty()).unwrap();
        }
        builder.record_type("A", None, &["a.f"]).unwrap();
        builder.record_type("B", Some("A"), &["b.f"]).unwrap();
        builder.record_type("C", Some("B"), &["c.f", "c.g"]).unwrap();
        builder.record_type("D", Some("A"), &["d.f"]).unwrap();
        builder.finish()
    }

    fn id(store: &ModuleSummaryStore, name: &str) -> SymbolId {
        store.symbols().lookup(name).unwrap()
    }

    #[test]
    fn test_subtypes_are_transitive() {
        let store = make_hierarchy();
        let index = DispatchIndex::build(&store);

        let subs = index.subtypes_of(id(&store, "A"));
        assert_eq!(subs.len(), 3);
        assert!(subs.contains(&id(&store, "C")));
        assert!(index.subtypes_of(id(&store, "C")).is_empty());
    }

    #[test]
    fn test_virtual_targets_include_overrides() {
        let store = make_hierarchy();
        let index = DispatchIndex::build(&store);
        let edge = CallEdge::new(id(&store, "b.f"), CallKind::Virtual);

        let targets = index.targets(&store, &edge);
        let mut expected = vec![id(&store, "b.f"), id(&store, "c.f")];
        expected.sort();
        assert_eq!(targets.implementations, expected);
        assert!(targets.resolved);
    }

    #[test]
    fn test_virtual_edge_outside_any_vtable() {
        let store = make_hierarchy();
        let index = DispatchIndex::build(&store);
        let edge = CallEdge::new(id(&store, "c.g"), CallKind::Virtual);
        assert!(index.targets(&store, &edge).resolved);

        let mut builder = ModuleSummaryStore::begin_module("m");
        let f = builder.record_function("f", FunctionFlags::empty()).unwrap();
        let store = builder.finish();
        let edge = CallEdge::new(f, CallKind::Virtual);
        let targets = DispatchIndex::build(&store).targets(&store, &edge);
        assert!(!targets.resolved);
        assert_eq!(targets.implementations, vec![f]);
    }

    #[test]
    fn test_base_cycle_terminates() {
        let mut store = ModuleSummaryStore::new("m");
        let a = store.intern("A");
        let b = store.intern("B");
        store.insert_type(TypeSummary::new(a).with_base(b)).unwrap();
        store.insert_type(TypeSummary::new(b).with_base(a)).unwrap();

        let index = DispatchIndex::build(&store);
        assert_eq!(index.subtypes_of(a), vec![b]);
    }
}
