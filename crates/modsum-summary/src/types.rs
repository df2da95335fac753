//! Type summaries: dispatch tables for classes and conformances

use modsum_symbols::SymbolId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dispatch information for one nominal type
///
/// `vtable_slots[i]` is the implementation occupying slot `i`. A subclass
/// repeats its base's slots in the same positions, replacing overridden
/// entries and appending its own new methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub id: SymbolId,
    /// Superclass, if any
    pub base: Option<SymbolId>,
    pub vtable_slots: Vec<SymbolId>,
    /// Protocol requirement -> implementation
    pub witness_entries: BTreeMap<SymbolId, SymbolId>,
}

impl TypeSummary {
    pub fn new(id: SymbolId) -> Self {
        Self {
            id,
            base: None,
            vtable_slots: Vec::new(),
            witness_entries: BTreeMap::new(),
        }
    }

    pub fn with_base(mut self, base: SymbolId) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_slots(mut self, slots: Vec<SymbolId>) -> Self {
        self.vtable_slots = slots;
        self
    }

    pub fn with_witness(mut self, requirement: SymbolId, implementation: SymbolId) -> Self {
        self.witness_entries.insert(requirement, implementation);
        self
    }

    /// Slot indices holding the given implementation
    pub fn slots_of(&self, implementation: SymbolId) -> impl Iterator<Item = usize> + '_ {
        self.vtable_slots
            .iter()
            .enumerate()
            .filter(move |(_, slot)| **slot == implementation)
            .map(|(index, _)| index)
    }

    /// Every symbol this type refers to
    pub fn referenced_symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.base
            .into_iter()
            .chain(self.vtable_slots.iter().copied())
            .chain(
                self.witness_entries
                    .iter()
                    .flat_map(|(requirement, implementation)| [*requirement, *implementation]),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_of_finds_every_position() {
        let ty = TypeSummary::new(SymbolId(1)).with_slots(vec![SymbolId(4), SymbolId(5), SymbolId(4)]);

        let slots: Vec<_> = ty.slots_of(SymbolId(4)).collect();
        assert_eq!(slots, vec![0, 2]);
        assert_eq!(ty.slots_of(SymbolId(9)).count(), 0);
    }

    #[test]
    fn test_referenced_symbols_include_base_and_witnesses() {
        let ty = TypeSummary::new(SymbolId(1))
            .with_base(SymbolId(2))
            .with_slots(vec![SymbolId(3)])
            .with_witness(SymbolId(4), SymbolId(5));

        let refs: Vec<_> = ty.referenced_symbols().collect();
        assert_eq!(refs, vec![SymbolId(2), SymbolId(3), SymbolId(4), SymbolId(5)]);
    }
}
