//! Read-only queries against a merged store

use crate::UsageError;
use modsum_merge::DispatchIndex;
use modsum_summary::{CallEdge, FunctionSummary, ModuleSummaryStore, SymbolId};

/// A dispatch table entry whose implementation is dead
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeadTableEntry {
    VtableSlot {
        ty: SymbolId,
        slot: usize,
        implementation: SymbolId,
    },
    Witness {
        ty: SymbolId,
        requirement: SymbolId,
        implementation: SymbolId,
    },
}

impl DeadTableEntry {
    pub fn implementation(&self) -> SymbolId {
        match self {
            DeadTableEntry::VtableSlot { implementation, .. }
            | DeadTableEntry::Witness { implementation, .. } => *implementation,
        }
    }
}

/// Query facade over one store
///
/// Liveness questions require a store whose liveness has been computed by
/// a merge; asking earlier is a [`UsageError::NotMerged`].
pub struct SummaryQuery<'a> {
    store: &'a ModuleSummaryStore,
    dispatch: DispatchIndex,
}

impl<'a> SummaryQuery<'a> {
    pub fn new(store: &'a ModuleSummaryStore) -> Self {
        Self {
            store,
            dispatch: DispatchIndex::build(store),
        }
    }

    pub fn store(&self) -> &'a ModuleSummaryStore {
        self.store
    }

    /// Whether a symbol is a live function
    ///
    /// Interned symbols that are not functions (types, requirements,
    /// external callees) are never live.
    pub fn is_live(&self, id: SymbolId) -> Result<bool, UsageError> {
        self.require_merged()?;
        self.require_interned(id)?;
        Ok(self.store.function(id).is_some_and(FunctionSummary::is_live))
    }

    /// The single implementation a call can be bound to statically
    ///
    /// Returns the sole live candidate of a virtual or witness edge, the
    /// callee of a direct edge if it is live, and `None` for edges whose
    /// dispatch is preserved or which have zero or several live candidates.
    pub fn resolve_devirtualizable(&self, edge: &CallEdge) -> Result<Option<SymbolId>, UsageError> {
        self.require_merged()?;
        self.require_interned(edge.callee)?;
        if edge.preserved {
            return Ok(None);
        }

        let targets = self.dispatch.targets(self.store, edge);
        let mut live = targets
            .implementations
            .into_iter()
            .filter(|id| self.function_is_live(*id));

        match (live.next(), live.next()) {
            (Some(only), None) => Ok(Some(only)),
            _ => Ok(None),
        }
    }

    /// Functions left dead after liveness propagation, in ID order
    pub fn dead_functions(&self) -> Result<Vec<SymbolId>, UsageError> {
        self.require_merged()?;
        Ok(self
            .store
            .functions()
            .filter(|f| !f.is_live())
            .map(FunctionSummary::id)
            .collect())
    }

    /// Vtable slots and witness entries that only point at dead functions
    ///
    /// Implementations not defined in the store are assumed live.
    pub fn dead_table_entries(&self) -> Result<Vec<DeadTableEntry>, UsageError> {
        self.require_merged()?;
        let mut entries = Vec::new();
        for ty in self.store.types() {
            for (slot, &implementation) in ty.vtable_slots.iter().enumerate() {
                if self.is_dead_function(implementation) {
                    entries.push(DeadTableEntry::VtableSlot {
                        ty: ty.id,
                        slot,
                        implementation,
                    });
                }
            }
            for (&requirement, &implementation) in &ty.witness_entries {
                if self.is_dead_function(implementation) {
                    entries.push(DeadTableEntry::Witness {
                        ty: ty.id,
                        requirement,
                        implementation,
                    });
                }
            }
        }
        Ok(entries)
    }

    /// Number of live functions
    pub fn live_count(&self) -> usize {
        self.store.functions().filter(|f| f.is_live()).count()
    }

    fn function_is_live(&self, id: SymbolId) -> bool {
        self.store.function(id).is_some_and(FunctionSummary::is_live)
    }

    fn is_dead_function(&self, id: SymbolId) -> bool {
        self.store.function(id).is_some_and(|f| !f.is_live())
    }

    fn require_merged(&self) -> Result<(), UsageError> {
        if self.store.is_liveness_computed() {
            Ok(())
        } else {
            Err(UsageError::NotMerged {
                module: self.store.module_name().to_string(),
            })
        }
    }

    fn require_interned(&self, id: SymbolId) -> Result<(), UsageError> {
        if self.store.symbols().contains(id) {
            Ok(())
        } else {
            Err(UsageError::UnknownSymbol { id })
        }
    }
}
