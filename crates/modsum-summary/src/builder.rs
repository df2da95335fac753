//! Front-end interface for summarizing one module

use crate::{CallEdge, CallKind, FunctionFlags, FunctionSummary, ModuleSummaryStore, SummaryError, TypeSummary};
use modsum_symbols::SymbolId;
use tracing::trace;

/// Incrementally records functions and types for one module
///
/// Names are interned into the store's symbol table as they are recorded;
/// callees and vtable entries may name symbols defined elsewhere.
#[derive(Debug)]
pub struct ModuleSummaryStoreBuilder {
    store: ModuleSummaryStore,
}

impl ModuleSummaryStoreBuilder {
    pub(crate) fn new(store: ModuleSummaryStore) -> Self {
        Self { store }
    }

    /// Record a defined function
    pub fn record_function(
        &mut self,
        name: &str,
        flags: FunctionFlags,
    ) -> Result<SymbolId, SummaryError> {
        let id = self.store.intern(name);
        self.store.insert_function(FunctionSummary::new(id, flags))?;
        trace!(module = %self.store.module_name(), function = name, "recorded function");
        Ok(id)
    }

    /// Attach a human-readable name to a recorded function
    pub fn set_debug_name(
        &mut self,
        function: SymbolId,
        name: impl Into<String>,
    ) -> Result<(), SummaryError> {
        self.store.set_debug_name(function, Some(name.into()))
    }

    /// Record a call site in a recorded function
    pub fn record_call(
        &mut self,
        caller: SymbolId,
        callee: &str,
        kind: CallKind,
    ) -> Result<(), SummaryError> {
        self.push_call(caller, callee, kind, false)
    }

    /// Record a call site whose dispatch must stay dynamic
    pub fn record_preserved_call(
        &mut self,
        caller: SymbolId,
        callee: &str,
        kind: CallKind,
    ) -> Result<(), SummaryError> {
        self.push_call(caller, callee, kind, true)
    }

    /// Record a type and its vtable
    ///
    /// When both the type and its base are recorded, the derived vtable must
    /// have at least as many slots as the base one.
    pub fn record_type(
        &mut self,
        name: &str,
        base: Option<&str>,
        vtable: &[&str],
    ) -> Result<SymbolId, SummaryError> {
        let id = self.store.intern(name);
        let base = base.map(|base| self.store.intern(base));
        let slots: Vec<SymbolId> = vtable.iter().map(|slot| self.store.intern(slot)).collect();

        if let Some(base_ty) = base.and_then(|base| self.store.type_summary(base)) {
            self.check_slot_count(id, slots.len(), base_ty)?;
        }
        let derived: Vec<&TypeSummary> = self
            .store
            .types()
            .filter(|ty| ty.base == Some(id))
            .collect();
        for ty in derived {
            if ty.vtable_slots.len() < slots.len() {
                return Err(self
                    .store
                    .short_vtable(ty.id, ty.vtable_slots.len(), id, slots.len()));
            }
        }

        let mut summary = TypeSummary::new(id).with_slots(slots);
        summary.base = base;
        self.store.insert_type(summary)?;
        Ok(id)
    }

    /// Record that `ty` satisfies `requirement` with `implementation`
    pub fn record_witness(
        &mut self,
        ty: SymbolId,
        requirement: &str,
        implementation: &str,
    ) -> Result<(), SummaryError> {
        let requirement = self.store.intern(requirement);
        let implementation = self.store.intern(implementation);
        self.store
            .type_entry_mut(ty)?
            .witness_entries
            .insert(requirement, implementation);
        Ok(())
    }

    /// Finish summarizing and hand over the store
    pub fn finish(self) -> ModuleSummaryStore {
        self.store
    }

    fn push_call(
        &mut self,
        caller: SymbolId,
        callee: &str,
        kind: CallKind,
        preserved: bool,
    ) -> Result<(), SummaryError> {
        if !self.store.defines_function(caller) {
            return Err(if self.store.symbols().contains(caller) {
                SummaryError::UnknownFunction { id: caller }
            } else {
                SummaryError::UnknownSymbol { id: caller }
            });
        }
        let callee = self.store.intern(callee);
        let edge = CallEdge {
            callee,
            kind,
            preserved,
        };
        self.store.function_entry_mut(caller)?.add_call(edge);
        Ok(())
    }

    fn check_slot_count(
        &self,
        id: SymbolId,
        slots: usize,
        base: &TypeSummary,
    ) -> Result<(), SummaryError> {
        if slots < base.vtable_slots.len() {
            return Err(self
                .store
                .short_vtable(id, slots, base.id, base.vtable_slots.len()));
        }
        Ok(())
    }
}
