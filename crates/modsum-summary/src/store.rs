//! The per-module summary aggregate

use crate::{FunctionSummary, ModuleSummaryStoreBuilder, SummaryError, TypeSummary};
use modsum_symbols::{SymbolError, SymbolId, SymbolTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one compiled module, or of a merged set of modules
///
/// Functions and types are keyed by [`SymbolId`] from the store's own
/// [`SymbolTable`]. Once inserted, summaries are read-only except for the
/// live flag, which only moves from false to true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSummaryStore {
    module_name: String,
    /// Set once a liveness fixed point has been computed for this store
    liveness_computed: bool,
    functions: BTreeMap<SymbolId, FunctionSummary>,
    types: BTreeMap<SymbolId, TypeSummary>,
    symbols: SymbolTable,
}

impl ModuleSummaryStore {
    /// Create an empty store
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            liveness_computed: false,
            functions: BTreeMap::new(),
            types: BTreeMap::new(),
            symbols: SymbolTable::new(),
        }
    }

    /// Start summarizing a module
    pub fn begin_module(module_name: impl Into<String>) -> ModuleSummaryStoreBuilder {
        ModuleSummaryStoreBuilder::new(Self::new(module_name))
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Intern a name in this store's table
    pub fn intern(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    /// Name of an interned symbol
    pub fn name_of(&self, id: SymbolId) -> Result<&str, SymbolError> {
        self.symbols.resolve(id)
    }

    pub fn is_liveness_computed(&self) -> bool {
        self.liveness_computed
    }

    /// Record that liveness flags reflect a completed fixed point
    pub fn mark_liveness_computed(&mut self) {
        self.liveness_computed = true;
    }

    /// Insert a function summary
    ///
    /// The function and all of its callees must already be interned.
    pub fn insert_function(&mut self, summary: FunctionSummary) -> Result<(), SummaryError> {
        self.check_interned(summary.id())?;
        for call in summary.calls() {
            self.check_interned(call.callee)?;
        }
        if self.functions.contains_key(&summary.id()) {
            return Err(SummaryError::DuplicateDefinition {
                name: self.symbols.resolve(summary.id())?.to_string(),
            });
        }

        self.functions.insert(summary.id(), summary);
        Ok(())
    }

    /// Insert a type summary
    ///
    /// The type and every symbol it references must already be interned.
    pub fn insert_type(&mut self, summary: TypeSummary) -> Result<(), SummaryError> {
        self.check_interned(summary.id)?;
        for id in summary.referenced_symbols() {
            self.check_interned(id)?;
        }
        if self.types.contains_key(&summary.id) {
            return Err(SummaryError::DuplicateDefinition {
                name: self.symbols.resolve(summary.id)?.to_string(),
            });
        }

        self.types.insert(summary.id, summary);
        Ok(())
    }

    /// Attach or clear a function's debug name
    pub fn set_debug_name(
        &mut self,
        function: SymbolId,
        name: Option<String>,
    ) -> Result<(), SummaryError> {
        self.functions
            .get_mut(&function)
            .ok_or(SummaryError::UnknownFunction { id: function })?
            .set_debug_name(name);
        Ok(())
    }

    /// Mark a function live; returns true if it was not live before
    ///
    /// Liveness is monotonic: there is no way to clear the flag.
    pub fn mark_live(&mut self, function: SymbolId) -> Result<bool, SummaryError> {
        self.functions
            .get_mut(&function)
            .map(FunctionSummary::mark_live)
            .ok_or(SummaryError::UnknownFunction { id: function })
    }

    /// Get a function by ID
    pub fn function(&self, id: SymbolId) -> Option<&FunctionSummary> {
        self.functions.get(&id)
    }

    /// Get a function by name
    pub fn function_by_name(&self, name: &str) -> Option<&FunctionSummary> {
        self.symbols.lookup(name).and_then(|id| self.function(id))
    }

    /// Get a type by ID
    pub fn type_summary(&self, id: SymbolId) -> Option<&TypeSummary> {
        self.types.get(&id)
    }

    /// Get a type by name
    pub fn type_by_name(&self, name: &str) -> Option<&TypeSummary> {
        self.symbols.lookup(name).and_then(|id| self.type_summary(id))
    }

    /// Iterate over functions in ID order
    pub fn functions(&self) -> impl Iterator<Item = &FunctionSummary> {
        self.functions.values()
    }

    /// Iterate over types in ID order
    pub fn types(&self) -> impl Iterator<Item = &TypeSummary> {
        self.types.values()
    }

    /// Whether a function is recorded under this ID
    pub fn defines_function(&self, id: SymbolId) -> bool {
        self.functions.contains_key(&id)
    }

    /// Whether a function or type is recorded under this name
    pub fn defines(&self, name: &str) -> bool {
        self.symbols
            .lookup(name)
            .is_some_and(|id| self.functions.contains_key(&id) || self.types.contains_key(&id))
    }

    /// Check that no derived vtable is shorter than its base's
    ///
    /// Only bases recorded in this store are checked; a base defined in
    /// another module is not visible here.
    pub fn check_vtables(&self) -> Result<(), SummaryError> {
        for ty in self.types.values() {
            if let Some(base) = ty.base.and_then(|base| self.types.get(&base)) {
                if ty.vtable_slots.len() < base.vtable_slots.len() {
                    return Err(self.short_vtable(
                        ty.id,
                        ty.vtable_slots.len(),
                        base.id,
                        base.vtable_slots.len(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Extend each derived vtable shorter than its base with the base's entries
    ///
    /// Returns `(type, slot)` naming the first inherited slot of every
    /// extended type. Afterwards [`check_vtables`](Self::check_vtables)
    /// succeeds.
    pub fn inherit_missing_slots(&mut self) -> Vec<(SymbolId, usize)> {
        let mut extended: Vec<(SymbolId, usize)> = Vec::new();
        loop {
            let short: Vec<(SymbolId, Vec<SymbolId>)> = self
                .types
                .values()
                .filter_map(|ty| {
                    let base = self.types.get(&ty.base?)?;
                    let len = ty.vtable_slots.len();
                    base.vtable_slots
                        .get(len..)
                        .filter(|rest| !rest.is_empty())
                        .map(|rest| (ty.id, rest.to_vec()))
                })
                .collect();
            if short.is_empty() {
                return extended;
            }

            for (id, inherited) in short {
                if let Some(ty) = self.types.get_mut(&id) {
                    if !extended.iter().any(|(seen, _)| *seen == id) {
                        extended.push((id, ty.vtable_slots.len()));
                    }
                    ty.vtable_slots.extend(inherited);
                }
            }
        }
    }

    /// Copy of this store with every debug name removed
    ///
    /// This is what a round trip through an encoding without debug names
    /// produces.
    pub fn without_debug_names(&self) -> Self {
        let mut stripped = self.clone();
        for summary in stripped.functions.values_mut() {
            summary.set_debug_name(None);
        }
        stripped
    }

    pub(crate) fn function_entry_mut(
        &mut self,
        id: SymbolId,
    ) -> Result<&mut FunctionSummary, SummaryError> {
        self.functions
            .get_mut(&id)
            .ok_or(SummaryError::UnknownFunction { id })
    }

    pub(crate) fn type_entry_mut(&mut self, id: SymbolId) -> Result<&mut TypeSummary, SummaryError> {
        self.types.get_mut(&id).ok_or(SummaryError::UnknownType { id })
    }

    pub(crate) fn short_vtable(
        &self,
        id: SymbolId,
        slots: usize,
        base: SymbolId,
        base_slots: usize,
    ) -> SummaryError {
        let name = |id: SymbolId| self.symbols.get(id).unwrap_or("?").to_string();
        SummaryError::VtableShorterThanBase {
            name: name(id),
            base: name(base),
            slots,
            base_slots,
        }
    }

    fn check_interned(&self, id: SymbolId) -> Result<(), SummaryError> {
        if self.symbols.contains(id) {
            Ok(())
        } else {
            Err(SummaryError::UnknownSymbol { id })
        }
    }
}
