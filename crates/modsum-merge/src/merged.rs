//! Union of several summary stores

use crate::diagnostic::{MergeDiagnostic, UnresolvedReason};
use crate::liveness;
use crate::resolve::{NameResolver, Scope};
use crate::trace::LivenessTrace;
use crate::{MergeOptions, COMBINED_MODULE_NAME};
use modsum_summary::{
    CallEdge, CallKind, FunctionSummary, ModuleSummaryStore, SummaryError, SymbolId, TypeSummary,
};
use tracing::{debug, info};

/// Cross-module summary built from several inputs
///
/// Owns the combined store. Inputs are only read while combining.
#[derive(Debug, Clone)]
pub struct MergedStore {
    store: ModuleSummaryStore,
    diagnostics: Vec<MergeDiagnostic>,
    trace: LivenessTrace,
    /// Explanation for [`MergeOptions::trace_symbol`], once propagated
    trace_report: Option<String>,
}

impl MergedStore {
    /// Union the inputs into one store named `combined`
    ///
    /// Functions and types defined by a per-module input are renamed to
    /// `<module>.<name>`. Direct and virtual edges to functions no input
    /// defines are dropped with a diagnostic. A subtype whose vtable is
    /// shorter than its base's inherits the missing entries. Liveness is not
    /// propagated.
    pub fn combine(inputs: &[&ModuleSummaryStore]) -> Self {
        let resolver = NameResolver::new(inputs);
        let mut merged = MergedStore {
            store: ModuleSummaryStore::new(COMBINED_MODULE_NAME),
            diagnostics: Vec::new(),
            trace: LivenessTrace::new(),
            trace_report: None,
        };

        for input in inputs {
            let scope = Scope::new(input);
            debug!(
                module = scope.module_name(),
                functions = input.functions().count(),
                types = input.types().count(),
                "merging module"
            );
            for function in input.functions() {
                merged.add_function(&scope, &resolver, input, function);
            }
            for ty in input.types() {
                merged.add_type(&scope, input, ty);
            }
        }

        // Inputs summarized separately can disagree on a base's vtable length
        for (ty, slot) in merged.store.inherit_missing_slots() {
            let ty = merged.store.symbols().get(ty).unwrap_or("?").to_string();
            merged.push_diagnostic(MergeDiagnostic::InconsistentVtable { ty, slot });
        }

        merged
    }

    /// Run the liveness fixed point; returns how many functions became live
    pub fn propagate_liveness(&mut self, options: &MergeOptions) -> usize {
        let mut diagnostics = Vec::new();
        let marked = liveness::propagate(&mut self.store, &mut self.trace, &mut diagnostics);
        for diagnostic in diagnostics {
            self.push_diagnostic(diagnostic);
        }

        info!(
            live = self.store.functions().filter(|f| f.is_live()).count(),
            newly_live = marked,
            total = self.store.functions().count(),
            "liveness propagated"
        );
        self.trace_report = options
            .trace_symbol
            .as_deref()
            .map(|symbol| self.explain_liveness(symbol));
        marked
    }

    pub fn store(&self) -> &ModuleSummaryStore {
        &self.store
    }

    pub fn into_store(self) -> ModuleSummaryStore {
        self.store
    }

    pub fn diagnostics(&self) -> &[MergeDiagnostic] {
        &self.diagnostics
    }

    pub fn trace(&self) -> &LivenessTrace {
        &self.trace
    }

    /// Whether the function with this merged name is live
    pub fn is_live(&self, name: &str) -> Option<bool> {
        self.store.function_by_name(name).map(FunctionSummary::is_live)
    }

    /// Explanation for the symbol selected by [`MergeOptions::trace_symbol`]
    pub fn trace_report(&self) -> Option<&str> {
        self.trace_report.as_deref()
    }

    /// Why a function is live, as a chain back to a preserved root
    pub fn explain_liveness(&self, name: &str) -> String {
        self.trace.explain(&self.store, name)
    }

    fn add_function(
        &mut self,
        scope: &Scope<'_>,
        resolver: &NameResolver,
        input: &ModuleSummaryStore,
        function: &FunctionSummary,
    ) {
        let Some(local) = self.input_name(input, function.id()) else {
            return;
        };
        let name = scope.qualify(local);
        let id = self.store.intern(&name);
        let mut summary = FunctionSummary::new(id, function.flags());
        if let Some(debug_name) = function.debug_name() {
            summary = summary.with_debug_name(debug_name);
        }

        for edge in function.calls() {
            let Some(reference) = self.input_name(input, edge.callee) else {
                continue;
            };
            let callee = scope.resolve(reference);
            if edge.kind != CallKind::Witness && !resolver.is_function(&callee) {
                self.push_diagnostic(MergeDiagnostic::UnresolvedEdge {
                    caller: name.clone(),
                    callee,
                    kind: edge.kind,
                    reason: UnresolvedReason::UndefinedCallee,
                });
                continue;
            }
            summary.add_call(CallEdge {
                callee: self.store.intern(&callee),
                ..*edge
            });
        }

        let result = self.store.insert_function(summary);
        self.check_inserted(input, result, name);
    }

    fn add_type(&mut self, scope: &Scope<'_>, input: &ModuleSummaryStore, ty: &TypeSummary) {
        let Some(local) = self.input_name(input, ty.id) else {
            return;
        };
        let name = scope.qualify(local);
        let mut summary = TypeSummary::new(self.store.intern(&name));

        if let Some(base) = ty.base {
            summary.base = self.resolve_into(scope, input, base);
        }
        for &slot in &ty.vtable_slots {
            // Dropping a slot would shift every slot after it
            let Some(slot) = self.resolve_into(scope, input, slot) else {
                return;
            };
            summary.vtable_slots.push(slot);
        }
        for (&requirement, &implementation) in &ty.witness_entries {
            let requirement = self.resolve_into(scope, input, requirement);
            let implementation = self.resolve_into(scope, input, implementation);
            if let (Some(requirement), Some(implementation)) = (requirement, implementation) {
                summary.witness_entries.insert(requirement, implementation);
            }
        }

        let result = self.store.insert_type(summary);
        self.check_inserted(input, result, name);
    }

    fn check_inserted(
        &mut self,
        input: &ModuleSummaryStore,
        result: Result<(), SummaryError>,
        name: String,
    ) {
        match result {
            Ok(()) => {}
            Err(SummaryError::DuplicateDefinition { .. }) => {
                self.push_diagnostic(MergeDiagnostic::DuplicateDefinition {
                    name,
                    module: input.module_name().to_string(),
                });
            }
            Err(err) => debug!(error = %err, definition = %name, "skipping definition"),
        }
    }

    /// Resolve a reference from `input` and intern it in the merged table
    fn resolve_into(
        &mut self,
        scope: &Scope<'_>,
        input: &ModuleSummaryStore,
        id: SymbolId,
    ) -> Option<SymbolId> {
        let reference = self.input_name(input, id)?;
        let resolved = scope.resolve(reference);
        Some(self.store.intern(&resolved))
    }

    fn input_name<'a>(&mut self, input: &'a ModuleSummaryStore, id: SymbolId) -> Option<&'a str> {
        let name = input.symbols().get(id);
        if name.is_none() {
            self.push_diagnostic(MergeDiagnostic::DanglingSymbol {
                module: input.module_name().to_string(),
                id,
            });
        }
        name
    }

    fn push_diagnostic(&mut self, diagnostic: MergeDiagnostic) {
        if !self.diagnostics.contains(&diagnostic) {
            debug!(code = diagnostic.code(), "{diagnostic}");
            self.diagnostics.push(diagnostic);
        }
    }
}
