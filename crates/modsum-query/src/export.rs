//! Deterministic YAML rendering of a store, and the reverse
//!
//! Functions and types are sorted by name, and every reference is written
//! as a name, so the text does not depend on interning order.

use crate::ExportError;
use modsum_summary::{
    CallEdge, CallKind, FunctionFlags, FunctionSummary, ModuleSummaryStore, SymbolId, TypeSummary,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// First line of every export
pub const YAML_HEADER: &str = "# Module-summary v1";

#[derive(Debug, Serialize, Deserialize)]
struct YamlModule {
    module_name: String,
    #[serde(default)]
    liveness_computed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    functions: Vec<YamlFunction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    types: Vec<YamlType>,
}

#[derive(Debug, Serialize, Deserialize)]
struct YamlFunction {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    debug_name: Option<String>,
    #[serde(default)]
    live: bool,
    #[serde(default)]
    preserved: bool,
    #[serde(default)]
    fixed_contents: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    calls: Vec<YamlCall>,
}

#[derive(Debug, Serialize, Deserialize)]
struct YamlCall {
    callee: String,
    kind: CallKind,
    #[serde(default)]
    preserved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct YamlType {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    vtable: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    witnesses: Vec<YamlWitness>,
}

#[derive(Debug, Serialize, Deserialize)]
struct YamlWitness {
    requirement: String,
    implementation: String,
}

/// Render a store as YAML
pub fn export_yaml(store: &ModuleSummaryStore) -> Result<String, ExportError> {
    let mut functions: Vec<YamlFunction> = store
        .functions()
        .map(|function| YamlFunction {
            name: symbol_name(store, function.id()),
            debug_name: function.debug_name().map(str::to_string),
            live: function.is_live(),
            preserved: function.is_preserved(),
            fixed_contents: function.has_fixed_contents(),
            calls: function
                .calls()
                .iter()
                .map(|edge| YamlCall {
                    callee: symbol_name(store, edge.callee),
                    kind: edge.kind,
                    preserved: edge.preserved,
                })
                .collect(),
        })
        .collect();
    functions.sort_by(|a, b| a.name.cmp(&b.name));

    let mut types: Vec<YamlType> = store
        .types()
        .map(|ty| {
            let mut witnesses: Vec<YamlWitness> = ty
                .witness_entries
                .iter()
                .map(|(requirement, implementation)| YamlWitness {
                    requirement: symbol_name(store, *requirement),
                    implementation: symbol_name(store, *implementation),
                })
                .collect();
            witnesses.sort_by(|a, b| a.requirement.cmp(&b.requirement));
            YamlType {
                name: symbol_name(store, ty.id),
                base: ty.base.map(|base| symbol_name(store, base)),
                vtable: ty
                    .vtable_slots
                    .iter()
                    .map(|slot| symbol_name(store, *slot))
                    .collect(),
                witnesses,
            }
        })
        .collect();
    types.sort_by(|a, b| a.name.cmp(&b.name));

    let module = YamlModule {
        module_name: store.module_name().to_string(),
        liveness_computed: store.is_liveness_computed(),
        functions,
        types,
    };
    let body = serde_yaml::to_string(&module)?;
    Ok(format!("{YAML_HEADER}\n{body}"))
}

fn symbol_name(store: &ModuleSummaryStore, id: SymbolId) -> String {
    store
        .symbols()
        .get(id)
        .map(str::to_string)
        .unwrap_or_else(|| id.to_string())
}

/// Build a store from YAML produced by [`export_yaml`] or written by hand
pub fn import_yaml(text: &str) -> Result<ModuleSummaryStore, ExportError> {
    let module: YamlModule = serde_yaml::from_str(text)?;
    let mut store = ModuleSummaryStore::new(module.module_name);

    for function in &module.functions {
        store.intern(&function.name);
    }
    for ty in &module.types {
        store.intern(&ty.name);
    }

    for function in module.functions {
        let mut flags = FunctionFlags::empty();
        flags.set(FunctionFlags::LIVE, function.live);
        flags.set(FunctionFlags::PRESERVED, function.preserved);
        flags.set(FunctionFlags::FIXED_CONTENTS, function.fixed_contents);

        let mut summary = FunctionSummary::new(store.intern(&function.name), flags);
        if let Some(debug_name) = function.debug_name {
            summary = summary.with_debug_name(debug_name);
        }
        for call in function.calls {
            summary.add_call(CallEdge {
                callee: store.intern(&call.callee),
                kind: call.kind,
                preserved: call.preserved,
            });
        }
        store.insert_function(summary)?;
    }

    for ty in module.types {
        let mut summary = TypeSummary::new(store.intern(&ty.name));
        summary.base = ty.base.map(|base| store.intern(&base));
        summary.vtable_slots = ty.vtable.iter().map(|slot| store.intern(slot)).collect();
        for witness in ty.witnesses {
            let requirement = store.intern(&witness.requirement);
            let implementation = store.intern(&witness.implementation);
            summary.witness_entries.insert(requirement, implementation);
        }
        store.insert_type(summary)?;
    }
    store.check_vtables()?;

    if module.liveness_computed {
        store.mark_liveness_computed();
    }
    debug!(
        module = store.module_name(),
        functions = store.functions().count(),
        "imported summary from YAML"
    );
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_export_empty_module() {
        let yaml = export_yaml(&ModuleSummaryStore::new("empty")).unwrap();
        assert_eq!(
            yaml,
            "# Module-summary v1\nmodule_name: empty\nliveness_computed: false\n"
        );
    }

    #[test]
    fn test_import_hand_written() {
        let text = "\
# Module-summary v1
module_name: hand
functions:
  - name: main
    preserved: true
    calls:
      - callee: helper
        kind: direct
  - name: helper
types:
  - name: T
    vtable: [helper]
";
        let store = import_yaml(text).unwrap();
        let main = store.function_by_name("main").unwrap();
        assert!(main.is_preserved());
        assert!(!main.is_live());
        assert_eq!(store.name_of(main.calls()[0].callee).unwrap(), "helper");
        assert_eq!(store.type_by_name("T").unwrap().vtable_slots.len(), 1);
        assert!(!store.is_liveness_computed());
    }

    #[test]
    fn test_import_rejects_duplicate_function() {
        let text = "module_name: m\nfunctions:\n  - name: f\n  - name: f\n";
        assert!(matches!(import_yaml(text), Err(ExportError::Summary(_))));
    }

    #[test]
    fn test_import_rejects_short_derived_vtable() {
        let text = "\
module_name: m
functions:
  - name: B.f
  - name: B.g
  - name: C.f
types:
  - name: B
    vtable: [B.f, B.g]
  - name: C
    base: B
    vtable: [C.f]
";
        match import_yaml(text) {
            Err(ExportError::Summary(err)) => assert_eq!(err.code(), "E-SUMMARY-005"),
            other => panic!("expected a vtable error, got {other:?}"),
        }
    }

    #[test]
    fn test_import_rejects_unknown_kind() {
        let text = "module_name: m\nfunctions:\n  - name: f\n    calls:\n      - callee: g\n        kind: sideways\n";
        assert!(matches!(import_yaml(text), Err(ExportError::Yaml(_))));
    }
}
