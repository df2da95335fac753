//! Query facade and YAML export

use modsum_merge::{merge, MergeOptions};
use modsum_query::{export_yaml, import_yaml, DeadTableEntry, SummaryQuery, UsageError};
use modsum_summary::{CallEdge, CallKind, FunctionFlags, ModuleSummaryStore, SymbolId};
use pretty_assertions::assert_eq;

/// `main` calls `B1.f1` virtually; `C1` overrides it; `D1.f1` exists but
/// `D1` has no base, and `S`/`T` conform to `P`, only `S.run` being called
/// directly.
fn make_module() -> ModuleSummaryStore {
    let mut builder = ModuleSummaryStore::begin_module("app");
    let main = builder.record_function("main", FunctionFlags::PRESERVED).unwrap();
    for name in ["B1.f1", "C1.f1", "B1.g", "S.run", "T.run"] {
        builder.record_function(name, FunctionFlags::empty()).unwrap();
    }
    builder.record_type("B1", None, &["B1.f1", "B1.g"]).unwrap();
    builder.record_type("C1", Some("B1"), &["C1.f1", "B1.g"]).unwrap();
    let s = builder.record_type("S", None, &[]).unwrap();
    let t = builder.record_type("T", None, &[]).unwrap();
    builder.record_witness(s, "P.run", "S.run").unwrap();
    builder.record_witness(t, "P.run", "T.run").unwrap();
    builder.record_call(main, "B1.f1", CallKind::Virtual).unwrap();
    builder.record_call(main, "S.run", CallKind::Direct).unwrap();
    builder.finish()
}

fn merged_store() -> ModuleSummaryStore {
    merge(&[make_module()], &MergeOptions::default()).into_store()
}

fn id(store: &ModuleSummaryStore, name: &str) -> SymbolId {
    store.symbols().lookup(name).unwrap()
}

#[test]
fn test_is_live_before_merge() {
    let store = make_module();
    let query = SummaryQuery::new(&store);

    let err = query.is_live(id(&store, "main")).unwrap_err();
    assert_eq!(
        err,
        UsageError::NotMerged {
            module: "app".to_string()
        }
    );
    assert_eq!(err.code(), "E-USAGE-001");
}

#[test]
fn test_is_live_after_merge() {
    let store = merged_store();
    let query = SummaryQuery::new(&store);

    assert_eq!(query.is_live(id(&store, "app.main")), Ok(true));
    assert_eq!(query.is_live(id(&store, "app.C1.f1")), Ok(true));
    assert_eq!(query.is_live(id(&store, "app.B1.g")), Ok(false));
    assert_eq!(query.is_live(id(&store, "app.T.run")), Ok(false));
    // a type is interned but is not a function
    assert_eq!(query.is_live(id(&store, "app.B1")), Ok(false));
    assert_eq!(
        query.is_live(SymbolId(9999)),
        Err(UsageError::UnknownSymbol { id: SymbolId(9999) })
    );
}

#[test]
fn test_devirtualize_with_two_live_overrides() {
    let store = merged_store();
    let query = SummaryQuery::new(&store);

    let edge = CallEdge::new(id(&store, "app.B1.f1"), CallKind::Virtual);
    assert_eq!(query.resolve_devirtualizable(&edge), Ok(None));
}

#[test]
fn test_devirtualize_sole_live_candidate() {
    let store = merged_store();
    let query = SummaryQuery::new(&store);

    // T.run is dead, so the only live witness of P.run is S.run
    let edge = CallEdge::new(id(&store, "P.run"), CallKind::Witness);
    assert_eq!(
        query.resolve_devirtualizable(&edge),
        Ok(Some(id(&store, "app.S.run")))
    );
    assert_eq!(query.resolve_devirtualizable(&edge.preserved()), Ok(None));

    let direct = CallEdge::direct(id(&store, "app.S.run"));
    assert_eq!(
        query.resolve_devirtualizable(&direct),
        Ok(Some(id(&store, "app.S.run")))
    );
    let dead = CallEdge::direct(id(&store, "app.T.run"));
    assert_eq!(query.resolve_devirtualizable(&dead), Ok(None));
}

#[test]
fn test_dead_listings() {
    let store = merged_store();
    let query = SummaryQuery::new(&store);

    let mut dead: Vec<&str> = query
        .dead_functions()
        .unwrap()
        .into_iter()
        .map(|f| store.name_of(f).unwrap())
        .collect();
    dead.sort();
    assert_eq!(dead, vec!["app.B1.g", "app.T.run"]);
    assert_eq!(query.live_count(), 4);

    let entries = query.dead_table_entries().unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.contains(&DeadTableEntry::VtableSlot {
        ty: id(&store, "app.C1"),
        slot: 1,
        implementation: id(&store, "app.B1.g"),
    }));
    assert!(entries.contains(&DeadTableEntry::Witness {
        ty: id(&store, "app.T"),
        requirement: id(&store, "P.run"),
        implementation: id(&store, "app.T.run"),
    }));
}

#[test]
fn test_dead_listings_need_merge() {
    let store = make_module();
    let query = SummaryQuery::new(&store);

    assert!(matches!(
        query.dead_functions(),
        Err(UsageError::NotMerged { .. })
    ));
    assert!(matches!(
        query.dead_table_entries(),
        Err(UsageError::NotMerged { .. })
    ));
}

#[test]
fn test_export_is_sorted_and_named() {
    let mut builder = ModuleSummaryStore::begin_module("m");
    let z = builder.record_function("z", FunctionFlags::PRESERVED).unwrap();
    builder.record_function("a", FunctionFlags::FIXED_CONTENTS).unwrap();
    builder.set_debug_name(z, "m.z()").unwrap();
    builder.record_call(z, "a", CallKind::Direct).unwrap();
    builder.record_type("Base", None, &["a"]).unwrap();
    builder.record_type("Derived", Some("Base"), &["z"]).unwrap();

    let expected = "\
# Module-summary v1
module_name: m
liveness_computed: false
functions:
- name: a
  live: false
  preserved: false
  fixed_contents: true
- name: z
  debug_name: m.z()
  live: false
  preserved: true
  fixed_contents: false
  calls:
  - callee: a
    kind: direct
    preserved: false
types:
- name: Base
  vtable:
  - a
- name: Derived
  base: Base
  vtable:
  - z
";
    assert_eq!(export_yaml(&builder.finish()).unwrap(), expected);
}

#[test]
fn test_export_ignores_interning_order() {
    let mut first = ModuleSummaryStore::begin_module("m");
    let f = first.record_function("f", FunctionFlags::empty()).unwrap();
    first.record_function("g", FunctionFlags::empty()).unwrap();
    first.record_call(f, "g", CallKind::Direct).unwrap();
    let ty = first.record_type("T", None, &[]).unwrap();
    first.record_witness(ty, "P.a", "g").unwrap();
    first.record_witness(ty, "P.b", "f").unwrap();

    let mut second = ModuleSummaryStore::begin_module("m");
    let ty = second.record_type("T", None, &[]).unwrap();
    second.record_witness(ty, "P.b", "f").unwrap();
    second.record_witness(ty, "P.a", "g").unwrap();
    second.record_function("g", FunctionFlags::empty()).unwrap();
    let f = second.record_function("f", FunctionFlags::empty()).unwrap();
    second.record_call(f, "g", CallKind::Direct).unwrap();

    assert_eq!(export_yaml(&first.finish()).unwrap(), export_yaml(&second.finish()).unwrap());
}

#[test]
fn test_yaml_round_trip_after_merge() {
    let store = merged_store();
    let text = export_yaml(&store).unwrap();
    let imported = import_yaml(&text).unwrap();

    assert!(imported.is_liveness_computed());
    assert_eq!(export_yaml(&imported).unwrap(), text);

    let query = SummaryQuery::new(&imported);
    assert_eq!(query.is_live(id(&imported, "app.C1.f1")), Ok(true));
}
