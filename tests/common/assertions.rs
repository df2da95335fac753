use modsum::merge::MergedStore;
use modsum::summary::ModuleSummaryStore;

/// Assert that a merged function is live
pub fn assert_live(merged: &MergedStore, name: &str) {
    assert_eq!(
        merged.is_live(name),
        Some(true),
        "Expected {} to be live\n{}",
        name,
        merged.explain_liveness(name)
    );
}

/// Assert that a merged function exists and is dead
pub fn assert_dead(merged: &MergedStore, name: &str) {
    assert_eq!(
        merged.is_live(name),
        Some(false),
        "Expected {} to be dead\n{}",
        name,
        merged.explain_liveness(name)
    );
}

/// Names of every live function, sorted
pub fn live_names(store: &ModuleSummaryStore) -> Vec<String> {
    let mut names: Vec<String> = store
        .functions()
        .filter(|f| f.is_live())
        .filter_map(|f| store.symbols().get(f.id()).map(str::to_string))
        .collect();
    names.sort();
    names
}
