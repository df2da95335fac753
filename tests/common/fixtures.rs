use std::fs;
use std::path::{Path, PathBuf};

use modsum::codec::{summary_file_name, write_summary_file, EncodeOptions};
use modsum::query::import_yaml;
use modsum::summary::ModuleSummaryStore;

/// Get path to a test fixture in tests/fixtures/
pub fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Load a YAML summary fixture from tests/fixtures/
pub fn load_fixture(name: &str) -> ModuleSummaryStore {
    let path = fixture_path(name);
    let text = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e));
    import_yaml(&text).unwrap_or_else(|e| panic!("Invalid fixture {}: {}", name, e))
}

/// Write a store as `<module>.swiftmodule.summary` under `dir`
pub fn write_module(dir: &Path, store: &ModuleSummaryStore) -> PathBuf {
    let path = dir.join(summary_file_name(store.module_name()));
    write_summary_file(&path, store, &EncodeOptions::with_debug_names())
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", path.display(), e));
    path
}
