//! End-to-end runs of the `modsum` binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use modsum_codec::{read_summary_file, summary_file_name, write_summary_file, EncodeOptions};
use modsum_summary::{CallKind, FunctionFlags, ModuleSummaryStore};
use tempfile::TempDir;

fn modsum(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_modsum"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run modsum")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write_module(dir: &Path, store: &ModuleSummaryStore) -> PathBuf {
    let path = dir.join(summary_file_name(store.module_name()));
    write_summary_file(&path, store, &EncodeOptions::with_debug_names()).unwrap();
    path
}

fn make_app() -> ModuleSummaryStore {
    let mut builder = ModuleSummaryStore::begin_module("App");
    let main = builder.record_function("main", FunctionFlags::PRESERVED).unwrap();
    builder.set_debug_name(main, "App.main()").unwrap();
    builder.record_call(main, "Lib.helper", CallKind::Direct).unwrap();
    builder.finish()
}

fn make_lib() -> ModuleSummaryStore {
    let mut builder = ModuleSummaryStore::begin_module("Lib");
    builder.record_function("helper", FunctionFlags::empty()).unwrap();
    builder.record_function("unused", FunctionFlags::empty()).unwrap();
    builder.finish()
}

#[test]
fn test_merge_and_info() {
    let dir = TempDir::new().unwrap();
    let app = write_module(dir.path(), &make_app());
    let lib = write_module(dir.path(), &make_lib());
    let out = dir.path().join("combined.summary");

    let output = modsum(&[
        "merge",
        app.to_str().unwrap(),
        lib.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--print-live-trace",
        "Lib.helper",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Lib.helper is called from App.main"));

    let merged = read_summary_file(&out).unwrap();
    assert!(merged.is_liveness_computed());
    assert!(merged.function_by_name("Lib.helper").unwrap().is_live());
    assert!(!merged.function_by_name("Lib.unused").unwrap().is_live());
    // debug names are dropped unless asked for
    assert_eq!(merged.function_by_name("App.main").unwrap().debug_name(), None);

    let output = modsum(&["info", out.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("module: combined"));
    assert!(text.contains("functions: 3 (2 live, 1 dead)"));
    assert!(text.contains("dead: Lib.unused"));
}

#[test]
fn test_live_trace_reported_once() {
    let dir = TempDir::new().unwrap();
    let app = write_module(dir.path(), &make_app());
    let lib = write_module(dir.path(), &make_lib());
    let out = dir.path().join("combined.summary");

    let output = modsum(&[
        "-v",
        "merge",
        app.to_str().unwrap(),
        lib.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--print-live-trace",
        "Lib.helper",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).matches("'Lib.helper' is live").count(), 1);
    assert!(!stderr(&output).contains("is called from"));
}

#[test]
fn test_merge_skips_bad_input() {
    let dir = TempDir::new().unwrap();
    let app = write_module(dir.path(), &make_app());
    let bad = dir.path().join("Bad.swiftmodule.summary");
    std::fs::write(&bad, b"MODS\x01\x08\x40").unwrap();
    let out = dir.path().join("combined.summary");

    let output = modsum(&[
        "merge",
        app.to_str().unwrap(),
        bad.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Bad.swiftmodule.summary"));
    assert!(err.contains("truncated stream at offset"));
    // App.main -> Lib.helper cannot be resolved without Lib
    assert!(err.contains("W-MERGE-001"));

    let merged = read_summary_file(&out).unwrap();
    assert!(merged.function_by_name("App.main").unwrap().is_live());
}

#[test]
fn test_version_mismatch_recommends_regeneration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("New.swiftmodule.summary");
    std::fs::write(&path, b"MODS\x07").unwrap();

    let output = modsum(&["info", path.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("regenerate"));
}

#[test]
fn test_yaml_conversion_round_trip() {
    let dir = TempDir::new().unwrap();
    let app = write_module(dir.path(), &make_app());
    let yaml = dir.path().join("app.yaml");
    let back = dir.path().join("back.summary");

    let output = modsum(&[
        "convert",
        "--to-yaml",
        app.to_str().unwrap(),
        "-o",
        yaml.to_str().unwrap(),
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = std::fs::read_to_string(&yaml).unwrap();
    assert!(text.starts_with("# Module-summary v1\n"));
    assert!(text.contains("debug_name: App.main()"));

    let output = modsum(&[
        "convert",
        "--from-yaml",
        yaml.to_str().unwrap(),
        "-o",
        back.to_str().unwrap(),
        "--embed-debug-names",
    ]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(read_summary_file(&back).unwrap(), make_app());
}

#[test]
fn test_yaml_to_stdout() {
    let dir = TempDir::new().unwrap();
    let lib = write_module(dir.path(), &make_lib());

    let output = modsum(&["convert", "--to-yaml", lib.to_str().unwrap(), "-o", "-"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("module_name: Lib"));
}

#[test]
fn test_info_json() {
    let dir = TempDir::new().unwrap();
    let lib = write_module(dir.path(), &make_lib());

    let output = modsum(&["info", "--json", lib.to_str().unwrap()]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("\"module_name\": \"Lib\""));
}

#[test]
fn test_convert_requires_a_source() {
    let output = modsum(&["convert", "-o", "-"]);
    assert!(!output.status.success());
}
