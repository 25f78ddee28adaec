//! End-to-end lint engine tests over real workspaces on disk.

use std::fs;
use std::path::Path;

use rill::lint::{run, LintOptions, LintOutcome};
use tempfile::TempDir;

fn setup(manifest: &str, files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("rill.workspace"), manifest).unwrap();
    for (rel, text) in files {
        let path = temp.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    temp
}

fn lint(dir: &Path) -> (LintOutcome, String) {
    lint_with(dir, |_| {})
}

fn lint_with(dir: &Path, patch: impl FnOnce(&mut LintOptions)) -> (LintOutcome, String) {
    let mut options = LintOptions {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    patch(&mut options);
    let mut buf = Vec::new();
    let outcome = run(&options, &mut buf).unwrap();
    (outcome, String::from_utf8(buf).unwrap())
}

fn codes(outcome: &LintOutcome) -> Vec<&str> {
    outcome.diagnostics.iter().map(|d| d.code.as_str()).collect()
}

#[test]
fn import_cycle_reports_canonically_regardless_of_declaration_order() {
    let forward = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./a
    import: ["./b"]
  - key: b
    name: B
    version: 0.1.0
    root: ./b
    import: ["./a"]
"#;
    let backward = r#"
version: 1.0.0
packages:
  - key: b
    name: B
    version: 0.1.0
    root: ./b
    import: ["./a"]
  - key: main
    name: App
    version: 0.1.0
    root: ./a
    import: ["./b"]
"#;
    let cycles: Vec<serde_json::Value> = [forward, backward]
        .iter()
        .map(|m| {
            let temp = setup(m, &[]);
            let (outcome, _) = lint(temp.path());
            let cycle = outcome
                .diagnostics
                .iter()
                .find(|d| d.code == "E_IMPORT_CYCLE")
                .expect("cycle reported");
            cycle.data.as_ref().unwrap()["cycle"].clone()
        })
        .collect();
    assert_eq!(cycles[0], serde_json::json!(["./a", "./b"]));
    assert_eq!(cycles[0], cycles[1]);
}

#[test]
fn exact_version_conflict_reports_once_per_import_path() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
    import: ["registry/json 1.2.3"]
  - key: other
    name: Other
    version: 0.1.0
    root: ./other
    import: ["registry/json 2.0.0"]
  - key: third
    name: Third
    version: 0.1.0
    root: ./third
    import: ["registry/json 1.2.3"]
"#;
    let temp = setup(manifest, &[]);
    let (outcome, _) = lint(temp.path());
    let multi: Vec<_> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == "E_IMPORT_CONSTRAINT_MULTI")
        .collect();
    assert_eq!(multi.len(), 1);
    assert!(outcome.failed);
}

#[test]
fn overlapping_ranges_warn_and_disjoint_ranges_error() {
    let overlapping = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
    import: ["registry/json ~1.2.3"]
  - key: other
    name: Other
    version: 0.1.0
    root: ./other
    import: ["registry/json >= 1.2.5"]
"#;
    let temp = setup(overlapping, &[]);
    let (outcome, _) = lint(temp.path());
    assert!(codes(&outcome).contains(&"W_IMPORT_SINGLE_VERSION"));
    assert!(!outcome.failed);

    let disjoint = overlapping.replace(">= 1.2.5", ">= 2.0.0");
    let temp = setup(&disjoint, &[]);
    let (outcome, _) = lint(temp.path());
    assert!(codes(&outcome).contains(&"E_IMPORT_CONSTRAINT"));
    assert!(outcome.failed);
}

#[test]
fn reachability_classes_are_mutually_exclusive_per_node() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
"#;
    // A feeds nothing, B is fed by nothing, Stray has no edges at all
    let unit = "\
pipeline P {
 ingress
 A
 B
 Stray
 egress
 ingress -> A
 B -> egress
}
";
    let temp = setup(manifest, &[("src/main.rill", unit)]);
    let (outcome, _) = lint(temp.path());
    let by_node = |code: &str| -> Vec<String> {
        outcome
            .diagnostics
            .iter()
            .filter(|d| d.code == code)
            .map(|d| d.data.as_ref().unwrap()["node"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(by_node("W_PIPELINE_UNREACHABLE_NODE"), vec!["02:b"]);
    assert_eq!(by_node("W_PIPELINE_NONTERMINATING_NODE"), vec!["01:a"]);
    assert_eq!(by_node("W_PIPELINE_DISCONNECTED_NODE"), vec!["03:stray"]);
    assert!(codes(&outcome).contains(&"W_PIPELINE_NO_PATH_INGRESS_EGRESS"));
}

#[test]
fn pragma_scope_is_line_aware_within_one_file() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
"#;
    let unit = "\
send &first
#pragma lint:disable W_RAW_POINTER
send &second
#pragma lint:enable W_RAW_POINTER
send &third
";
    let temp = setup(manifest, &[("src/main.rill", unit)]);
    let (outcome, _) = lint(temp.path());
    let lines: Vec<usize> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == "W_RAW_POINTER")
        .map(|d| d.pos.unwrap().line)
        .collect();
    assert_eq!(lines, vec![1, 5]);
}

#[test]
fn pragma_scope_never_crosses_files() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
"#;
    let temp = setup(
        manifest,
        &[
            ("src/a.rill", "#pragma lint:disable W_RAW_POINTER\nsend &a\n"),
            ("src/b.rill", "send &b\n"),
        ],
    );
    let (outcome, _) = lint(temp.path());
    let files: Vec<&str> = outcome
        .diagnostics
        .iter()
        .filter(|d| d.code == "W_RAW_POINTER")
        .map(|d| d.file.as_str())
        .collect();
    assert_eq!(files, vec!["./src/b.rill"]);
}

#[test]
fn override_then_suppression_then_strict() {
    let manifest = r#"
version: 1.0.0
toolchain:
  linter:
    options: [strict]
    rules:
      W_RAW_POINTER: info
    suppress:
      - path: ./vendor
        codes: [W_PKG_NAME_STYLE]
packages:
  - key: main
    name: my_app
    version: 0.1.0
    root: ./src
"#;
    let temp = setup(manifest, &[("src/main.rill", "send &event\n")]);
    let (outcome, _) = lint(temp.path());
    // the pointer finding is downgraded to info and escapes strict
    // promotion; the name finding is promoted to error
    let pointer = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "W_RAW_POINTER")
        .unwrap();
    assert_eq!(pointer.level, rill::Level::Info);
    let name = outcome
        .diagnostics
        .iter()
        .find(|d| d.code == "W_PKG_NAME_STYLE")
        .unwrap();
    assert_eq!(name.level, rill::Level::Error);
    assert!(outcome.failed);
}

#[test]
fn ndjson_output_is_parseable_line_by_line() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: my_app
    version: 0.1.0
    root: ./src
"#;
    let temp = setup(manifest, &[("src/main.rill", "send &event\n")]);
    let (outcome, output) = lint_with(temp.path(), |o| o.json = true);
    let records: Vec<serde_json::Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect();
    assert_eq!(records.len(), outcome.diagnostics.len() + 1);
    let summary = records.last().unwrap();
    assert_eq!(summary["code"], "SUMMARY");
    assert_eq!(summary["data"]["warnings"], outcome.warnings);
    for record in &records {
        assert!(record["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}

#[test]
fn human_counts_match_json_summary() {
    let manifest = r#"
version: 1.0.0
packages:
  - key: main
    name: my_app
    version: 0.1.0
    root: ./src
    import: ["registry/zeta", "registry/alpha"]
"#;
    let temp = setup(manifest, &[("src/main.rill", "send &event\n")]);
    let (human, human_out) = lint(temp.path());
    let (json, json_out) = lint_with(temp.path(), |o| o.json = true);
    assert_eq!(human.errors, json.errors);
    assert_eq!(human.warnings, json.warnings);
    assert!(human_out.contains(&format!(
        "lint: {} error(s), {} warning(s)",
        human.errors, human.warnings
    )));
    assert!(json_out.contains(&format!("\"warnings\":{}", json.warnings)));
}

#[test]
fn disabled_decorators_reach_source_rules() {
    let manifest = r#"
version: 1.0.0
toolchain:
  linter:
    disabled_decorators: [audited]
packages:
  - key: main
    name: App
    version: 0.1.0
    root: ./src
"#;
    let unit = "pipeline P {\n ingress\n Transform @audited\n egress\n}\n";
    let temp = setup(manifest, &[("src/main.rill", unit)]);
    let (outcome, _) = lint(temp.path());
    assert_eq!(codes(&outcome), vec!["W_DECORATOR_DISABLED"]);
}
