use mersynth_core::{detect, detect_declaration, normalize, sanitize_code};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

fn list_fixture_mmd_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if path.extension().is_some_and(|e| e == "mmd") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

/// Issues found in the normalized input, plus the fully repaired text.
fn snapshot_value(raw: &str) -> Value {
    let repaired = sanitize_code(raw);
    let issues = detect(&normalize(raw));

    let mut out = Map::new();
    out.insert(
        "diagramType".to_string(),
        detect_declaration(&repaired)
            .map(|d| Value::String(d.id.to_string()))
            .unwrap_or(Value::Null),
    );
    out.insert(
        "issues".to_string(),
        serde_json::to_value(&issues).expect("issues serialize"),
    );
    out.insert("repaired".to_string(), Value::String(repaired));
    Value::Object(out)
}

#[test]
fn fixtures_match_golden_snapshots() {
    let fixtures = list_fixture_mmd_files(&fixtures_root());
    assert!(
        !fixtures.is_empty(),
        "no fixtures found under {}",
        fixtures_root().display()
    );

    for mmd_path in fixtures {
        let text = std::fs::read_to_string(&mmd_path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", mmd_path.display()));

        let snapshot = snapshot_value(&text);
        let golden_path = mmd_path.with_extension("golden.json");
        let golden_text = std::fs::read_to_string(&golden_path)
            .unwrap_or_else(|_| panic!("missing golden snapshot {}", golden_path.display()));
        let golden: Value = serde_json::from_str(&golden_text)
            .unwrap_or_else(|e| panic!("invalid golden JSON {}: {e}", golden_path.display()));

        assert_eq!(snapshot, golden, "snapshot mismatch for {}", mmd_path.display());
    }
}

#[test]
fn repaired_fixtures_are_stable() {
    for mmd_path in list_fixture_mmd_files(&fixtures_root()) {
        let text = std::fs::read_to_string(&mmd_path).expect("read fixture");
        let repaired = sanitize_code(&text);
        assert!(
            detect(&repaired).is_empty(),
            "repaired output of {} still has issues",
            mmd_path.display()
        );
    }
}
