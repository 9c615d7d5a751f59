//! File-based tests that run the built binary
//!
//! Each test writes its inputs to a temp dir and checks the files and exit
//! codes the CLI produces.

use std::path::Path;
use std::process::{Command, Output};

const GRAPH: &str = r#"{
    "direction": "TB",
    "nodes": [
        {"id": "a", "type": "person", "label": "Gandhi"},
        {"id": "b", "type": "event", "label": "Salt March"},
        {"id": "c", "type": "political", "label": "Independence"}
    ],
    "edges": [
        {"id": "ea-b", "source": "a", "target": "b", "type": "participates"},
        {"id": "eb-c", "source": "b", "target": "c", "type": "influences"}
    ]
}"#;

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_histograph"))
        .args(args)
        .env("HISTOGRAPH_LOG_LEVEL", "off")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run histograph")
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_layout_writes_positions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "graph.json", GRAPH);
    let output = dir.path().join("out.json");

    let result = run(&["layout", "-i", &input, "-o", output.to_str().unwrap()]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let doc = read_json(&output);
    let ys: Vec<f64> = doc["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["position"]["y"].as_f64().unwrap())
        .collect();
    assert_eq!(ys, vec![0.0, 86.0, 172.0]);
}

#[test]
fn test_layout_direction_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "graph.json", GRAPH);
    let config = write(dir.path(), "config.json", r#"{"layout": {"rank_sep": 28.0}}"#);
    let output = dir.path().join("out.json");

    let result = run(&[
        "layout",
        "-i",
        &input,
        "-o",
        output.to_str().unwrap(),
        "--direction",
        "lr",
        "--config",
        &config,
    ]);
    assert!(result.status.success());

    let doc = read_json(&output);
    assert_eq!(doc["direction"], "LR");
    // Rank step is node width plus rank separation
    assert_eq!(doc["nodes"][1]["position"]["x"].as_f64(), Some(200.0));
}

#[test]
fn test_check_reports_problems() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(dir.path(), "good.json", GRAPH);
    let bad = write(
        dir.path(),
        "bad.json",
        r#"{"nodes":[{"id":"a","label":"A"}],"edges":[{"id":"x","source":"a","target":"ghost"}]}"#,
    );

    let result = run(&["check", "-i", &good]);
    assert!(result.status.success());
    assert!(String::from_utf8_lossy(&result.stdout).contains("3 nodes, 2 edges"));

    let result = run(&["check", "-i", &bad]);
    assert_eq!(result.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("ghost"));
    assert!(String::from_utf8_lossy(&result.stderr).contains("1 problem(s) found"));
}

#[test]
fn test_import_merges_into_graph() {
    let dir = tempfile::tempdir().unwrap();
    let graph = write(dir.path(), "graph.json", GRAPH);
    let response = write(
        dir.path(),
        "response.json",
        r#"{"entities":["Salt March","Dandi"],"relationships":[{"source":"Salt March","target":"Dandi","type":"located"}]}"#,
    );
    let output = dir.path().join("merged.json");

    let result = run(&[
        "import",
        "-i",
        &response,
        "--graph",
        &graph,
        "-o",
        output.to_str().unwrap(),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(String::from_utf8_lossy(&result.stderr).contains("1 nodes added, 1 reused"));

    let doc = read_json(&output);
    assert_eq!(doc["nodes"].as_array().unwrap().len(), 4);
    assert_eq!(doc["edges"][2]["id"], "eb-entity-1");
    assert_eq!(doc["edges"][2]["type"], "located");
}

#[test]
fn test_import_upstream_error() {
    let dir = tempfile::tempdir().unwrap();
    let response = write(
        dir.path(),
        "response.json",
        r#"{"error":"Processing error","details":"rate limited"}"#,
    );

    let result = run(&["import", "-i", &response, "--status", "429"]);
    assert_eq!(result.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("429"));
    assert!(stderr.contains("rate limited"));
}

#[test]
fn test_summary_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write(dir.path(), "graph.json", GRAPH);

    let result = run(&["summary", "-i", &input]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.starts_with("Graph: 3 nodes, 2 edges (TB)"));
    assert!(stdout.contains("c   political  Independence  2"));
    assert!(!stdout.contains("\x1b["));
}

#[test]
fn test_kinds_json() {
    let result = run(&["kinds", "--json"]);
    assert!(result.status.success());
    let kinds: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(kinds["node_kinds"].as_array().unwrap().len(), 13);
    assert_eq!(kinds["relationship_kinds"][0], "causes");
    assert_eq!(kinds["dialog_choices"][1]["label"], "Led to");
    assert_eq!(kinds["dialog_choices"][1]["type"], "led-to");
    assert_eq!(kinds["dialog_choices"].as_array().unwrap().len(), 6);
}

#[test]
fn test_missing_input_file() {
    let result = run(&["layout", "-i", "/no/such/graph.json"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("Failed to read input file"));
}
