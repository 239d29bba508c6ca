// Integration tests for pymap

use assert_cmd::Command;
use predicates::prelude::*;
use pymap::{Analyzer, Classification, Config, FileDiscoverer, Renderer};
use pymap::output::{DotRenderer, ListingRenderer, StatsJsonRenderer};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

// Helper to create an analyzer with default config
fn create_analyzer() -> Analyzer {
    Analyzer::new(Config::default()).expect("Failed to create analyzer")
}

fn pymap() -> Command {
    Command::cargo_bin("pymap").unwrap()
}

// ============================================================================
// Pipeline Tests
// ============================================================================

#[test]
fn test_analyze_sample_project() {
    let result = create_analyzer()
        .analyze(&fixtures_path("sample_project"))
        .expect("Analysis failed");

    let ids: Vec<String> = result.files.iter().map(|f| f.source.id()).collect();
    assert_eq!(
        ids,
        vec![
            "app/__init__.py",
            "app/main.py",
            "app/models.py",
            "app/utils/__init__.py",
            "app/utils/helpers.py",
            "broken.py",
            "main.py",
            "tests/test_main.py",
        ]
    );

    assert_eq!(result.graph.files().len(), 8);
    assert_eq!(result.graph.modules().len(), 13);
    assert_eq!(result.graph.edge_count(), 13);
    assert_eq!(result.parse_errors.len(), 1);
    assert!(result.parse_errors.contains_key(Path::new("broken.py")));
    assert!(result.skipped.is_empty());
}

#[test]
fn test_sample_project_classification() {
    let result = create_analyzer()
        .analyze(&fixtures_path("sample_project"))
        .unwrap();
    let class_of = |id: &str| result.graph.node(id).and_then(|n| n.classification);

    assert_eq!(class_of("os"), Some(Classification::StdLib));
    assert_eq!(class_of("urllib.parse"), Some(Classification::StdLib));
    assert_eq!(class_of("requests"), Some(Classification::External));
    assert_eq!(class_of("pytest"), Some(Classification::External));
    assert_eq!(class_of(".models"), Some(Classification::Local));
    assert_eq!(class_of(".."), Some(Classification::Local));
    assert_eq!(class_of("app"), Some(Classification::Local));
    assert_eq!(class_of("app.utils"), Some(Classification::Local));
    assert_eq!(class_of("app.main"), Some(Classification::Local));
    assert!(result.graph.node("should_never_appear").is_none());
}

#[test]
fn test_sample_project_stats() {
    let result = create_analyzer()
        .analyze(&fixtures_path("sample_project"))
        .unwrap();
    let stats = &result.stats;

    assert_eq!(stats.files, 8);
    assert_eq!(stats.total_lines, 60);
    assert_eq!(stats.blank_lines, 19);
    assert_eq!(stats.comment_lines, 2);
    assert_eq!(stats.defs, 4);
    assert_eq!(stats.classes, 2);
    assert_eq!(stats.imports, 6);
    assert_eq!(stats.from_imports, 7);
    let longest = stats.longest_file.as_ref().unwrap();
    assert_eq!(longest.path, "app/main.py");
    assert_eq!(longest.lines, 20);
    assert_eq!(stats.average_length, Some(7.5));

    let broken = result.file("broken.py").unwrap();
    assert_eq!(broken.stats.lines, 4);
    assert_eq!(broken.stats.imports, 0);
    assert_eq!(broken.stats.defs, 0);
}

#[test]
fn test_skip_tests_drops_test_files() {
    let mut config = Config::default();
    config.analysis.skip_tests = true;
    let result = Analyzer::new(config)
        .unwrap()
        .analyze(&fixtures_path("sample_project"))
        .unwrap();

    assert_eq!(result.files.len(), 7);
    assert!(result.graph.node("pytest").is_none());
}

#[test]
fn test_entry_point_is_main() {
    let result = create_analyzer()
        .analyze(&fixtures_path("sample_project"))
        .unwrap();
    assert!(result.graph.node("main.py").unwrap().entry_point);
    let dot = DotRenderer::new().render(&result).unwrap();
    assert!(dot.contains(r#""main.py" [label="main.py", shape=box, color=red];"#));
}

#[test]
fn test_sample_project_listing() {
    let result = create_analyzer()
        .analyze(&fixtures_path("sample_project"))
        .unwrap();
    let listing = ListingRenderer::new().render(&result).unwrap();

    let expected_main = "\
- **app/main.py**
  - **stdlib**
    - `import logging as log`
    - `import os`
    - `urllib.parse`:
      - urlparse
  - **external**
    - `import requests`
  - **local**
    - `.models`:
      - User
    - `app.utils`:
      - helpers
";
    assert!(listing.contains(expected_main), "listing was:\n{}", listing);
    assert!(listing.contains("- **broken.py**\n  - (no imports)\n"));
    assert!(listing.contains("- **app/utils/__init__.py**\n  - (no imports)\n"));
}

// ============================================================================
// Pipeline Properties
// ============================================================================

#[test]
fn test_end_to_end_two_files() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "a.py", "import os\nfrom .sibling import helper\nimport numpy\n");
    write(temp.path(), "sibling.py", "");

    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert_eq!(result.graph.files().len(), 2);
    assert_eq!(result.graph.modules().len(), 3);
    let edges = result.graph.edges_from("a.py");
    assert_eq!(edges.len(), 3);

    let classified: Vec<(&str, Classification)> = edges
        .iter()
        .map(|e| (e.to.id.as_str(), e.edge.classification))
        .collect();
    assert_eq!(
        classified,
        vec![
            (".sibling", Classification::Local),
            ("numpy", Classification::External),
            ("os", Classification::StdLib),
        ]
    );
}

#[test]
fn test_package_init_naming() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pkg/sub/__init__.py", "");
    write(temp.path(), "pkg/sub/mod.py", "");
    write(temp.path(), "user.py", "import pkg.sub.mod.helper\nimport pkgsubmod\n");

    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert_eq!(result.file("pkg/sub/__init__.py").unwrap().module, "pkg.sub");
    assert_eq!(result.file("pkg/sub/mod.py").unwrap().module, "pkg.sub.mod");
    assert!(result.index.contains("pkg"));
    assert!(result.index.contains("pkg.sub"));
    assert_eq!(
        result.graph.node("pkg.sub.mod.helper").unwrap().classification,
        Some(Classification::Local)
    );
    assert_eq!(
        result.graph.node("pkgsubmod").unwrap().classification,
        Some(Classification::External)
    );
}

#[test]
fn test_edge_multiplicity() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "one.py", "import os\nfrom os import path\n");
    write(temp.path(), "two.py", "import a\n");
    write(temp.path(), "three.py", "import a\n");

    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert_eq!(result.graph.edges_from("one.py").len(), 1);
    assert_eq!(result.graph.in_degree("os"), 1);
    assert_eq!(result.graph.in_degree("a"), 2);
    assert_eq!(result.graph.modules().len(), 2);
}

#[test]
fn test_listing_is_deterministic() {
    let root = fixtures_path("sample_project");
    let first = ListingRenderer::new()
        .render(&create_analyzer().analyze(&root).unwrap())
        .unwrap();
    let second = ListingRenderer::new()
        .render(&create_analyzer().analyze(&root).unwrap())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_listing_independent_of_discovery_order_and_threads() {
    let root = fixtures_path("sample_project").canonicalize().unwrap();
    let discovered = FileDiscoverer::new()
        .with_ignore_dirs(["__pycache__"])
        .discover(&root)
        .unwrap();

    let mut config = Config::default();
    config.analysis.threads = 1;
    let single = Analyzer::new(config).unwrap();
    let baseline = ListingRenderer::new()
        .render(&single.analyze_files(&root, discovered.clone()).unwrap())
        .unwrap();

    let mut config = Config::default();
    config.analysis.threads = 4;
    let parallel = Analyzer::new(config).unwrap();
    let mut shuffled = discovered;
    shuffled.reverse();
    shuffled.rotate_left(3);
    let other = ListingRenderer::new()
        .render(&parallel.analyze_files(&root, shuffled).unwrap())
        .unwrap();

    assert_eq!(baseline, other);
}

#[test]
fn test_merge_init_nodes_option() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pkg/__init__.py", "from . import core\n");
    write(temp.path(), "pkg/core.py", "");
    write(temp.path(), "app.py", "import pkg\n");

    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert!(result.graph.node("pkg/__init__.py").unwrap().is_file());
    assert!(!result.graph.node("pkg").unwrap().is_file());

    let mut config = Config::default();
    config.graph.merge_init_nodes = true;
    let merged = Analyzer::new(config).unwrap().analyze(temp.path()).unwrap();
    assert!(merged.graph.node("pkg/__init__.py").is_none());
    assert!(merged.graph.node("pkg").unwrap().is_file());
    assert_eq!(merged.graph.in_degree("pkg"), 1);
    assert_eq!(merged.graph.edge_count(), result.graph.edge_count());
}

#[test]
fn test_suppress_self_edges_option() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pkg/__init__.py", "");
    write(temp.path(), "pkg/core.py", "import pkg\nfrom . import util\nimport os\n");

    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert_eq!(result.graph.edges_from("pkg/core.py").len(), 3);

    let mut config = Config::default();
    config.graph.suppress_self_edges = true;
    let filtered = Analyzer::new(config).unwrap().analyze(temp.path()).unwrap();
    let targets: Vec<String> = filtered
        .graph
        .edges_from("pkg/core.py")
        .iter()
        .map(|e| e.to.id.clone())
        .collect();
    assert_eq!(targets, vec!["os"]);
}

#[test]
fn test_empty_tree() {
    let temp = TempDir::new().unwrap();
    let result = create_analyzer().analyze(temp.path()).unwrap();
    assert_eq!(result.stats.files, 0);
    assert_eq!(result.stats.average_length, None);
    assert_eq!(
        ListingRenderer::new().render(&result).unwrap(),
        "No Python files found.\n"
    );

    let json: serde_json::Value =
        serde_json::from_str(&StatsJsonRenderer.render(&result).unwrap()).unwrap();
    assert_eq!(json["files"], 0);
    assert!(json.get("average_length").is_none());
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_help() {
    pymap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("map"))
        .stdout(predicate::str::contains("graph"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_cli_map() {
    pymap()
        .arg("map")
        .arg(fixtures_path("sample_project"))
        .assert()
        .success()
        .stdout(predicate::str::contains("- **app/main.py**"))
        .stdout(predicate::str::contains("`import requests`"))
        .stdout(predicate::str::contains("should_never_appear").not())
        .stderr(predicate::str::contains("broken.py"));
}

#[test]
fn test_cli_map_to_file() {
    let out = TempDir::new().unwrap();
    let target = out.path().join("nested").join("imports.md");
    pymap()
        .arg("map")
        .arg(fixtures_path("sample_project"))
        .arg("--output")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    let content = fs::read_to_string(target).unwrap();
    assert!(content.starts_with("- **app/__init__.py**"));
}

#[test]
fn test_cli_graph_dot() {
    pymap()
        .args(["graph", "--format", "dot"])
        .arg(fixtures_path("sample_project"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph imports {"))
        .stdout(predicate::str::contains(r#""app/main.py" -> "requests";"#))
        .stdout(predicate::str::contains(r#""requests" [label="requests", shape=ellipse, color=green];"#));
}

#[test]
fn test_cli_graph_json() {
    let output = pymap()
        .args(["graph", "--format", "json"])
        .arg(fixtures_path("sample_project"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["nodes"].as_array().unwrap().len(), 21);
    assert_eq!(json["edges"].as_array().unwrap().len(), 13);
}

#[test]
fn test_cli_graph_html() {
    pymap()
        .args(["graph", "--format", "html"])
        .arg(fixtures_path("sample_project"))
        .assert()
        .success()
        .stdout(predicate::str::contains("vis.Network"))
        .stdout(predicate::str::contains(r#""id":"app/models.py""#));
}

#[test]
fn test_cli_stats() {
    pymap()
        .arg("stats")
        .arg(fixtures_path("sample_project"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Files scanned: 8"))
        .stdout(predicate::str::contains("Total lines: 60"))
        .stdout(predicate::str::contains("Longest file: app/main.py (20 lines)"))
        .stdout(predicate::str::contains("Average file length: 7.50 lines"));
}

#[test]
fn test_cli_stats_json() {
    let output = pymap()
        .args(["stats", "--json", "--skip-tests"])
        .arg(fixtures_path("sample_project"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["files"], 7);
    assert_eq!(json["total_lines"], 53);
    assert_eq!(json["longest_file"]["path"], "app/main.py");
}

#[test]
fn test_cli_report_survives_missing_graphviz() {
    let out = TempDir::new().unwrap();
    let dir = out.path().join("report");
    pymap()
        .arg("report")
        .arg(fixtures_path("sample_project"))
        .arg("--output")
        .arg(&dir)
        .env("PATH", "")
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    for name in [
        "imports.md",
        "import_graph.dot",
        "import_graph.html",
        "graph.json",
        "stats.json",
        "analysis.json",
    ] {
        assert!(dir.join(name).exists(), "missing {}", name);
    }
    assert!(!dir.join("import_graph.svg").exists());
}

#[test]
fn test_cli_missing_root_fails() {
    pymap()
        .args(["map", "/nonexistent/pymap/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Path not found"));
}

#[test]
fn test_cli_unwritable_output_fails() {
    let out = TempDir::new().unwrap();
    let blocker = out.path().join("file");
    fs::write(&blocker, "").unwrap();
    pymap()
        .arg("map")
        .arg(fixtures_path("sample_project"))
        .arg("--output")
        .arg(blocker.join("imports.md"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot write"));
}

#[test]
fn test_cli_config_file() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/a.py", "import _vendored\n");
    let config = temp.path().join("custom.toml");
    fs::write(&config, "[analysis]\nextra_stdlib = [\"_vendored\"]\n").unwrap();

    pymap()
        .arg("map")
        .arg(temp.path().join("src"))
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("  - **stdlib**\n    - `import _vendored`"));
}

#[test]
fn test_cli_invalid_config_fails() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("bad.toml");
    fs::write(&config, "[analysis]\nthreads = 9999\n").unwrap();
    pymap()
        .arg("map")
        .arg(temp.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config validation error"));
}
