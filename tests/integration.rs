use std::path::PathBuf;

use arbor::cli::commands::{RunOptions, run_order, run_run, run_validate, run_visualize};
use arbor::emit::render::{NodeStatus, RenderGraph};
use arbor::emit::report::RunReport;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_with(name: &str, format: &str) -> arbor::cli::commands::RunOutcome {
    let mut options = RunOptions::new(fixture(name));
    options.format = format.to_owned();
    run_run(&options).expect("run should succeed")
}

// ── Validate command tests ─────────────────────────────────

#[test]
fn cli_validate_reports_counts() {
    let output = run_validate(&fixture("passing.yaml")).expect("validate should succeed");
    assert!(output.contains("valid"));
    assert!(output.contains("3 groups"));
    assert!(output.contains("4 tests"));
    assert!(output.contains("1 dependencies"));
}

#[test]
fn cli_validate_reports_cycle() {
    let err = run_validate(&fixture("cycle.yaml")).unwrap_err();
    assert!(err.ends_with("circular dependency a->b->a"), "{err}");
    assert!(err.contains("cycle.yaml"));
}

#[test]
fn cli_validate_reports_missing_group() {
    let err = run_validate(&fixture("missing_group.yaml")).unwrap_err();
    assert!(err.contains("group not found: db"), "{err}");
}

#[test]
fn cli_validate_rejects_repeated_after() {
    let err = run_validate(&fixture("repeated_after.yaml")).unwrap_err();
    assert!(
        err.contains("repeated declaration of 'after' for group 'api'"),
        "{err}"
    );
}

#[test]
fn cli_validate_rejects_unknown_manifest_field() {
    let err = run_validate(&fixture("unknown_field.yaml")).unwrap_err();
    assert!(err.starts_with("failed to parse"), "{err}");
}

#[test]
fn cli_validate_missing_file() {
    let err = run_validate(&fixture("does_not_exist.yaml")).unwrap_err();
    assert!(err.starts_with("failed to read"));
}

// ── Order command tests ────────────────────────────────────

#[test]
fn cli_order_text() {
    let output = run_order(&fixture("passing.yaml"), "text").unwrap();
    assert_eq!(
        output,
        "1. cache: warms\n2. db: migrates, seeds\n3. api (after db): serves\n"
    );
}

#[test]
fn cli_order_json_and_yaml() {
    let json = run_order(&fixture("passing.yaml"), "json").unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["steps"][2]["group"], "api");
    assert_eq!(value["tests_total"], 4);

    let yaml = run_order(&fixture("passing.yaml"), "yaml").unwrap();
    assert!(yaml.contains("group: cache"));
}

#[test]
fn cli_order_unknown_format() {
    let err = run_order(&fixture("passing.yaml"), "xml").unwrap_err();
    assert!(err.contains("unknown format 'xml'"));
}

// ── Run command tests ──────────────────────────────────────

#[cfg(unix)]
#[test]
fn cli_run_passing_manifest() {
    let outcome = run_with("passing.yaml", "json");
    assert!(outcome.success);

    let graph = RenderGraph::from_json(&outcome.output).unwrap();
    assert!(graph.nodes.iter().all(|n| n.status == NodeStatus::Pass));
    assert!(graph.node("api-ext").is_some());
    assert!(graph.node("db-ext").is_some());
}

#[cfg(unix)]
#[test]
fn cli_run_failing_manifest() {
    let outcome = run_with("failing.yaml", "json");
    assert!(!outcome.success);

    let graph = RenderGraph::from_json(&outcome.output).unwrap();
    let status = |id: &str| graph.node(id).map(|n| n.status);
    assert_eq!(status("auth"), Some(NodeStatus::Fail));
    assert_eq!(status("login"), Some(NodeStatus::Fail));
    assert_eq!(status("logout"), Some(NodeStatus::Skip));
    assert_eq!(status("dashboard"), Some(NodeStatus::Skip));
    assert_eq!(status("renders"), Some(NodeStatus::Skip));
    assert_eq!(status("health"), Some(NodeStatus::Pass));
    assert_eq!(status("auth-ext"), Some(NodeStatus::Fail));
}

#[cfg(unix)]
#[test]
fn cli_run_report_json_carries_failure_message() {
    let outcome = run_with("failing.yaml", "report-json");
    let report: RunReport = serde_json::from_str(&outcome.output).unwrap();
    assert_eq!(report.order, vec!["auth", "dashboard", "health"]);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.skipped, 2);
    assert_eq!(report.summary.passed, 1);
    let error = report.groups[0].tests[0].error.as_deref().unwrap();
    assert!(error.ends_with("exited with status 1: expected 200, got 401"), "{error}");
    assert_eq!(report.groups[1].blocked_by.as_deref(), Some("auth"));
}

#[cfg(unix)]
#[test]
fn cli_run_report_yaml() {
    let outcome = run_with("passing.yaml", "report-yaml");
    assert!(outcome.output.contains("success: true"));
    assert!(outcome.output.contains("title: Applies migrations"));
}

#[cfg(unix)]
#[test]
fn cli_run_dot() {
    let outcome = run_with("failing.yaml", "dot");
    assert!(outcome.output.starts_with("digraph \"failing\""));
    assert!(outcome.output.contains("\"login\" [fillcolor=salmon];"));
}

#[cfg(unix)]
#[test]
fn cli_run_normalize_sorts_output() {
    let mut options = RunOptions::new(fixture("passing.yaml"));
    options.normalize = true;
    let outcome = run_run(&options).unwrap();
    let graph = RenderGraph::from_json(&outcome.output).unwrap();
    assert_eq!(graph.clone().normalized(), graph);
}

#[cfg(unix)]
#[test]
fn cli_run_applies_manifest_config() {
    let outcome = run_with("env.yaml", "report-json");
    assert!(outcome.success, "{}", outcome.output);
}

#[cfg(unix)]
#[test]
fn cli_run_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("result.json");
    let mut options = RunOptions::new(fixture("passing.yaml"));
    options.output = Some(out.clone());

    let outcome = run_run(&options).unwrap();
    assert!(outcome.output.contains("results written to"));
    let contents = std::fs::read_to_string(&out).unwrap();
    assert!(RenderGraph::from_json(&contents).is_ok());
}

#[test]
fn cli_run_build_error_runs_nothing() {
    let err = run_run(&RunOptions::new(fixture("cycle.yaml"))).unwrap_err();
    assert!(err.contains("circular dependency"));
}

#[test]
fn cli_run_unknown_format() {
    let mut options = RunOptions::new(fixture("passing.yaml"));
    options.format = "junit".into();
    let err = run_run(&options).unwrap_err();
    assert!(err.contains("unknown format 'junit'"));
}

// ── Visualize command tests ────────────────────────────────

#[test]
fn cli_visualize_converts_saved_graph() {
    let dot = run_visualize(&fixture("graph.json"), None).unwrap();
    assert!(dot.starts_with("digraph \"graph\""));
    assert!(dot.contains("\"b\" [fillcolor=salmon];"));
    assert!(dot.contains("\"b-ext\" -> \"a-ext\" [style=dashed, weight=3];"));
}

#[test]
fn cli_visualize_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("graph.dot");
    let message = run_visualize(&fixture("graph.json"), Some(&out)).unwrap();
    assert!(message.contains("diagram written to"));
    assert!(std::fs::read_to_string(&out).unwrap().contains("digraph"));
}

#[test]
fn cli_visualize_rejects_non_graph_input() {
    let err = run_visualize(&fixture("passing.yaml"), None).unwrap_err();
    assert!(err.contains("passing.yaml"));
}
