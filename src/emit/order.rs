use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;

/// The execution order of a built graph, without running anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReport {
    pub groups_total: usize,
    pub tests_total: usize,
    pub steps: Vec<OrderStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStep {
    pub position: usize,
    pub group: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    pub tests: Vec<String>,
}

pub fn to_order_report(graph: &Graph) -> OrderReport {
    let steps = graph
        .groups()
        .enumerate()
        .map(|(i, group)| OrderStep {
            position: i + 1,
            group: group.id().to_owned(),
            depends_on: group.dependencies().iter().cloned().collect(),
            tests: group.tests().iter().map(|t| t.name.clone()).collect(),
        })
        .collect();

    OrderReport {
        groups_total: graph.len(),
        tests_total: graph.test_count(),
        steps,
    }
}

/// Emit the order as plain text, one group per line.
pub fn emit_order_text(report: &OrderReport) -> String {
    let mut out = String::new();
    for step in &report.steps {
        let _ = write!(out, "{}. {}", step.position, step.group);
        if !step.depends_on.is_empty() {
            let _ = write!(out, " (after {})", step.depends_on.join(", "));
        }
        let _ = writeln!(out, ": {}", step.tests.join(", "));
    }
    out
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn emit_order_json(report: &OrderReport) -> Result<String, String> {
    serde_json::to_string_pretty(report).map_err(|e| format!("json serialization failed: {e}"))
}

/// # Errors
///
/// Returns an error if YAML serialization fails.
pub fn emit_order_yaml(report: &OrderReport) -> Result<String, String> {
    serde_yaml::to_string(report).map_err(|e| format!("yaml serialization failed: {e}"))
}
