use serde::{Deserialize, Serialize};

use crate::runner::executor::RunState;
use crate::runner::result::{GroupRun, TestRun};

/// Serializable run result for emitter output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub source: String,
    pub duration_ms: u64,
    pub order: Vec<String>,
    pub groups: Vec<GroupReport>,
    pub summary: SummaryReport,
}

/// A single group's outcome in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    pub position: usize,
    pub id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,
    pub tests: Vec<TestReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReport {
    pub name: String,
    pub title: String,
    pub status: String,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary statistics in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub groups: usize,
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub success: bool,
}

fn test_report(test: &TestRun) -> TestReport {
    TestReport {
        name: test.name.clone(),
        title: test.title.clone(),
        status: test.status.to_string(),
        duration_ms: test.duration.as_millis() as u64,
        error: test.failure.as_ref().map(|f| f.message.clone()),
    }
}

fn group_report(position: usize, group: &GroupRun) -> GroupReport {
    GroupReport {
        position,
        id: group.id.clone(),
        status: group.status.to_string(),
        dependencies: group.dependencies.clone(),
        blocked_by: group.blocked_by.clone(),
        tests: group.tests.iter().map(test_report).collect(),
    }
}

/// Convert a finished [`RunState`] into a serializable [`RunReport`].
pub fn to_report(state: &RunState, source: &str) -> RunReport {
    let summary = state.summary();
    RunReport {
        source: source.to_owned(),
        duration_ms: state.duration().as_millis() as u64,
        order: state.order().to_vec(),
        groups: state
            .groups()
            .enumerate()
            .map(|(i, group)| group_report(i + 1, group))
            .collect(),
        summary: SummaryReport {
            groups: summary.groups,
            tests: summary.tests,
            passed: summary.passed,
            failed: summary.failed,
            skipped: summary.skipped,
            success: summary.success(),
        },
    }
}

/// Emit a run report as JSON.
pub fn emit_report_json(report: &RunReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{ \"error\": \"{e}\" }}"))
}

/// Emit a run report as YAML.
pub fn emit_report_yaml(report: &RunReport) -> String {
    serde_yaml::to_string(report).unwrap_or_else(|e| format!("# Error serializing report: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::Declaration;
    use crate::graph::builder::build;
    use crate::runner::executor::execute;
    use crate::runner::result::TestFailure;

    fn mixed_report() -> RunReport {
        let graph = build(vec![
            Declaration::in_group("auth", "login", || {
                Err::<(), _>(TestFailure::new("expected 200, got 401"))
            })
            .with_title("Logs in"),
            Declaration::in_group("db", "migrate", || Ok::<(), TestFailure>(())),
            Declaration::in_group("ui", "renders", || Ok::<(), TestFailure>(())).after(["auth"]),
        ])
        .unwrap();
        to_report(&execute(graph), "suite.yaml")
    }

    #[test]
    fn report_lists_groups_in_execution_order() {
        let report = mixed_report();
        assert_eq!(report.order, vec!["auth", "db", "ui"]);
        let ids: Vec<&str> = report.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, report.order);
        assert_eq!(report.groups[2].position, 3);
    }

    #[test]
    fn report_carries_statuses_and_errors() {
        let report = mixed_report();
        let auth = &report.groups[0];
        assert_eq!(auth.status, "failed");
        assert_eq!(auth.tests[0].title, "Logs in");
        assert_eq!(
            auth.tests[0].error.as_deref(),
            Some("expected 200, got 401")
        );

        let ui = &report.groups[2];
        assert_eq!(ui.status, "skipped");
        assert_eq!(ui.blocked_by.as_deref(), Some("auth"));
        assert_eq!(ui.dependencies, vec!["auth"]);
        assert_eq!(ui.tests[0].status, "skipped");
    }

    #[test]
    fn report_summary() {
        let summary = mixed_report().summary;
        assert_eq!(summary.groups, 3);
        assert_eq!(summary.tests, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.success);
    }

    #[test]
    fn json_report_is_parseable() {
        let report = mixed_report();
        let json = emit_report_json(&report);
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
        assert!(!json.contains("\"blocked_by\": null"));
    }

    #[test]
    fn yaml_report_is_parseable() {
        let report = mixed_report();
        let yaml = emit_report_yaml(&report);
        assert!(yaml.contains("source: suite.yaml"));
        let parsed: RunReport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.summary, report.summary);
    }
}
