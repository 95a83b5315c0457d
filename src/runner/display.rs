use crate::runner::executor::RunState;
use crate::runner::result::{GroupRun, GroupStatus};

/// Format a status label for terminal output.
fn status_label(status: GroupStatus) -> &'static str {
    match status {
        GroupStatus::Pending => "PENDING",
        GroupStatus::Running => "RUNNING",
        GroupStatus::Passed => "PASSED",
        GroupStatus::Failed => "FAILED",
        GroupStatus::Skipped => "SKIPPED",
    }
}

/// Format the run header line.
pub fn format_run_header(source: &str, groups: usize, tests: usize) -> String {
    format!("Running {source} ({groups} groups, {tests} tests)...\n")
}

/// Format a group result once the group has finished.
pub fn format_group_result(group: &GroupRun, position: usize, total: usize) -> String {
    let status = status_label(group.status);
    let tests = group.tests.len();
    let noun = if tests == 1 { "test" } else { "tests" };
    let mut line = format!("  [{position}/{total}] [{status}] {} ({tests} {noun})", group.id);

    if let Some(test) = group.failed_test() {
        let message = test
            .failure
            .as_ref()
            .map_or("test failed", |f| f.message.as_str());
        line.push_str(&format!("\n         → {}: {message}", test.name));
    }

    if let Some(dep) = &group.blocked_by {
        line.push_str(&format!("\n         → dependency '{dep}' did not pass"));
    }

    line
}

/// Format the final summary after all groups complete.
pub fn format_summary(state: &RunState) -> String {
    let summary = state.summary();
    let duration_secs = state.duration().as_secs_f64();
    let mut parts = Vec::new();

    if summary.passed > 0 {
        parts.push(format!("{} passed", summary.passed));
    }
    if summary.failed > 0 {
        parts.push(format!("{} failed", summary.failed));
    }
    if summary.skipped > 0 {
        parts.push(format!("{} skipped", summary.skipped));
    }

    if parts.is_empty() {
        parts.push("0 tests".into());
    }

    format!("\nResults: {} ({:.1}s)", parts.join(", "), duration_secs)
}

/// Format every group of a finished run, one block per group.
pub fn format_run(state: &RunState) -> String {
    let total = state.order().len();
    state
        .groups()
        .enumerate()
        .map(|(i, group)| format_group_result(group, i + 1, total))
        .collect::<Vec<_>>()
        .join("\n")
}
