use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::graph::{Graph, Group, TestCase};
use crate::runner::result::{GroupRun, GroupStatus, RunSummary, TestFailure, TestRun};

/// The final state of a run: one [`GroupRun`] per group, in execution order.
///
/// Produced once by [`execute`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunState {
    order: Vec<String>,
    groups: BTreeMap<String, GroupRun>,
    duration: Duration,
}

impl RunState {
    /// Group ids in execution order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn group(&self, id: &str) -> Option<&GroupRun> {
        self.groups.get(id)
    }

    /// Groups in execution order.
    pub fn groups(&self) -> impl Iterator<Item = &GroupRun> {
        self.order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn status(&self, id: &str) -> Option<GroupStatus> {
        self.groups.get(id).map(|g| g.status)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_groups(self.groups())
    }

    /// Whether no test failed.
    pub fn success(&self) -> bool {
        self.summary().success()
    }

    /// The first failed test in execution order, with its group.
    pub fn first_failure(&self) -> Option<(&GroupRun, &TestRun)> {
        self.groups()
            .find_map(|group| group.failed_test().map(|test| (group, test)))
    }
}

/// Run every test in `graph` with its own action.
pub fn execute(graph: Graph) -> RunState {
    execute_with(graph, TestCase::run)
}

/// Run every test in `graph` through `run_test`.
///
/// Groups run in [`Graph::order`]. A group whose dependencies did not all
/// pass is skipped without invoking any of its tests. Within a group, tests
/// run in declaration order and the first failure skips the rest. A panic
/// inside `run_test` is recorded as a failure of that test.
pub fn execute_with<F>(graph: Graph, mut run_test: F) -> RunState
where
    F: FnMut(&mut TestCase) -> Result<(), TestFailure>,
{
    let start = Instant::now();
    let (order, mut groups) = graph.into_parts();
    let mut finished: BTreeMap<String, GroupRun> = BTreeMap::new();

    for id in &order {
        let Some(group) = groups.remove(id) else {
            continue;
        };

        let run = match blocking_dependency(&group, &finished).map(str::to_owned) {
            Some(dep) => skip_group(group, dep),
            None => run_group(group, &mut run_test),
        };
        finished.insert(id.clone(), run);
    }

    let state = RunState {
        order,
        groups: finished,
        duration: start.elapsed(),
    };

    let summary = state.summary();
    info!(
        passed = summary.passed,
        failed = summary.failed,
        skipped = summary.skipped,
        "run finished"
    );

    state
}

/// The first dependency of `group` that did not pass.
fn blocking_dependency<'a>(
    group: &'a Group,
    finished: &BTreeMap<String, GroupRun>,
) -> Option<&'a str> {
    group
        .dependencies()
        .iter()
        .find(|dep| {
            finished
                .get(*dep)
                .is_none_or(|run| run.status != GroupStatus::Passed)
        })
        .map(String::as_str)
}

fn skip_group(group: Group, blocked_by: String) -> GroupRun {
    let (id, dependencies, tests) = group.into_parts();
    info!(group = %id, dependency = %blocked_by, "skipping group, dependency did not pass");

    let mut run = GroupRun::new(id, dependencies.into_iter().collect());
    run.tests = tests.iter().map(TestRun::skipped).collect();
    run.status = GroupStatus::Skipped;
    run.blocked_by = Some(blocked_by);
    run
}

fn run_group<F>(group: Group, run_test: &mut F) -> GroupRun
where
    F: FnMut(&mut TestCase) -> Result<(), TestFailure>,
{
    let (id, dependencies, tests) = group.into_parts();
    let mut run = GroupRun::new(id, dependencies.into_iter().collect());
    run.status = GroupStatus::Running;
    info!(group = %run.id, tests = tests.len(), "running group");

    for mut test in tests {
        if run.status == GroupStatus::Failed {
            run.tests.push(TestRun::skipped(&test));
            continue;
        }

        let start = Instant::now();
        let outcome = invoke(&mut test, run_test);
        let elapsed = start.elapsed();

        match outcome {
            Ok(()) => {
                debug!(group = %run.id, test = %test.name, "test passed");
                run.tests.push(TestRun::passed(&test, elapsed));
            }
            Err(failure) => {
                info!(group = %run.id, test = %test.name, error = %failure, "test failed");
                run.tests.push(TestRun::failed(&test, elapsed, failure));
                run.status = GroupStatus::Failed;
            }
        }
    }

    if run.status == GroupStatus::Running {
        run.status = GroupStatus::Passed;
    }
    run
}

fn invoke<F>(test: &mut TestCase, run_test: &mut F) -> Result<(), TestFailure>
where
    F: FnMut(&mut TestCase) -> Result<(), TestFailure>,
{
    panic::catch_unwind(AssertUnwindSafe(|| run_test(test)))
        .unwrap_or_else(|payload| Err(TestFailure::from_panic(payload)))
}
