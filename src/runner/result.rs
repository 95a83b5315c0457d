use std::any::Any;
use std::fmt;
use std::time::Duration;

use crate::graph::TestCase;

/// Lifecycle of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestStatus {
    Pending,
    Passed,
    Failed,
    Skipped,
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Lifecycle of a group: `pending -> running -> {passed, failed, skipped}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupStatus {
    Pending,
    Running,
    Passed,
    Failed,
    Skipped,
}

impl GroupStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Passed => write!(f, "passed"),
            Self::Failed => write!(f, "failed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// The failure reported by a test action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    pub message: String,
}

impl TestFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Turn a panic payload into a failure. `&str` and `String` payloads keep
    /// their text; anything else gets a placeholder.
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        let text = payload
            .downcast::<&'static str>()
            .map(|s| s.to_string())
            .or_else(|payload| payload.downcast::<String>().map(|s| *s))
            .unwrap_or_else(|_| String::from("Box<dyn Any>"));
        Self::new(format!("panicked: {text}"))
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TestFailure {}

impl From<&str> for TestFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for TestFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// Outcome of one test within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun {
    pub name: String,
    pub title: String,
    pub status: TestStatus,
    pub failure: Option<TestFailure>,
    pub duration: Duration,
}

impl TestRun {
    pub fn passed(test: &TestCase, duration: Duration) -> Self {
        Self {
            name: test.name.clone(),
            title: test.title.clone(),
            status: TestStatus::Passed,
            failure: None,
            duration,
        }
    }

    pub fn failed(test: &TestCase, duration: Duration, failure: TestFailure) -> Self {
        Self {
            name: test.name.clone(),
            title: test.title.clone(),
            status: TestStatus::Failed,
            failure: Some(failure),
            duration,
        }
    }

    /// A test that was never invoked.
    pub fn skipped(test: &TestCase) -> Self {
        Self {
            name: test.name.clone(),
            title: test.title.clone(),
            status: TestStatus::Skipped,
            failure: None,
            duration: Duration::ZERO,
        }
    }
}

/// Outcome of one group within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRun {
    pub id: String,
    /// Sorted dependency ids.
    pub dependencies: Vec<String>,
    pub status: GroupStatus,
    pub tests: Vec<TestRun>,
    /// The first dependency that did not pass, for skipped groups.
    pub blocked_by: Option<String>,
}

impl GroupRun {
    pub fn new(id: impl Into<String>, dependencies: Vec<String>) -> Self {
        Self {
            id: id.into(),
            dependencies,
            status: GroupStatus::Pending,
            tests: Vec::new(),
            blocked_by: None,
        }
    }

    /// The test that failed the group, if any.
    pub fn failed_test(&self) -> Option<&TestRun> {
        self.tests.iter().find(|t| t.status == TestStatus::Failed)
    }
}

/// Counts over a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub groups: usize,
    pub tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    /// Whether no test failed.
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    pub fn from_groups<'a>(groups: impl IntoIterator<Item = &'a GroupRun>) -> Self {
        let mut summary = Self::default();
        for group in groups {
            summary.groups += 1;
            for test in &group.tests {
                summary.tests += 1;
                match test.status {
                    TestStatus::Passed => summary.passed += 1,
                    TestStatus::Failed => summary.failed += 1,
                    TestStatus::Skipped | TestStatus::Pending => summary.skipped += 1,
                }
            }
        }
        summary
    }
}
