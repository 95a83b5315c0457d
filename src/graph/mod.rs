pub mod analysis;
pub mod builder;
pub mod order;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::runner::action::TestAction;
use crate::runner::result::TestFailure;

/// A test inside a group: its identity plus the action that runs it.
pub struct TestCase {
    pub name: String,
    pub title: String,
    action: Box<dyn TestAction>,
}

impl TestCase {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        action: Box<dyn TestAction>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            action,
        }
    }

    /// Invoke the test's action once.
    ///
    /// # Errors
    ///
    /// Returns the [`TestFailure`] reported by the action.
    pub fn run(&mut self) -> Result<(), TestFailure> {
        self.action.run()
    }
}

impl fmt::Debug for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

/// A named bucket of tests sharing ordering constraints.
#[derive(Debug)]
pub struct Group {
    id: String,
    dependencies: BTreeSet<String>,
    tests: Vec<TestCase>,
}

impl Group {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            dependencies: BTreeSet::new(),
            tests: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Ids of the groups that must pass before this one runs, sorted.
    pub fn dependencies(&self) -> &BTreeSet<String> {
        &self.dependencies
    }

    /// Tests in declaration order.
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    pub(crate) fn into_parts(self) -> (String, BTreeSet<String>, Vec<TestCase>) {
        (self.id, self.dependencies, self.tests)
    }
}

/// A validated dependency graph of groups plus its execution order.
///
/// Only [`builder::build`] creates one, so every dependency is a known group,
/// the relation is acyclic, and each dependency precedes its dependents in
/// [`Graph::order`].
#[derive(Debug)]
pub struct Graph {
    order: Vec<String>,
    groups: BTreeMap<String, Group>,
}

impl Graph {
    /// Group ids in execution order.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.get(id)
    }

    /// Groups in execution order.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn test_count(&self) -> usize {
        self.groups.values().map(|g| g.tests.len()).sum()
    }

    pub fn dependency_count(&self) -> usize {
        self.groups.values().map(|g| g.dependencies.len()).sum()
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, BTreeMap<String, Group>) {
        (self.order, self.groups)
    }
}
