//! Projection of a finished run into a node/link graph for visualization.
//!
//! The serialized shape is the wire contract consumed by graph viewers:
//!
//! ```json
//! {"nodes":[{"id":"a","status":"pass"}],"links":[{"source":"t1","target":"a","value":1}]}
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::runner::executor::RunState;
use crate::runner::result::{GroupStatus, TestStatus};

/// Weight of a link from a test to its group.
pub const TEST_LINK_WEIGHT: u32 = 1;
/// Weight of the links that render a group-to-group dependency.
pub const DEPENDENCY_LINK_WEIGHT: u32 = 3;
/// Suffix of the proxy nodes that render a dependency.
pub const PROXY_SUFFIX: &str = "-ext";

/// Node status as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pass,
    Fail,
    Skip,
}

impl From<TestStatus> for NodeStatus {
    fn from(status: TestStatus) -> Self {
        match status {
            TestStatus::Passed => Self::Pass,
            TestStatus::Failed => Self::Fail,
            TestStatus::Skipped | TestStatus::Pending => Self::Skip,
        }
    }
}

impl From<GroupStatus> for NodeStatus {
    fn from(status: GroupStatus) -> Self {
        match status {
            GroupStatus::Passed => Self::Pass,
            GroupStatus::Failed => Self::Fail,
            GroupStatus::Skipped | GroupStatus::Pending | GroupStatus::Running => Self::Skip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: String,
    pub status: NodeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RenderLink {
    pub source: String,
    pub target: String,
    pub value: u32,
}

impl RenderLink {
    /// Whether the link renders a group-to-group dependency.
    pub fn is_dependency(&self) -> bool {
        self.value == DEPENDENCY_LINK_WEIGHT
    }
}

/// A renderable graph: nodes with status plus weighted links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderGraph {
    pub nodes: Vec<RenderNode>,
    pub links: Vec<RenderLink>,
}

impl RenderGraph {
    /// Sort nodes by id and links by source, then target.
    pub fn normalized(mut self) -> Self {
        self.nodes.sort();
        self.links.sort();
        self
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Serialize to the compact wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a graph from the wire format.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a valid render graph.
    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

/// Accumulates nodes and links, dropping repeats.
#[derive(Default)]
struct Projection {
    graph: RenderGraph,
    seen_nodes: HashSet<String>,
    seen_links: HashSet<(String, String)>,
}

impl Projection {
    fn node(&mut self, id: &str, status: NodeStatus) {
        if self.seen_nodes.insert(id.to_owned()) {
            self.graph.nodes.push(RenderNode {
                id: id.to_owned(),
                status,
            });
        }
    }

    fn link(&mut self, source: &str, target: &str, value: u32) {
        if self
            .seen_links
            .insert((source.to_owned(), target.to_owned()))
        {
            self.graph.links.push(RenderLink {
                source: source.to_owned(),
                target: target.to_owned(),
                value,
            });
        }
    }
}

fn proxy_id(group: &str) -> String {
    format!("{group}{PROXY_SUFFIX}")
}

/// Status shown on `X-ext`: `X`'s own status when some group depends on `X`,
/// otherwise the status of `X`'s first dependency.
fn proxy_status(state: &RunState, targets: &HashSet<&str>, id: &str) -> NodeStatus {
    let shown = if targets.contains(id) {
        Some(id)
    } else {
        state
            .group(id)
            .and_then(|group| group.dependencies.first())
            .map(String::as_str)
    };
    shown
        .and_then(|id| state.status(id))
        .map_or(NodeStatus::Skip, NodeStatus::from)
}

/// Project a finished run into a [`RenderGraph`].
///
/// Groups are visited in execution order. Each group contributes its own
/// node and one node per test linked to the group. A group `A` with
/// dependencies gets the proxy `A-ext -> A`, and each dependency `B` adds
/// `A-ext -> B-ext -> B`. Proxy statuses follow [`proxy_status`], so they do
/// not depend on which group emitted a proxy first. Nodes and links already
/// emitted are not emitted again.
pub fn project(state: &RunState) -> RenderGraph {
    let targets: HashSet<&str> = state
        .groups()
        .flat_map(|group| group.dependencies.iter().map(String::as_str))
        .collect();
    let mut projection = Projection::default();

    for group in state.groups() {
        projection.node(&group.id, group.status.into());

        for test in &group.tests {
            projection.node(&test.name, test.status.into());
            projection.link(&test.name, &group.id, TEST_LINK_WEIGHT);
        }

        if group.dependencies.is_empty() {
            continue;
        }

        let from = proxy_id(&group.id);
        projection.node(&from, proxy_status(state, &targets, &group.id));
        projection.link(&from, &group.id, DEPENDENCY_LINK_WEIGHT);

        for dep in &group.dependencies {
            let to = proxy_id(dep);
            projection.node(&to, proxy_status(state, &targets, dep));
            projection.link(&from, &to, DEPENDENCY_LINK_WEIGHT);
            projection.link(&to, dep, DEPENDENCY_LINK_WEIGHT);
        }
    }

    projection.graph
}
