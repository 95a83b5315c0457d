use std::collections::{BTreeMap, HashMap};

use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::declare::BuildError;
use crate::graph::Group;

/// Group-to-dependency edges as a petgraph `DiGraph`, with an id lookup.
pub struct DependencyGraph {
    pub graph: DiGraph<String, ()>,
    pub indices: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph from groups whose dependencies are all known.
    /// Edges point from a group to each group it depends on.
    pub fn new(groups: &BTreeMap<String, Group>) -> Self {
        let mut graph = DiGraph::new();
        let indices: HashMap<String, NodeIndex> = groups
            .keys()
            .map(|id| (id.clone(), graph.add_node(id.clone())))
            .collect();

        for group in groups.values() {
            let from = indices[group.id()];
            for dep in group.dependencies() {
                if let Some(&to) = indices.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, indices }
    }

    /// Shortest dependency chain from `from` to `to`, both inclusive.
    pub fn path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let start = *self.indices.get(from)?;
        let goal = *self.indices.get(to)?;
        let (_, path) = astar(&self.graph, start, |n| n == goal, |_| 1, |_| 0)?;
        Some(path.into_iter().map(|idx| self.graph[idx].clone()).collect())
    }
}

/// Every dependency must name a declared group.
///
/// # Errors
///
/// Returns [`BuildError::GroupNotFound`] for the first unknown dependency,
/// scanning groups and their dependencies in sorted order.
pub fn check_missing_groups(groups: &BTreeMap<String, Group>) -> Result<(), BuildError> {
    for group in groups.values() {
        if let Some(dep) = group
            .dependencies()
            .iter()
            .find(|dep| !groups.contains_key(*dep))
        {
            return Err(BuildError::GroupNotFound {
                id: dep.clone(),
                required_by: group.id().to_owned(),
            });
        }
    }
    Ok(())
}

/// The dependency relation must be acyclic.
///
/// For each group `g` and dependency `d` (both in sorted order), if `d`
/// reaches `g` the cycle is reported as `g->d->...->g`.
///
/// # Errors
///
/// Returns [`BuildError::CircularDependency`] carrying the first cycle found.
pub fn check_circular_dependencies(groups: &BTreeMap<String, Group>) -> Result<(), BuildError> {
    let deps = DependencyGraph::new(groups);

    for group in groups.values() {
        for dep in group.dependencies() {
            if let Some(path) = deps.path(dep, group.id()) {
                let mut chain = Vec::with_capacity(path.len() + 1);
                chain.push(group.id().to_owned());
                chain.extend(path);
                return Err(BuildError::CircularDependency { chain });
            }
        }
    }
    Ok(())
}

/// Ids of groups with no dependencies, sorted.
pub fn root_groups(groups: &BTreeMap<String, Group>) -> Vec<&str> {
    groups
        .values()
        .filter(|g| g.dependencies().is_empty())
        .map(Group::id)
        .collect()
}
