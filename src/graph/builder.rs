use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::declare::{BuildError, Declaration, validate};
use crate::graph::analysis::{check_circular_dependencies, check_missing_groups, root_groups};
use crate::graph::order::linearize;
use crate::graph::{Graph, Group};

/// Build a validated, ordered [`Graph`] from test declarations.
///
/// Declarations are folded into groups in the order given; group ids are
/// then sorted so the resulting order does not depend on declaration order
/// beyond what the dependencies require.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered: a malformed declaration,
/// a repeated `after` declaration for a group, a duplicate test name, an
/// unknown dependency, or a dependency cycle.
pub fn build(declarations: Vec<Declaration>) -> Result<Graph, BuildError> {
    let groups = fold(declarations)?;
    let candidates: Vec<String> = groups.keys().cloned().collect();

    check_missing_groups(&groups)?;
    check_circular_dependencies(&groups)?;
    debug!(roots = %root_groups(&groups).join(","), "dependencies resolved");

    let order = linearize(&groups, candidates)
        .map_err(|remaining| BuildError::Unorderable { remaining })?;

    info!(
        groups = order.len(),
        order = %order.join(","),
        "built dependency graph"
    );

    Ok(Graph { order, groups })
}

fn fold(declarations: Vec<Declaration>) -> Result<BTreeMap<String, Group>, BuildError> {
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for declaration in declarations {
        let valid = validate(declaration)?;
        let group = groups
            .entry(valid.group.clone())
            .or_insert_with(|| Group::new(&valid.group));

        if let Some(dependencies) = valid.dependencies {
            if !group.dependencies.is_empty() {
                return Err(BuildError::RepeatedAfterDeclaration {
                    group: valid.group,
                    context: valid.context,
                });
            }
            group.dependencies = dependencies;
        }

        if group.tests.iter().any(|t| t.name == valid.test.name) {
            return Err(BuildError::DuplicateTest {
                group: valid.group,
                test: valid.test.name,
            });
        }

        debug!(group = %valid.group, test = %valid.test.name, "declared test");
        group.tests.push(valid.test);
    }

    Ok(groups)
}
