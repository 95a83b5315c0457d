use std::collections::{BTreeMap, HashSet, VecDeque};

use crate::graph::Group;

/// Linearize groups so every dependency precedes its dependents.
///
/// Candidates are scanned front to back; a group whose dependencies are all
/// already emitted is appended to the order, otherwise it moves to the back
/// of the worklist and is retried. Groups without dependencies keep their
/// relative candidate order.
///
/// # Errors
///
/// Returns the ids still pending when a full pass over the worklist makes no
/// progress, which only happens for cyclic or dangling input.
pub fn linearize(
    groups: &BTreeMap<String, Group>,
    candidates: Vec<String>,
) -> Result<Vec<String>, Vec<String>> {
    let mut pending: VecDeque<String> = candidates.into();
    let mut ordered = Vec::with_capacity(pending.len());
    let mut emitted: HashSet<String> = HashSet::with_capacity(pending.len());
    let mut deferred = 0;

    while let Some(id) = pending.pop_front() {
        let ready = groups.get(&id).is_none_or(|group| {
            group
                .dependencies()
                .iter()
                .all(|dep| emitted.contains(dep))
        });

        if ready {
            emitted.insert(id.clone());
            ordered.push(id);
            deferred = 0;
            continue;
        }

        pending.push_back(id);
        deferred += 1;
        if deferred >= pending.len() {
            return Err(pending.into());
        }
    }

    Ok(ordered)
}
