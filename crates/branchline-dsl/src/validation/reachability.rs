use std::collections::HashSet;

use crate::model::Dialogue;
use crate::validation::{error_codes, ValidationDiagnostic, Validator};

/// Reports nodes that cannot be reached from the start node
pub struct ReachabilityValidator;

impl ReachabilityValidator {
    /// Create a new reachability validator
    pub fn new() -> Self {
        ReachabilityValidator
    }
}

/// Collect every node reachable from `start`.
///
/// Depth-first over all outgoing edges with an explicit stack; each node is
/// expanded at most once, so cycles terminate. References to missing nodes
/// are ignored here (the reference validator reports them).
pub fn reachable_nodes(dialogue: &Dialogue) -> HashSet<&str> {
    let mut visited = HashSet::with_capacity(dialogue.nodes.len());
    let Some(start) = dialogue.start.as_deref() else {
        return visited;
    };

    let mut stack = vec![start];
    while let Some(node_id) = stack.pop() {
        let Some((_, key, node)) = dialogue.nodes.get_full(node_id) else {
            continue;
        };
        if !visited.insert(key.as_str()) {
            continue;
        }
        // Push in reverse so the first edge is explored first
        for (_, target) in node.edges().into_iter().rev() {
            if !visited.contains(target.as_str()) {
                stack.push(target.as_str());
            }
        }
    }

    visited
}

impl Validator for ReachabilityValidator {
    fn validate(&self, dialogue: &Dialogue) -> Vec<ValidationDiagnostic> {
        let reachable = reachable_nodes(dialogue);

        dialogue
            .nodes
            .keys()
            .filter(|node_id| !reachable.contains(node_id.as_str()))
            .map(|node_id| {
                ValidationDiagnostic::new(
                    error_codes::UNREACHABLE_NODE,
                    format!("Node '{}' is unreachable from start", node_id),
                )
                .at_node(node_id)
            })
            .collect()
    }
}
