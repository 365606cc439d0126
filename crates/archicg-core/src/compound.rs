//! Collapse/expand and reparenting of compound nodes.
//!
//! Collapse state is pure view state: children stay logically owned by a
//! collapsed parent, only their visibility is suppressed. Every function
//! here returns the ids it actually changed so the undo log can invert the
//! exact delta.

use crate::config::EditorConfig;
use crate::model::{EdgeRecord, ModelGraph, NodeRecord};
use crate::{Error, Result};

/// One reparenting step. `parent: None` detaches the node to the root.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentChange {
    pub id: String,
    pub parent: Option<String>,
}

/// What [`reparent`] did: the inverse moves, plus any empty compound
/// parents (and their incident edges) deleted by the auto-remove policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReparentOutcome {
    pub previous: Vec<ParentChange>,
    pub removed_nodes: Vec<NodeRecord>,
    pub removed_edges: Vec<EdgeRecord>,
}

/// Marks the given nodes collapsed. Already-collapsed nodes and ids without
/// children are skipped; the returned ids are exactly those that changed.
pub fn collapse_nodes(graph: &mut ModelGraph, ids: &[String]) -> Vec<String> {
    let mut changed = Vec::new();
    for id in ids {
        if graph.children(id).is_empty() {
            continue;
        }
        if let Some(node) = graph.node_mut(id) {
            if !node.collapsed {
                node.collapsed = true;
                changed.push(id.clone());
            }
        }
    }
    changed
}

/// Inverse of [`collapse_nodes`]; idempotent the same way.
pub fn expand_nodes(graph: &mut ModelGraph, ids: &[String]) -> Vec<String> {
    let mut changed = Vec::new();
    for id in ids {
        if let Some(node) = graph.node_mut(id) {
            if node.collapsed {
                node.collapsed = false;
                changed.push(id.clone());
            }
        }
    }
    changed
}

/// Every compound node, shallowest first: the order in which a full
/// collapse is applied.
pub fn collapse_all_order(graph: &ModelGraph) -> Vec<String> {
    let mut ids = graph.compound_node_ids();
    ids.sort_by_key(|id| graph.depth(id));
    ids
}

/// Every compound node, deepest first: a grandchild becomes visible only
/// once its direct parent is expanded.
pub fn expand_all_order(graph: &ModelGraph) -> Vec<String> {
    let mut ids = graph.compound_node_ids();
    ids.sort_by_key(|id| std::cmp::Reverse(graph.depth(id)));
    ids
}

/// The given nodes plus their compound descendants, shallowest first.
pub fn recursive_order(graph: &ModelGraph, ids: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for id in ids {
        if !out.contains(id) {
            out.push(id.clone());
        }
        for d in graph.descendants(id) {
            let d = d.to_string();
            if !out.contains(&d) {
                out.push(d);
            }
        }
    }
    out.retain(|id| !graph.children(id).is_empty());
    out.sort_by_key(|id| graph.depth(id));
    out
}

/// Applies a list of reparenting moves. All moves apply or none: a cycle
/// rejection (or unknown id) rolls back the moves already made. When the
/// auto-remove policy is active, parents left childless by the moves are
/// deleted and their records returned for the undo log.
pub fn reparent(
    graph: &mut ModelGraph,
    config: &EditorConfig,
    moves: &[ParentChange],
) -> Result<ReparentOutcome> {
    let mut previous: Vec<ParentChange> = Vec::new();
    let mut vacated: Vec<String> = Vec::new();

    for mv in moves {
        let old_parent = match graph.set_parent(&mv.id, mv.parent.as_deref()) {
            Ok(prev) => prev,
            Err(err) => {
                // Roll back so the graph is untouched on failure.
                for done in previous.iter().rev() {
                    graph
                        .set_parent(&done.id, done.parent.as_deref())
                        .expect("rollback of an applied reparent cannot fail");
                }
                return Err(err);
            }
        };
        if let Some(old) = &old_parent {
            if !vacated.contains(old) {
                vacated.push(old.clone());
            }
        }
        previous.push(ParentChange {
            id: mv.id.clone(),
            parent: old_parent,
        });
    }

    let mut removed_nodes: Vec<NodeRecord> = Vec::new();
    let mut removed_edges: Vec<EdgeRecord> = Vec::new();
    if config.auto_remove_empty_parents {
        for old in vacated {
            if graph.has_node(&old) && graph.children(&old).is_empty() {
                tracing::debug!(id = %old, "removing empty compound node");
                for edge_id in graph.incident_edge_ids(&old) {
                    removed_edges.push(graph.remove_edge(&edge_id)?);
                }
                removed_nodes.push(graph.remove_node(&old)?);
            }
        }
    }

    Ok(ReparentOutcome {
        previous,
        removed_nodes,
        removed_edges,
    })
}

/// Validates that a node exists before a collapse/expand command targets it.
pub fn require_node(graph: &ModelGraph, id: &str) -> Result<()> {
    if graph.has_node(id) {
        Ok(())
    } else {
        Err(Error::MissingNode { id: id.to_string() })
    }
}
