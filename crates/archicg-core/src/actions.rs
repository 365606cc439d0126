//! The builtin reversible actions every editor registers up front.
//!
//! Handlers are symmetric wherever the mutation is its own inverse shape
//! (label/kind/specialization swaps); the rest come in explicit pairs.
//! Each handler either completes fully or restores the graph to its state
//! at entry before returning the error.

use crate::compound::{self, ParentChange};
use crate::config::EditorConfig;
use crate::edge_group;
use crate::model::{EdgeRecord, ModelGraph, NodeRecord};
use crate::undo::{
    ActionRegistry, KindChange, LabelChange, Payload, SpecializationChange,
};
use crate::{Error, Result};

pub const ADD_ELEMENTS: &str = "add-elements";
pub const REMOVE_ELEMENTS: &str = "remove-elements";
pub const CHANGE_LABELS: &str = "change-labels";
pub const CHANGE_NODE_KINDS: &str = "change-node-kinds";
pub const CHANGE_EDGE_KINDS: &str = "change-edge-kinds";
pub const CHANGE_SPECIALIZATIONS: &str = "change-specializations";
pub const REPARENT: &str = "reparent";
pub const COLLAPSE_NODES: &str = "collapse-nodes";
pub const EXPAND_NODES: &str = "expand-nodes";
pub const COLLAPSE_EDGES: &str = "collapse-edges";
pub const EXPAND_EDGES: &str = "expand-edges";
pub const EXPAND_ALL_EDGES: &str = "expand-all-edges";

fn mismatch(name: &str) -> Error {
    Error::PayloadMismatch {
        name: name.to_string(),
    }
}

/// Inserts nodes (then parent links, then edges). Rolls back on failure.
fn add_elements(graph: &mut ModelGraph, nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Result<()> {
    let mut added_nodes: Vec<String> = Vec::new();
    let mut added_edges: Vec<String> = Vec::new();
    let mut rollback = |graph: &mut ModelGraph, added_nodes: &[String], added_edges: &[String]| {
        for id in added_edges.iter().rev() {
            let _ = graph.remove_edge(id);
        }
        for id in added_nodes.iter().rev() {
            let _ = graph.remove_node(id);
        }
    };

    for node in nodes {
        if let Err(err) = graph.add_node(&node.id, node.data()) {
            rollback(graph, &added_nodes, &added_edges);
            return Err(err);
        }
        added_nodes.push(node.id.clone());
    }
    // Parent links second: a parent may itself be in the batch.
    for node in nodes {
        if let Some(parent) = &node.parent_id {
            if let Err(err) = graph.set_parent(&node.id, Some(parent)) {
                rollback(graph, &added_nodes, &added_edges);
                return Err(err);
            }
        }
    }
    for edge in edges {
        if let Err(err) = graph.add_edge(edge) {
            rollback(graph, &added_nodes, &added_edges);
            return Err(err);
        }
        added_edges.push(edge.id.clone());
    }
    Ok(())
}

/// Removes the listed edges then nodes (children before parents). Rolls
/// back on failure.
fn remove_elements(
    graph: &mut ModelGraph,
    nodes: &[NodeRecord],
    edges: &[EdgeRecord],
) -> Result<()> {
    let mut removed_nodes: Vec<NodeRecord> = Vec::new();
    let mut removed_edges: Vec<EdgeRecord> = Vec::new();

    let mut fail = |graph: &mut ModelGraph,
                    removed_nodes: &[NodeRecord],
                    removed_edges: &[EdgeRecord],
                    err: Error| {
        let nodes: Vec<NodeRecord> = removed_nodes.iter().rev().cloned().collect();
        let edges: Vec<EdgeRecord> = removed_edges.iter().rev().cloned().collect();
        if let Err(rollback_err) = add_elements(graph, &nodes, &edges) {
            tracing::warn!(error = %rollback_err, "removal rollback failed");
        }
        err
    };

    for edge in edges {
        match graph.remove_edge(&edge.id) {
            Ok(record) => removed_edges.push(record),
            Err(err) => return Err(fail(graph, &removed_nodes, &removed_edges, err)),
        }
    }
    // Deepest first so no child silently loses its parent link.
    let mut ordered: Vec<&NodeRecord> = nodes.iter().collect();
    ordered.sort_by_key(|n| std::cmp::Reverse(graph.depth(&n.id)));
    for node in ordered {
        match graph.remove_node(&node.id) {
            Ok(record) => removed_nodes.push(record),
            Err(err) => return Err(fail(graph, &removed_nodes, &removed_edges, err)),
        }
    }
    Ok(())
}

/// Swaps labels, returning the previous values. Its own inverse.
fn swap_labels(graph: &mut ModelGraph, changes: Vec<LabelChange>) -> Result<Vec<LabelChange>> {
    let mut previous: Vec<LabelChange> = Vec::new();
    for change in changes {
        let slot = if graph.has_node(&change.id) {
            graph.node_mut(&change.id).map(|n| &mut n.label)
        } else {
            graph.edge_mut(&change.id).map(|e| &mut e.label)
        };
        let Some(slot) = slot else {
            rollback_labels(graph, previous);
            return Err(Error::MissingNode { id: change.id });
        };
        previous.push(LabelChange {
            id: change.id,
            label: std::mem::replace(slot, change.label),
        });
    }
    Ok(previous)
}

fn rollback_labels(graph: &mut ModelGraph, previous: Vec<LabelChange>) {
    for change in previous.into_iter().rev() {
        let slot = if graph.has_node(&change.id) {
            graph.node_mut(&change.id).map(|n| &mut n.label)
        } else {
            graph.edge_mut(&change.id).map(|e| &mut e.label)
        };
        if let Some(slot) = slot {
            *slot = change.label;
        }
    }
}

fn swap_node_kinds(graph: &mut ModelGraph, changes: Vec<KindChange>) -> Result<Vec<KindChange>> {
    let mut previous: Vec<KindChange> = Vec::new();
    for change in changes {
        let Some(node) = graph.node_mut(&change.id) else {
            for prev in previous.into_iter().rev() {
                if let Some(node) = graph.node_mut(&prev.id) {
                    node.kind = prev.kind;
                }
            }
            return Err(Error::MissingNode { id: change.id });
        };
        previous.push(KindChange {
            id: change.id,
            kind: std::mem::replace(&mut node.kind, change.kind),
        });
    }
    Ok(previous)
}

fn swap_edge_kinds(graph: &mut ModelGraph, changes: Vec<KindChange>) -> Result<Vec<KindChange>> {
    let mut previous: Vec<KindChange> = Vec::new();
    for change in changes {
        let Some(edge) = graph.edge_mut(&change.id) else {
            for prev in previous.into_iter().rev() {
                if let Some(edge) = graph.edge_mut(&prev.id) {
                    edge.kind = prev.kind;
                }
            }
            return Err(Error::MissingEdge { id: change.id });
        };
        previous.push(KindChange {
            id: change.id,
            kind: std::mem::replace(&mut edge.kind, change.kind),
        });
    }
    Ok(previous)
}

fn swap_specializations(
    graph: &mut ModelGraph,
    changes: Vec<SpecializationChange>,
) -> Result<Vec<SpecializationChange>> {
    let mut previous: Vec<SpecializationChange> = Vec::new();
    for change in changes {
        let slot = if graph.has_node(&change.id) {
            graph.node_mut(&change.id).map(|n| &mut n.specialization)
        } else {
            graph.edge_mut(&change.id).map(|e| &mut e.specialization)
        };
        let Some(slot) = slot else {
            for prev in previous.into_iter().rev() {
                let slot = if graph.has_node(&prev.id) {
                    graph.node_mut(&prev.id).map(|n| &mut n.specialization)
                } else {
                    graph.edge_mut(&prev.id).map(|e| &mut e.specialization)
                };
                if let Some(slot) = slot {
                    *slot = prev.specialization;
                }
            }
            return Err(Error::MissingNode { id: change.id });
        };
        previous.push(SpecializationChange {
            id: change.id,
            specialization: std::mem::replace(slot, change.specialization),
        });
    }
    Ok(previous)
}

impl ActionRegistry {
    /// Registry primed with every action the [`Editor`](crate::Editor)
    /// routes mutations through.
    pub fn builtin() -> Self {
        let mut reg = Self::new();

        reg.register(
            ADD_ELEMENTS,
            Box::new(|graph, _cfg, payload| {
                let Payload::Elements { nodes, edges } = payload else {
                    return Err(mismatch(ADD_ELEMENTS));
                };
                add_elements(graph, &nodes, &edges)?;
                Ok(Payload::Elements { nodes, edges })
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Elements { nodes, edges } = payload else {
                    return Err(mismatch(ADD_ELEMENTS));
                };
                remove_elements(graph, &nodes, &edges)?;
                Ok(Payload::Elements { nodes, edges })
            }),
        );

        reg.register(
            REMOVE_ELEMENTS,
            Box::new(|graph, _cfg, payload| {
                let Payload::Elements { nodes, edges } = payload else {
                    return Err(mismatch(REMOVE_ELEMENTS));
                };
                remove_elements(graph, &nodes, &edges)?;
                Ok(Payload::Elements { nodes, edges })
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Elements { nodes, edges } = payload else {
                    return Err(mismatch(REMOVE_ELEMENTS));
                };
                add_elements(graph, &nodes, &edges)?;
                Ok(Payload::Elements { nodes, edges })
            }),
        );

        let labels = |graph: &mut ModelGraph, _cfg: &EditorConfig, payload: Payload| {
            let Payload::Labels(changes) = payload else {
                return Err(mismatch(CHANGE_LABELS));
            };
            Ok(Payload::Labels(swap_labels(graph, changes)?))
        };
        reg.register(CHANGE_LABELS, Box::new(labels), Box::new(labels));

        let node_kinds = |graph: &mut ModelGraph, _cfg: &EditorConfig, payload: Payload| {
            let Payload::Kinds(changes) = payload else {
                return Err(mismatch(CHANGE_NODE_KINDS));
            };
            Ok(Payload::Kinds(swap_node_kinds(graph, changes)?))
        };
        reg.register(CHANGE_NODE_KINDS, Box::new(node_kinds), Box::new(node_kinds));

        let edge_kinds = |graph: &mut ModelGraph, _cfg: &EditorConfig, payload: Payload| {
            let Payload::Kinds(changes) = payload else {
                return Err(mismatch(CHANGE_EDGE_KINDS));
            };
            Ok(Payload::Kinds(swap_edge_kinds(graph, changes)?))
        };
        reg.register(CHANGE_EDGE_KINDS, Box::new(edge_kinds), Box::new(edge_kinds));

        let specializations = |graph: &mut ModelGraph, _cfg: &EditorConfig, payload: Payload| {
            let Payload::Specializations(changes) = payload else {
                return Err(mismatch(CHANGE_SPECIALIZATIONS));
            };
            Ok(Payload::Specializations(swap_specializations(
                graph, changes,
            )?))
        };
        reg.register(
            CHANGE_SPECIALIZATIONS,
            Box::new(specializations),
            Box::new(specializations),
        );

        reg.register(
            REPARENT,
            Box::new(|graph, cfg, payload| {
                let Payload::Parents { moves, .. } = payload else {
                    return Err(mismatch(REPARENT));
                };
                let outcome = compound::reparent(graph, cfg, &moves)?;
                Ok(Payload::Parents {
                    moves: outcome.previous,
                    removed_nodes: outcome.removed_nodes,
                    removed_edges: outcome.removed_edges,
                })
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Parents {
                    moves,
                    removed_nodes,
                    removed_edges,
                } = payload
                else {
                    return Err(mismatch(REPARENT));
                };
                // Resurrect auto-removed parents before the moves that
                // point back into them.
                add_elements(graph, &removed_nodes, &removed_edges)?;
                let mut previous: Vec<ParentChange> = Vec::new();
                for mv in &moves {
                    let old = graph.set_parent(&mv.id, mv.parent.as_deref())?;
                    previous.push(ParentChange {
                        id: mv.id.clone(),
                        parent: old,
                    });
                }
                Ok(Payload::Parents {
                    moves: previous,
                    removed_nodes: Vec::new(),
                    removed_edges: Vec::new(),
                })
            }),
        );

        reg.register(
            COLLAPSE_NODES,
            Box::new(|graph, _cfg, payload| {
                let Payload::NodeIds(ids) = payload else {
                    return Err(mismatch(COLLAPSE_NODES));
                };
                Ok(Payload::NodeIds(compound::collapse_nodes(graph, &ids)))
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::NodeIds(ids) = payload else {
                    return Err(mismatch(COLLAPSE_NODES));
                };
                Ok(Payload::NodeIds(compound::expand_nodes(graph, &ids)))
            }),
        );

        reg.register(
            EXPAND_NODES,
            Box::new(|graph, _cfg, payload| {
                let Payload::NodeIds(ids) = payload else {
                    return Err(mismatch(EXPAND_NODES));
                };
                Ok(Payload::NodeIds(compound::expand_nodes(graph, &ids)))
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::NodeIds(ids) = payload else {
                    return Err(mismatch(EXPAND_NODES));
                };
                Ok(Payload::NodeIds(compound::collapse_nodes(graph, &ids)))
            }),
        );

        reg.register(
            COLLAPSE_EDGES,
            Box::new(|graph, _cfg, payload| match payload {
                // Fresh collapse computes the bundles; redo replays them
                // exactly so generated bundle ids survive the round trip.
                Payload::EdgePairs { pairs, options } => {
                    let mut bundles = Vec::new();
                    for (a, b) in pairs {
                        bundles.extend(edge_group::collapse_between(graph, &a, &b, options));
                    }
                    Ok(Payload::Bundles(bundles))
                }
                Payload::Bundles(bundles) => {
                    edge_group::replay_bundles(graph, &bundles)?;
                    Ok(Payload::Bundles(bundles))
                }
                _ => Err(mismatch(COLLAPSE_EDGES)),
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Bundles(bundles) = payload else {
                    return Err(mismatch(COLLAPSE_EDGES));
                };
                let ids: Vec<String> = bundles.iter().map(|b| b.id.clone()).collect();
                edge_group::expand_bundles(graph, &ids)?;
                Ok(Payload::Bundles(bundles))
            }),
        );

        reg.register(
            EXPAND_EDGES,
            Box::new(|graph, _cfg, payload| {
                let ids = match payload {
                    Payload::BundleIds(ids) => ids,
                    Payload::Bundles(bundles) => bundles.iter().map(|b| b.id.clone()).collect(),
                    _ => return Err(mismatch(EXPAND_EDGES)),
                };
                Ok(Payload::Bundles(edge_group::expand_bundles(graph, &ids)?))
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Bundles(bundles) = payload else {
                    return Err(mismatch(EXPAND_EDGES));
                };
                // Inner bundles were expanded last, so rebuild them first.
                let reversed: Vec<_> = bundles.iter().rev().cloned().collect();
                edge_group::replay_bundles(graph, &reversed)?;
                Ok(Payload::Bundles(bundles))
            }),
        );

        reg.register(
            EXPAND_ALL_EDGES,
            Box::new(|graph, _cfg, payload| match payload {
                Payload::Empty => Ok(Payload::Bundles(edge_group::expand_all(graph)?)),
                _ => Err(mismatch(EXPAND_ALL_EDGES)),
            }),
            Box::new(|graph, _cfg, payload| {
                let Payload::Bundles(bundles) = payload else {
                    return Err(mismatch(EXPAND_ALL_EDGES));
                };
                let reversed: Vec<_> = bundles.iter().rev().cloned().collect();
                edge_group::replay_bundles(graph, &reversed)?;
                Ok(Payload::Empty)
            }),
        );

        reg
    }
}
