//! Bundling of parallel edges into derived collapsed edges.
//!
//! A bundle replaces two or more edges joining the same endpoint pair with
//! one derived edge whose label is the member count. Members keep their
//! creation order inside the bundle and come back unchanged on expand.

use indexmap::IndexMap;
use serde::Deserialize;
use uuid::Uuid;

use crate::model::{EdgeRecord, ModelGraph};
use crate::{Error, Result};

/// Kind given to a bundle whose members disagree on relationship kind; the
/// renderer maps it to the neutral (grey, plain-arrow) style.
pub const MIXED_KIND: &str = "mixed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeGroupOptions {
    /// Partition candidates by relationship kind before bundling.
    pub group_by_same_type: bool,
    /// Admit already-collapsed edges as bundle members. When off they are
    /// filtered out of the candidate set, silently.
    pub allow_nested_collapse: bool,
}

impl Default for EdgeGroupOptions {
    fn default() -> Self {
        Self {
            group_by_same_type: true,
            allow_nested_collapse: true,
        }
    }
}

/// Everything needed to recreate one bundle exactly: its generated id, the
/// rendered endpoints, and the member records in creation order.
#[derive(Debug, Clone, PartialEq)]
pub struct BundleSnapshot {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub members: Vec<EdgeRecord>,
}

/// Shared member kind, or `None` when the bundle mixes kinds.
pub fn bundle_kind(members: &[EdgeRecord]) -> Option<&str> {
    let first = members.first()?;
    members
        .iter()
        .all(|m| m.kind == first.kind)
        .then_some(first.kind.as_str())
}

fn bundle_record(snapshot: &BundleSnapshot) -> EdgeRecord {
    let mut record = EdgeRecord::new(
        snapshot.id.clone(),
        bundle_kind(&snapshot.members)
            .unwrap_or(MIXED_KIND)
            .to_string(),
        snapshot.source_id.clone(),
        snapshot.target_id.clone(),
    );
    record.label = Some(snapshot.members.len().to_string());
    record.members = Some(snapshot.members.clone());
    record
}

/// Collapses the edges joining `a` and `b` (either direction) into bundles.
/// Partitions of fewer than two edges stay untouched. Returns a snapshot
/// per bundle created.
pub fn collapse_between(
    graph: &mut ModelGraph,
    a: &str,
    b: &str,
    options: EdgeGroupOptions,
) -> Vec<BundleSnapshot> {
    let candidates: Vec<String> = graph
        .edge_ids_between(a, b)
        .into_iter()
        .filter(|id| {
            options.allow_nested_collapse
                || graph.edge(id).is_none_or(|data| !data.is_bundle())
        })
        .collect();

    // Partition preserving first-encounter order, as the member lists must
    // follow edge creation order.
    let mut partitions: IndexMap<String, Vec<String>> = IndexMap::new();
    for id in candidates {
        let key = if options.group_by_same_type {
            graph.edge(&id).map(|d| d.kind.clone()).unwrap_or_default()
        } else {
            String::new()
        };
        partitions.entry(key).or_default().push(id);
    }

    let mut snapshots = Vec::new();
    for (_, ids) in partitions {
        if ids.len() < 2 {
            continue;
        }
        let members: Vec<EdgeRecord> = ids
            .iter()
            .map(|id| graph.remove_edge(id).expect("candidate edge exists"))
            .collect();
        let snapshot = BundleSnapshot {
            id: format!("ce-{}", Uuid::new_v4()),
            source_id: members[0].source_id.clone(),
            target_id: members[0].target_id.clone(),
            members,
        };
        graph
            .add_edge(&bundle_record(&snapshot))
            .expect("bundle endpoints exist");
        snapshots.push(snapshot);
    }
    snapshots
}

/// Endpoint pairs carrying at least two edges, in first-encounter order.
pub fn bundle_candidate_pairs(graph: &ModelGraph) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for id in graph.edge_ids() {
        let Some((v, w)) = graph.edge_endpoints(&id) else {
            continue;
        };
        let (v, w) = (v.to_string(), w.to_string());
        let known = pairs
            .iter()
            .any(|(a, b)| (*a == v && *b == w) || (*a == w && *b == v));
        if !known && graph.edge_ids_between(&v, &w).len() >= 2 {
            pairs.push((v, w));
        }
    }
    pairs
}

/// Collapses every qualifying endpoint pair in the graph.
pub fn collapse_all(graph: &mut ModelGraph, options: EdgeGroupOptions) -> Vec<BundleSnapshot> {
    let mut snapshots = Vec::new();
    for (a, b) in bundle_candidate_pairs(graph) {
        snapshots.extend(collapse_between(graph, &a, &b, options));
    }
    snapshots
}

/// Expands the given bundles, restoring their members as independent edges.
/// Plain edges and unknown ids are no-ops. Snapshots are returned in the
/// order the bundles were expanded.
pub fn expand_bundles(graph: &mut ModelGraph, ids: &[String]) -> Result<Vec<BundleSnapshot>> {
    let mut snapshots = Vec::new();
    for id in ids {
        let Some(record) = graph.edge_record(id) else {
            continue;
        };
        let Some(members) = record.members else {
            continue;
        };
        graph.remove_edge(id)?;
        for member in &members {
            graph.restore_edge(member)?;
        }
        snapshots.push(BundleSnapshot {
            id: record.id,
            source_id: record.source_id,
            target_id: record.target_id,
            members,
        });
    }
    Ok(snapshots)
}

/// Expands every bundle in the graph, nested bundles included (members that
/// are themselves bundles get expanded on the next sweep).
pub fn expand_all(graph: &mut ModelGraph) -> Result<Vec<BundleSnapshot>> {
    let mut snapshots = Vec::new();
    loop {
        let bundles: Vec<String> = graph
            .edge_ids()
            .into_iter()
            .filter(|id| graph.edge(id).is_some_and(|d| d.is_bundle()))
            .collect();
        if bundles.is_empty() {
            return Ok(snapshots);
        }
        snapshots.extend(expand_bundles(graph, &bundles)?);
    }
}

/// Recreates bundles exactly from snapshots (undo/redo replay). Member
/// edges must currently exist as independent edges.
pub fn replay_bundles(graph: &mut ModelGraph, snapshots: &[BundleSnapshot]) -> Result<()> {
    for snapshot in snapshots {
        for member in &snapshot.members {
            if !graph.has_edge(&member.id) {
                return Err(Error::MissingEdge {
                    id: member.id.clone(),
                });
            }
        }
        for member in &snapshot.members {
            graph.remove_edge(&member.id)?;
        }
        graph.add_edge(&bundle_record(snapshot))?;
    }
    Ok(())
}
