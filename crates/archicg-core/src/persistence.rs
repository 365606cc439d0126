//! Import/export of the `{ "nodes": [...], "edges": [...] }` document
//! format.
//!
//! Import is recovery-oriented: an edge (or a nesting) referencing a node
//! that is not in the document does not fail the import. A placeholder
//! `blank-node` is materialized instead and surfaced in the report for the
//! caller to log.

use serde::{Deserialize, Serialize};

use crate::model::{EdgeRecord, ModelGraph, NodeData, NodeRecord};
use crate::vocabulary::BLANK_NODE_KIND;
use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl Document {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// What import had to recover from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Ids of the placeholder nodes materialized for dangling references.
    pub blank_nodes: Vec<String>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.blank_nodes.is_empty()
    }
}

fn materialize_blank(graph: &mut ModelGraph, id: &str, report: &mut ImportReport) -> Result<()> {
    if graph.has_node(id) {
        return Ok(());
    }
    tracing::warn!(id, "dangling reference; materializing blank node");
    graph.add_node(
        id,
        NodeData {
            kind: BLANK_NODE_KIND.to_string(),
            label: Some(BLANK_NODE_KIND.to_string()),
            ..NodeData::default()
        },
    )?;
    report.blank_nodes.push(id.to_string());
    Ok(())
}

/// Builds a model graph from a document. Duplicate ids and parent cycles
/// are hard errors; dangling references are recovered per the report.
pub fn import(doc: &Document) -> Result<(ModelGraph, ImportReport)> {
    let mut graph = ModelGraph::new();
    let mut report = ImportReport::default();

    for node in &doc.nodes {
        graph.add_node(&node.id, node.data())?;
    }
    // Parent links once every declared node exists; a parent that is not
    // declared anywhere gets the same blank-node treatment as dangling
    // edge endpoints.
    for node in &doc.nodes {
        if let Some(parent) = &node.parent_id {
            materialize_blank(&mut graph, parent, &mut report)?;
            graph.set_parent(&node.id, Some(parent))?;
        }
    }
    for edge in &doc.edges {
        materialize_blank(&mut graph, &edge.source_id, &mut report)?;
        materialize_blank(&mut graph, &edge.target_id, &mut report)?;
        graph.add_edge(edge)?;
    }

    Ok((graph, report))
}

fn flatten_edge(record: EdgeRecord, out: &mut Vec<EdgeRecord>) {
    match record.members {
        // Derived bundles are view state: export the underlying edges.
        Some(members) => {
            for member in members {
                flatten_edge(member, out);
            }
        }
        None => out.push(record),
    }
}

/// Serializes the graph back to a document. Node collapse flags persist;
/// derived edge bundles are expanded into their members.
pub fn export(graph: &ModelGraph) -> Document {
    let nodes = graph
        .node_ids()
        .into_iter()
        .filter_map(|id| graph.node_record(&id))
        .collect();

    let mut edges = Vec::new();
    for id in graph.edge_ids() {
        if let Some(record) = graph.edge_record(&id) {
            flatten_edge(record, &mut edges);
        }
    }

    Document { nodes, edges }
}
