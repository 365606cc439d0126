//! The serializable domain model: nodes, edges, and the compound graph that
//! owns them.
//!
//! This is deliberately independent of any rendering engine. The graph
//! structure (ownership, adjacency, parent/children) lives in
//! `archicg-graphlib`; this module layers element identity, ArchiMate kinds,
//! user properties, and view state (collapse flags, derived edge bundles)
//! on top, and is what import/export and the undo log snapshot.

use archicg_graphlib::{EdgeKey, Graph, GraphOptions};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Node,
    Edge,
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementType::Node => write!(f, "node"),
            ElementType::Edge => write!(f, "edge"),
        }
    }
}

/// Node attributes. `collapsed` is view state only; the parent/children
/// structure is held by the graph and unaffected by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeData {
    pub kind: String,
    pub specialization: Option<String>,
    pub label: Option<String>,
    pub collapsed: bool,
    /// Back-reference to the edge whose semantics justified the nesting.
    pub parent_relation_id: Option<String>,
    pub properties: IndexMap<String, Value>,
}

/// Edge attributes. `members` marks a derived collapsed edge: a view-only
/// bundle of underlying edges sharing rendered endpoints. Bundles exist only
/// while collapsed and are never exported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    pub kind: String,
    pub specialization: Option<String>,
    pub label: Option<String>,
    pub properties: IndexMap<String, Value>,
    pub members: Option<Vec<EdgeRecord>>,
}

impl EdgeData {
    pub fn is_bundle(&self) -> bool {
        self.members.is_some()
    }
}

/// Serialized node shape, shared by the persistence format and by undo
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub collapsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_relation_id: Option<String>,
    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            specialization: None,
            label: None,
            parent_id: None,
            collapsed: false,
            parent_relation_id: None,
            properties: IndexMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn data(&self) -> NodeData {
        NodeData {
            kind: self.kind.clone(),
            specialization: self.specialization.clone(),
            label: self.label.clone(),
            collapsed: self.collapsed,
            parent_relation_id: self.parent_relation_id.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Serialized edge shape. `members` only ever appears in undo snapshots of
/// derived bundles, never in exported documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    #[serde(rename = "edgeKind")]
    pub kind: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<EdgeRecord>>,
    #[serde(flatten)]
    pub properties: IndexMap<String, Value>,
}

impl EdgeRecord {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            source_id: source.into(),
            target_id: target.into(),
            specialization: None,
            label: None,
            members: None,
            properties: IndexMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn data(&self) -> EdgeData {
        EdgeData {
            kind: self.kind.clone(),
            specialization: self.specialization.clone(),
            label: self.label.clone(),
            properties: self.properties.clone(),
            members: self.members.clone(),
        }
    }
}

/// The in-memory model graph. All ids (node and edge alike) live in one
/// namespace, as in the source format.
#[derive(Debug)]
pub struct ModelGraph {
    graph: Graph<NodeData, EdgeData, ()>,
    registered_ids: FxHashMap<String, ElementType>,
    edge_keys: FxHashMap<String, EdgeKey>,
}

impl Default for ModelGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelGraph {
    pub fn new() -> Self {
        Self {
            graph: Graph::new(GraphOptions {
                directed: true,
                multigraph: true,
                compound: true,
            }),
            registered_ids: FxHashMap::default(),
            edge_keys: FxHashMap::default(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.registered_ids.get(id) == Some(&ElementType::Node)
    }

    pub fn has_edge(&self, id: &str) -> bool {
        self.edge_keys.contains_key(id)
    }

    pub fn element_type(&self, id: &str) -> Option<ElementType> {
        self.registered_ids.get(id).copied()
    }

    fn register(&mut self, id: &str, ty: ElementType) -> Result<()> {
        if self.registered_ids.contains_key(id) {
            return Err(Error::DuplicateId { id: id.to_string() });
        }
        self.registered_ids.insert(id.to_string(), ty);
        Ok(())
    }

    // ---- nodes -------------------------------------------------------

    pub fn add_node(&mut self, id: &str, data: NodeData) -> Result<()> {
        self.register(id, ElementType::Node)?;
        self.graph.set_node(id, data);
        Ok(())
    }

    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.graph.node(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut NodeData> {
        self.graph.node_mut(id)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> Vec<String> {
        self.graph.node_ids()
    }

    /// Removes a node together with its incident edges and parent links.
    /// Children become roots; callers wanting an undoable removal snapshot
    /// the closure first (see [`Editor::remove`](crate::Editor::remove)).
    pub fn remove_node(&mut self, id: &str) -> Result<NodeRecord> {
        let record = self
            .node_record(id)
            .ok_or_else(|| Error::MissingNode { id: id.to_string() })?;
        for edge_id in self.incident_edge_ids(id) {
            let _ = self.remove_edge(&edge_id);
        }
        self.graph.remove_node(id);
        self.registered_ids.remove(id);
        Ok(record)
    }

    pub fn node_record(&self, id: &str) -> Option<NodeRecord> {
        let data = self.graph.node(id)?;
        Some(NodeRecord {
            id: id.to_string(),
            kind: data.kind.clone(),
            specialization: data.specialization.clone(),
            label: data.label.clone(),
            parent_id: self.graph.parent(id).map(str::to_string),
            collapsed: data.collapsed,
            parent_relation_id: data.parent_relation_id.clone(),
            properties: data.properties.clone(),
        })
    }

    /// Re-inserts a previously removed node, parent link included.
    pub fn restore_node(&mut self, record: &NodeRecord) -> Result<()> {
        self.add_node(&record.id, record.data())?;
        if let Some(parent) = &record.parent_id {
            self.set_parent(&record.id, Some(parent))?;
        }
        Ok(())
    }

    // ---- edges -------------------------------------------------------

    pub fn add_edge(&mut self, record: &EdgeRecord) -> Result<()> {
        if !self.has_node(&record.source_id) {
            return Err(Error::MissingNode {
                id: record.source_id.clone(),
            });
        }
        if !self.has_node(&record.target_id) {
            return Err(Error::MissingNode {
                id: record.target_id.clone(),
            });
        }
        self.register(&record.id, ElementType::Edge)?;
        let key = EdgeKey::new(
            record.source_id.clone(),
            record.target_id.clone(),
            Some(record.id.clone()),
        );
        self.graph
            .set_edge_named(&key.v, &key.w, Some(&record.id), Some(record.data()));
        self.edge_keys.insert(record.id.clone(), key);
        Ok(())
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeData> {
        let key = self.edge_keys.get(id)?;
        self.graph.edge_by_key(key)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut EdgeData> {
        let key = self.edge_keys.get(id)?.clone();
        self.graph.edge_mut_by_key(&key)
    }

    pub fn edge_endpoints(&self, id: &str) -> Option<(&str, &str)> {
        self.edge_keys
            .get(id)
            .map(|k| (k.v.as_str(), k.w.as_str()))
    }

    /// Edge ids in insertion order.
    pub fn edge_ids(&self) -> Vec<String> {
        self.graph
            .edges()
            .filter_map(|k| k.name.clone())
            .collect()
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<EdgeRecord> {
        let record = self
            .edge_record(id)
            .ok_or_else(|| Error::MissingEdge { id: id.to_string() })?;
        let key = self.edge_keys.remove(id).expect("record implies key");
        self.graph.remove_edge_key(&key);
        self.registered_ids.remove(id);
        Ok(record)
    }

    pub fn edge_record(&self, id: &str) -> Option<EdgeRecord> {
        let key = self.edge_keys.get(id)?;
        let data = self.graph.edge_by_key(key)?;
        Some(EdgeRecord {
            id: id.to_string(),
            kind: data.kind.clone(),
            source_id: key.v.clone(),
            target_id: key.w.clone(),
            specialization: data.specialization.clone(),
            label: data.label.clone(),
            members: data.members.clone(),
            properties: data.properties.clone(),
        })
    }

    pub fn restore_edge(&mut self, record: &EdgeRecord) -> Result<()> {
        self.add_edge(record)
    }

    /// Ids of the edges incident to a node, insertion order.
    pub fn incident_edge_ids(&self, id: &str) -> Vec<String> {
        self.graph
            .node_edges(id)
            .into_iter()
            .filter_map(|k| k.name)
            .collect()
    }

    /// Ids of all edges joining `a` and `b` in either direction.
    pub fn edge_ids_between(&self, a: &str, b: &str) -> Vec<String> {
        self.graph
            .edges_between(a, b)
            .into_iter()
            .filter_map(|k| k.name)
            .collect()
    }

    // ---- compound structure ------------------------------------------

    /// Reparents `id` (or clears its parent). Returns the previous parent.
    /// Cycles are rejected atomically with the graph unchanged.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<Option<String>> {
        if !self.has_node(id) {
            return Err(Error::MissingNode { id: id.to_string() });
        }
        let previous = self.graph.parent(id).map(str::to_string);
        match parent {
            Some(p) => {
                if !self.has_node(p) {
                    return Err(Error::MissingNode { id: p.to_string() });
                }
                self.graph.set_parent(id, p)?;
            }
            None => {
                self.graph.clear_parent(id);
            }
        }
        Ok(previous)
    }

    pub fn parent(&self, id: &str) -> Option<&str> {
        self.graph.parent(id)
    }

    pub fn children(&self, id: &str) -> Vec<&str> {
        self.graph.children(id)
    }

    pub fn descendants(&self, id: &str) -> Vec<&str> {
        self.graph.descendants(id)
    }

    pub fn ancestors(&self, id: &str) -> Vec<&str> {
        self.graph.ancestors(id)
    }

    /// Nodes that currently own children, in insertion order.
    pub fn compound_node_ids(&self) -> Vec<String> {
        self.graph
            .node_ids()
            .into_iter()
            .filter(|id| !self.graph.children(id).is_empty())
            .collect()
    }

    /// Nesting depth: root nodes are depth 0.
    pub fn depth(&self, id: &str) -> usize {
        self.graph.ancestors(id).len()
    }

    // ---- visibility --------------------------------------------------

    /// A node is hidden iff some ancestor is collapsed. Its own collapse
    /// flag does not hide it; it renders as a single box.
    pub fn is_hidden(&self, id: &str) -> bool {
        self.graph
            .ancestors(id)
            .iter()
            .any(|a| self.graph.node(a).is_some_and(|n| n.collapsed))
    }

    pub fn visible_node_ids(&self) -> Vec<String> {
        self.graph
            .node_ids()
            .into_iter()
            .filter(|id| !self.is_hidden(id))
            .collect()
    }

    /// An edge is visible iff both endpoints are.
    pub fn visible_edge_ids(&self) -> Vec<String> {
        self.edge_ids()
            .into_iter()
            .filter(|id| {
                self.edge_endpoints(id)
                    .is_some_and(|(v, w)| !self.is_hidden(v) && !self.is_hidden(w))
            })
            .collect()
    }

    /// Number of weakly connected components.
    pub fn component_count(&self) -> usize {
        archicg_graphlib::alg::components(&self.graph).len()
    }
}
