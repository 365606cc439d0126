//! The editing facade: one owned state object, one mutation path.
//!
//! Every user-initiated mutation goes through a registered reversible
//! action; the graph is never mutated behind the log's back, which is what
//! makes N undos restore the exact pre-sequence state. The editor is plain
//! owned state with no interior mutability: one interaction runs to
//! completion before the next one is processed.

use crate::actions;
use crate::allowance::AllowanceTable;
use crate::compound::{self, ParentChange};
use crate::config::EditorConfig;
use crate::edge_group::{self, EdgeGroupOptions};
use crate::model::{EdgeRecord, ModelGraph, NodeRecord};
use crate::persistence::{self, Document, ImportReport};
use crate::undo::{ActionFn, ActionRegistry, BatchStep, Payload, UndoLog};
use crate::{Error, Result};

/// An edge whose relationship kind the allowance table rejects for its
/// endpoint kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipViolation {
    pub edge_id: String,
    pub relation: String,
    pub source_kind: String,
    pub target_kind: String,
}

pub struct Editor {
    graph: ModelGraph,
    config: EditorConfig,
    registry: ActionRegistry,
    log: UndoLog,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            graph: ModelGraph::new(),
            config,
            registry: ActionRegistry::builtin(),
            log: UndoLog::new(),
        }
    }

    /// Opens a document for editing. Import recoveries are in the report.
    pub fn from_document(doc: &Document, config: EditorConfig) -> Result<(Self, ImportReport)> {
        let (graph, report) = persistence::import(doc)?;
        Ok((
            Self {
                graph,
                config,
                registry: ActionRegistry::builtin(),
                log: UndoLog::new(),
            },
            report,
        ))
    }

    pub fn to_document(&self) -> Document {
        persistence::export(&self.graph)
    }

    pub fn graph(&self) -> &ModelGraph {
        &self.graph
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn allowance(&self) -> AllowanceTable {
        AllowanceTable::new(self.config.enforce_relationships)
    }

    /// Registers a custom reversible action; required before the first
    /// `perform` under that name.
    pub fn register_action(&mut self, name: impl Into<String>, forward: ActionFn, inverse: ActionFn) {
        self.registry.register(name, forward, inverse);
    }

    /// Runs a registered action through the log (or directly, with the
    /// undo/redo switch off).
    pub fn perform(&mut self, name: &str, payload: Payload) -> Result<()> {
        if self.config.undo_redo {
            self.log
                .perform(&self.registry, &mut self.graph, &self.config, name, payload)
        } else {
            crate::undo::apply_unrecorded(
                &self.registry,
                &mut self.graph,
                &self.config,
                name,
                payload,
            )
            .map(|_| ())
        }
    }

    pub fn undo(&mut self) -> Result<bool> {
        self.log.undo(&self.registry, &mut self.graph, &self.config)
    }

    pub fn redo(&mut self) -> Result<bool> {
        self.log.redo(&self.registry, &mut self.graph, &self.config)
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.log.reset();
    }

    // ---- element mutations -------------------------------------------

    pub fn add_node(&mut self, record: NodeRecord) -> Result<()> {
        self.perform(
            actions::ADD_ELEMENTS,
            Payload::Elements {
                nodes: vec![record],
                edges: Vec::new(),
            },
        )
    }

    /// Creates an edge, gated on the allowance table before any mutation.
    pub fn add_edge(&mut self, record: EdgeRecord) -> Result<()> {
        let source_kind = self
            .graph
            .node(&record.source_id)
            .ok_or_else(|| Error::MissingNode {
                id: record.source_id.clone(),
            })?
            .kind
            .clone();
        let target_kind = self
            .graph
            .node(&record.target_id)
            .ok_or_else(|| Error::MissingNode {
                id: record.target_id.clone(),
            })?
            .kind
            .clone();
        self.allowance()
            .check(&record.kind, &source_kind, &target_kind)?;
        self.perform(
            actions::ADD_ELEMENTS,
            Payload::Elements {
                nodes: Vec::new(),
                edges: vec![record],
            },
        )
    }

    /// Deletes elements as one undoable step. For nodes the closure also
    /// takes their descendants and every incident edge.
    pub fn remove(&mut self, ids: &[String]) -> Result<()> {
        let mut node_ids: Vec<String> = Vec::new();
        let mut edge_ids: Vec<String> = Vec::new();
        for id in ids {
            if self.graph.has_node(id) {
                if !node_ids.contains(id) {
                    node_ids.push(id.clone());
                }
                for d in self.graph.descendants(id) {
                    let d = d.to_string();
                    if !node_ids.contains(&d) {
                        node_ids.push(d);
                    }
                }
            } else if self.graph.has_edge(id) {
                if !edge_ids.contains(id) {
                    edge_ids.push(id.clone());
                }
            } else {
                return Err(Error::MissingNode { id: id.clone() });
            }
        }
        for node_id in &node_ids {
            for e in self.graph.incident_edge_ids(node_id) {
                if !edge_ids.contains(&e) {
                    edge_ids.push(e);
                }
            }
        }

        let nodes: Vec<NodeRecord> = node_ids
            .iter()
            .filter_map(|id| self.graph.node_record(id))
            .collect();
        let edges: Vec<EdgeRecord> = edge_ids
            .iter()
            .filter_map(|id| self.graph.edge_record(id))
            .collect();
        self.perform(actions::REMOVE_ELEMENTS, Payload::Elements { nodes, edges })
    }

    pub fn set_label(&mut self, id: &str, label: Option<String>) -> Result<()> {
        self.set_labels(vec![(id.to_string(), label)])
    }

    pub fn set_labels(&mut self, changes: Vec<(String, Option<String>)>) -> Result<()> {
        let changes = changes
            .into_iter()
            .map(|(id, label)| crate::undo::LabelChange { id, label })
            .collect();
        self.perform(actions::CHANGE_LABELS, Payload::Labels(changes))
    }

    pub fn set_node_kinds(&mut self, changes: Vec<(String, String)>) -> Result<()> {
        let changes = changes
            .into_iter()
            .map(|(id, kind)| crate::undo::KindChange { id, kind })
            .collect();
        self.perform(actions::CHANGE_NODE_KINDS, Payload::Kinds(changes))
    }

    pub fn set_edge_kinds(&mut self, changes: Vec<(String, String)>) -> Result<()> {
        let changes = changes
            .into_iter()
            .map(|(id, kind)| crate::undo::KindChange { id, kind })
            .collect();
        self.perform(actions::CHANGE_EDGE_KINDS, Payload::Kinds(changes))
    }

    pub fn set_specialization(&mut self, id: &str, specialization: Option<String>) -> Result<()> {
        self.perform(
            actions::CHANGE_SPECIALIZATIONS,
            Payload::Specializations(vec![crate::undo::SpecializationChange {
                id: id.to_string(),
                specialization,
            }]),
        )
    }

    // ---- compound structure ------------------------------------------

    /// Reparents one node; `None` detaches it to the root. Cycles are
    /// rejected with the graph unchanged.
    pub fn set_parent(&mut self, id: &str, parent: Option<&str>) -> Result<()> {
        compound::require_node(&self.graph, id)?;
        if let Some(p) = parent {
            compound::require_node(&self.graph, p)?;
        }
        self.perform(
            actions::REPARENT,
            Payload::Parents {
                moves: vec![ParentChange {
                    id: id.to_string(),
                    parent: parent.map(str::to_string),
                }],
                removed_nodes: Vec::new(),
                removed_edges: Vec::new(),
            },
        )
    }

    /// "Add compound for selection": creates `parent` and moves `ids`
    /// under it, as one atomic undoable step.
    pub fn group_under_new_parent(&mut self, ids: &[String], parent: NodeRecord) -> Result<String> {
        for id in ids {
            compound::require_node(&self.graph, id)?;
        }
        let parent_id = parent.id.clone();
        let moves = ids
            .iter()
            .map(|id| ParentChange {
                id: id.clone(),
                parent: Some(parent_id.clone()),
            })
            .collect();
        self.perform(
            "batch",
            Payload::Batch(vec![
                BatchStep {
                    action: actions::ADD_ELEMENTS.to_string(),
                    payload: Payload::Elements {
                        nodes: vec![parent],
                        edges: Vec::new(),
                    },
                },
                BatchStep {
                    action: actions::REPARENT.to_string(),
                    payload: Payload::Parents {
                        moves,
                        removed_nodes: Vec::new(),
                        removed_edges: Vec::new(),
                    },
                },
            ]),
        )?;
        Ok(parent_id)
    }

    // ---- node collapse/expand ----------------------------------------

    pub fn collapse(&mut self, ids: &[String]) -> Result<()> {
        self.perform(actions::COLLAPSE_NODES, Payload::NodeIds(ids.to_vec()))
    }

    pub fn expand(&mut self, ids: &[String]) -> Result<()> {
        self.perform(actions::EXPAND_NODES, Payload::NodeIds(ids.to_vec()))
    }

    pub fn collapse_all(&mut self) -> Result<()> {
        let order = compound::collapse_all_order(&self.graph);
        self.perform(actions::COLLAPSE_NODES, Payload::NodeIds(order))
    }

    pub fn expand_all(&mut self) -> Result<()> {
        let order = compound::expand_all_order(&self.graph);
        self.perform(actions::EXPAND_NODES, Payload::NodeIds(order))
    }

    pub fn collapse_recursively(&mut self, ids: &[String]) -> Result<()> {
        let order = compound::recursive_order(&self.graph, ids);
        self.perform(actions::COLLAPSE_NODES, Payload::NodeIds(order))
    }

    pub fn expand_recursively(&mut self, ids: &[String]) -> Result<()> {
        let order = compound::recursive_order(&self.graph, ids);
        self.perform(actions::EXPAND_NODES, Payload::NodeIds(order))
    }

    // ---- edge bundles ------------------------------------------------

    pub fn collapse_edges_between(&mut self, a: &str, b: &str) -> Result<()> {
        self.collapse_edges_between_with(a, b, self.config.edge_group_options())
    }

    pub fn collapse_edges_between_with(
        &mut self,
        a: &str,
        b: &str,
        options: EdgeGroupOptions,
    ) -> Result<()> {
        self.perform(
            actions::COLLAPSE_EDGES,
            Payload::EdgePairs {
                pairs: vec![(a.to_string(), b.to_string())],
                options,
            },
        )
    }

    pub fn collapse_all_edges(&mut self) -> Result<()> {
        let pairs = edge_group::bundle_candidate_pairs(&self.graph);
        self.perform(
            actions::COLLAPSE_EDGES,
            Payload::EdgePairs {
                pairs,
                options: self.config.edge_group_options(),
            },
        )
    }

    pub fn expand_edges(&mut self, ids: &[String]) -> Result<()> {
        self.perform(actions::EXPAND_EDGES, Payload::BundleIds(ids.to_vec()))
    }

    pub fn expand_all_edges(&mut self) -> Result<()> {
        self.perform(actions::EXPAND_ALL_EDGES, Payload::Empty)
    }

    // ---- checking ----------------------------------------------------

    /// Checks every plain edge against the allowance matrix (strictly,
    /// regardless of the enforcement switch). Derived bundles are view
    /// state and skipped.
    pub fn relationship_violations(&self) -> Vec<RelationshipViolation> {
        let table = AllowanceTable::new(true);
        let mut out = Vec::new();
        for id in self.graph.edge_ids() {
            let Some(data) = self.graph.edge(&id) else {
                continue;
            };
            if data.is_bundle() {
                continue;
            }
            let Some((v, w)) = self.graph.edge_endpoints(&id) else {
                continue;
            };
            let source_kind = self.graph.node(v).map(|n| n.kind.clone()).unwrap_or_default();
            let target_kind = self.graph.node(w).map(|n| n.kind.clone()).unwrap_or_default();
            if !table.is_allowed(&data.kind, &source_kind, &target_kind) {
                out.push(RelationshipViolation {
                    edge_id: id,
                    relation: data.kind.clone(),
                    source_kind,
                    target_kind,
                });
            }
        }
        out
    }
}
