//! Reversible-operation log: a typed command registry plus undo/redo stacks.
//!
//! Each registered action is a matched `(forward, inverse)` pair over
//! [`Payload`]. A forward handler applies its mutation and returns the
//! payload that reverses it; the inverse handler does the opposite. Batches
//! apply sub-actions in order and invert them in reverse order, recorded as
//! a single entry. A handler error never leaves a malformed entry behind:
//! on `perform` nothing is pushed, on `undo`/`redo` the popped entry is put
//! back, and partially applied batches roll themselves back.

use rustc_hash::FxHashMap;

use crate::compound::ParentChange;
use crate::config::EditorConfig;
use crate::edge_group::{BundleSnapshot, EdgeGroupOptions};
use crate::model::{EdgeRecord, ModelGraph, NodeRecord};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelChange {
    pub id: String,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KindChange {
    pub id: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpecializationChange {
    pub id: String,
    pub specialization: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchStep {
    pub action: String,
    pub payload: Payload,
}

/// The data a handler consumes and produces. One enum rather than a trait
/// object so snapshots stay plain comparable values.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    #[default]
    Empty,
    Elements {
        nodes: Vec<NodeRecord>,
        edges: Vec<EdgeRecord>,
    },
    Labels(Vec<LabelChange>),
    Kinds(Vec<KindChange>),
    Specializations(Vec<SpecializationChange>),
    Parents {
        moves: Vec<ParentChange>,
        removed_nodes: Vec<NodeRecord>,
        removed_edges: Vec<EdgeRecord>,
    },
    NodeIds(Vec<String>),
    EdgePairs {
        pairs: Vec<(String, String)>,
        options: EdgeGroupOptions,
    },
    Bundles(Vec<BundleSnapshot>),
    BundleIds(Vec<String>),
    Batch(Vec<BatchStep>),
}

pub type ActionFn = Box<dyn Fn(&mut ModelGraph, &EditorConfig, Payload) -> Result<Payload>>;

pub struct ActionRegistry {
    actions: FxHashMap<String, (ActionFn, ActionFn)>,
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self {
            actions: FxHashMap::default(),
        }
    }
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the forward/inverse pair for `name`. Must be called before
    /// the first `perform(name, ...)`.
    pub fn register(&mut self, name: impl Into<String>, forward: ActionFn, inverse: ActionFn) {
        self.actions.insert(name.into(), (forward, inverse));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    fn get(&self, name: &str) -> Result<&(ActionFn, ActionFn)> {
        self.actions.get(name).ok_or_else(|| Error::UnknownAction {
            name: name.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Inverse,
}

impl Direction {
    fn opposite(self) -> Self {
        match self {
            Direction::Forward => Direction::Inverse,
            Direction::Inverse => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    payload: Payload,
}

/// LIFO undo stack plus a redo stack invalidated by any fresh action.
#[derive(Default)]
pub struct UndoLog {
    undo_stack: Vec<Entry>,
    redo_stack: Vec<Entry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Applies `name` forward and records its inverse. A fresh action
    /// invalidates any forward history.
    pub fn perform(
        &mut self,
        registry: &ActionRegistry,
        graph: &mut ModelGraph,
        config: &EditorConfig,
        name: &str,
        payload: Payload,
    ) -> Result<()> {
        let inverse = apply(registry, graph, config, name, payload, Direction::Forward)?;
        self.undo_stack.push(Entry {
            name: name.to_string(),
            payload: inverse,
        });
        self.redo_stack.clear();
        Ok(())
    }

    /// Reverses the most recent action. `Ok(false)` when the stack is empty.
    pub fn undo(
        &mut self,
        registry: &ActionRegistry,
        graph: &mut ModelGraph,
        config: &EditorConfig,
    ) -> Result<bool> {
        let Some(entry) = self.undo_stack.pop() else {
            return Ok(false);
        };
        match apply(
            registry,
            graph,
            config,
            &entry.name,
            entry.payload.clone(),
            Direction::Inverse,
        ) {
            Ok(forward) => {
                self.redo_stack.push(Entry {
                    name: entry.name,
                    payload: forward,
                });
                Ok(true)
            }
            Err(err) => {
                // Leave both stacks exactly as before the call.
                self.undo_stack.push(entry);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone action.
    pub fn redo(
        &mut self,
        registry: &ActionRegistry,
        graph: &mut ModelGraph,
        config: &EditorConfig,
    ) -> Result<bool> {
        let Some(entry) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match apply(
            registry,
            graph,
            config,
            &entry.name,
            entry.payload.clone(),
            Direction::Forward,
        ) {
            Ok(inverse) => {
                self.undo_stack.push(Entry {
                    name: entry.name,
                    payload: inverse,
                });
                Ok(true)
            }
            Err(err) => {
                self.redo_stack.push(entry);
                Err(err)
            }
        }
    }
}

/// Applies an action without touching the stacks (the editor's path when
/// undo/redo is switched off).
pub(crate) fn apply_unrecorded(
    registry: &ActionRegistry,
    graph: &mut ModelGraph,
    config: &EditorConfig,
    name: &str,
    payload: Payload,
) -> Result<Payload> {
    apply(registry, graph, config, name, payload, Direction::Forward)
}

fn apply(
    registry: &ActionRegistry,
    graph: &mut ModelGraph,
    config: &EditorConfig,
    name: &str,
    payload: Payload,
    direction: Direction,
) -> Result<Payload> {
    if let Payload::Batch(steps) = payload {
        return apply_batch(registry, graph, config, steps, direction).map(Payload::Batch);
    }
    let (forward, inverse) = registry.get(name)?;
    match direction {
        Direction::Forward => forward(graph, config, payload),
        Direction::Inverse => inverse(graph, config, payload),
    }
}

/// Applies the steps in order and returns their inversions in reverse
/// order, so the returned batch undoes the whole sequence when applied in
/// the opposite direction. All-or-nothing: a failing step rolls back the
/// steps already applied.
fn apply_batch(
    registry: &ActionRegistry,
    graph: &mut ModelGraph,
    config: &EditorConfig,
    steps: Vec<BatchStep>,
    direction: Direction,
) -> Result<Vec<BatchStep>> {
    let mut applied: Vec<BatchStep> = Vec::new();
    for step in steps {
        match apply(
            registry,
            graph,
            config,
            &step.action,
            step.payload,
            direction,
        ) {
            Ok(result) => applied.push(BatchStep {
                action: step.action,
                payload: result,
            }),
            Err(err) => {
                for done in applied.into_iter().rev() {
                    if let Err(rollback_err) = apply(
                        registry,
                        graph,
                        config,
                        &done.action,
                        done.payload,
                        direction.opposite(),
                    ) {
                        tracing::warn!(
                            action = %done.action,
                            error = %rollback_err,
                            "batch rollback step failed"
                        );
                    }
                }
                return Err(err);
            }
        }
    }
    applied.reverse();
    Ok(applied)
}
