#![forbid(unsafe_code)]

//! ArchiMate compound-graph editing core (headless).
//!
//! Design goals:
//! - view state (collapse, bundling) kept strictly apart from model data
//! - every mutation reversible, so N undos restore the exact prior state
//! - deterministic, serializable outputs for testing and tooling
//!
//! The [`Editor`] facade owns a [`model::ModelGraph`] and routes every
//! mutation through the [`undo::UndoLog`]. Relationship legality comes from
//! a generated allowance matrix ([`allowance::AllowanceTable`]), and models
//! round-trip through the JSON [`persistence::Document`] format.

pub mod actions;
pub mod allowance;
pub mod compound;
pub mod config;
pub mod edge_group;
pub mod editor;
pub mod error;
pub mod generated;
pub mod model;
pub mod persistence;
pub mod undo;
pub mod vocabulary;

pub use allowance::AllowanceTable;
pub use config::EditorConfig;
pub use edge_group::EdgeGroupOptions;
pub use editor::{Editor, RelationshipViolation};
pub use error::{CycleError, Error, Result};
pub use model::{EdgeRecord, ElementType, ModelGraph, NodeRecord};
pub use persistence::{Document, ImportReport};
pub use undo::{ActionRegistry, Payload, UndoLog};

#[cfg(test)]
mod tests;
