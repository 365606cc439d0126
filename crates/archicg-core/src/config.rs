use crate::edge_group::EdgeGroupOptions;
use serde::Deserialize;

/// Editor-wide mode switches.
///
/// One explicit value owned by the [`Editor`](crate::Editor), so every
/// policy the controllers consult is visible in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Gate interactive edge creation on the relationship allowance table.
    /// When off, any candidate relationship passes.
    pub enforce_relationships: bool,
    /// Record mutations on the undo/redo log. When off, mutations apply
    /// directly and history is not kept.
    pub undo_redo: bool,
    /// Partition edge bundles by relationship kind when collapsing.
    pub group_edges_by_type: bool,
    /// Permit bundles whose members are themselves collapsed edges.
    pub allow_nested_edge_collapse: bool,
    /// Delete a compound node once its last child is reparented away.
    /// Off by default: the removed parent's attributes are not recoverable
    /// outside the undo log.
    pub auto_remove_empty_parents: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            enforce_relationships: true,
            undo_redo: true,
            group_edges_by_type: true,
            allow_nested_edge_collapse: true,
            auto_remove_empty_parents: false,
        }
    }
}

impl EditorConfig {
    pub fn edge_group_options(&self) -> EdgeGroupOptions {
        EdgeGroupOptions {
            group_by_same_type: self.group_edges_by_type,
            allow_nested_collapse: self.allow_nested_edge_collapse,
        }
    }
}
