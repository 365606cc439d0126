//! Relationship allowance checks against the ArchiMate matrix.

use crate::generated::relationship_matrix;
use crate::vocabulary::{matrix_kind, relation_code};
use crate::{Error, Result};

/// Pure predicate over the static relationship matrix.
///
/// `enforce: false` is the user-facing permissive mode: every candidate is
/// allowed, including extension-only and otherwise unknown kinds. With
/// enforcement on, any kind outside the formal vocabulary fails the check
/// outright; extension kinds (`folder`, `note`, `view`, ...) are visual
/// constructs with no defined semantic relationships.
#[derive(Debug, Clone, Copy)]
pub struct AllowanceTable {
    enforce: bool,
}

impl Default for AllowanceTable {
    fn default() -> Self {
        Self { enforce: true }
    }
}

impl AllowanceTable {
    pub fn new(enforce: bool) -> Self {
        Self { enforce }
    }

    pub fn enforcing(&self) -> bool {
        self.enforce
    }

    /// Whether a `relation`-kind edge may run from a `source`-kind node to a
    /// `target`-kind node. Pure; no side effects.
    pub fn is_allowed(&self, relation: &str, source: &str, target: &str) -> bool {
        if !self.enforce {
            return true;
        }
        let Some(code) = relation_code(relation) else {
            return false;
        };
        match Self::allowed_codes(source, target) {
            Some(codes) => codes.contains(code),
            None => false,
        }
    }

    /// The raw matrix cell for a kind pair, junction-normalized. `None` when
    /// either kind is out of vocabulary.
    pub fn allowed_codes(source: &str, target: &str) -> Option<&'static str> {
        relationship_matrix().codes(matrix_kind(source), matrix_kind(target))
    }

    /// [`is_allowed`](Self::is_allowed) as a guard for the mutation path.
    pub fn check(&self, relation: &str, source: &str, target: &str) -> Result<()> {
        if self.is_allowed(relation, source, target) {
            return Ok(());
        }
        tracing::debug!(relation, source, target, "relationship rejected");
        Err(Error::InvalidRelationship {
            relation: relation.to_string(),
            source_kind: source.to_string(),
            target: target.to_string(),
        })
    }
}
