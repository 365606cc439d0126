//! The closed ArchiMate 3.x vocabularies: element kinds, relationship kinds
//! with their one-letter matrix codes, and layer classification.
//!
//! Model kinds are kebab-case strings (`"business-actor"`). The formal
//! vocabulary distinguishes `and-junction`/`or-junction` as model kinds but
//! the relationship matrix only carries a generic `junction` row/column, so
//! [`matrix_kind`] folds both onto `"junction"` before any lookup.

/// Relationship kinds in matrix-code order (`a c f g i n o r s t v`).
pub const RELATION_KINDS: [(&str, char); 11] = [
    ("access", 'a'),
    ("composition", 'c'),
    ("flow", 'f'),
    ("aggregation", 'g'),
    ("assignment", 'i'),
    ("influence", 'n'),
    ("association", 'o'),
    ("realization", 'r'),
    ("specialization", 's'),
    ("triggering", 't'),
    ("serving", 'v'),
];

/// Relationship kinds that express structure (nesting-justifying).
pub const STRUCTURAL_RELATIONS: [&str; 4] =
    ["composition", "aggregation", "assignment", "realization"];

/// Extension-only kinds used by the surrounding tooling. They are visual or
/// organizational, not part of the formal language, and the allowance table
/// rejects every relationship touching them while enforcement is on.
pub const EXTENSION_KINDS: [&str; 13] = [
    "view",
    "viewpoint",
    "model",
    "folder",
    "package",
    "group",
    "note",
    "drawing",
    "extensions",
    "relations",
    "metamodel",
    "layer",
    "not-defined",
];

/// Kind assigned to placeholder nodes materialized for dangling edge
/// endpoints during import.
pub const BLANK_NODE_KIND: &str = "blank-node";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Strategy,
    Business,
    Application,
    Technology,
    Physical,
    Motivation,
    ImplementationMigration,
    Other,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Strategy => "strategy",
            Layer::Business => "business",
            Layer::Application => "application",
            Layer::Technology => "technology",
            Layer::Physical => "physical",
            Layer::Motivation => "motivation",
            Layer::ImplementationMigration => "implementation-migration",
            Layer::Other => "others",
        }
    }
}

/// Resolves a relationship kind to its one-letter matrix code.
pub fn relation_code(kind: &str) -> Option<char> {
    RELATION_KINDS
        .iter()
        .find(|(name, _)| *name == kind)
        .map(|&(_, code)| code)
}

pub fn relation_kind_for_code(code: char) -> Option<&'static str> {
    RELATION_KINDS
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(name, _)| name)
}

pub fn is_relation_kind(kind: &str) -> bool {
    relation_code(kind).is_some()
}

pub fn is_structural_relation(kind: &str) -> bool {
    STRUCTURAL_RELATIONS.contains(&kind)
}

pub fn is_extension_kind(kind: &str) -> bool {
    EXTENSION_KINDS.contains(&kind)
}

/// Folds junction refinements onto the matrix's generic `junction` kind.
pub fn matrix_kind(kind: &str) -> &str {
    match kind {
        "and-junction" | "or-junction" | "andjunction" | "orjunction" => "junction",
        other => other,
    }
}

/// Whether `kind` belongs to the formal element vocabulary (junction
/// refinements included).
pub fn is_element_kind(kind: &str) -> bool {
    crate::generated::relationship_matrix()
        .element_index(matrix_kind(kind))
        .is_some()
}

/// Layer classification of a formal element kind. Extension kinds and
/// anything else out of vocabulary land in [`Layer::Other`].
pub fn layer_of(kind: &str) -> Layer {
    let Some(index) = crate::generated::relationship_matrix().element_index(matrix_kind(kind))
    else {
        return Layer::Other;
    };
    // The matrix lists kinds grouped by layer, in specification order.
    match index {
        0..=3 => Layer::Strategy,
        4..=16 => Layer::Business,
        17..=25 => Layer::Application,
        26..=38 => Layer::Technology,
        39..=42 => Layer::Physical,
        43..=52 => Layer::Motivation,
        53..=57 => Layer::ImplementationMigration,
        _ => Layer::Other,
    }
}
