//! Static data extracted from the ArchiMate 3.x relationship tables.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
struct RawMatrix {
    relations: FxHashMap<String, String>,
    elements: Vec<String>,
    cells: Vec<Vec<String>>,
}

/// The (source kind, target kind) -> allowed-relation-code table.
///
/// Rows and columns are the 61 formal element kinds in specification order;
/// each cell is a string of one-letter relationship codes.
#[derive(Debug)]
pub struct RelationshipMatrix {
    elements: Vec<String>,
    index: FxHashMap<String, usize>,
    cells: Vec<Vec<String>>,
}

impl RelationshipMatrix {
    pub fn element_kinds(&self) -> &[String] {
        &self.elements
    }

    pub fn element_index(&self, kind: &str) -> Option<usize> {
        self.index.get(kind).copied()
    }

    /// Allowed relation codes from `source` to `target`, or `None` when
    /// either kind is out of vocabulary.
    pub fn codes(&self, source: &str, target: &str) -> Option<&str> {
        let s = self.element_index(source)?;
        let t = self.element_index(target)?;
        Some(self.cells[s][t].as_str())
    }
}

static RELATIONSHIP_MATRIX: OnceLock<RelationshipMatrix> = OnceLock::new();

pub fn relationship_matrix() -> &'static RelationshipMatrix {
    RELATIONSHIP_MATRIX.get_or_init(|| {
        let json_text = include_str!("relationship_matrix.json");
        let raw: RawMatrix =
            serde_json::from_str(json_text).expect("generated relationship matrix JSON is valid");
        debug_assert_eq!(raw.relations.len(), 11);
        debug_assert!(raw.cells.len() == raw.elements.len());
        debug_assert!(raw.cells.iter().all(|row| row.len() == raw.elements.len()));
        let index = raw
            .elements
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        RelationshipMatrix {
            elements: raw.elements,
            index,
            cells: raw.cells,
        }
    })
}
