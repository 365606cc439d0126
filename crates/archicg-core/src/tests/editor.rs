use crate::*;

use super::{edge, node, normalized, sample_editor};

#[test]
fn add_edge_is_gated_on_the_allowance_table() {
    let mut ed = sample_editor();
    ed.add_edge(edge("e-1", "assignment", "actor-1", "role-1"))
        .unwrap();

    let err = ed
        .add_edge(edge("e-2", "assignment", "actor-1", "actor-2"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRelationship { .. }));
    assert!(!ed.graph().has_edge("e-2"));
}

#[test]
fn permissive_config_skips_the_gate() {
    let mut config = EditorConfig::default();
    config.enforce_relationships = false;
    let mut ed = Editor::with_config(config);
    ed.add_node(node("a", "business-actor")).unwrap();
    ed.add_node(node("b", "business-actor")).unwrap();
    ed.add_edge(edge("e-1", "assignment", "a", "b")).unwrap();
    assert!(ed.graph().has_edge("e-1"));
}

#[test]
fn add_edge_requires_both_endpoints() {
    let mut ed = sample_editor();
    let err = ed
        .add_edge(edge("e-1", "flow", "actor-1", "missing"))
        .unwrap_err();
    assert!(matches!(err, Error::MissingNode { .. }));
    assert!(!ed.can_undo());
}

#[test]
fn duplicate_node_id_is_rejected() {
    let mut ed = sample_editor();
    let err = ed.add_node(node("actor-1", "business-actor")).unwrap_err();
    assert!(matches!(err, Error::DuplicateId { .. }));
}

#[test]
fn removing_an_edge_by_id() {
    let mut ed = sample_editor();
    ed.add_edge(edge("e-1", "flow", "actor-1", "role-1")).unwrap();
    ed.remove(&["e-1".to_string()]).unwrap();
    assert!(!ed.graph().has_edge("e-1"));
    ed.undo().unwrap();
    assert!(ed.graph().has_edge("e-1"));
}

#[test]
fn document_round_trip_through_the_editor() {
    let ed = sample_editor();
    let doc = ed.to_document();
    let (reopened, report) = Editor::from_document(&doc, EditorConfig::default()).unwrap();
    assert!(report.is_clean());
    assert_eq!(normalized(&reopened.to_document()), normalized(&doc));
    assert_eq!(reopened.graph().parent("component-1"), Some("grouping-1"));
}

#[test]
fn violations_report_ignores_bundles() {
    let mut config = EditorConfig::default();
    config.enforce_relationships = false;
    let mut ed = Editor::with_config(config);
    ed.add_node(node("a", "business-actor")).unwrap();
    ed.add_node(node("b", "business-actor")).unwrap();
    ed.add_edge(edge("bad-1", "assignment", "a", "b")).unwrap();
    ed.add_edge(edge("ok-1", "flow", "a", "b")).unwrap();
    ed.add_edge(edge("ok-2", "flow", "a", "b")).unwrap();
    ed.collapse_edges_between("a", "b").unwrap();

    // The flow bundle is skipped; its members are hidden inside it, and
    // the plain assignment edge is the single finding.
    let violations = ed.relationship_violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].edge_id, "bad-1");
    assert_eq!(violations[0].relation, "assignment");
    assert_eq!(violations[0].source_kind, "business-actor");
    assert_eq!(violations[0].target_kind, "business-actor");
}

#[test]
fn violations_are_empty_for_a_legal_model() {
    let mut ed = sample_editor();
    ed.add_edge(edge("e-1", "assignment", "actor-1", "role-1"))
        .unwrap();
    assert!(ed.relationship_violations().is_empty());
}

#[test]
fn component_count_reflects_connectivity() {
    let mut ed = sample_editor();
    // Nesting is not adjacency: five isolated nodes to begin with.
    assert_eq!(ed.graph().component_count(), 5);
    ed.add_edge(edge("e-1", "flow", "actor-1", "role-1")).unwrap();
    assert_eq!(ed.graph().component_count(), 4);
}
