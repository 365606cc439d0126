use crate::compound;
use crate::*;

use super::{node, sample_editor};

#[test]
fn collapse_hides_children_without_touching_ownership() {
    let mut ed = sample_editor();
    ed.collapse(&["grouping-1".to_string()]).unwrap();

    let graph = ed.graph();
    assert!(graph.node("grouping-1").unwrap().collapsed);
    assert!(graph.is_hidden("component-1"));
    assert_eq!(graph.parent("component-1"), Some("grouping-1"));
    assert!(!graph.visible_node_ids().contains(&"component-1".to_string()));

    // The persisted nesting is unchanged.
    let doc = ed.to_document();
    let child = doc.nodes.iter().find(|n| n.id == "component-1").unwrap();
    assert_eq!(child.parent_id.as_deref(), Some("grouping-1"));
}

#[test]
fn collapse_then_expand_is_identity() {
    let mut ed = sample_editor();
    let before = ed.to_document();
    ed.collapse(&["grouping-1".to_string()]).unwrap();
    ed.expand(&["grouping-1".to_string()]).unwrap();
    assert_eq!(ed.to_document(), before);
}

#[test]
fn collapsing_a_childless_node_is_a_no_op() {
    let mut ed = sample_editor();
    ed.collapse(&["actor-1".to_string()]).unwrap();
    assert!(!ed.graph().node("actor-1").unwrap().collapsed);
    // The entry records an empty delta; undoing it is harmless.
    assert!(ed.can_undo());
    ed.undo().unwrap();
    assert!(!ed.graph().node("actor-1").unwrap().collapsed);
}

#[test]
fn reparent_cycle_is_rejected_and_harmless() {
    let mut ed = sample_editor();
    // grouping-1 owns component-1; nesting it under its own child cycles.
    let err = ed.set_parent("grouping-1", Some("component-1")).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));

    assert_eq!(ed.graph().parent("component-1"), Some("grouping-1"));
    assert_eq!(ed.graph().parent("grouping-1"), None);
    assert!(!ed.can_undo());
}

#[test]
fn self_parenting_is_rejected() {
    let mut ed = sample_editor();
    let err = ed.set_parent("actor-1", Some("actor-1")).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));
}

#[test]
fn reparent_to_root_and_back() {
    let mut ed = sample_editor();
    ed.set_parent("component-1", None).unwrap();
    assert_eq!(ed.graph().parent("component-1"), None);
    ed.undo().unwrap();
    assert_eq!(ed.graph().parent("component-1"), Some("grouping-1"));
}

#[test]
fn batched_reparent_is_atomic() {
    let mut ed = sample_editor();
    let moves = vec![
        compound::ParentChange {
            id: "actor-1".to_string(),
            parent: Some("grouping-1".to_string()),
        },
        // Second move cycles, so the first must be rolled back too.
        compound::ParentChange {
            id: "grouping-1".to_string(),
            parent: Some("component-1".to_string()),
        },
    ];
    let config = EditorConfig::default();
    let mut graph = crate::persistence::import(&ed.to_document()).unwrap().0;
    let err = compound::reparent(&mut graph, &config, &moves).unwrap_err();
    assert!(matches!(err, Error::Cycle(_)));
    assert_eq!(graph.parent("actor-1"), None);
    assert_eq!(graph.parent("grouping-1"), None);
}

#[test]
fn auto_remove_deletes_vacated_empty_parent() {
    let mut config = EditorConfig::default();
    config.auto_remove_empty_parents = true;
    let mut ed = Editor::with_config(config);
    ed.add_node(node("g", "grouping")).unwrap();
    ed.add_node(node("a", "business-actor")).unwrap();
    ed.set_parent("a", Some("g")).unwrap();

    ed.set_parent("a", None).unwrap();
    assert!(!ed.graph().has_node("g"));

    // Undo resurrects the deleted parent with the nesting intact.
    ed.undo().unwrap();
    assert!(ed.graph().has_node("g"));
    assert_eq!(ed.graph().parent("a"), Some("g"));
}

#[test]
fn auto_remove_off_keeps_empty_parent() {
    let mut ed = sample_editor();
    ed.set_parent("component-1", None).unwrap();
    assert!(ed.graph().has_node("grouping-1"));
}

#[test]
fn collapse_all_goes_shallowest_first() {
    let mut ed = sample_editor();
    ed.add_node(node("inner", "grouping")).unwrap();
    ed.add_node(node("leaf", "business-object")).unwrap();
    ed.set_parent("inner", Some("grouping-1")).unwrap();
    ed.set_parent("leaf", Some("inner")).unwrap();

    let order = compound::collapse_all_order(ed.graph());
    assert_eq!(order, vec!["grouping-1".to_string(), "inner".to_string()]);
    let reverse = compound::expand_all_order(ed.graph());
    assert_eq!(reverse, vec!["inner".to_string(), "grouping-1".to_string()]);
}

#[test]
fn recursive_order_covers_nested_compounds() {
    let mut ed = sample_editor();
    ed.add_node(node("inner", "grouping")).unwrap();
    ed.add_node(node("leaf", "business-object")).unwrap();
    ed.set_parent("inner", Some("grouping-1")).unwrap();
    ed.set_parent("leaf", Some("inner")).unwrap();

    let order = compound::recursive_order(ed.graph(), &["grouping-1".to_string()]);
    assert_eq!(order, vec!["grouping-1".to_string(), "inner".to_string()]);

    ed.collapse_recursively(&["grouping-1".to_string()]).unwrap();
    assert!(ed.graph().node("grouping-1").unwrap().collapsed);
    assert!(ed.graph().node("inner").unwrap().collapsed);
    ed.undo().unwrap();
    assert!(!ed.graph().node("grouping-1").unwrap().collapsed);
    assert!(!ed.graph().node("inner").unwrap().collapsed);
}

#[test]
fn group_under_new_parent_is_one_undo_step() {
    let mut ed = sample_editor();
    let before = ed.to_document();
    let parent_id = ed
        .group_under_new_parent(
            &["actor-1".to_string(), "actor-2".to_string()],
            node("g-new", "grouping").with_label("Actors"),
        )
        .unwrap();
    assert_eq!(parent_id, "g-new");
    assert_eq!(ed.graph().parent("actor-1"), Some("g-new"));
    assert_eq!(ed.graph().parent("actor-2"), Some("g-new"));

    ed.undo().unwrap();
    assert_eq!(ed.to_document(), before);
}
