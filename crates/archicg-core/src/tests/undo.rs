use crate::undo::{BatchStep, Payload};
use crate::*;

use super::{edge, node, normalized, sample_editor};

#[test]
fn every_builtin_action_is_registered() {
    let reg = ActionRegistry::builtin();
    for name in [
        actions::ADD_ELEMENTS,
        actions::REMOVE_ELEMENTS,
        actions::CHANGE_LABELS,
        actions::CHANGE_NODE_KINDS,
        actions::CHANGE_EDGE_KINDS,
        actions::CHANGE_SPECIALIZATIONS,
        actions::REPARENT,
        actions::COLLAPSE_NODES,
        actions::EXPAND_NODES,
        actions::COLLAPSE_EDGES,
        actions::EXPAND_EDGES,
        actions::EXPAND_ALL_EDGES,
    ] {
        assert!(reg.contains(name), "missing action {name}");
    }
}

#[test]
fn unknown_action_name_is_an_error() {
    let mut ed = Editor::new();
    let err = ed.perform("frobnicate", Payload::Empty).unwrap_err();
    assert!(matches!(err, Error::UnknownAction { .. }));
    assert!(!ed.can_undo());
}

#[test]
fn wrong_payload_shape_is_an_error() {
    let mut ed = Editor::new();
    let err = ed
        .perform(actions::COLLAPSE_NODES, Payload::Empty)
        .unwrap_err();
    assert!(matches!(err, Error::PayloadMismatch { .. }));
    assert!(!ed.can_undo());
}

#[test]
fn a_sequence_of_undos_restores_the_starting_state() {
    let mut ed = sample_editor();
    let start = ed.to_document();

    ed.add_edge(edge("f-1", "flow", "actor-1", "role-1")).unwrap();
    ed.add_edge(edge("f-2", "flow", "actor-1", "role-1")).unwrap();
    ed.set_label("actor-1", Some("Renamed".to_string())).unwrap();
    ed.collapse_edges_between("actor-1", "role-1").unwrap();
    ed.collapse(&["grouping-1".to_string()]).unwrap();
    ed.set_parent("role-1", Some("grouping-1")).unwrap();
    ed.remove(&["actor-2".to_string()]).unwrap();

    let mut undone = 0;
    while ed.undo().unwrap() {
        undone += 1;
    }
    assert_eq!(undone, 7);
    assert_eq!(normalized(&ed.to_document()), normalized(&start));
    assert!(!ed.can_undo());
}

#[test]
fn redo_replays_to_the_same_state() {
    let mut ed = sample_editor();
    ed.add_edge(edge("f-1", "flow", "actor-1", "role-1")).unwrap();
    ed.add_edge(edge("f-2", "flow", "actor-1", "role-1")).unwrap();
    ed.collapse_edges_between("actor-1", "role-1").unwrap();
    ed.set_label("actor-1", Some("Renamed".to_string())).unwrap();
    let after = ed.to_document();

    ed.undo().unwrap();
    ed.undo().unwrap();
    assert!(ed.can_redo());
    ed.redo().unwrap();
    ed.redo().unwrap();

    // Generated bundle ids survive the round trip, so the documents match
    // bit for bit modulo storage order.
    assert_eq!(normalized(&ed.to_document()), normalized(&after));
    assert!(!ed.can_redo());
}

#[test]
fn a_fresh_action_invalidates_redo() {
    let mut ed = sample_editor();
    ed.set_label("actor-1", Some("First".to_string())).unwrap();
    ed.undo().unwrap();
    assert!(ed.can_redo());
    ed.set_label("actor-1", Some("Second".to_string())).unwrap();
    assert!(!ed.can_redo());
    assert_eq!(
        ed.graph().node("actor-1").unwrap().label.as_deref(),
        Some("Second")
    );
}

#[test]
fn label_change_round_trips_through_undo() {
    let mut ed = sample_editor();
    ed.set_label("actor-1", None).unwrap();
    assert_eq!(ed.graph().node("actor-1").unwrap().label, None);
    ed.undo().unwrap();
    assert_eq!(
        ed.graph().node("actor-1").unwrap().label.as_deref(),
        Some("Claims Handler")
    );
}

#[test]
fn removing_a_compound_takes_descendants_and_edges() {
    let mut ed = sample_editor();
    ed.add_edge(edge("s-1", "serving", "component-1", "actor-1"))
        .unwrap();
    let before = ed.to_document();

    ed.remove(&["grouping-1".to_string()]).unwrap();
    assert!(!ed.graph().has_node("grouping-1"));
    assert!(!ed.graph().has_node("component-1"));
    assert!(!ed.graph().has_edge("s-1"));

    ed.undo().unwrap();
    assert_eq!(normalized(&ed.to_document()), normalized(&before));
    assert_eq!(ed.graph().parent("component-1"), Some("grouping-1"));
}

#[test]
fn batch_applies_all_or_nothing() {
    let mut ed = sample_editor();
    let before = ed.to_document();

    let err = ed
        .perform(
            "batch",
            Payload::Batch(vec![
                BatchStep {
                    action: actions::ADD_ELEMENTS.to_string(),
                    payload: Payload::Elements {
                        nodes: vec![node("n-new", "business-object")],
                        edges: Vec::new(),
                    },
                },
                // Duplicate id makes the second step fail.
                BatchStep {
                    action: actions::ADD_ELEMENTS.to_string(),
                    payload: Payload::Elements {
                        nodes: vec![node("actor-1", "business-actor")],
                        edges: Vec::new(),
                    },
                },
            ]),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateId { .. }));
    assert!(!ed.graph().has_node("n-new"));
    assert_eq!(normalized(&ed.to_document()), normalized(&before));
    assert!(!ed.can_undo());
}

#[test]
fn batch_undoes_as_one_entry() {
    let mut ed = sample_editor();
    let before = ed.to_document();
    ed.perform(
        "batch",
        Payload::Batch(vec![
            BatchStep {
                action: actions::ADD_ELEMENTS.to_string(),
                payload: Payload::Elements {
                    nodes: vec![node("n-1", "business-object"), node("n-2", "business-object")],
                    edges: Vec::new(),
                },
            },
            BatchStep {
                action: actions::CHANGE_LABELS.to_string(),
                payload: Payload::Labels(vec![crate::undo::LabelChange {
                    id: "n-1".to_string(),
                    label: Some("Claim".to_string()),
                }]),
            },
        ]),
    )
    .unwrap();
    assert_eq!(
        ed.graph().node("n-1").unwrap().label.as_deref(),
        Some("Claim")
    );

    assert!(ed.undo().unwrap());
    assert_eq!(normalized(&ed.to_document()), normalized(&before));
    assert!(!ed.can_undo());
}

#[test]
fn history_switch_off_applies_without_recording() {
    let mut config = EditorConfig::default();
    config.undo_redo = false;
    let mut ed = Editor::with_config(config);
    ed.add_node(node("a", "business-actor")).unwrap();
    assert!(ed.graph().has_node("a"));
    assert!(!ed.can_undo());
    assert!(!ed.undo().unwrap());
}

#[test]
fn failed_undo_keeps_the_stacks_intact() {
    let mut ed = Editor::new();
    ed.register_action(
        "poison",
        Box::new(|_, _, payload| Ok(payload)),
        Box::new(|_, _, _| {
            Err(Error::MalformedDocument {
                message: "inverse failed".to_string(),
            })
        }),
    );
    ed.perform("poison", Payload::Empty).unwrap();
    assert!(ed.can_undo());
    assert!(ed.undo().is_err());
    // The entry is put back, not lost.
    assert!(ed.can_undo());
    assert!(!ed.can_redo());
}

#[test]
fn custom_actions_participate_in_undo() {
    let mut ed = sample_editor();
    ed.register_action(
        "toggle-collapse",
        Box::new(|graph, _cfg, payload| {
            let Payload::NodeIds(ids) = payload else {
                return Err(Error::PayloadMismatch {
                    name: "toggle-collapse".to_string(),
                });
            };
            for id in &ids {
                if let Some(n) = graph.node_mut(id) {
                    n.collapsed = !n.collapsed;
                }
            }
            Ok(Payload::NodeIds(ids))
        }),
        Box::new(|graph, _cfg, payload| {
            let Payload::NodeIds(ids) = payload else {
                return Err(Error::PayloadMismatch {
                    name: "toggle-collapse".to_string(),
                });
            };
            for id in &ids {
                if let Some(n) = graph.node_mut(id) {
                    n.collapsed = !n.collapsed;
                }
            }
            Ok(Payload::NodeIds(ids))
        }),
    );
    ed.perform("toggle-collapse", Payload::NodeIds(vec!["grouping-1".to_string()]))
        .unwrap();
    assert!(ed.graph().node("grouping-1").unwrap().collapsed);
    ed.undo().unwrap();
    assert!(!ed.graph().node("grouping-1").unwrap().collapsed);
}
