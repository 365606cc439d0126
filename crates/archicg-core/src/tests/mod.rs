use crate::*;

mod compound;
mod editor;
mod undo;

/// Document with nodes and edges sorted by id. Restores append at the end
/// of the backing storage, so order-insensitive comparison is what "same
/// state" means across an undo cycle.
fn normalized(doc: &Document) -> Document {
    let mut doc = doc.clone();
    doc.nodes.sort_by(|a, b| a.id.cmp(&b.id));
    doc.edges.sort_by(|a, b| a.id.cmp(&b.id));
    doc
}

fn node(id: &str, kind: &str) -> NodeRecord {
    NodeRecord::new(id, kind)
}

fn edge(id: &str, kind: &str, source: &str, target: &str) -> EdgeRecord {
    EdgeRecord::new(id, kind, source, target)
}

/// Two actors, a role, and a nested application component under a grouping.
fn sample_editor() -> Editor {
    let mut ed = Editor::new();
    ed.add_node(node("actor-1", "business-actor").with_label("Claims Handler"))
        .unwrap();
    ed.add_node(node("actor-2", "business-actor")).unwrap();
    ed.add_node(node("role-1", "business-role")).unwrap();
    ed.add_node(node("grouping-1", "grouping")).unwrap();
    ed.add_node(node("component-1", "application-component"))
        .unwrap();
    ed.set_parent("component-1", Some("grouping-1")).unwrap();
    ed.clear_history();
    ed
}
