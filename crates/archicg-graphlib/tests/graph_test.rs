use archicg_graphlib::{EdgeKey, Graph, GraphOptions, alg};

fn multigraph() -> Graph<(), i32, ()> {
    Graph::new(GraphOptions {
        multigraph: true,
        ..Default::default()
    })
}

#[test]
fn set_node_then_update_label() {
    let mut g: Graph<i32, (), ()> = Graph::new(GraphOptions::default());
    g.set_node("a", 1);
    g.set_node("a", 2);

    assert_eq!(g.node_count(), 1);
    assert_eq!(g.node("a"), Some(&2));
}

#[test]
fn set_edge_creates_endpoints() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), Some(7));

    assert!(g.has_node("a"));
    assert!(g.has_node("b"));
    assert_eq!(g.edge("a", "b", Some("e1")), Some(&7));
    assert!(!g.has_edge("a", "b", Some("e2")));
}

#[test]
fn multigraph_keeps_named_parallel_edges() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), Some(1));
    g.set_edge_named("a", "b", Some("e2"), Some(2));

    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.edges_between("a", "b").len(), 2);
}

#[test]
fn non_multigraph_collapses_edge_names() {
    let mut g: Graph<(), i32, ()> = Graph::new(GraphOptions::default());
    g.set_edge_named("a", "b", Some("e1"), Some(1));
    g.set_edge_named("a", "b", Some("e2"), Some(2));

    assert_eq!(g.edge_count(), 1);
    assert_eq!(g.edge("a", "b", None), Some(&2));
}

#[test]
fn edges_between_is_direction_agnostic() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), None);
    g.set_edge_named("b", "a", Some("e2"), None);
    g.set_edge_named("a", "c", Some("e3"), None);

    let between = g.edges_between("a", "b");
    assert_eq!(between.len(), 2);
    assert_eq!(between[0], EdgeKey::new("a", "b", Some("e1")));
    assert_eq!(between[1], EdgeKey::new("b", "a", Some("e2")));
}

#[test]
fn successors_predecessors_and_neighbors() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), None);
    g.set_edge_named("b", "c", Some("e2"), None);
    g.set_edge_named("c", "b", Some("e3"), None);

    assert_eq!(g.successors("b"), vec!["c"]);
    let mut preds = g.predecessors("b");
    preds.sort();
    assert_eq!(preds, vec!["a", "c"]);
    let mut neigh = g.neighbors("b");
    neigh.sort();
    assert_eq!(neigh, vec!["a", "c"]);
}

#[test]
fn out_edges_and_in_edges_filter_by_endpoint() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), None);
    g.set_edge_named("a", "c", Some("e2"), None);
    g.set_edge_named("b", "a", Some("e3"), None);

    assert_eq!(g.out_edges("a", None).len(), 2);
    assert_eq!(g.out_edges("a", Some("b")).len(), 1);
    assert_eq!(g.in_edges("a", None).len(), 1);
    assert_eq!(g.node_edges("a").len(), 3);
}

#[test]
fn remove_edge_key_returns_label() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), Some(5));

    let key = EdgeKey::new("a", "b", Some("e1"));
    assert_eq!(g.remove_edge_key(&key), Some(5));
    assert_eq!(g.remove_edge_key(&key), None);
    assert_eq!(g.edge_count(), 0);
}

#[test]
fn sources_and_sinks() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), None);
    g.set_edge_named("b", "c", Some("e2"), None);

    assert_eq!(g.sources(), vec!["a"]);
    assert_eq!(g.sinks(), vec!["c"]);
}

#[test]
fn components_groups_connected_nodes() {
    let mut g = multigraph();
    g.set_edge_named("a", "b", Some("e1"), None);
    g.set_edge_named("b", "c", Some("e2"), None);
    g.ensure_node("lonely");

    let comps = alg::components(&g);
    assert_eq!(comps.len(), 2);
    assert_eq!(comps[0].len(), 3);
    assert_eq!(comps[1], vec!["lonely".to_string()]);
}
