//! Compound multigraph container used by `archicg-core`.
//!
//! The API shape follows `@dagrejs/graphlib` (string node ids, `EdgeKey`
//! triples, parent/children maps for compound graphs) so that the domain
//! layer can be projected into and out of any graphlib-compatible engine.
//! Unlike the upstream library, `set_parent` is fallible: reparenting a
//! node under one of its own descendants is rejected with [`CycleError`]
//! and leaves the graph untouched.

use rustc_hash::FxBuildHasher;

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;
type HashSet<T> = hashbrown::HashSet<T, FxBuildHasher>;

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
    pub multigraph: bool,
    pub compound: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            directed: true,
            multigraph: false,
            compound: false,
        }
    }
}

/// Reparenting would make a node its own ancestor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleError {
    pub child: String,
    pub parent: String,
}

impl std::fmt::Display for CycleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "setting {} as parent of {} would create a cycle",
            self.parent, self.child
        )
    }
}

impl std::error::Error for CycleError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EdgeKey {
    pub v: String,
    pub w: String,
    pub name: Option<String>,
}

impl EdgeKey {
    pub fn new(
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
    ) -> Self {
        Self {
            v: v.into(),
            w: w.into(),
            name: name.map(Into::into),
        }
    }
}

#[derive(Debug, Clone)]
struct NodeEntry<N> {
    id: String,
    label: N,
}

#[derive(Debug, Clone)]
struct EdgeEntry<E> {
    key: EdgeKey,
    label: E,
}

pub struct Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    options: GraphOptions,

    graph_label: G,
    default_node_label: Box<dyn Fn() -> N + Send + Sync>,
    default_edge_label: Box<dyn Fn() -> E + Send + Sync>,

    nodes: Vec<NodeEntry<N>>,
    node_index: HashMap<String, usize>,

    edges: Vec<EdgeEntry<E>>,
    edge_index: HashMap<EdgeKey, usize>,

    parent: HashMap<String, String>,
    children: HashMap<String, Vec<String>>,
}

impl<N, E, G> std::fmt::Debug for Graph<N, E, G>
where
    N: Default + std::fmt::Debug + 'static,
    E: Default + std::fmt::Debug + 'static,
    G: Default + std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("options", &self.options)
            .field("graph_label", &self.graph_label)
            .field("nodes", &self.nodes)
            .field("edges", &self.edges)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl<N, E, G> Graph<N, E, G>
where
    N: Default + 'static,
    E: Default + 'static,
    G: Default,
{
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            graph_label: G::default(),
            default_node_label: Box::new(N::default),
            default_edge_label: Box::new(E::default),
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
            parent: HashMap::default(),
            children: HashMap::default(),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn set_graph(&mut self, label: G) -> &mut Self {
        self.graph_label = label;
        self
    }

    pub fn graph(&self) -> &G {
        &self.graph_label
    }

    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph_label
    }

    pub fn set_default_node_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> N + Send + Sync + 'static,
    {
        self.default_node_label = Box::new(f);
        self
    }

    pub fn set_default_edge_label<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> E + Send + Sync + 'static,
    {
        self.default_edge_label = Box::new(f);
        self
    }

    fn canonicalize_key(&self, key: EdgeKey) -> EdgeKey {
        let EdgeKey { mut v, mut w, name } = key;
        if !self.options.directed && v > w {
            std::mem::swap(&mut v, &mut w);
        }
        let name = if self.options.multigraph { name } else { None };
        EdgeKey { v, w, name }
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn set_node(&mut self, id: impl Into<String>, label: N) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    pub fn ensure_node(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return self;
        }
        let label = (self.default_node_label)();
        self.set_node(id, label)
    }

    pub fn node(&self, id: &str) -> Option<&N> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx].label)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut N> {
        self.node_index
            .get(id)
            .copied()
            .map(move |idx| &mut self.nodes[idx].label)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Node ids in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edge keys in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeKey> {
        self.edges.iter().map(|e| &e.key)
    }

    pub fn edge_keys(&self) -> Vec<EdgeKey> {
        self.edges.iter().map(|e| e.key.clone()).collect()
    }

    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, None)
    }

    pub fn set_edge_with_label(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        label: E,
    ) -> &mut Self {
        self.set_edge_named(v, w, None::<String>, Some(label))
    }

    pub fn set_edge_named(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        name: Option<impl Into<String>>,
        label: Option<E>,
    ) -> &mut Self {
        let v = v.into();
        let w = w.into();
        self.ensure_node(v.clone());
        self.ensure_node(w.clone());

        let key = self.canonicalize_key(EdgeKey {
            v,
            w,
            name: name.map(Into::into),
        });

        if let Some(&idx) = self.edge_index.get(&key) {
            if let Some(label) = label {
                self.edges[idx].label = label;
            }
            return self;
        }

        let idx = self.edges.len();
        self.edges.push(EdgeEntry {
            key: key.clone(),
            label: label.unwrap_or_else(|| (self.default_edge_label)()),
        });
        self.edge_index.insert(key, idx);
        self
    }

    pub fn set_edge_key(&mut self, key: EdgeKey, label: E) -> &mut Self {
        let key = self.canonicalize_key(key);
        self.set_edge_named(key.v, key.w, key.name, Some(label))
    }

    pub fn has_edge(&self, v: &str, w: &str, name: Option<&str>) -> bool {
        let key = self.canonicalize_key(EdgeKey::new(v, w, name));
        self.edge_index.contains_key(&key)
    }

    pub fn edge(&self, v: &str, w: &str, name: Option<&str>) -> Option<&E> {
        let key = self.canonicalize_key(EdgeKey::new(v, w, name));
        self.edge_index.get(&key).map(|&idx| &self.edges[idx].label)
    }

    pub fn edge_mut(&mut self, v: &str, w: &str, name: Option<&str>) -> Option<&mut E> {
        let key = self.canonicalize_key(EdgeKey::new(v, w, name));
        self.edge_index
            .get(&key)
            .copied()
            .map(move |idx| &mut self.edges[idx].label)
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Option<&E> {
        let key = self.canonicalize_key(key.clone());
        self.edge_index.get(&key).map(|&idx| &self.edges[idx].label)
    }

    pub fn edge_mut_by_key(&mut self, key: &EdgeKey) -> Option<&mut E> {
        let key = self.canonicalize_key(key.clone());
        self.edge_index
            .get(&key)
            .copied()
            .map(move |idx| &mut self.edges[idx].label)
    }

    pub fn remove_edge_key(&mut self, key: &EdgeKey) -> Option<E> {
        let key = self.canonicalize_key(key.clone());
        let idx = self.edge_index.remove(&key)?;
        let entry = self.edges.remove(idx);
        self.reindex_edges();
        Some(entry.label)
    }

    fn reindex_edges(&mut self) {
        self.edge_index.clear();
        for (i, e) in self.edges.iter().enumerate() {
            self.edge_index.insert(e.key.clone(), i);
        }
    }

    /// Removes a node plus its incident edges and parent/children links.
    /// Children of the removed node become roots.
    pub fn remove_node(&mut self, id: &str) -> Option<N> {
        let idx = self.node_index.remove(id)?;
        let entry = self.nodes.remove(idx);
        self.node_index.clear();
        for (i, n) in self.nodes.iter().enumerate() {
            self.node_index.insert(n.id.clone(), i);
        }

        let incident: Vec<EdgeKey> = self
            .edges
            .iter()
            .filter(|e| e.key.v == id || e.key.w == id)
            .map(|e| e.key.clone())
            .collect();
        for k in incident {
            let _ = self.remove_edge_key(&k);
        }

        if let Some(parent) = self.parent.remove(id) {
            if let Some(ch) = self.children.get_mut(&parent) {
                ch.retain(|c| c != id);
            }
        }
        if let Some(ch) = self.children.remove(id) {
            for child in ch {
                self.parent.remove(&child);
            }
        }

        Some(entry.label)
    }

    pub fn successors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let mut out: Vec<&str> = Vec::new();
        for e in &self.edges {
            if e.key.v == v && !out.contains(&e.key.w.as_str()) {
                out.push(e.key.w.as_str());
            }
        }
        out
    }

    pub fn predecessors(&self, v: &str) -> Vec<&str> {
        if !self.options.directed {
            return self.neighbors(v);
        }
        let mut out: Vec<&str> = Vec::new();
        for e in &self.edges {
            if e.key.w == v && !out.contains(&e.key.v.as_str()) {
                out.push(e.key.v.as_str());
            }
        }
        out
    }

    pub fn neighbors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for e in &self.edges {
            let other = if e.key.v == v {
                Some(e.key.w.as_str())
            } else if e.key.w == v {
                Some(e.key.v.as_str())
            } else {
                None
            };
            if let Some(other) = other {
                if !out.contains(&other) {
                    out.push(other);
                }
            }
        }
        out
    }

    pub fn out_edges(&self, v: &str, w: Option<&str>) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.incident_edges(v, w);
        }
        self.edges
            .iter()
            .filter(|e| e.key.v == v && w.is_none_or(|w| e.key.w == w))
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn in_edges(&self, v: &str, u: Option<&str>) -> Vec<EdgeKey> {
        if !self.options.directed {
            return self.incident_edges(v, u);
        }
        self.edges
            .iter()
            .filter(|e| e.key.w == v && u.is_none_or(|u| e.key.v == u))
            .map(|e| e.key.clone())
            .collect()
    }

    fn incident_edges(&self, v: &str, other: Option<&str>) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| {
                let (a, b) = (e.key.v.as_str(), e.key.w.as_str());
                (a == v || b == v)
                    && other.is_none_or(|o| (a == v && b == o) || (b == v && a == o))
            })
            .map(|e| e.key.clone())
            .collect()
    }

    /// Edges incident to `v`, regardless of direction, in insertion order.
    pub fn node_edges(&self, v: &str) -> Vec<EdgeKey> {
        let mut seen: HashSet<EdgeKey> = HashSet::default();
        self.edges
            .iter()
            .filter(|e| (e.key.v == v || e.key.w == v) && seen.insert(e.key.clone()))
            .map(|e| e.key.clone())
            .collect()
    }

    /// All edges joining `a` and `b` in either direction, in insertion order.
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<EdgeKey> {
        self.edges
            .iter()
            .filter(|e| {
                (e.key.v == a && e.key.w == b) || (e.key.v == b && e.key.w == a)
            })
            .map(|e| e.key.clone())
            .collect()
    }

    pub fn set_parent(
        &mut self,
        child: impl Into<String>,
        parent: impl Into<String>,
    ) -> Result<&mut Self, CycleError> {
        if !self.options.compound {
            return Ok(self);
        }
        let child = child.into();
        let parent = parent.into();
        if child == parent || self.is_descendant_of(&parent, &child) {
            return Err(CycleError { child, parent });
        }
        self.ensure_node(child.clone());
        self.ensure_node(parent.clone());
        if let Some(prev) = self.parent.insert(child.clone(), parent.clone()) {
            if let Some(ch) = self.children.get_mut(&prev) {
                ch.retain(|c| c != &child);
            }
        }
        let entry = self.children.entry(parent).or_default();
        if !entry.iter().any(|c| c == &child) {
            entry.push(child);
        }
        Ok(self)
    }

    pub fn clear_parent(&mut self, child: &str) -> &mut Self {
        if !self.options.compound {
            return self;
        }
        if let Some(prev) = self.parent.remove(child) {
            if let Some(ch) = self.children.get_mut(&prev) {
                ch.retain(|c| c != child);
            }
        }
        self
    }

    pub fn parent(&self, child: &str) -> Option<&str> {
        self.parent.get(child).map(|s| s.as_str())
    }

    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|v| v.iter().map(|s| s.as_str()).collect::<Vec<_>>())
            .unwrap_or_default()
    }

    pub fn children_root(&self) -> Vec<&str> {
        if !self.options.compound {
            return self.nodes().collect();
        }
        self.nodes
            .iter()
            .filter(|n| !self.parent.contains_key(&n.id))
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Parent chain of `v`, nearest first. The parent relation is acyclic
    /// (enforced by `set_parent`), so this terminates.
    pub fn ancestors(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let mut cur = v;
        while let Some(p) = self.parent.get(cur) {
            out.push(p.as_str());
            cur = p;
        }
        out
    }

    /// Transitive children of `v`.
    pub fn descendants(&self, v: &str) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let mut queue: Vec<&str> = self.children(v);
        while let Some(c) = queue.pop() {
            queue.extend(self.children(c));
            out.push(c);
        }
        out
    }

    pub fn is_descendant_of(&self, v: &str, ancestor: &str) -> bool {
        let mut cur = v;
        while let Some(p) = self.parent.get(cur) {
            if p == ancestor {
                return true;
            }
            cur = p;
        }
        false
    }

    pub fn sources(&self) -> Vec<&str> {
        if !self.options.directed {
            return self.nodes().collect();
        }
        self.nodes
            .iter()
            .filter(|n| self.in_edges(&n.id, None).is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }

    pub fn sinks(&self) -> Vec<&str> {
        if !self.options.directed {
            return self.nodes().collect();
        }
        self.nodes
            .iter()
            .filter(|n| self.out_edges(&n.id, None).is_empty())
            .map(|n| n.id.as_str())
            .collect()
    }
}

pub mod alg {
    use super::Graph;
    use std::collections::{BTreeSet, VecDeque};

    /// Weakly connected components, each in discovery order.
    pub fn components<N, E, G>(g: &Graph<N, E, G>) -> Vec<Vec<String>>
    where
        N: Default + 'static,
        E: Default + 'static,
        G: Default,
    {
        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut out: Vec<Vec<String>> = Vec::new();

        for start in g.node_ids() {
            if !seen.insert(start.clone()) {
                continue;
            }
            let mut comp: Vec<String> = Vec::new();
            let mut q: VecDeque<String> = VecDeque::new();
            q.push_back(start);
            while let Some(v) = q.pop_front() {
                comp.push(v.clone());
                for n in g.neighbors(&v) {
                    if seen.insert(n.to_string()) {
                        q.push_back(n.to_string());
                    }
                }
            }
            out.push(comp);
        }

        out
    }
}
