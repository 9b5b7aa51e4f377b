//! Subject / query / organism relationship graph
//!
//! The graph is undirected and simple: an edge is identified by its
//! unordered node pair, so re-adding a pair never creates a parallel edge.
//! When a pair is re-added, a supplied organism attribute replaces the
//! stored one and an absent attribute leaves it untouched. Within one
//! layer this means the last row wins; across layers, an attribute set by
//! an earlier layer survives a later attribute-less edge.

use indexmap::IndexMap;

use crate::merge::MergedRecord;

/// Synthetic node every organism is attached to
pub const ANCHOR_NODE: &str = "Queries";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Subject,
    Query,
    Organism,
    Anchor,
}

#[derive(Debug, Clone, Default)]
pub struct RelationshipGraph {
    /// Node name to kind; a name keeps the kind it was first added with
    nodes: IndexMap<String, NodeKind>,
    /// Canonical (low, high) node index pair to organism attribute
    edges: IndexMap<(usize, usize), Option<String>>,
}

impl RelationshipGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> usize {
        if let Some(index) = self.nodes.get_index_of(name) {
            return index;
        }
        self.nodes.insert_full(name.to_string(), kind).0
    }

    pub fn add_edge(
        &mut self,
        (a, a_kind): (&str, NodeKind),
        (b, b_kind): (&str, NodeKind),
        organism: Option<&str>,
    ) {
        let i = self.add_node(a, a_kind);
        let j = self.add_node(b, b_kind);
        let key = if i <= j { (i, j) } else { (j, i) };

        let slot = self.edges.entry(key).or_insert(None);
        if let Some(organism) = organism {
            *slot = Some(organism.to_string());
        }
    }

    /// Merge `other` into `self`; nodes and edges of `self` come first
    pub fn compose(&mut self, other: &RelationshipGraph) {
        for (name, kind) in &other.nodes {
            self.add_node(name, *kind);
        }
        for (a, b, organism) in other.edges() {
            let a_kind = other.nodes[a];
            let b_kind = other.nodes[b];
            self.add_edge((a, a_kind), (b, b_kind), organism);
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = (&str, NodeKind)> + '_ {
        self.nodes.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.nodes.get(name).copied()
    }

    /// Edges as node index pairs, in insertion order
    pub fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.keys().copied()
    }

    /// Edges as (name, name, organism attribute), in insertion order
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str, Option<&str>)> + '_ {
        self.edges.iter().map(move |(&(i, j), organism)| {
            (
                self.nodes.get_index(i).map(|(n, _)| n.as_str()).unwrap_or_default(),
                self.nodes.get_index(j).map(|(n, _)| n.as_str()).unwrap_or_default(),
                organism.as_deref(),
            )
        })
    }

    fn edge_key(&self, a: &str, b: &str) -> Option<(usize, usize)> {
        let i = self.nodes.get_index_of(a)?;
        let j = self.nodes.get_index_of(b)?;
        Some(if i <= j { (i, j) } else { (j, i) })
    }

    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        self.edge_key(a, b)
            .map(|key| self.edges.contains_key(&key))
            .unwrap_or(false)
    }

    /// Organism attribute of an edge, if the edge exists and carries one
    pub fn edge_organism(&self, a: &str, b: &str) -> Option<&str> {
        let key = self.edge_key(a, b)?;
        self.edges.get(&key)?.as_deref()
    }
}

/// One subject-query edge per record, carrying the record's organism
pub fn subject_query_layer(records: &[MergedRecord]) -> RelationshipGraph {
    let mut graph = RelationshipGraph::new();
    for r in records {
        graph.add_edge(
            (r.subject_id.as_str(), NodeKind::Subject),
            (r.query_id.as_str(), NodeKind::Query),
            Some(r.organism.as_str()),
        );
    }
    graph
}

/// One organism-query edge per record
pub fn organism_query_layer(records: &[MergedRecord]) -> RelationshipGraph {
    let mut graph = RelationshipGraph::new();
    for r in records {
        graph.add_edge(
            (r.organism.as_str(), NodeKind::Organism),
            (r.query_id.as_str(), NodeKind::Query),
            None,
        );
    }
    graph
}

/// Attach every organism seen in `records` to the anchor node
pub fn add_anchor_edges(graph: &mut RelationshipGraph, records: &[MergedRecord]) {
    for r in records {
        graph.add_edge(
            (r.organism.as_str(), NodeKind::Organism),
            (ANCHOR_NODE, NodeKind::Anchor),
            None,
        );
    }
}

pub fn build_graph(records: &[MergedRecord]) -> RelationshipGraph {
    let mut graph = subject_query_layer(records);
    graph.compose(&organism_query_layer(records));
    add_anchor_edges(&mut graph, records);
    graph
}
