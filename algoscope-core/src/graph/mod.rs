//! Mutable graph model edited between runs.
//!
//! Nodes live in an arena addressed by [`NodeIndex`]; string ids are resolved
//! once at the edge of the API. Edges keep their insertion order because that
//! order decides neighbour order and therefore traversal tie-breaking.

use std::{collections::HashMap, fmt, str::FromStr};

use crate::error::{InvalidEdgeReason, ValidationError};

/// Topology and weighting policy of a [`Graph`].
///
/// # Examples
/// ```
/// use algoscope_core::GraphKind;
///
/// let kind: GraphKind = "weighted".parse().expect("known kind");
/// assert!(kind.is_weighted());
/// assert!(!kind.is_directed());
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GraphKind {
    /// Edges are followed in both directions and weigh 1 unless given.
    #[default]
    Undirected,
    /// Edges are only followed from source to target.
    Directed,
    /// Undirected topology with a mandatory weight of at least 1 per edge.
    Weighted,
}

impl GraphKind {
    /// Returns `true` when edges are one-way.
    #[must_use]
    pub const fn is_directed(self) -> bool {
        matches!(self, Self::Directed)
    }

    /// Returns `true` when every edge must carry an explicit weight.
    #[must_use]
    pub const fn is_weighted(self) -> bool {
        matches!(self, Self::Weighted)
    }

    /// Returns the lowercase name used on the configuration surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Undirected => "undirected",
            Self::Directed => "directed",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a graph kind name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown graph kind `{0}`; expected undirected, directed or weighted")]
pub struct UnknownGraphKind(pub String);

impl FromStr for GraphKind {
    type Err = UnknownGraphKind;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "undirected" => Ok(Self::Undirected),
            "directed" => Ok(Self::Directed),
            "weighted" => Ok(Self::Weighted),
            _ => Err(UnknownGraphKind(raw.to_owned())),
        }
    }
}

/// Position of a node in the graph arena.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Returns the raw arena position.
    #[must_use]
    #[rustfmt::skip]
    pub const fn index(self) -> usize { self.0 }
}

/// Position of an edge in insertion order.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    /// Returns the raw insertion position.
    #[must_use]
    #[rustfmt::skip]
    pub const fn index(self) -> usize { self.0 }
}

/// A stored edge. Undirected edges keep the orientation they were added with.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Edge {
    source: NodeIndex,
    target: NodeIndex,
    weight: u32,
}

impl Edge {
    /// Returns the endpoint the edge was added from.
    #[must_use]
    #[rustfmt::skip]
    pub const fn source(&self) -> NodeIndex { self.source }

    /// Returns the endpoint the edge was added to.
    #[must_use]
    #[rustfmt::skip]
    pub const fn target(&self) -> NodeIndex { self.target }

    /// Returns the edge weight (1 for unweighted graphs unless given).
    #[must_use]
    #[rustfmt::skip]
    pub const fn weight(&self) -> u32 { self.weight }

    /// Returns the opposite endpoint when `node` touches this edge.
    #[must_use]
    pub fn other(&self, node: NodeIndex) -> Option<NodeIndex> {
        if self.source == node {
            Some(self.target)
        } else if self.target == node {
            Some(self.source)
        } else {
            None
        }
    }

    fn connects(&self, left: NodeIndex, right: NodeIndex, directed: bool) -> bool {
        (self.source == left && self.target == right)
            || (!directed && self.source == right && self.target == left)
    }
}

/// One hop reachable from a node, together with the edge that reaches it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Neighbor {
    /// The reachable node.
    pub node: NodeIndex,
    /// The edge used to reach it.
    pub edge: EdgeIndex,
}

/// Dense membership set over the nodes of one graph.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VisitedSet {
    flags: Vec<bool>,
    len: usize,
}

impl VisitedSet {
    /// Creates an empty set sized for `node_count` nodes.
    #[must_use]
    pub fn with_capacity(node_count: usize) -> Self {
        Self {
            flags: vec![false; node_count],
            len: 0,
        }
    }

    /// Marks `node` as visited. Returns `false` when it already was.
    pub fn insert(&mut self, node: NodeIndex) -> bool {
        match self.flags.get_mut(node.0) {
            Some(flag) if !*flag => {
                *flag = true;
                self.len = self.len.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// Returns `true` when `node` has been visited.
    #[must_use]
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.flags.get(node.0).copied().unwrap_or(false)
    }

    /// Number of visited nodes.
    #[must_use]
    #[rustfmt::skip]
    pub const fn len(&self) -> usize { self.len }

    /// Returns `true` when nothing has been visited yet.
    #[must_use]
    #[rustfmt::skip]
    pub const fn is_empty(&self) -> bool { self.len == 0 }
}

/// Nodes and edges of a graph of one [`GraphKind`].
///
/// # Examples
/// ```
/// use algoscope_core::{Graph, GraphKind, VisitedSet};
///
/// let mut graph = Graph::new(GraphKind::Directed);
/// let a = graph.add_node("A")?;
/// graph.add_node("B")?;
/// graph.add_edge("A", "B", None)?;
/// graph.add_edge("B", "A", None)?;
///
/// let hops = graph.neighbors(a, &VisitedSet::with_capacity(graph.node_count()));
/// assert_eq!(hops.len(), 1);
/// # Ok::<(), algoscope_core::ValidationError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Graph {
    kind: GraphKind,
    ids: Vec<String>,
    lookup: HashMap<String, NodeIndex>,
    edges: Vec<Edge>,
}

/// Edges of the six-node sample used in demos and tests.
const SAMPLE_EDGES: [(&str, &str, u32); 9] = [
    ("A", "B", 4),
    ("B", "C", 8),
    ("C", "D", 7),
    ("D", "E", 9),
    ("E", "F", 10),
    ("F", "A", 2),
    ("B", "D", 3),
    ("C", "F", 6),
    ("A", "D", 5),
];

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// The weighted six-node graph A..F whose minimum spanning tree costs 24.
    #[must_use]
    pub fn sample() -> Self {
        let mut graph = Self::new(GraphKind::Weighted);
        for id in ["A", "B", "C", "D", "E", "F"] {
            graph.push_node(id.to_owned());
        }
        for (source, target, weight) in SAMPLE_EDGES {
            if let (Some(source), Some(target)) =
                (graph.node_index(source), graph.node_index(target))
            {
                graph.edges.push(Edge {
                    source,
                    target,
                    weight,
                });
            }
        }
        graph
    }

    /// Returns the graph kind.
    #[must_use]
    #[rustfmt::skip]
    pub const fn kind(&self) -> GraphKind { self.kind }

    /// Number of nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.ids.len() }

    /// Number of edges.
    #[must_use]
    #[rustfmt::skip]
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Returns `true` when the graph has no nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Edges in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn edges(&self) -> &[Edge] { &self.edges }

    /// Returns the edge at `index`.
    #[must_use]
    pub fn edge(&self, index: EdgeIndex) -> Option<&Edge> {
        self.edges.get(index.0)
    }

    /// Node ids in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Edge indices in insertion order.
    pub fn edge_indices(&self) -> impl Iterator<Item = EdgeIndex> {
        (0..self.edges.len()).map(EdgeIndex)
    }

    /// Node indices in insertion order.
    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> {
        (0..self.ids.len()).map(NodeIndex)
    }

    /// Resolves an id to its arena index.
    #[must_use]
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.lookup.get(id).copied()
    }

    /// Resolves an arena index to its id.
    #[must_use]
    pub fn node_id(&self, node: NodeIndex) -> Option<&str> {
        self.ids.get(node.0).map(String::as_str)
    }

    /// Adds a node. Surrounding whitespace is trimmed from `id`.
    ///
    /// # Errors
    /// Returns [`ValidationError::EmptyNodeId`] for blank ids and
    /// [`ValidationError::DuplicateNode`] when the id is taken.
    pub fn add_node(&mut self, id: impl AsRef<str>) -> Result<NodeIndex, ValidationError> {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(ValidationError::EmptyNodeId);
        }
        if self.lookup.contains_key(id) {
            return Err(ValidationError::DuplicateNode { id: id.to_owned() });
        }
        Ok(self.push_node(id.to_owned()))
    }

    fn push_node(&mut self, id: String) -> NodeIndex {
        let index = NodeIndex(self.ids.len());
        self.lookup.insert(id.clone(), index);
        self.ids.push(id);
        index
    }

    /// Adds an edge between two existing nodes. Endpoint ids are trimmed the
    /// same way [`Graph::add_node`] trims them.
    ///
    /// Undirected and weighted graphs treat `(a, b)` and `(b, a)` as the same
    /// edge; directed graphs do not. Unweighted edges default to weight 1.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidEdge`] for self-loops, unknown
    /// endpoints, duplicates, a missing weight on a weighted graph, or a zero
    /// weight. The graph is unchanged on error.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: Option<u32>,
    ) -> Result<EdgeIndex, ValidationError> {
        let (source, target) = (source.trim(), target.trim());
        let reject = |reason| ValidationError::InvalidEdge {
            from: source.to_owned(),
            to: target.to_owned(),
            reason,
        };

        if source == target {
            return Err(reject(InvalidEdgeReason::SelfLoop));
        }
        let from = self.node_index(source).ok_or_else(|| {
            reject(InvalidEdgeReason::UnknownEndpoint {
                id: source.to_owned(),
            })
        })?;
        let to = self.node_index(target).ok_or_else(|| {
            reject(InvalidEdgeReason::UnknownEndpoint {
                id: target.to_owned(),
            })
        })?;
        let weight = match (weight, self.kind.is_weighted()) {
            (Some(0), _) => return Err(reject(InvalidEdgeReason::ZeroWeight)),
            (None, true) => return Err(reject(InvalidEdgeReason::MissingWeight)),
            (Some(weight), _) => weight,
            (None, false) => 1,
        };
        if self.has_edge(from, to) {
            return Err(reject(InvalidEdgeReason::Duplicate));
        }

        let index = EdgeIndex(self.edges.len());
        self.edges.push(Edge {
            source: from,
            target: to,
            weight,
        });
        Ok(index)
    }

    /// Returns `true` when an edge joins `source` to `target` under this
    /// graph's duplicate policy.
    #[must_use]
    pub fn has_edge(&self, source: NodeIndex, target: NodeIndex) -> bool {
        let directed = self.kind.is_directed();
        self.edges
            .iter()
            .any(|edge| edge.connects(source, target, directed))
    }

    /// Nodes one hop from `node`, skipping those in `visited`, in edge
    /// insertion order.
    ///
    /// Directed graphs only follow edges from source to target.
    #[must_use]
    pub fn neighbors(&self, node: NodeIndex, visited: &VisitedSet) -> Vec<Neighbor> {
        let directed = self.kind.is_directed();
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(position, edge)| {
                let next = if edge.source == node {
                    edge.target
                } else if !directed && edge.target == node {
                    edge.source
                } else {
                    return None;
                };
                (!visited.contains(next)).then_some(Neighbor {
                    node: next,
                    edge: EdgeIndex(position),
                })
            })
            .collect()
    }

    /// Discards every node and edge, keeping the kind.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.lookup.clear();
        self.edges.clear();
    }
}
