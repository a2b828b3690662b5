//! Eager step sequencing for the supported algorithms.
//!
//! [`compute_step_sequence`] runs an algorithm to completion over an
//! immutable [`Snapshot`] and returns every step before any animation starts.
//! The result is a pure function of its inputs: the same snapshot, algorithm,
//! and parameters always produce the same sequence.
//!
//! Tie-breaking is fixed:
//! - BFS and DFS expand neighbours in edge insertion order.
//! - Kruskal sorts edges by weight with a stable sort, so equal weights keep
//!   insertion order.
//! - Prim scans every edge linearly each round and keeps the first minimum it
//!   meets.

mod mst;
mod traversal;
mod tree_walk;

use std::{fmt, str::FromStr};

use tracing::{info, instrument, warn};

use crate::{
    error::PreconditionError,
    graph::{Graph, NodeIndex},
    step::{StepSequence, TraversalOrder},
    tree::Tree,
};

/// Selects which algorithm to sequence.
///
/// # Examples
/// ```
/// use algoscope_core::Algorithm;
///
/// let algorithm: Algorithm = "kruskal".parse().expect("known algorithm");
/// assert!(algorithm.is_mst());
/// assert_eq!(Algorithm::Inorder.to_string(), "inorder");
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Algorithm {
    /// Breadth-first search from a start node.
    Bfs,
    /// Depth-first search from a start node.
    Dfs,
    /// Kruskal's minimum spanning tree.
    Kruskal,
    /// Prim's minimum spanning tree.
    Prim,
    /// Pre-order tree traversal.
    Preorder,
    /// In-order tree traversal.
    Inorder,
    /// Post-order tree traversal.
    Postorder,
}

/// Groups algorithms that share a default step delay.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AlgorithmFamily {
    /// BFS, DFS, and tree traversals.
    Traversal,
    /// Kruskal and Prim.
    SpanningTree,
}

impl fmt::Display for AlgorithmFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Traversal => "traversal",
            Self::SpanningTree => "spanning-tree",
        })
    }
}

impl Algorithm {
    /// Every algorithm, in configuration-surface order.
    pub const ALL: [Self; 7] = [
        Self::Bfs,
        Self::Dfs,
        Self::Kruskal,
        Self::Prim,
        Self::Preorder,
        Self::Inorder,
        Self::Postorder,
    ];

    /// Returns the lowercase selector name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
            Self::Kruskal => "kruskal",
            Self::Prim => "prim",
            Self::Preorder => "preorder",
            Self::Inorder => "inorder",
            Self::Postorder => "postorder",
        }
    }

    /// Returns the delay family of the algorithm.
    #[must_use]
    pub const fn family(self) -> AlgorithmFamily {
        if self.is_mst() {
            AlgorithmFamily::SpanningTree
        } else {
            AlgorithmFamily::Traversal
        }
    }

    /// Returns `true` for Kruskal and Prim.
    #[must_use]
    pub const fn is_mst(self) -> bool {
        matches!(self, Self::Kruskal | Self::Prim)
    }

    /// Returns `true` for algorithms that run on a [`Tree`].
    #[must_use]
    pub const fn runs_on_tree(self) -> bool {
        self.traversal_order().is_some()
    }

    /// Returns `true` for BFS and DFS, which need a start node.
    #[must_use]
    pub const fn needs_start(self) -> bool {
        matches!(self, Self::Bfs | Self::Dfs)
    }

    /// Returns the traversal order for tree algorithms.
    #[must_use]
    pub const fn traversal_order(self) -> Option<TraversalOrder> {
        match self {
            Self::Preorder => Some(TraversalOrder::Preorder),
            Self::Inorder => Some(TraversalOrder::Inorder),
            Self::Postorder => Some(TraversalOrder::Postorder),
            Self::Bfs | Self::Dfs | Self::Kruskal | Self::Prim => None,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an algorithm name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown algorithm `{0}`; expected bfs, dfs, kruskal, prim, preorder, inorder or postorder")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == wanted)
            .ok_or_else(|| UnknownAlgorithm(raw.to_owned()))
    }
}

/// Immutable copy of the model a run operates on.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Snapshot {
    /// A graph copy for BFS, DFS, Kruskal, and Prim.
    Graph(Graph),
    /// A tree copy for the traversals.
    Tree(Tree),
}

impl Snapshot {
    const fn model_name(&self) -> &'static str {
        match self {
            Self::Graph(_) => "graph",
            Self::Tree(_) => "tree",
        }
    }
}

impl From<Graph> for Snapshot {
    fn from(graph: Graph) -> Self {
        Self::Graph(graph)
    }
}

impl From<Tree> for Snapshot {
    fn from(tree: Tree) -> Self {
        Self::Tree(tree)
    }
}

/// Per-run parameters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RunParams {
    /// Start node id. Required for BFS and DFS; Prim falls back to `A`, then
    /// to the first node.
    pub start: Option<String>,
}

impl RunParams {
    /// Parameters starting from `id`.
    #[must_use]
    pub fn starting_at(id: impl Into<String>) -> Self {
        Self {
            start: Some(id.into()),
        }
    }
}

/// Node Prim starts from when no start id is given.
const PRIM_DEFAULT_START: &str = "A";

/// Computes the full step sequence of `algorithm` over `snapshot`.
///
/// # Errors
/// Returns a [`PreconditionError`] when the model is empty, the algorithm
/// needs the other model kind, a required start node is missing or unknown,
/// or an MST is requested on a directed graph. A disconnected graph is not an
/// error; see [`crate::Outcome`].
///
/// # Examples
/// ```
/// use algoscope_core::{Algorithm, Graph, RunParams, Snapshot, compute_step_sequence};
///
/// let snapshot = Snapshot::from(Graph::sample());
/// let mst = compute_step_sequence(Algorithm::Kruskal, &snapshot, &RunParams::default())?;
/// assert_eq!(mst.len(), 5);
/// assert_eq!(mst.total_cost(), Some(24));
/// # Ok::<(), algoscope_core::PreconditionError>(())
/// ```
#[instrument(
    name = "core.compute",
    err,
    skip(snapshot, params),
    fields(algorithm = %algorithm, model = snapshot.model_name(), start = ?params.start),
)]
pub fn compute_step_sequence(
    algorithm: Algorithm,
    snapshot: &Snapshot,
    params: &RunParams,
) -> Result<StepSequence, PreconditionError> {
    let sequence = match (snapshot, algorithm.traversal_order()) {
        (Snapshot::Tree(tree), Some(order)) => {
            if tree.is_empty() {
                return Err(refuse(PreconditionError::EmptyModel { model: "tree" }));
            }
            tree_walk::walk(tree, order)
        }
        (Snapshot::Graph(graph), None) => sequence_graph(algorithm, graph, params)?,
        (other, _) => {
            return Err(refuse(PreconditionError::WrongModel {
                algorithm,
                expected: if algorithm.runs_on_tree() {
                    "tree"
                } else {
                    "graph"
                },
                actual: other.model_name(),
            }));
        }
    };

    info!(
        steps = sequence.len(),
        complete = sequence.outcome().is_complete(),
        "step sequence computed"
    );
    Ok(sequence)
}

fn sequence_graph(
    algorithm: Algorithm,
    graph: &Graph,
    params: &RunParams,
) -> Result<StepSequence, PreconditionError> {
    if graph.is_empty() {
        return Err(refuse(PreconditionError::EmptyModel { model: "graph" }));
    }
    if algorithm.is_mst() && graph.kind().is_directed() {
        return Err(refuse(PreconditionError::UnsupportedGraphKind {
            algorithm,
            kind: graph.kind(),
        }));
    }

    match algorithm {
        Algorithm::Bfs => Ok(traversal::bfs(graph, required_start(graph, params)?)),
        Algorithm::Dfs => Ok(traversal::dfs(graph, required_start(graph, params)?)),
        Algorithm::Kruskal => Ok(mst::kruskal(graph)),
        Algorithm::Prim => Ok(mst::prim(graph, prim_start(graph, params)?)),
        Algorithm::Preorder | Algorithm::Inorder | Algorithm::Postorder => {
            Err(refuse(PreconditionError::WrongModel {
                algorithm,
                expected: "tree",
                actual: "graph",
            }))
        }
    }
}

fn required_start(graph: &Graph, params: &RunParams) -> Result<NodeIndex, PreconditionError> {
    let id = params
        .start
        .as_deref()
        .ok_or_else(|| refuse(PreconditionError::MissingStartNode))?;
    resolve(graph, id)
}

fn prim_start(graph: &Graph, params: &RunParams) -> Result<NodeIndex, PreconditionError> {
    if let Some(id) = params.start.as_deref() {
        return resolve(graph, id);
    }
    graph
        .node_index(PRIM_DEFAULT_START)
        .or_else(|| graph.node_indices().next())
        .ok_or_else(|| refuse(PreconditionError::EmptyModel { model: "graph" }))
}

fn resolve(graph: &Graph, id: &str) -> Result<NodeIndex, PreconditionError> {
    graph.node_index(id).ok_or_else(|| {
        refuse(PreconditionError::UnknownStartNode { id: id.to_owned() })
    })
}

fn refuse(error: PreconditionError) -> PreconditionError {
    warn!(code = %error.code(), reason = %error, "run refused");
    error
}

/// Display label of a node; empty for indices outside the snapshot.
fn label(graph: &Graph, node: NodeIndex) -> String {
    graph.node_id(node).unwrap_or_default().to_owned()
}

#[cfg(test)]
mod tests;
