//! Step records: immutable snapshots of one unit of algorithmic progress.
//!
//! Each algorithm has its own payload shape. Records carry labels (node ids
//! and tree values) rather than arena indices so a renderer can consume them
//! without holding the model.

use std::fmt;

use crate::sequencer::Algorithm;

/// An edge as shown to the renderer.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EdgeRef {
    /// Endpoint the edge is drawn from.
    pub source: String,
    /// Endpoint the edge is drawn to.
    pub target: String,
    /// Edge weight.
    pub weight: u32,
}

impl EdgeRef {
    /// Returns `true` when both refs join the same unordered pair.
    #[must_use]
    pub fn same_pair(&self, other: &Self) -> bool {
        (self.source == other.source && self.target == other.target)
            || (self.source == other.target && self.target == other.source)
    }
}

impl fmt::Display for EdgeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} ({})", self.source, self.target, self.weight)
    }
}

/// Progress of a breadth- or depth-first search after visiting one node.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VisitStep {
    /// Node visited in this step.
    pub node: String,
    /// Unvisited neighbours found from `node`, in neighbour order.
    pub discovered: Vec<String>,
    /// Edges highlighted by this step: every discovery edge for BFS, the tree
    /// edge walked into `node` for DFS (none for the start node).
    pub edges: Vec<EdgeRef>,
    /// Discovered but unvisited nodes after this step: the queue for BFS, the
    /// pending branches for DFS.
    pub frontier: Vec<String>,
    /// Visit order so far, including `node`.
    pub visited: Vec<String>,
}

/// Progress of Kruskal's or Prim's algorithm after accepting one edge.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MstStep {
    /// The accepted edge.
    pub edge: EdgeRef,
    /// Nodes newly joined by the edge: both endpoints for Kruskal, the newly
    /// reached endpoint for Prim.
    pub nodes: Vec<String>,
    /// Sum of accepted weights so far.
    pub total_cost: u64,
    /// Edges Kruskal examined and discarded as cycles since the previous
    /// accepted edge. Always empty for Prim.
    pub rejected: Vec<EdgeRef>,
}

/// Visit position of the root relative to its subtrees.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TraversalOrder {
    /// Root, left, right.
    Preorder,
    /// Left, root, right.
    Inorder,
    /// Left, right, root.
    Postorder,
}

impl TraversalOrder {
    /// Returns the lowercase order name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Preorder => "preorder",
            Self::Inorder => "inorder",
            Self::Postorder => "postorder",
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arrow between two consecutively emitted tree values.
///
/// This follows emission order, not parent/child links.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Arrow {
    /// Value emitted in the previous step.
    pub from: i64,
    /// Value emitted in this step.
    pub to: i64,
}

/// One value emitted by a tree traversal.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraversalStep {
    /// Traversal order in effect.
    pub order: TraversalOrder,
    /// Value emitted in this step.
    pub value: i64,
    /// Arrow from the previously emitted value; `None` for the first step.
    pub arrow: Option<Arrow>,
    /// Output sequence so far, including `value`.
    pub output: Vec<i64>,
}

/// Algorithm-specific payload of a [`StepRecord`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "algorithm", rename_all = "lowercase"))]
pub enum Step {
    /// Breadth-first search dequeued and visited a node.
    Bfs(VisitStep),
    /// Depth-first search visited a node.
    Dfs(VisitStep),
    /// Kruskal accepted an edge.
    Kruskal(MstStep),
    /// Prim reached a new node.
    Prim(MstStep),
    /// A tree traversal emitted a value.
    Traversal(TraversalStep),
}

/// One indexed step of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepRecord {
    index: usize,
    #[cfg_attr(feature = "serde", serde(flatten))]
    step: Step,
}

impl StepRecord {
    pub(crate) const fn new(index: usize, step: Step) -> Self {
        Self { index, step }
    }

    /// Zero-based position within the run.
    #[must_use]
    #[rustfmt::skip]
    pub const fn index(&self) -> usize { self.index }

    /// Algorithm-specific payload.
    #[must_use]
    #[rustfmt::skip]
    pub const fn step(&self) -> &Step { &self.step }
}

impl fmt::Display for StepRecord {
    /// Renders the prose explanation shown next to the animation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.step {
            Step::Bfs(visit) => {
                write!(f, "Dequeue {} and mark it visited; ", visit.node)?;
                if visit.discovered.is_empty() {
                    f.write_str("no unvisited neighbours to enqueue")
                } else {
                    write!(f, "enqueue {}", visit.discovered.join(", "))
                }
            }
            Step::Dfs(visit) => {
                write!(f, "Visit {}", visit.node)?;
                if let Some(edge) = visit.edges.first() {
                    write!(f, " along {}-{}", edge.source, edge.target)?;
                }
                match visit.discovered.first() {
                    Some(next) => write!(f, "; go deeper to {next}"),
                    None => f.write_str("; no unvisited neighbours, backtrack"),
                }
            }
            Step::Kruskal(mst) => {
                for rejected in &mst.rejected {
                    write!(f, "Skip {rejected}: it would close a cycle. ")?;
                }
                write!(
                    f,
                    "Add edge {} joining {}; total cost {}",
                    mst.edge,
                    mst.nodes.join(" and "),
                    mst.total_cost
                )
            }
            Step::Prim(mst) => write!(
                f,
                "Reach {} through cheapest crossing edge {}; total cost {}",
                mst.nodes.join(", "),
                mst.edge,
                mst.total_cost
            ),
            Step::Traversal(walk) => {
                write!(f, "{} visits {}", walk.order, walk.value)?;
                if let Some(arrow) = walk.arrow {
                    write!(f, " after {}", arrow.from)?;
                }
                Ok(())
            }
        }
    }
}

/// How a run ended. None of these is an error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "lowercase"))]
pub enum Outcome {
    /// Every node (or value) was reached.
    Complete,
    /// A traversal or Prim's algorithm stopped at a disconnected remainder.
    Partial {
        /// Nodes reached.
        reached: usize,
        /// Nodes in the snapshot.
        total: usize,
    },
    /// Kruskal produced a spanning forest of a disconnected graph.
    Forest {
        /// Number of trees in the forest.
        components: usize,
    },
}

impl Outcome {
    /// Returns `true` for [`Outcome::Complete`].
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// The complete, ordered output of one algorithm invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StepSequence {
    algorithm: Algorithm,
    steps: Vec<StepRecord>,
    outcome: Outcome,
    trailing_rejected: Vec<EdgeRef>,
}

impl StepSequence {
    pub(crate) fn new(algorithm: Algorithm, steps: Vec<Step>, outcome: Outcome) -> Self {
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| StepRecord::new(index, step))
            .collect();
        Self {
            algorithm,
            steps,
            outcome,
            trailing_rejected: Vec::new(),
        }
    }

    /// Attaches edges rejected after the final accepted edge.
    pub(crate) fn with_trailing_rejected(mut self, rejected: Vec<EdgeRef>) -> Self {
        self.trailing_rejected = rejected;
        self
    }

    /// Algorithm that produced the sequence.
    #[must_use]
    #[rustfmt::skip]
    pub const fn algorithm(&self) -> Algorithm { self.algorithm }

    /// Steps in emission order.
    #[must_use]
    #[rustfmt::skip]
    pub fn steps(&self) -> &[StepRecord] { &self.steps }

    /// Number of steps.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.steps.len() }

    /// Returns `true` when the run produced no steps.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    /// How the run ended.
    #[must_use]
    #[rustfmt::skip]
    pub const fn outcome(&self) -> Outcome { self.outcome }

    /// Edges Kruskal scanned and rejected after its last accepted edge.
    /// Empty for every other algorithm.
    #[must_use]
    #[rustfmt::skip]
    pub fn trailing_rejected(&self) -> &[EdgeRef] { &self.trailing_rejected }

    /// Returns the step at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&StepRecord> {
        self.steps.get(index)
    }

    /// Final MST cost, when the sequence comes from Kruskal or Prim.
    #[must_use]
    pub fn total_cost(&self) -> Option<u64> {
        if !self.algorithm.is_mst() {
            return None;
        }
        Some(
            self.steps
                .last()
                .and_then(|record| match &record.step {
                    Step::Kruskal(mst) | Step::Prim(mst) => Some(mst.total_cost),
                    _ => None,
                })
                .unwrap_or(0),
        )
    }
}
