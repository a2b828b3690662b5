//! Breadth- and depth-first search sequencing.

use std::collections::VecDeque;

use tracing::{debug, instrument, trace};

use crate::{
    graph::{EdgeIndex, Graph, Neighbor, NodeIndex, VisitedSet},
    step::{EdgeRef, Outcome, Step, StepSequence, VisitStep},
};

use super::{Algorithm, label};

/// Edge as walked from `from` to `to`, regardless of stored orientation.
fn walked_edge(graph: &Graph, from: NodeIndex, to: NodeIndex, edge: EdgeIndex) -> EdgeRef {
    EdgeRef {
        source: label(graph, from),
        target: label(graph, to),
        weight: graph.edge(edge).map_or(1, |edge| edge.weight()),
    }
}

fn outcome(graph: &Graph, visited: &VisitedSet) -> Outcome {
    if visited.len() == graph.node_count() {
        Outcome::Complete
    } else {
        Outcome::Partial {
            reached: visited.len(),
            total: graph.node_count(),
        }
    }
}

/// Breadth-first search. Visitation is checked when a node is dequeued, so a
/// node enqueued twice is visited once and its second dequeue emits nothing.
#[instrument(
    name = "core.bfs",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub(super) fn bfs(graph: &Graph, start: NodeIndex) -> StepSequence {
    let mut visited = VisitedSet::with_capacity(graph.node_count());
    let mut queue = VecDeque::from([start]);
    let mut order = Vec::new();
    let mut steps = Vec::new();

    while let Some(node) = queue.pop_front() {
        if !visited.insert(node) {
            trace!(node = %label(graph, node), "already visited, skipping");
            continue;
        }
        order.push(label(graph, node));

        let hops = graph.neighbors(node, &visited);
        queue.extend(hops.iter().map(|hop| hop.node));

        let step = VisitStep {
            node: label(graph, node),
            discovered: hops.iter().map(|hop| label(graph, hop.node)).collect(),
            edges: hops
                .iter()
                .map(|hop| walked_edge(graph, node, hop.node, hop.edge))
                .collect(),
            frontier: pending(graph, &queue, &visited),
            visited: order.clone(),
        };
        debug!(node = %step.node, discovered = step.discovered.len(), "bfs step");
        steps.push(Step::Bfs(step));
    }

    StepSequence::new(Algorithm::Bfs, steps, outcome(graph, &visited))
}

/// Unvisited queue entries, first occurrence only.
fn pending(graph: &Graph, queue: &VecDeque<NodeIndex>, visited: &VisitedSet) -> Vec<String> {
    let mut seen = VisitedSet::with_capacity(graph.node_count());
    queue
        .iter()
        .filter(|queued| !visited.contains(**queued) && seen.insert(**queued))
        .map(|queued| label(graph, *queued))
        .collect()
}

/// Neighbours of one node still waiting to be explored.
struct Frame {
    node: NodeIndex,
    hops: Vec<Neighbor>,
    cursor: usize,
}

impl Frame {
    fn next_unvisited(&mut self, visited: &VisitedSet) -> Option<Neighbor> {
        while let Some(hop) = self.hops.get(self.cursor).copied() {
            self.cursor = self.cursor.saturating_add(1);
            if !visited.contains(hop.node) {
                return Some(hop);
            }
        }
        None
    }

    fn pending<'a>(&'a self, visited: &'a VisitedSet) -> impl Iterator<Item = NodeIndex> + 'a {
        self.hops
            .iter()
            .skip(self.cursor)
            .map(|hop| hop.node)
            .filter(|node| !visited.contains(*node))
    }
}

/// Depth-first pre-order search.
///
/// Runs on an explicit frame stack that mirrors the recursive formulation:
/// a node is checked for visitation before descending, so the depth never
/// exceeds the node count.
#[instrument(
    name = "core.dfs",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub(super) fn dfs(graph: &Graph, start: NodeIndex) -> StepSequence {
    let mut visited = VisitedSet::with_capacity(graph.node_count());
    let mut order = Vec::new();
    let mut steps = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    visited.insert(start);
    order.push(label(graph, start));
    stack.push(Frame {
        node: start,
        hops: graph.neighbors(start, &visited),
        cursor: 0,
    });
    steps.push(dfs_step(graph, &stack, &visited, &order, None));

    while let Some(top) = stack.last_mut() {
        let parent = top.node;
        let Some(hop) = top.next_unvisited(&visited) else {
            trace!(node = %label(graph, parent), "backtracking");
            stack.pop();
            continue;
        };

        visited.insert(hop.node);
        order.push(label(graph, hop.node));
        let arrival = walked_edge(graph, parent, hop.node, hop.edge);
        stack.push(Frame {
            node: hop.node,
            hops: graph.neighbors(hop.node, &visited),
            cursor: 0,
        });
        steps.push(dfs_step(graph, &stack, &visited, &order, Some(arrival)));
    }

    StepSequence::new(Algorithm::Dfs, steps, outcome(graph, &visited))
}

/// Builds the step for the node on top of `stack`, which was just visited
/// along `arrival` (absent for the start node).
fn dfs_step(
    graph: &Graph,
    stack: &[Frame],
    visited: &VisitedSet,
    order: &[String],
    arrival: Option<EdgeRef>,
) -> Step {
    let Some(top) = stack.last() else {
        return Step::Dfs(VisitStep {
            node: String::new(),
            discovered: Vec::new(),
            edges: Vec::new(),
            frontier: Vec::new(),
            visited: order.to_vec(),
        });
    };

    let mut seen = VisitedSet::with_capacity(graph.node_count());
    let frontier = stack
        .iter()
        .rev()
        .flat_map(|frame| frame.pending(visited))
        .filter(|node| seen.insert(*node))
        .map(|node| label(graph, node))
        .collect();

    let step = VisitStep {
        node: label(graph, top.node),
        discovered: top.hops.iter().map(|hop| label(graph, hop.node)).collect(),
        edges: arrival.into_iter().collect(),
        frontier,
        visited: order.to_vec(),
    };
    debug!(node = %step.node, discovered = step.discovered.len(), "dfs step");
    Step::Dfs(step)
}
