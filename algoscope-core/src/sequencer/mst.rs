//! Kruskal and Prim sequencing. Edges are treated as undirected.

use tracing::{debug, instrument, warn};

use crate::{
    graph::{Edge, EdgeIndex, Graph, NodeIndex, VisitedSet},
    step::{EdgeRef, MstStep, Outcome, Step, StepSequence},
    union_find::DisjointSet,
};

use super::{Algorithm, label};

fn stored_edge(graph: &Graph, edge: &Edge) -> EdgeRef {
    EdgeRef {
        source: label(graph, edge.source()),
        target: label(graph, edge.target()),
        weight: edge.weight(),
    }
}

/// Kruskal's algorithm: scan edges by ascending weight and keep each one that
/// joins two different components.
///
/// The sort is stable, so equal weights are scanned in insertion order. Every
/// edge is scanned, even after the tree is complete.
#[instrument(
    name = "core.kruskal",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub(super) fn kruskal(graph: &Graph) -> StepSequence {
    let mut by_weight: Vec<&Edge> = graph.edges().iter().collect();
    by_weight.sort_by_key(|edge| edge.weight());

    let mut components = DisjointSet::new(graph.node_count());
    let mut total_cost = 0_u64;
    let mut rejected = Vec::new();
    let mut steps = Vec::new();

    for edge in by_weight {
        let shown = stored_edge(graph, edge);
        if !components.union(edge.source().index(), edge.target().index()) {
            debug!(edge = %shown, "edge would close a cycle");
            rejected.push(shown);
            continue;
        }

        total_cost = total_cost.saturating_add(u64::from(edge.weight()));
        debug!(edge = %shown, total_cost, "edge accepted");
        steps.push(Step::Kruskal(MstStep {
            nodes: vec![shown.source.clone(), shown.target.clone()],
            edge: shown,
            total_cost,
            rejected: std::mem::take(&mut rejected),
        }));
    }

    let outcome = match components.components() {
        0 | 1 => Outcome::Complete,
        count => {
            warn!(components = count, "graph is disconnected; built a spanning forest");
            Outcome::Forest { components: count }
        }
    };
    StepSequence::new(Algorithm::Kruskal, steps, outcome).with_trailing_rejected(rejected)
}

/// Prim's algorithm from `start`.
///
/// Each round scans all edges in insertion order for those with exactly one
/// visited endpoint and takes the first one of minimum weight.
#[instrument(
    name = "core.prim",
    skip(graph),
    fields(nodes = graph.node_count(), edges = graph.edge_count()),
)]
pub(super) fn prim(graph: &Graph, start: NodeIndex) -> StepSequence {
    let mut visited = VisitedSet::with_capacity(graph.node_count());
    visited.insert(start);
    let mut total_cost = 0_u64;
    let mut steps = Vec::new();

    while visited.len() < graph.node_count() {
        let Some((edge, reached)) = cheapest_crossing_edge(graph, &visited) else {
            warn!(
                reached = visited.len(),
                total = graph.node_count(),
                "no edge leaves the visited set; stopping early"
            );
            break;
        };
        let Some(edge) = graph.edge(edge) else {
            break;
        };

        visited.insert(reached);
        total_cost = total_cost.saturating_add(u64::from(edge.weight()));
        let shown = stored_edge(graph, edge);
        debug!(edge = %shown, total_cost, "node reached");
        steps.push(Step::Prim(MstStep {
            edge: shown,
            nodes: vec![label(graph, reached)],
            total_cost,
            rejected: Vec::new(),
        }));
    }

    let outcome = if visited.len() == graph.node_count() {
        Outcome::Complete
    } else {
        Outcome::Partial {
            reached: visited.len(),
            total: graph.node_count(),
        }
    };
    StepSequence::new(Algorithm::Prim, steps, outcome)
}

/// First minimum-weight edge with exactly one visited endpoint, together with
/// its unvisited endpoint.
fn cheapest_crossing_edge(graph: &Graph, visited: &VisitedSet) -> Option<(EdgeIndex, NodeIndex)> {
    let mut best: Option<(EdgeIndex, NodeIndex, u32)> = None;
    for (index, edge) in graph.edge_indices().zip(graph.edges()) {
        let reached = match (visited.contains(edge.source()), visited.contains(edge.target())) {
            (true, false) => edge.target(),
            (false, true) => edge.source(),
            _ => continue,
        };
        if best.is_none_or(|(_, _, weight)| edge.weight() < weight) {
            best = Some((index, reached, edge.weight()));
        }
    }
    best.map(|(edge, reached, _)| (edge, reached))
}
