//! Unit and property tests for step sequencing.

use proptest::{prelude::*, sample::Index};
use rstest::{fixture, rstest};

use crate::{
    error::PreconditionError,
    graph::{Graph, GraphKind},
    step::{Arrow, EdgeRef, MstStep, Outcome, Step, StepSequence, VisitStep},
    test_utils::{ascending_chain, on_shallow_stack, suite_proptest_config},
    tree::Tree,
};

use super::{Algorithm, RunParams, Snapshot, compute_step_sequence};

#[fixture]
fn sample() -> Snapshot {
    Snapshot::from(Graph::sample())
}

fn run(algorithm: Algorithm, snapshot: &Snapshot, start: Option<&str>) -> StepSequence {
    let params = RunParams {
        start: start.map(str::to_owned),
    };
    compute_step_sequence(algorithm, snapshot, &params).expect("run accepted")
}

fn visits(sequence: &StepSequence) -> Vec<&VisitStep> {
    sequence
        .steps()
        .iter()
        .filter_map(|record| match record.step() {
            Step::Bfs(visit) | Step::Dfs(visit) => Some(visit),
            _ => None,
        })
        .collect()
}

fn mst_steps(sequence: &StepSequence) -> Vec<&MstStep> {
    sequence
        .steps()
        .iter()
        .filter_map(|record| match record.step() {
            Step::Kruskal(mst) | Step::Prim(mst) => Some(mst),
            _ => None,
        })
        .collect()
}

fn edge(source: &str, target: &str, weight: u32) -> EdgeRef {
    EdgeRef {
        source: source.to_owned(),
        target: target.to_owned(),
        weight,
    }
}

fn graph_of(kind: GraphKind, nodes: &[&str], edges: &[(&str, &str, Option<u32>)]) -> Graph {
    let mut graph = Graph::new(kind);
    for id in nodes {
        graph.add_node(*id).expect("fresh id");
    }
    for (source, target, weight) in edges {
        graph.add_edge(source, target, *weight).expect("valid edge");
    }
    graph
}

fn bst(values: &[i64]) -> Tree {
    let mut tree = Tree::new();
    for value in values {
        tree.insert_bst(*value).expect("distinct value");
    }
    tree
}

#[rstest]
fn bfs_visits_first_level_in_edge_order(sample: Snapshot) {
    let sequence = run(Algorithm::Bfs, &sample, Some("A"));
    let steps = visits(&sequence);

    let first = steps.first().expect("at least one step");
    assert_eq!(first.node, "A");
    assert_eq!(first.discovered, ["B", "F", "D"]);
    assert_eq!(
        first.edges,
        [edge("A", "B", 4), edge("A", "F", 2), edge("A", "D", 5)]
    );

    let order: Vec<&str> = steps.iter().map(|step| step.node.as_str()).collect();
    assert_eq!(order, ["A", "B", "F", "D", "C", "E"]);
    assert_eq!(sequence.outcome(), Outcome::Complete);
}

#[rstest]
fn bfs_skips_nodes_enqueued_twice(sample: Snapshot) {
    let sequence = run(Algorithm::Bfs, &sample, Some("A"));
    // D is discovered from both A and B but visited once.
    assert_eq!(sequence.len(), 6);
    let last = visits(&sequence).last().copied().expect("steps");
    assert_eq!(last.visited, ["A", "B", "F", "D", "C", "E"]);
}

#[rstest]
fn dfs_goes_deep_before_wide(sample: Snapshot) {
    let sequence = run(Algorithm::Dfs, &sample, Some("A"));
    let steps = visits(&sequence);
    let order: Vec<&str> = steps.iter().map(|step| step.node.as_str()).collect();
    assert_eq!(order, ["A", "B", "C", "D", "E", "F"]);

    let first = steps.first().expect("steps");
    assert!(first.edges.is_empty());
    assert_eq!(first.frontier, ["B", "F", "D"]);

    let last = steps.last().expect("steps");
    assert_eq!(last.edges, [edge("E", "F", 10)]);
    assert!(last.frontier.is_empty());
}

#[test]
fn dfs_highlights_tree_edges_reached_after_backtracking() {
    let graph = graph_of(
        GraphKind::Undirected,
        &["A", "B", "C"],
        &[("A", "B", None), ("A", "C", None)],
    );
    let sequence = run(Algorithm::Dfs, &Snapshot::from(graph), Some("A"));
    let edges: Vec<&EdgeRef> = visits(&sequence)
        .iter()
        .flat_map(|step| &step.edges)
        .collect();
    assert_eq!(edges, [&edge("A", "B", 1), &edge("A", "C", 1)]);
    assert_eq!(
        sequence.get(2).expect("third step").to_string(),
        "Visit C along A-C; no unvisited neighbours, backtrack"
    );
}

#[rstest]
fn kruskal_builds_the_sample_spanning_tree(sample: Snapshot) {
    let sequence = run(Algorithm::Kruskal, &sample, None);
    let accepted: Vec<&EdgeRef> = mst_steps(&sequence).iter().map(|mst| &mst.edge).collect();
    assert_eq!(
        accepted,
        [
            &edge("F", "A", 2),
            &edge("B", "D", 3),
            &edge("A", "B", 4),
            &edge("C", "F", 6),
            &edge("D", "E", 9),
        ]
    );
    let costs: Vec<u64> = mst_steps(&sequence).iter().map(|mst| mst.total_cost).collect();
    assert_eq!(costs, [2, 5, 9, 15, 24]);
    assert_eq!(sequence.total_cost(), Some(24));
    assert_eq!(sequence.outcome(), Outcome::Complete);
}

#[rstest]
fn kruskal_reports_cycle_edges_with_the_next_acceptance(sample: Snapshot) {
    let sequence = run(Algorithm::Kruskal, &sample, None);
    let steps = mst_steps(&sequence);
    assert!(steps.iter().take(3).all(|mst| mst.rejected.is_empty()));
    assert_eq!(steps[3].rejected, [edge("A", "D", 5)]);
    assert_eq!(steps[4].rejected, [edge("C", "D", 7), edge("B", "C", 8)]);
    assert_eq!(sequence.trailing_rejected(), [edge("E", "F", 10)]);
}

#[rstest]
#[case::bfs(Algorithm::Bfs)]
#[case::prim(Algorithm::Prim)]
fn only_kruskal_rejects_after_the_last_step(sample: Snapshot, #[case] algorithm: Algorithm) {
    assert!(run(algorithm, &sample, Some("A")).trailing_rejected().is_empty());
}

#[test]
fn kruskal_keeps_trailing_cycles_of_a_triangle() {
    let graph = graph_of(
        GraphKind::Weighted,
        &["A", "B", "C"],
        &[("A", "B", Some(1)), ("B", "C", Some(2)), ("C", "A", Some(3))],
    );
    let sequence = run(Algorithm::Kruskal, &Snapshot::from(graph), None);
    assert_eq!(sequence.len(), 2);
    assert!(mst_steps(&sequence).iter().all(|mst| mst.rejected.is_empty()));
    assert_eq!(sequence.trailing_rejected(), [edge("C", "A", 3)]);
}

#[rstest]
fn prim_agrees_with_kruskal_on_the_sample(sample: Snapshot) {
    let prim = run(Algorithm::Prim, &sample, None);
    let kruskal = run(Algorithm::Kruskal, &sample, None);
    assert_eq!(prim.total_cost(), kruskal.total_cost());
    assert_eq!(prim.len(), kruskal.len());

    let reached: Vec<&str> = mst_steps(&prim)
        .iter()
        .flat_map(|mst| mst.nodes.iter().map(String::as_str))
        .collect();
    assert_eq!(reached, ["F", "B", "D", "C", "E"]);

    for mst in mst_steps(&prim) {
        assert!(
            mst_steps(&kruskal)
                .iter()
                .any(|other| other.edge.same_pair(&mst.edge)),
            "{} is not in Kruskal's tree",
            mst.edge
        );
    }
}

#[test]
fn prim_takes_the_first_minimum_in_edge_order() {
    let graph = graph_of(
        GraphKind::Weighted,
        &["A", "B", "C"],
        &[("A", "C", Some(3)), ("A", "B", Some(3)), ("B", "C", Some(1))],
    );
    let sequence = run(Algorithm::Prim, &Snapshot::from(graph), Some("A"));
    let edges: Vec<&EdgeRef> = mst_steps(&sequence).iter().map(|mst| &mst.edge).collect();
    assert_eq!(edges, [&edge("A", "C", 3), &edge("B", "C", 1)]);
}

#[test]
fn prim_defaults_to_the_first_node_without_an_a() {
    let graph = graph_of(
        GraphKind::Undirected,
        &["X", "Y"],
        &[("X", "Y", None)],
    );
    let sequence = run(Algorithm::Prim, &Snapshot::from(graph), None);
    let first = mst_steps(&sequence).first().copied().expect("one step");
    assert_eq!(first.nodes, ["Y"]);
    assert_eq!(first.edge.weight, 1);
}

#[rstest]
#[case::bfs(Algorithm::Bfs, Outcome::Partial { reached: 2, total: 4 }, 2)]
#[case::dfs(Algorithm::Dfs, Outcome::Partial { reached: 2, total: 4 }, 2)]
#[case::prim(Algorithm::Prim, Outcome::Partial { reached: 2, total: 4 }, 1)]
#[case::kruskal(Algorithm::Kruskal, Outcome::Forest { components: 2 }, 2)]
fn disconnected_graphs_finish_without_error(
    #[case] algorithm: Algorithm,
    #[case] outcome: Outcome,
    #[case] steps: usize,
) {
    let graph = graph_of(
        GraphKind::Undirected,
        &["A", "B", "C", "D"],
        &[("A", "B", None), ("C", "D", None)],
    );
    let sequence = run(algorithm, &Snapshot::from(graph), Some("A"));
    assert_eq!(sequence.outcome(), outcome);
    assert_eq!(sequence.len(), steps);
}

#[test]
fn bfs_follows_edge_direction() {
    let graph = graph_of(
        GraphKind::Directed,
        &["A", "B", "C"],
        &[("A", "B", None), ("C", "A", None)],
    );
    let sequence = run(Algorithm::Bfs, &Snapshot::from(graph), Some("A"));
    let order: Vec<&str> = visits(&sequence).iter().map(|step| step.node.as_str()).collect();
    assert_eq!(order, ["A", "B"]);
}

#[rstest]
#[case::bfs_without_start(Algorithm::Bfs, None, PreconditionError::MissingStartNode)]
#[case::dfs_without_start(Algorithm::Dfs, None, PreconditionError::MissingStartNode)]
#[case::unknown_start(
    Algorithm::Bfs,
    Some("Q"),
    PreconditionError::UnknownStartNode { id: "Q".to_owned() }
)]
#[case::prim_unknown_start(
    Algorithm::Prim,
    Some("Q"),
    PreconditionError::UnknownStartNode { id: "Q".to_owned() }
)]
#[case::traversal_on_graph(
    Algorithm::Inorder,
    None,
    PreconditionError::WrongModel { algorithm: Algorithm::Inorder, expected: "tree", actual: "graph" }
)]
fn graph_runs_are_refused_on_bad_parameters(
    sample: Snapshot,
    #[case] algorithm: Algorithm,
    #[case] start: Option<&str>,
    #[case] expected: PreconditionError,
) {
    let params = RunParams {
        start: start.map(str::to_owned),
    };
    assert_eq!(
        compute_step_sequence(algorithm, &sample, &params),
        Err(expected)
    );
}

#[rstest]
#[case::empty_graph(Snapshot::from(Graph::new(GraphKind::Undirected)), Algorithm::Kruskal, "graph")]
#[case::empty_tree(Snapshot::from(Tree::new()), Algorithm::Preorder, "tree")]
fn empty_models_are_refused(
    #[case] snapshot: Snapshot,
    #[case] algorithm: Algorithm,
    #[case] model: &'static str,
) {
    assert_eq!(
        compute_step_sequence(algorithm, &snapshot, &RunParams::starting_at("A")),
        Err(PreconditionError::EmptyModel { model })
    );
}

#[test]
fn graph_algorithms_are_refused_on_trees() {
    let snapshot = Snapshot::from(bst(&[1]));
    assert_eq!(
        compute_step_sequence(Algorithm::Bfs, &snapshot, &RunParams::starting_at("1")),
        Err(PreconditionError::WrongModel {
            algorithm: Algorithm::Bfs,
            expected: "graph",
            actual: "tree",
        })
    );
}

#[rstest]
#[case::kruskal(Algorithm::Kruskal)]
#[case::prim(Algorithm::Prim)]
fn spanning_trees_are_refused_on_directed_graphs(#[case] algorithm: Algorithm) {
    let graph = graph_of(GraphKind::Directed, &["A", "B"], &[("A", "B", None)]);
    assert_eq!(
        compute_step_sequence(algorithm, &Snapshot::from(graph), &RunParams::default()),
        Err(PreconditionError::UnsupportedGraphKind {
            algorithm,
            kind: GraphKind::Directed,
        })
    );
}

#[rstest]
#[case::preorder(Algorithm::Preorder, &[50, 30, 20, 40, 70, 60, 80])]
#[case::inorder(Algorithm::Inorder, &[20, 30, 40, 50, 60, 70, 80])]
#[case::postorder(Algorithm::Postorder, &[20, 40, 30, 60, 80, 70, 50])]
fn tree_walks_emit_values_in_order(#[case] algorithm: Algorithm, #[case] expected: &[i64]) {
    let snapshot = Snapshot::from(bst(&[50, 30, 70, 20, 40, 60, 80]));
    let sequence = run(algorithm, &snapshot, None);
    assert_eq!(sequence.algorithm(), algorithm);

    let mut previous = None;
    for (record, value) in sequence.steps().iter().zip(expected) {
        let Step::Traversal(walk) = record.step() else {
            panic!("unexpected step {record:?}");
        };
        assert_eq!(walk.value, *value);
        assert_eq!(walk.arrow, previous.map(|from| Arrow { from, to: *value }));
        previous = Some(*value);
    }
    let Some(Step::Traversal(last)) = sequence.steps().last().map(|record| record.step()) else {
        panic!("empty traversal");
    };
    assert_eq!(last.output, expected);
}

#[rstest]
fn explanations_describe_each_step(sample: Snapshot) {
    let bfs = run(Algorithm::Bfs, &sample, Some("A"));
    assert_eq!(
        bfs.get(0).expect("first step").to_string(),
        "Dequeue A and mark it visited; enqueue B, F, D"
    );

    let dfs = run(Algorithm::Dfs, &sample, Some("A"));
    assert_eq!(
        dfs.get(0).expect("first step").to_string(),
        "Visit A; go deeper to B"
    );
    assert_eq!(
        dfs.get(1).expect("second step").to_string(),
        "Visit B along A-B; go deeper to C"
    );

    let kruskal = run(Algorithm::Kruskal, &sample, None);
    assert_eq!(
        kruskal.get(0).expect("first step").to_string(),
        "Add edge F-A (2) joining F and A; total cost 2"
    );
    assert_eq!(
        kruskal.get(3).expect("fourth step").to_string(),
        "Skip A-D (5): it would close a cycle. Add edge C-F (6) joining C and F; total cost 15"
    );

    let tree = Snapshot::from(bst(&[50, 30]));
    let preorder = run(Algorithm::Preorder, &tree, None);
    assert_eq!(
        preorder.get(1).expect("second step").to_string(),
        "preorder visits 30 after 50"
    );
}

#[rstest]
#[case::preorder(Algorithm::Preorder)]
#[case::inorder(Algorithm::Inorder)]
#[case::postorder(Algorithm::Postorder)]
fn tree_walks_handle_degenerate_trees_on_a_small_stack(#[case] algorithm: Algorithm) {
    let snapshot = Snapshot::from(ascending_chain(2_000));
    let sequence = on_shallow_stack(move || run(algorithm, &snapshot, None));
    assert_eq!(sequence.len(), 2_000);
    let first = sequence.steps().first().map(ToString::to_string);
    let expected_first = match algorithm {
        Algorithm::Postorder => "postorder visits 1999",
        Algorithm::Inorder => "inorder visits 0",
        _ => "preorder visits 0",
    };
    assert_eq!(first.as_deref(), Some(expected_first));
}

#[rstest]
fn step_indices_are_dense(sample: Snapshot) {
    for algorithm in [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Kruskal, Algorithm::Prim] {
        let sequence = run(algorithm, &sample, Some("C"));
        for (position, record) in sequence.steps().iter().enumerate() {
            assert_eq!(record.index(), position);
        }
    }
}

#[test]
fn traversals_report_no_total_cost() {
    let sequence = run(Algorithm::Bfs, &Snapshot::from(Graph::sample()), Some("A"));
    assert_eq!(sequence.total_cost(), None);
}

#[rstest]
#[case("BFS", Algorithm::Bfs)]
#[case(" prim ", Algorithm::Prim)]
#[case("postorder", Algorithm::Postorder)]
fn algorithm_names_parse(#[case] raw: &str, #[case] expected: Algorithm) {
    assert_eq!(raw.parse::<Algorithm>(), Ok(expected));
}

#[test]
fn unknown_algorithm_names_are_rejected() {
    assert!("dijkstra".parse::<Algorithm>().is_err());
}

/// A connected weighted graph: a random spanning tree plus extra edges.
fn connected_graph() -> impl Strategy<Value = Graph> {
    (1_usize..10).prop_flat_map(|nodes| {
        (
            prop::collection::vec((any::<Index>(), 1_u32..20), nodes),
            prop::collection::vec((0..nodes, 0..nodes, 1_u32..20), 0..12),
        )
            .prop_map(move |(spine, extra)| {
                let mut graph = Graph::new(GraphKind::Weighted);
                for node in 0..nodes {
                    graph.add_node(format!("N{node}")).expect("fresh id");
                }
                for (node, (parent, weight)) in spine.into_iter().enumerate().skip(1) {
                    let parent = parent.index(node);
                    graph
                        .add_edge(&format!("N{node}"), &format!("N{parent}"), Some(weight))
                        .expect("spanning edge is new");
                }
                for (source, target, weight) in extra {
                    // Self-loops and duplicates are rejected and simply skipped.
                    let _ = graph.add_edge(&format!("N{source}"), &format!("N{target}"), Some(weight));
                }
                graph
            })
    })
}

proptest! {
    #![proptest_config(suite_proptest_config(64))]

    #[test]
    fn dfs_visits_every_connected_node_once(graph in connected_graph()) {
        let nodes = graph.node_count();
        let sequence = run(Algorithm::Dfs, &Snapshot::from(graph), Some("N0"));
        prop_assert_eq!(sequence.len(), nodes);
        prop_assert_eq!(sequence.outcome(), Outcome::Complete);

        let mut seen: Vec<&str> = visits(&sequence).iter().map(|step| step.node.as_str()).collect();
        seen.sort_unstable();
        seen.dedup();
        prop_assert_eq!(seen.len(), nodes);
    }

    #[test]
    fn dfs_highlights_each_tree_edge_once(graph in connected_graph()) {
        let nodes = graph.node_count();
        let sequence = run(Algorithm::Dfs, &Snapshot::from(graph), Some("N0"));
        let edges: Vec<&EdgeRef> = visits(&sequence)
            .iter()
            .flat_map(|step| &step.edges)
            .collect();
        prop_assert_eq!(edges.len(), nodes - 1);
        for (position, edge) in edges.iter().enumerate() {
            prop_assert!(edges.iter().skip(position + 1).all(|other| !edge.same_pair(other)));
        }
    }

    #[test]
    fn kruskal_and_prim_agree_on_cost(graph in connected_graph()) {
        let nodes = graph.node_count();
        let snapshot = Snapshot::from(graph);
        let kruskal = run(Algorithm::Kruskal, &snapshot, None);
        let prim = run(Algorithm::Prim, &snapshot, None);
        prop_assert_eq!(kruskal.len(), nodes - 1);
        prop_assert_eq!(prim.len(), nodes - 1);
        prop_assert_eq!(kruskal.total_cost(), prim.total_cost());
    }

    #[test]
    fn sequences_are_deterministic(graph in connected_graph(), pick in 0_usize..4) {
        let algorithm = [Algorithm::Bfs, Algorithm::Dfs, Algorithm::Kruskal, Algorithm::Prim][pick];
        let snapshot = Snapshot::from(graph);
        prop_assert_eq!(
            run(algorithm, &snapshot, Some("N0")),
            run(algorithm, &snapshot, Some("N0"))
        );
    }
}
