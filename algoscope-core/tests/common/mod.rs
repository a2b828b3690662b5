use algoscope_core::{Graph, GraphKind, Tree};

/// Builds a graph from node ids and `(source, target, weight)` triples.
#[must_use]
pub fn graph(kind: GraphKind, nodes: &[&str], edges: &[(&str, &str, Option<u32>)]) -> Graph {
    let mut graph = Graph::new(kind);
    for id in nodes {
        graph.add_node(*id).expect("fixture ids are distinct");
    }
    for (source, target, weight) in edges {
        graph
            .add_edge(source, target, *weight)
            .expect("fixture edges are valid");
    }
    graph
}

/// Builds a binary search tree by inserting `values` in order.
#[must_use]
pub fn bst(values: &[i64]) -> Tree {
    let mut tree = Tree::new();
    for value in values {
        tree.insert_bst(*value).expect("fixture values are distinct");
    }
    tree
}
