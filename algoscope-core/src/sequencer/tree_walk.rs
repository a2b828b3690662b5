//! Pre-, in- and post-order tree traversal sequencing.

use tracing::{debug, instrument};

use crate::{
    step::{Arrow, Outcome, Step, StepSequence, TraversalOrder, TraversalStep},
    tree::{Tree, TreeIndex},
};

use super::Algorithm;

const fn algorithm_for(order: TraversalOrder) -> Algorithm {
    match order {
        TraversalOrder::Preorder => Algorithm::Preorder,
        TraversalOrder::Inorder => Algorithm::Inorder,
        TraversalOrder::Postorder => Algorithm::Postorder,
    }
}

/// Pending work of an iterative walk.
#[derive(Clone, Copy)]
enum Task {
    Enter(TreeIndex),
    Emit(i64),
}

/// Accumulates emitted values during one walk.
struct Walk<'a> {
    tree: &'a Tree,
    order: TraversalOrder,
    output: Vec<i64>,
    steps: Vec<Step>,
}

impl Walk<'_> {
    /// Walks the subtree under `root` on an explicit stack, so a degenerate
    /// tree costs heap rather than call depth.
    fn visit(&mut self, root: Option<TreeIndex>) {
        let mut tasks: Vec<Task> = root.map(Task::Enter).into_iter().collect();
        while let Some(task) = tasks.pop() {
            let index = match task {
                Task::Emit(value) => {
                    self.emit(value);
                    continue;
                }
                Task::Enter(index) => index,
            };
            let Some(node) = self.tree.node(index).copied() else {
                continue;
            };
            let left = node.left().map(Task::Enter);
            let right = node.right().map(Task::Enter);
            let here = Some(Task::Emit(node.value()));
            // Pushed in reverse so the stack pops them in visiting order.
            let ordered = match self.order {
                TraversalOrder::Preorder => [here, left, right],
                TraversalOrder::Inorder => [left, here, right],
                TraversalOrder::Postorder => [left, right, here],
            };
            tasks.extend(ordered.into_iter().rev().flatten());
        }
    }

    fn emit(&mut self, value: i64) {
        // Arrows join consecutive outputs, which need not be tree neighbours.
        let arrow = self.output.last().map(|&from| Arrow { from, to: value });
        self.output.push(value);
        debug!(value, ?arrow, "value emitted");
        self.steps.push(Step::Traversal(TraversalStep {
            order: self.order,
            value,
            arrow,
            output: self.output.clone(),
        }));
    }
}

/// Walks `tree` in `order`, emitting one step per value.
#[instrument(name = "core.tree_walk", skip(tree), fields(order = %order, nodes = tree.len()))]
pub(super) fn walk(tree: &Tree, order: TraversalOrder) -> StepSequence {
    let mut walk = Walk {
        tree,
        order,
        output: Vec::with_capacity(tree.len()),
        steps: Vec::with_capacity(tree.len()),
    };
    walk.visit(tree.root());
    StepSequence::new(algorithm_for(order), walk.steps, Outcome::Complete)
}
