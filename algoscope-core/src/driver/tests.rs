//! Unit tests for the animation driver state machine.

use std::time::Duration;

use rstest::{fixture, rstest};

use crate::{
    error::DriverError,
    graph::Graph,
    sequencer::{Algorithm, RunParams, Snapshot, compute_step_sequence},
    step::{Arrow, Outcome, StepSequence},
    tree::Tree,
};

use super::{Advance, AnimationDriver, AnimationFrame, DriverState, RunHandle};

const DELAY: Duration = Duration::from_millis(800);

fn sequence_of(algorithm: Algorithm) -> StepSequence {
    compute_step_sequence(
        algorithm,
        &Snapshot::from(Graph::sample()),
        &RunParams::starting_at("A"),
    )
    .expect("sample runs are accepted")
}

#[fixture]
fn bfs() -> StepSequence {
    sequence_of(Algorithm::Bfs)
}

fn drain(driver: &mut AnimationDriver, run: RunHandle) -> Vec<AnimationFrame> {
    let mut frames = Vec::new();
    while let Advance::Published(frame) = driver.advance(run) {
        frames.push(*frame);
    }
    frames
}

#[rstest]
fn frames_follow_step_order_then_complete(bfs: StepSequence) {
    let total = bfs.len();
    let mut driver = AnimationDriver::new();
    let run = driver.start(bfs, DELAY).expect("idle driver starts");
    assert_eq!(driver.state(), DriverState::Running);
    assert_eq!(driver.active_run(), Some(run));

    let frames = drain(&mut driver, run);
    assert_eq!(frames.len(), total);
    for (position, frame) in frames.iter().enumerate() {
        assert_eq!(frame.position(), position);
        assert_eq!(frame.total, total);
        assert_eq!(frame.is_last(), position + 1 == total);
    }
    assert_eq!(driver.state(), DriverState::Completed);
    assert_eq!(driver.advance(run), Advance::Exhausted);
    assert_eq!(driver.current_frame(), frames.last());
}

#[rstest]
fn start_is_rejected_while_running(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let run = driver.start(bfs.clone(), DELAY).expect("idle driver starts");
    assert_eq!(
        driver.start(bfs, DELAY),
        Err(DriverError::AlreadyRunning { run: run.id() })
    );
    assert_eq!(driver.active_run(), Some(run));
}

#[rstest]
fn cancel_suppresses_later_frames(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let run = driver.start(bfs, DELAY).expect("idle driver starts");
    assert!(matches!(driver.advance(run), Advance::Published(_)));

    assert!(driver.cancel(run));
    assert_eq!(driver.state(), DriverState::Cancelled);
    assert_eq!(driver.advance(run), Advance::Stale);
    assert!(!driver.cancel(run), "second cancel is a no-op");
}

#[rstest]
fn old_handles_go_stale_after_a_new_run(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let first = driver.start(bfs.clone(), DELAY).expect("idle driver starts");
    assert!(driver.cancel(first));

    let second = driver.start(bfs, DELAY).expect("cancelled driver restarts");
    assert_ne!(first, second);
    assert_eq!(driver.advance(first), Advance::Stale);
    assert!(!driver.cancel(first));
    assert!(matches!(driver.advance(second), Advance::Published(_)));
}

#[rstest]
fn completed_runs_can_be_restarted(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let first = driver.start(bfs.clone(), DELAY).expect("idle driver starts");
    drain(&mut driver, first);
    assert_eq!(driver.state(), DriverState::Completed);
    assert!(driver.start(bfs, DELAY).is_ok());
}

#[rstest]
fn reset_returns_to_idle(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let run = driver.start(bfs, DELAY).expect("idle driver starts");
    assert!(matches!(driver.advance(run), Advance::Published(_)));

    driver.reset();
    assert_eq!(driver.state(), DriverState::Idle);
    assert!(driver.current_frame().is_none());
    assert_eq!(driver.advance(run), Advance::Stale);
}

#[test]
fn empty_sequences_complete_immediately() {
    let sequence = StepSequence::new(Algorithm::Preorder, Vec::new(), Outcome::Complete);

    let mut driver = AnimationDriver::new();
    let run = driver.start(sequence, DELAY).expect("idle driver starts");
    assert_eq!(driver.state(), DriverState::Completed);
    assert_eq!(driver.advance(run), Advance::Exhausted);
}

#[test]
fn cumulative_state_tracks_spanning_tree_progress() {
    let mut driver = AnimationDriver::new();
    let run = driver
        .start(sequence_of(Algorithm::Kruskal), DELAY)
        .expect("idle driver starts");
    let frames = drain(&mut driver, run);
    let last = frames.last().expect("frames");

    assert_eq!(last.state.total_cost, 24);
    assert_eq!(last.state.highlighted_edges.len(), 5);
    assert_eq!(last.state.visited.len(), 6);
    assert_eq!(last.state.rejected_edges.len(), 4);
    assert_eq!(
        last.state.rejected_edges.last().map(ToString::to_string),
        Some("E-F (10)".to_owned())
    );

    let before_last = frames.iter().rev().nth(1).expect("several frames");
    assert_eq!(before_last.state.rejected_edges.len(), 3);

    let costs: Vec<u64> = frames.iter().map(|frame| frame.state.total_cost).collect();
    assert!(costs.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn cumulative_state_collects_traversal_arrows() {
    let mut tree = Tree::new();
    for value in [2, 1, 3] {
        tree.insert_bst(value).expect("distinct value");
    }
    let sequence = compute_step_sequence(
        Algorithm::Inorder,
        &Snapshot::from(tree),
        &RunParams::default(),
    )
    .expect("tree run accepted");

    let mut driver = AnimationDriver::new();
    let run = driver.start(sequence, DELAY).expect("idle driver starts");
    let frames = drain(&mut driver, run);
    let last = frames.last().expect("frames");
    assert_eq!(last.state.output, [1, 2, 3]);
    assert_eq!(
        last.state.arrows,
        [Arrow { from: 1, to: 2 }, Arrow { from: 2, to: 3 }]
    );
}

#[rstest]
fn bfs_frontier_is_replaced_not_accumulated(bfs: StepSequence) {
    let mut driver = AnimationDriver::new();
    let run = driver.start(bfs, DELAY).expect("idle driver starts");
    let frames = drain(&mut driver, run);
    let first = frames.first().expect("frames");
    assert_eq!(first.state.frontier, ["B", "F", "D"]);
    assert_eq!(first.state.highlighted_edges.len(), 3);
    assert!(frames.last().expect("frames").state.frontier.is_empty());
}
