//! Model and driver behind a single owner.
//!
//! A [`Workbench`] holds the graph, the tree, the animation driver, and the
//! playback configuration. Mutations are refused with
//! [`WorkbenchError::Busy`] while a run is animating, and runs always work
//! on a snapshot, so a run never observes a model change. Hosts that share a
//! workbench across tasks wrap it in a [`SharedWorkbench`].

use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::{
    config::PlaybackConfig,
    driver::{Advance, AnimationDriver, AnimationFrame, DriverState, RunHandle},
    error::{DriverError, WorkbenchError},
    graph::{EdgeIndex, Graph, GraphKind, NodeIndex},
    sequencer::{Algorithm, RunParams, Snapshot, compute_step_sequence},
    step::StepSequence,
    tree::{Side, Tree, TreeIndex},
};

#[cfg(feature = "player")]
use crate::driver::{FrameSource, PlaybackHandle, spawn_playback};

/// A workbench shared between a host and its playback task.
pub type SharedWorkbench = Arc<Mutex<Workbench>>;

/// Editable models plus the driver that animates them.
///
/// # Examples
/// ```
/// use algoscope_core::{Advance, Algorithm, RunParams, Workbench, WorkbenchError};
///
/// let mut bench = Workbench::new();
/// bench.add_node("A")?;
/// bench.add_node("B")?;
/// bench.add_edge("A", "B", None)?;
///
/// let run = bench.start_run(Algorithm::Bfs, &RunParams::starting_at("A"))?;
/// assert!(matches!(bench.add_node("C"), Err(WorkbenchError::Busy { .. })));
///
/// while let Advance::Published(_) = bench.advance(run) {}
/// assert!(bench.add_node("C").is_ok());
/// # Ok::<(), WorkbenchError>(())
/// ```
#[derive(Debug, Default)]
pub struct Workbench {
    graph: Graph,
    tree: Tree,
    driver: AnimationDriver,
    config: PlaybackConfig,
}

impl Workbench {
    /// Creates a workbench with an empty undirected graph, an empty tree and
    /// default delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a workbench using `config` for playback delays.
    #[must_use]
    pub fn with_config(config: PlaybackConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a workbench around an existing graph.
    #[must_use]
    pub fn with_graph(graph: Graph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Wraps the workbench for sharing with a playback task.
    #[must_use]
    pub fn into_shared(self) -> SharedWorkbench {
        Arc::new(Mutex::new(self))
    }

    /// The graph model.
    #[must_use]
    #[rustfmt::skip]
    pub const fn graph(&self) -> &Graph { &self.graph }

    /// The tree model.
    #[must_use]
    #[rustfmt::skip]
    pub const fn tree(&self) -> &Tree { &self.tree }

    /// The animation driver.
    #[must_use]
    #[rustfmt::skip]
    pub const fn driver(&self) -> &AnimationDriver { &self.driver }

    /// Playback delays.
    #[must_use]
    #[rustfmt::skip]
    pub const fn config(&self) -> PlaybackConfig { self.config }

    /// Returns `true` while a run is animating.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.driver.is_running()
    }

    fn ensure_idle(&self, operation: &'static str) -> Result<(), WorkbenchError> {
        if self.is_running() {
            debug!(operation, "mutation refused during a run");
            return Err(WorkbenchError::Busy { operation });
        }
        Ok(())
    }

    /// Replaces the playback delays.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] while a run is animating.
    pub fn set_config(&mut self, config: PlaybackConfig) -> Result<(), WorkbenchError> {
        self.ensure_idle("change playback delays")?;
        self.config = config;
        Ok(())
    }

    /// Adds a graph node.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] during a run, or the graph's
    /// validation error.
    #[instrument(name = "workbench.add_node", err, skip(self))]
    pub fn add_node(&mut self, id: &str) -> Result<NodeIndex, WorkbenchError> {
        self.ensure_idle("add a node")?;
        Ok(self.graph.add_node(id)?)
    }

    /// Adds a graph edge.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] during a run, or the graph's
    /// validation error.
    #[instrument(name = "workbench.add_edge", err, skip(self))]
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        weight: Option<u32>,
    ) -> Result<EdgeIndex, WorkbenchError> {
        self.ensure_idle("add an edge")?;
        Ok(self.graph.add_edge(source, target, weight)?)
    }

    /// Switches the graph kind, discarding every node and edge.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] while a run is animating.
    #[instrument(name = "workbench.set_graph_kind", err, skip(self))]
    pub fn set_graph_kind(&mut self, kind: GraphKind) -> Result<(), WorkbenchError> {
        self.ensure_idle("change the graph kind")?;
        self.graph = Graph::new(kind);
        self.driver.reset();
        Ok(())
    }

    /// Replaces the graph wholesale.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] while a run is animating.
    pub fn replace_graph(&mut self, graph: Graph) -> Result<(), WorkbenchError> {
        self.ensure_idle("replace the graph")?;
        self.graph = graph;
        self.driver.reset();
        Ok(())
    }

    /// Inserts `value` by binary-search-tree ordering.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] during a run, or the tree's
    /// validation error.
    #[instrument(name = "workbench.insert_bst", err, skip(self))]
    pub fn insert_bst(&mut self, value: i64) -> Result<TreeIndex, WorkbenchError> {
        self.ensure_idle("insert a tree value")?;
        Ok(self.tree.insert_bst(value)?)
    }

    /// Places `value` as the root of an empty tree.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] during a run, or the tree's
    /// validation error.
    #[instrument(name = "workbench.insert_root", err, skip(self))]
    pub fn insert_root(&mut self, value: i64) -> Result<TreeIndex, WorkbenchError> {
        self.ensure_idle("insert a tree value")?;
        Ok(self.tree.insert_root(value)?)
    }

    /// Places `value` as the `side` child of the node holding `parent`.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] during a run, or the tree's
    /// validation error.
    #[instrument(name = "workbench.insert_binary", err, skip(self))]
    pub fn insert_binary(
        &mut self,
        value: i64,
        parent: i64,
        side: Side,
    ) -> Result<TreeIndex, WorkbenchError> {
        self.ensure_idle("insert a tree value")?;
        Ok(self.tree.insert_binary(value, parent, side)?)
    }

    /// Discards both models and any finished or cancelled run.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Busy`] while a run is animating; cancel it
    /// first.
    #[instrument(name = "workbench.clear", err, skip(self))]
    pub fn clear(&mut self) -> Result<(), WorkbenchError> {
        self.ensure_idle("clear the workbench")?;
        self.graph.clear();
        self.tree.clear();
        self.driver.reset();
        Ok(())
    }

    /// Copies the model `algorithm` runs on.
    #[must_use]
    pub fn snapshot(&self, algorithm: Algorithm) -> Snapshot {
        if algorithm.runs_on_tree() {
            Snapshot::Tree(self.tree.clone())
        } else {
            Snapshot::Graph(self.graph.clone())
        }
    }

    /// Computes the step sequence of `algorithm` over a snapshot without
    /// touching the driver.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Precondition`] when the run is refused.
    pub fn compute(
        &self,
        algorithm: Algorithm,
        params: &RunParams,
    ) -> Result<StepSequence, WorkbenchError> {
        Ok(compute_step_sequence(
            algorithm,
            &self.snapshot(algorithm),
            params,
        )?)
    }

    /// Computes `algorithm` and starts animating it with the configured
    /// delay.
    ///
    /// # Errors
    /// Returns [`WorkbenchError::Driver`] while another run is animating, or
    /// [`WorkbenchError::Precondition`] when the run is refused.
    #[instrument(name = "workbench.start_run", err, skip(self, params), fields(algorithm = %algorithm))]
    pub fn start_run(
        &mut self,
        algorithm: Algorithm,
        params: &RunParams,
    ) -> Result<RunHandle, WorkbenchError> {
        if let Some(run) = self.driver.active_run() {
            return Err(DriverError::AlreadyRunning { run: run.id() }.into());
        }
        let sequence = self.compute(algorithm, params)?;
        Ok(self
            .driver
            .start(sequence, self.config.delay_for(algorithm))?)
    }

    /// Publishes the next frame of `run`.
    pub fn advance(&mut self, run: RunHandle) -> Advance {
        self.driver.advance(run)
    }

    /// Cancels `run`; returns `false` when it was not running.
    pub fn cancel(&mut self, run: RunHandle) -> bool {
        self.driver.cancel(run)
    }

    /// Cancels whatever is running and returns the driver to idle.
    pub fn reset_run(&mut self) {
        self.driver.reset();
    }

    /// Driver lifecycle state.
    #[must_use]
    pub const fn run_state(&self) -> DriverState {
        self.driver.state()
    }

    /// Latest published frame.
    #[must_use]
    pub const fn current_frame(&self) -> Option<&AnimationFrame> {
        self.driver.current_frame()
    }
}

#[cfg(feature = "player")]
impl FrameSource for Workbench {
    fn advance_run(&mut self, run: RunHandle) -> Advance {
        self.advance(run)
    }

    fn cancel_run(&mut self, run: RunHandle) -> bool {
        self.cancel(run)
    }
}

/// Starts `algorithm` on a shared workbench and plays it on the tokio
/// runtime, calling `on_step` once per frame.
///
/// # Errors
/// Returns [`WorkbenchError::LockPoisoned`] when the workbench lock is
/// poisoned, or any error of [`Workbench::start_run`].
///
/// # Panics
/// Panics when called outside a tokio runtime.
#[cfg(feature = "player")]
#[cfg_attr(docsrs, doc(cfg(feature = "player")))]
pub fn play<F>(
    workbench: &SharedWorkbench,
    algorithm: Algorithm,
    params: &RunParams,
    on_step: F,
) -> Result<PlaybackHandle<Workbench>, WorkbenchError>
where
    F: FnMut(&AnimationFrame) + Send + 'static,
{
    let (run, delay) = {
        let mut bench = workbench.lock().map_err(|_| WorkbenchError::LockPoisoned {
            resource: "workbench",
        })?;
        let run = bench.start_run(algorithm, params)?;
        (run, bench.driver().delay())
    };
    Ok(spawn_playback(Arc::clone(workbench), run, delay, on_step))
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::error::{PreconditionErrorCode, ValidationErrorCode, WorkbenchErrorCode};

    #[fixture]
    fn sample_bench() -> Workbench {
        Workbench::with_graph(Graph::sample())
    }

    #[rstest]
    fn mutations_are_refused_while_running(mut sample_bench: Workbench) {
        let run = sample_bench
            .start_run(Algorithm::Kruskal, &RunParams::default())
            .expect("sample run starts");
        let before = sample_bench.graph().clone();

        let refusals = [
            sample_bench.add_node("G").err(),
            sample_bench.add_edge("A", "C", Some(1)).err(),
            sample_bench.insert_bst(5).err(),
            sample_bench.clear().err(),
            sample_bench.set_graph_kind(GraphKind::Directed).err(),
        ];
        for refusal in refusals {
            assert_eq!(refusal.map(|error| error.code()), Some(WorkbenchErrorCode::Busy));
        }
        assert_eq!(sample_bench.graph(), &before);

        assert!(sample_bench.cancel(run));
        assert!(sample_bench.add_node("G").is_ok());
    }

    #[rstest]
    fn a_second_start_is_refused(mut sample_bench: Workbench) {
        let run = sample_bench
            .start_run(Algorithm::Prim, &RunParams::default())
            .expect("sample run starts");
        let error = sample_bench
            .start_run(Algorithm::Bfs, &RunParams::starting_at("A"))
            .expect_err("driver busy");
        assert_eq!(error.code(), WorkbenchErrorCode::Driver);
        assert_eq!(sample_bench.driver().active_run(), Some(run));
    }

    #[test]
    fn validation_and_precondition_codes_pass_through() {
        let mut bench = Workbench::new();
        let duplicate = bench
            .add_node("A")
            .and_then(|_| bench.add_node("A"))
            .expect_err("duplicate id");
        assert_eq!(
            duplicate.validation_code(),
            Some(ValidationErrorCode::DuplicateNode)
        );

        let refused = bench
            .start_run(Algorithm::Dfs, &RunParams::default())
            .expect_err("no start node");
        assert_eq!(
            refused.precondition_code(),
            Some(PreconditionErrorCode::MissingStartNode)
        );
        assert_eq!(bench.run_state(), DriverState::Idle);
    }

    #[test]
    fn switching_graph_kind_discards_the_graph() {
        let mut bench = Workbench::with_graph(Graph::sample());
        bench
            .set_graph_kind(GraphKind::Directed)
            .expect("idle workbench");
        assert!(bench.graph().is_empty());
        assert_eq!(bench.graph().kind(), GraphKind::Directed);
    }

    #[rstest]
    fn snapshots_are_detached_from_later_edits(mut sample_bench: Workbench) {
        let snapshot = sample_bench.snapshot(Algorithm::Bfs);
        sample_bench.add_node("G").expect("idle workbench");
        let Snapshot::Graph(graph) = snapshot else {
            panic!("graph algorithms snapshot the graph");
        };
        assert_eq!(graph.node_count(), 6);
    }

    #[test]
    fn tree_runs_use_the_tree() {
        let mut bench = Workbench::new();
        bench.insert_root(8).expect("empty tree");
        bench
            .insert_binary(3, 8, Side::Right)
            .expect("free slot");
        let sequence = bench
            .compute(Algorithm::Postorder, &RunParams::default())
            .expect("tree run accepted");
        assert_eq!(sequence.len(), 2);
    }
}
