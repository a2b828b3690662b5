//! Animation driver: plays a step sequence one frame at a time.
//!
//! [`AnimationDriver`] is a synchronous state machine. It never sleeps; a
//! host (or the timed player behind the `player` feature) calls
//! [`AnimationDriver::advance`] once per tick. Every run gets a fresh
//! [`RunHandle`] and a handle only advances the run it was issued for, so a
//! tick scheduled before [`AnimationDriver::cancel`] or
//! [`AnimationDriver::reset`] publishes nothing afterwards.

#[cfg(feature = "player")]
mod player;

use std::{fmt, time::Duration};

use tracing::{debug, info, instrument};

use crate::{
    error::DriverError,
    step::{Arrow, EdgeRef, Step, StepRecord, StepSequence},
};

#[cfg(feature = "player")]
#[cfg_attr(docsrs, doc(cfg(feature = "player")))]
pub use player::{FrameSource, PlaybackHandle, PlaybackOutcome, spawn_playback};

/// Lifecycle of the driver.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DriverState {
    /// No run has started since the last reset.
    #[default]
    Idle,
    /// A run is publishing frames.
    Running,
    /// The last run published every step.
    Completed,
    /// The last run was cancelled before publishing every step.
    Cancelled,
}

impl DriverState {
    /// Returns the lowercase state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one run of the driver.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunHandle {
    id: u64,
}

impl RunHandle {
    /// Monotonic run number, starting at 1.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(self) -> u64 { self.id }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.id)
    }
}

/// Everything the steps of a run have revealed so far.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CumulativeState {
    /// Visited (or spanned) node ids in visit order.
    pub visited: Vec<String>,
    /// Edges highlighted so far, each pair at most once.
    pub highlighted_edges: Vec<EdgeRef>,
    /// Queue or pending-branch contents after the latest step.
    pub frontier: Vec<String>,
    /// Edges Kruskal rejected as cycles so far.
    pub rejected_edges: Vec<EdgeRef>,
    /// Cumulative spanning-tree cost.
    pub total_cost: u64,
    /// Tree traversal output so far.
    pub output: Vec<i64>,
    /// Visitation-order arrows drawn so far.
    pub arrows: Vec<Arrow>,
}

impl CumulativeState {
    /// Folds one step into the state.
    pub fn apply(&mut self, step: &Step) {
        match step {
            Step::Bfs(visit) | Step::Dfs(visit) => {
                self.visited.clone_from(&visit.visited);
                self.frontier.clone_from(&visit.frontier);
                for edge in &visit.edges {
                    self.highlight(edge);
                }
            }
            Step::Kruskal(mst) | Step::Prim(mst) => {
                for node in &mst.nodes {
                    if !self.visited.contains(node) {
                        self.visited.push(node.clone());
                    }
                }
                self.highlight(&mst.edge);
                self.rejected_edges.extend(mst.rejected.iter().cloned());
                self.total_cost = mst.total_cost;
            }
            Step::Traversal(walk) => {
                self.output.clone_from(&walk.output);
                self.arrows.extend(walk.arrow);
            }
        }
    }

    fn highlight(&mut self, edge: &EdgeRef) {
        if !self
            .highlighted_edges
            .iter()
            .any(|known| known.same_pair(edge))
        {
            self.highlighted_edges.push(edge.clone());
        }
    }
}

/// One published state of a run.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AnimationFrame {
    /// Run that published the frame.
    pub run: RunHandle,
    /// Step shown by the frame.
    pub step: StepRecord,
    /// State after folding every step up to and including `step`.
    pub state: CumulativeState,
    /// Number of steps in the run.
    pub total: usize,
}

impl AnimationFrame {
    /// Zero-based position of the frame within its run.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.step.index()
    }

    /// Returns `true` for the final frame of a run.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        self.step.index().saturating_add(1) >= self.total
    }
}

/// Result of asking the driver for the next frame.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Advance {
    /// The next frame was published.
    Published(Box<AnimationFrame>),
    /// The run already published every step.
    Exhausted,
    /// The handle no longer names a running run.
    Stale,
}

/// Drives one step sequence at a time.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use algoscope_core::{
///     Advance, Algorithm, AnimationDriver, DriverState, Graph, RunParams, Snapshot,
///     compute_step_sequence,
/// };
///
/// let sequence = compute_step_sequence(
///     Algorithm::Bfs,
///     &Snapshot::from(Graph::sample()),
///     &RunParams::starting_at("A"),
/// )?;
/// let mut driver = AnimationDriver::new();
/// let run = driver.start(sequence, Duration::from_millis(800)).expect("idle driver");
///
/// let mut frames = 0;
/// while let Advance::Published(_) = driver.advance(run) {
///     frames += 1;
/// }
/// assert_eq!(frames, 6);
/// assert_eq!(driver.state(), DriverState::Completed);
/// # Ok::<(), algoscope_core::PreconditionError>(())
/// ```
#[derive(Debug, Default)]
pub struct AnimationDriver {
    state: DriverState,
    generation: u64,
    sequence: Option<StepSequence>,
    next: usize,
    cumulative: CumulativeState,
    current: Option<AnimationFrame>,
    delay: Duration,
}

impl AnimationDriver {
    /// Creates an idle driver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state.
    #[must_use]
    #[rustfmt::skip]
    pub const fn state(&self) -> DriverState { self.state }

    /// Returns `true` while a run is publishing frames.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.state, DriverState::Running)
    }

    /// The most recently published frame of the current run.
    #[must_use]
    pub const fn current_frame(&self) -> Option<&AnimationFrame> {
        self.current.as_ref()
    }

    /// Handle of the running run, if any.
    #[must_use]
    pub const fn active_run(&self) -> Option<RunHandle> {
        if self.is_running() {
            Some(RunHandle { id: self.generation })
        } else {
            None
        }
    }

    /// Delay requested for the latest run.
    #[must_use]
    #[rustfmt::skip]
    pub const fn delay(&self) -> Duration { self.delay }

    /// Starts playing `sequence`.
    ///
    /// Allowed from every state except [`DriverState::Running`]. An empty
    /// sequence completes immediately.
    ///
    /// # Errors
    /// Returns [`DriverError::AlreadyRunning`] while another run is active.
    #[instrument(
        name = "driver.start",
        err,
        skip(self, sequence),
        fields(algorithm = %sequence.algorithm(), steps = sequence.len(), delay = ?delay),
    )]
    pub fn start(
        &mut self,
        sequence: StepSequence,
        delay: Duration,
    ) -> Result<RunHandle, DriverError> {
        if self.is_running() {
            return Err(DriverError::AlreadyRunning {
                run: self.generation,
            });
        }

        self.generation = self.generation.saturating_add(1);
        self.state = if sequence.is_empty() {
            DriverState::Completed
        } else {
            DriverState::Running
        };
        self.sequence = Some(sequence);
        self.next = 0;
        self.cumulative = CumulativeState::default();
        self.current = None;
        self.delay = delay;

        let handle = RunHandle {
            id: self.generation,
        };
        info!(run = handle.id, state = %self.state, "run started");
        Ok(handle)
    }

    /// Publishes the next frame of `run`.
    ///
    /// Returns [`Advance::Stale`] when `run` was cancelled, reset, or
    /// superseded, and [`Advance::Exhausted`] once every step was published.
    pub fn advance(&mut self, run: RunHandle) -> Advance {
        if run.id != self.generation {
            return Advance::Stale;
        }
        match self.state {
            DriverState::Running => {}
            DriverState::Completed => return Advance::Exhausted,
            DriverState::Idle | DriverState::Cancelled => return Advance::Stale,
        }

        let Some(sequence) = self.sequence.as_ref() else {
            return Advance::Stale;
        };
        let total = sequence.len();
        let Some(record) = sequence.get(self.next).cloned() else {
            self.state = DriverState::Completed;
            return Advance::Exhausted;
        };

        self.cumulative.apply(record.step());
        self.next = self.next.saturating_add(1);
        if self.next >= total {
            self.cumulative
                .rejected_edges
                .extend(sequence.trailing_rejected().iter().cloned());
        }
        let frame = AnimationFrame {
            run,
            step: record,
            state: self.cumulative.clone(),
            total,
        };
        debug!(run = run.id, position = frame.position(), total, "frame published");

        if frame.is_last() {
            self.state = DriverState::Completed;
            info!(run = run.id, steps = total, "run completed");
        }
        self.current = Some(frame.clone());
        Advance::Published(Box::new(frame))
    }

    /// Cancels `run` if it is still running.
    ///
    /// Returns `false` when `run` is stale or already finished.
    #[instrument(name = "driver.cancel", skip(self), fields(run = run.id))]
    pub fn cancel(&mut self, run: RunHandle) -> bool {
        if run.id != self.generation || !self.is_running() {
            debug!(state = %self.state, "nothing to cancel");
            return false;
        }
        self.state = DriverState::Cancelled;
        info!(published = self.next, "run cancelled");
        true
    }

    /// Returns to [`DriverState::Idle`], discarding the current run.
    ///
    /// Any handle issued before the reset becomes stale.
    pub fn reset(&mut self) {
        self.generation = self.generation.saturating_add(1);
        self.state = DriverState::Idle;
        self.sequence = None;
        self.next = 0;
        self.cumulative = CumulativeState::default();
        self.current = None;
        debug!("driver reset");
    }
}

#[cfg(test)]
mod tests;
