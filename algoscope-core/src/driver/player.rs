//! Timed playback on the tokio runtime.
//!
//! The player publishes the first frame immediately, then one frame per
//! delay. Every publication happens while the source's lock is held and only
//! after the source confirms the run is still live, so once a cancel has
//! taken the same lock no further frame reaches the callback.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span, warn};

use super::{Advance, AnimationDriver, AnimationFrame, RunHandle};

/// Something the player can pull frames from and cancel.
pub trait FrameSource {
    /// Publishes the next frame of `run`.
    fn advance_run(&mut self, run: RunHandle) -> Advance;

    /// Cancels `run`, returning `false` when it was not running.
    fn cancel_run(&mut self, run: RunHandle) -> bool;
}

impl FrameSource for AnimationDriver {
    fn advance_run(&mut self, run: RunHandle) -> Advance {
        self.advance(run)
    }

    fn cancel_run(&mut self, run: RunHandle) -> bool {
        self.cancel(run)
    }
}

/// How a playback task ended.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PlaybackOutcome {
    /// Every frame was published.
    Completed {
        /// Frames handed to the callback.
        published: usize,
    },
    /// The run was cancelled, reset, or superseded first.
    Cancelled {
        /// Frames handed to the callback before cancellation.
        published: usize,
    },
}

impl PlaybackOutcome {
    /// Frames handed to the callback.
    #[must_use]
    pub const fn published(self) -> usize {
        match self {
            Self::Completed { published } | Self::Cancelled { published } => published,
        }
    }
}

/// Handle to a spawned playback task.
#[derive(Debug)]
pub struct PlaybackHandle<S> {
    run: RunHandle,
    source: Arc<Mutex<S>>,
    token: CancellationToken,
    task: JoinHandle<PlaybackOutcome>,
}

impl<S: FrameSource> PlaybackHandle<S> {
    /// Run being played.
    #[must_use]
    #[rustfmt::skip]
    pub const fn run(&self) -> RunHandle { self.run }

    /// Cancels the run and wakes the task.
    ///
    /// When this returns, the callback will not be invoked again for this
    /// run. Returns `false` if the run had already finished.
    pub fn cancel(&self) -> bool {
        let cancelled = match self.source.lock() {
            Ok(mut source) => source.cancel_run(self.run),
            Err(poisoned) => poisoned.into_inner().cancel_run(self.run),
        };
        self.token.cancel();
        cancelled
    }

    /// Waits for the task to finish.
    ///
    /// # Errors
    /// Returns the [`JoinError`] when the callback panicked.
    pub async fn join(self) -> Result<PlaybackOutcome, JoinError> {
        self.task.await
    }
}

/// Spawns a task that plays `run` from `source`, calling `on_step` once per
/// frame in step order.
///
/// The first frame is published without waiting; each later frame follows
/// `delay` after the previous callback returned. `on_step` runs while the
/// source is locked and must not lock it again.
///
/// # Panics
/// Panics when called outside a tokio runtime.
///
/// # Examples
/// ```
/// use std::{sync::{Arc, Mutex}, time::Duration};
///
/// use algoscope_core::{
///     Algorithm, AnimationDriver, Graph, PlaybackOutcome, RunParams, Snapshot,
///     compute_step_sequence, spawn_playback,
/// };
///
/// # #[tokio::main(flavor = "current_thread", start_paused = true)]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let sequence = compute_step_sequence(
///     Algorithm::Kruskal,
///     &Snapshot::from(Graph::sample()),
///     &RunParams::default(),
/// )?;
/// let mut driver = AnimationDriver::new();
/// let run = driver.start(sequence, Duration::from_millis(1500))?;
///
/// let playback = spawn_playback(Arc::new(Mutex::new(driver)), run, Duration::from_millis(1500), |_| {});
/// assert_eq!(playback.join().await?, PlaybackOutcome::Completed { published: 5 });
/// # Ok(())
/// # }
/// ```
pub fn spawn_playback<S, F>(
    source: Arc<Mutex<S>>,
    run: RunHandle,
    delay: Duration,
    on_step: F,
) -> PlaybackHandle<S>
where
    S: FrameSource + Send + 'static,
    F: FnMut(&AnimationFrame) + Send + 'static,
{
    let token = CancellationToken::new();
    let span = info_span!("player.run", run = run.id(), delay = ?delay);
    let task = tokio::spawn(
        play(Arc::clone(&source), run, delay, token.clone(), on_step).instrument(span),
    );
    PlaybackHandle {
        run,
        source,
        token,
        task,
    }
}

async fn play<S, F>(
    source: Arc<Mutex<S>>,
    run: RunHandle,
    delay: Duration,
    token: CancellationToken,
    mut on_step: F,
) -> PlaybackOutcome
where
    S: FrameSource,
    F: FnMut(&AnimationFrame),
{
    let mut published = 0_usize;
    loop {
        // The guard must drop before the task suspends.
        let finished = {
            let Ok(mut guard) = source.lock() else {
                warn!("frame source lock poisoned; stopping playback");
                return PlaybackOutcome::Cancelled { published };
            };
            match guard.advance_run(run) {
                Advance::Published(frame) => {
                    on_step(frame.as_ref());
                    published = published.saturating_add(1);
                    frame.is_last()
                }
                Advance::Exhausted => true,
                Advance::Stale => {
                    debug!(published, "run no longer live");
                    return PlaybackOutcome::Cancelled { published };
                }
            }
        };
        if finished {
            debug!(published, "playback finished");
            return PlaybackOutcome::Completed { published };
        }

        tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(published, "playback cancelled while waiting");
                return PlaybackOutcome::Cancelled { published };
            }
            () = tokio::time::sleep(delay) => {}
        }
    }
}
