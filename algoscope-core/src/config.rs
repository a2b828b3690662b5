//! Playback cadence configuration.
//!
//! Exposes the per-family step delays and the builder validation applied
//! before a [`PlaybackConfig`] reaches the animation driver.

use std::time::Duration;

use crate::{
    error::ConfigError,
    sequencer::{Algorithm, AlgorithmFamily},
};

/// Default delay between traversal steps (BFS, DFS, tree walks).
pub const DEFAULT_TRAVERSAL_DELAY: Duration = Duration::from_millis(800);

/// Default delay between spanning-tree steps (Kruskal, Prim).
pub const DEFAULT_MST_DELAY: Duration = Duration::from_millis(1500);

/// Validated per-step delays.
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use algoscope_core::{Algorithm, PlaybackConfig};
///
/// let config = PlaybackConfig::default();
/// assert_eq!(config.delay_for(Algorithm::Bfs), Duration::from_millis(800));
/// assert_eq!(config.delay_for(Algorithm::Prim), Duration::from_millis(1500));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PlaybackConfig {
    traversal_delay: Duration,
    mst_delay: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            traversal_delay: DEFAULT_TRAVERSAL_DELAY,
            mst_delay: DEFAULT_MST_DELAY,
        }
    }
}

impl PlaybackConfig {
    /// Starts a builder populated with the default delays.
    #[must_use]
    pub fn builder() -> PlaybackConfigBuilder {
        PlaybackConfigBuilder::default()
    }

    /// Delay between traversal steps.
    #[must_use]
    #[rustfmt::skip]
    pub const fn traversal_delay(&self) -> Duration { self.traversal_delay }

    /// Delay between spanning-tree steps.
    #[must_use]
    #[rustfmt::skip]
    pub const fn mst_delay(&self) -> Duration { self.mst_delay }

    /// Resolves the delay used when animating `algorithm`.
    #[must_use]
    pub const fn delay_for(&self, algorithm: Algorithm) -> Duration {
        match algorithm.family() {
            AlgorithmFamily::Traversal => self.traversal_delay,
            AlgorithmFamily::SpanningTree => self.mst_delay,
        }
    }
}

/// Configures and validates a [`PlaybackConfig`].
///
/// # Examples
/// ```
/// use std::time::Duration;
///
/// use algoscope_core::{Algorithm, PlaybackConfig};
///
/// let config = PlaybackConfig::builder()
///     .with_uniform_delay(Duration::from_millis(50))
///     .build()
///     .expect("delays are positive");
/// assert_eq!(config.delay_for(Algorithm::Kruskal), Duration::from_millis(50));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct PlaybackConfigBuilder {
    traversal_delay: Duration,
    mst_delay: Duration,
}

impl Default for PlaybackConfigBuilder {
    fn default() -> Self {
        let defaults = PlaybackConfig::default();
        Self {
            traversal_delay: defaults.traversal_delay,
            mst_delay: defaults.mst_delay,
        }
    }
}

impl PlaybackConfigBuilder {
    /// Creates a builder populated with default delays.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the traversal delay.
    #[must_use]
    pub const fn with_traversal_delay(mut self, delay: Duration) -> Self {
        self.traversal_delay = delay;
        self
    }

    /// Overrides the spanning-tree delay.
    #[must_use]
    pub const fn with_mst_delay(mut self, delay: Duration) -> Self {
        self.mst_delay = delay;
        self
    }

    /// Uses `delay` for every algorithm family.
    #[must_use]
    pub const fn with_uniform_delay(mut self, delay: Duration) -> Self {
        self.traversal_delay = delay;
        self.mst_delay = delay;
        self
    }

    /// Validates the delays and constructs a [`PlaybackConfig`].
    ///
    /// # Errors
    /// Returns [`ConfigError::ZeroDelay`] when either delay is zero.
    pub fn build(self) -> Result<PlaybackConfig, ConfigError> {
        if self.traversal_delay.is_zero() {
            return Err(ConfigError::ZeroDelay {
                family: AlgorithmFamily::Traversal,
            });
        }
        if self.mst_delay.is_zero() {
            return Err(ConfigError::ZeroDelay {
                family: AlgorithmFamily::SpanningTree,
            });
        }
        Ok(PlaybackConfig {
            traversal_delay: self.traversal_delay,
            mst_delay: self.mst_delay,
        })
    }
}
