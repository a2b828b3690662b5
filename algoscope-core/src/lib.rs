//! Algoscope core library.
//!
//! Builds graphs and binary trees, turns BFS, DFS, Kruskal, Prim, and the
//! three tree traversals into inspectable step sequences, and plays those
//! sequences back frame by frame with cancellation.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod config;
mod driver;
mod error;
mod graph;
mod sequencer;
mod step;
mod tree;
mod union_find;
mod workbench;

#[cfg(test)]
mod test_utils;

#[cfg(feature = "player")]
#[cfg_attr(docsrs, doc(cfg(feature = "player")))]
pub use crate::{
    driver::{FrameSource, PlaybackHandle, PlaybackOutcome, spawn_playback},
    workbench::play,
};
pub use crate::{
    config::{DEFAULT_MST_DELAY, DEFAULT_TRAVERSAL_DELAY, PlaybackConfig, PlaybackConfigBuilder},
    driver::{Advance, AnimationDriver, AnimationFrame, CumulativeState, DriverState, RunHandle},
    error::{
        ConfigError, DriverError, InvalidEdgeReason, PreconditionError, PreconditionErrorCode,
        ValidationError, ValidationErrorCode, WorkbenchError, WorkbenchErrorCode,
    },
    graph::{Edge, EdgeIndex, Graph, GraphKind, Neighbor, NodeIndex, UnknownGraphKind, VisitedSet},
    sequencer::{
        Algorithm, AlgorithmFamily, RunParams, Snapshot, UnknownAlgorithm, compute_step_sequence,
    },
    step::{
        Arrow, EdgeRef, MstStep, Outcome, Step, StepRecord, StepSequence, TraversalOrder,
        TraversalStep, VisitStep,
    },
    tree::{Side, Tree, TreeIndex, TreeMode, TreeNode, UnknownTreeOption, parse_tree_value},
    union_find::DisjointSet,
    workbench::{SharedWorkbench, Workbench},
};
