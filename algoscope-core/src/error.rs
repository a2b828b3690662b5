//! Error types for the algoscope core library.
//!
//! Validation failures leave the model untouched, precondition failures refuse
//! a run before any step is computed, and driver/workbench errors describe
//! the run lifecycle. Every public error carries a stable machine-readable
//! code.

use std::fmt;

use thiserror::Error;

use crate::{
    graph::GraphKind,
    sequencer::{Algorithm, AlgorithmFamily},
    tree::Side,
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? $( ( $($tuple:tt)* ) )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? $( ( $($tuple)* ) )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Why an edge could not be added to a graph.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InvalidEdgeReason {
    /// Source and target are the same node.
    SelfLoop,
    /// One endpoint is not a node of the graph.
    UnknownEndpoint {
        /// The missing node id.
        id: String,
    },
    /// The graph already holds an edge between the same endpoints.
    Duplicate,
    /// Weighted graphs require an explicit weight.
    MissingWeight,
    /// Weights must be at least 1.
    ZeroWeight,
}

impl fmt::Display for InvalidEdgeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop => f.write_str("self-loops are not allowed"),
            Self::UnknownEndpoint { id } => write!(f, "node `{id}` does not exist"),
            Self::Duplicate => f.write_str("the edge already exists"),
            Self::MissingWeight => f.write_str("weighted graphs require an edge weight"),
            Self::ZeroWeight => f.write_str("edge weights must be at least 1"),
        }
    }
}

/// Malformed or duplicate input rejected by the graph or tree model.
///
/// The model is never partially mutated when one of these is returned.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    /// Node ids must contain at least one non-whitespace character.
    #[error("node id must not be empty")]
    EmptyNodeId,
    /// The graph already contains a node with this id.
    #[error("node `{id}` already exists")]
    DuplicateNode {
        /// The rejected node id.
        id: String,
    },
    /// The edge violates the graph's edge policy.
    #[error("cannot add edge {from}-{to}: {reason}")]
    InvalidEdge {
        /// Requested source id.
        from: String,
        /// Requested target id.
        to: String,
        /// Which rule the edge broke.
        reason: InvalidEdgeReason,
    },
    /// A tree value could not be parsed as an integer.
    #[error("`{raw}` is not an integer tree value")]
    NonNumericValue {
        /// Input as supplied by the caller.
        raw: String,
    },
    /// The tree already contains this value.
    #[error("value {value} is already in the tree")]
    DuplicateValue {
        /// The rejected value.
        value: i64,
    },
    /// The requested child slot already holds a subtree.
    #[error("the {side} child of {parent} is already occupied")]
    SlotOccupied {
        /// Value of the parent node.
        parent: i64,
        /// Requested side.
        side: Side,
    },
    /// No node carries the requested parent value.
    #[error("no node with value {parent} exists")]
    ParentNotFound {
        /// The parent value that was searched for.
        parent: i64,
    },
    /// A root was requested for a tree that already has one.
    #[error("the tree already has root {root}")]
    RootOccupied {
        /// Value of the existing root.
        root: i64,
    },
}

define_error_codes! {
    /// Stable codes describing [`ValidationError`] variants.
    enum ValidationErrorCode for ValidationError {
        /// Node ids must not be empty.
        EmptyNodeId => EmptyNodeId => "VALIDATION_EMPTY_NODE_ID",
        /// The graph already contains a node with this id.
        DuplicateNode => DuplicateNode { .. } => "VALIDATION_DUPLICATE_NODE",
        /// The edge violates the graph's edge policy.
        InvalidEdge => InvalidEdge { .. } => "VALIDATION_INVALID_EDGE",
        /// A tree value could not be parsed.
        NonNumericValue => NonNumericValue { .. } => "VALIDATION_NON_NUMERIC_VALUE",
        /// The tree already contains this value.
        DuplicateValue => DuplicateValue { .. } => "VALIDATION_DUPLICATE_VALUE",
        /// The requested child slot is occupied.
        SlotOccupied => SlotOccupied { .. } => "VALIDATION_SLOT_OCCUPIED",
        /// The parent value was not found.
        ParentNotFound => ParentNotFound { .. } => "VALIDATION_PARENT_NOT_FOUND",
        /// The tree already has a root.
        RootOccupied => RootOccupied { .. } => "VALIDATION_ROOT_OCCUPIED",
    }
}

/// A run was refused before any step was computed.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum PreconditionError {
    /// The graph or tree has nothing to run on.
    #[error("cannot run on an empty {model}")]
    EmptyModel {
        /// `"graph"` or `"tree"`.
        model: &'static str,
    },
    /// A graph traversal was requested without a start node.
    #[error("a start node is required")]
    MissingStartNode,
    /// The start node is not part of the graph.
    #[error("start node `{id}` does not exist")]
    UnknownStartNode {
        /// The requested start id.
        id: String,
    },
    /// The algorithm cannot run on this kind of graph.
    #[error("{algorithm} cannot run on a {kind} graph")]
    UnsupportedGraphKind {
        /// Requested algorithm.
        algorithm: Algorithm,
        /// Kind of the graph snapshot.
        kind: GraphKind,
    },
    /// The algorithm runs on the other kind of model.
    #[error("{algorithm} runs on a {expected}, not a {actual}")]
    WrongModel {
        /// Requested algorithm.
        algorithm: Algorithm,
        /// Model the algorithm needs.
        expected: &'static str,
        /// Model that was supplied.
        actual: &'static str,
    },
}

define_error_codes! {
    /// Stable codes describing [`PreconditionError`] variants.
    enum PreconditionErrorCode for PreconditionError {
        /// The graph or tree is empty.
        EmptyModel => EmptyModel { .. } => "PRECONDITION_EMPTY_MODEL",
        /// No start node was supplied.
        MissingStartNode => MissingStartNode => "PRECONDITION_MISSING_START_NODE",
        /// The start node does not exist.
        UnknownStartNode => UnknownStartNode { .. } => "PRECONDITION_UNKNOWN_START_NODE",
        /// The algorithm does not support the graph kind.
        UnsupportedGraphKind => UnsupportedGraphKind { .. } => "PRECONDITION_UNSUPPORTED_GRAPH_KIND",
        /// The algorithm needs the other kind of model.
        WrongModel => WrongModel { .. } => "PRECONDITION_WRONG_MODEL",
    }
}

/// Errors raised by the animation driver's run lifecycle.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DriverError {
    /// Another run is still animating.
    #[error("run {run} is still animating")]
    AlreadyRunning {
        /// Identifier of the active run.
        run: u64,
    },
}

/// Invalid playback configuration.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum ConfigError {
    /// Step delays must be positive.
    #[error("the {family} step delay must be greater than zero")]
    ZeroDelay {
        /// The algorithm family whose delay was zero.
        family: AlgorithmFamily,
    },
}

/// Errors surfaced by [`crate::Workbench`] and the timed player.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WorkbenchError {
    /// The model cannot change while a run is animating.
    #[error("cannot {operation} while an animation is running")]
    Busy {
        /// The refused operation.
        operation: &'static str,
    },
    /// The model rejected the input.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The run was refused.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    /// The driver refused to start.
    #[error(transparent)]
    Driver(#[from] DriverError),
    /// A lock guarding the workbench was poisoned by a panicking holder.
    #[error("lock for {resource} is poisoned")]
    LockPoisoned {
        /// Name of the poisoned resource.
        resource: &'static str,
    },
}

define_error_codes! {
    /// Stable codes describing [`WorkbenchError`] variants.
    enum WorkbenchErrorCode for WorkbenchError {
        /// A mutation was attempted during a run.
        Busy => Busy { .. } => "WORKBENCH_BUSY",
        /// The model rejected the input.
        Validation => Validation(..) => "WORKBENCH_VALIDATION",
        /// The run was refused.
        Precondition => Precondition(..) => "WORKBENCH_PRECONDITION",
        /// The driver refused to start.
        Driver => Driver(..) => "WORKBENCH_DRIVER",
        /// A lock was poisoned.
        LockPoisoned => LockPoisoned { .. } => "WORKBENCH_LOCK_POISONED",
    }
}

impl WorkbenchError {
    /// Retrieve the inner [`ValidationErrorCode`] when the model rejected input.
    #[must_use]
    pub const fn validation_code(&self) -> Option<ValidationErrorCode> {
        match self {
            Self::Validation(error) => Some(error.code()),
            _ => None,
        }
    }

    /// Retrieve the inner [`PreconditionErrorCode`] when a run was refused.
    #[must_use]
    pub const fn precondition_code(&self) -> Option<PreconditionErrorCode> {
        match self {
            Self::Precondition(error) => Some(error.code()),
            _ => None,
        }
    }
}
