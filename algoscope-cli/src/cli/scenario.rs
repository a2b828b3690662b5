//! JSON scenario files accepted by `--scenario`.
//!
//! A graph scenario looks like:
//!
//! ```json
//! {
//!   "kind": "weighted",
//!   "nodes": ["A", "B", "C"],
//!   "edges": [{ "source": "A", "target": "B", "weight": 4 }],
//!   "start": "A"
//! }
//! ```
//!
//! A tree scenario lists BST values, or a root plus explicit placements:
//!
//! ```json
//! {
//!   "mode": "binary",
//!   "root": 1,
//!   "inserts": [{ "value": 2, "parent": 1, "side": "left" }]
//! }
//! ```

use serde::Deserialize;

/// Graph description loaded from a scenario file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GraphScenario {
    /// `undirected`, `directed` or `weighted`; defaults to undirected.
    #[serde(default)]
    pub kind: Option<String>,
    /// Node ids in insertion order.
    #[serde(default)]
    pub nodes: Vec<String>,
    /// Edges in insertion order.
    #[serde(default)]
    pub edges: Vec<EdgeEntry>,
    /// Start node used when `--start` is absent.
    #[serde(default)]
    pub start: Option<String>,
}

/// One edge of a [`GraphScenario`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct EdgeEntry {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Edge weight; required for weighted graphs.
    #[serde(default)]
    pub weight: Option<u32>,
}

/// Tree description loaded from a scenario file.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TreeScenario {
    /// `bst` or `binary`; defaults to bst.
    #[serde(default)]
    pub mode: Option<String>,
    /// Values inserted by BST ordering.
    #[serde(default)]
    pub values: Vec<i64>,
    /// Root of a binary-mode tree.
    #[serde(default)]
    pub root: Option<i64>,
    /// Explicit placements for a binary-mode tree.
    #[serde(default)]
    pub inserts: Vec<InsertEntry>,
}

/// One explicit placement of a [`TreeScenario`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct InsertEntry {
    /// Value to insert.
    pub value: i64,
    /// Value of the parent node.
    pub parent: i64,
    /// `left` or `right`.
    pub side: String,
}
