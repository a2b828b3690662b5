//! Binary tree model with ordered (BST) and explicit-slot insertion.
//!
//! Nodes are stored in an arena and addressed by [`TreeIndex`]. Each node
//! owns at most one left and one right child and no node is ever shared, so
//! the arena never contains a cycle. Nodes are never removed individually,
//! which makes a scan of the arena a scan of the whole tree.

use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// Insertion discipline offered to the user.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TreeMode {
    /// Values are placed by binary-search-tree ordering.
    #[default]
    Bst,
    /// Values are placed at an explicit parent and side.
    Binary,
}

impl TreeMode {
    /// Returns the lowercase name used on the configuration surface.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bst => "bst",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tree mode or side name is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown {what} `{raw}`")]
pub struct UnknownTreeOption {
    what: &'static str,
    raw: String,
}

impl FromStr for TreeMode {
    type Err = UnknownTreeOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bst" => Ok(Self::Bst),
            "binary" => Ok(Self::Binary),
            _ => Err(UnknownTreeOption {
                what: "tree mode",
                raw: raw.to_owned(),
            }),
        }
    }
}

/// Child slot of a tree node.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// The left child.
    Left,
    /// The right child.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

impl FromStr for Side {
    type Err = UnknownTreeOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            _ => Err(UnknownTreeOption {
                what: "side",
                raw: raw.to_owned(),
            }),
        }
    }
}

/// Parses user input into a tree value.
///
/// # Errors
/// Returns [`ValidationError::NonNumericValue`] when `raw` is not an integer.
///
/// # Examples
/// ```
/// use algoscope_core::{ValidationError, parse_tree_value};
///
/// assert_eq!(parse_tree_value(" 42 "), Ok(42));
/// assert!(matches!(
///     parse_tree_value("forty"),
///     Err(ValidationError::NonNumericValue { .. })
/// ));
/// ```
pub fn parse_tree_value(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NonNumericValue {
            raw: raw.to_owned(),
        })
}

/// Position of a node in the tree arena.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TreeIndex(usize);

/// A value together with its child slots.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TreeNode {
    value: i64,
    left: Option<TreeIndex>,
    right: Option<TreeIndex>,
}

impl TreeNode {
    /// Returns the node's value.
    #[must_use]
    #[rustfmt::skip]
    pub const fn value(&self) -> i64 { self.value }

    /// Returns the left child.
    #[must_use]
    #[rustfmt::skip]
    pub const fn left(&self) -> Option<TreeIndex> { self.left }

    /// Returns the right child.
    #[must_use]
    #[rustfmt::skip]
    pub const fn right(&self) -> Option<TreeIndex> { self.right }

    /// Returns the child in `side`.
    #[must_use]
    pub const fn child(&self, side: Side) -> Option<TreeIndex> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// A binary tree of unique integer values.
///
/// Equality is structural: two trees are equal when they have the same shape
/// and the same value in every position.
///
/// # Examples
/// ```
/// use algoscope_core::Tree;
///
/// let mut tree = Tree::new();
/// for value in [50, 30, 70, 20] {
///     tree.insert_bst(value)?;
/// }
/// assert_eq!(tree.height(), 3);
/// assert_eq!(tree.values_in_order(), vec![20, 30, 50, 70]);
/// # Ok::<(), algoscope_core::ValidationError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Tree {
    nodes: Vec<TreeNode>,
    root: Option<TreeIndex>,
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the root node index.
    #[must_use]
    #[rustfmt::skip]
    pub const fn root(&self) -> Option<TreeIndex> { self.root }

    /// Returns the node at `index`.
    #[must_use]
    pub fn node(&self, index: TreeIndex) -> Option<&TreeNode> {
        self.nodes.get(index.0)
    }

    /// Number of values in the tree.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.nodes.len() }

    /// Returns `true` when the tree has no root.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.root.is_none() }

    /// Finds the node holding `value` anywhere in the tree, regardless of
    /// ordering.
    #[must_use]
    pub fn find(&self, value: i64) -> Option<TreeIndex> {
        self.nodes
            .iter()
            .position(|node| node.value == value)
            .map(TreeIndex)
    }

    /// Returns `true` when some node holds `value`.
    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        self.find(value).is_some()
    }

    /// Inserts `value` by binary-search-tree ordering.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateValue`] when the value is already
    /// present anywhere in the tree.
    pub fn insert_bst(&mut self, value: i64) -> Result<TreeIndex, ValidationError> {
        if self.contains(value) {
            return Err(ValidationError::DuplicateValue { value });
        }
        let Some(mut current) = self.root else {
            return Ok(self.attach_root(value));
        };
        loop {
            let Some(node) = self.node(current).copied() else {
                return Ok(self.attach_root(value));
            };
            let side = if value < node.value {
                Side::Left
            } else {
                Side::Right
            };
            match node.child(side) {
                Some(child) => current = child,
                None => return Ok(self.attach(current, side, value)),
            }
        }
    }

    /// Starts a tree with `value` as its root.
    ///
    /// # Errors
    /// Returns [`ValidationError::RootOccupied`] when the tree already has a
    /// root.
    pub fn insert_root(&mut self, value: i64) -> Result<TreeIndex, ValidationError> {
        match self.root.and_then(|root| self.node(root)) {
            Some(root) => Err(ValidationError::RootOccupied { root: root.value }),
            None => Ok(self.attach_root(value)),
        }
    }

    /// Inserts `value` as the `side` child of the node holding `parent`.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateValue`] for values already present,
    /// [`ValidationError::ParentNotFound`] when no node holds `parent`, and
    /// [`ValidationError::SlotOccupied`] when the slot already has a child.
    pub fn insert_binary(
        &mut self,
        value: i64,
        parent: i64,
        side: Side,
    ) -> Result<TreeIndex, ValidationError> {
        let parent_index = self
            .find(parent)
            .ok_or(ValidationError::ParentNotFound { parent })?;
        if self
            .node(parent_index)
            .is_some_and(|node| node.child(side).is_some())
        {
            return Err(ValidationError::SlotOccupied { parent, side });
        }
        if self.contains(value) {
            return Err(ValidationError::DuplicateValue { value });
        }
        Ok(self.attach(parent_index, side, value))
    }

    fn attach_root(&mut self, value: i64) -> TreeIndex {
        let index = self.push(value);
        self.root = Some(index);
        index
    }

    fn attach(&mut self, parent: TreeIndex, side: Side, value: i64) -> TreeIndex {
        let index = self.push(value);
        if let Some(slot) = self.nodes.get_mut(parent.0) {
            match side {
                Side::Left => slot.left = Some(index),
                Side::Right => slot.right = Some(index),
            }
        }
        index
    }

    fn push(&mut self, value: i64) -> TreeIndex {
        let index = TreeIndex(self.nodes.len());
        self.nodes.push(TreeNode {
            value,
            left: None,
            right: None,
        });
        index
    }

    /// Number of levels: 0 for an empty tree, 1 for a lone root.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut deepest = 0;
        let mut pending: Vec<(TreeIndex, usize)> =
            self.root.into_iter().map(|root| (root, 1)).collect();
        while let Some((index, depth)) = pending.pop() {
            let Some(node) = self.node(index) else {
                continue;
            };
            deepest = deepest.max(depth);
            let below = depth.saturating_add(1);
            pending.extend(node.left.map(|child| (child, below)));
            pending.extend(node.right.map(|child| (child, below)));
        }
        deepest
    }

    /// Values in left-root-right order.
    #[must_use]
    pub fn values_in_order(&self) -> Vec<i64> {
        let mut values = Vec::with_capacity(self.nodes.len());
        let mut ancestors: Vec<&TreeNode> = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(node) = current.and_then(|index| self.node(index)) {
                ancestors.push(node);
                current = node.left;
            }
            let Some(node) = ancestors.pop() else {
                break;
            };
            values.push(node.value);
            current = node.right;
        }
        values
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    fn same_shape(&self, other: &Self) -> bool {
        let mut pending = vec![(self.root, other.root)];
        while let Some((mine, theirs)) = pending.pop() {
            match (
                mine.and_then(|index| self.node(index)),
                theirs.and_then(|index| other.node(index)),
            ) {
                (None, None) => {}
                (Some(left), Some(right)) if left.value == right.value => {
                    pending.push((left.left, right.left));
                    pending.push((left.right, right.right));
                }
                _ => return false,
            }
        }
        true
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.same_shape(other)
    }
}

impl Eq for Tree {}
