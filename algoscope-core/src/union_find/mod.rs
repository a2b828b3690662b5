//! Union-find (disjoint set) used by Kruskal's cycle check.
//!
//! `find` compresses the whole path it walks; `union` attaches the lower-rank
//! root beneath the higher-rank one. On equal ranks the right-hand root is
//! attached beneath the left-hand root, whose rank grows by one.

/// Disjoint sets over the dense ids `0..len`.
///
/// # Examples
/// ```
/// use algoscope_core::DisjointSet;
///
/// let mut sets = DisjointSet::new(3);
/// assert!(sets.union(0, 1));
/// assert!(!sets.union(1, 0));
/// assert_eq!(sets.find(1), 0);
/// assert_eq!(sets.components(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
    components: usize,
}

impl DisjointSet {
    /// Creates `len` singleton sets.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
            components: len,
        }
    }

    /// Number of elements tracked.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.parent.len() }

    /// Returns `true` when no elements are tracked.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.parent.is_empty() }

    /// Number of disjoint sets remaining.
    #[must_use]
    #[rustfmt::skip]
    pub const fn components(&self) -> usize { self.components }

    /// Returns the root of `node`'s set and repoints every node on the way
    /// directly at it.
    ///
    /// # Panics
    /// Panics if `node >= self.len()`.
    pub fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merges the sets holding `left` and `right`.
    ///
    /// Returns `false`, leaving the sets untouched, when both already share a
    /// root.
    ///
    /// # Panics
    /// Panics if either id is out of range.
    pub fn union(&mut self, left: usize, right: usize) -> bool {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return false;
        }

        let left_rank = self.rank[left_root];
        let right_rank = self.rank[right_root];
        if left_rank < right_rank {
            self.parent[left_root] = right_root;
        } else {
            self.parent[right_root] = left_root;
            if left_rank == right_rank {
                self.rank[left_root] = left_rank.saturating_add(1);
            }
        }
        self.components = self.components.saturating_sub(1);
        true
    }

    #[cfg(test)]
    fn parent_of(&self, node: usize) -> usize {
        self.parent[node]
    }

    #[cfg(test)]
    fn rank_of(&self, node: usize) -> u8 {
        self.rank[node]
    }
}
