//! The R-tree: a height-balanced index over integer point tuples, with
//! Guttman's quadratic node split.

use generational_arena::Arena;
pub use generational_arena::Index;

use std::borrow::Cow;

use thiserror::Error;
use tracing::{debug, info};

pub use node::{Node, NodeEntries};

use crate::geometry::{check_dimensions_match, Bounds, GeometryError, IntoBounds, IntoTuple, Tuple};

mod node;
pub mod rendering;

/// Errors raised when tree parameters are rejected at construction.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("dimension must be at least 1")]
    InvalidDimension,
    #[error("fan-out must be at least 2, got {max_entries}")]
    InvalidFanOut { max_entries: usize },
    #[error("minimum fill must satisfy 1 <= m <= ceil(M / 2), got m = {min_entries}, M = {max_entries}")]
    InvalidMinimumFill {
        min_entries: usize,
        max_entries: usize,
    },
}

/// One entry being redistributed by a node split.
///
/// The leaf and internal cases run the same quadratic distribution: a
/// leaf distributes its tuples (each standing in as a degenerate point
/// box), an internal node distributes its children.
#[derive(Debug)]
enum SplitEntry {
    Tuple(Tuple),
    Child(Index),
}

#[derive(Debug)]
pub struct RTree {
    /// Nodes are stored in a generational arena.
    nodes: Arena<Node>,

    /// The index of the root node, or `None` while the tree is empty.
    root: Option<Index>,

    /// The number of dimensions of the indexed tuples.
    dimension: usize,

    /// The minimum number of entries a non-root node can hold.
    min_entries: usize,

    /// The maximum number of entries a node can hold.
    max_entries: usize,

    /// The number of tuples stored in the tree.
    len: usize,
}

impl RTree {
    /// Creates a new, empty [`RTree`] for `dimension`-dimensional tuples
    /// whose nodes hold between `min_entries` and `max_entries` entries.
    ///
    /// # Errors
    /// This function will return an error unless `dimension >= 1`,
    /// `max_entries >= 2` and `1 <= min_entries <= ceil(max_entries / 2)`.
    ///
    /// # Example
    /// ```rust
    /// use gridindex::RTree;
    ///
    /// let tree = RTree::new(2, 2, 4).unwrap();
    /// assert!(tree.is_empty());
    ///
    /// // a minimum fill above half the fan-out is rejected
    /// assert!(RTree::new(2, 3, 4).is_err());
    /// ```
    pub fn new(
        dimension: usize,
        min_entries: usize,
        max_entries: usize,
    ) -> Result<Self, ConfigError> {
        if dimension == 0 {
            return Err(ConfigError::InvalidDimension);
        }
        if max_entries < 2 {
            return Err(ConfigError::InvalidFanOut { max_entries });
        }
        if min_entries == 0 || min_entries > (max_entries + 1) / 2 {
            return Err(ConfigError::InvalidMinimumFill {
                min_entries,
                max_entries,
            });
        }

        info!(
            "creating R-tree (d = {}, m = {}, M = {})",
            dimension, min_entries, max_entries
        );

        Ok(Self {
            nodes: Arena::new(),
            root: None,
            dimension,
            min_entries,
            max_entries,
            len: 0,
        })
    }

    /// Returns the number of dimensions of the indexed tuples.
    #[inline(always)]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the minimum number of entries a non-root node can hold.
    #[inline(always)]
    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    /// Returns the maximum number of entries a node can hold.
    #[inline(always)]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Returns the number of tuples stored in the tree, counting
    /// duplicates with their multiplicity.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no tuple has been inserted yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Inserts a tuple into the tree.
    ///
    /// # Errors
    /// This function will return an error if the tuple does not have the
    /// same dimension as this tree.
    ///
    /// # Example
    /// ```rust
    /// use gridindex::RTree;
    ///
    /// let mut tree = RTree::new(2, 2, 4).unwrap();
    /// for x in 0..8 {
    ///     for y in 0..8 {
    ///         tree.insert((x, y)).unwrap();
    ///     }
    /// }
    /// assert_eq!(tree.len(), 64);
    ///
    /// // a tuple of the wrong dimension is rejected
    /// assert!(tree.insert(vec![1, 2, 3]).is_err());
    /// # tree.validate_consistency();
    /// ```
    pub fn insert<T: IntoTuple>(&mut self, tuple: T) -> Result<(), GeometryError> {
        let tuple = tuple.into_tuple();
        check_dimensions_match(self.dimension, tuple.dimension())?;

        debug!("inserting {}", tuple);

        match self.root {
            // The very first tuple becomes a one-entry leaf root.
            None => {
                let mut leaf = Node::new_leaf(self.dimension);
                leaf.add_tuple(tuple);
                self.root = Some(self.nodes.insert(leaf));
            }
            Some(root) => {
                let leaf = self.choose_leaf(root, &tuple);

                let sibling = if self.get_node(leaf).entry_count() < self.max_entries {
                    self.get_node_mut(leaf).add_tuple(tuple);
                    None
                } else {
                    debug!("leaf is full, splitting");
                    Some(self.quadratic_split(leaf, SplitEntry::Tuple(tuple)))
                };

                // Repair bounds up to the root, absorbing the split
                // sibling along the way.
                let carried = self.adjust_tree(leaf, sibling);

                if let Some(sibling) = carried {
                    // The split reached the root: the tree grows a level.
                    //
                    //                      new root
                    //                       /    \
                    //     root     =>    root   sibling
                    //     / | \          / | \   /  \
                    //
                    debug!("root split, growing the tree by one level");
                    let new_root = self.nodes.insert(Node::new_internal(self.dimension));
                    self.attach_child(new_root, root);
                    self.attach_child(new_root, sibling);
                    self.root = Some(new_root);
                } else if !self.get_node(root).is_leaf() {
                    self.retighten(root);
                }
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Returns every tuple lying inside the query bounds, with
    /// duplicates repeated to their multiplicity. The result order is
    /// unspecified. Searching an empty tree returns an empty vector.
    ///
    /// # Errors
    /// This function will return an error if the query does not have the
    /// same dimension as this tree.
    ///
    /// # Example
    /// ```rust
    /// use gridindex::RTree;
    ///
    /// let mut tree = RTree::new(2, 2, 4).unwrap();
    /// tree.insert((0, 0)).unwrap();
    /// tree.insert((10, 0)).unwrap();
    /// tree.insert((0, 10)).unwrap();
    ///
    /// // tuples on the query boundary are included
    /// assert_eq!(tree.search(((0, 0), (10, 0))).unwrap().len(), 2);
    ///
    /// // a disjoint window finds nothing
    /// assert!(tree.search(((20, 20), (30, 30))).unwrap().is_empty());
    /// # tree.validate_consistency();
    /// ```
    pub fn search<'q, B: IntoBounds<'q>>(&self, query: B) -> Result<Vec<&Tuple>, GeometryError> {
        let query = query.into_bounds();
        check_dimensions_match(self.dimension, query.dimension())?;

        let mut hits = Vec::new();
        if let Some(root) = self.root {
            self.collect_in_bounds(root, &query, &mut hits);
        }

        Ok(hits)
    }

    /// Recursively collects the tuples inside `query`, pruning every
    /// subtree whose bounds do not intersect it.
    fn collect_in_bounds<'t>(&'t self, index: Index, query: &Bounds, hits: &mut Vec<&'t Tuple>) {
        let node = self.get_node(index);
        if !query
            .intersects(node.bounds())
            .expect("tree nodes share the tree dimension")
        {
            return;
        }

        match node.entries() {
            NodeEntries::Tuples(tuples) => {
                for tuple in tuples {
                    if query
                        .contains(tuple)
                        .expect("tree nodes share the tree dimension")
                    {
                        hits.push(tuple);
                    }
                }
            }
            NodeEntries::Children(children) => {
                for &child in children {
                    self.collect_in_bounds(child, query, hits);
                }
            }
        }
    }

    /// Guttman's ChooseLeaf: descends from `index` to the leaf whose
    /// bounds grow the least by taking `tuple`. Ties go to the child with
    /// the smaller area, then to the earlier child. The local metric is
    /// final; deeper levels are not consulted.
    fn choose_leaf(&self, index: Index, tuple: &Tuple) -> Index {
        let node = self.get_node(index);
        let children = match node.entries() {
            NodeEntries::Tuples(_) => return index,
            NodeEntries::Children(children) => children,
        };

        let mut best_position = 0;
        let mut best_enlargement = i64::MAX;
        let mut best_area = i64::MAX;
        for (position, &child) in children.iter().enumerate() {
            let bounds = self.get_node(child).bounds();
            let enlargement = bounds
                .enlargement_for(tuple)
                .expect("tree nodes share the tree dimension");

            if enlargement < best_enlargement {
                best_position = position;
                best_enlargement = enlargement;
                best_area = bounds.area();
            } else if enlargement == best_enlargement {
                let area = bounds.area();
                if area < best_area {
                    best_position = position;
                    best_area = area;
                }
            }
        }

        self.choose_leaf(children[best_position], tuple)
    }

    /// Guttman's AdjustTree: repairs bounds from `index` up to the root
    /// after an insertion, linking `sibling` (a node just split off
    /// `index`, if any) into the parent chain. Every ancestor is
    /// re-tightened on the way up: a split can replace a wide child with
    /// two tighter halves, so growing the parent on attach alone is not
    /// enough.
    ///
    /// Returns the sibling to pair with the old root if a split
    /// propagated past it.
    fn adjust_tree(&mut self, index: Index, sibling: Option<Index>) -> Option<Index> {
        let Some(parent) = self.get_node(index).parent() else {
            return sibling;
        };

        let propagated = match sibling {
            None => None,
            Some(sibling) => {
                if self.get_node(parent).entry_count() < self.max_entries {
                    self.attach_child(parent, sibling);
                    None
                } else {
                    debug!("split propagates, splitting the parent");
                    Some(self.quadratic_split(parent, SplitEntry::Child(sibling)))
                }
            }
        };

        self.retighten(parent);
        self.adjust_tree(parent, propagated)
    }

    /// Splits the full node at `index`, which must absorb one `excess`
    /// entry beyond its capacity, by quadratic-cost redistribution:
    ///
    /// ```text
    ///      parent                 parent
    ///        |                      |
    ///       node        =>        node      sibling
    ///      / | | \               /    \      /   \
    /// ```
    ///
    /// The node keeps its identity and parent link and ends up with one
    /// group; the returned sibling holds the other group and has no
    /// parent until the caller links it in. Both groups respect the
    /// minimum fill.
    fn quadratic_split(&mut self, index: Index, excess: SplitEntry) -> Index {
        debug_assert_eq!(self.get_node(index).entry_count(), self.max_entries);

        // Working list: the excess entry first, then the node's entries
        // in their current order.
        let mut pool: Vec<SplitEntry> = Vec::with_capacity(self.max_entries + 1);
        pool.push(excess);

        let dimension = self.dimension;
        let sibling = if self.get_node(index).is_leaf() {
            let node = self.get_node_mut(index);
            pool.extend(node.clear_tuples().into_iter().map(SplitEntry::Tuple));
            Node::new_leaf(dimension)
        } else {
            let node = self.get_node_mut(index);
            pool.extend(node.clear_children().into_iter().map(SplitEntry::Child));
            Node::new_internal(dimension)
        };
        let sibling = self.nodes.insert(sibling);

        // Seed both groups; the later index is removed first so the
        // earlier one stays valid.
        let (first, second) = self.pick_seeds(&pool);
        let second_seed = pool.remove(second);
        let first_seed = pool.remove(first);
        self.assign_split_entry(index, first_seed);
        self.assign_split_entry(sibling, second_seed);

        while !pool.is_empty() {
            let kept = self.get_node(index).entry_count();
            let split_off = self.get_node(sibling).entry_count();

            // Forced assignment: once a group needs every remaining entry
            // to reach the minimum fill, it takes them in order.
            if kept + pool.len() == self.min_entries && split_off >= self.min_entries {
                let entry = pool.remove(0);
                self.assign_split_entry(index, entry);
            } else if split_off + pool.len() == self.min_entries && kept >= self.min_entries {
                let entry = pool.remove(0);
                self.assign_split_entry(sibling, entry);
            } else {
                let (position, to_sibling) = self.pick_next(index, sibling, &pool);
                let entry = pool.remove(position);
                self.assign_split_entry(if to_sibling { sibling } else { index }, entry);
            }
        }

        sibling
    }

    /// Guttman's PickSeeds: of all unordered entry pairs, the one wasting
    /// the most area when boxed together. The first maximum encountered
    /// wins, so ties break to the lexicographically earliest pair.
    fn pick_seeds(&self, pool: &[SplitEntry]) -> (usize, usize) {
        debug_assert!(pool.len() >= 2);

        let mut worst_pair = (0, 1);
        let mut worst_waste = i64::MIN;
        for i in 0..pool.len() {
            let i_bounds = self.split_entry_bounds(&pool[i]);
            let i_area = i_bounds.area();
            for j in (i + 1)..pool.len() {
                let j_bounds = self.split_entry_bounds(&pool[j]);
                let waste = i_bounds
                    .combine(&j_bounds)
                    .expect("tree nodes share the tree dimension")
                    .area()
                    - i_area
                    - j_bounds.area();

                if waste > worst_waste {
                    worst_waste = waste;
                    worst_pair = (i, j);
                }
            }
        }

        worst_pair
    }

    /// Guttman's PickNext: the entry with the strongest preference
    /// between the two groups, i.e. the largest difference between the
    /// enlargements either group would pay to take it. The first maximum
    /// encountered wins. The entry goes to the group paying less; a tie
    /// on enlargement keeps it in the group seeded in the original node.
    fn pick_next(&self, kept: Index, sibling: Index, pool: &[SplitEntry]) -> (usize, bool) {
        let kept_bounds = self.get_node(kept).bounds();
        let sibling_bounds = self.get_node(sibling).bounds();

        let mut best_position = 0;
        let mut best_difference = i64::MIN;
        let mut to_sibling = false;
        for (position, entry) in pool.iter().enumerate() {
            let bounds = self.split_entry_bounds(entry);
            let kept_enlargement = kept_bounds
                .enlargement(&bounds)
                .expect("tree nodes share the tree dimension");
            let sibling_enlargement = sibling_bounds
                .enlargement(&bounds)
                .expect("tree nodes share the tree dimension");

            let difference = (kept_enlargement - sibling_enlargement).abs();
            if difference > best_difference {
                best_position = position;
                best_difference = difference;
                to_sibling = kept_enlargement > sibling_enlargement;
            }
        }

        (best_position, to_sibling)
    }

    /// Returns the bounds of a split entry: the node bounds for a child,
    /// a degenerate point box for a tuple.
    fn split_entry_bounds<'a>(&'a self, entry: &'a SplitEntry) -> Cow<'a, Bounds> {
        match entry {
            SplitEntry::Tuple(tuple) => Cow::Owned(Bounds::from_tuple(tuple)),
            SplitEntry::Child(child) => Cow::Borrowed(self.get_node(*child).bounds()),
        }
    }

    /// Hands a split entry to one side of a split.
    fn assign_split_entry(&mut self, side: Index, entry: SplitEntry) {
        match entry {
            SplitEntry::Tuple(tuple) => self.get_node_mut(side).add_tuple(tuple),
            SplitEntry::Child(child) => self.attach_child(side, child),
        }
    }

    /// Makes `child` a child of `parent`, updating the child's parent
    /// back-reference and growing the parent's bounds.
    fn attach_child(&mut self, parent: Index, child: Index) {
        self.get_node_mut(child).set_parent(parent);
        let child_bounds = self.get_node(child).bounds().clone();

        // This call is fine because `child` now has its parent attribute
        // set to `parent`.
        self.get_node_mut(parent)
            .add_child_unsafe(child, &child_bounds);
    }

    /// Recomputes the bounds of the node at `index` as the tight union
    /// over its entries.
    fn retighten(&mut self, index: Index) {
        let tight = self.tight_bounds(index);

        // This call is fine because `tight` covers every entry by
        // construction.
        self.get_node_mut(index).set_bounds_unsafe(tight);
    }

    /// Returns the tight union bounds over the entries of the node at
    /// `index`.
    fn tight_bounds(&self, index: Index) -> Bounds {
        let node = self.get_node(index);
        let mut bounds = Bounds::empty(self.dimension);
        match node.entries() {
            NodeEntries::Tuples(tuples) => {
                for tuple in tuples {
                    bounds.extend(tuple);
                }
            }
            NodeEntries::Children(children) => {
                for &child in children {
                    bounds.combine_in_place(self.get_node(child).bounds());
                }
            }
        }

        bounds
    }

    /// Returns a reference to the [`Node`] with index `index`.
    ///
    /// # Panics
    /// This function will panic if `index` does not refer to a node in
    /// this tree.
    #[inline(always)]
    pub fn get_node(&self, index: Index) -> &Node {
        &self.nodes[index]
    }

    /// Returns a mutable reference to the [`Node`] with index `index`.
    ///
    /// # Panics
    /// This function will panic if `index` does not refer to a node in
    /// this tree.
    #[inline(always)]
    fn get_node_mut(&mut self, index: Index) -> &mut Node {
        &mut self.nodes[index]
    }

    /// Returns the index of the root node, or `None` while the tree is
    /// empty.
    #[inline(always)]
    pub fn root_index(&self) -> Option<Index> {
        self.root
    }

    /// Validates the structural invariants of the tree. In particular,
    /// this function checks that:
    ///
    /// - every node's bounds are the tight union over its entries,
    /// - every non-root node holds between `min_entries` and
    ///   `max_entries` entries, a leaf root at least 1 and an internal
    ///   root at least 2,
    /// - all leaves sit at the same depth,
    /// - every child's parent back-reference names the node listing it,
    /// - no unreachable nodes linger in the arena.
    ///
    /// # Panics
    /// This function will panic if any invariant is violated.
    pub fn validate_consistency(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.nodes.len(), 0, "empty tree retains nodes");
            return;
        };
        assert!(self.get_node(root).parent().is_none(), "root has a parent");

        let mut node_counter = 0;
        let mut leaf_depth = None;
        self.check_subtree(root, root, 0, &mut node_counter, &mut leaf_depth);

        // check we have the expected number of nodes
        assert_eq!(
            node_counter,
            self.nodes.len(),
            "unreachable nodes left in the arena"
        );
    }

    /// Recursively validates the subtree rooted at `index`.
    fn check_subtree(
        &self,
        index: Index,
        root: Index,
        depth: usize,
        node_counter: &mut usize,
        leaf_depth: &mut Option<usize>,
    ) {
        *node_counter += 1;

        let node = self.get_node(index);
        let count = node.entry_count();
        if index == root {
            let minimum = if node.is_leaf() { 1 } else { 2 };
            assert!(
                count >= minimum && count <= self.max_entries,
                "root fill out of range: {count}"
            );
        } else {
            assert!(
                count >= self.min_entries && count <= self.max_entries,
                "node fill out of range: {count}"
            );
        }

        assert_eq!(
            node.bounds(),
            &self.tight_bounds(index),
            "node bounds are not tight"
        );

        match node.entries() {
            NodeEntries::Tuples(_) => match leaf_depth {
                None => *leaf_depth = Some(depth),
                Some(expected) => assert_eq!(*expected, depth, "leaves at different depths"),
            },
            NodeEntries::Children(children) => {
                for &child in children {
                    // does every child have its parent attribute set correctly?
                    assert_eq!(
                        self.get_node(child).parent(),
                        Some(index),
                        "child parent link broken"
                    );
                    self.check_subtree(child, root, depth + 1, node_counter, leaf_depth);
                }
            }
        }
    }

    /// Returns a vector of pairs `(Index, Index)` corresponding to all
    /// edges in this tree. The edges are always of the form
    /// `(Parent, Child)`.
    #[cfg(feature = "graphviz")]
    #[inline(always)]
    fn collect_edges(&self) -> Vec<(Index, Index)> {
        let mut edges = Vec::new();
        if let Some(root) = self.root {
            self._collect_edges(&mut edges, root);
        }

        edges
    }

    /// Recursively extends `buffer` with all edges below the given node.
    #[cfg(feature = "graphviz")]
    fn _collect_edges(&self, buffer: &mut Vec<(Index, Index)>, index: Index) {
        if let NodeEntries::Children(children) = self.get_node(index).entries() {
            for &child in children {
                buffer.push((index, child));
                self._collect_edges(buffer, child);
            }
        }
    }
}
