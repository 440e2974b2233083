//! `gridindex` is an in-memory spatial index for point tuples in
//! d-dimensional signed-integer space.
//!
//! The index is a Guttman R-tree with quadratic node splitting: a
//! height-balanced tree whose internal nodes carry minimum bounding
//! rectangles over their subtrees and whose leaves hold the indexed
//! tuples. It supports bulk insertion of points and orthogonal range
//! (window) queries.
//!
//! # Example
//! ```rust
//! use gridindex::RTree;
//!
//! // A 2-dimensional tree holding between 2 and 4 entries per node.
//! let mut tree = RTree::new(2, 2, 4).unwrap();
//! tree.insert((0, 0)).unwrap();
//! tree.insert((4, 7)).unwrap();
//! tree.insert((-3, 2)).unwrap();
//!
//! let hits = tree.search(((-1, -1), (5, 8))).unwrap();
//! assert_eq!(hits.len(), 2);
//! # tree.validate_consistency();
//! ```

pub mod geometry;
pub mod rtree;

pub use crate::geometry::{Bounds, Tuple};
pub use crate::rtree::RTree;
