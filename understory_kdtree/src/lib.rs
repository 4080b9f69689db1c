// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory K-d Tree: a median-partitioned spatial index over k-dimensional points.
//!
//! Understory K-d Tree is a building block for point proximity queries.
//!
//! - Build a balanced tree from a batch of points with [`KdTree::build`].
//! - Find the nearest stored point to a query with [`KdTree::nearest`].
//! - Collect every point inside an axis-aligned box with [`KdTree::range`].
//! - Grow the tree one point at a time with [`KdTree::insert`] (never rebalanced).
//!
//! It is generic over the coordinate scalar `T` (`f32`, `f64`, `i32`, `i64`) and
//! does not depend on any geometry crate. Dimensionality is fixed per tree at
//! construction; every operand must match it or the call fails with
//! [`KdTreeError::DimensionMismatch`] without touching the tree.
//!
//! # Example
//!
//! ```rust
//! use understory_kdtree::KdTree;
//!
//! let mut tree = KdTree::build([[2, 3], [5, 4], [9, 6], [4, 7], [8, 1], [7, 2]]).unwrap();
//!
//! // Nearest neighbor by Euclidean distance.
//! assert_eq!(tree.nearest(&[9, 2]).unwrap(), &[8, 1]);
//!
//! // Inclusive box query; (4, 7) is above the box.
//! let hits = tree.range(&[0, 0], &[6, 6]).unwrap();
//! assert_eq!(hits, [&[2, 3][..], &[5, 4][..]]);
//!
//! // Insert and find it again.
//! tree.insert([1, 1]).unwrap();
//! assert!(tree.range(&[0, 0], &[1, 1]).unwrap().contains(&&[1, 1][..]));
//! ```
//!
//! ## Partitioning
//!
//! A node at depth `d` splits on axis `d % k`. Build sorts each subset on that
//! axis and takes the median; points whose coordinate is strictly smaller than
//! the node's go left, the rest go right. Insert descends with the same rule,
//! so nearest and range stay exact after inserts. Inserts do not rebalance;
//! rebuild with [`KdTree::build`] if many skewed inserts make the tree deep.
//!
//! ### Float semantics
//!
//! NaN coordinates are not supported: building sorts on each axis, which needs a
//! total order. Debug builds assert on NaN input.
//!
//! Squared distances use widened accumulators (`f32`→`f64`, `i32`→`u128`,
//! `i64`→[`WideSum`]). Integer distances are exact over the full coordinate range.
//!
//! ## Features
//!
//! - `std` (default): use the standard library for float math.
//! - `libm`: use `libm` for float math on `no_std` targets.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_kdtree requires either the `std` or `libm` feature");

pub mod error;
pub mod iter;
mod node;
pub mod tree;
pub mod types;

pub use error::KdTreeError;
pub use iter::Iter;
pub use tree::KdTree;
pub use types::{Scalar, ScalarAcc, WideSum, distance, distance_squared, in_range};
