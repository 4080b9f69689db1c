// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by all tree operations.

use thiserror::Error;

/// Errors returned by [`KdTree`](crate::KdTree) operations and point helpers.
///
/// Every failing call returns before touching the tree, so the tree remains
/// usable afterwards.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum KdTreeError {
    /// A point's length does not match the tree's dimensionality (or the
    /// other operand's length).
    #[error("dimension mismatch: expected {expected} coordinates, found {found}")]
    DimensionMismatch {
        /// Required number of coordinates.
        expected: usize,
        /// Number of coordinates supplied.
        found: usize,
    },
    /// A nearest-neighbor query was issued against a tree with no points.
    #[error("query on an empty tree")]
    EmptyTree,
    /// [`KdTree::build`](crate::KdTree::build) was given zero points, so the
    /// dimensionality cannot be inferred.
    #[error("cannot infer dimensionality from an empty point set")]
    EmptyInput,
    /// Points must have at least one coordinate.
    #[error("points must have at least one coordinate")]
    ZeroDimension,
}
