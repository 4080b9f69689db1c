// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree cell holding one point and its owned children.

use alloc::boxed::Box;

/// Owned child slot.
pub(crate) type Link<T> = Option<Box<Node<T>>>;

/// One stored point and up to two exclusively owned subtrees.
///
/// Nodes carry no behavior; traversal and validation live in [`KdTree`](crate::KdTree).
#[derive(Debug)]
pub(crate) struct Node<T> {
    pub(crate) point: Box<[T]>,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    pub(crate) fn new(point: Box<[T]>, left: Link<T>, right: Link<T>) -> Self {
        Self { point, left, right }
    }

    pub(crate) fn leaf(point: Box<[T]>) -> Self {
        Self::new(point, None, None)
    }
}
