// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`KdTree`] type: median-partition build, nearest, range, and insert.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;

use crate::error::KdTreeError;
use crate::iter::Iter;
use crate::node::{Link, Node};
use crate::types::{Scalar, check_dim, cmp_t, dist2, in_box, le, lt, sqrt};

/// Insert depths below this never trigger the degenerate-depth warning.
const DEPTH_WARN_FLOOR: usize = 32;

/// A k-d tree over points with `dim` coordinates of scalar type `T`.
///
/// Axis selection cycles with depth: a node at depth `d` splits on axis
/// `d % dim`. Points with a smaller coordinate on that axis live in the left
/// subtree; points with an equal or greater coordinate live in the right
/// subtree. Both [`build`](Self::build) and [`insert`](Self::insert) apply
/// this rule, so queries stay exact after any mix of the two.
///
/// Inserts never rebalance. Traversals use explicit stacks, so skewed trees
/// cost time but not call-stack depth.
pub struct KdTree<T> {
    root: Link<T>,
    dim: usize,
    len: usize,
}

impl<T: Scalar> KdTree<T> {
    /// Create an empty tree for points with `dim` coordinates.
    pub fn new(dim: usize) -> Result<Self, KdTreeError> {
        if dim == 0 {
            return Err(KdTreeError::ZeroDimension);
        }
        Ok(Self {
            root: None,
            dim,
            len: 0,
        })
    }

    /// Build a balanced tree from a batch of points.
    ///
    /// The dimensionality is taken from the first point. Fails with
    /// [`KdTreeError::EmptyInput`] for an empty batch and with
    /// [`KdTreeError::DimensionMismatch`] if any point has a different length.
    pub fn build<I, P>(points: I) -> Result<Self, KdTreeError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[T]>,
    {
        let points = collect_points(points);
        let dim = points
            .first()
            .map(|p| p.len())
            .ok_or(KdTreeError::EmptyInput)?;
        Self::from_boxed(dim, points)
    }

    /// Build a balanced tree with an explicit dimensionality.
    ///
    /// Unlike [`build`](Self::build), an empty batch yields an empty tree.
    pub fn build_with_dim<I, P>(dim: usize, points: I) -> Result<Self, KdTreeError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[T]>,
    {
        Self::from_boxed(dim, collect_points(points))
    }

    fn from_boxed(dim: usize, mut points: Vec<Box<[T]>>) -> Result<Self, KdTreeError> {
        let mut tree = Self::new(dim)?;
        for p in &points {
            check_dim(dim, p.len())?;
        }
        debug_assert!(
            points.iter().flat_map(|p| p.iter()).all(|c| c.partial_cmp(c).is_some()),
            "incomparable (NaN) coordinate"
        );
        tree.len = points.len();
        tree.root = build_root(&mut points, dim);

        let height = tree.height();
        if height > DEPTH_WARN_FLOOR && height > 2 * balanced_height(tree.len) {
            tracing::warn!(
                points = tree.len,
                height,
                "k-d tree built unbalanced; many points share split coordinates"
            );
        }
        tracing::debug!(points = tree.len, dim, height, "built k-d tree");
        Ok(tree)
    }

    /// Number of coordinates per point.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the tree stores no points.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of levels in the tree (0 when empty).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(&Node<T>, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((node, level)) = stack.pop() {
            height = height.max(level);
            for child in [node.left.as_deref(), node.right.as_deref()]
                .into_iter()
                .flatten()
            {
                stack.push((child, level + 1));
            }
        }
        height
    }

    /// Iterate stored points in order (left subtree, node, right subtree).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root.as_deref(), self.len)
    }

    /// The stored point closest to `query` by Euclidean distance.
    ///
    /// Among equidistant points the first one reached wins. Fails with
    /// [`KdTreeError::DimensionMismatch`] if `query` has the wrong length and
    /// with [`KdTreeError::EmptyTree`] if nothing is stored.
    pub fn nearest(&self, query: &[T]) -> Result<&[T], KdTreeError> {
        self.nearest_acc(query).map(|(p, _)| p)
    }

    /// Like [`nearest`](Self::nearest), also returning the Euclidean distance.
    pub fn nearest_with_distance(&self, query: &[T]) -> Result<(&[T], f64), KdTreeError> {
        self.nearest_acc(query)
            .map(|(p, d2)| (p, sqrt(T::acc_to_f64(d2))))
    }

    fn nearest_acc(&self, query: &[T]) -> Result<(&[T], T::Acc), KdTreeError> {
        check_dim(self.dim, query.len())?;
        let root = self.root.as_deref().ok_or(KdTreeError::EmptyTree)?;

        let mut best: (&[T], T::Acc) = (&*root.point, dist2(&root.point, query));
        // Each entry carries the squared distance from `query` to the splitting
        // plane that separates it from the side searched first, if any.
        let mut stack: Vec<(&Node<T>, usize, Option<T::Acc>)> = vec![(root, 0, None)];
        while let Some((node, depth, plane)) = stack.pop() {
            if let Some(plane) = plane
                && !lt(plane, best.1)
            {
                continue;
            }
            let d2 = dist2(&node.point, query);
            if lt(d2, best.1) {
                best = (&*node.point, d2);
            }

            let axis = depth % self.dim;
            let split = node.point[axis];
            let (near, far) = if lt(query[axis], split) {
                (&node.left, &node.right)
            } else {
                (&node.right, &node.left)
            };
            // Far side is pushed first so the near side is searched first.
            if let Some(far) = far.as_deref() {
                stack.push((far, depth + 1, Some(T::sq_diff(query[axis], split))));
            }
            if let Some(near) = near.as_deref() {
                stack.push((near, depth + 1, None));
            }
        }
        Ok(best)
    }

    /// All stored points `p` with `low[i] <= p[i] <= high[i]` on every axis.
    ///
    /// Results come in tree order (left subtree, node, right subtree), so
    /// repeated calls on an unchanged tree return the same sequence. An empty
    /// tree or inverted bounds yield an empty result.
    pub fn range(&self, low: &[T], high: &[T]) -> Result<Vec<&[T]>, KdTreeError> {
        check_dim(self.dim, low.len())?;
        check_dim(self.dim, high.len())?;

        let mut out = Vec::new();
        let mut stack: Vec<(&Node<T>, usize)> = Vec::new();
        let mut cursor = self.root.as_deref().map(|n| (n, 0));
        loop {
            // Walk down the left edge, skipping subtrees entirely below `low`.
            while let Some((node, depth)) = cursor {
                stack.push((node, depth));
                let axis = depth % self.dim;
                cursor = if le(low[axis], node.point[axis]) {
                    node.left.as_deref().map(|n| (n, depth + 1))
                } else {
                    None
                };
            }
            let Some((node, depth)) = stack.pop() else {
                break;
            };
            if in_box(&node.point, low, high) {
                out.push(&*node.point);
            }
            let axis = depth % self.dim;
            cursor = if le(node.point[axis], high[axis]) {
                node.right.as_deref().map(|n| (n, depth + 1))
            } else {
                None
            };
        }
        Ok(out)
    }

    /// Add a point. The tree is never rebalanced.
    ///
    /// Fails with [`KdTreeError::DimensionMismatch`] before touching the tree
    /// if `point` has the wrong length.
    pub fn insert<P: AsRef<[T]>>(&mut self, point: P) -> Result<(), KdTreeError> {
        let point = point.as_ref();
        let dim = self.dim;
        check_dim(dim, point.len())?;

        let mut depth = 0;
        let mut slot = &mut self.root;
        while let Some(node) = slot {
            let axis = depth % dim;
            slot = if lt(point[axis], node.point[axis]) {
                &mut node.left
            } else {
                &mut node.right
            };
            depth += 1;
        }
        *slot = Some(Box::new(Node::leaf(point.into())));
        self.len += 1;

        tracing::trace!(depth, points = self.len, "inserted point");
        if depth >= DEPTH_WARN_FLOOR && depth > 2 * balanced_height(self.len) {
            tracing::warn!(
                depth,
                points = self.len,
                "k-d tree insert depth is far above balanced; consider rebuilding"
            );
        }
        Ok(())
    }

    /// Whether a point equal to `point` is stored.
    pub fn contains(&self, point: &[T]) -> Result<bool, KdTreeError> {
        check_dim(self.dim, point.len())?;
        let mut depth = 0;
        let mut cursor = self.root.as_deref();
        while let Some(node) = cursor {
            if *node.point == *point {
                return Ok(true);
            }
            let axis = depth % self.dim;
            cursor = if lt(point[axis], node.point[axis]) {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
            depth += 1;
        }
        Ok(false)
    }

    /// Check the partition rule on every node and the stored point count.
    ///
    /// Intended for tests and debugging; costs O(n * dim).
    pub fn is_valid(&self) -> bool {
        let Some(root) = self.root.as_deref() else {
            return self.len == 0;
        };
        let mut count = 0;
        // Per-axis bounds: inclusive lower, exclusive upper.
        let mut stack: Vec<(&Node<T>, usize, Vec<(Option<T>, Option<T>)>)> =
            vec![(root, 0, vec![(None, None); self.dim])];
        while let Some((node, depth, bounds)) = stack.pop() {
            count += 1;
            if node.point.len() != self.dim {
                return false;
            }
            for (&c, &(lo, hi)) in node.point.iter().zip(&bounds) {
                if let Some(lo) = lo
                    && lt(c, lo)
                {
                    return false;
                }
                if let Some(hi) = hi
                    && !lt(c, hi)
                {
                    return false;
                }
            }
            let axis = depth % self.dim;
            let split = node.point[axis];
            if let Some(left) = node.left.as_deref() {
                let mut b = bounds.clone();
                b[axis].1 = Some(split);
                stack.push((left, depth + 1, b));
            }
            if let Some(right) = node.right.as_deref() {
                let mut b = bounds;
                b[axis].0 = Some(split);
                stack.push((right, depth + 1, b));
            }
        }
        count == self.len
    }
}

impl<T: Clone> Clone for KdTree<T> {
    fn clone(&self) -> Self {
        let mut root = None;
        if let Some(src) = self.root.as_deref() {
            let mut stack: Vec<(&mut Link<T>, &Node<T>)> = vec![(&mut root, src)];
            while let Some((slot, src)) = stack.pop() {
                let node = slot.insert(Box::new(Node::leaf(src.point.clone())));
                if let Some(left) = src.left.as_deref() {
                    stack.push((&mut node.left, left));
                }
                if let Some(right) = src.right.as_deref() {
                    stack.push((&mut node.right, right));
                }
            }
        }
        Self {
            root,
            dim: self.dim,
            len: self.len,
        }
    }
}

// Unlinks nodes one at a time; the derived drop would recurse once per level.
impl<T> Drop for KdTree<T> {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}

impl<T: Scalar> Debug for KdTree<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KdTree")
            .field("dim", &self.dim)
            .field("len", &self.len)
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl<'a, T: Scalar> IntoIterator for &'a KdTree<T> {
    type Item = &'a [T];
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn collect_points<T, I, P>(points: I) -> Vec<Box<[T]>>
where
    T: Scalar,
    I: IntoIterator<Item = P>,
    P: AsRef<[T]>,
{
    points.into_iter().map(|p| Box::from(p.as_ref())).collect()
}

/// `ceil(log2(n + 1))`: the height of a perfectly balanced tree with `n` points.
fn balanced_height(n: usize) -> usize {
    n.saturating_add(1).next_power_of_two().trailing_zeros() as usize
}

/// Index of the median after sorting on `axis`, moved down past equal
/// coordinates so everything before it is strictly less.
fn median_index<T: Scalar>(points: &[Box<[T]>], axis: usize) -> usize {
    let mid = points.len() / 2;
    let pivot = points[mid][axis];
    points[..mid].partition_point(|p| lt(p[axis], pivot))
}

/// Median-partition build over `points`, which is reordered in place and
/// left holding empty slices.
fn build_root<T: Scalar>(points: &mut [Box<[T]>], dim: usize) -> Link<T> {
    let mut root = None;
    let mut stack: Vec<(&mut Link<T>, &mut [Box<[T]>], usize)> = vec![(&mut root, points, 0)];
    while let Some((slot, points, depth)) = stack.pop() {
        if points.is_empty() {
            continue;
        }
        let axis = depth % dim;
        // Stable: ties keep their input order.
        points.sort_by(|a, b| cmp_t(&a[axis], &b[axis]));
        let mid = median_index(points, axis);
        let (left, rest) = points.split_at_mut(mid);
        let Some((median, right)) = rest.split_first_mut() else {
            continue;
        };
        let node = slot.insert(Box::new(Node::leaf(core::mem::take(median))));
        stack.push((&mut node.left, left, depth + 1));
        stack.push((&mut node.right, right, depth + 1));
    }
    root
}
