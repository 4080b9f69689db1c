// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Understory K-d Tree: build, nearest, range, and insert.

use understory_kdtree::KdTree;

fn main() {
    let mut tree = KdTree::build([[2, 3], [5, 4], [9, 6], [4, 7], [8, 1], [7, 2]])
        .expect("non-empty, consistent points");
    println!("built: {:?}", tree);

    // Nearest neighbor
    let (p, d) = tree.nearest_with_distance(&[9, 2]).expect("2-d query");
    println!("nearest to (9,2): {:?} at distance {:.3}", p, d);

    // Box query
    let hits = tree.range(&[0, 0], &[6, 6]).expect("2-d bounds");
    println!("in [0,6]x[0,6]: {:?}", hits);

    // Grow the tree
    tree.insert([1, 1]).expect("2-d point");
    let hits = tree.range(&[0, 0], &[1, 1]).expect("2-d bounds");
    println!("after insert, in [0,1]x[0,1]: {:?}", hits);

    // Wrong dimensionality is reported, not fatal.
    if let Err(e) = tree.nearest(&[1, 2, 3]) {
        println!("3-d query rejected: {e}");
    }
}
