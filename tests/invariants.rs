//! # Invariant Testing for the AVL Set
//!
//! This module drives the tree into each rebalancing case explicitly and
//! validates its structure afterwards. It focuses on:
//!
//! - Each of the four rotations, triggered by insertion and by deletion
//! - Deletion of leaves, single-child nodes and two-child nodes
//! - Randomized operations with invariant validation after every step

use avlset::AvlTree;
use rand::prelude::*;

fn build(values: &[i32]) -> AvlTree<i32> {
	let set: AvlTree<i32> = AvlTree::new();
	for &v in values {
		assert!(set.add(v), "{} added twice", v);
		set.assert_invariants();
	}
	set
}

// ===========================================================================
// Insertion Rotations
// ===========================================================================

/// Ascending runs are right-heavy and resolved by small left rotations.
#[test]
fn ascending_inserts_rotate_left() {
	let set = build(&[9, 10, 14, 16]);
	assert_eq!(set.to_vec(), vec![9, 10, 14, 16]);
	// Four balanced elements fit in height 3.
	assert_eq!(set.height(), 3);
}

/// Descending runs mirror the ascending case.
#[test]
fn descending_inserts_rotate_right() {
	let set = build(&[16, 14, 10, 9]);
	assert_eq!(set.to_vec(), vec![9, 10, 14, 16]);
	assert_eq!(set.height(), 3);
}

/// 30 lands left of 50 under a right-heavy 10, forcing a double rotation.
#[test]
fn right_left_shape_uses_large_left_rotation() {
	let set = build(&[10, 2, 50, 1, 30, 100, 150, 80, 90]);
	assert_eq!(set.to_vec(), vec![1, 2, 10, 30, 50, 80, 90, 100, 150]);
	assert!(set.height() <= 4, "height {} too large for 9 elements", set.height());
}

#[test]
fn left_right_shape_uses_large_right_rotation() {
	let set = build(&[50, 80, 10, 90, 5, 30, 20, 40, 25]);
	assert_eq!(set.to_vec(), vec![5, 10, 20, 25, 30, 40, 50, 80, 90]);
	assert!(set.height() <= 4);
}

#[test]
fn long_sequential_runs() {
	let up = build(&(0..500).collect::<Vec<_>>());
	assert!(up.height() <= 10, "height {} for 500 ascending inserts", up.height());

	let down = build(&(0..500).rev().collect::<Vec<_>>());
	assert!(down.height() <= 10, "height {} for 500 descending inserts", down.height());
}

/// Zig-zag insertion alternates between the two double rotations.
#[test]
fn zig_zag_inserts() {
	let mut values = Vec::new();
	for i in 0..100 {
		values.push(i);
		values.push(1000 - i);
	}
	let set = build(&values);
	assert_eq!(set.len(), 200);
}

// ===========================================================================
// Deletion Cases
// ===========================================================================

#[test]
fn delete_leaf() {
	let set = build(&[20, 10, 30]);
	assert!(set.remove(&10));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![20, 30]);
}

#[test]
fn delete_node_with_left_child_only() {
	let set = build(&[20, 10, 30, 5]);
	assert!(set.remove(&10));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![5, 20, 30]);
}

#[test]
fn delete_node_with_right_child_only() {
	let set = build(&[20, 10, 30, 35]);
	assert!(set.remove(&30));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![10, 20, 35]);
}

#[test]
fn delete_node_with_two_children() {
	let set = build(&[20, 10, 30, 5, 15, 25, 35]);
	assert!(set.remove(&10));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![5, 15, 20, 25, 30, 35]);

	assert!(set.remove(&20));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![5, 15, 25, 30, 35]);
}

#[test]
fn delete_root_of_single_node_tree() {
	let set = build(&[1]);
	assert!(set.remove(&1));
	set.assert_invariants();
	assert!(set.is_empty());
	assert_eq!(set.height(), 0);
	assert_eq!(set.first(), Err(avlset::Error::NotFound));
}

#[test]
fn delete_absent_value_is_noop() {
	let set = build(&[1, 2, 3]);
	assert!(!set.remove(&4));
	assert_eq!(set.len(), 3);
	set.assert_invariants();
}

// ===========================================================================
// Deletion Rotations
// ===========================================================================

/// Removing from the short side of a node leaves it right-heavy.
#[test]
fn delete_triggers_small_left_rotation() {
	let set = build(&[20, 10, 30, 40]);
	assert!(set.remove(&10));
	set.assert_invariants();
	assert_eq!(set.height(), 2);
}

#[test]
fn delete_triggers_large_left_rotation() {
	let set = build(&[20, 10, 30, 25]);
	assert!(set.remove(&10));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![20, 25, 30]);
	assert_eq!(set.height(), 2);
}

#[test]
fn delete_triggers_small_right_rotation() {
	let set = build(&[20, 10, 30, 5]);
	assert!(set.remove(&30));
	set.assert_invariants();
	assert_eq!(set.height(), 2);
}

#[test]
fn delete_triggers_large_right_rotation() {
	let set = build(&[20, 10, 30, 15]);
	assert!(set.remove(&30));
	set.assert_invariants();
	assert_eq!(set.to_vec(), vec![10, 15, 20]);
	assert_eq!(set.height(), 2);
}

/// A deletion deep in the tree can require rotations at several levels.
#[test]
fn delete_cascades_rotations_upward() {
	// Fibonacci-shaped tree: every node is as unbalanced as allowed.
	let set = build(&[8, 5, 11, 3, 7, 10, 12, 2, 4, 6, 9, 1]);
	let height = set.height();
	assert!(set.remove(&12));
	set.assert_invariants();
	assert!(set.height() <= height);
}

// ===========================================================================
// Randomized Stress
// ===========================================================================

#[test]
fn random_mixed_operations() {
	let set: AvlTree<i32> = AvlTree::new();
	let mut rng = StdRng::seed_from_u64(0xA71);

	for _ in 0..5_000 {
		let v = rng.random_range(0..500);
		if rng.random_bool(0.6) {
			set.add(v);
		} else {
			set.remove(&v);
		}
		set.assert_invariants();
	}
}

#[test]
fn removal_in_random_order_keeps_balance() {
	let mut values: Vec<i32> = (0..2_000).collect();
	let set: AvlTree<i32> = values.iter().copied().collect();
	set.assert_invariants();

	let mut rng = StdRng::seed_from_u64(7);
	values.shuffle(&mut rng);

	for (removed, v) in values.iter().enumerate() {
		let before = set.height();
		assert!(set.remove(v));
		assert!(set.height() <= before, "height grew after removing {}", v);
		if removed % 97 == 0 {
			set.assert_invariants();
		}
	}
	assert!(set.is_empty());
	set.assert_invariants();
}
