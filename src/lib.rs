//! # avlset: A Height-Balanced Ordered Set
//!
//! This crate provides an ordered set backed by an AVL tree: a binary search
//! tree that keeps, for every node, the heights of its two subtrees within one
//! of each other. Lookups, insertions and deletions are O(log n) in the worst
//! case, independent of insertion order.
//!
//! ## Design Overview
//!
//! **Arena Nodes**: Nodes live in an index arena. Child links are the owning
//! direction of the tree; every node also records the index of its parent,
//! which is used solely to walk back up after a structural change.
//!
//! **Upward Rebalancing**: After a node is attached or unlinked, every
//! ancestor from the point of change up to the root has its cached height
//! refreshed and, if its subtrees differ in height by two, is repaired with
//! one of four rotations (small/large, left/right).
//!
//! **Shared Handles**: A set's state sits behind a single lock. Range views
//! and iterators hold handles to that state rather than borrows, so they stay
//! live: a change made through any handle is visible through all others on
//! their next operation.
//!
//! ### Tree Structure
//!
//! ```text
//!                 ┌──────────────────────┐
//!                 │ GenericAvlTree<T, C> │  <- handle; cheap to share
//!                 └──────────┬───────────┘
//!                            │ Arc<RwLock<..>>
//!                            ▼
//!                 ┌──────────────────────┐
//!                 │    RawTree<T, C>     │  <- root, comparator, stamp
//!                 │  Arena<Node<T>>      │
//!                 └──────────┬───────────┘
//!                            │
//!                  ┌─────────┴─────────┐
//!                  ▼                   ▼
//!             ┌─────────┐         ┌─────────┐
//!             │  Node   │ ◄─ ─ ─  │  Node   │  <- parent: back-index only
//!             │ value   │         │ value   │
//!             │ height  │         │ height  │
//!             └─────────┘         └─────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use avlset::AvlTree;
//!
//! let set: AvlTree<i32> = AvlTree::new();
//!
//! assert!(set.add(50));
//! assert!(set.add(10));
//! assert!(set.add(30));
//! assert!(!set.add(30)); // already present
//!
//! assert!(set.contains(&10));
//! assert_eq!(set.first(), Ok(10));
//! assert_eq!(set.last(), Ok(50));
//!
//! let values: Vec<i32> = set.iter().collect();
//! assert_eq!(values, vec![10, 30, 50]);
//!
//! // Views are live windows onto the same set
//! let low = set.head_set(40);
//! assert_eq!(low.len(), 2);
//! set.add(20);
//! assert_eq!(low.len(), 3);
//! ```
//!
//! ## Thread Safety
//!
//! Every operation takes the set's lock once and holds it for its whole
//! duration, so a set may be shared across threads when `T` and `C` allow
//! it. The lock is coarse: operations are serialized, not concurrent.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

pub mod compare;
pub mod error;
pub mod iter;
mod node;
mod raw;
pub mod view;

pub use compare::{Comparator, Natural, Reverse};
pub use error::{Error, Result};
pub use iter::Iter;
pub use view::SubSet;

use raw::RawTree;

/// The state shared by a set and all of its views and iterators.
pub(crate) type Shared<T, C> = Arc<RwLock<RawTree<T, C>>>;

// ---------------------------------------------------------------------------
// Public Type Aliases
// ---------------------------------------------------------------------------

/// An ordered set using the natural (ascending) order of `T`.
///
/// This is the recommended type for most uses. For a different ordering, use
/// [`GenericAvlTree`] with a [`Comparator`] such as [`Reverse`].
pub type AvlTree<T> = GenericAvlTree<T, Natural>;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An AVL-balanced ordered set with a configurable ordering.
///
/// # Type Parameters
///
/// - `T`: The element type. Must implement `Clone`, since values handed out
///   by the set are copies taken under its lock.
/// - `C`: The [`Comparator`] defining the order of elements.
///
/// # Handles
///
/// A `GenericAvlTree` is a handle to shared state. [`GenericAvlTree::share`]
/// produces a second handle to the same set, and views and iterators hold
/// handles of their own.
pub struct GenericAvlTree<T, C> {
	inner: Shared<T, C>,
}

impl<T: Clone, C: Comparator<T> + Default> Default for GenericAvlTree<T, C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Clone, C: Comparator<T> + Default> GenericAvlTree<T, C> {
	/// Creates an empty set ordered by `C::default()`.
	///
	/// # Example
	///
	/// ```
	/// use avlset::AvlTree;
	///
	/// let set: AvlTree<u32> = AvlTree::new();
	/// assert!(set.is_empty());
	/// assert_eq!(set.height(), 0);
	/// ```
	pub fn new() -> Self {
		Self::with_comparator(C::default())
	}
}

impl<T: Clone, C: Comparator<T>> GenericAvlTree<T, C> {
	/// Creates an empty set ordered by `cmp`.
	///
	/// # Example
	///
	/// ```
	/// use avlset::{GenericAvlTree, Reverse};
	///
	/// let set = GenericAvlTree::with_comparator(Reverse);
	/// set.add(1);
	/// set.add(3);
	/// set.add(2);
	/// assert_eq!(set.to_vec(), vec![3, 2, 1]);
	/// ```
	pub fn with_comparator(cmp: C) -> Self {
		GenericAvlTree {
			inner: Arc::new(RwLock::new(RawTree::new(cmp))),
		}
	}

	/// Returns another handle to the same set.
	///
	/// Both handles observe and make the same changes.
	///
	/// # Example
	///
	/// ```
	/// use avlset::AvlTree;
	///
	/// let set: AvlTree<i32> = AvlTree::new();
	/// let other = set.share();
	/// other.add(7);
	/// assert!(set.contains(&7));
	/// ```
	pub fn share(&self) -> Self {
		GenericAvlTree {
			inner: Arc::clone(&self.inner),
		}
	}

	/// Returns a copy of the comparator ordering this set.
	pub fn comparator(&self) -> C
	where
		C: Clone,
	{
		self.inner.read().cmp.clone()
	}

	// -----------------------------------------------------------------------
	// Public API: Read Operations
	// -----------------------------------------------------------------------

	/// Returns `true` if the set contains `value`.
	pub fn contains(&self, value: &T) -> bool {
		self.inner.read().contains(value)
	}

	/// Returns the least element, or [`Error::NotFound`] if the set is empty.
	///
	/// # Example
	///
	/// ```
	/// use avlset::{AvlTree, Error};
	///
	/// let set: AvlTree<i32> = AvlTree::new();
	/// assert_eq!(set.first(), Err(Error::NotFound));
	/// set.add(4);
	/// set.add(2);
	/// assert_eq!(set.first(), Ok(2));
	/// ```
	pub fn first(&self) -> Result<T> {
		self.inner.read().first().cloned().ok_or(Error::NotFound)
	}

	/// Returns the greatest element, or [`Error::NotFound`] if the set is empty.
	pub fn last(&self) -> Result<T> {
		self.inner.read().last().cloned().ok_or(Error::NotFound)
	}

	/// Returns the number of elements in the set. O(1).
	pub fn len(&self) -> usize {
		self.inner.read().len()
	}

	/// Returns `true` if the set contains no elements.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Returns the height of the tree: 0 when empty, 1 for a single element.
	///
	/// An AVL tree of n elements never exceeds about 1.44 log2(n + 2).
	pub fn height(&self) -> usize {
		self.inner.read().height() as usize
	}

	/// Returns an ascending iterator over the set.
	///
	/// The iterator holds its own handle, so the set may be modified while it
	/// is alive; see [`Iter`] for how it keeps its place.
	///
	/// # Example
	///
	/// ```
	/// use avlset::AvlTree;
	///
	/// let set: AvlTree<i32> = (1..=6).collect();
	///
	/// // Drop the even numbers while walking the set
	/// let mut iter = set.iter();
	/// while let Ok(value) = iter.try_next() {
	///     if value % 2 == 0 {
	///         iter.remove().unwrap();
	///     }
	/// }
	/// assert_eq!(set.to_vec(), vec![1, 3, 5]);
	/// ```
	pub fn iter(&self) -> Iter<T, C> {
		Iter::new(Arc::clone(&self.inner), None, None)
	}

	/// Copies the elements into a `Vec`, in order.
	pub fn to_vec(&self) -> Vec<T> {
		self.inner.read().values().cloned().collect()
	}

	// -----------------------------------------------------------------------
	// Public API: Write Operations
	// -----------------------------------------------------------------------

	/// Adds `value` to the set.
	///
	/// Returns `false`, leaving the set unchanged, if an equal value is
	/// already present.
	pub fn add(&self, value: T) -> bool {
		self.inner.write().insert(value)
	}

	/// Removes `value` from the set, returning `true` if it was present.
	pub fn remove(&self, value: &T) -> bool {
		self.take(value).is_some()
	}

	/// Removes `value` from the set, returning the stored element.
	///
	/// Useful when the comparator considers elements equal that are not
	/// identical and the stored one is needed back.
	///
	/// # Example
	///
	/// ```
	/// use avlset::GenericAvlTree;
	///
	/// let by_len = |a: &String, b: &String| a.len().cmp(&b.len());
	/// let words = GenericAvlTree::with_comparator(by_len);
	/// words.add("pear".to_string());
	///
	/// assert_eq!(words.take(&"plum".to_string()), Some("pear".to_string()));
	/// assert!(words.is_empty());
	/// ```
	pub fn take(&self, value: &T) -> Option<T> {
		self.inner.write().remove(value)
	}

	/// Removes every element.
	pub fn clear(&self) {
		let dropped = self.inner.write().clear();
		tracing::debug!(dropped, "cleared tree");
	}

	// -----------------------------------------------------------------------
	// Public API: Views
	// -----------------------------------------------------------------------

	/// A live view of the elements in `[from, to)`.
	///
	/// Fails with [`Error::InvalidBounds`] unless `from` orders strictly
	/// before `to`.
	///
	/// # Example
	///
	/// ```
	/// use avlset::{AvlTree, Error};
	///
	/// let set: AvlTree<i32> = [6, 10, 16, 23].into_iter().collect();
	/// let view = set.sub_set(8, 20).unwrap();
	/// assert_eq!(view.to_vec(), vec![10, 16]);
	/// assert_eq!(view.add(30), Err(Error::OutOfRange));
	/// assert!(matches!(set.sub_set(5, 5), Err(Error::InvalidBounds)));
	/// ```
	pub fn sub_set(&self, from: T, to: T) -> Result<SubSet<T, C>> {
		if !self.inner.read().cmp.less(&from, &to) {
			return Err(Error::InvalidBounds);
		}
		Ok(SubSet::new(Arc::clone(&self.inner), Some(from), Some(to)))
	}

	/// A live view of the elements strictly below `to`.
	pub fn head_set(&self, to: T) -> SubSet<T, C> {
		SubSet::new(Arc::clone(&self.inner), None, Some(to))
	}

	/// A live view of the elements at or above `from`.
	pub fn tail_set(&self, from: T) -> SubSet<T, C> {
		SubSet::new(Arc::clone(&self.inner), Some(from), None)
	}
}

// ---------------------------------------------------------------------------
// Trait Implementations
// ---------------------------------------------------------------------------

impl<T: Clone, C: Comparator<T> + Default> FromIterator<T> for GenericAvlTree<T, C> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		let mut set = Self::new();
		set.extend(iter);
		set
	}
}

impl<T: Clone, C: Comparator<T>> Extend<T> for GenericAvlTree<T, C> {
	fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
		let mut raw = self.inner.write();
		for value in iter {
			raw.insert(value);
		}
	}
}

impl<T: Clone, C: Comparator<T>> IntoIterator for &GenericAvlTree<T, C> {
	type Item = T;
	type IntoIter = Iter<T, C>;

	fn into_iter(self) -> Iter<T, C> {
		self.iter()
	}
}

impl<T: fmt::Debug, C: Comparator<T>> fmt::Debug for GenericAvlTree<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.inner.read().values()).finish()
	}
}

// ===========================================================================
// Invariant Validation
// ===========================================================================

impl<T: fmt::Debug, C: Comparator<T>> GenericAvlTree<T, C> {
	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	///
	/// Intended for tests and debugging; it visits every node.
	///
	/// # Invariants Checked
	///
	/// 1. Order: an in-order walk is strictly ascending under `C`
	/// 2. Balance: sibling subtree heights differ by at most one
	/// 3. Heights: cached heights match a full recomputation
	/// 4. Parents: every back-index agrees with the owning child link
	/// 5. Size: the element count equals the number of reachable nodes
	pub fn assert_invariants(&self) {
		self.inner.read().assert_invariants();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	// -----------------------------------------------------------------------
	// Basic Set Operation Tests
	// -----------------------------------------------------------------------

	#[test]
	fn add_contains_remove() {
		let set: AvlTree<i32> = AvlTree::new();

		assert!(set.add(2));
		assert!(set.add(1));
		assert!(set.add(3));
		assert!(!set.add(2));
		set.assert_invariants();

		assert_eq!(set.len(), 3);
		assert!(set.contains(&1));
		assert!(!set.contains(&4));

		assert!(set.remove(&2));
		assert!(!set.remove(&2));
		assert!(!set.contains(&2));
		assert_eq!(set.len(), 2);
		set.assert_invariants();
	}

	#[test]
	fn first_and_last() {
		let set: AvlTree<i32> = AvlTree::new();
		assert_eq!(set.first(), Err(Error::NotFound));
		assert_eq!(set.last(), Err(Error::NotFound));

		for v in [40, 10, 90, 55] {
			set.add(v);
		}
		assert_eq!(set.first(), Ok(10));
		assert_eq!(set.last(), Ok(90));
	}

	#[test]
	fn clear_empties() {
		let set: AvlTree<i32> = (0..100).collect();
		assert_eq!(set.len(), 100);
		set.clear();
		assert!(set.is_empty());
		assert_eq!(set.height(), 0);
		set.assert_invariants();
		assert!(set.add(5));
		assert_eq!(set.to_vec(), vec![5]);
	}

	#[test]
	fn shared_handles_see_each_other() {
		let set: AvlTree<i32> = AvlTree::new();
		let other = set.share();
		set.add(1);
		other.add(2);
		assert_eq!(set.to_vec(), vec![1, 2]);
		assert_eq!(other.len(), 2);
	}

	#[test]
	fn reverse_order() {
		let set: GenericAvlTree<i32, Reverse> = (1..=10).collect();
		set.assert_invariants();
		assert_eq!(set.first(), Ok(10));
		assert_eq!(set.last(), Ok(1));
		assert_eq!(set.to_vec(), (1..=10).rev().collect::<Vec<_>>());

		let view = set.sub_set(8, 4).unwrap();
		assert_eq!(view.to_vec(), vec![8, 7, 6, 5]);
		assert!(matches!(set.sub_set(4, 8), Err(Error::InvalidBounds)));
	}

	#[test]
	fn debug_format() {
		let set: AvlTree<i32> = [3, 1, 2].into_iter().collect();
		assert_eq!(format!("{:?}", set), "{1, 2, 3}");
		assert_eq!(format!("{:?}", set.tail_set(2)), "{2, 3}");
	}

	#[test]
	fn height_stays_logarithmic() {
		let set: AvlTree<u32> = (0..1023).collect();
		set.assert_invariants();
		// A perfectly balanced tree of 1023 nodes has height 10.
		assert!(set.height() <= 11, "height {} too large", set.height());
	}

	#[test]
	fn scenario_small_left_rotation() {
		let set: AvlTree<i32> = AvlTree::new();
		for v in [9, 10, 14, 16] {
			set.add(v);
			set.assert_invariants();
		}
		assert_eq!(set.to_vec(), vec![9, 10, 14, 16]);
		assert_eq!(set.height(), 3);
	}

	#[test]
	fn scenario_large_left_rotation() {
		let set: AvlTree<i32> = AvlTree::new();
		for v in [10, 2, 50, 1, 30, 100, 150, 80, 90] {
			set.add(v);
			set.assert_invariants();
		}
		assert_eq!(set.to_vec(), vec![1, 2, 10, 30, 50, 80, 90, 100, 150]);
	}

	#[test]
	fn thread_safe_handle() {
		fn assert_send_sync<S: Send + Sync>() {}
		assert_send_sync::<AvlTree<String>>();
		assert_send_sync::<Iter<String, Natural>>();
		assert_send_sync::<SubSet<String, Natural>>();
	}
}
