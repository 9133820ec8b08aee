//! Ascending iteration with removal.
//!
//! [`Iter`] owns a handle to the set, not a borrow of it, so the set stays
//! fully usable while an iterator is alive: elements can be added or removed
//! through any handle in between two calls to `next`. The iterator notices
//! such changes through the tree's modification stamp and re-derives its
//! position from the last element it returned, so it never follows a stale
//! node id.
//!
//! ## Removal Through the Iterator
//!
//! ```text
//! next() ──► 10      cursor = 10, removable
//! next() ──► 20      cursor = 20, removable
//! remove()           20 is deleted; rotations may reshape the tree
//!                    position is re-derived: least element > 20
//! next() ──► 30
//! ```
//!
//! Re-deriving is a single root-to-leaf walk, so `remove()` costs O(log n)
//! regardless of how the deletion rebalanced the tree.

use std::fmt;

use crate::compare::Comparator;
use crate::error::{Error, Result};
use crate::raw::{RawTree, Stack};
use crate::Shared;

/// An ascending iterator over a set or a view of one.
///
/// Obtained from [`crate::GenericAvlTree::iter`] or [`crate::SubSet::iter`].
/// The iterator is single pass: once it reports exhaustion, obtain a new one
/// for another traversal.
pub struct Iter<T, C> {
	tree: Shared<T, C>,
	stack: Stack,
	stamp: u64,
	/// Inclusive lower bound; where the traversal starts.
	floor: Option<T>,
	/// Exclusive upper bound; the traversal ends before it.
	ceiling: Option<T>,
	/// The element most recently returned by `next`.
	last: Option<T>,
	removable: bool,
}

impl<T: Clone, C: Comparator<T>> Iter<T, C> {
	pub(crate) fn new(tree: Shared<T, C>, floor: Option<T>, ceiling: Option<T>) -> Iter<T, C> {
		let mut stack = Stack::new();
		let stamp = {
			let raw = tree.read();
			match &floor {
				Some(floor) => raw.seek_at_or_after(&mut stack, floor),
				None => raw.seek_to_first(&mut stack),
			}
			raw.stamp()
		};
		Iter {
			tree,
			stack,
			stamp,
			floor,
			ceiling,
			last: None,
			removable: false,
		}
	}

	/// Returns `true` if another call to `next` would produce an element.
	///
	/// This never moves the iterator; calling it repeatedly, or on several
	/// iterators at the same position, gives the same answer as long as the
	/// set is not modified in between.
	pub fn has_next(&self) -> bool {
		let raw = self.tree.read();
		let upcoming = if raw.stamp() == self.stamp {
			self.stack.last().copied()
		} else {
			match (&self.last, &self.floor) {
				(Some(last), _) => raw.higher(last),
				(None, Some(floor)) => raw.ceiling(floor),
				(None, None) => raw.first_id(),
			}
		};
		upcoming.is_some_and(|id| self.below_ceiling(&raw, raw.value(id)))
	}

	/// Advances the iterator, failing with [`Error::ExhaustedIterator`] once
	/// every element has been returned.
	pub fn try_next(&mut self) -> Result<T> {
		let raw = self.tree.read();
		if raw.stamp() != self.stamp {
			match (&self.last, &self.floor) {
				(Some(last), _) => raw.seek_after(&mut self.stack, last),
				(None, Some(floor)) => raw.seek_at_or_after(&mut self.stack, floor),
				(None, None) => raw.seek_to_first(&mut self.stack),
			}
			tracing::trace!(stamp = raw.stamp(), "iterator repositioned after modification");
			self.stamp = raw.stamp();
		}

		let Some(id) = self.stack.last().copied() else {
			return Err(Error::ExhaustedIterator);
		};
		if !self.below_ceiling(&raw, raw.value(id)) {
			self.stack.clear();
			return Err(Error::ExhaustedIterator);
		}
		raw.advance(&mut self.stack);

		let value = raw.value(id).clone();
		drop(raw);
		self.last = Some(value.clone());
		self.removable = true;
		Ok(value)
	}

	/// Removes the element most recently returned by `next` from the set.
	///
	/// Fails with [`Error::InvalidIteratorState`] if `next` has not been
	/// called yet, or if the current element was already removed. Traversal
	/// continues with the element that followed the removed one.
	pub fn remove(&mut self) -> Result<()> {
		if !self.removable {
			return Err(Error::InvalidIteratorState);
		}
		let Some(last) = &self.last else {
			return Err(Error::InvalidIteratorState);
		};

		let mut raw = self.tree.write();
		// Someone else may have removed it already; the set is then unchanged.
		raw.remove(last);
		raw.seek_after(&mut self.stack, last);
		self.stamp = raw.stamp();
		self.removable = false;
		Ok(())
	}

	#[inline]
	fn below_ceiling(&self, raw: &RawTree<T, C>, value: &T) -> bool {
		self.ceiling.as_ref().is_none_or(|ceiling| raw.cmp.less(value, ceiling))
	}
}

impl<T: Clone, C: Comparator<T>> Iterator for Iter<T, C> {
	type Item = T;

	fn next(&mut self) -> Option<T> {
		self.try_next().ok()
	}
}

impl<T: fmt::Debug, C> fmt::Debug for Iter<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Iter")
			.field("last", &self.last)
			.field("floor", &self.floor)
			.field("ceiling", &self.ceiling)
			.field("removable", &self.removable)
			.finish()
	}
}
