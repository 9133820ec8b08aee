//! Live range views over a set.
//!
//! A [`SubSet`] is a window `[lower, upper)` onto a backing set; either bound
//! may be absent. It stores no elements of its own: every operation checks the
//! bounds and then runs against the backing tree, so the view always reflects
//! the set's current contents.
//!
//! ```text
//! backing:   6  10  16  23  44  50  55  60  79
//! sub_set(8, 61):  [10  16  23  44  50  55  60]
//! head_set(23):  [6  10  16]
//! tail_set(55):                     [55  60  79]
//! ```
//!
//! ## Cost
//!
//! Nothing about a view is cached. [`SubSet::len`], [`SubSet::first`] and
//! [`SubSet::last`] walk the backing tree from the lower bound and are O(n)
//! in the worst case. Membership tests and updates are O(log n).

use std::fmt;

use crate::compare::Comparator;
use crate::error::{Error, Result};
use crate::iter::Iter;
use crate::raw::RawTree;
use crate::Shared;

/// A bounded, live view onto a [`crate::GenericAvlTree`].
///
/// Created by [`crate::GenericAvlTree::sub_set`], [`crate::GenericAvlTree::head_set`]
/// and [`crate::GenericAvlTree::tail_set`].
pub struct SubSet<T, C> {
	tree: Shared<T, C>,
	/// Inclusive.
	lower: Option<T>,
	/// Exclusive.
	upper: Option<T>,
}

impl<T: Clone, C: Comparator<T>> SubSet<T, C> {
	pub(crate) fn new(tree: Shared<T, C>, lower: Option<T>, upper: Option<T>) -> SubSet<T, C> {
		SubSet {
			tree,
			lower,
			upper,
		}
	}

	/// The inclusive lower bound, if any.
	pub fn lower_bound(&self) -> Option<&T> {
		self.lower.as_ref()
	}

	/// The exclusive upper bound, if any.
	pub fn upper_bound(&self) -> Option<&T> {
		self.upper.as_ref()
	}

	/// Returns `true` if `value` falls inside this view's bounds.
	///
	/// This says nothing about whether the value is in the set.
	pub fn in_range(&self, value: &T) -> bool {
		self.admits(&self.tree.read(), value)
	}

	fn admits(&self, raw: &RawTree<T, C>, value: &T) -> bool {
		self.lower.as_ref().is_none_or(|lower| !raw.cmp.less(value, lower))
			&& self.upper.as_ref().is_none_or(|upper| raw.cmp.less(value, upper))
	}

	/// Like `admits`, but also accepts the upper bound itself.
	fn admits_closed(&self, raw: &RawTree<T, C>, value: &T) -> bool {
		self.lower.as_ref().is_none_or(|lower| !raw.cmp.less(value, lower))
			&& self.upper.as_ref().is_none_or(|upper| !raw.cmp.less(upper, value))
	}

	// -----------------------------------------------------------------------
	// Updates
	// -----------------------------------------------------------------------

	/// Adds `value` to the backing set.
	///
	/// Returns `Ok(false)` if it was already present, and
	/// [`Error::OutOfRange`] if it lies outside the view.
	pub fn add(&self, value: T) -> Result<bool> {
		let mut raw = self.tree.write();
		if !self.admits(&raw, &value) {
			return Err(Error::OutOfRange);
		}
		Ok(raw.insert(value))
	}

	/// Removes `value` from the backing set.
	///
	/// Returns `Ok(false)` if it was not present, and [`Error::OutOfRange`]
	/// if it lies outside the view.
	pub fn remove(&self, value: &T) -> Result<bool> {
		let mut raw = self.tree.write();
		if !self.admits(&raw, value) {
			return Err(Error::OutOfRange);
		}
		Ok(raw.remove(value).is_some())
	}

	/// Removes every element of the view from the backing set.
	///
	/// Elements outside the bounds are untouched.
	pub fn clear(&self) {
		let mut raw = self.tree.write();
		let doomed: Vec<T> = raw.range(self.lower.as_ref(), self.upper.as_ref()).cloned().collect();
		for value in &doomed {
			raw.remove(value);
		}
		tracing::debug!(removed = doomed.len(), "cleared range view");
	}

	// -----------------------------------------------------------------------
	// Queries
	// -----------------------------------------------------------------------

	/// Returns `true` if `value` is inside the bounds and in the set.
	pub fn contains(&self, value: &T) -> bool {
		let raw = self.tree.read();
		self.admits(&raw, value) && raw.contains(value)
	}

	/// Number of set elements inside the bounds. O(n).
	pub fn len(&self) -> usize {
		let raw = self.tree.read();
		raw.range(self.lower.as_ref(), self.upper.as_ref()).count()
	}

	/// Returns `true` if no set element lies inside the bounds.
	pub fn is_empty(&self) -> bool {
		let raw = self.tree.read();
		let mut range = raw.range(self.lower.as_ref(), self.upper.as_ref());
		range.next().is_none()
	}

	/// The least element inside the bounds, or [`Error::NotFound`].
	pub fn first(&self) -> Result<T> {
		let raw = self.tree.read();
		let mut range = raw.range(self.lower.as_ref(), self.upper.as_ref());
		range.next().cloned().ok_or(Error::NotFound)
	}

	/// The greatest element inside the bounds, or [`Error::NotFound`]. O(n).
	pub fn last(&self) -> Result<T> {
		let raw = self.tree.read();
		let range = raw.range(self.lower.as_ref(), self.upper.as_ref());
		range.last().cloned().ok_or(Error::NotFound)
	}

	/// An ascending iterator over the elements inside the bounds.
	///
	/// Removing through the iterator removes from the backing set.
	pub fn iter(&self) -> Iter<T, C> {
		Iter::new(self.tree.clone(), self.lower.clone(), self.upper.clone())
	}

	/// Copies the view's elements into a `Vec`, ascending.
	pub fn to_vec(&self) -> Vec<T> {
		let raw = self.tree.read();
		raw.range(self.lower.as_ref(), self.upper.as_ref()).cloned().collect()
	}

	// -----------------------------------------------------------------------
	// Nested Views
	// -----------------------------------------------------------------------

	/// A view of `[from, to)` within this view.
	///
	/// `from` must lie inside this view and `to` inside it or on its upper
	/// bound; otherwise [`Error::OutOfRange`]. `from >= to` is
	/// [`Error::InvalidBounds`].
	pub fn sub_set(&self, from: T, to: T) -> Result<SubSet<T, C>> {
		{
			let raw = self.tree.read();
			if !raw.cmp.less(&from, &to) {
				return Err(Error::InvalidBounds);
			}
			if !self.admits(&raw, &from) || !self.admits_closed(&raw, &to) {
				return Err(Error::OutOfRange);
			}
		}
		Ok(SubSet::new(self.tree.clone(), Some(from), Some(to)))
	}

	/// A view of everything in this view below `to`.
	pub fn head_set(&self, to: T) -> Result<SubSet<T, C>> {
		if !self.admits_closed(&self.tree.read(), &to) {
			return Err(Error::OutOfRange);
		}
		Ok(SubSet::new(self.tree.clone(), self.lower.clone(), Some(to)))
	}

	/// A view of everything in this view at or above `from`.
	pub fn tail_set(&self, from: T) -> Result<SubSet<T, C>> {
		if !self.admits(&self.tree.read(), &from) {
			return Err(Error::OutOfRange);
		}
		Ok(SubSet::new(self.tree.clone(), Some(from), self.upper.clone()))
	}
}

impl<T: Clone, C: Comparator<T>> IntoIterator for &SubSet<T, C> {
	type Item = T;
	type IntoIter = Iter<T, C>;

	fn into_iter(self) -> Iter<T, C> {
		self.iter()
	}
}

impl<T: fmt::Debug, C: Comparator<T>> fmt::Debug for SubSet<T, C> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let raw = self.tree.read();
		f.debug_set().entries(raw.range(self.lower.as_ref(), self.upper.as_ref())).finish()
	}
}
