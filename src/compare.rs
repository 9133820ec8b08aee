//! Element orderings.
//!
//! A tree is configured with its ordering at the type level, much like node
//! capacities are picked through const generics elsewhere: the default
//! [`crate::AvlTree`] alias uses [`Natural`], and [`crate::GenericAvlTree`]
//! accepts any [`Comparator`].

use std::cmp::Ordering;

/// A total order over `T`.
///
/// Implementations must be consistent: `compare(a, b)` must be the reverse of
/// `compare(b, a)`, and the order must be transitive. The tree relies on this
/// to keep its search invariant; an inconsistent comparator produces an
/// arbitrary (but memory safe) arrangement.
pub trait Comparator<T: ?Sized> {
	/// Compares two elements.
	fn compare(&self, a: &T, b: &T) -> Ordering;

	/// Returns `true` if `a` orders strictly before `b`.
	#[inline]
	fn less(&self, a: &T, b: &T) -> bool {
		self.compare(a, b) == Ordering::Less
	}
}

/// Ascending order, as defined by [`Ord`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		a.cmp(b)
	}
}

/// Descending order: the sign of [`Ord::cmp`] is inverted.
///
/// A tree built with `Reverse` iterates from the greatest element to the
/// least, `first()` returns the maximum, and range views read their bounds in
/// the same inverted sense (`sub_set(10, 2)` holds `10, 9, ..., 3`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reverse;

impl<T: Ord + ?Sized> Comparator<T> for Reverse {
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		b.cmp(a)
	}
}

impl<T: ?Sized, F> Comparator<T> for F
where
	F: Fn(&T, &T) -> Ordering,
{
	#[inline]
	fn compare(&self, a: &T, b: &T) -> Ordering {
		self(a, b)
	}
}
