//! # Error Types for the AVL Set
//!
//! Every failure the set can report is local and synchronous: the caller asked
//! for something that does not exist (or not here, or not now). None of the
//! variants signal corrupted internal state, and no operation leaves the tree
//! half-modified when it returns one.
//!
//! ## Where Each Error Comes From
//!
//! ```text
//! first() / last()        ── empty set or empty view ──────► NotFound
//! Iter::try_next()        ── no elements remain ───────────► ExhaustedIterator
//! Iter::remove()          ── no next() since last remove ──► InvalidIteratorState
//! SubSet::add / remove    ── value outside [lower, upper) ─► OutOfRange
//! sub_set(from, to)       ── from >= to ───────────────────► InvalidBounds
//! ```
//!
//! Inserting a value that is already present is not an error: `add` simply
//! returns `false`.

use thiserror::Error;

/// Errors returned by set, iterator and view operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The requested element does not exist.
	///
	/// Returned by `first()` and `last()` when the set (or view) is empty.
	#[error("no such element")]
	NotFound,

	/// `try_next()` was called on an iterator with no remaining elements.
	#[error("iterator is exhausted")]
	ExhaustedIterator,

	/// `remove()` was called on an iterator that has no current element.
	///
	/// This happens before the first call to `next()`, and after a `remove()`
	/// that was not followed by another `next()`.
	#[error("iterator has no current element to remove")]
	InvalidIteratorState,

	/// A value was handed to a view that does not fall inside its bounds.
	#[error("value is outside of the view's range")]
	OutOfRange,

	/// A range view was requested whose lower bound is not strictly less
	/// than its upper bound.
	#[error("lower bound must be less than upper bound")]
	InvalidBounds,
}

/// A Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
