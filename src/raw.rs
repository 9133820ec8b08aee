//! The unsynchronized AVL core.
//!
//! [`RawTree`] owns the node arena and implements everything that touches
//! tree shape: the found-or-closest search, insertion, deletion, the upward
//! rebalancing walk and the four rotations. It knows nothing about locking or
//! handles; [`crate::GenericAvlTree`] wraps it in a single lock and every
//! public operation runs one `RawTree` method to completion under that lock.
//!
//! ## Rotations
//!
//! ```text
//! small left (a is right-heavy,      large left (a is right-heavy,
//!   a.right is not left-heavy)         a.right is left-heavy)
//!
//!     a                b                 a                   c
//!    / \              / \               / \                /   \
//!   L   b     =>     a   R             L   b      =>      a     b
//!      / \          / \                   / \            / \   / \
//!     C   R        L   C                 c   R          L   M N   R
//!                                       / \
//!                                      M   N
//! ```
//!
//! The right rotations are the mirror images. Each rotation hands back the new
//! subtree root so the upward walk can continue from its parent.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::compare::Comparator;
use crate::node::{Arena, Node, NodeId};

/// Pending-node stack used by in-order traversals.
///
/// Balanced trees of any realistic size stay well under this inline depth.
pub(crate) type Stack = SmallVec<[NodeId; 32]>;

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

pub(crate) struct RawTree<T, C> {
	pub(crate) nodes: Arena<T>,
	pub(crate) root: Option<NodeId>,
	pub(crate) cmp: C,
	/// Bumped on every structural change; iterators compare against it to
	/// notice that their pending stack may be stale.
	stamp: u64,
}

impl<T, C: Comparator<T>> RawTree<T, C> {
	pub(crate) fn new(cmp: C) -> RawTree<T, C> {
		RawTree {
			nodes: Arena::new(),
			root: None,
			cmp,
			stamp: 0,
		}
	}

	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.nodes.len()
	}

	#[inline]
	pub(crate) fn stamp(&self) -> u64 {
		self.stamp
	}

	#[inline]
	fn touch(&mut self) {
		self.stamp = self.stamp.wrapping_add(1);
	}

	/// Height of the whole tree; 0 when empty.
	pub(crate) fn height(&self) -> u32 {
		self.height_of(self.root)
	}

	#[inline]
	fn height_of(&self, id: Option<NodeId>) -> u32 {
		id.map_or(0, |id| self.nodes[id].height)
	}

	#[inline]
	fn update_height(&mut self, id: NodeId) {
		let node = &self.nodes[id];
		let height = 1 + self.height_of(node.left).max(self.height_of(node.right));
		self.nodes[id].height = height;
	}

	#[inline]
	pub(crate) fn value(&self, id: NodeId) -> &T {
		&self.nodes[id].value
	}

	// -----------------------------------------------------------------------
	// Search
	// -----------------------------------------------------------------------

	/// Walks from the root towards `value`.
	///
	/// Returns the node holding an equal value together with
	/// `Ordering::Equal`, or the last node on the search path together with
	/// how `value` compares to it (the would-be parent for an insertion).
	/// Returns `None` only for an empty tree.
	pub(crate) fn locate(&self, value: &T) -> Option<(NodeId, Ordering)> {
		let mut current = self.root?;
		loop {
			let node = &self.nodes[current];
			let ord = self.cmp.compare(value, &node.value);
			let next = match ord {
				Ordering::Equal => return Some((current, ord)),
				Ordering::Less => node.left,
				Ordering::Greater => node.right,
			};
			match next {
				Some(child) => current = child,
				None => return Some((current, ord)),
			}
		}
	}

	pub(crate) fn find(&self, value: &T) -> Option<NodeId> {
		match self.locate(value) {
			Some((id, Ordering::Equal)) => Some(id),
			_ => None,
		}
	}

	pub(crate) fn contains(&self, value: &T) -> bool {
		self.find(value).is_some()
	}

	fn leftmost(&self, mut id: NodeId) -> NodeId {
		while let Some(left) = self.nodes[id].left {
			id = left;
		}
		id
	}

	fn rightmost(&self, mut id: NodeId) -> NodeId {
		while let Some(right) = self.nodes[id].right {
			id = right;
		}
		id
	}

	pub(crate) fn first_id(&self) -> Option<NodeId> {
		self.root.map(|root| self.leftmost(root))
	}

	pub(crate) fn first(&self) -> Option<&T> {
		self.first_id().map(|id| self.value(id))
	}

	pub(crate) fn last(&self) -> Option<&T> {
		self.root.map(|root| self.value(self.rightmost(root)))
	}

	/// The node holding the least value strictly greater than `value`.
	pub(crate) fn higher(&self, value: &T) -> Option<NodeId> {
		let mut candidate = None;
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.nodes[id];
			if self.cmp.less(value, &node.value) {
				candidate = Some(id);
				current = node.left;
			} else {
				current = node.right;
			}
		}
		candidate
	}

	/// The node holding the least value greater than or equal to `value`.
	pub(crate) fn ceiling(&self, value: &T) -> Option<NodeId> {
		let mut candidate = None;
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.nodes[id];
			if self.cmp.less(&node.value, value) {
				current = node.right;
			} else {
				candidate = Some(id);
				current = node.left;
			}
		}
		candidate
	}

	// -----------------------------------------------------------------------
	// Traversal Stacks
	// -----------------------------------------------------------------------
	//
	// A pending stack holds, top first, the next node to visit followed by the
	// ancestors still waiting for their turn. Popping a node and pushing the
	// left spine of its right subtree yields the next in-order position.

	pub(crate) fn push_left_spine(&self, stack: &mut Stack, mut current: Option<NodeId>) {
		while let Some(id) = current {
			stack.push(id);
			current = self.nodes[id].left;
		}
	}

	/// Positions `stack` at the first element.
	pub(crate) fn seek_to_first(&self, stack: &mut Stack) {
		stack.clear();
		self.push_left_spine(stack, self.root);
	}

	/// Positions `stack` at the least element strictly greater than `value`.
	pub(crate) fn seek_after(&self, stack: &mut Stack, value: &T) {
		stack.clear();
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.nodes[id];
			if self.cmp.less(value, &node.value) {
				stack.push(id);
				current = node.left;
			} else {
				current = node.right;
			}
		}
	}

	/// Positions `stack` at the least element greater than or equal to `value`.
	pub(crate) fn seek_at_or_after(&self, stack: &mut Stack, value: &T) {
		stack.clear();
		let mut current = self.root;
		while let Some(id) = current {
			let node = &self.nodes[id];
			if self.cmp.less(&node.value, value) {
				current = node.right;
			} else {
				stack.push(id);
				current = node.left;
			}
		}
	}

	/// Pops the next in-order node off `stack`, queueing its successors.
	pub(crate) fn advance(&self, stack: &mut Stack) -> Option<NodeId> {
		let id = stack.pop()?;
		self.push_left_spine(stack, self.nodes[id].right);
		Some(id)
	}

	/// Borrowing ascending traversal starting at `floor` (inclusive) and
	/// stopping before `ceiling` (exclusive).
	pub(crate) fn range<'a>(&'a self, floor: Option<&T>, ceiling: Option<&'a T>) -> Values<'a, T, C> {
		let mut stack = Stack::new();
		match floor {
			Some(floor) => self.seek_at_or_after(&mut stack, floor),
			None => self.seek_to_first(&mut stack),
		}
		Values {
			tree: self,
			stack,
			ceiling,
		}
	}

	pub(crate) fn values(&self) -> Values<'_, T, C> {
		self.range(None, None)
	}

	// -----------------------------------------------------------------------
	// Insert
	// -----------------------------------------------------------------------

	/// Inserts `value` unless an equal value is present.
	///
	/// Returns `false` and leaves the tree untouched for a duplicate.
	pub(crate) fn insert(&mut self, value: T) -> bool {
		let (parent, ord) = match self.locate(&value) {
			None => {
				let id = self.nodes.alloc(Node::leaf(value, None));
				self.root = Some(id);
				self.touch();
				return true;
			}
			Some((_, Ordering::Equal)) => return false,
			Some(found) => found,
		};

		let id = self.nodes.alloc(Node::leaf(value, Some(parent)));
		if ord == Ordering::Less {
			self.nodes[parent].left = Some(id);
		} else {
			self.nodes[parent].right = Some(id);
		}
		self.touch();
		self.rebalance_from(Some(parent));
		true
	}

	// -----------------------------------------------------------------------
	// Delete
	// -----------------------------------------------------------------------

	/// Removes the element equal to `value`, returning the stored value.
	///
	/// A node with a left subtree takes over its in-order predecessor's value
	/// and the predecessor's node is unlinked instead; a node with only a
	/// right subtree does the same with its successor. Rebalancing starts at
	/// the parent of the node that was physically unlinked.
	pub(crate) fn remove(&mut self, value: &T) -> Option<T> {
		let target = self.find(value)?;
		let victim = match (self.nodes[target].left, self.nodes[target].right) {
			(Some(left), _) => self.rightmost(left),
			(None, Some(right)) => self.leftmost(right),
			(None, None) => target,
		};

		let (victim_value, parent) = self.unlink(victim);
		let removed = if victim == target {
			victim_value
		} else {
			std::mem::replace(&mut self.nodes[target].value, victim_value)
		};

		self.touch();
		self.rebalance_from(parent);
		Some(removed)
	}

	/// Detaches a node with at most one child, splicing that child into its
	/// place, and frees it. Returns its value and its former parent.
	fn unlink(&mut self, id: NodeId) -> (T, Option<NodeId>) {
		let node = &self.nodes[id];
		debug_assert!(
			node.left.is_none() || node.right.is_none(),
			"unlink called on node {:?} with two children",
			id
		);
		let child = node.left.or(node.right);
		let parent = node.parent;

		if let Some(child) = child {
			self.nodes[child].parent = parent;
		}
		match parent {
			None => self.root = child,
			Some(p) => {
				if self.nodes[p].left == Some(id) {
					self.nodes[p].left = child;
				} else {
					self.nodes[p].right = child;
				}
			}
		}

		(self.nodes.free(id), parent)
	}

	/// Drops every element, returning how many there were.
	pub(crate) fn clear(&mut self) -> usize {
		let count = self.nodes.len();
		self.nodes.clear();
		self.root = None;
		self.touch();
		count
	}

	// -----------------------------------------------------------------------
	// Rebalancing
	// -----------------------------------------------------------------------

	/// Restores heights and balance on every node from `start` up to the root.
	///
	/// Descendants are always settled before their ancestors are examined,
	/// since a rotation lower down changes the heights seen higher up.
	fn rebalance_from(&mut self, start: Option<NodeId>) {
		let mut current = start;
		while let Some(id) = current {
			self.update_height(id);
			let subroot = self.balance(id);
			current = self.nodes[subroot].parent;
		}
	}

	/// Rotates at `id` if its subtrees differ in height by two.
	///
	/// Returns the root of the (possibly rotated) subtree.
	fn balance(&mut self, id: NodeId) -> NodeId {
		let node = &self.nodes[id];
		let left = self.height_of(node.left);
		let right = self.height_of(node.right);

		if right > left + 1 {
			debug_assert_eq!(right - left, 2, "imbalance beyond 2 at {:?}", id);
			let heavy = &self.nodes[node.right.expect("right-heavy node has a right child")];
			if self.height_of(heavy.left) <= self.height_of(heavy.right) {
				self.small_left_rotation(id)
			} else {
				self.large_left_rotation(id)
			}
		} else if left > right + 1 {
			debug_assert_eq!(left - right, 2, "imbalance beyond 2 at {:?}", id);
			let heavy = &self.nodes[node.left.expect("left-heavy node has a left child")];
			if self.height_of(heavy.right) <= self.height_of(heavy.left) {
				self.small_right_rotation(id)
			} else {
				self.large_right_rotation(id)
			}
		} else {
			id
		}
	}

	/// Puts `new` where `old` used to hang: under `parent`, or at the root.
	fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
		self.nodes[new].parent = parent;
		match parent {
			None => self.root = Some(new),
			Some(p) => {
				let parent = &mut self.nodes[p];
				if parent.left == Some(old) {
					parent.left = Some(new);
				} else {
					parent.right = Some(new);
				}
			}
		}
	}

	fn small_left_rotation(&mut self, a: NodeId) -> NodeId {
		let b = self.nodes[a].right.expect("small left rotation needs a right child");
		let c = self.nodes[b].left;
		let parent = self.nodes[a].parent;

		self.nodes[a].right = c;
		if let Some(c) = c {
			self.nodes[c].parent = Some(a);
		}
		self.nodes[b].left = Some(a);
		self.nodes[a].parent = Some(b);
		self.replace_child(parent, a, b);

		self.update_height(a);
		self.update_height(b);
		tracing::trace!(pivot = ?a, subroot = ?b, "small left rotation");
		b
	}

	fn large_left_rotation(&mut self, a: NodeId) -> NodeId {
		let b = self.nodes[a].right.expect("large left rotation needs a right child");
		let c = self.nodes[b].left.expect("large left rotation needs a right-left grandchild");
		let (m, n) = (self.nodes[c].left, self.nodes[c].right);
		let parent = self.nodes[a].parent;

		self.nodes[a].right = m;
		if let Some(m) = m {
			self.nodes[m].parent = Some(a);
		}
		self.nodes[b].left = n;
		if let Some(n) = n {
			self.nodes[n].parent = Some(b);
		}
		self.nodes[c].left = Some(a);
		self.nodes[c].right = Some(b);
		self.nodes[a].parent = Some(c);
		self.nodes[b].parent = Some(c);
		self.replace_child(parent, a, c);

		self.update_height(a);
		self.update_height(b);
		self.update_height(c);
		tracing::trace!(pivot = ?a, subroot = ?c, "large left rotation");
		c
	}

	fn small_right_rotation(&mut self, a: NodeId) -> NodeId {
		let b = self.nodes[a].left.expect("small right rotation needs a left child");
		let c = self.nodes[b].right;
		let parent = self.nodes[a].parent;

		self.nodes[a].left = c;
		if let Some(c) = c {
			self.nodes[c].parent = Some(a);
		}
		self.nodes[b].right = Some(a);
		self.nodes[a].parent = Some(b);
		self.replace_child(parent, a, b);

		self.update_height(a);
		self.update_height(b);
		tracing::trace!(pivot = ?a, subroot = ?b, "small right rotation");
		b
	}

	fn large_right_rotation(&mut self, a: NodeId) -> NodeId {
		let b = self.nodes[a].left.expect("large right rotation needs a left child");
		let c = self.nodes[b].right.expect("large right rotation needs a left-right grandchild");
		let (m, n) = (self.nodes[c].left, self.nodes[c].right);
		let parent = self.nodes[a].parent;

		self.nodes[b].right = m;
		if let Some(m) = m {
			self.nodes[m].parent = Some(b);
		}
		self.nodes[a].left = n;
		if let Some(n) = n {
			self.nodes[n].parent = Some(a);
		}
		self.nodes[c].left = Some(b);
		self.nodes[c].right = Some(a);
		self.nodes[a].parent = Some(c);
		self.nodes[b].parent = Some(c);
		self.replace_child(parent, a, c);

		self.update_height(a);
		self.update_height(b);
		self.update_height(c);
		tracing::trace!(pivot = ?a, subroot = ?c, "large right rotation");
		c
	}
}

// ---------------------------------------------------------------------------
// Invariant Validation
// ---------------------------------------------------------------------------

impl<T: std::fmt::Debug, C: Comparator<T>> RawTree<T, C> {
	/// Panics with a diagnostic if any structural invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Order: every value sits strictly between its subtree bounds
	/// 2. Balance: sibling subtree heights differ by at most one
	/// 3. Heights: every cached height matches a recomputation
	/// 4. Parents: every child points back at the node that owns it
	/// 5. Size: the number of reachable nodes equals the element count
	pub(crate) fn assert_invariants(&self) {
		let Some(root) = self.root else {
			assert_eq!(self.len(), 0, "empty tree reports {} elements", self.len());
			return;
		};

		assert_eq!(self.nodes[root].parent, None, "root {:?} has a parent", root);

		let mut reachable = 0usize;
		self.validate_node(root, None, None, &mut reachable);
		assert_eq!(
			reachable,
			self.len(),
			"{} reachable nodes but {} elements recorded",
			reachable,
			self.len()
		);
	}

	/// Returns the recomputed height of the subtree at `id`.
	fn validate_node(
		&self,
		id: NodeId,
		lower: Option<&T>,
		upper: Option<&T>,
		reachable: &mut usize,
	) -> u32 {
		*reachable += 1;
		let node = &self.nodes[id];

		if let Some(lower) = lower {
			assert!(
				self.cmp.less(lower, &node.value),
				"{:?} at {:?} is not greater than its lower bound {:?}",
				node.value,
				id,
				lower
			);
		}
		if let Some(upper) = upper {
			assert!(
				self.cmp.less(&node.value, upper),
				"{:?} at {:?} is not less than its upper bound {:?}",
				node.value,
				id,
				upper
			);
		}

		let left = self.validate_child(id, node.left, lower, Some(&node.value), reachable);
		let right = self.validate_child(id, node.right, Some(&node.value), upper, reachable);

		assert!(
			left.abs_diff(right) <= 1,
			"{:?} at {:?} is unbalanced: left height {}, right height {}",
			node.value,
			id,
			left,
			right
		);

		let height = 1 + left.max(right);
		assert_eq!(
			node.height, height,
			"{:?} at {:?} caches height {} but has height {}",
			node.value, id, node.height, height
		);
		height
	}

	fn validate_child(
		&self,
		parent: NodeId,
		child: Option<NodeId>,
		lower: Option<&T>,
		upper: Option<&T>,
		reachable: &mut usize,
	) -> u32 {
		let Some(child) = child else {
			return 0;
		};
		assert_eq!(
			self.nodes[child].parent,
			Some(parent),
			"child {:?} of {:?} points back at {:?}",
			child,
			parent,
			self.nodes[child].parent
		);
		self.validate_node(child, lower, upper, reachable)
	}
}

// ---------------------------------------------------------------------------
// Borrowing Traversal
// ---------------------------------------------------------------------------

/// Ascending traversal over a borrowed [`RawTree`].
pub(crate) struct Values<'a, T, C> {
	tree: &'a RawTree<T, C>,
	stack: Stack,
	ceiling: Option<&'a T>,
}

impl<'a, T, C: Comparator<T>> Iterator for Values<'a, T, C> {
	type Item = &'a T;

	fn next(&mut self) -> Option<&'a T> {
		let id = self.tree.advance(&mut self.stack)?;
		let value = self.tree.value(id);
		if let Some(ceiling) = self.ceiling {
			if !self.tree.cmp.less(value, ceiling) {
				self.stack.clear();
				return None;
			}
		}
		Some(value)
	}
}
