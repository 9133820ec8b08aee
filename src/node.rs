//! Tree nodes and the arena that owns them.
//!
//! Nodes never own each other directly. Every node lives in a slot of an
//! [`Arena`] and is addressed by a [`NodeId`]; `left` and `right` are the
//! owning direction of the tree (a node is reachable from exactly one parent
//! slot, or from the root), while `parent` is a plain back-index used only for
//! walking upward. Removing a node from the tree and releasing its slot are
//! the same step: [`Arena::free`].

use std::fmt;

/// Index of a node inside its [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(u32);

impl NodeId {
	#[inline]
	fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A single tree node.
pub(crate) struct Node<T> {
	pub(crate) value: T,
	pub(crate) parent: Option<NodeId>,
	pub(crate) left: Option<NodeId>,
	pub(crate) right: Option<NodeId>,
	/// Cached subtree height: a leaf is 1, an absent child counts as 0.
	pub(crate) height: u32,
}

impl<T> Node<T> {
	pub(crate) fn leaf(value: T, parent: Option<NodeId>) -> Node<T> {
		Node {
			value,
			parent,
			left: None,
			right: None,
			height: 1,
		}
	}
}

enum Slot<T> {
	Occupied(Node<T>),
	Vacant { next_free: Option<u32> },
}

/// Slot storage for nodes, with a free list for recycling released slots.
pub(crate) struct Arena<T> {
	slots: Vec<Slot<T>>,
	free_head: Option<u32>,
	len: usize,
}

impl<T> Arena<T> {
	pub(crate) fn new() -> Arena<T> {
		Arena {
			slots: Vec::new(),
			free_head: None,
			len: 0,
		}
	}

	/// Number of live nodes.
	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.len
	}

	pub(crate) fn alloc(&mut self, node: Node<T>) -> NodeId {
		self.len += 1;
		match self.free_head {
			Some(idx) => {
				let slot = &mut self.slots[idx as usize];
				self.free_head = match slot {
					Slot::Vacant { next_free } => *next_free,
					Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
				};
				*slot = Slot::Occupied(node);
				NodeId(idx)
			}
			None => {
				let idx = u32::try_from(self.slots.len()).expect("arena exceeded u32::MAX nodes");
				self.slots.push(Slot::Occupied(node));
				NodeId(idx)
			}
		}
	}

	/// Releases a node's slot and hands its value back.
	///
	/// The caller must already have unlinked the node from the tree.
	pub(crate) fn free(&mut self, id: NodeId) -> T {
		let slot = std::mem::replace(
			&mut self.slots[id.index()],
			Slot::Vacant {
				next_free: self.free_head,
			},
		);
		match slot {
			Slot::Occupied(node) => {
				self.free_head = Some(id.0);
				self.len -= 1;
				node.value
			}
			Slot::Vacant { .. } => unreachable!("double free of node {:?}", id),
		}
	}

	/// Drops every node and forgets all slots.
	pub(crate) fn clear(&mut self) {
		self.slots.clear();
		self.free_head = None;
		self.len = 0;
	}

	#[inline]
	pub(crate) fn get(&self, id: NodeId) -> &Node<T> {
		match &self.slots[id.index()] {
			Slot::Occupied(node) => node,
			Slot::Vacant { .. } => unreachable!("dangling node id {:?}", id),
		}
	}

	#[inline]
	pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<T> {
		match &mut self.slots[id.index()] {
			Slot::Occupied(node) => node,
			Slot::Vacant { .. } => unreachable!("dangling node id {:?}", id),
		}
	}
}

impl<T> std::ops::Index<NodeId> for Arena<T> {
	type Output = Node<T>;

	#[inline]
	fn index(&self, id: NodeId) -> &Node<T> {
		self.get(id)
	}
}

impl<T> std::ops::IndexMut<NodeId> for Arena<T> {
	#[inline]
	fn index_mut(&mut self, id: NodeId) -> &mut Node<T> {
		self.get_mut(id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn freed_slots_are_recycled() {
		let mut arena = Arena::new();
		let a = arena.alloc(Node::leaf(1, None));
		let b = arena.alloc(Node::leaf(2, Some(a)));
		assert_eq!(arena.len(), 2);

		assert_eq!(arena.free(a), 1);
		assert_eq!(arena.len(), 1);

		let c = arena.alloc(Node::leaf(3, None));
		assert_eq!(c, a, "released slot should be reused first");
		assert_eq!(arena[b].value, 2);
		assert_eq!(arena[c].value, 3);
		assert_eq!(arena[b].parent, Some(a));
	}

	#[test]
	fn free_list_is_lifo() {
		let mut arena = Arena::new();
		let ids: Vec<_> = (0..4).map(|v| arena.alloc(Node::leaf(v, None))).collect();
		arena.free(ids[1]);
		arena.free(ids[3]);
		assert_eq!(arena.alloc(Node::leaf(10, None)), ids[3]);
		assert_eq!(arena.alloc(Node::leaf(11, None)), ids[1]);
		assert_eq!(arena.alloc(Node::leaf(12, None)), NodeId(4));
	}

	#[test]
	fn clear_resets() {
		let mut arena = Arena::new();
		arena.alloc(Node::leaf("x", None));
		arena.clear();
		assert_eq!(arena.len(), 0);
		assert_eq!(arena.alloc(Node::leaf("y", None)), NodeId(0));
	}
}
