//! Arena-allocated MCTS tree.
//!
//! Using a Vec<Node> with indices provides better cache locality
//! and simpler ownership compared to Rc<RefCell<Node>> with weak parents.

use crate::node::{Node, NodeId};
use std::hash::Hash;

/// Arena-allocated MCTS tree.
///
/// Nodes are stored in a contiguous vector and referenced by index.
/// The arena only grows during a search; [`Tree::clear`] drops everything
/// but a fresh root.
#[derive(Debug)]
pub struct Tree<A: Copy + Eq + Hash> {
    nodes: Vec<Node<A>>,
}

impl<A: Copy + Eq + Hash> Tree<A> {
    /// Create a new tree with an empty root node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    /// Get a reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get(&self, id: NodeId) -> &Node<A> {
        &self.nodes[id.0]
    }

    /// Get a mutable reference to a node by ID.
    ///
    /// # Panics
    /// Panics if the NodeId is invalid.
    pub fn get_mut(&mut self, id: NodeId) -> &mut Node<A> {
        &mut self.nodes[id.0]
    }

    /// Expand `parent` with a child reached by `action`.
    ///
    /// Marks the action as tried and appends the child, keeping tried
    /// actions and children in one-to-one correspondence.
    pub fn add_child(&mut self, parent: NodeId, action: A) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(Some(parent), Some(action)));

        let parent_node = self.get_mut(parent);
        parent_node.tried_actions.insert(action);
        parent_node.children.push(id);
        id
    }

    /// True iff every one of `legal_actions` has a child, by count.
    pub fn is_fully_expanded(&self, id: NodeId, legal_actions: &[A]) -> bool {
        self.get(id).tried_actions.len() == legal_actions.len()
    }

    /// Legal actions that have not been expanded from `id` yet, in order.
    pub fn untried_actions(&self, id: NodeId, legal_actions: &[A]) -> Vec<A> {
        let tried = &self.get(id).tried_actions;
        legal_actions
            .iter()
            .filter(|a| !tried.contains(a))
            .copied()
            .collect()
    }

    /// Walk from `id` up to the root, both included.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_, A> {
        Ancestors {
            tree: self,
            next: Some(id),
        }
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count() - 1
    }

    /// Iterate over all node IDs in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Clear the tree for reuse, keeping only a fresh root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::root());
    }

    /// Get the number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should never be true as root always exists).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get the root node.
    pub fn root(&self) -> &Node<A> {
        self.get(NodeId::ROOT)
    }
}

impl<A: Copy + Eq + Hash> Default for Tree<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a node and its ancestors, see [`Tree::ancestors`].
pub struct Ancestors<'a, A: Copy + Eq + Hash> {
    tree: &'a Tree<A>,
    next: Option<NodeId>,
}

impl<A: Copy + Eq + Hash> Iterator for Ancestors<'_, A> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.get(current).parent;
        Some(current)
    }
}
