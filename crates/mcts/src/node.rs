//! MCTS node types for tree storage.
//!
//! Uses arena allocation with indices: every node stores the index of its
//! parent, so walking back to the root never needs shared ownership.

use std::collections::HashSet;
use std::hash::Hash;

/// Index into the node arena.
///
/// This is a lightweight handle that references a node in the tree.
/// Handles are only meaningful for the tree that produced them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: NodeId = NodeId(0);

    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Statistics for a single MCTS node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeStats {
    /// Number of backpropagations that passed through this node.
    pub visit_count: u32,

    /// Sum of rewards from all those backpropagations.
    pub total_reward: f64,
}

impl NodeStats {
    /// Mean reward for this node.
    ///
    /// Returns 0.0 if the node has never been visited.
    pub fn mean_reward(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_reward / f64::from(self.visit_count)
        }
    }

    /// Record one simulation passing through this node.
    pub fn record(&mut self, reward: f64) {
        self.visit_count += 1;
        self.total_reward += reward;
    }
}

/// A node in the MCTS tree.
///
/// Nodes do not store environment states: in a stochastic environment the
/// state behind a node is re-sampled on every descent.
#[derive(Clone, Debug)]
pub struct Node<A: Copy + Eq + Hash> {
    /// Parent node (None for root).
    pub parent: Option<NodeId>,

    /// Action that leads from the parent to this node (None for root).
    pub action: Option<A>,

    /// Actions already expanded into children.
    pub tried_actions: HashSet<A>,

    /// Children in insertion order, one per tried action.
    pub children: Vec<NodeId>,

    /// Node statistics (visits, reward).
    pub stats: NodeStats,
}

impl<A: Copy + Eq + Hash> Node<A> {
    /// Create a new unexpanded node.
    pub fn new(parent: Option<NodeId>, action: Option<A>) -> Self {
        Self {
            parent,
            action,
            tried_actions: HashSet::new(),
            children: Vec::new(),
            stats: NodeStats::default(),
        }
    }

    /// Create the root node.
    pub fn root() -> Self {
        Self::new(None, None)
    }

    /// Whether this node has never been expanded.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_stats_mean_reward() {
        let mut stats = NodeStats::default();

        // Unvisited node has mean 0
        assert_eq!(stats.mean_reward(), 0.0);

        stats.record(1.0);
        stats.record(0.5);
        assert_eq!(stats.visit_count, 2);
        assert!((stats.mean_reward() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_node_creation() {
        let node: Node<u8> = Node::new(Some(NodeId::ROOT), Some(42));
        assert_eq!(node.parent, Some(NodeId::ROOT));
        assert_eq!(node.action, Some(42));
        assert!(node.is_leaf());
        assert!(node.tried_actions.is_empty());
    }

    #[test]
    fn test_root_node() {
        let root: Node<u8> = Node::root();
        assert_eq!(root.parent, None);
        assert_eq!(root.action, None);
        assert_eq!(root.stats, NodeStats::default());
    }
}
