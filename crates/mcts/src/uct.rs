//! UCT child selection.
//!
//! score(c) = R(c) / N(c) + C * sqrt(2 ln N(p) / N(c))
//!
//! Unvisited children score `+inf`, so they are always tried before any
//! visited sibling.

use crate::node::{NodeId, NodeStats};
use crate::tree::Tree;
use std::hash::Hash;

/// UCT score of a child given its parent's visit count.
pub fn uct_score(parent_visits: u32, child: &NodeStats, exploration: f64) -> f64 {
    if child.visit_count == 0 {
        return f64::INFINITY;
    }
    let n = f64::from(child.visit_count);
    let bonus = (2.0 * f64::from(parent_visits).ln() / n).sqrt();
    child.mean_reward() + exploration * bonus
}

/// Child of `parent` with the highest UCT score.
///
/// Ties go to the child inserted first. Returns `None` for a node without
/// children.
pub fn select_child<A: Copy + Eq + Hash>(
    tree: &Tree<A>,
    parent: NodeId,
    exploration: f64,
) -> Option<NodeId> {
    let node = tree.get(parent);
    let parent_visits = node.stats.visit_count;

    best_by(&node.children, |id| {
        uct_score(parent_visits, &tree.get(id).stats, exploration)
    })
}

/// Child of `parent` with the most visits, first-inserted on ties.
pub fn most_visited_child<A: Copy + Eq + Hash>(tree: &Tree<A>, parent: NodeId) -> Option<NodeId> {
    best_by(&tree.get(parent).children, |id| {
        f64::from(tree.get(id).stats.visit_count)
    })
}

/// Visited child of `parent` with the highest mean reward.
///
/// Falls back to the first child when none has been visited yet.
pub fn best_mean_child<A: Copy + Eq + Hash>(tree: &Tree<A>, parent: NodeId) -> Option<NodeId> {
    let children = &tree.get(parent).children;
    best_by(children, |id| {
        let stats = &tree.get(id).stats;
        if stats.visit_count == 0 {
            f64::NEG_INFINITY
        } else {
            stats.mean_reward()
        }
    })
    .or_else(|| children.first().copied())
}

fn best_by(children: &[NodeId], mut score: impl FnMut(NodeId) -> f64) -> Option<NodeId> {
    let mut best = None;
    let mut best_score = f64::NEG_INFINITY;

    for &id in children {
        let s = score(id);
        if best.is_none() || s > best_score {
            best_score = s;
            best = Some(id);
        }
    }
    best
}
