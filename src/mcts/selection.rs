//! PUCT child selection.
//!
//! Score of an unresolved child: `Q + C(N) * P * sqrt(N) / (n + 1)` where the exploration
//! weight `C(N) = ln((N + c_base + 1) / c_base) + c_init` grows slowly with the parent's
//! visit count `N`. A child whose result is already known scores `terminal_score`.

use crate::mcts::hyperparameters::SearchHyperparameters;
use crate::mcts::node::{NodeId, SearchNode};
use crate::mcts::tree::SearchTree;

pub fn exploration_weight(parent_visits: u32, params: &SearchHyperparameters) -> f64 {
    ((f64::from(parent_visits) + params.c_base + 1.0) / params.c_base).ln() + params.c_init
}

pub fn puct_score(child: &SearchNode, parent_visits: u32, params: &SearchHyperparameters) -> f64 {
    if child.outcome.is_some() {
        return params.terminal_score;
    }
    child.mean_value()
        + exploration_weight(parent_visits, params)
            * f64::from(child.prior)
            * f64::from(parent_visits).sqrt()
            / (f64::from(child.visit_count) + 1.0)
}

/// Highest-scoring child of `parent`; on equal scores the earliest child wins.
///
/// Returns `None` when `parent` has no children.
pub fn select_best_child(tree: &SearchTree, parent: NodeId) -> Option<NodeId> {
    let parent_node = tree.node(parent);
    let parent_visits = parent_node.visit_count;

    let mut best: Option<(NodeId, f64)> = None;
    for &child in &parent_node.children {
        let score = puct_score(tree.node(child), parent_visits, tree.params());
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((child, score)),
        }
    }
    best.map(|(child, _)| child)
}
