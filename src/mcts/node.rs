//! Search tree nodes stored in the [`SearchTree`](crate::mcts::tree::SearchTree) arena.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::board::GameResult;

/// Stable handle of a node inside its tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    /// `None` once `index` no longer fits the 32-bit handle.
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok().map(NodeId)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Known result of a terminal position, seen by the player who moved into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Draw,
}

impl Outcome {
    pub fn value(self) -> f64 {
        match self {
            Outcome::Win => 1.0,
            Outcome::Draw => 0.0,
        }
    }
}

impl From<GameResult> for Outcome {
    // Only the last placed piece can complete a line, so a win always belongs to the mover.
    fn from(result: GameResult) -> Self {
        match result {
            GameResult::Win(_) => Outcome::Win,
            GameResult::Draw => Outcome::Draw,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchNode {
    /// Non-owning back-reference; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Column played from the parent to reach this node; `None` for the root.
    pub move_index: Option<usize>,
    pub prior: f32,
    pub visit_count: u32,
    /// Sum of backed-up values, from the perspective of the player who moved into this node.
    pub value_sum: f64,
    pub outcome: Option<Outcome>,
    pub children: Vec<NodeId>,
}

impl SearchNode {
    pub fn root(outcome: Option<Outcome>) -> Self {
        Self {
            parent: None,
            move_index: None,
            prior: 0.0,
            visit_count: 0,
            value_sum: 0.0,
            outcome,
            children: Vec::new(),
        }
    }

    pub fn child(parent: NodeId, column: usize, prior: f32, outcome: Option<Outcome>) -> Self {
        Self {
            parent: Some(parent),
            move_index: Some(column),
            prior,
            visit_count: 0,
            value_sum: 0.0,
            outcome,
            children: Vec::new(),
        }
    }

    pub fn mean_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f64
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Player;

    #[test]
    fn test_mean_value() {
        let mut node = SearchNode::root(None);
        assert_eq!(node.mean_value(), 0.0);

        node.visit_count = 4;
        node.value_sum = -1.0;
        assert!((node.mean_value() + 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_child_links_parent() {
        let node = SearchNode::child(NodeId::ROOT, 5, 0.3, Some(Outcome::Draw));
        assert_eq!(node.parent, Some(NodeId::ROOT));
        assert_eq!(node.move_index, Some(5));
        assert!(node.is_leaf());
        assert_eq!(node.outcome.map(Outcome::value), Some(0.0));
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(Outcome::from(GameResult::Win(Player::Second)), Outcome::Win);
        assert_eq!(Outcome::from(GameResult::Draw), Outcome::Draw);
        assert_eq!(Outcome::Win.value(), 1.0);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_node_id_rejects_indices_past_u32() {
        let last = u32::MAX as usize;
        assert_eq!(NodeId::from_index(last).map(NodeId::index), Some(last));
        assert_eq!(NodeId::from_index(last + 1), None);
    }

    #[test]
    fn test_node_id_display() {
        assert_eq!(NodeId::from_index(12).unwrap().to_string(), "#12");
        assert_eq!(NodeId::ROOT.index(), 0);
    }
}
