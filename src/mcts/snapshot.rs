//! Read-only view of a search for presentation layers.

use serde::Serialize;

use crate::game::board::{Board, COLUMNS};
use crate::mcts::node::{NodeId, Outcome};
use crate::mcts::tree::SearchTree;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildStats {
    pub column: usize,
    pub visit_count: u32,
    pub prior: f32,
    /// Mean value for the player making this move.
    pub mean_value: f64,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSnapshot {
    /// Plies played in the analysed position.
    pub move_count: usize,
    pub root_visits: u32,
    /// Root mean value, seen by the player who made the last move.
    pub root_value: f64,
    /// Position evaluation in [-1, 1]; positive favours the player who moves second.
    pub evaluation: f64,
    /// `visits / (root_visits - 1)` per column once the root has more than one visit,
    /// the raw prior before that; 0 for illegal columns.
    pub visit_fractions: [f32; COLUMNS],
    pub children: Vec<ChildStats>,
    /// Most visited column, earliest column on ties.
    pub best_move: Option<usize>,
}

impl SearchSnapshot {
    pub fn capture(tree: &SearchTree, root_board: &Board) -> Self {
        let root = tree.root();
        let children: Vec<ChildStats> = tree
            .children(NodeId::ROOT)
            .filter_map(|(_, child)| {
                child.move_index.map(|column| ChildStats {
                    column,
                    visit_count: child.visit_count,
                    prior: child.prior,
                    mean_value: child.mean_value(),
                    outcome: child.outcome,
                })
            })
            .collect();

        let mut visit_fractions = [0.0f32; COLUMNS];
        for child in &children {
            visit_fractions[child.column] = if root.visit_count > 1 {
                child.visit_count as f32 / (root.visit_count - 1) as f32
            } else {
                child.prior
            };
        }

        let best_move = children
            .iter()
            .fold(None::<&ChildStats>, |best, child| match best {
                Some(b) if b.visit_count >= child.visit_count => Some(b),
                _ => Some(child),
            })
            .map(|child| child.column);

        let root_value = root.mean_value();
        let evaluation = if root_board.move_count() % 2 == 1 {
            -root_value
        } else {
            root_value
        };

        Self {
            move_count: root_board.move_count(),
            root_visits: root.visit_count,
            root_value,
            evaluation,
            visit_fractions,
            children,
            best_move,
        }
    }
}
