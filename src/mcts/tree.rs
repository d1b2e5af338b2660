//! Arena-backed search tree: selection, expansion and backpropagation.
//!
//! Nodes are owned by the arena and refer to each other through [`NodeId`] handles; a
//! child keeps its parent's handle for the walk back to the root. Nodes are never removed
//! individually, the whole tree is dropped when the game position changes.

use crate::game::board::{Board, COLUMNS};
use crate::mcts::error::SearchError;
use crate::mcts::hyperparameters::SearchHyperparameters;
use crate::mcts::node::{NodeId, Outcome, SearchNode};
use crate::mcts::selection::select_best_child;

#[derive(Debug, Clone)]
pub struct SearchTree {
    nodes: Vec<SearchNode>,
    params: SearchHyperparameters,
}

impl SearchTree {
    pub fn new(params: SearchHyperparameters, root_outcome: Option<Outcome>) -> Self {
        Self {
            nodes: vec![SearchNode::root(root_outcome)],
            params,
        }
    }

    pub fn params(&self) -> &SearchHyperparameters {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> &SearchNode {
        self.node(NodeId::ROOT)
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut SearchNode {
        &mut self.nodes[id.index()]
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SearchNode)> + '_ {
        self.node(id)
            .children
            .iter()
            .map(move |&child| (child, self.node(child)))
    }

    fn push(&mut self, node: SearchNode) -> Result<NodeId, SearchError> {
        let id = NodeId::from_index(self.nodes.len()).ok_or(SearchError::TreeFull {
            nodes: self.nodes.len(),
        })?;
        self.nodes.push(node);
        Ok(id)
    }

    /// Fails unless `extra` more nodes still get a handle.
    fn ensure_room(&self, extra: usize) -> Result<(), SearchError> {
        let last = self.nodes.len().saturating_add(extra).saturating_sub(1);
        match NodeId::from_index(last) {
            Some(_) => Ok(()),
            None => Err(SearchError::TreeFull {
                nodes: self.nodes.len(),
            }),
        }
    }

    /// Descends from the root to the first childless node, replaying every chosen move
    /// on `board`, which must hold the root position on entry.
    pub fn select(&self, board: &mut Board) -> Result<NodeId, SearchError> {
        let mut current = NodeId::ROOT;
        while let Some(best) = select_best_child(self, current) {
            if let Some(column) = self.node(best).move_index {
                board.apply_move(column)?;
            }
            current = best;
        }
        Ok(current)
    }

    /// Creates one child per legal column of `board` (the position at `id`), in column
    /// order, each carrying `priors[column]`. Children reaching a finished game get their
    /// outcome fixed. Nodes with a known outcome are never expanded.
    pub fn expand(
        &mut self,
        id: NodeId,
        board: &Board,
        priors: &[f32; COLUMNS],
    ) -> Result<(), SearchError> {
        let node = self.node(id);
        if node.visit_count > 0 || !node.children.is_empty() {
            return Err(SearchError::AlreadyExpanded { node: id });
        }
        if node.outcome.is_some() {
            return Ok(());
        }

        // No partial expansion: either every child gets a handle or none is added.
        let legal = board.legal_moves();
        self.ensure_room(legal.len())?;
        for column in legal {
            let mut child_board = *board;
            child_board.apply_move(column)?;
            let outcome = child_board.result().map(Outcome::from);
            let child = self.push(SearchNode::child(id, column, priors[column], outcome))?;
            self.node_mut(id).children.push(child);
        }
        Ok(())
    }

    /// Adds `value` at `id` and alternates its sign on the way up to the root.
    pub fn backprop(&mut self, id: NodeId, value: f64) {
        let mut current = Some(id);
        let mut value = value;
        while let Some(node_id) = current {
            let node = self.node_mut(node_id);
            node.value_sum += value;
            node.visit_count += 1;
            current = node.parent;
            value = -value;
        }
    }

    /// Handles from `id` up to and including the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            path.push(parent);
            current = self.node(parent).parent;
        }
        path
    }
}
