//! Playout loop over a persistent search tree.
//!
//! A driver owns the root position, the tree and a shared handle on the evaluator. One
//! playout runs at a time; the only suspension point is the evaluator call, and tree
//! updates happen only after it returned successfully.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::game::board::Board;
use crate::mcts::error::SearchError;
use crate::mcts::hyperparameters::SearchHyperparameters;
use crate::mcts::node::{Outcome, SearchNode};
use crate::mcts::snapshot::{ChildStats, SearchSnapshot};
use crate::mcts::tree::SearchTree;
use crate::neural::evaluator::{mask_policy, Evaluator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayoutKind {
    /// The leaf was evaluated and expanded.
    Evaluated,
    /// The leaf's result was already known; no evaluator call.
    KnownOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchReport {
    pub completed: usize,
    pub cancelled: bool,
}

pub struct SearchDriver<E> {
    root_board: Board,
    tree: SearchTree,
    evaluator: Arc<E>,
    cancel: Arc<AtomicBool>,
}

impl<E: Evaluator> SearchDriver<E> {
    pub fn new(board: &Board, evaluator: Arc<E>) -> Self {
        Self::with_params(board, evaluator, SearchHyperparameters::default())
    }

    pub fn with_params(board: &Board, evaluator: Arc<E>, params: SearchHyperparameters) -> Self {
        let root_outcome = board.result().map(Outcome::from);
        Self {
            root_board: *board,
            tree: SearchTree::new(params, root_outcome),
            evaluator,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares `flag` as this driver's cancellation token.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = flag;
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn request_cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn root_board(&self) -> &Board {
        &self.root_board
    }

    pub fn tree(&self) -> &SearchTree {
        &self.tree
    }

    pub fn root(&self) -> &SearchNode {
        self.tree.root()
    }

    pub fn root_mean_value(&self) -> f64 {
        self.tree.root().mean_value()
    }

    pub fn root_children(&self) -> Vec<ChildStats> {
        self.snapshot().children
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        SearchSnapshot::capture(&self.tree, &self.root_board)
    }

    /// One selection / evaluation / expansion / backpropagation pass.
    ///
    /// An evaluator failure is returned before the tree is touched, so the selected leaf
    /// stays unexpanded and unvisited.
    pub async fn playout(&mut self) -> Result<PlayoutKind, SearchError> {
        let mut board = self.root_board;
        let leaf = self.tree.select(&mut board)?;

        if let Some(outcome) = self.tree.node(leaf).outcome {
            self.tree.backprop(leaf, outcome.value());
            return Ok(PlayoutKind::KnownOutcome);
        }

        let evaluation = self.evaluator.evaluate(&board).await?.validated()?;
        let priors = mask_policy(
            &board.legal_mask(),
            &evaluation.policy,
            self.tree.params().policy_floor,
        );
        self.tree.expand(leaf, &board, &priors)?;
        // The evaluator scores the side to move at the leaf; the leaf stores values
        // for the player who moved into it.
        self.tree.backprop(leaf, -f64::from(evaluation.value));
        log::trace!(
            "playout expanded {} at ply {} (value {:.3})",
            leaf,
            board.move_count(),
            evaluation.value
        );
        Ok(PlayoutKind::Evaluated)
    }

    /// Runs up to `n` playouts in sequence, checking the cancellation flag before each.
    pub async fn playouts(&mut self, n: usize) -> Result<BatchReport, SearchError> {
        let mut report = BatchReport::default();
        for _ in 0..n {
            if self.is_cancelled() {
                report.cancelled = true;
                break;
            }
            if let Err(e) = self.playout().await {
                log::warn!(
                    "playout failed after {} of {} in batch: {}",
                    report.completed,
                    n,
                    e
                );
                return Err(e);
            }
            report.completed += 1;
        }
        log::debug!(
            "batch done: {}/{} playouts, root visits {}, root value {:.3}",
            report.completed,
            n,
            self.tree.root().visit_count,
            self.root_mean_value()
        );
        Ok(report)
    }
}
