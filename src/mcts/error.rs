use thiserror::Error;

use crate::game::board::GameError;
use crate::mcts::node::NodeId;
use crate::neural::evaluator::EvaluatorError;

#[derive(Debug, Error)]
pub enum SearchError {
    /// Expansion requested on a node that already carries statistics. Logic fault.
    #[error("node {node} already expanded")]
    AlreadyExpanded { node: NodeId },

    #[error("evaluator failed: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("a search is already running")]
    Busy,

    /// The position changed while the analysis ran; its result no longer applies.
    #[error("position changed during analysis")]
    Superseded,

    #[error("search tree is full at {nodes} nodes")]
    TreeFull { nodes: usize },

    #[error("invalid config: {msg}")]
    InvalidConfig { msg: String },
}

impl SearchError {
    pub(crate) fn invalid_config(msg: &str) -> Self {
        SearchError::InvalidConfig {
            msg: msg.to_string(),
        }
    }
}
