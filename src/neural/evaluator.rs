//! Policy/value evaluator boundary used by the search.
//!
//! An evaluator scores a position for the side to move: one raw policy score per column
//! (log-probabilities, not yet restricted to legal columns) and a value in [-1, 1].
//! Masking illegal columns and renormalising is done by [`mask_policy`].

use std::future::Future;

use thiserror::Error;

use crate::game::board::{Board, COLUMNS};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    /// Raw per-column scores, interpreted as log-probabilities.
    pub policy: [f32; COLUMNS],
    /// Expected outcome for the side to move at the evaluated board.
    pub value: f32,
}

impl Evaluation {
    /// Rejects NaN anywhere, `+inf` policy scores and values outside [-1, 1].
    ///
    /// `-inf` scores are accepted: they are the log of a zero probability.
    pub fn validated(self) -> Result<Self, EvaluatorError> {
        if let Some(column) = self
            .policy
            .iter()
            .position(|&score| score.is_nan() || score == f32::INFINITY)
        {
            return Err(EvaluatorError::InvalidOutput(format!(
                "policy score for column {column} is {}",
                self.policy[column]
            )));
        }
        if !self.value.is_finite() || !(-1.0..=1.0).contains(&self.value) {
            return Err(EvaluatorError::InvalidOutput(format!(
                "value {} outside [-1, 1]",
                self.value
            )));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluator backend failure: {0}")]
    Backend(String),

    #[error("invalid evaluator output: {0}")]
    InvalidOutput(String),

    #[error("torch error: {0}")]
    Torch(#[from] tch::TchError),
}

/// External policy/value predictor.
///
/// The board handed to `evaluate` is always a private copy owned by the search.
pub trait Evaluator: Send + Sync {
    fn evaluate(
        &self,
        board: &Board,
    ) -> impl Future<Output = Result<Evaluation, EvaluatorError>> + Send;
}

/// Equal scores for every column and a neutral value.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl Evaluator for UniformEvaluator {
    async fn evaluate(&self, _board: &Board) -> Result<Evaluation, EvaluatorError> {
        Ok(Evaluation {
            policy: [0.0; COLUMNS],
            value: 0.0,
        })
    }
}

/// Restricts raw log-probability scores to the legal columns.
///
/// `p[c] = legal(c) * exp(s[c]) / (floor + sum over legal j of exp(s[j]))`, so illegal
/// columns get exactly zero and an all-illegal mask yields all zeros instead of NaN.
/// Scores are shifted by the largest legal one before exponentiating, with the floor
/// scaled by the same factor, so any finite score gives finite priors.
pub fn mask_policy(legal: &[bool; COLUMNS], scores: &[f32; COLUMNS], floor: f64) -> [f32; COLUMNS] {
    let shift = (0..COLUMNS)
        .filter(|&column| legal[column])
        .map(|column| f64::from(scores[column]))
        .fold(f64::NEG_INFINITY, f64::max);
    if shift == f64::NEG_INFINITY {
        return [0.0; COLUMNS];
    }

    let weights: [f64; COLUMNS] = std::array::from_fn(|column| {
        if legal[column] {
            (f64::from(scores[column]) - shift).exp()
        } else {
            0.0
        }
    });
    // floor * exp(-shift), capped so a very negative shift cannot reach infinity.
    let scaled_floor = if floor > 0.0 {
        (floor.ln() - shift).exp().min(f64::MAX)
    } else {
        0.0
    };
    let total = scaled_floor + weights.iter().sum::<f64>();
    std::array::from_fn(|column| (weights[column] / total) as f32)
}
