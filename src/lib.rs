//! # GravC4
//!
//! Connect Four on a 6×7 board where gravity alternates every two plies: two pieces fall
//! from the bottom, the next two from the top. Positions are analysed with a PUCT Monte
//! Carlo Tree Search that asks an external policy/value evaluator for priors and values.
//!
//! ## Features
//!
//! - **Game Engine**: board state, move legality, win and draw detection, tensor encoding
//! - **Search**: arena-backed PUCT tree, cancellable playout batches, snapshots
//! - **Neural**: residual policy/value network behind the [`neural::Evaluator`] trait
//! - **Session**: background analysis on an authoritative game
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use gravc4::{game::Board, mcts::SearchDriver, neural::UniformEvaluator};
//!
//! # async fn run() -> gravc4::Result<()> {
//! let board = Board::from_moves(&[3, 3, 4])?;
//! let mut driver = SearchDriver::new(&board, Arc::new(UniformEvaluator));
//! driver.playouts(100).await?;
//! println!("{:?}", driver.snapshot().best_move);
//! # Ok(())
//! # }
//! ```

/// Board representation and rules
pub mod game;

/// Monte Carlo Tree Search
pub mod mcts;

/// Policy/value evaluation
pub mod neural;

/// Analysis session over a live game
pub mod services;

/// Logger setup
pub mod logging;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the library
#[derive(Debug, thiserror::Error)]
pub enum GravC4Error {
    #[error("Game error: {0}")]
    Game(#[from] game::GameError),

    #[error("Search error: {0}")]
    Search(#[from] mcts::SearchError),

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] neural::EvaluatorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, GravC4Error>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
