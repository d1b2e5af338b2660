pub mod axis;
pub mod board;

pub use board::{Board, GameError, GameResult, Gravity, IllegalReason, Player};
