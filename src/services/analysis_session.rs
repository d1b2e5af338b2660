//! Owns the authoritative game and runs background analysis on it.
//!
//! Every change to the game position bumps an epoch. A search tree is only reused while
//! its epoch matches the current one, and snapshots from an older epoch are never
//! published.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use crate::game::board::{Board, GameError};
use crate::mcts::driver::SearchDriver;
use crate::mcts::error::SearchError;
use crate::mcts::hyperparameters::EngineConfig;
use crate::mcts::snapshot::SearchSnapshot;
use crate::neural::evaluator::Evaluator;

#[derive(Debug, Clone, Copy)]
struct GameState {
    board: Board,
    epoch: u64,
}

pub struct AnalysisSession<E> {
    evaluator: Arc<E>,
    config: EngineConfig,
    game: Mutex<GameState>,
    search: tokio::sync::Mutex<Option<(u64, SearchDriver<E>)>>,
    cancel: Arc<AtomicBool>,
    snapshots: watch::Sender<Option<SearchSnapshot>>,
}

impl<E: Evaluator> AnalysisSession<E> {
    pub fn new(evaluator: Arc<E>, config: EngineConfig) -> Self {
        Self::with_board(evaluator, config, Board::new())
    }

    pub fn with_board(evaluator: Arc<E>, config: EngineConfig, board: Board) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            evaluator,
            config,
            game: Mutex::new(GameState { board, epoch: 0 }),
            search: tokio::sync::Mutex::new(None),
            cancel: Arc::new(AtomicBool::new(false)),
            snapshots,
        }
    }

    fn lock_game(&self) -> MutexGuard<'_, GameState> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn board(&self) -> Board {
        self.lock_game().board
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Receives the latest snapshot after every analysis round; `None` after the
    /// position changed.
    pub fn subscribe(&self) -> watch::Receiver<Option<SearchSnapshot>> {
        self.snapshots.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.search.try_lock().is_err()
    }

    /// Runs up to `rounds` batches of playouts on the current position and returns the
    /// last snapshot. Stops early on [`stop`](Self::stop) or when the position changes;
    /// in the latter case the result is [`SearchError::Superseded`].
    pub async fn analyze(&self) -> Result<SearchSnapshot, SearchError> {
        let mut slot = self.search.try_lock().map_err(|_| SearchError::Busy)?;
        self.cancel.store(false, Ordering::SeqCst);
        let GameState { board, epoch } = *self.lock_game();

        let driver = match slot.take() {
            Some((tree_epoch, driver)) if tree_epoch == epoch => driver,
            _ => {
                log::debug!(
                    "new search tree for epoch {} at ply {}",
                    epoch,
                    board.move_count()
                );
                let evaluator = Arc::clone(&self.evaluator);
                SearchDriver::with_params(&board, evaluator, self.config.search)
                    .with_cancel_flag(Arc::clone(&self.cancel))
            }
        };
        let (_, driver) = slot.insert((epoch, driver));

        let analysis = self.config.analysis;
        let mut last = driver.snapshot();
        for round in 0..analysis.rounds {
            if driver.is_cancelled() || self.lock_game().epoch != epoch {
                log::debug!("analysis interrupted before round {}", round);
                break;
            }
            let report = driver.playouts(analysis.playouts_per_round).await?;
            last = driver.snapshot();
            self.publish(epoch, &last);
            if report.cancelled {
                break;
            }
            if analysis.round_pause_ms > 0 {
                tokio::time::sleep(Duration::from_millis(analysis.round_pause_ms)).await;
            } else {
                tokio::task::yield_now().await;
            }
        }

        if self.lock_game().epoch != epoch {
            log::debug!("analysis of ply {} superseded", last.move_count);
            return Err(SearchError::Superseded);
        }
        log::info!(
            "analysis at ply {}: {} visits, evaluation {:+.3}, best move {:?}",
            last.move_count,
            last.root_visits,
            last.evaluation,
            last.best_move
        );
        Ok(last)
    }

    fn publish(&self, epoch: u64, snapshot: &SearchSnapshot) {
        let game = self.lock_game();
        if game.epoch == epoch {
            self.snapshots.send_replace(Some(snapshot.clone()));
        }
    }

    /// Plays `column` on the authoritative board. The current search is cancelled and its
    /// tree discarded.
    pub fn play_move(&self, column: usize) -> Result<Board, GameError> {
        let board = {
            let mut game = self.lock_game();
            game.board.apply_move(column)?;
            game.epoch += 1;
            game.board
        };
        log::info!("played column {} (ply {})", column, board.move_count());
        self.invalidate();
        Ok(board)
    }

    /// Back to the empty board, discarding any analysis.
    pub fn reset(&self) {
        {
            let mut game = self.lock_game();
            game.board = Board::new();
            game.epoch += 1;
        }
        log::info!("game reset");
        self.invalidate();
    }

    /// Asks a running analysis to stop after its current playout.
    pub fn stop(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    fn invalidate(&self) {
        self.cancel.store(true, Ordering::SeqCst);
        self.snapshots.send_replace(None);
        // A running analysis still holds the slot; it sees the new epoch and stops, and
        // the next analysis replaces the stale tree.
        if let Ok(mut slot) = self.search.try_lock() {
            *slot = None;
        }
    }
}
