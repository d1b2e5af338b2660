use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use gravc4::game::{Board, GameResult, Player};
use gravc4::logging::setup_logging;
use gravc4::mcts::{EngineConfig, SearchSnapshot};
use gravc4::neural::{Evaluator, NeuralConfig, NeuralManager, UniformEvaluator};
use gravc4::services::AnalysisSession;

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Analyse the position and report visit fractions and evaluation
    Analyze,
    /// Let the engine play both sides until the game ends
    Play,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EvaluatorKind {
    /// Residual policy/value network
    Neural,
    /// Flat priors and neutral values
    Uniform,
}

#[derive(Parser, Debug)]
#[command(name = "gravc4", version, about)]
struct Config {
    #[arg(value_enum, default_value = "analyze")]
    mode: Mode,

    /// Columns played from the empty board, e.g. 3,3,4
    #[arg(short = 'm', long, value_delimiter = ',')]
    moves: Vec<usize>,

    /// Analysis rounds (overrides the config file)
    #[arg(short = 'r', long)]
    rounds: Option<usize>,

    /// Playouts per round (overrides the config file)
    #[arg(short = 'b', long)]
    batch: Option<usize>,

    /// JSON file with `search` and `analysis` sections
    #[arg(long)]
    hyperparams: Option<PathBuf>,

    /// Directory holding gravc4.params
    #[arg(long, default_value = "model_weights")]
    model_path: String,

    #[arg(long, value_enum, default_value = "neural")]
    evaluator: EvaluatorKind,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Write rotated log files here instead of stderr
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Config {
    fn engine_config(&self) -> gravc4::Result<EngineConfig> {
        let mut engine = match &self.hyperparams {
            Some(path) => EngineConfig::from_json_file(path)?,
            None => EngineConfig::default(),
        };
        if let Some(rounds) = self.rounds {
            engine.analysis.rounds = rounds;
        }
        if let Some(batch) = self.batch {
            engine.analysis.playouts_per_round = batch;
        }
        engine.validate()?;
        Ok(engine)
    }
}

fn print_snapshot(snapshot: &SearchSnapshot) {
    println!("visits: {}", snapshot.root_visits);
    for child in &snapshot.children {
        println!(
            "  column {}: {:5.1}%  prior {:.3}  q {:+.3}{}",
            child.column,
            100.0 * snapshot.visit_fractions[child.column],
            child.prior,
            child.mean_value,
            match child.outcome {
                Some(outcome) => format!("  ({outcome:?})"),
                None => String::new(),
            }
        );
    }
    println!("evaluation (second player): {:+.3}", snapshot.evaluation);
    match snapshot.best_move {
        Some(column) => println!("best move: {column}"),
        None => println!("best move: none"),
    }
}

fn describe_result(result: Option<GameResult>) -> &'static str {
    match result {
        Some(GameResult::Win(Player::First)) => "first player wins",
        Some(GameResult::Win(Player::Second)) => "second player wins",
        Some(GameResult::Draw) => "draw",
        None => "unfinished",
    }
}

async fn run<E: Evaluator + 'static>(
    mode: Mode,
    engine: EngineConfig,
    evaluator: Arc<E>,
    board: Board,
) -> gravc4::Result<()> {
    let session = AnalysisSession::with_board(evaluator, engine, board);

    let mut updates = session.subscribe();
    let watcher = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            if let Some(snapshot) = updates.borrow_and_update().as_ref() {
                log::debug!(
                    "ply {}: {} visits, evaluation {:+.3}",
                    snapshot.move_count,
                    snapshot.root_visits,
                    snapshot.evaluation
                );
            }
        }
    });

    println!("{}", session.board());
    match mode {
        Mode::Analyze => {
            let snapshot = session.analyze().await?;
            print_snapshot(&snapshot);
        }
        Mode::Play => {
            while !session.board().is_terminal() {
                let snapshot = session.analyze().await?;
                let Some(column) = snapshot.best_move else {
                    break;
                };
                let board = session.play_move(column)?;
                println!("move {}: column {}", board.move_count(), column);
                println!("{board}");
            }
            println!("result: {}", describe_result(session.board().result()));
        }
    }

    drop(session);
    if let Err(e) = watcher.await {
        log::warn!("snapshot watcher ended abnormally: {}", e);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    let _logger = setup_logging(&config.log_level, config.log_dir.as_deref())?;

    let engine = config.engine_config()?;
    log::info!("🔧 {}", engine.search.to_config_string());
    let board = Board::from_moves(&config.moves)?;

    match config.evaluator {
        EvaluatorKind::Neural => {
            let neural_config = NeuralConfig {
                model_path: config.model_path.clone(),
                ..Default::default()
            };
            let evaluator = NeuralManager::with_config(neural_config)?.into_evaluator();
            run(config.mode, engine, Arc::new(evaluator), board).await?;
        }
        EvaluatorKind::Uniform => {
            run(config.mode, engine, Arc::new(UniformEvaluator), board).await?;
        }
    }
    Ok(())
}
