//! Integration tests for the library public API

use gravc4::game::{GameError, IllegalReason};
use gravc4::mcts::{EngineConfig, SearchError};
use gravc4::neural::EvaluatorError;
use gravc4::{GravC4Error, Result, DESCRIPTION, NAME, VERSION};
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_library_metadata() {
    assert!(!VERSION.is_empty());
    assert_eq!(NAME, "gravc4");
    assert!(!DESCRIPTION.is_empty());
}

#[test]
fn test_error_conversions() {
    let game: GravC4Error = GameError::IllegalMove {
        column: 2,
        reason: IllegalReason::ColumnFull,
    }
    .into();
    assert!(matches!(game, GravC4Error::Game(_)));
    assert!(game.to_string().contains("column 2"));

    let search: GravC4Error = SearchError::Busy.into();
    assert!(matches!(search, GravC4Error::Search(SearchError::Busy)));

    let evaluator: GravC4Error = EvaluatorError::Backend("down".to_string()).into();
    assert!(matches!(evaluator, GravC4Error::Evaluator(_)));

    let io: GravC4Error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert!(matches!(io, GravC4Error::Io(_)));
}

#[test]
fn test_result_type_alias() {
    let success: Result<i32> = Ok(42);
    assert_eq!(assert_ok!(success), 42);

    let failure: Result<i32> = Err(SearchError::Busy.into());
    assert_err!(failure);
}

#[test]
fn test_engine_config_from_partial_json() {
    let config = assert_ok!(EngineConfig::from_json_str(
        r#"{ "analysis": { "rounds": 10 } }"#
    ));
    assert_eq!(config.analysis.rounds, 10);
    assert_eq!(config.analysis.playouts_per_round, 5);
    assert_eq!(config.search.c_base, 19652.0);

    let invalid = EngineConfig::from_json_str(r#"{ "analysis": { "playouts_per_round": 0 } }"#);
    assert!(matches!(
        invalid,
        Err(GravC4Error::Search(SearchError::InvalidConfig { .. }))
    ));
}
