//! Search and analysis configuration.
//!
//! Both sections can be loaded from a JSON file; missing fields fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::mcts::error::SearchError;

/// PUCT selection and policy masking constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchHyperparameters {
    /// Visit scale of the growing exploration weight `ln((N + c_base + 1) / c_base) + c_init`.
    /// Default: 19652
    pub c_base: f64,

    /// Exploration weight of an unvisited parent.
    /// Default: 2.0
    pub c_init: f64,

    /// Score given to a child whose result is already known, whatever that result is.
    /// Default: 999.0
    pub terminal_score: f64,

    /// Additive floor in the masked policy denominator.
    /// Default: 1e-7
    pub policy_floor: f64,
}

impl Default for SearchHyperparameters {
    fn default() -> Self {
        Self {
            c_base: 19652.0,
            c_init: 2.0,
            terminal_score: 999.0,
            policy_floor: 1e-7,
        }
    }
}

impl SearchHyperparameters {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(self.c_base.is_finite() && self.c_base > 0.0) {
            return Err(SearchError::invalid_config("c_base must be finite and > 0"));
        }
        if !(self.c_init.is_finite() && self.c_init >= 0.0) {
            return Err(SearchError::invalid_config("c_init must be finite and >= 0"));
        }
        if !self.terminal_score.is_finite() {
            return Err(SearchError::invalid_config("terminal_score must be finite"));
        }
        if !(self.policy_floor.is_finite() && self.policy_floor >= 0.0) {
            return Err(SearchError::invalid_config(
                "policy_floor must be finite and >= 0",
            ));
        }
        Ok(())
    }

    pub fn to_config_string(&self) -> String {
        format!(
            "c_base={:.0}_c_init={:.2}_terminal={:.0}_floor={:.0e}",
            self.c_base, self.c_init, self.terminal_score, self.policy_floor
        )
    }
}

/// "Think" loop settings of an analysis session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum number of rounds per analysis.
    /// Default: 200
    pub rounds: usize,

    /// Playouts per round; a snapshot is published after each round.
    /// Default: 5
    pub playouts_per_round: usize,

    /// Pause between rounds, leaving room for other tasks.
    /// Default: 5
    pub round_pause_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rounds: 200,
            playouts_per_round: 5,
            round_pause_ms: 5,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.rounds == 0 {
            return Err(SearchError::invalid_config("rounds must be > 0"));
        }
        if self.playouts_per_round == 0 {
            return Err(SearchError::invalid_config("playouts_per_round must be > 0"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchHyperparameters,
    pub analysis: AnalysisConfig,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        self.search.validate()?;
        self.analysis.validate()
    }

    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!(
            "Loaded engine config from {}: {}",
            path.display(),
            config.search.to_config_string()
        );
        Ok(config)
    }
}
