//! Neural Network Manager
//!
//! Builds the policy/value network, loads stored weights and hands the network out as a
//! search [`Evaluator`].

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tch::{nn, Device};

use crate::game::board::{Board, COLUMNS};
use crate::neural::evaluator::{Evaluation, Evaluator, EvaluatorError};
use crate::neural::policy_value_net::PolicyValueNet;
use crate::neural::res_net_block::NORM_GROUPS;
use crate::neural::tensor_conversion::board_to_tensor;

pub const WEIGHTS_FILE: &str = "gravc4.params";

/// Configuration for neural network initialization
#[derive(Debug, Clone)]
pub struct NeuralConfig {
    /// Directory holding `gravc4.params`
    pub model_path: String,
    /// Device to use for computation (CPU/GPU)
    pub device: Device,
    /// Trunk width; must be a multiple of the GroupNorm group count
    pub channels: i64,
    /// Number of residual blocks
    pub blocks: usize,
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            model_path: "model_weights".to_string(),
            device: Device::Cpu,
            channels: 64,
            blocks: 4,
        }
    }
}

impl NeuralConfig {
    pub fn weights_path(&self) -> PathBuf {
        Path::new(&self.model_path).join(WEIGHTS_FILE)
    }
}

#[derive(Debug)]
pub struct NeuralManager {
    config: NeuralConfig,
    vs: nn::VarStore,
    net: PolicyValueNet,
    loaded: bool,
}

impl NeuralManager {
    pub fn new() -> Result<Self, EvaluatorError> {
        Self::with_config(NeuralConfig::default())
    }

    /// Builds the network and loads stored weights when present; otherwise keeps the
    /// freshly initialised ones.
    pub fn with_config(config: NeuralConfig) -> Result<Self, EvaluatorError> {
        if config.channels <= 0 || config.channels % NORM_GROUPS != 0 {
            return Err(EvaluatorError::Backend(format!(
                "trunk width {} is not a positive multiple of {}",
                config.channels, NORM_GROUPS
            )));
        }
        log::info!("🧠 Initializing policy/value network...");
        log::debug!(
            "Neural config: device={:?}, channels={}, blocks={}",
            config.device,
            config.channels,
            config.blocks
        );

        let mut vs = nn::VarStore::new(config.device);
        let net = PolicyValueNet::new(&vs, config.channels, config.blocks);

        let weights = config.weights_path();
        let loaded = if weights.exists() {
            match vs.load(&weights) {
                Ok(()) => {
                    log::info!("✅ Weights loaded from {}", weights.display());
                    true
                }
                Err(e) => {
                    log::warn!("⚠️ Failed to load weights from {}: {}", weights.display(), e);
                    false
                }
            }
        } else {
            log::warn!(
                "📁 No weights at {}, using freshly initialised network",
                weights.display()
            );
            false
        };

        Ok(Self {
            config,
            vs,
            net,
            loaded,
        })
    }

    pub fn config(&self) -> &NeuralConfig {
        &self.config
    }

    /// Whether stored weights replaced the initial ones.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn save(&self) -> Result<PathBuf, EvaluatorError> {
        std::fs::create_dir_all(&self.config.model_path)
            .map_err(|e| EvaluatorError::Backend(format!("create model dir: {e}")))?;
        let path = self.config.weights_path();
        self.vs.save(&path)?;
        log::info!("💾 Weights saved to {}", path.display());
        Ok(path)
    }

    pub fn into_evaluator(self) -> NeuralEvaluator {
        NeuralEvaluator {
            device: self.config.device,
            model: Mutex::new(NeuralModel {
                _vs: self.vs,
                net: self.net,
            }),
        }
    }
}

struct NeuralModel {
    // Owns the parameters referenced by `net`.
    _vs: nn::VarStore,
    net: PolicyValueNet,
}

/// Network-backed evaluator. Inference is serialised behind a mutex.
pub struct NeuralEvaluator {
    device: Device,
    model: Mutex<NeuralModel>,
}

impl NeuralEvaluator {
    fn infer(&self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        let input = board_to_tensor(board).to_device(self.device);
        let model = self.model.lock().unwrap_or_else(PoisonError::into_inner);
        let (policy, value) = tch::no_grad(|| model.net.forward(&input, false));
        drop(model);

        let scores = Vec::<f32>::try_from(policy.to_device(Device::Cpu).view([-1]))?;
        let policy: [f32; COLUMNS] = scores.try_into().map_err(|scores: Vec<f32>| {
            EvaluatorError::InvalidOutput(format!(
                "policy head produced {} scores, expected {}",
                scores.len(),
                COLUMNS
            ))
        })?;
        let value = value.f_double_value(&[0])? as f32;
        Ok(Evaluation { policy, value })
    }
}

impl Evaluator for NeuralEvaluator {
    async fn evaluate(&self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        self.infer(board)
    }
}
