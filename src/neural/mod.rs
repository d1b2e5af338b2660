pub mod evaluator;
pub mod manager;
pub mod policy_value_net;
pub mod res_net_block;
pub mod tensor_conversion;

// Re-export key components for convenience
pub use evaluator::{mask_policy, Evaluation, Evaluator, EvaluatorError, UniformEvaluator};
pub use manager::{NeuralConfig, NeuralEvaluator, NeuralManager};
