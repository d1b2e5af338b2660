pub mod driver;
pub mod error;
pub mod hyperparameters;
pub mod node;
pub mod selection;
pub mod snapshot;
pub mod tree;

pub use driver::{BatchReport, PlayoutKind, SearchDriver};
pub use error::SearchError;
pub use hyperparameters::{AnalysisConfig, EngineConfig, SearchHyperparameters};
pub use node::{NodeId, Outcome, SearchNode};
pub use snapshot::{ChildStats, SearchSnapshot};
pub use tree::SearchTree;
