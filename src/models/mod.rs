//! Model artifacts and inference components

pub mod forest;
pub mod inference;
pub mod loader;
pub mod scaler;

pub use forest::{DecisionTree, ForestModel};
pub use inference::InferenceEngine;
pub use loader::ArtifactLoader;
pub use scaler::StandardScaler;
