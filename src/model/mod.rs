//! Crop classifier: forest inference, artifact persistence, offline training.
//!
//! The serving path only touches [`forest`] and [`artifact`]; [`training`]
//! backs the `train` subcommand and never runs inside a request.

pub mod artifact;
pub mod forest;
pub mod training;

pub use artifact::{load_classifier, ArtifactError, ArtifactMetadata, ModelArtifact, ARTIFACT_VERSION};
pub use forest::{CropClassifier, DecisionTree, PredictError, TreeNode};
pub use training::{train, Dataset, TrainOptions, TrainReport, TrainingError};
