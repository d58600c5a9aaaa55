//! Model artifact serialization.
//!
//! The trained classifier is persisted as a versioned JSON artifact and
//! loaded once at process start. Loading validates the artifact against
//! the feature contract before any prediction can run: a forest trained
//! on a different feature order is rejected here instead of silently
//! mis-predicting.

use crate::model::forest::{CropClassifier, DecisionTree};
use crate::types::{FEATURE_NAMES, NUM_FEATURES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Current artifact format version.
pub const ARTIFACT_VERSION: u32 = 1;

/// Artifact load/save errors.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("artifact parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported artifact version {0} (this build reads version {ARTIFACT_VERSION})")]
    UnsupportedVersion(u32),
    #[error("feature order mismatch: artifact trained on {found:?}, this build expects {expected:?}")]
    FeatureOrderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("artifact contains no trees")]
    EmptyForest,
    #[error("artifact contains no labels")]
    EmptyLabels,
    #[error("tree {tree} references label {label}, outside the {num_labels}-entry label table")]
    LabelOutOfRange {
        tree: usize,
        label: usize,
        num_labels: usize,
    },
    #[error("tree {tree} splits on feature {feature}, outside the {NUM_FEATURES}-feature contract")]
    FeatureOutOfRange { tree: usize, feature: usize },
}

/// Provenance recorded alongside the forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
    /// Rows in the training dataset (before the holdout split).
    pub dataset_rows: usize,
    /// Accuracy on the holdout split.
    pub holdout_accuracy: f64,
    /// Seed the training run was fixed to.
    pub seed: u64,
}

/// Serialized form of a trained crop classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Format version for forward compatibility.
    pub version: u32,
    /// Feature order the forest was trained on.
    pub feature_names: Vec<String>,
    /// Label table; leaf indices point into this.
    pub labels: Vec<String>,
    /// The forest.
    pub trees: Vec<DecisionTree>,
    /// Training provenance.
    pub metadata: ArtifactMetadata,
}

impl ModelArtifact {
    /// Validate the artifact and convert it into a usable classifier.
    pub fn into_classifier(self) -> Result<CropClassifier, ArtifactError> {
        if self.version != ARTIFACT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(self.version));
        }
        if self.feature_names != FEATURE_NAMES {
            return Err(ArtifactError::FeatureOrderMismatch {
                expected: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
                found: self.feature_names,
            });
        }
        if self.trees.is_empty() {
            return Err(ArtifactError::EmptyForest);
        }
        if self.labels.is_empty() {
            return Err(ArtifactError::EmptyLabels);
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            let max_label = tree.max_leaf_label();
            if max_label >= self.labels.len() {
                return Err(ArtifactError::LabelOutOfRange {
                    tree: idx,
                    label: max_label,
                    num_labels: self.labels.len(),
                });
            }
            if let Some(feature) = tree.max_split_feature() {
                if feature >= NUM_FEATURES {
                    return Err(ArtifactError::FeatureOutOfRange { tree: idx, feature });
                }
            }
        }
        Ok(CropClassifier::from_parts(self.labels, self.trees))
    }

    /// Save to disk atomically (write temp file, then rename).
    pub fn save_to_disk(&self, path: &Path) -> Result<(), ArtifactError> {
        let json = serde_json::to_vec(self)?;
        let tmp_path = path.with_extension("json.tmp");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&tmp_path, &json)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Load an artifact from disk without validating it.
    pub fn load_from_disk(path: &Path) -> Result<Self, ArtifactError> {
        let data = std::fs::read(path)?;
        Ok(serde_json::from_slice(&data)?)
    }
}

/// Load and validate a classifier from an artifact file.
pub fn load_classifier(path: &Path) -> Result<CropClassifier, ArtifactError> {
    ModelArtifact::load_from_disk(path)?.into_classifier()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::forest::TreeNode;

    fn sample_artifact() -> ModelArtifact {
        ModelArtifact {
            version: ARTIFACT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
            labels: vec!["rice".to_string(), "wheat".to_string()],
            trees: vec![DecisionTree {
                root: TreeNode::Split {
                    feature: 0,
                    threshold: 80.0,
                    left: Box::new(TreeNode::Leaf { label: 0 }),
                    right: Box::new(TreeNode::Leaf { label: 1 }),
                },
            }],
            metadata: ArtifactMetadata {
                trained_at: "2025-01-01T00:00:00Z".to_string(),
                dataset_rows: 10,
                holdout_accuracy: 1.0,
                seed: 42,
            },
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let artifact = sample_artifact();
        let json = serde_json::to_string(&artifact).expect("serialize");
        let restored: ModelArtifact = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.labels, artifact.labels);
        assert_eq!(restored.trees, artifact.trees);
    }

    #[test]
    fn test_valid_artifact_converts() {
        let clf = sample_artifact().into_classifier().expect("should validate");
        assert_eq!(clf.labels(), ["rice", "wheat"]);
        assert_eq!(clf.num_trees(), 1);
    }

    #[test]
    fn test_reject_feature_order_mismatch() {
        let mut artifact = sample_artifact();
        artifact.feature_names.swap(0, 6);
        let err = artifact.into_classifier().unwrap_err();
        assert!(matches!(err, ArtifactError::FeatureOrderMismatch { .. }));
    }

    #[test]
    fn test_reject_empty_forest() {
        let mut artifact = sample_artifact();
        artifact.trees.clear();
        assert!(matches!(
            artifact.into_classifier().unwrap_err(),
            ArtifactError::EmptyForest
        ));
    }

    #[test]
    fn test_reject_label_out_of_range() {
        let mut artifact = sample_artifact();
        artifact.labels.pop();
        assert!(matches!(
            artifact.into_classifier().unwrap_err(),
            ArtifactError::LabelOutOfRange { .. }
        ));
    }

    #[test]
    fn test_reject_unsupported_version() {
        let mut artifact = sample_artifact();
        artifact.version = 99;
        assert!(matches!(
            artifact.into_classifier().unwrap_err(),
            ArtifactError::UnsupportedVersion(99)
        ));
    }

    #[test]
    fn test_disk_persistence() {
        let artifact = sample_artifact();
        let dir = tempfile::tempdir().expect("tmpdir");
        let path = dir.path().join("crop_model.json");

        artifact.save_to_disk(&path).expect("save");
        let loaded = ModelArtifact::load_from_disk(&path).expect("load");

        assert_eq!(loaded.version, artifact.version);
        assert_eq!(loaded.labels, artifact.labels);
        assert_eq!(loaded.metadata.seed, 42);
    }
}
