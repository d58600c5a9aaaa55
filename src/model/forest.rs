//! Random-forest crop classifier inference.
//!
//! The forest is a fixed, fully-trained ensemble restored from a model
//! artifact; inference is a pure function of the artifact and the input
//! vector. Majority vote across trees, ties broken toward the lowest
//! label index so the same 7-tuple always yields the same label.

use crate::types::{FeatureVector, FEATURE_NAMES, NUM_FEATURES};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prediction input errors.
///
/// These surface to the caller unchanged; malformed inputs are never
/// silently coerced into a prediction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("invalid input: expected {NUM_FEATURES} features, got {0}")]
    InvalidArity(usize),
    #[error("invalid input: feature '{0}' is not a finite number")]
    NonFinite(&'static str),
}

// ============================================================================
// Trees
// ============================================================================

/// A single decision-tree node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Terminal node carrying an index into the forest's label table.
    Leaf { label: usize },
    /// Binary split: `feature <= threshold` goes left, else right.
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// One CART tree of the forest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionTree {
    pub root: TreeNode,
}

impl DecisionTree {
    /// Walk the tree for one feature array, returning the leaf label index.
    pub fn predict(&self, features: &[f64; NUM_FEATURES]) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Largest label index referenced by any leaf.
    pub fn max_leaf_label(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { label } => *label,
                TreeNode::Split { left, right, .. } => walk(left).max(walk(right)),
            }
        }
        walk(&self.root)
    }

    /// Largest feature index referenced by any split.
    pub fn max_split_feature(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            match node {
                TreeNode::Leaf { .. } => None,
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    let below = walk(left).into_iter().chain(walk(right)).max();
                    Some(below.map_or(*feature, |m| m.max(*feature)))
                }
            }
        }
        walk(&self.root)
    }

    /// Number of nodes in the tree (splits + leaves).
    pub fn node_count(&self) -> usize {
        fn walk(node: &TreeNode) -> usize {
            match node {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => 1 + walk(left) + walk(right),
            }
        }
        walk(&self.root)
    }
}

// ============================================================================
// Forest
// ============================================================================

/// Pre-trained crop classifier: a label table plus a forest of trees.
///
/// Constructed only through artifact validation
/// ([`crate::model::ModelArtifact::into_classifier`]) or the trainer, so
/// every leaf is known to index into `labels` and every split into
/// [`FEATURE_NAMES`].
#[derive(Debug, Clone)]
pub struct CropClassifier {
    labels: Vec<String>,
    trees: Vec<DecisionTree>,
}

impl CropClassifier {
    pub(crate) fn from_parts(labels: Vec<String>, trees: Vec<DecisionTree>) -> Self {
        Self { labels, trees }
    }

    /// Crop labels this classifier can emit, in vote order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of trees in the forest.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub(crate) fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Majority vote over the forest for one feature array.
    ///
    /// Ties break toward the lowest label index, keeping prediction a
    /// pure function of artifact and input.
    pub fn vote(&self, features: &[f64; NUM_FEATURES]) -> usize {
        let mut counts = vec![0usize; self.labels.len()];
        for tree in &self.trees {
            counts[tree.predict(features)] += 1;
        }
        let mut best = 0;
        for (idx, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = idx;
            }
        }
        best
    }

    /// Predict the crop label for a validated feature vector.
    ///
    /// # Errors
    ///
    /// [`PredictError::NonFinite`] when any component is NaN or infinite.
    pub fn predict(&self, features: &FeatureVector) -> Result<String, PredictError> {
        let array = features.to_array();
        for (value, name) in array.iter().zip(FEATURE_NAMES) {
            if !value.is_finite() {
                return Err(PredictError::NonFinite(name));
            }
        }
        Ok(self.labels[self.vote(&array)].clone())
    }

    /// Predict from a raw positional slice, checking arity first.
    ///
    /// The slice must follow [`FEATURE_NAMES`] order.
    pub fn predict_slice(&self, features: &[f64]) -> Result<String, PredictError> {
        if features.len() != NUM_FEATURES {
            return Err(PredictError::InvalidArity(features.len()));
        }
        let vector = FeatureVector {
            nitrogen: features[0],
            phosphorus: features[1],
            potassium: features[2],
            temperature: features[3],
            humidity: features[4],
            ph: features[5],
            rainfall: features[6],
        };
        self.predict(&vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: usize) -> Box<TreeNode> {
        Box::new(TreeNode::Leaf { label })
    }

    /// Two trees voting "rice" when nitrogen <= 80, one always "wheat".
    fn tiny_classifier() -> CropClassifier {
        let rice_tree = DecisionTree {
            root: TreeNode::Split {
                feature: 0,
                threshold: 80.0,
                left: leaf(0),
                right: leaf(1),
            },
        };
        let wheat_tree = DecisionTree {
            root: TreeNode::Leaf { label: 1 },
        };
        CropClassifier::from_parts(
            vec!["rice".to_string(), "wheat".to_string()],
            vec![rice_tree.clone(), rice_tree, wheat_tree],
        )
    }

    fn vector(nitrogen: f64) -> FeatureVector {
        FeatureVector {
            nitrogen,
            phosphorus: 45.0,
            potassium: 45.0,
            temperature: 25.0,
            humidity: 50.0,
            ph: 6.5,
            rainfall: 100.0,
        }
    }

    #[test]
    fn test_majority_vote() {
        let clf = tiny_classifier();
        assert_eq!(clf.predict(&vector(50.0)).unwrap(), "rice");
        assert_eq!(clf.predict(&vector(150.0)).unwrap(), "wheat");
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let clf = tiny_classifier();
        let fv = vector(72.5);
        let first = clf.predict(&fv).unwrap();
        let second = clf.predict(&fv).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_tie_breaks_to_lowest_label_index() {
        // One tree per label: a perfect tie
        let clf = CropClassifier::from_parts(
            vec!["rice".to_string(), "wheat".to_string()],
            vec![
                DecisionTree {
                    root: TreeNode::Leaf { label: 1 },
                },
                DecisionTree {
                    root: TreeNode::Leaf { label: 0 },
                },
            ],
        );
        assert_eq!(clf.predict(&vector(50.0)).unwrap(), "rice");
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let clf = tiny_classifier();
        let mut fv = vector(50.0);
        fv.rainfall = f64::INFINITY;
        assert_eq!(clf.predict(&fv), Err(PredictError::NonFinite("rainfall")));
    }

    #[test]
    fn test_wrong_arity_rejected() {
        let clf = tiny_classifier();
        assert_eq!(
            clf.predict_slice(&[1.0, 2.0, 3.0]),
            Err(PredictError::InvalidArity(3))
        );
    }

    #[test]
    fn test_slice_order_matches_contract() {
        let clf = tiny_classifier();
        let label = clf
            .predict_slice(&[50.0, 45.0, 45.0, 25.0, 50.0, 6.5, 100.0])
            .unwrap();
        assert_eq!(label, "rice");
    }
}
