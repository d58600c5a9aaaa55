//! Offline random-forest training.
//!
//! Fits the crop classifier from a labeled CSV dataset: seeded shuffled
//! train/holdout split, bootstrap-sampled CART trees split on Gini
//! impurity with sqrt-feature subsampling, holdout accuracy on the held
//! back rows. Trees are grown in parallel; determinism is preserved by
//! deriving every per-tree seed from the master seed before the parallel
//! region.

use crate::model::artifact::{ArtifactMetadata, ModelArtifact, ARTIFACT_VERSION};
use crate::model::forest::{CropClassifier, DecisionTree, TreeNode};
use crate::types::{FEATURE_NAMES, NUM_FEATURES};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Features considered per split (≈ sqrt of the 7-feature contract).
const FEATURES_PER_SPLIT: usize = 3;

/// Training errors.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("dataset I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("dataset header mismatch: {0}")]
    HeaderMismatch(String),
    #[error("dataset contains no usable rows")]
    EmptyDataset,
    #[error("dataset needs at least 2 distinct labels, found {0}")]
    TooFewLabels(usize),
    #[error("invalid training options: {0}")]
    InvalidOptions(String),
}

/// Tunable training options.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Number of trees in the forest.
    pub trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to attempt a split.
    pub min_samples_split: usize,
    /// Fraction of rows held back for accuracy evaluation.
    pub test_split: f64,
    /// Master seed; fixes the split, bootstraps, and feature subsampling.
    pub seed: u64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            trees: 100,
            max_depth: 12,
            min_samples_split: 2,
            test_split: 0.2,
            seed: 42,
        }
    }
}

/// Summary of one training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub train_rows: usize,
    pub holdout_rows: usize,
    pub holdout_accuracy: f64,
}

// ============================================================================
// Dataset
// ============================================================================

/// In-memory labeled dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature rows in [`FEATURE_NAMES`] order.
    pub features: Vec<[f64; NUM_FEATURES]>,
    /// Per-row indices into `label_names`.
    pub labels: Vec<usize>,
    /// Sorted distinct label names; index order is the vote order.
    pub label_names: Vec<String>,
}

impl Dataset {
    /// Load a CSV dataset with a `N,P,K,temperature,humidity,ph,rainfall,label`
    /// header (long nutrient names are accepted too).
    ///
    /// Malformed rows are skipped with a warning rather than failing the
    /// whole load.
    pub fn from_csv(path: &Path) -> Result<Self, TrainingError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_csv_str(&contents)
    }

    /// Parse CSV content. See [`Dataset::from_csv`].
    pub fn from_csv_str(contents: &str) -> Result<Self, TrainingError> {
        let mut lines = contents.lines();
        let header = lines.next().ok_or(TrainingError::EmptyDataset)?;
        validate_header(header)?;

        let mut rows: Vec<([f64; NUM_FEATURES], String)> = Vec::new();
        let mut skipped = 0usize;
        for (line_no, line) in lines.enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match parse_row(line) {
                Some(row) => rows.push(row),
                None => {
                    skipped += 1;
                    warn!(line = line_no + 2, "Skipping malformed dataset row");
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "Dataset rows skipped during load");
        }
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        // Sorted label table keeps index assignment deterministic
        let distinct: BTreeSet<String> = rows.iter().map(|(_, label)| label.clone()).collect();
        let label_names: Vec<String> = distinct.into_iter().collect();
        let index_of = |name: &str| -> usize {
            label_names
                .iter()
                .position(|l| l == name)
                .unwrap_or_default()
        };

        let mut features = Vec::with_capacity(rows.len());
        let mut labels = Vec::with_capacity(rows.len());
        for (row, label) in rows {
            features.push(row);
            labels.push(index_of(&label));
        }

        Ok(Self {
            features,
            labels,
            label_names,
        })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// True when the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn validate_header(header: &str) -> Result<(), TrainingError> {
    let columns: Vec<String> = header
        .split(',')
        .map(|c| c.trim().to_lowercase())
        .collect();
    if columns.len() != NUM_FEATURES + 1 {
        return Err(TrainingError::HeaderMismatch(format!(
            "expected {} columns, found {}",
            NUM_FEATURES + 1,
            columns.len()
        )));
    }
    // The stock dataset abbreviates the nutrient columns to N/P/K
    let accepted: [&[&str]; NUM_FEATURES] = [
        &["n", "nitrogen"],
        &["p", "phosphorus"],
        &["k", "potassium"],
        &["temperature"],
        &["humidity"],
        &["ph"],
        &["rainfall"],
    ];
    for (idx, names) in accepted.iter().enumerate() {
        if !names.contains(&columns[idx].as_str()) {
            return Err(TrainingError::HeaderMismatch(format!(
                "column {} is '{}', expected '{}'",
                idx + 1,
                columns[idx],
                FEATURE_NAMES[idx]
            )));
        }
    }
    if columns[NUM_FEATURES] != "label" {
        return Err(TrainingError::HeaderMismatch(format!(
            "last column is '{}', expected 'label'",
            columns[NUM_FEATURES]
        )));
    }
    Ok(())
}

fn parse_row(line: &str) -> Option<([f64; NUM_FEATURES], String)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != NUM_FEATURES + 1 {
        return None;
    }
    let mut row = [0.0; NUM_FEATURES];
    for (idx, field) in fields[..NUM_FEATURES].iter().enumerate() {
        let value: f64 = field.parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        row[idx] = value;
    }
    let label = fields[NUM_FEATURES].to_lowercase();
    if label.is_empty() {
        return None;
    }
    Some((row, label))
}

// ============================================================================
// Training
// ============================================================================

/// Train a forest and package it as a model artifact.
pub fn train(
    dataset: &Dataset,
    opts: &TrainOptions,
) -> Result<(ModelArtifact, TrainReport), TrainingError> {
    if dataset.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    if dataset.label_names.len() < 2 {
        return Err(TrainingError::TooFewLabels(dataset.label_names.len()));
    }
    if opts.trees == 0 {
        return Err(TrainingError::InvalidOptions(
            "trees must be greater than zero".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&opts.test_split) {
        return Err(TrainingError::InvalidOptions(format!(
            "test_split {} outside [0.0, 1.0)",
            opts.test_split
        )));
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    indices.shuffle(&mut rng);

    let mut holdout_len = (dataset.len() as f64 * opts.test_split).round() as usize;
    if holdout_len >= dataset.len() {
        holdout_len = dataset.len() - 1;
    }
    let (holdout_idx, train_idx) = indices.split_at(holdout_len);

    // Per-tree seeds come off the master rng before the parallel region,
    // so tree construction order cannot depend on thread scheduling.
    let tree_seeds: Vec<u64> = (0..opts.trees).map(|_| rng.gen()).collect();

    let num_labels = dataset.label_names.len();
    let trees: Vec<DecisionTree> = tree_seeds
        .par_iter()
        .map(|&seed| {
            let mut tree_rng = StdRng::seed_from_u64(seed);
            let sample = bootstrap_sample(train_idx, &mut tree_rng);
            DecisionTree {
                root: build_node(dataset, &sample, num_labels, 0, opts, &mut tree_rng),
            }
        })
        .collect();

    let classifier = CropClassifier::from_parts(dataset.label_names.clone(), trees);
    let eval_idx = if holdout_idx.is_empty() {
        train_idx
    } else {
        holdout_idx
    };
    let correct = eval_idx
        .iter()
        .filter(|&&i| classifier.vote(&dataset.features[i]) == dataset.labels[i])
        .count();
    let accuracy = correct as f64 / eval_idx.len() as f64;

    info!(
        trees = opts.trees,
        train_rows = train_idx.len(),
        holdout_rows = holdout_idx.len(),
        accuracy = format!("{:.3}", accuracy),
        "Forest training complete"
    );

    let trees = classifier.trees().to_vec();
    let artifact = ModelArtifact {
        version: ARTIFACT_VERSION,
        feature_names: FEATURE_NAMES.iter().map(ToString::to_string).collect(),
        labels: dataset.label_names.clone(),
        trees,
        metadata: ArtifactMetadata {
            trained_at: chrono::Utc::now().to_rfc3339(),
            dataset_rows: dataset.len(),
            holdout_accuracy: accuracy,
            seed: opts.seed,
        },
    };
    let report = TrainReport {
        train_rows: train_idx.len(),
        holdout_rows: holdout_idx.len(),
        holdout_accuracy: accuracy,
    };
    Ok((artifact, report))
}

/// Draw a bootstrap sample (with replacement) from the training indices.
fn bootstrap_sample(train_idx: &[usize], rng: &mut StdRng) -> Vec<usize> {
    (0..train_idx.len())
        .map(|_| train_idx[rng.gen_range(0..train_idx.len())])
        .collect()
}

/// Grow one CART node recursively.
fn build_node(
    dataset: &Dataset,
    sample: &[usize],
    num_labels: usize,
    depth: usize,
    opts: &TrainOptions,
    rng: &mut StdRng,
) -> TreeNode {
    let counts = label_counts(dataset, sample, num_labels);
    let majority = argmax(&counts);

    let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
    if is_pure || depth >= opts.max_depth || sample.len() < opts.min_samples_split {
        return TreeNode::Leaf { label: majority };
    }

    let Some((feature, threshold)) = best_split(dataset, sample, num_labels, rng) else {
        return TreeNode::Leaf { label: majority };
    };

    let (left, right): (Vec<usize>, Vec<usize>) = sample
        .iter()
        .copied()
        .partition(|&i| dataset.features[i][feature] <= threshold);

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(dataset, &left, num_labels, depth + 1, opts, rng)),
        right: Box::new(build_node(dataset, &right, num_labels, depth + 1, opts, rng)),
    }
}

/// Pick the Gini-minimizing split over a random feature subset.
///
/// Returns `None` when no candidate feature separates the sample.
fn best_split(
    dataset: &Dataset,
    sample: &[usize],
    num_labels: usize,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    let candidates = rand::seq::index::sample(rng, NUM_FEATURES, FEATURES_PER_SPLIT);
    let total = sample.len() as f64;

    let mut best: Option<(f64, usize, f64)> = None;
    for feature in candidates {
        // Sort (value, label) pairs once per candidate feature
        let mut pairs: Vec<(f64, usize)> = sample
            .iter()
            .map(|&i| (dataset.features[i][feature], dataset.labels[i]))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut left_counts = vec![0usize; num_labels];
        let mut right_counts = vec![0usize; num_labels];
        for &(_, label) in &pairs {
            right_counts[label] += 1;
        }

        for i in 1..pairs.len() {
            let moved = pairs[i - 1].1;
            left_counts[moved] += 1;
            right_counts[moved] -= 1;

            if pairs[i].0 <= pairs[i - 1].0 {
                continue;
            }

            let left_n = i as f64;
            let right_n = total - left_n;
            let weighted = (left_n / total) * gini(&left_counts, left_n)
                + (right_n / total) * gini(&right_counts, right_n);

            let threshold = (pairs[i - 1].0 + pairs[i].0) / 2.0;
            let better = match best {
                Some((g, _, _)) => weighted < g,
                None => true,
            };
            if better {
                best = Some((weighted, feature, threshold));
            }
        }
    }
    best.map(|(_, feature, threshold)| (feature, threshold))
}

fn gini(counts: &[usize], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn label_counts(dataset: &Dataset, sample: &[usize], num_labels: usize) -> Vec<usize> {
    let mut counts = vec![0usize; num_labels];
    for &i in sample {
        counts[dataset.labels[i]] += 1;
    }
    counts
}

/// Index of the largest count, ties toward the lowest index.
fn argmax(counts: &[usize]) -> usize {
    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    best
}
