//! Trainer integration tests
//!
//! End-to-end offline training: CSV load, forest fit, artifact
//! persistence, and reload into a serving classifier.

use agrosense::model::{load_classifier, train, Dataset, TrainOptions};
use agrosense::{FeatureVector, FEATURE_NAMES};

/// A small separable dataset: wet/warm rice rows vs dry/cool wheat rows.
fn dataset_csv() -> String {
    let mut csv = String::from("N,P,K,temperature,humidity,ph,rainfall,label\n");
    for i in 0..30 {
        let jitter = f64::from(i);
        csv.push_str(&format!(
            "{},{},42,{},{},6.2,{},rice\n",
            82.0 + jitter % 8.0,
            44.0 + jitter % 5.0,
            27.0 + jitter % 3.0,
            78.0 + jitter % 6.0,
            190.0 + jitter
        ));
        csv.push_str(&format!(
            "{},{},38,{},{},6.9,{},wheat\n",
            58.0 + jitter % 8.0,
            52.0 + jitter % 5.0,
            16.0 + jitter % 3.0,
            42.0 + jitter % 6.0,
            48.0 + jitter
        ));
    }
    csv
}

fn quick_options() -> TrainOptions {
    TrainOptions {
        trees: 20,
        max_depth: 10,
        ..TrainOptions::default()
    }
}

fn rice_like() -> FeatureVector {
    FeatureVector {
        nitrogen: 84.0,
        phosphorus: 46.0,
        potassium: 42.0,
        temperature: 28.0,
        humidity: 80.0,
        ph: 6.2,
        rainfall: 200.0,
    }
}

fn wheat_like() -> FeatureVector {
    FeatureVector {
        nitrogen: 60.0,
        phosphorus: 54.0,
        potassium: 38.0,
        temperature: 17.0,
        humidity: 44.0,
        ph: 6.9,
        rainfall: 50.0,
    }
}

#[test]
fn test_train_save_load_predict() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let csv_path = dir.path().join("crop_data.csv");
    std::fs::write(&csv_path, dataset_csv()).expect("write dataset");

    let dataset = Dataset::from_csv(&csv_path).expect("load dataset");
    assert_eq!(dataset.len(), 60);
    assert_eq!(
        dataset.label_names,
        vec!["rice".to_string(), "wheat".to_string()]
    );

    let (artifact, report) = train(&dataset, &quick_options()).expect("training");
    assert!(
        report.holdout_accuracy > 0.9,
        "holdout accuracy {} too low",
        report.holdout_accuracy
    );
    assert_eq!(artifact.feature_names, FEATURE_NAMES);
    assert_eq!(artifact.metadata.dataset_rows, 60);

    let model_path = dir.path().join("crop_model.json");
    artifact.save_to_disk(&model_path).expect("save artifact");

    let classifier = load_classifier(&model_path).expect("reload artifact");
    assert_eq!(classifier.num_trees(), 20);
    assert_eq!(classifier.predict(&rice_like()).expect("predict"), "rice");
    assert_eq!(classifier.predict(&wheat_like()).expect("predict"), "wheat");
}

#[test]
fn test_reload_preserves_predictions() {
    let dataset = Dataset::from_csv_str(&dataset_csv()).expect("parse dataset");
    let (artifact, _) = train(&dataset, &quick_options()).expect("training");

    let before = artifact
        .clone()
        .into_classifier()
        .expect("validate")
        .predict(&rice_like())
        .expect("predict");

    let dir = tempfile::tempdir().expect("tmpdir");
    let path = dir.path().join("crop_model.json");
    artifact.save_to_disk(&path).expect("save");
    let after = load_classifier(&path)
        .expect("reload")
        .predict(&rice_like())
        .expect("predict");

    assert_eq!(before, after);
}

#[test]
fn test_same_seed_same_forest() {
    let dataset = Dataset::from_csv_str(&dataset_csv()).expect("parse dataset");
    let (a, _) = train(&dataset, &quick_options()).expect("first run");
    let (b, _) = train(&dataset, &quick_options()).expect("second run");
    assert_eq!(a.trees, b.trees);

    let mut opts = quick_options();
    opts.seed = 7;
    let (c, _) = train(&dataset, &opts).expect("reseeded run");
    // A different seed reshuffles bootstraps; forests should differ
    assert_ne!(a.trees, c.trees);
}
