use std::sync::Arc;

use serde_json::json;

use super::forest::ForestParams;
use super::*;
use crate::logic::config::RiskConfig;
use crate::logic::features::ObjectRecord;

fn small_config(dir: &std::path::Path) -> RiskConfig {
    let mut config = RiskConfig::default().with_model_dir(dir);
    config.sample_count = 1000;
    config.forest = ForestParams {
        n_trees: 20,
        ..Default::default()
    };
    config
}

fn records() -> Vec<ObjectRecord> {
    let mut records = vec![ObjectRecord::default()];
    for &diameter in &[5.0, 60.0, 300.0, 900.0] {
        for &velocity in &[8.0, 18.0, 30.0] {
            for &miss in &[500.0, 20_000.0, 5e6] {
                records.push(ObjectRecord {
                    diameter_max_m: Some(diameter),
                    velocity_km_s: Some(velocity),
                    miss_distance_km: Some(miss),
                    absolute_magnitude: None,
                });
            }
        }
    }
    records
}

#[test]
fn test_predictions_are_well_formed() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RiskEngine::from_config(&small_config(dir.path())).unwrap();

    for record in records() {
        let result = engine.try_predict(&record).unwrap();
        assert!(matches!(
            result.risk_level,
            RiskLevel::Low | RiskLevel::Medium | RiskLevel::Moderate | RiskLevel::High | RiskLevel::Uncertain
        ));
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.cluster_group < 5);
    }
}

#[test]
fn test_below_threshold_is_uncertain() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());
    let bundle = Arc::new(ModelBundle::load_or_train(&config).unwrap());

    let strict = RiskEngine::new(bundle.clone(), ThresholdConfig::new(1.5));
    let default = RiskEngine::new(bundle, ThresholdConfig::default());

    for record in records() {
        let result = strict.predict(&record);
        assert_eq!(result.risk_level, RiskLevel::Uncertain);

        let reference = default.predict(&record);
        assert_eq!(result.confidence, reference.confidence);
        if reference.confidence < 0.3 {
            assert_eq!(reference.risk_level, RiskLevel::Uncertain);
        }
    }
}

#[test]
fn test_empty_record_predicts() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RiskEngine::from_config(&small_config(dir.path())).unwrap();

    let result = engine.predict_value(&json!({}));
    assert_ne!(result.risk_level, RiskLevel::Unknown);
    assert!(result.confidence > 0.0);
}

#[test]
fn test_failures_degrade_to_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let engine = RiskEngine::from_config(&small_config(dir.path())).unwrap();

    assert_eq!(engine.predict_value(&json!("not an object")), RiskResult::unknown());
    assert_eq!(
        engine.predict_value(&json!({ "absolute_magnitude_h": "bright" })),
        RiskResult::unknown()
    );

    // Cubing this distance overflows the period feature
    let record = ObjectRecord {
        miss_distance_km: Some(1e200),
        ..Default::default()
    };
    assert!(matches!(engine.try_predict(&record), Err(InferenceError::Feature(_))));
    assert_eq!(engine.predict(&record), RiskResult::unknown());
}

#[test]
fn test_persist_and_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let trained = ModelBundle::load_or_train(&config).unwrap();
    assert!(config.scaler_path().exists());
    assert!(config.risk_model_path().exists());
    assert!(config.cluster_model_path().exists());

    let reloaded = ModelBundle::load(&config).unwrap();
    assert_eq!(reloaded, trained);

    let a = RiskEngine::new(Arc::new(trained), ThresholdConfig::default());
    let b = RiskEngine::new(Arc::new(reloaded), ThresholdConfig::default());
    for record in records() {
        assert_eq!(a.predict(&record), b.predict(&record));
    }
}

#[test]
fn test_corrupt_artifact_triggers_retraining() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let original = ModelBundle::load_or_train(&config).unwrap();
    std::fs::write(config.risk_model_path(), b"{ not json").unwrap();
    assert!(ModelBundle::load(&config).is_err());

    let retrained = ModelBundle::load_or_train(&config).unwrap();
    assert_eq!(retrained, original);
    assert!(ModelBundle::load(&config).is_ok());
}

#[test]
fn test_cluster_count_mismatch_triggers_retraining() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_config(dir.path());

    let original = ModelBundle::load_or_train(&config).unwrap();
    let mut clusters = original.clusters.clone();
    clusters.centroids.push([0.0; crate::logic::features::FEATURE_COUNT]);
    storage::save_artifact(&config.cluster_model_path(), inference::CLUSTER_MODEL_KIND, &clusters).unwrap();

    match ModelBundle::load(&config) {
        Err(ModelError::Invalid { artifact, .. }) => assert_eq!(artifact, crate::constants::CLUSTER_MODEL_FILE),
        other => panic!("expected invalid cluster artifact, got {:?}", other),
    }

    let retrained = ModelBundle::load_or_train(&config).unwrap();
    assert_eq!(retrained.clusters.n_clusters(), config.clustering.n_clusters);
    assert_eq!(retrained, original);
}

#[test]
fn test_training_report() {
    let dir = tempfile::tempdir().unwrap();
    let (_, report) = ModelBundle::train(&small_config(dir.path())).unwrap();

    assert_eq!(report.train_size, 800);
    assert_eq!(report.test_size, 200);
    assert!(report.train_accuracy >= report.test_accuracy - 0.1);
    // The banded rule is learnable well above chance
    assert!(report.test_accuracy > 0.5);
    assert!((report.feature_importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
}
