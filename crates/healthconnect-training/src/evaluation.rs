//! Hold-out evaluation of a random forest
//!
//! [`train_and_evaluate`] splits the samples, fits a forest on the training
//! partition, predicts the test partition and collects the classification
//! report, the confusion matrix and the ranked feature importances.

use serde::{Deserialize, Serialize};

use crate::{
    forest::{ForestParams, RandomForest, TrainError, check_training_data, rank_importances},
    metrics::{ClassificationReport, ConfusionMatrix, MetricsError},
    split::{SplitError, train_test_split},
};

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum EvaluateError {
    #[display("failed to split samples: {_0}")]
    Split(SplitError),
    #[display("failed to train model: {_0}")]
    Train(TrainError),
    #[display("failed to evaluate model: {_0}")]
    Metrics(MetricsError),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Share of samples held out for testing
    pub test_fraction: f64,
    pub forest: ForestParams,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            forest: ForestParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEvaluation {
    pub train_size: usize,
    pub test_size: usize,
    pub report: ClassificationReport,
    pub confusion: ConfusionMatrix,
    /// `(feature name, importance)`, most important first
    pub importances: Vec<(String, f64)>,
}

fn select<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}

/// Trains on a seeded split of the samples and evaluates on the held-out part.
///
/// Fails when the labels (or the labels of the training partition) contain
/// fewer than two classes, or when no tree could split the training data.
pub fn train_and_evaluate(
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[&str],
    class_names: &[&str],
    config: &EvaluationConfig,
) -> Result<(RandomForest, ModelEvaluation), EvaluateError> {
    check_training_data(features, labels)?;
    let split = train_test_split(labels.len(), config.test_fraction, config.forest.seed)?;

    let train_features = select(features, &split.train);
    let train_labels = select(labels, &split.train);
    let forest = RandomForest::fit(&train_features, &train_labels, &config.forest)?;

    let test_features = select(features, &split.test);
    let test_labels = select(labels, &split.test);
    let predicted = forest.predict_all(&test_features);
    let confusion = ConfusionMatrix::new(&test_labels, &predicted, class_names)?;
    let report = ClassificationReport::new(&confusion);
    let importances = rank_importances(feature_names, &forest.feature_importances()?);

    let evaluation = ModelEvaluation {
        train_size: split.train.len(),
        test_size: split.test.len(),
        report,
        confusion,
        importances,
    };
    Ok((forest, evaluation))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(n: u32) -> (Vec<Vec<f64>>, Vec<usize>) {
        (0..n)
            .map(|i| {
                let severity = f64::from(i % 10 + 1);
                let age = f64::from(18 + (i * 13) % 68);
                (vec![severity, age], usize::from(severity <= 5.0))
            })
            .unzip()
    }

    #[test]
    fn test_evaluation_is_reproducible() {
        let (features, labels) = dataset(100);
        let config = EvaluationConfig {
            forest: ForestParams {
                n_trees: 10,
                ..ForestParams::default()
            },
            ..EvaluationConfig::default()
        };
        let names = ["InitialSeverity", "Age"];
        let classes = ["False", "True"];
        let (_, a) = train_and_evaluate(&features, &labels, &names, &classes, &config).unwrap();
        let (_, b) = train_and_evaluate(&features, &labels, &names, &classes, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.train_size, a.test_size), (80, 20));
        assert_eq!(a.report.total, 20);
        assert_eq!(a.importances[0].0, "InitialSeverity");
        let sum = a.importances.iter().map(|(_, v)| v).sum::<f64>();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_class_labels_fail_before_splitting() {
        let features = vec![vec![1.0]; 10];
        let labels = vec![1; 10];
        let err = train_and_evaluate(
            &features,
            &labels,
            &["x"],
            &["False", "True"],
            &EvaluationConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EvaluateError::Train(TrainError::TooFewClasses { classes: 1 })
        ));
    }

    #[test]
    fn test_training_partition_with_one_class_fails() {
        // either training partition of a two-sample split holds one class
        let features = vec![vec![0.0], vec![1.0]];
        let labels = vec![0, 1];
        let config = EvaluationConfig {
            test_fraction: 0.5,
            ..EvaluationConfig::default()
        };
        let err = train_and_evaluate(&features, &labels, &["x"], &["False", "True"], &config)
            .unwrap_err();
        assert!(matches!(
            err,
            EvaluateError::Train(TrainError::TooFewClasses { classes: 1 })
        ));
    }

    #[test]
    fn test_zero_trees_fail() {
        let (features, labels) = dataset(20);
        let config = EvaluationConfig {
            forest: ForestParams {
                n_trees: 0,
                ..ForestParams::default()
            },
            ..EvaluationConfig::default()
        };
        let err = train_and_evaluate(&features, &labels, &["a", "b"], &["False", "True"], &config)
            .unwrap_err();
        assert!(matches!(err, EvaluateError::Train(TrainError::NoTrees)));
    }

    #[test]
    fn test_config_json() {
        let json = serde_json::json!({
            "test_fraction": 0.25,
            "forest": { "n_trees": 50, "seed": 7, "max_features": 3, "max_depth": null },
        });
        let config = serde_json::from_value::<EvaluationConfig>(json).unwrap();
        assert_eq!(
            config,
            EvaluationConfig {
                test_fraction: 0.25,
                forest: ForestParams {
                    n_trees: 50,
                    seed: 7,
                    max_features: Some(3),
                    max_depth: None,
                },
            }
        );
    }
}
