//! Random forest classifier
//!
//! A [`RandomForest`] is an ensemble of [`DecisionTree`]s, each grown on a
//! bootstrap sample of the training rows and searching `sqrt(n_features)`
//! features per node. Predictions average the trees' class probabilities.
//!
//! All randomness derives from [`ForestParams::seed`]: a master generator
//! draws one seed per tree, so the same data and parameters always produce
//! the same forest.

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};

use crate::tree::{DecisionTree, TreeParams};

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum TrainError {
    #[display("training set is empty")]
    Empty,
    #[display("{features} feature rows but {labels} labels")]
    LengthMismatch { features: usize, labels: usize },
    #[display("row {row} has {actual} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("a forest needs at least one tree")]
    NoTrees,
    #[display("need at least 2 classes to train a classifier, found {classes}")]
    TooFewClasses { classes: usize },
    #[display("no tree could split the training data; feature importances are undefined")]
    NoSplits,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    /// Features searched per node; `None` uses `sqrt(n_features)`
    pub max_features: Option<usize>,
    pub max_depth: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_features: None,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

#[expect(clippy::cast_precision_loss)]
#[expect(clippy::cast_possible_truncation)]
#[expect(clippy::cast_sign_loss)]
fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt() as usize).max(1)
}

/// Checks shapes and returns `(n_features, n_classes)`.
pub(crate) fn check_training_data(
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<(usize, usize), TrainError> {
    if features.len() != labels.len() {
        return Err(TrainError::LengthMismatch {
            features: features.len(),
            labels: labels.len(),
        });
    }
    let n_features = features.first().ok_or(TrainError::Empty)?.len();
    if let Some((row, actual)) = features
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != n_features)
    {
        return Err(TrainError::RaggedRow {
            row,
            expected: n_features,
            actual,
        });
    }

    let n_classes = labels.iter().max().map_or(0, |max| max + 1);
    let mut seen = vec![false; n_classes];
    for &label in labels {
        seen[label] = true;
    }
    let distinct = seen.iter().filter(|s| **s).count();
    if distinct < 2 {
        return Err(TrainError::TooFewClasses { classes: distinct });
    }
    Ok((n_features, n_classes))
}

impl RandomForest {
    /// Fits a forest on `features` (one row per sample) and class `labels`.
    ///
    /// Classes are `0..=max(labels)`; at least two of them must occur.
    pub fn fit(
        features: &[Vec<f64>],
        labels: &[usize],
        params: &ForestParams,
    ) -> Result<Self, TrainError> {
        if params.n_trees == 0 {
            return Err(TrainError::NoTrees);
        }
        let (n_features, n_classes) = check_training_data(features, labels)?;
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            ..TreeParams::new(
                params
                    .max_features
                    .unwrap_or_else(|| sqrt_features(n_features)),
            )
        };

        let n_samples = labels.len();
        let mut rng = Pcg64::seed_from_u64(params.seed);
        let trees = (0..params.n_trees)
            .map(|_| {
                let mut tree_rng = Pcg64::seed_from_u64(rng.random());
                let bootstrap = (0..n_samples)
                    .map(|_| tree_rng.random_range(0..n_samples))
                    .collect::<Vec<_>>();
                DecisionTree::fit(
                    features,
                    labels,
                    &bootstrap,
                    n_classes,
                    tree_params,
                    &mut tree_rng,
                )
            })
            .collect();

        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean class probabilities over all trees.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> Vec<f64> {
        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (sum, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *sum += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        proba
    }

    /// Most probable class; the lower class on ties.
    #[must_use]
    pub fn predict(&self, row: &[f64]) -> usize {
        let proba = self.predict_proba(row);
        let mut best = 0;
        for (class, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = class;
            }
        }
        best
    }

    #[must_use]
    pub fn predict_all(&self, rows: &[Vec<f64>]) -> Vec<usize> {
        rows.iter().map(|row| self.predict(row)).collect()
    }

    /// Mean decrease in impurity per feature, non-negative and summing to 1.
    ///
    /// Each tree's importances are normalized before averaging; trees
    /// without any split do not contribute.
    #[expect(clippy::cast_precision_loss)]
    pub fn feature_importances(&self) -> Result<Vec<f64>, TrainError> {
        let per_tree = self
            .trees
            .iter()
            .filter_map(DecisionTree::feature_importances)
            .collect::<Vec<_>>();
        if per_tree.is_empty() {
            return Err(TrainError::NoSplits);
        }
        let mut mean = vec![0.0; self.n_features];
        for importances in &per_tree {
            for (m, v) in mean.iter_mut().zip(importances) {
                *m += v / per_tree.len() as f64;
            }
        }
        let total = mean.iter().sum::<f64>();
        if total <= 0.0 {
            return Err(TrainError::NoSplits);
        }
        Ok(mean.into_iter().map(|m| m / total).collect())
    }
}

/// Pairs names with importances, sorted from most to least important.
///
/// Equal importances keep the order of `names`.
#[must_use]
pub fn rank_importances(names: &[&str], importances: &[f64]) -> Vec<(String, f64)> {
    let mut ranked = names
        .iter()
        .zip(importances)
        .map(|(name, importance)| ((*name).to_owned(), *importance))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}
