//! Treatment-success classifier for `HealthConnect` encounters.
//!
//! This crate trains a random forest on the numeric feature matrix built by
//! `healthconnect-analysis` and evaluates it on a held-out test partition.
//! It works on plain `&[Vec<f64>]` rows and `usize` class labels, so it has
//! no knowledge of the encounter schema.
//!
//! # How Training Works
//!
//! 1. **Split** - Shuffle the samples with a fixed seed and hold out a test share
//! 2. **Bootstrap** - Each tree draws its training rows with replacement
//! 3. **Grow** - Trees split on Gini impurity, searching `sqrt(n_features)`
//!    random features per node, until every leaf is pure
//! 4. **Predict** - Class probabilities are averaged over all trees
//! 5. **Evaluate** - Confusion matrix, per-class precision/recall/F1 and
//!    mean-decrease-in-impurity feature importances
//!
//! # Architecture
//!
//! ```text
//! Feature Matrix (healthconnect-analysis)
//!     ↓ split
//! Train / Test partitions
//!     ↓ fit
//! Random Forest (bootstrap + decision trees)
//!     ↓ predict
//! Confusion Matrix
//!     ↓ summarize
//! Classification Report + Feature Importances
//! ```
//!
//! # Example
//!
//! ```
//! use healthconnect_training::evaluation::{EvaluationConfig, train_and_evaluate};
//!
//! let features = (0..40)
//!     .map(|i| vec![f64::from(i % 10), f64::from(i % 3)])
//!     .collect::<Vec<_>>();
//! let labels = features
//!     .iter()
//!     .map(|row| usize::from(row[0] >= 5.0))
//!     .collect::<Vec<_>>();
//! let mut config = EvaluationConfig::default();
//! config.forest.n_trees = 10;
//!
//! let (forest, evaluation) = train_and_evaluate(
//!     &features,
//!     &labels,
//!     &["severity", "noise"],
//!     &["False", "True"],
//!     &config,
//! )?;
//! assert_eq!(forest.n_trees(), 10);
//! assert_eq!(evaluation.test_size, 8);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod evaluation;
pub mod forest;
pub mod metrics;
pub mod split;
pub mod tree;
