//! Classification metrics
//!
//! [`ConfusionMatrix`] counts (actual, predicted) pairs and
//! [`ClassificationReport`] derives per-class precision, recall, F1 and
//! support plus accuracy and macro/weighted averages from it.
//!
//! Precision is undefined for a class that is never predicted, recall for a
//! class that never occurs; both are `None` in the report. Averages count an
//! undefined value as zero, and the text rendering prints it as `0.00`.

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum MetricsError {
    #[display("{actual} actual labels but {predicted} predictions")]
    LengthMismatch { actual: usize, predicted: usize },
    #[display("label {label} has no class name ({classes} classes)")]
    UnknownLabel { label: usize, classes: usize },
    #[display("no samples to evaluate")]
    Empty,
}

/// Counts of (actual, predicted) class pairs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    pub class_names: Vec<String>,
    /// `counts[actual][predicted]`
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    pub fn new(
        actual: &[usize],
        predicted: &[usize],
        class_names: &[&str],
    ) -> Result<Self, MetricsError> {
        if actual.len() != predicted.len() {
            return Err(MetricsError::LengthMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(MetricsError::Empty);
        }
        let classes = class_names.len();
        let mut counts = vec![vec![0; classes]; classes];
        for (&a, &p) in actual.iter().zip(predicted) {
            if let Some(label) = [a, p].into_iter().find(|label| *label >= classes) {
                return Err(MetricsError::UnknownLabel { label, classes });
            }
            counts[a][p] += 1;
        }
        Ok(Self {
            class_names: class_names.iter().map(|s| (*s).to_owned()).collect(),
            counts,
        })
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    /// Samples whose actual class is `class`.
    #[must_use]
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Samples predicted as `class`.
    #[must_use]
    pub fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        (0..self.counts.len()).map(|i| self.counts[i][i]).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub class_name: String,
    pub precision: Option<f64>,
    pub recall: Option<f64>,
    pub f1: Option<f64>,
    pub support: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total: usize,
}

#[expect(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

impl ClassificationReport {
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(matrix: &ConfusionMatrix) -> Self {
        let classes = matrix
            .class_names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let true_positives = matrix.counts[i][i];
                let precision = ratio(true_positives, matrix.predicted(i));
                let recall = ratio(true_positives, matrix.support(i));
                let f1 = match (precision, recall) {
                    (Some(p), Some(r)) if p + r > 0.0 => Some(2.0 * p * r / (p + r)),
                    (Some(_), Some(_)) => Some(0.0),
                    _ => None,
                };
                ClassMetrics {
                    class_name: name.clone(),
                    precision,
                    recall,
                    f1,
                    support: matrix.support(i),
                }
            })
            .collect::<Vec<_>>();

        let total = matrix.total();
        let n_classes = classes.len().max(1) as f64;
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64, norm: f64| AverageMetrics {
            precision: classes
                .iter()
                .map(|c| weight(c) * c.precision.unwrap_or(0.0))
                .sum::<f64>()
                / norm,
            recall: classes
                .iter()
                .map(|c| weight(c) * c.recall.unwrap_or(0.0))
                .sum::<f64>()
                / norm,
            f1: classes
                .iter()
                .map(|c| weight(c) * c.f1.unwrap_or(0.0))
                .sum::<f64>()
                / norm,
        };
        let macro_avg = average(&|_: &ClassMetrics| 1.0, n_classes);
        let weighted_avg = average(&|c: &ClassMetrics| c.support as f64, total.max(1) as f64);

        Self {
            accuracy: ratio(matrix.correct(), total).unwrap_or(0.0),
            macro_avg,
            weighted_avg,
            total,
            classes,
        }
    }
}

impl fmt::Display for ClassificationReport {
    /// Renders the report as a fixed-width table.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const LAST_LINE: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|c| c.class_name.len())
            .chain([LAST_LINE.len()])
            .max()
            .unwrap_or(LAST_LINE.len());
        let value = |v: Option<f64>| v.unwrap_or(0.0);

        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.class_name,
                value(class.precision),
                value(class.recall),
                value(class.f1),
                class.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total
        )?;
        for (name, avg) in [("macro avg", self.macro_avg), (LAST_LINE, self.weighted_avg)] {
            writeln!(
                f,
                "{:>width$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total
            )?;
        }
        Ok(())
    }
}
