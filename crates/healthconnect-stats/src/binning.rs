//! Fixed-edge binning for data analysis
//!
//! This module assigns values to labelled bins delimited by a fixed list of
//! edges. Bins are right-closed: bin `i` covers the half-open interval
//! `(edges[i], edges[i + 1]]`, so a value lying exactly on an inner edge
//! belongs to the lower bin.
//!
//! Values at or below the first edge, or above the last edge, fall outside
//! every bin.
//!
//! # Examples
//!
//! ```
//! use healthconnect_stats::binning::FixedBins;
//!
//! let bins = FixedBins::new(&[0.0, 10.0, 20.0], &["low", "high"]).unwrap();
//!
//! assert_eq!(bins.label_of(10.0), Some("low"));
//! assert_eq!(bins.label_of(10.5), Some("high"));
//! assert_eq!(bins.label_of(0.0), None);
//! assert_eq!(bins.label_of(25.0), None);
//! ```

/// Error returned when bin edges and labels are inconsistent
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum BinningError {
    #[display("bin edges must contain at least two values")]
    TooFewEdges,
    #[display("bin edges must be strictly increasing")]
    EdgesNotIncreasing,
    #[display("expected {expected} bin labels, got {actual}")]
    LabelCountMismatch { expected: usize, actual: usize },
}

/// A labelled set of right-closed bins
#[derive(Debug, Clone, PartialEq)]
pub struct FixedBins<L> {
    edges: Vec<f64>,
    labels: Vec<L>,
}

impl<L> FixedBins<L>
where
    L: Clone,
{
    /// Creates bins from `edges` (strictly increasing) and one label per bin.
    pub fn new(edges: &[f64], labels: &[L]) -> Result<Self, BinningError> {
        if edges.len() < 2 {
            return Err(BinningError::TooFewEdges);
        }
        if !edges.windows(2).all(|w| w[0] < w[1]) {
            return Err(BinningError::EdgesNotIncreasing);
        }
        if labels.len() != edges.len() - 1 {
            return Err(BinningError::LabelCountMismatch {
                expected: edges.len() - 1,
                actual: labels.len(),
            });
        }
        Ok(Self {
            edges: edges.to_vec(),
            labels: labels.to_vec(),
        })
    }

    /// Returns the index of the bin containing `value`, if any.
    #[must_use]
    pub fn index_of(&self, value: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if value <= first || value > last || value.is_nan() {
            return None;
        }
        // First edge that is >= value closes the bin.
        let upper = self.edges.partition_point(|edge| *edge < value);
        Some(upper - 1)
    }

    /// Returns the label of the bin containing `value`, if any.
    #[must_use]
    pub fn label_of(&self, value: f64) -> Option<L> {
        self.index_of(value).map(|i| self.labels[i].clone())
    }

    /// Bin labels in edge order.
    #[must_use]
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Bin edges.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }
}
