//! CART decision tree with Gini impurity
//!
//! Trees are grown until every leaf is pure or no feature separates the
//! samples of a node. At each node a random subset of `max_features`
//! non-constant features is searched for the threshold with the lowest
//! weighted Gini impurity; thresholds are midpoints between consecutive
//! distinct feature values, and a sample goes left when its value is less
//! than or equal to the threshold.
//!
//! Each tree records the total impurity decrease contributed by every
//! feature (mean decrease in impurity), which the forest turns into feature
//! importances.

use rand::{Rng, seq::SliceRandom as _};

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        /// Class probabilities
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Growth limits of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Number of features searched at each node
    pub max_features: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
}

impl TreeParams {
    #[must_use]
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            min_samples_split: 2,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    /// Unnormalized impurity decrease per feature
    impurity_decrease: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    weighted_impurity: f64,
}

struct Frame {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

fn class_counts(labels: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in samples {
        counts[labels[i]] += 1;
    }
    counts
}

#[expect(clippy::cast_precision_loss)]
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / total).powi(2))
        .sum::<f64>()
}

#[expect(clippy::cast_precision_loss)]
fn leaf(counts: &[usize]) -> Node {
    let total = counts.iter().sum::<usize>() as f64;
    Node::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
    }
}

impl DecisionTree {
    /// Grows a tree on the rows of `features` listed in `samples`.
    ///
    /// `samples` may contain repeated indices (a bootstrap sample); each
    /// repetition counts as one sample. Every label must be below
    /// `n_classes` and `samples` must not be empty.
    #[expect(clippy::cast_precision_loss)]
    pub fn fit<R>(
        features: &[Vec<f64>],
        labels: &[usize],
        samples: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut R,
    ) -> Self
    where
        R: Rng + ?Sized,
    {
        let n_features = features.first().map_or(0, Vec::len);
        let mut nodes = vec![Node::Leaf {
            distribution: vec![],
        }];
        let mut impurity_decrease = vec![0.0; n_features];
        let mut stack = vec![Frame {
            node: 0,
            samples: samples.to_vec(),
            depth: 0,
        }];

        while let Some(frame) = stack.pop() {
            let counts = class_counts(labels, &frame.samples, n_classes);
            let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let depth_reached = params.max_depth.is_some_and(|max| frame.depth >= max);
            if is_pure || frame.samples.len() < params.min_samples_split || depth_reached {
                nodes[frame.node] = leaf(&counts);
                continue;
            }

            let Some(split) = best_split(features, labels, &frame.samples, &counts, params, rng)
            else {
                nodes[frame.node] = leaf(&counts);
                continue;
            };

            let n = frame.samples.len();
            impurity_decrease[split.feature] +=
                n as f64 * gini(&counts, n) - split.weighted_impurity;
            let (left_samples, right_samples): (Vec<_>, Vec<_>) = frame
                .samples
                .into_iter()
                .partition(|&i| features[i][split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf {
                distribution: vec![],
            });
            nodes.push(Node::Leaf {
                distribution: vec![],
            });
            nodes[frame.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };
            stack.push(Frame {
                node: right,
                samples: right_samples,
                depth: frame.depth + 1,
            });
            stack.push(Frame {
                node: left,
                samples: left_samples,
                depth: frame.depth + 1,
            });
        }

        Self {
            nodes,
            impurity_decrease,
        }
    }

    /// Class probabilities of the leaf that `row` falls into.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of internal (split) nodes.
    #[must_use]
    pub fn split_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Split { .. }))
            .count()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Impurity decrease per feature, normalized to sum to 1.
    ///
    /// `None` when the tree has no split.
    #[must_use]
    pub fn feature_importances(&self) -> Option<Vec<f64>> {
        let total = self.impurity_decrease.iter().sum::<f64>();
        if self.split_count() == 0 || total <= 0.0 {
            return None;
        }
        Some(self.impurity_decrease.iter().map(|d| d / total).collect())
    }
}

/// Searches up to `max_features` non-constant features, in random order,
/// for the split with the lowest weighted impurity.
#[expect(clippy::cast_precision_loss)]
fn best_split<R>(
    features: &[Vec<f64>],
    labels: &[usize],
    samples: &[usize],
    counts: &[usize],
    params: TreeParams,
    rng: &mut R,
) -> Option<SplitCandidate>
where
    R: Rng + ?Sized,
{
    let n_features = features[samples[0]].len();
    let mut order = (0..n_features).collect::<Vec<_>>();
    order.shuffle(rng);

    let n = samples.len();
    let mut sorted = samples.to_vec();
    let mut best: Option<SplitCandidate> = None;
    let mut searched = 0;
    for feature in order {
        if searched >= params.max_features.max(1) {
            break;
        }
        sorted.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));
        let lowest = features[sorted[0]][feature];
        let highest = features[sorted[n - 1]][feature];
        if highest <= lowest {
            continue;
        }
        searched += 1;

        let mut left = vec![0; counts.len()];
        let mut right = counts.to_vec();
        for k in 0..n - 1 {
            let class = labels[sorted[k]];
            left[class] += 1;
            right[class] -= 1;

            let value = features[sorted[k]][feature];
            let next = features[sorted[k + 1]][feature];
            if value >= next {
                continue;
            }
            let left_n = k + 1;
            let right_n = n - left_n;
            let weighted_impurity =
                left_n as f64 * gini(&left, left_n) + right_n as f64 * gini(&right, right_n);
            if best.is_none_or(|b| weighted_impurity < b.weighted_impurity) {
                let midpoint = f64::midpoint(value, next);
                best = Some(SplitCandidate {
                    feature,
                    threshold: if midpoint < next { midpoint } else { value },
                    weighted_impurity,
                });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn fit_all(features: &[Vec<f64>], labels: &[usize], max_features: usize) -> DecisionTree {
        let samples = (0..labels.len()).collect::<Vec<_>>();
        let mut rng = Pcg64::seed_from_u64(0);
        DecisionTree::fit(
            features,
            labels,
            &samples,
            2,
            TreeParams::new(max_features),
            &mut rng,
        )
    }

    #[test]
    fn test_gini() {
        assert!((gini(&[5, 5], 10) - 0.5).abs() < 1e-12);
        assert!(gini(&[4, 0], 4).abs() < 1e-12);
    }

    #[test]
    fn test_separable_data_is_fit_exactly() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![10.0], vec![11.0]];
        let labels = [0, 0, 0, 1, 1];
        let tree = fit_all(&features, &labels, 1);
        assert_eq!(tree.split_count(), 1);
        assert_eq!(tree.predict_proba(&[2.5]), [1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[6.5]), [1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[6.6]), [0.0, 1.0]);
    }

    #[test]
    fn test_threshold_is_midpoint() {
        let features = vec![vec![2.0], vec![4.0]];
        let tree = fit_all(&features, &[0, 1], 1);
        assert_eq!(tree.predict_proba(&[3.0]), [1.0, 0.0]);
        assert_eq!(tree.predict_proba(&[3.000_001]), [0.0, 1.0]);
    }

    #[test]
    fn test_informative_feature_gets_all_importance() {
        // feature 0 is noise-free, feature 1 is constant
        let features = vec![
            vec![0.0, 7.0],
            vec![1.0, 7.0],
            vec![2.0, 7.0],
            vec![3.0, 7.0],
        ];
        let tree = fit_all(&features, &[0, 0, 1, 1], 2);
        assert_eq!(tree.feature_importances(), Some(vec![1.0, 0.0]));
    }

    #[test]
    fn test_constant_features_give_a_single_leaf() {
        let features = vec![vec![1.0], vec![1.0], vec![1.0]];
        let tree = fit_all(&features, &[0, 1, 1], 1);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.feature_importances(), None);
        let proba = tree.predict_proba(&[1.0]);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_depth_limit() {
        let features = (0..8).map(|i| vec![f64::from(i)]).collect::<Vec<_>>();
        let labels = [0, 1, 0, 1, 0, 1, 0, 1];
        let samples = (0..8).collect::<Vec<_>>();
        let mut rng = Pcg64::seed_from_u64(0);
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::new(1)
        };
        let tree = DecisionTree::fit(&features, &labels, &samples, 2, params, &mut rng);
        assert_eq!(tree.split_count(), 1);
    }

    #[test]
    fn test_repeated_samples_count_twice() {
        let features = vec![vec![0.0], vec![1.0]];
        let samples = [0, 0, 0, 1];
        let mut rng = Pcg64::seed_from_u64(0);
        let tree = DecisionTree::fit(
            &features,
            &[0, 0],
            &samples,
            2,
            TreeParams::new(1),
            &mut rng,
        );
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(&[0.0]), [1.0, 0.0]);
    }
}
