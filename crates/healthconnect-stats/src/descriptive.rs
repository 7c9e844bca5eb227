/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency, dispersion,
/// and spread for a dataset of `f64` values.
///
/// Dispersion uses the sample (n - 1) denominator, so a single observation
/// has no defined variance and `variance`/`std_dev` are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptiveStats {
    /// Number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset (mean of the two middle values for even counts).
    pub median: f64,
    /// The sample variance of the dataset.
    pub variance: Option<f64>,
    /// The sample standard deviation of the dataset.
    pub std_dev: Option<f64>,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Returns
    ///
    /// * `Some(DescriptiveStats)` - if the dataset contains at least one value
    /// * `None` - if the dataset is empty
    ///
    /// # Examples
    ///
    /// ```
    /// # use healthconnect_stats::descriptive::DescriptiveStats;
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, Some(2.5));
    /// ```
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// # Panics
    ///
    /// Panics if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use healthconnect_stats::descriptive::DescriptiveStats;
    /// let stats = DescriptiveStats::from_sorted(&[7.0]).unwrap();
    /// assert_eq!(stats.median, 7.0);
    /// assert_eq!(stats.std_dev, None);
    /// ```
    #[must_use]
    pub fn from_sorted(sorted_values: &[f64]) -> Option<Self> {
        assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let min = *sorted_values.first()?;
        let max = *sorted_values.last()?;
        let mean = mean(sorted_values.iter().copied())?;
        let len = sorted_values.len();
        let median = if len.is_multiple_of(2) {
            f64::midpoint(sorted_values[len / 2 - 1], sorted_values[len / 2])
        } else {
            sorted_values[len / 2]
        };
        let variance = sample_variance(sorted_values.iter().copied());

        Some(Self {
            count: len,
            min,
            max,
            mean,
            median,
            variance,
            std_dev: variance.map(f64::sqrt),
        })
    }
}

/// Arithmetic mean, `None` for an empty input.
///
/// ```
/// # use healthconnect_stats::descriptive::mean;
/// assert_eq!(mean([1.0, 0.0, 1.0, 0.0]), Some(0.5));
/// assert_eq!(mean(std::iter::empty()), None);
/// ```
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Sample variance (n - 1 denominator), `None` for fewer than two values.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn sample_variance<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let values = values.into_iter().collect::<Vec<_>>();
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values.iter().copied())?;
    let sum_sq = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>();
    Some(sum_sq / (values.len() - 1) as f64)
}

/// Sample standard deviation, `None` for fewer than two values.
///
/// ```
/// # use healthconnect_stats::descriptive::sample_std_dev;
/// assert_eq!(sample_std_dev([2.0, 4.0]), Some(2.0_f64.sqrt()));
/// assert_eq!(sample_std_dev([2.0]), None);
/// ```
#[must_use]
pub fn sample_std_dev<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    sample_variance(values).map(f64::sqrt)
}

/// Most frequent value; the smallest one among equally frequent values.
///
/// ```
/// # use healthconnect_stats::descriptive::mode;
/// assert_eq!(mode([3.0, 1.0, 3.0, 1.0, 2.0]), Some(1.0));
/// assert_eq!(mode(std::iter::empty()), None);
/// ```
#[must_use]
pub fn mode<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let mut values = values.into_iter().collect::<Vec<_>>();
    values.sort_by(f64::total_cmp);

    let mut best: Option<(f64, usize)> = None;
    for run in values.chunk_by(|a, b| a.total_cmp(b).is_eq()) {
        if best.is_none_or(|(_, count)| run.len() > count) {
            best = Some((run[0], run.len()));
        }
    }
    best.map(|(value, _)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(DescriptiveStats::new(Vec::<f64>::new()).is_none());
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert_eq!(sample_variance(Vec::<f64>::new()), None);
    }

    #[test]
    fn test_even_count_median() {
        let stats = DescriptiveStats::new([4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((stats.median - 2.5).abs() < 1e-12);
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn test_sample_std_dev_matches_hand_computation() {
        // mean 5, squared deviations 9+1+1+9 = 20, / 3
        let std = sample_std_dev([2.0, 4.0, 6.0, 8.0]).unwrap();
        assert!((std - (20.0_f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mode_single_run() {
        assert_eq!(mode([4.0, 4.0, 4.0]), Some(4.0));
        assert_eq!(mode([2.0, 5.0, 5.0]), Some(5.0));
    }

    #[test]
    fn test_constant_values_have_zero_spread() {
        let stats = DescriptiveStats::new([3.0; 5]).unwrap();
        assert_eq!(stats.variance, Some(0.0));
        assert_eq!(stats.std_dev, Some(0.0));
    }

    #[test]
    #[should_panic(expected = "values must be sorted")]
    fn test_unsorted_input_panics() {
        let _ = DescriptiveStats::from_sorted(&[3.0, 1.0]);
    }
}
