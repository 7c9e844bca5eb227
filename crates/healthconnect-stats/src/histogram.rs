use std::ops::Range;

/// A histogram of a dataset over equal-width bins.
///
/// Bins span the closed data range `[min, max]`. Every bin is half-open
/// except the last one, which also contains `max`, so every value lands in
/// exactly one bin.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// The range of values covered by this bin.
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins.
    ///
    /// When every value is the same, the range is widened to
    /// `[value - 0.5, value + 0.5]`.
    ///
    /// # Returns
    ///
    /// `None` if `values` is empty or `num_bins` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use healthconnect_stats::histogram::Histogram;
    /// let histogram = Histogram::equal_width([1.0, 2.0, 2.0, 3.0, 5.0], 4).unwrap();
    /// let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
    /// assert_eq!(counts, [1, 2, 1, 1]);
    /// assert_eq!(histogram.bins[0].range, 1.0..2.0);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::cast_sign_loss)]
    #[must_use]
    pub fn equal_width<I>(values: I, num_bins: usize) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() || num_bins == 0 {
            return None;
        }
        let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max <= min {
            min -= 0.5;
            max += 0.5;
        }

        let width = (max - min) / num_bins as f64;
        let mut bins = (0..num_bins)
            .map(|i| HistogramBin {
                range: (min + width * i as f64)..(min + width * (i + 1) as f64),
                count: 0,
            })
            .collect::<Vec<_>>();
        if let Some(last) = bins.last_mut() {
            last.range.end = max;
        }

        for value in values {
            let index = (((value - min) / width) as usize).min(num_bins - 1);
            bins[index].count += 1;
        }
        Some(Self { bins })
    }

    /// Sum of all bin counts.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }
}
