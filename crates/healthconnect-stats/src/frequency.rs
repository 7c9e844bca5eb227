//! Frequency tables for discrete values
//!
//! [`ValueCounts`] counts occurrences of each distinct value and orders them
//! by descending frequency. Ties keep ascending key order, which makes the
//! most frequent entry a well-defined mode.

use std::{cmp::Reverse, collections::BTreeMap};

/// Occurrence counts of distinct values, most frequent first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCounts<K> {
    entries: Vec<(K, usize)>,
    total: usize,
}

impl<K> ValueCounts<K>
where
    K: Ord + Clone,
{
    /// Counts the values yielded by `values`.
    ///
    /// # Examples
    ///
    /// ```
    /// use healthconnect_stats::frequency::ValueCounts;
    ///
    /// let counts = ValueCounts::new(["b", "a", "b", "c", "a", "b"]);
    /// assert_eq!(counts.entries(), &[("b", 3), ("a", 2), ("c", 1)]);
    /// assert_eq!(counts.mode(), Some(&"b"));
    /// assert_eq!(counts.total(), 6);
    /// ```
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut counts = BTreeMap::<K, usize>::new();
        let mut total = 0;
        for value in values {
            *counts.entry(value).or_insert(0) += 1;
            total += 1;
        }
        let mut entries = counts.into_iter().collect::<Vec<_>>();
        // stable: equal counts stay in key order
        entries.sort_by_key(|(_, count)| Reverse(*count));
        Self { entries, total }
    }

    /// `(value, count)` pairs, most frequent first.
    #[must_use]
    pub fn entries(&self) -> &[(K, usize)] {
        &self.entries
    }

    /// Total number of counted values.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// The most frequent value; the smallest one among ties.
    #[must_use]
    pub fn mode(&self) -> Option<&K> {
        self.entries.first().map(|(k, _)| k)
    }

    /// Count of a specific value (0 when absent).
    #[must_use]
    pub fn count_of(&self, value: &K) -> usize {
        self.entries
            .iter()
            .find_map(|(k, c)| (k == value).then_some(*c))
            .unwrap_or(0)
    }

    /// Share of `value` among all counted values, `None` when nothing was counted.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn share_of(&self, value: &K) -> Option<f64> {
        (self.total > 0).then(|| self.count_of(value) as f64 / self.total as f64)
    }

    /// The `n` most frequent entries.
    pub fn top(&self, n: usize) -> impl Iterator<Item = &(K, usize)> + '_ {
        self.entries.iter().take(n)
    }
}
