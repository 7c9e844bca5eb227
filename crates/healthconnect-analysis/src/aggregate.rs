//! Grouped statistics, cross-tabulations and pivot tables
//!
//! All tables are built from observed data only: a [`GroupedTable`] has one
//! row per key combination present in the records, and the axes of a
//! [`CrossTab`] or [`PivotTable`] are the values that actually occur.
//! Records without a key along a requested dimension are left out.
//!
//! Statistics that are undefined for a group (the mean of no values, the
//! sample standard deviation of a single value) are `None`.

use std::collections::BTreeMap;

use healthconnect_stats::descriptive;

use crate::{
    derive::DerivedEncounter,
    dimension::{Dimension, KeyValue, Measure},
};

/// Reduction applied to a measure within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    /// Number of non-missing values
    Count,
    Mean,
    /// Sample standard deviation (n - 1)
    Std,
    /// Most frequent value, the smallest one on ties
    Mode,
    /// Records in the group divided by all grouped records
    Proportion,
}

/// One output column of [`group_by`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub name: String,
    pub measure: Measure,
    pub statistic: Statistic,
}

impl Aggregation {
    pub fn new(name: impl Into<String>, measure: Measure, statistic: Statistic) -> Self {
        Self {
            name: name.into(),
            measure,
            statistic,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Vec<KeyValue>,
    pub values: Vec<Option<f64>>,
}

/// Result of [`group_by`]: key columns followed by aggregated columns
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedTable {
    pub dimensions: Vec<Dimension>,
    pub columns: Vec<String>,
    pub rows: Vec<GroupRow>,
}

impl GroupedTable {
    /// Index of the aggregated column called `name`.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Header of the table: dimension names, then column names.
    #[must_use]
    pub fn header(&self) -> Vec<&str> {
        self.dimensions
            .iter()
            .map(|d| d.name())
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    /// Value of `column` in the row whose key is `key`.
    #[must_use]
    pub fn get(&self, key: &[KeyValue], column: &str) -> Option<f64> {
        let index = self.column_index(column)?;
        self.rows
            .iter()
            .find(|row| row.key == key)
            .and_then(|row| row.values[index])
    }

    /// Sorts rows by `column`, largest first.
    ///
    /// The sort is stable, so equal values keep key order; rows where the
    /// value is undefined go last. Unknown columns leave the table as is.
    #[must_use]
    pub fn ranked_by(mut self, column: &str) -> Self {
        if let Some(index) = self.column_index(column) {
            self.rows
                .sort_by(|a, b| match (a.values[index], b.values[index]) {
                    (Some(a), Some(b)) => b.total_cmp(&a),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                });
        }
        self
    }
}

fn group_records<'a>(
    records: &'a [DerivedEncounter],
    dimensions: &[Dimension],
) -> BTreeMap<Vec<KeyValue>, Vec<&'a DerivedEncounter>> {
    let mut groups = BTreeMap::<_, Vec<_>>::new();
    for record in records {
        let key = dimensions
            .iter()
            .map(|d| d.key(record))
            .collect::<Option<Vec<_>>>();
        if let Some(key) = key {
            groups.entry(key).or_default().push(record);
        }
    }
    groups
}

/// Groups `records` by `dimensions` and computes each aggregation per group.
///
/// Rows are ordered by key. Key combinations that do not occur produce no
/// row.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn group_by(
    records: &[DerivedEncounter],
    dimensions: &[Dimension],
    aggregations: &[Aggregation],
) -> GroupedTable {
    let groups = group_records(records, dimensions);
    let total = groups.values().map(Vec::len).sum::<usize>();

    let rows = groups
        .into_iter()
        .map(|(key, members)| {
            let values = aggregations
                .iter()
                .map(|agg| {
                    let values = members.iter().filter_map(|r| agg.measure.value(r));
                    match agg.statistic {
                        Statistic::Count => Some(values.count() as f64),
                        Statistic::Mean => descriptive::mean(values),
                        Statistic::Std => descriptive::sample_std_dev(values),
                        Statistic::Mode => descriptive::mode(values),
                        Statistic::Proportion => Some(members.len() as f64 / total as f64),
                    }
                })
                .collect();
            GroupRow { key, values }
        })
        .collect();

    GroupedTable {
        dimensions: dimensions.to_vec(),
        columns: aggregations.iter().map(|agg| agg.name.clone()).collect(),
        rows,
    }
}

/// Observed keys along `dimension`, in key order.
fn observed_keys(records: &[DerivedEncounter], dimension: Dimension) -> Vec<KeyValue> {
    let mut keys = records
        .iter()
        .filter_map(|r| dimension.key(r))
        .collect::<Vec<_>>();
    keys.sort_unstable();
    keys.dedup();
    keys
}

/// Dense table of record counts over two dimensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossTab {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub row_keys: Vec<KeyValue>,
    pub column_keys: Vec<KeyValue>,
    /// `counts[row][column]`
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Counts records for every observed (row, column) key pair.
    ///
    /// Pairs that never occur have a count of zero.
    #[must_use]
    pub fn new(
        records: &[DerivedEncounter],
        row_dimension: Dimension,
        column_dimension: Dimension,
    ) -> Self {
        let row_keys = observed_keys(records, row_dimension);
        let column_keys = observed_keys(records, column_dimension);
        let mut counts = vec![vec![0; column_keys.len()]; row_keys.len()];
        for record in records {
            let (Some(row), Some(column)) =
                (row_dimension.key(record), column_dimension.key(record))
            else {
                continue;
            };
            if let (Ok(i), Ok(j)) = (row_keys.binary_search(&row), column_keys.binary_search(&column))
            {
                counts[i][j] += 1;
            }
        }
        Self {
            row_dimension,
            column_dimension,
            row_keys,
            column_keys,
            counts,
        }
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn get(&self, row: KeyValue, column: KeyValue) -> usize {
        match (self.row_keys.binary_search(&row), self.column_keys.binary_search(&column)) {
            (Ok(i), Ok(j)) => self.counts[i][j],
            _ => 0,
        }
    }

    /// Column with the largest count in `row`, the first one on ties.
    #[must_use]
    pub fn row_argmax(&self, row: KeyValue) -> Option<(KeyValue, usize)> {
        let i = self.row_keys.binary_search(&row).ok()?;
        let mut best: Option<(KeyValue, usize)> = None;
        for (column, &count) in self.column_keys.iter().zip(&self.counts[i]) {
            if best.is_none_or(|(_, c)| count > c) {
                best = Some((*column, count));
            }
        }
        best
    }
}

/// Dense table of the mean of a measure over two dimensions
///
/// A cell without observations is `None`, which is distinct from a mean of
/// `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    pub row_dimension: Dimension,
    pub column_dimension: Dimension,
    pub measure: Measure,
    pub row_keys: Vec<KeyValue>,
    pub column_keys: Vec<KeyValue>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<Option<f64>>>,
}

impl PivotTable {
    #[must_use]
    pub fn mean(
        records: &[DerivedEncounter],
        row_dimension: Dimension,
        column_dimension: Dimension,
        measure: Measure,
    ) -> Self {
        let grouped = group_by(
            records,
            &[row_dimension, column_dimension],
            &[Aggregation::new(measure.name(), measure, Statistic::Mean)],
        );
        let row_keys = observed_keys(records, row_dimension);
        let column_keys = observed_keys(records, column_dimension);
        let mut cells = vec![vec![None; column_keys.len()]; row_keys.len()];
        for row in &grouped.rows {
            if let (Ok(i), Ok(j)) = (
                row_keys.binary_search(&row.key[0]),
                column_keys.binary_search(&row.key[1]),
            ) {
                cells[i][j] = row.values[0];
            }
        }
        Self {
            row_dimension,
            column_dimension,
            measure,
            row_keys,
            column_keys,
            cells,
        }
    }

    #[must_use]
    pub fn get(&self, row: KeyValue, column: KeyValue) -> Option<f64> {
        let i = self.row_keys.binary_search(&row).ok()?;
        let j = self.column_keys.binary_search(&column).ok()?;
        self.cells[i][j]
    }
}

#[cfg(test)]
mod tests {
    use healthconnect_data::{Diagnosis, Gender, Region, Treatment};

    use super::*;
    use crate::derive::{derive_all, tests::encounter};

    fn success_rate() -> Aggregation {
        Aggregation::new("SuccessRate", Measure::TreatmentSuccess, Statistic::Mean)
    }

    #[test]
    fn test_group_by_omits_absent_combinations() {
        let mut a = encounter(1, 30);
        a.region = Region::East;
        a.gender = Gender::Male;
        let mut b = encounter(2, 40);
        b.region = Region::West;
        b.gender = Gender::Female;
        let records = derive_all(&[a, b]);

        let table = group_by(
            &records,
            &[Dimension::Region, Dimension::Gender],
            &[Aggregation::new("n", Measure::PatientId, Statistic::Count)],
        );
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].key,
            [KeyValue::Text("East"), KeyValue::Text("M")]
        );
        assert_eq!(table.header(), ["Region", "Gender", "n"]);
    }

    #[test]
    fn test_std_of_single_value_is_undefined() {
        let records = derive_all(&[encounter(1, 30)]);
        let table = group_by(
            &records,
            &[Dimension::Region],
            &[Aggregation::new("std", Measure::Age, Statistic::Std)],
        );
        assert_eq!(table.rows[0].values, [None]);
    }

    #[test]
    fn test_mode_and_proportion() {
        let mut records = vec![encounter(1, 30), encounter(2, 30), encounter(3, 50)];
        records[2].region = Region::South;
        let records = derive_all(&records);
        let table = group_by(
            &records,
            &[Dimension::Region],
            &[
                Aggregation::new("mode", Measure::Age, Statistic::Mode),
                Aggregation::new("share", Measure::Age, Statistic::Proportion),
            ],
        );
        let north = [KeyValue::Text("North")];
        assert_eq!(table.get(&north, "mode"), Some(30.0));
        let share = table.get(&north, "share").unwrap();
        assert!((share - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_distinct_key_is_one_group() {
        let records = derive_all(&[encounter(1, 30), encounter(2, 35)]);
        let table = group_by(&records, &[Dimension::Gender], &[success_rate()]);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].values, [Some(1.0)]);
    }

    #[test]
    fn test_ranked_by_is_descending_and_stable() {
        let mut records = Vec::new();
        for (id, treatment, success) in [
            (1, Treatment::Surgery, true),
            (2, Treatment::Counseling, false),
            (3, Treatment::Medication, true),
            (4, Treatment::Surgery, false),
        ] {
            let mut r = encounter(id, 40);
            r.treatment = treatment;
            r.treatment_success = success;
            records.push(r);
        }
        let records = derive_all(&records);
        let ranked = group_by(&records, &[Dimension::Treatment], &[success_rate()])
            .ranked_by("SuccessRate");
        let order = ranked
            .rows
            .iter()
            .map(|r| r.key[0].to_string())
            .collect::<Vec<_>>();
        assert_eq!(order, ["Medication", "Surgery", "Counseling"]);
    }

    #[test]
    fn test_ranked_by_puts_undefined_last() {
        let records = derive_all(&[encounter(1, 30), encounter(2, 30)]);
        let mut table = group_by(
            &records,
            &[Dimension::Gender],
            &[Aggregation::new("std", Measure::Age, Statistic::Std)],
        );
        table.rows.insert(
            0,
            GroupRow {
                key: vec![KeyValue::Text("A")],
                values: vec![None],
            },
        );
        let ranked = table.ranked_by("std");
        assert_eq!(ranked.rows[0].values, [Some(0.0)]);
        assert_eq!(ranked.rows[1].values, [None]);
    }

    #[test]
    fn test_crosstab_sums_to_record_count() {
        let diagnoses = [Diagnosis::Asthma, Diagnosis::Copd, Diagnosis::Asthma];
        let regions = [Region::North, Region::South, Region::South];
        let records = diagnoses
            .iter()
            .zip(regions)
            .enumerate()
            .map(|(i, (&diagnosis, region))| {
                let mut r = encounter(i as u64, 40);
                r.diagnosis = diagnosis;
                r.region = region;
                r
            })
            .collect::<Vec<_>>();
        let records = derive_all(&records);
        let tab = CrossTab::new(&records, Dimension::Region, Dimension::Diagnosis);
        assert_eq!(tab.total(), records.len());
        assert_eq!(tab.get(KeyValue::Text("North"), KeyValue::Text("COPD")), 0);
        assert_eq!(tab.get(KeyValue::Text("South"), KeyValue::Text("Asthma")), 1);
        assert_eq!(tab.counts.len(), 2);
        assert_eq!(tab.counts[0].len(), 2);
        assert_eq!(
            tab.row_argmax(KeyValue::Text("North")),
            Some((KeyValue::Text("Asthma"), 1))
        );
        // tie between Asthma and COPD in the South row
        assert_eq!(
            tab.row_argmax(KeyValue::Text("South")),
            Some((KeyValue::Text("Asthma"), 1))
        );
    }

    #[test]
    fn test_pivot_distinguishes_no_data_from_zero() {
        let mut failed = encounter(1, 40);
        failed.treatment_success = false;
        failed.treatment = Treatment::Surgery;
        let mut other = encounter(2, 40);
        other.diagnosis = Diagnosis::Obesity;
        other.treatment = Treatment::Counseling;
        let records = derive_all(&[failed, other]);

        let pivot = PivotTable::mean(
            &records,
            Dimension::Diagnosis,
            Dimension::Treatment,
            Measure::TreatmentSuccess,
        );
        let asthma = KeyValue::Text("Asthma");
        assert_eq!(pivot.get(asthma, KeyValue::Text("Surgery")), Some(0.0));
        assert_eq!(pivot.get(asthma, KeyValue::Text("Counseling")), None);
        assert_eq!(
            pivot.get(KeyValue::Text("Obesity"), KeyValue::Text("Counseling")),
            Some(1.0)
        );
    }
}
