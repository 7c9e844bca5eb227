//! Dataset overview and distribution tables
//!
//! [`DatasetSummary`] collects the headline numbers of a dataset. The free
//! functions build the small distribution tables used for plotting.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use healthconnect_stats::{
    descriptive, frequency::ValueCounts, histogram::Histogram, percentiles::Percentiles,
};

use crate::{
    aggregate::{Aggregation, GroupedTable, Statistic, group_by},
    derive::DerivedEncounter,
    dimension::{Dimension, KeyValue, Measure},
};

/// Counts of each value of `dimension`, most frequent first.
#[must_use]
pub fn value_counts(records: &[DerivedEncounter], dimension: Dimension) -> ValueCounts<KeyValue> {
    ValueCounts::new(records.iter().filter_map(|r| dimension.key(r)))
}

/// Equal-width histogram of `measure`.
#[must_use]
pub fn histogram(records: &[DerivedEncounter], measure: Measure, bins: usize) -> Option<Histogram> {
    Histogram::equal_width(records.iter().filter_map(|r| measure.value(r)), bins)
}

/// Five-number summary of a distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl BoxSummary {
    /// Quartiles use linear interpolation.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let quartiles = Percentiles::from_sorted(&values, &[25.0, 50.0, 75.0]);
        Some(Self {
            min: values[0],
            q1: quartiles.get(25.0)?,
            median: quartiles.get(50.0)?,
            q3: quartiles.get(75.0)?,
            max: values[values.len() - 1],
        })
    }
}

/// Five-number summary of `measure` for each value of `dimension`, in key order.
#[must_use]
pub fn box_summaries(
    records: &[DerivedEncounter],
    dimension: Dimension,
    measure: Measure,
) -> Vec<(KeyValue, BoxSummary)> {
    let mut groups = BTreeMap::<KeyValue, Vec<f64>>::new();
    for record in records {
        if let (Some(key), Some(value)) = (dimension.key(record), measure.value(record)) {
            groups.entry(key).or_default().push(value);
        }
    }
    groups
        .into_iter()
        .filter_map(|(key, values)| Some((key, BoxSummary::new(values)?)))
        .collect()
}

/// Success rate of each treatment, highest first.
#[must_use]
pub fn ranked_success_rates(records: &[DerivedEncounter]) -> GroupedTable {
    group_by(
        records,
        &[Dimension::Treatment],
        &[Aggregation::new(
            "SuccessRate",
            Measure::TreatmentSuccess,
            Statistic::Mean,
        )],
    )
    .ranked_by("SuccessRate")
}

/// Headline numbers of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub first_admission: NaiveDate,
    pub last_admission: NaiveDate,
    pub unique_patients: usize,
    pub min_age: u8,
    pub max_age: u8,
    /// Share of each gender, most frequent first
    pub gender_shares: Vec<(KeyValue, f64)>,
    pub most_common_region: KeyValue,
    /// Three most frequent diagnoses with their counts
    pub top_diagnoses: Vec<(KeyValue, usize)>,
    pub overall_success_rate: f64,
    /// Success rate per treatment, highest first
    pub treatment_success: GroupedTable,
    pub average_length_of_stay: f64,
}

impl DatasetSummary {
    /// Summarizes `records`; `None` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn new(records: &[DerivedEncounter]) -> Option<Self> {
        let encounters = || records.iter().map(|r| &r.encounter);
        let first_admission = encounters().map(|e| e.admission_date).min()?;
        let last_admission = encounters().map(|e| e.admission_date).max()?;
        let min_age = encounters().map(|e| e.age).min()?;
        let max_age = encounters().map(|e| e.age).max()?;

        let genders = value_counts(records, Dimension::Gender);
        let gender_shares = genders
            .entries()
            .iter()
            .map(|(key, count)| (*key, *count as f64 / genders.total() as f64))
            .collect();
        let most_common_region = *value_counts(records, Dimension::Region).mode()?;
        let top_diagnoses = value_counts(records, Dimension::Diagnosis)
            .top(3)
            .copied()
            .collect();

        Some(Self {
            total_records: records.len(),
            first_admission,
            last_admission,
            unique_patients: encounters()
                .map(|e| e.patient_id)
                .collect::<BTreeSet<_>>()
                .len(),
            min_age,
            max_age,
            gender_shares,
            most_common_region,
            top_diagnoses,
            overall_success_rate: descriptive::mean(
                records
                    .iter()
                    .filter_map(|r| Measure::TreatmentSuccess.value(r)),
            )?,
            treatment_success: ranked_success_rates(records),
            average_length_of_stay: descriptive::mean(
                records.iter().filter_map(|r| Measure::LengthOfStay.value(r)),
            )?,
        })
    }
}
