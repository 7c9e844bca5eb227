//! Narrative insights of a dataset
//!
//! Computes the figures behind the insights report: demographics, diagnosis
//! patterns, treatment effectiveness and a risk-factor analysis. Text
//! rendering is left to the caller.

use healthconnect_stats::{
    correlation, descriptive, frequency::ValueCounts, percentiles::compute_percentile,
};

use crate::{
    aggregate::{Aggregation, CrossTab, Statistic, group_by},
    derive::DerivedEncounter,
    dimension::{Dimension, KeyValue, Measure},
    summary::value_counts,
};

/// Percentile of the risk score above which a record is high-risk.
pub const HIGH_RISK_PERCENTILE: f64 = 75.0;

/// Fields whose correlation with the treatment outcome is reported.
pub const SUCCESS_FACTORS: [Measure; 3] =
    [Measure::Age, Measure::InitialSeverity, Measure::Comorbidities];

#[derive(Debug, Clone, PartialEq)]
pub struct DemographicInsights {
    pub mean_age: f64,
    /// Sample standard deviation of the age
    pub age_std_dev: Option<f64>,
    pub male_share: f64,
    pub female_share: f64,
    /// Region with the most encounters and its count
    pub busiest_region: (KeyValue, usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionDiagnosis {
    pub region: KeyValue,
    pub diagnosis: KeyValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisInsights {
    pub top_diagnoses: Vec<(KeyValue, usize)>,
    /// Most common diagnosis of each region, regions in order of first appearance
    pub by_region: Vec<RegionDiagnosis>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentOutcome {
    pub treatment: KeyValue,
    pub success_rate: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TreatmentInsights {
    pub overall_success_rate: f64,
    /// Outcomes in treatment label order
    pub by_treatment: Vec<TreatmentOutcome>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskInsights {
    /// Risk score at [`HIGH_RISK_PERCENTILE`]
    pub threshold: f64,
    /// Records with a risk score strictly above `threshold`
    pub high_risk_count: usize,
    pub high_risk_mean_age: Option<f64>,
    pub high_risk_top_diagnosis: Option<KeyValue>,
    /// Pearson correlation of each of [`SUCCESS_FACTORS`] with the outcome;
    /// `None` when undefined
    pub success_correlations: Vec<(Measure, Option<f64>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insights {
    pub demographics: DemographicInsights,
    pub diagnoses: DiagnosisInsights,
    pub treatments: TreatmentInsights,
    pub risk: RiskInsights,
}

impl Insights {
    /// Computes all insights; `None` for an empty dataset.
    #[must_use]
    pub fn new(records: &[DerivedEncounter]) -> Option<Self> {
        Some(Self {
            demographics: DemographicInsights::new(records)?,
            diagnoses: DiagnosisInsights::new(records),
            treatments: TreatmentInsights::new(records)?,
            risk: RiskInsights::new(records)?,
        })
    }
}

fn measure_values(records: &[DerivedEncounter], measure: Measure) -> Vec<f64> {
    records.iter().filter_map(|r| measure.value(r)).collect()
}

impl DemographicInsights {
    fn new(records: &[DerivedEncounter]) -> Option<Self> {
        let ages = measure_values(records, Measure::Age);
        let genders = value_counts(records, Dimension::Gender);
        let regions = value_counts(records, Dimension::Region);
        Some(Self {
            mean_age: descriptive::mean(ages.iter().copied())?,
            age_std_dev: descriptive::sample_std_dev(ages),
            male_share: genders.share_of(&KeyValue::Text("M"))?,
            female_share: genders.share_of(&KeyValue::Text("F"))?,
            busiest_region: *regions.entries().first()?,
        })
    }
}

impl DiagnosisInsights {
    fn new(records: &[DerivedEncounter]) -> Self {
        let top_diagnoses = value_counts(records, Dimension::Diagnosis)
            .top(3)
            .copied()
            .collect();

        let crosstab = CrossTab::new(records, Dimension::Region, Dimension::Diagnosis);
        let mut regions = Vec::<KeyValue>::new();
        for region in records.iter().filter_map(|r| Dimension::Region.key(r)) {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        let by_region = regions
            .into_iter()
            .filter_map(|region| {
                let (diagnosis, count) = crosstab.row_argmax(region)?;
                Some(RegionDiagnosis {
                    region,
                    diagnosis,
                    count,
                })
            })
            .collect();

        Self {
            top_diagnoses,
            by_region,
        }
    }
}

impl TreatmentInsights {
    #[expect(clippy::cast_possible_truncation)]
    #[expect(clippy::cast_sign_loss)]
    fn new(records: &[DerivedEncounter]) -> Option<Self> {
        let table = group_by(
            records,
            &[Dimension::Treatment],
            &[
                Aggregation::new("mean", Measure::TreatmentSuccess, Statistic::Mean),
                Aggregation::new("count", Measure::TreatmentSuccess, Statistic::Count),
            ],
        );
        let by_treatment = table
            .rows
            .iter()
            .filter_map(|row| {
                Some(TreatmentOutcome {
                    treatment: row.key[0],
                    success_rate: row.values[0]?,
                    count: row.values[1]? as usize,
                })
            })
            .collect();
        Some(Self {
            overall_success_rate: descriptive::mean(measure_values(
                records,
                Measure::TreatmentSuccess,
            ))?,
            by_treatment,
        })
    }
}

impl RiskInsights {
    fn new(records: &[DerivedEncounter]) -> Option<Self> {
        let mut scores = measure_values(records, Measure::RiskScore);
        if scores.is_empty() {
            return None;
        }
        scores.sort_by(f64::total_cmp);
        let threshold = compute_percentile(&scores, HIGH_RISK_PERCENTILE);

        let high_risk = records
            .iter()
            .filter(|r| r.risk_score > threshold)
            .collect::<Vec<_>>();
        let high_risk_mean_age =
            descriptive::mean(high_risk.iter().filter_map(|r| Measure::Age.value(r)));
        let high_risk_top_diagnosis =
            ValueCounts::new(high_risk.iter().filter_map(|r| Dimension::Diagnosis.key(r)))
                .mode()
                .copied();

        let outcomes = measure_values(records, Measure::TreatmentSuccess);
        let success_correlations = SUCCESS_FACTORS
            .iter()
            .map(|&factor| {
                let values = measure_values(records, factor);
                (factor, correlation::pearson(&values, &outcomes))
            })
            .collect();

        Some(Self {
            threshold,
            high_risk_count: high_risk.len(),
            high_risk_mean_age,
            high_risk_top_diagnosis,
            success_correlations,
        })
    }
}

#[cfg(test)]
mod tests {
    use healthconnect_data::{Diagnosis, Gender, Region, Treatment};

    use super::*;
    use crate::derive::{derive_all, tests::encounter};

    fn sample() -> Vec<DerivedEncounter> {
        let rows = [
            // age, severity, region, diagnosis, treatment, success
            (30, 2, Region::West, Diagnosis::Asthma, Treatment::Surgery, true),
            (40, 4, Region::West, Diagnosis::Asthma, Treatment::Counseling, true),
            (50, 6, Region::East, Diagnosis::Copd, Treatment::Surgery, false),
            (60, 8, Region::East, Diagnosis::Copd, Treatment::Surgery, false),
            (70, 10, Region::West, Diagnosis::Obesity, Treatment::Counseling, false),
        ];
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, (age, severity, region, diagnosis, treatment, success))| {
                let mut r = encounter(i as u64, age);
                r.gender = if i < 2 { Gender::Male } else { Gender::Female };
                r.initial_severity = severity;
                r.region = region;
                r.diagnosis = diagnosis;
                r.treatment = treatment;
                r.treatment_success = success;
                r
            })
            .collect::<Vec<_>>();
        derive_all(&records)
    }

    #[test]
    fn test_demographics() {
        let insights = Insights::new(&sample()).unwrap();
        let demo = &insights.demographics;
        assert!((demo.mean_age - 50.0).abs() < f64::EPSILON);
        // squared deviations 400+100+0+100+400 = 1000, / 4
        assert!((demo.age_std_dev.unwrap() - 250.0_f64.sqrt()).abs() < 1e-12);
        assert!((demo.male_share - 0.4).abs() < 1e-12);
        assert!((demo.female_share - 0.6).abs() < 1e-12);
        assert_eq!(demo.busiest_region, (KeyValue::Text("West"), 3));
    }

    #[test]
    fn test_diagnosis_by_region_in_appearance_order() {
        let insights = Insights::new(&sample()).unwrap();
        let regions = insights
            .diagnoses
            .by_region
            .iter()
            .map(|r| (r.region, r.diagnosis, r.count))
            .collect::<Vec<_>>();
        assert_eq!(
            regions,
            [
                (KeyValue::Text("West"), KeyValue::Text("Asthma"), 2),
                (KeyValue::Text("East"), KeyValue::Text("COPD"), 2),
            ]
        );
        assert_eq!(
            insights.diagnoses.top_diagnoses,
            [
                (KeyValue::Text("Asthma"), 2),
                (KeyValue::Text("COPD"), 2),
                (KeyValue::Text("Obesity"), 1)
            ]
        );
    }

    #[test]
    fn test_treatment_outcomes() {
        let insights = Insights::new(&sample()).unwrap();
        let treatments = &insights.treatments;
        assert!((treatments.overall_success_rate - 0.4).abs() < 1e-12);
        assert_eq!(treatments.by_treatment.len(), 2);
        assert_eq!(treatments.by_treatment[0].treatment, KeyValue::Text("Counseling"));
        assert_eq!(treatments.by_treatment[0].count, 2);
        assert!((treatments.by_treatment[1].success_rate - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_high_risk_group_is_strictly_above_threshold() {
        let insights = Insights::new(&sample()).unwrap();
        let risk = &insights.risk;
        // only the severity-10 record is above the 75th percentile score
        assert_eq!(risk.high_risk_count, 1);
        assert_eq!(risk.high_risk_mean_age, Some(70.0));
        assert_eq!(risk.high_risk_top_diagnosis, Some(KeyValue::Text("Obesity")));
    }

    #[test]
    fn test_success_correlations() {
        let insights = Insights::new(&sample()).unwrap();
        let correlations = &insights.risk.success_correlations;
        assert_eq!(correlations.len(), 3);
        let (factor, age) = correlations[0];
        assert_eq!(factor, Measure::Age);
        assert!(age.unwrap() < 0.0);
        // every record has one comorbidity
        assert_eq!(correlations[2], (Measure::Comorbidities, None));
    }

    #[test]
    fn test_identical_scores_leave_no_high_risk_records() {
        let records = derive_all(&[encounter(1, 40), encounter(2, 40)]);
        let insights = Insights::new(&records).unwrap();
        assert_eq!(insights.risk.high_risk_count, 0);
        assert_eq!(insights.risk.high_risk_mean_age, None);
        assert_eq!(insights.risk.high_risk_top_diagnosis, None);
    }
}
