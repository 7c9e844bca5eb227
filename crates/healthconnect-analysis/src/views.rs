//! Fixed aggregate views exported for dashboards
//!
//! Each view is a [`GroupedTable`] with a fixed set of key dimensions and
//! named columns, written as one CSV file per view.

use crate::{
    aggregate::{Aggregation, GroupedTable, Statistic, group_by},
    derive::DerivedEncounter,
    dimension::{Dimension, Measure},
};

/// Views of the dashboard data set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardView {
    /// Encounter counts by age group, gender and region
    Demographics,
    /// Monthly counts, success rate and severity by region and diagnosis
    DiagnosisPatterns,
    /// Outcomes of each treatment per diagnosis
    TreatmentOutcomes,
    /// Risk score and success rate by region, diagnosis and treatment
    PredictiveAnalytics,
}

impl DashboardView {
    pub const ALL: [Self; 4] = [
        Self::Demographics,
        Self::DiagnosisPatterns,
        Self::TreatmentOutcomes,
        Self::PredictiveAnalytics,
    ];

    /// File stem of the exported CSV.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Demographics => "demographics",
            Self::DiagnosisPatterns => "diagnosis_patterns",
            Self::TreatmentOutcomes => "treatment_outcomes",
            Self::PredictiveAnalytics => "predictive_analytics",
        }
    }

    #[must_use]
    pub fn build(self, records: &[DerivedEncounter]) -> GroupedTable {
        let count = || Aggregation::new("PatientCount", Measure::PatientId, Statistic::Count);
        let success_rate =
            || Aggregation::new("SuccessRate", Measure::TreatmentSuccess, Statistic::Mean);
        match self {
            Self::Demographics => group_by(
                records,
                &[Dimension::AgeGroup, Dimension::Gender, Dimension::Region],
                &[count()],
            ),
            Self::DiagnosisPatterns => group_by(
                records,
                &[
                    Dimension::Region,
                    Dimension::Diagnosis,
                    Dimension::AdmissionMonth,
                    Dimension::AdmissionYear,
                ],
                &[
                    count(),
                    success_rate(),
                    Aggregation::new("AvgSeverity", Measure::InitialSeverity, Statistic::Mean),
                ],
            ),
            Self::TreatmentOutcomes => group_by(
                records,
                &[Dimension::Treatment, Dimension::Diagnosis],
                &[
                    count(),
                    success_rate(),
                    Aggregation::new("AvgLengthOfStay", Measure::LengthOfStay, Statistic::Mean),
                    Aggregation::new("AvgFollowUps", Measure::FollowUpVisits, Statistic::Mean),
                ],
            ),
            Self::PredictiveAnalytics => group_by(
                records,
                &[Dimension::Region, Dimension::Diagnosis, Dimension::Treatment],
                &[
                    Aggregation::new("AvgRiskScore", Measure::RiskScore, Statistic::Mean),
                    Aggregation::new("RiskScoreStd", Measure::RiskScore, Statistic::Std),
                    success_rate(),
                    count(),
                ],
            ),
        }
    }
}

/// Flat tables exported by the complete analysis for external BI tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisExport {
    Demographics,
    TreatmentSuccess,
    GeoDistribution,
}

impl AnalysisExport {
    pub const ALL: [Self; 3] = [
        Self::Demographics,
        Self::TreatmentSuccess,
        Self::GeoDistribution,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Demographics => "tableau_demographics",
            Self::TreatmentSuccess => "tableau_treatment_success",
            Self::GeoDistribution => "tableau_geo_distribution",
        }
    }

    #[must_use]
    pub fn build(self, records: &[DerivedEncounter]) -> GroupedTable {
        let count = || Aggregation::new("count", Measure::PatientId, Statistic::Count);
        match self {
            Self::Demographics => group_by(
                records,
                &[
                    Dimension::Diagnosis,
                    Dimension::Age,
                    Dimension::Gender,
                    Dimension::Region,
                ],
                &[count()],
            ),
            Self::TreatmentSuccess => group_by(
                records,
                &[Dimension::Treatment, Dimension::Diagnosis],
                &[
                    Aggregation::new("mean", Measure::TreatmentSuccess, Statistic::Mean),
                    Aggregation::new("count", Measure::TreatmentSuccess, Statistic::Count),
                ],
            ),
            Self::GeoDistribution => {
                group_by(records, &[Dimension::Region, Dimension::Diagnosis], &[count()])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use healthconnect_data::{Diagnosis, Region, Treatment};

    use super::*;
    use crate::{
        derive::{derive_all, tests::encounter},
        dimension::KeyValue,
    };

    fn four_records() -> Vec<DerivedEncounter> {
        let rows = [
            // id, age, treatment, diagnosis, success, stay, follow-ups
            (1, 30, Treatment::Surgery, Diagnosis::Asthma, true, 4, 2),
            (2, 50, Treatment::Surgery, Diagnosis::Asthma, false, 6, 0),
            (3, 70, Treatment::Surgery, Diagnosis::Obesity, true, 10, 5),
            (4, 40, Treatment::Counseling, Diagnosis::Asthma, true, 1, 1),
        ];
        let records = rows
            .into_iter()
            .map(|(id, age, treatment, diagnosis, success, stay, follow_ups)| {
                let mut r = encounter(id, age);
                r.treatment = treatment;
                r.diagnosis = diagnosis;
                r.treatment_success = success;
                r.discharge_date = r.admission_date + chrono::Days::new(u64::from(stay));
                r.length_of_stay = stay;
                r.follow_up_visits = follow_ups;
                r
            })
            .collect::<Vec<_>>();
        derive_all(&records)
    }

    #[test]
    fn test_treatment_outcomes_end_to_end() {
        let table = DashboardView::TreatmentOutcomes.build(&four_records());
        assert_eq!(
            table.header(),
            [
                "Treatment",
                "Diagnosis",
                "PatientCount",
                "SuccessRate",
                "AvgLengthOfStay",
                "AvgFollowUps"
            ]
        );
        let rows = table
            .rows
            .iter()
            .map(|r| (r.key.clone(), r.values.clone()))
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            [
                (
                    vec![KeyValue::Text("Counseling"), KeyValue::Text("Asthma")],
                    vec![Some(1.0), Some(1.0), Some(1.0), Some(1.0)]
                ),
                (
                    vec![KeyValue::Text("Surgery"), KeyValue::Text("Asthma")],
                    vec![Some(2.0), Some(0.5), Some(5.0), Some(1.0)]
                ),
                (
                    vec![KeyValue::Text("Surgery"), KeyValue::Text("Obesity")],
                    vec![Some(1.0), Some(1.0), Some(10.0), Some(5.0)]
                ),
            ]
        );
    }

    #[test]
    fn test_predictive_view_has_undefined_std_for_single_records() {
        let table = DashboardView::PredictiveAnalytics.build(&four_records());
        let surgery_obesity = [
            KeyValue::Text("North"),
            KeyValue::Text("Obesity"),
            KeyValue::Text("Surgery"),
        ];
        assert_eq!(table.get(&surgery_obesity, "RiskScoreStd"), None);
        assert_eq!(table.get(&surgery_obesity, "PatientCount"), Some(1.0));

        let surgery_asthma = [
            KeyValue::Text("North"),
            KeyValue::Text("Asthma"),
            KeyValue::Text("Surgery"),
        ];
        // risk scores differ only by the age term: 30/85*0.3 and 50/85*0.3
        let expected_mean = 2.3 + (30.0 + 50.0) / 2.0 / 85.0 * 0.3;
        let mean = table.get(&surgery_asthma, "AvgRiskScore").unwrap();
        assert!((mean - expected_mean).abs() < 1e-9);
    }

    #[test]
    fn test_demographics_counts_by_age_group() {
        let mut records = four_records();
        records[1].encounter.region = Region::South;
        let table = DashboardView::Demographics.build(&records);
        let total = table.rows.iter().filter_map(|r| r.values[0]).sum::<f64>();
        assert!((total - 4.0).abs() < f64::EPSILON);
        assert_eq!(table.rows[0].key[0], KeyValue::Text("21-30"));
    }

    #[test]
    fn test_diagnosis_patterns_keys_include_calendar() {
        let table = DashboardView::DiagnosisPatterns.build(&four_records());
        assert_eq!(
            table.header()[..4],
            ["Region", "Diagnosis", "Month", "Year"]
        );
        assert_eq!(table.rows[0].key[2], KeyValue::Number(3));
        assert_eq!(table.rows[0].key[3], KeyValue::Number(2024));
    }

    #[test]
    fn test_treatment_success_export() {
        let table = AnalysisExport::TreatmentSuccess.build(&four_records());
        assert_eq!(table.header(), ["Treatment", "Diagnosis", "mean", "count"]);
        assert_eq!(table.rows.len(), 3);
    }
}
