//! Markdown reports
//!
//! Both reports are `Display` values over already computed results; they do
//! no analysis of their own.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use healthconnect_analysis::{
    insights::{DemographicInsights, DiagnosisInsights, Insights, RiskInsights, TreatmentInsights},
    summary::DatasetSummary,
};
use healthconnect_training::evaluation::ModelEvaluation;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn percent(share: f64) -> f64 {
    share * 100.0
}

fn date(date: NaiveDate) -> impl fmt::Display {
    date.format(DATE_FORMAT)
}

/// Report of the complete analysis (`analysis_report.md`)
#[derive(Debug, Clone, Copy)]
pub struct AnalysisReport<'a> {
    pub generated_at: NaiveDateTime,
    pub summary: &'a DatasetSummary,
    pub evaluation: &'a ModelEvaluation,
}

impl fmt::Display for AnalysisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# HealthConnect Data Analysis Report")?;
        writeln!(
            f,
            "Generated on: {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(f)?;
        self.write_overview(f)?;
        self.write_key_findings(f)?;
        self.write_model_performance(f)?;
        write_analysis_recommendations(f)
    }
}

impl AnalysisReport<'_> {
    fn write_overview(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        writeln!(f, "## 1. Dataset Overview")?;
        writeln!(f, "- Total Records: {}", summary.total_records)?;
        writeln!(
            f,
            "- Date Range: {} to {}",
            date(summary.first_admission),
            date(summary.last_admission)
        )?;
        writeln!(
            f,
            "- Number of Unique Patients: {}",
            summary.unique_patients
        )?;
        writeln!(f)
    }

    fn write_key_findings(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.summary;
        writeln!(f, "## 2. Key Findings")?;
        writeln!(f)?;
        writeln!(f, "### Demographics")?;
        writeln!(
            f,
            "- Age Range: {} to {} years",
            summary.min_age, summary.max_age
        )?;
        let genders = summary
            .gender_shares
            .iter()
            .map(|(gender, share)| format!("{gender} {:.1}%", percent(*share)))
            .collect::<Vec<_>>();
        writeln!(f, "- Gender Distribution: {}", genders.join(", "))?;
        writeln!(f, "- Most Common Region: {}", summary.most_common_region)?;
        writeln!(f)?;

        writeln!(f, "### Disease Patterns")?;
        writeln!(f, "- Top 3 Diagnoses:")?;
        for (diagnosis, count) in &summary.top_diagnoses {
            writeln!(f, "  - {diagnosis}: {count}")?;
        }
        writeln!(f)?;

        writeln!(f, "### Treatment Outcomes")?;
        writeln!(
            f,
            "- Overall Success Rate: {:.2}%",
            percent(summary.overall_success_rate)
        )?;
        let best = summary
            .treatment_success
            .rows
            .first()
            .and_then(|row| Some((row.key.first()?, row.values.first().copied()??)));
        if let Some((treatment, rate)) = best {
            writeln!(
                f,
                "- Most Successful Treatment: {treatment} ({:.2}%)",
                percent(rate)
            )?;
        }
        writeln!(
            f,
            "- Average Length of Stay: {:.1} days",
            summary.average_length_of_stay
        )?;
        writeln!(f)
    }

    fn write_model_performance(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let evaluation = self.evaluation;
        writeln!(f, "### Predictive Model Performance")?;
        writeln!(
            f,
            "Random forest trained on {} records, evaluated on {} held-out records.",
            evaluation.train_size, evaluation.test_size
        )?;
        writeln!(f)?;
        writeln!(f, "```text")?;
        write!(f, "{}", evaluation.report)?;
        writeln!(f, "```")?;
        writeln!(f)?;
        writeln!(f, "Confusion matrix (rows: actual, columns: predicted):")?;
        writeln!(f)?;
        let confusion = &evaluation.confusion;
        writeln!(f, "| Actual | {} |", confusion.class_names.join(" | "))?;
        writeln!(f, "|---|{}", "---|".repeat(confusion.class_names.len()))?;
        for (name, counts) in confusion.class_names.iter().zip(&confusion.counts) {
            let counts = counts.iter().map(ToString::to_string).collect::<Vec<_>>();
            writeln!(f, "| {name} | {} |", counts.join(" | "))?;
        }
        writeln!(f)?;
        writeln!(f, "Feature importance:")?;
        for (feature, importance) in &evaluation.importances {
            writeln!(f, "- {feature}: {importance:.3}")?;
        }
        writeln!(f)
    }
}

fn write_analysis_recommendations(f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "## 3. Recommendations")?;
    writeln!(f)?;
    for (i, (title, points)) in ANALYSIS_RECOMMENDATIONS.iter().enumerate() {
        writeln!(f, "{}. {title}", i + 1)?;
        for point in *points {
            writeln!(f, "   - {point}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

const ANALYSIS_RECOMMENDATIONS: [(&str, &[&str]); 4] = [
    (
        "Treatment Optimization",
        &[
            "Focus on treatments with highest success rates",
            "Consider patient characteristics when selecting treatments",
        ],
    ),
    (
        "Resource Allocation",
        &[
            "Allocate resources based on regional disease patterns",
            "Plan staffing based on average length of stay",
        ],
    ),
    (
        "Risk Management",
        &[
            "Monitor high-risk patient profiles",
            "Implement preventive measures for common conditions",
        ],
    ),
    (
        "Patient Care Improvements",
        &[
            "Develop specialized programs for most common conditions",
            "Consider demographic factors in treatment planning",
        ],
    ),
];

const INSIGHT_RECOMMENDATIONS: [&str; 4] = [
    "Focus on preventive care in regions with high-risk populations",
    "Optimize treatment plans based on success rate analysis",
    "Implement targeted interventions for high-risk patients",
    "Enhance follow-up care for complex cases",
];

/// Insights report (`insights_report.md`)
#[derive(Debug, Clone, Copy)]
pub struct InsightsReport<'a> {
    pub generated_at: NaiveDateTime,
    pub insights: &'a Insights,
}

impl fmt::Display for InsightsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Insights {
            demographics,
            diagnoses,
            treatments,
            risk,
        } = self.insights;

        writeln!(f, "# HealthConnect Data Analysis Report")?;
        writeln!(f)?;
        writeln!(
            f,
            "Generated on: {}",
            self.generated_at.format(TIMESTAMP_FORMAT)
        )?;
        writeln!(f)?;
        writeln!(f, "## Executive Summary")?;
        writeln!(
            f,
            "Analysis of patient data reveals significant patterns in healthcare outcomes and treatment effectiveness."
        )?;

        write_demographics(f, demographics)?;
        write_diagnosis_patterns(f, diagnoses)?;
        write_treatment_effectiveness(f, treatments)?;
        write_predictive_insights(f, risk)?;

        writeln!(f)?;
        writeln!(f, "## Recommendations")?;
        writeln!(f, "Based on the analysis, we recommend:")?;
        for (i, recommendation) in INSIGHT_RECOMMENDATIONS.iter().enumerate() {
            writeln!(f, "{}. {recommendation}", i + 1)?;
        }
        Ok(())
    }
}

fn write_demographics(
    f: &mut fmt::Formatter<'_>,
    demographics: &DemographicInsights,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Demographics")?;
    match demographics.age_std_dev {
        Some(sd) => writeln!(
            f,
            "- Average patient age is {:.1} years (SD: {sd:.1})",
            demographics.mean_age
        )?,
        None => writeln!(
            f,
            "- Average patient age is {:.1} years",
            demographics.mean_age
        )?,
    }
    writeln!(
        f,
        "- Gender distribution: {:.1}% Male, {:.1}% Female",
        percent(demographics.male_share),
        percent(demographics.female_share)
    )?;
    let (region, count) = demographics.busiest_region;
    writeln!(
        f,
        "- Highest patient concentration in {region} region ({count} patients)"
    )
}

fn write_diagnosis_patterns(
    f: &mut fmt::Formatter<'_>,
    diagnoses: &DiagnosisInsights,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Diagnosis Patterns")?;
    writeln!(f, "Top 3 diagnoses:")?;
    for (diagnosis, count) in &diagnoses.top_diagnoses {
        writeln!(f, "  - {diagnosis}: {count} cases")?;
    }
    for entry in &diagnoses.by_region {
        writeln!(
            f,
            "- {} region: Most common diagnosis is {} ({} cases)",
            entry.region, entry.diagnosis, entry.count
        )?;
    }
    Ok(())
}

fn write_treatment_effectiveness(
    f: &mut fmt::Formatter<'_>,
    treatments: &TreatmentInsights,
) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Treatment Effectiveness")?;
    writeln!(
        f,
        "- Overall treatment success rate: {:.1}%",
        percent(treatments.overall_success_rate)
    )?;
    writeln!(f)?;
    writeln!(f, "Treatment success rates:")?;
    for outcome in &treatments.by_treatment {
        writeln!(
            f,
            "  - {}: {:.1}% success rate ({} cases)",
            outcome.treatment,
            percent(outcome.success_rate),
            outcome.count
        )?;
    }
    Ok(())
}

fn write_predictive_insights(f: &mut fmt::Formatter<'_>, risk: &RiskInsights) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "## Predictive Insights")?;
    writeln!(f, "Risk Factor Analysis:")?;
    writeln!(
        f,
        "- {} patients identified as high-risk (risk score above {:.2})",
        risk.high_risk_count, risk.threshold
    )?;
    if let Some(age) = risk.high_risk_mean_age {
        writeln!(f, "- Average age in high-risk group: {age:.1} years")?;
    }
    if let Some(diagnosis) = risk.high_risk_top_diagnosis {
        writeln!(
            f,
            "- Most common diagnosis in high-risk group: {diagnosis}"
        )?;
    }
    writeln!(f)?;
    writeln!(f, "Success Prediction Factors:")?;
    for (measure, correlation) in &risk.success_correlations {
        match correlation {
            Some(r) => {
                let direction = if *r > 0.0 { "Positive" } else { "Negative" };
                writeln!(
                    f,
                    "- {}: {direction} correlation ({r:.2})",
                    measure.name()
                )?;
            }
            None => writeln!(f, "- {}: correlation undefined", measure.name())?,
        }
    }
    Ok(())
}
