use std::path::PathBuf;

use chrono::Local;
use healthconnect_analysis::{
    aggregate::{CrossTab, PivotTable},
    derive::DerivedEncounter,
    dimension::{Dimension, Measure},
    summary::{self, DatasetSummary},
    views::AnalysisExport,
};
use healthconnect_training::evaluation::ModelEvaluation;
use tracing::info;

use super::{InputArg, ModelArg};
use crate::{
    config::{AnalysisConfig, PlotConfig},
    markdown::AnalysisReport,
    model::{save_model_artifacts, train_model},
    util::{self, Output},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    #[clap(flatten)]
    input: InputArg,
    #[clap(flatten)]
    model: ModelArg,
    /// Directory of the BI export tables
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Directory of the plot tables and plot configuration
    #[arg(long, default_value = "visualizations")]
    visualizations_dir: PathBuf,
    /// Directory of the Markdown report
    #[arg(long, default_value = "reports")]
    reports_dir: PathBuf,
    /// Directory of the model artifacts
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let config = AnalysisConfig {
        data_dir: arg.data_dir.clone(),
        visualizations_dir: arg.visualizations_dir.clone(),
        reports_dir: arg.reports_dir.clone(),
        model_dir: arg.model_dir.clone(),
        evaluation: arg.model.evaluation_config(),
        plot: PlotConfig::default(),
    };
    let records = arg.input.load_derived()?;
    analyze(&records, &config)
}

fn analyze(records: &[DerivedEncounter], config: &AnalysisConfig) -> anyhow::Result<()> {
    let summary = DatasetSummary::new(records)
        .ok_or_else(|| anyhow::anyhow!("Cannot analyze an empty dataset"))?;

    info!("Generating plot tables...");
    write_distribution_tables(records, config)?;

    info!("Performing predictive analytics...");
    let model = train_model(records, &config.evaluation)?;
    save_model_artifacts(&model, &config.model_dir)?;
    write_feature_importance(&model.evaluation, config)?;

    info!("Exporting analysis tables...");
    for export in AnalysisExport::ALL {
        let path = config.data_dir.join(format!("{}.csv", export.name()));
        util::save_grouped_table(&export.build(records), path)?;
    }

    info!("Generating summary report...");
    let report = AnalysisReport {
        generated_at: Local::now().naive_local(),
        summary: &summary,
        evaluation: &model.evaluation,
    };
    let report_path = config.reports_dir.join("analysis_report.md");
    Output::save_text(&report.to_string(), Some(report_path.clone()))?;

    info!("Analysis complete");
    info!("  Plot tables: {}", config.visualizations_dir.display());
    info!("  Exports:     {}", config.data_dir.display());
    info!("  Model:       {}", config.model_dir.display());
    info!("  Report:      {}", report_path.display());
    Ok(())
}

/// Tables behind the distribution, crosstab and pivot plots.
fn write_distribution_tables(
    records: &[DerivedEncounter],
    config: &AnalysisConfig,
) -> anyhow::Result<()> {
    let dir = &config.visualizations_dir;
    Output::save_json(&config.plot, Some(dir.join("plot_config.json")))?;

    if let Some(histogram) = summary::histogram(records, Measure::Age, config.plot.histogram_bins)
    {
        let rows = histogram.bins.iter().map(|bin| {
            vec![
                bin.range.start.to_string(),
                bin.range.end.to_string(),
                bin.count.to_string(),
            ]
        });
        Output::open(dir.join("age_distribution.csv"))?
            .write_csv(&["BinStart", "BinEnd", "Count"], rows)?;
    }

    let genders = summary::value_counts(records, Dimension::Gender);
    let rows = genders.entries().iter().map(|(gender, count)| {
        vec![
            gender.to_string(),
            count.to_string(),
            util::optional_field(genders.share_of(gender)),
        ]
    });
    Output::open(dir.join("gender_distribution.csv"))?
        .write_csv(&["Gender", "Count", "Share"], rows)?;

    for (dimension, file) in [
        (Dimension::Region, "regional_distribution.csv"),
        (Dimension::Diagnosis, "common_diagnoses.csv"),
    ] {
        let counts = summary::value_counts(records, dimension);
        let rows = counts
            .entries()
            .iter()
            .map(|(key, count)| vec![key.to_string(), count.to_string()]);
        Output::open(dir.join(file))?.write_csv(&[dimension.name(), "Count"], rows)?;
    }

    util::save_grouped_table(
        &summary::ranked_success_rates(records),
        dir.join("treatment_success_rates.csv"),
    )?;
    util::save_crosstab(
        &CrossTab::new(records, Dimension::Region, Dimension::Diagnosis),
        dir.join("diagnosis_by_region.csv"),
    )?;

    let rows = summary::box_summaries(records, Dimension::Treatment, Measure::LengthOfStay)
        .into_iter()
        .map(|(treatment, b)| {
            [treatment.to_string()]
                .into_iter()
                .chain([b.min, b.q1, b.median, b.q3, b.max].map(|v| v.to_string()))
                .collect::<Vec<_>>()
        });
    Output::open(dir.join("length_of_stay.csv"))?.write_csv(
        &["Treatment", "Min", "Q1", "Median", "Q3", "Max"],
        rows,
    )?;

    util::save_pivot(
        &PivotTable::mean(
            records,
            Dimension::Diagnosis,
            Dimension::Treatment,
            Measure::TreatmentSuccess,
        ),
        dir.join("treatment_success_matrix.csv"),
    )?;
    info!("Saved plot tables to {}", dir.display());
    Ok(())
}

fn write_feature_importance(
    evaluation: &ModelEvaluation,
    config: &AnalysisConfig,
) -> anyhow::Result<()> {
    let rows = evaluation
        .importances
        .iter()
        .map(|(feature, importance)| vec![feature.clone(), importance.to_string()]);
    Output::open(config.visualizations_dir.join("feature_importance.csv"))?
        .write_csv(&["Feature", "Importance"], rows)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use healthconnect_analysis::derive::derive_all;
    use healthconnect_data::{ValidationPolicy, read_encounters};
    use healthconnect_training::{evaluation::EvaluationConfig, forest::ForestParams};

    use super::*;

    fn records() -> Vec<DerivedEncounter> {
        let mut csv = String::from(
            "PatientID,Age,Gender,Region,Diagnosis,Treatment,AdmissionDate,DischargeDate,LengthOfStay,TreatmentSuccess,InitialSeverity,Comorbidities,InsuranceType,FollowUpVisits\n",
        );
        let regions = ["North", "South", "East"];
        let diagnoses = ["Asthma", "COPD"];
        let treatments = ["Surgery", "Medication"];
        for i in 0..40_usize {
            let severity = i % 10 + 1;
            csv.push_str(&format!(
                "{},{},{},{},{},{},2024-05-01,2024-05-0{},{},{},{severity},{},Public,2\n",
                200_000 + i,
                25 + i,
                if i.is_multiple_of(2) { "M" } else { "F" },
                regions[i % 3],
                diagnoses[i % 2],
                treatments[(i / 2) % 2],
                2 + i % 5,
                1 + i % 5,
                if severity <= 5 { "True" } else { "False" },
                i % 4,
            ));
        }
        let encounters = read_encounters(csv.as_bytes(), ValidationPolicy::Strict)
            .unwrap()
            .encounters;
        derive_all(&encounters)
    }

    #[test]
    fn test_analyze_writes_every_artifact() {
        let root = std::env::temp_dir().join(format!(
            "healthconnect-analyze-test-{}",
            std::process::id()
        ));
        let config = AnalysisConfig {
            data_dir: root.join("data"),
            visualizations_dir: root.join("visualizations"),
            reports_dir: root.join("reports"),
            model_dir: root.join("models"),
            evaluation: EvaluationConfig {
                forest: ForestParams {
                    n_trees: 5,
                    ..ForestParams::default()
                },
                ..EvaluationConfig::default()
            },
            plot: PlotConfig::default(),
        };
        analyze(&records(), &config).unwrap();

        for path in [
            "data/tableau_demographics.csv",
            "data/tableau_treatment_success.csv",
            "data/tableau_geo_distribution.csv",
            "visualizations/plot_config.json",
            "visualizations/age_distribution.csv",
            "visualizations/gender_distribution.csv",
            "visualizations/regional_distribution.csv",
            "visualizations/common_diagnoses.csv",
            "visualizations/treatment_success_rates.csv",
            "visualizations/diagnosis_by_region.csv",
            "visualizations/length_of_stay.csv",
            "visualizations/treatment_success_matrix.csv",
            "visualizations/feature_importance.csv",
            "models/model_summary.json",
            "models/encoding.json",
            "models/confusion_matrix.csv",
            "reports/analysis_report.md",
        ] {
            assert!(root.join(path).is_file(), "missing {path}");
        }

        let crosstab = fs::read_to_string(root.join("visualizations/diagnosis_by_region.csv")).unwrap();
        let mut lines = crosstab.lines();
        assert_eq!(lines.next(), Some("Region,Asthma,COPD"));
        assert_eq!(lines.next(), Some("East,7,6"));

        let age = fs::read_to_string(root.join("visualizations/age_distribution.csv")).unwrap();
        assert_eq!(age.lines().count(), 31);

        fs::remove_dir_all(&root).unwrap();
    }
}
