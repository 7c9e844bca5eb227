use std::path::Path;

use chrono::{DateTime, Utc};
use healthconnect_analysis::{
    derive::DerivedEncounter, encoding::EncodingTable, feature_matrix::FeatureMatrixBuilder,
};
use healthconnect_training::{
    evaluation::{EvaluationConfig, ModelEvaluation, train_and_evaluate},
    metrics::{ClassificationReport, ConfusionMatrix},
};
use serde::Serialize;
use tracing::{debug, info};

use crate::util::Output;

/// Class names of the treatment outcome, indexed by label
pub const CLASS_NAMES: [&str; 2] = ["False", "True"];

/// Persisted description of a trained classifier
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    pub trained_at: DateTime<Utc>,
    pub seed: u64,
    pub n_trees: usize,
    pub test_fraction: f64,
    pub train_size: usize,
    pub test_size: usize,
    pub accuracy: f64,
    pub feature_importances: Vec<FeatureImportance>,
    pub classification_report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Outcome of training: the evaluation and the encoding the features used
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub encoding: EncodingTable,
    pub evaluation: ModelEvaluation,
    pub summary: ModelSummary,
}

/// Builds the feature matrix of `records` and trains and evaluates the
/// treatment success classifier on it.
pub fn train_model(
    records: &[DerivedEncounter],
    config: &EvaluationConfig,
) -> anyhow::Result<TrainedModel> {
    let builder = FeatureMatrixBuilder::fit(records);
    let matrix = builder.build(records)?;
    let labels = matrix
        .labels
        .iter()
        .map(|&success| usize::from(success))
        .collect::<Vec<_>>();
    info!(
        "Training {} trees on {} records with {} features",
        config.forest.n_trees,
        matrix.len(),
        matrix.columns.len()
    );

    let (forest, evaluation) = train_and_evaluate(
        &matrix.rows,
        &labels,
        &matrix.column_names(),
        &CLASS_NAMES,
        config,
    )?;
    debug!("Trained forest of {} trees", forest.n_trees());
    info!(
        "Accuracy on {} held-out records: {:.3}",
        evaluation.test_size, evaluation.report.accuracy
    );

    let summary = ModelSummary {
        trained_at: Utc::now(),
        seed: config.forest.seed,
        n_trees: forest.n_trees(),
        test_fraction: config.test_fraction,
        train_size: evaluation.train_size,
        test_size: evaluation.test_size,
        accuracy: evaluation.report.accuracy,
        feature_importances: evaluation
            .importances
            .iter()
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect(),
        classification_report: evaluation.report.clone(),
        confusion_matrix: evaluation.confusion.clone(),
    };
    Ok(TrainedModel {
        encoding: builder.encoding().clone(),
        evaluation,
        summary,
    })
}

/// Writes `model_summary.json`, `encoding.json` and `confusion_matrix.csv`
/// into `dir`.
pub fn save_model_artifacts(model: &TrainedModel, dir: &Path) -> anyhow::Result<()> {
    Output::save_json(&model.summary, Some(dir.join("model_summary.json")))?;
    Output::save_json(&model.encoding, Some(dir.join("encoding.json")))?;

    let confusion = &model.evaluation.confusion;
    let header = ["Actual"]
        .into_iter()
        .chain(confusion.class_names.iter().map(String::as_str))
        .collect::<Vec<_>>();
    let rows = confusion
        .class_names
        .iter()
        .zip(&confusion.counts)
        .map(|(name, counts)| {
            [name.clone()]
                .into_iter()
                .chain(counts.iter().map(ToString::to_string))
                .collect::<Vec<_>>()
        });
    Output::open(dir.join("confusion_matrix.csv"))?.write_csv(&header, rows)?;
    info!("Saved model artifacts to {}", dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use healthconnect_analysis::derive::derive_all;
    use healthconnect_data::{ValidationPolicy, read_encounters};
    use healthconnect_training::forest::ForestParams;

    use super::*;

    fn records() -> Vec<DerivedEncounter> {
        let mut csv = String::from(
            "PatientID,Age,Gender,Region,Diagnosis,Treatment,AdmissionDate,DischargeDate,LengthOfStay,TreatmentSuccess,InitialSeverity,Comorbidities,InsuranceType,FollowUpVisits\n",
        );
        let regions = ["North", "South", "East", "West", "Central"];
        let treatments = ["Surgery", "Medication", "Counseling"];
        for i in 0..60_u32 {
            let severity = i % 10 + 1;
            let success = if severity <= 5 { "True" } else { "False" };
            csv.push_str(&format!(
                "{},{},{},{},Asthma,{},2024-03-01,2024-03-04,3,{success},{severity},{},Private,1\n",
                100_000 + i,
                20 + i % 50,
                if i.is_multiple_of(2) { "M" } else { "F" },
                regions[(i % 5) as usize],
                treatments[(i % 3) as usize],
                i % 4,
            ));
        }
        let encounters = read_encounters(csv.as_bytes(), ValidationPolicy::Strict)
            .unwrap()
            .encounters;
        derive_all(&encounters)
    }

    #[test]
    fn test_train_model_summary_matches_evaluation() {
        let config = EvaluationConfig {
            forest: ForestParams {
                n_trees: 10,
                ..ForestParams::default()
            },
            ..EvaluationConfig::default()
        };
        let model = train_model(&records(), &config).unwrap();
        assert_eq!(model.summary.train_size, 48);
        assert_eq!(model.summary.test_size, 12);
        assert_eq!(model.summary.n_trees, 10);
        assert_eq!(model.summary.feature_importances.len(), 9);
        let total = model
            .summary
            .feature_importances
            .iter()
            .map(|f| f.importance)
            .sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(
            model.encoding.classes("Treatment").unwrap(),
            ["Counseling", "Medication", "Surgery"]
        );
    }

    #[test]
    fn test_summary_serializes_report() {
        let config = EvaluationConfig {
            forest: ForestParams {
                n_trees: 5,
                ..ForestParams::default()
            },
            ..EvaluationConfig::default()
        };
        let model = train_model(&records(), &config).unwrap();
        let json = serde_json::to_value(&model.summary).unwrap();
        assert_eq!(json["seed"], 42);
        assert_eq!(json["classification_report"]["total"], 12);
        assert_eq!(
            json["confusion_matrix"]["class_names"],
            serde_json::json!(["False", "True"])
        );
    }
}
