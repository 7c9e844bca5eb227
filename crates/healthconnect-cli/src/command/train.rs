use std::path::PathBuf;

use super::{InputArg, ModelArg};
use crate::model::{save_model_artifacts, train_model};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    #[clap(flatten)]
    input: InputArg,
    #[clap(flatten)]
    model: ModelArg,
    /// Directory for the model summary, encoding table and confusion matrix
    #[arg(long, default_value = "models")]
    output_dir: PathBuf,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let TrainArg {
        input,
        model,
        output_dir,
    } = arg;
    let records = input.load_derived()?;
    let trained = train_model(&records, &model.evaluation_config())?;

    println!("Model Performance:");
    println!("{}", trained.evaluation.report);
    println!("Feature importance:");
    for (feature, importance) in &trained.evaluation.importances {
        println!("  {feature:<16} {importance:.3}");
    }

    save_model_artifacts(&trained, output_dir)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use healthconnect_data::ValidationPolicy;
    use healthconnect_training::evaluation::EvaluationConfig;

    use crate::command::{CommandArgs, Mode};

    #[test]
    fn test_defaults_match_evaluation_defaults() {
        let args = CommandArgs::try_parse_from(["healthconnect", "train"]).unwrap();
        let Mode::Train(arg) = args.mode else {
            panic!("expected train");
        };
        assert_eq!(arg.model.evaluation_config(), EvaluationConfig::default());
        assert_eq!(arg.input.validation_policy, ValidationPolicy::Strict);
        assert!(!args.verbose);
    }

    #[test]
    fn test_model_arguments() {
        let args = CommandArgs::try_parse_from([
            "healthconnect",
            "train",
            "--seed",
            "7",
            "--trees",
            "25",
            "--test-fraction",
            "0.3",
        ])
        .unwrap();
        let Mode::Train(arg) = args.mode else {
            panic!("expected train");
        };
        let config = arg.model.evaluation_config();
        assert_eq!(config.forest.seed, 7);
        assert_eq!(config.forest.n_trees, 25);
        assert!((config.test_fraction - 0.3).abs() < f64::EPSILON);
    }
}
