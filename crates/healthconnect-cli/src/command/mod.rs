use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use healthconnect_analysis::derive::{DerivedEncounter, derive_all};
use healthconnect_data::{PatientEncounter, ValidationPolicy, load_encounters};
use healthconnect_training::{evaluation::EvaluationConfig, forest::ForestParams};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use self::{
    analyze::AnalyzeArg, generate::GenerateArg, inspect::InspectArg,
    prepare_views::PrepareViewsArg, report::ReportArg, train::TrainArg,
};

mod analyze;
mod generate;
mod inspect;
mod prepare_views;
mod report;
mod train;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Log debug messages (overridden by `RUST_LOG`)
    #[arg(short, long, global = true)]
    verbose: bool,
    /// What to run
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Generate a synthetic patient dataset
    Generate(#[clap(flatten)] GenerateArg),
    /// Load and validate a dataset and print its first rows
    Inspect(#[clap(flatten)] InspectArg),
    /// Write the aggregated dashboard views
    PrepareViews(#[clap(flatten)] PrepareViewsArg),
    /// Run the complete analysis: summary, plot tables, model and report
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Write the insights report
    Report(#[clap(flatten)] ReportArg),
    /// Train and evaluate the treatment success classifier
    Train(#[clap(flatten)] TrainArg),
}

/// Dataset to read and how to treat invalid rows
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InputArg {
    /// Patient encounter CSV file
    #[arg(long, default_value = "data/patient_data.csv")]
    input: PathBuf,
    /// What to do with invalid rows: `strict` aborts, `skip` drops them
    #[arg(long, default_value = "strict")]
    validation_policy: ValidationPolicy,
}

impl InputArg {
    /// Loads the dataset, logging every row dropped under the `skip` policy.
    fn load(&self) -> anyhow::Result<Vec<PatientEncounter>> {
        info!("Loading {}", self.input.display());
        let dataset = load_encounters(&self.input, self.validation_policy)
            .with_context(|| format!("Failed to load dataset: {}", self.input.display()))?;
        for error in &dataset.skipped {
            warn!("Skipped invalid record at {error}");
        }
        info!(
            "Loaded {} records ({} skipped)",
            dataset.encounters.len(),
            dataset.skipped.len()
        );
        Ok(dataset.encounters)
    }

    /// Loads the dataset and computes the derived fields.
    fn load_derived(&self) -> anyhow::Result<Vec<DerivedEncounter>> {
        let encounters = self.load()?;
        Ok(derive_all(&encounters))
    }
}

/// Classifier parameters
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ModelArg {
    /// Seed of the train/test split and of the forest
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Share of the records held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,
    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    trees: usize,
}

impl ModelArg {
    fn evaluation_config(&self) -> EvaluationConfig {
        EvaluationConfig {
            test_fraction: self.test_fraction,
            forest: ForestParams {
                n_trees: self.trees,
                seed: self.seed,
                ..ForestParams::default()
            },
        }
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    init_tracing(args.verbose)?;
    match args.mode {
        Mode::Generate(arg) => generate::run(&arg)?,
        Mode::Inspect(arg) => inspect::run(&arg)?,
        Mode::PrepareViews(arg) => prepare_views::run(&arg)?,
        Mode::Analyze(arg) => analyze::run(&arg)?,
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}
