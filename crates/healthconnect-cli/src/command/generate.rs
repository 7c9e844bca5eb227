use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{Local, NaiveDate};
use healthconnect_analysis::{
    aggregate::{Aggregation, Statistic, group_by},
    derive::derive_all,
    dimension::{Dimension, Measure},
    summary::DatasetSummary,
};
use healthconnect_data::save_encounters;
use rand::SeedableRng as _;
use rand_pcg::Pcg64;
use tracing::info;

use crate::{
    generator::{MAX_PATIENTS, generate_encounters},
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of patients to generate
    #[arg(long, default_value_t = 1000)]
    num_patients: usize,
    /// Random seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Latest admission date (defaults to today)
    #[arg(long)]
    reference_date: Option<NaiveDate>,
    /// Output CSV file path
    #[arg(long, default_value = "data/patient_data.csv")]
    output: PathBuf,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let GenerateArg {
        num_patients,
        seed,
        reference_date,
        output,
    } = arg;
    anyhow::ensure!(
        *num_patients <= MAX_PATIENTS,
        "Cannot generate more than {MAX_PATIENTS} patients with distinct six-digit ids"
    );
    let reference_date = reference_date.unwrap_or_else(|| Local::now().date_naive());

    info!("Generating {num_patients} patients (seed {seed}, reference date {reference_date})");
    let mut rng = Pcg64::seed_from_u64(*seed);
    let encounters = generate_encounters(*num_patients, reference_date, &mut rng);

    if let Some(parent) = output.parent() {
        util::create_dir(parent)?;
    }
    save_encounters(output, &encounters)
        .with_context(|| format!("Failed to write dataset: {}", output.display()))?;
    info!(
        "Generated {} patient records and saved to {}",
        encounters.len(),
        output.display()
    );

    let records = derive_all(&encounters);
    let Some(summary) = DatasetSummary::new(&records) else {
        return Ok(());
    };
    println!("Dataset Overview:");
    println!("Total number of records: {}", summary.total_records);
    println!("Unique patients: {}", summary.unique_patients);
    println!(
        "Date range: {} to {}",
        summary.first_admission, summary.last_admission
    );
    println!();
    println!("Success rates by treatment:");
    let rates = group_by(
        &records,
        &[Dimension::Treatment],
        &[Aggregation::new(
            "SuccessRate",
            Measure::TreatmentSuccess,
            Statistic::Mean,
        )],
    );
    for row in &rates.rows {
        if let Some(rate) = row.values[0] {
            println!("  {:<20} {rate:.3}", row.key[0]);
        }
    }
    Ok(())
}
