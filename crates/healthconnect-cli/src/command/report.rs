use std::path::PathBuf;

use chrono::Local;
use healthconnect_analysis::insights::Insights;
use tracing::info;

use super::InputArg;
use crate::{markdown::InsightsReport, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    #[clap(flatten)]
    input: InputArg,
    /// Output Markdown file path
    #[arg(long, default_value = "reports/insights_report.md")]
    output: PathBuf,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let ReportArg { input, output } = arg;
    let records = input.load_derived()?;
    let insights = Insights::new(&records)
        .ok_or_else(|| anyhow::anyhow!("Cannot compute insights of an empty dataset"))?;

    let report = InsightsReport {
        generated_at: Local::now().naive_local(),
        insights: &insights,
    };
    Output::save_text(&report.to_string(), Some(output.clone()))?;
    info!("Report generated and saved to: {}", output.display());
    Ok(())
}
