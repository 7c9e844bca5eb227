use std::path::PathBuf;

use healthconnect_analysis::views::DashboardView;
use tracing::info;

use super::InputArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PrepareViewsArg {
    #[clap(flatten)]
    input: InputArg,
    /// Directory to write the view CSV files into
    #[arg(long, default_value = "visualizations/tableau_data")]
    output_dir: PathBuf,
}

pub(crate) fn run(arg: &PrepareViewsArg) -> anyhow::Result<()> {
    let PrepareViewsArg { input, output_dir } = arg;
    let records = input.load_derived()?;
    util::create_dir(output_dir)?;

    for view in DashboardView::ALL {
        let table = view.build(&records);
        let path = output_dir.join(format!("{}.csv", view.name()));
        util::save_grouped_table(&table, path.clone())?;
        info!(
            "Generated {} dataset with {} records, saved to {}",
            view.name(),
            table.rows.len(),
            path.display()
        );
    }
    Ok(())
}
