use std::io;

use anyhow::Context as _;
use healthconnect_data::{COLUMNS, write_encounters};

use super::InputArg;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    #[clap(flatten)]
    input: InputArg,
    /// Number of rows to print
    #[arg(long, default_value_t = 5)]
    rows: usize,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let InspectArg { input, rows } = arg;
    let encounters = input.load()?;

    println!("Dataset loaded successfully!");
    println!("Shape: ({}, {})", encounters.len(), COLUMNS.len());
    println!();
    println!("Columns: {}", COLUMNS.join(", "));
    println!();
    println!("First few rows:");
    let head = &encounters[..encounters.len().min(*rows)];
    write_encounters(io::stdout().lock(), head).context("Failed to write rows to stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser as _;
    use healthconnect_data::ValidationPolicy;

    use crate::command::{CommandArgs, Mode};

    #[test]
    fn test_arguments() {
        let args = CommandArgs::try_parse_from([
            "healthconnect",
            "-v",
            "inspect",
            "--validation-policy",
            "skip",
            "--rows",
            "3",
        ])
        .unwrap();
        assert!(args.verbose);
        let Mode::Inspect(arg) = args.mode else {
            panic!("expected inspect");
        };
        assert_eq!(arg.input.validation_policy, ValidationPolicy::Skip);
        assert_eq!(arg.rows, 3);
        assert_eq!(arg.input.input.to_str(), Some("data/patient_data.csv"));
    }
}
