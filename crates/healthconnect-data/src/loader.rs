//! Reading and writing encounter CSV files
//!
//! Structural problems (unreadable file, missing columns, an empty dataset)
//! are always fatal. Row-level problems are handled according to the
//! [`ValidationPolicy`] chosen by the caller.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    path::{Path, PathBuf},
};

use crate::{
    encounter::PatientEncounter,
    row::{COLUMNS, EncounterRow, FieldError, ValidationError},
};

/// What to do with a row that fails validation
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, derive_more::FromStr)]
pub enum ValidationPolicy {
    /// Abort the whole load on the first invalid row
    #[default]
    Strict,
    /// Drop invalid rows and report them in [`LoadedDataset::skipped`]
    Skip,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LoadError {
    #[display("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[display("failed to read CSV data: {source}")]
    Csv { source: csv::Error },
    #[display("missing required column '{column}'")]
    MissingColumn { column: &'static str },
    #[display("invalid record at {_0}")]
    InvalidRecord(ValidationError),
    #[display("dataset contains no valid records")]
    Empty,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum WriteError {
    #[display("failed to create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[display("failed to write CSV data: {source}")]
    Csv { source: csv::Error },
}

/// Records that passed validation, plus the rows that were dropped
#[derive(Debug, Clone, Default)]
pub struct LoadedDataset {
    pub encounters: Vec<PatientEncounter>,
    pub skipped: Vec<ValidationError>,
}

/// Loads and validates an encounter file.
pub fn load_encounters<P>(path: P, policy: ValidationPolicy) -> Result<LoadedDataset, LoadError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_owned(),
        source,
    })?;
    read_encounters(BufReader::new(file), policy)
}

/// Reads and validates encounters from any CSV source with a header row.
pub fn read_encounters<R>(reader: R, policy: ValidationPolicy) -> Result<LoadedDataset, LoadError>
where
    R: io::Read,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Csv { source })?
        .clone();
    if let Some(&column) = COLUMNS
        .iter()
        .find(|&&column| !headers.iter().any(|h| h == column))
    {
        return Err(LoadError::MissingColumn { column });
    }

    let mut dataset = LoadedDataset::default();
    for result in reader.records() {
        let outcome = match result {
            Ok(record) => {
                let line = record.position().map_or(0, csv::Position::line);
                record
                    .deserialize::<EncounterRow>(Some(&headers))
                    .map_err(|err| malformed(line, &err))
                    .and_then(|row| row.validate(line))
            }
            Err(err) if matches!(err.kind(), csv::ErrorKind::UnequalLengths { .. }) => {
                let line = err.position().map_or(0, csv::Position::line);
                Err(malformed(line, &err))
            }
            Err(source) => return Err(LoadError::Csv { source }),
        };

        match (outcome, policy) {
            (Ok(encounter), _) => dataset.encounters.push(encounter),
            (Err(err), ValidationPolicy::Strict) => return Err(LoadError::InvalidRecord(err)),
            (Err(err), ValidationPolicy::Skip) => dataset.skipped.push(err),
        }
    }

    if dataset.encounters.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(dataset)
}

fn malformed(line: u64, err: &dyn std::fmt::Display) -> ValidationError {
    ValidationError {
        line,
        field: "*",
        reason: FieldError::Malformed {
            message: err.to_string(),
        },
    }
}

/// Writes encounters as CSV with the standard header.
///
/// The header is written even when `encounters` is empty.
pub fn write_encounters<W>(writer: W, encounters: &[PatientEncounter]) -> Result<(), WriteError>
where
    W: io::Write,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer
        .write_record(COLUMNS)
        .map_err(|source| WriteError::Csv { source })?;
    for encounter in encounters {
        writer
            .serialize(EncounterRow::from(encounter))
            .map_err(|source| WriteError::Csv { source })?;
    }
    writer
        .flush()
        .map_err(|source| WriteError::Csv { source: source.into() })
}

/// Writes encounters to `path`, replacing any existing file.
pub fn save_encounters<P>(path: P, encounters: &[PatientEncounter]) -> Result<(), WriteError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| WriteError::Create {
        path: path.to_owned(),
        source,
    })?;
    write_encounters(BufWriter::new(file), encounters)
}
