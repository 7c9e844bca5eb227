use std::{
    fs::{self, File},
    io::{self, BufWriter, StdoutLock, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use healthconnect_analysis::aggregate::{CrossTab, GroupedTable, PivotTable};

#[derive(Debug)]
pub enum Output {
    Stdout {
        writer: StdoutLock<'static>,
    },
    File {
        writer: BufWriter<File>,
        path: PathBuf,
    },
}

impl Output {
    pub fn save_json<T>(value: &T, output_path: Option<PathBuf>) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let mut output = Output::from_output_path(output_path)?;
        output.write_json(value)
    }

    pub fn save_text(text: &str, output_path: Option<PathBuf>) -> anyhow::Result<()> {
        let mut output = Output::from_output_path(output_path)?;
        output
            .write_all(text.as_bytes())
            .with_context(|| format!("Failed to write {}", output.display_path()))?;
        output
            .flush()
            .with_context(|| format!("Failed to flush output to {}", output.display_path()))
    }

    pub fn from_output_path(output_path: Option<PathBuf>) -> anyhow::Result<Self> {
        match output_path {
            Some(path) => Output::open(path),
            None => Ok(Output::stdout()),
        }
    }

    pub fn stdout() -> Self {
        Output::Stdout {
            writer: io::stdout().lock(),
        }
    }

    /// Creates the file, and its parent directories when missing.
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            create_dir(parent)?;
        }
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output::File {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn display_path(&self) -> String {
        match self {
            Output::Stdout { .. } => "stdout".to_string(),
            Output::File { path, .. } => path.display().to_string(),
        }
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        serde_json::to_writer_pretty(&mut *self, &value)
            .with_context(|| format!("Failed to write JSON to {}", self.display_path()))?;
        writeln!(&mut *self).with_context(|| {
            format!(
                "Failed to write newline after JSON to {}",
                self.display_path()
            )
        })?;
        self.flush()
            .with_context(|| format!("Failed to flush output to {}", self.display_path()))?;
        Ok(())
    }

    /// Writes `header` and `rows` as CSV.
    pub fn write_csv<I, R>(&mut self, header: &[&str], rows: I) -> anyhow::Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = String>,
    {
        let path = self.display_path();
        let mut writer = csv::Writer::from_writer(&mut *self);
        writer
            .write_record(header)
            .with_context(|| format!("Failed to write CSV header to {path}"))?;
        for row in rows {
            writer
                .write_record(row)
                .with_context(|| format!("Failed to write CSV row to {path}"))?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush output to {path}"))?;
        Ok(())
    }
}

impl io::Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::Stdout { writer } => writer.write(buf),
            Output::File { writer, .. } => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::Stdout { writer } => writer.flush(),
            Output::File { writer, .. } => writer.flush(),
        }
    }
}

pub fn create_dir(path: &Path) -> anyhow::Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))
}

/// CSV field of an optional value; undefined values are empty.
pub fn optional_field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Rows of a grouped table: key labels followed by the aggregated values.
pub fn grouped_table_rows(table: &GroupedTable) -> impl Iterator<Item = Vec<String>> + '_ {
    table.rows.iter().map(|row| {
        row.key
            .iter()
            .map(ToString::to_string)
            .chain(row.values.iter().map(|v| optional_field(*v)))
            .collect()
    })
}

pub fn save_grouped_table(table: &GroupedTable, path: PathBuf) -> anyhow::Result<()> {
    let mut output = Output::open(path)?;
    output.write_csv(&table.header(), grouped_table_rows(table))
}

/// Writes a cross tabulation with one row per row key and one column per
/// column key.
pub fn save_crosstab(table: &CrossTab, path: PathBuf) -> anyhow::Result<()> {
    let column_labels = table
        .column_keys
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let header = [table.row_dimension.name()]
        .into_iter()
        .chain(column_labels.iter().map(String::as_str))
        .collect::<Vec<_>>();
    let rows = table.row_keys.iter().zip(&table.counts).map(|(key, counts)| {
        [key.to_string()]
            .into_iter()
            .chain(counts.iter().map(ToString::to_string))
            .collect::<Vec<_>>()
    });
    let mut output = Output::open(path)?;
    output.write_csv(&header, rows)
}

/// Writes a pivot table; cells without observations are empty.
pub fn save_pivot(table: &PivotTable, path: PathBuf) -> anyhow::Result<()> {
    let column_labels = table
        .column_keys
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    let header = [table.row_dimension.name()]
        .into_iter()
        .chain(column_labels.iter().map(String::as_str))
        .collect::<Vec<_>>();
    let rows = table.row_keys.iter().zip(&table.cells).map(|(key, cells)| {
        [key.to_string()]
            .into_iter()
            .chain(cells.iter().map(|v| optional_field(*v)))
            .collect::<Vec<_>>()
    });
    let mut output = Output::open(path)?;
    output.write_csv(&header, rows)
}
