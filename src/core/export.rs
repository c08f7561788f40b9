// loginsight - core/export.rs
//
// Text, CSV and JSON rendering of extracted records.
// Core layer: writes to any Write implementor.

use crate::core::model::LogRecord;
use crate::util::error::ExportError;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// Output format for extracted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One `NAME=value` line per record.
    #[default]
    Text,
    /// Pretty-printed array of objects keyed by upper-case field names.
    Json,
    /// Header row followed by one row per record.
    Csv,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Text, OutputFormat::Json, OutputFormat::Csv];

    pub fn label(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown output format '{s}' (expected text, json or csv)"))
    }
}

/// Render `records` in `format`. Returns the number of records written.
pub fn export<W: Write>(
    records: &[LogRecord],
    format: OutputFormat,
    writer: W,
) -> Result<usize, ExportError> {
    match format {
        OutputFormat::Text => export_text(records, writer),
        OutputFormat::Json => export_json(records, writer),
        OutputFormat::Csv => export_csv(records, writer),
    }
}

/// One line per record; null fields print as `-`.
pub fn export_text<W: Write>(records: &[LogRecord], mut writer: W) -> Result<usize, ExportError> {
    for record in records {
        writeln!(writer, "{record}").map_err(|e| ExportError::Io { source: e })?;
    }
    writer.flush().map_err(|e| ExportError::Io { source: e })?;
    Ok(records.len())
}

/// CSV with a header taken from the first record's kind. Null fields are
/// written as empty cells. No records writes nothing.
pub fn export_csv<W: Write>(records: &[LogRecord], writer: W) -> Result<usize, ExportError> {
    let Some(first) = records.first() else {
        return Ok(0);
    };

    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(first.field_names())
        .map_err(|e| ExportError::Csv { source: e })?;

    for record in records {
        let row: Vec<String> = record
            .field_values()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        csv_writer
            .write_record(&row)
            .map_err(|e| ExportError::Csv { source: e })?;
    }

    csv_writer
        .flush()
        .map_err(|e| ExportError::Io { source: e })?;

    Ok(records.len())
}

/// JSON array of objects; null fields are JSON `null`.
pub fn export_json<W: Write>(records: &[LogRecord], mut writer: W) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)
        .map_err(|e| ExportError::Json { source: e })?;
    writeln!(writer).map_err(|e| ExportError::Io { source: e })?;
    Ok(records.len())
}
