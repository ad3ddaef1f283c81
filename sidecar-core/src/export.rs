//! Result export.
//!
//! Writes an [`AnalysisResult`] as CSV, tab-separated text or JSON.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SidecarError};
use crate::models::AnalysisResult;

/// Output format for analysis results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated, header first
    #[default]
    Csv,
    /// Tab-separated, header first
    Tsv,
    /// `{"headers": [...], "rows": [[...]]}`
    Json,
}

impl ExportFormat {
    /// Conventional file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Tsv => "tsv",
            ExportFormat::Json => "json",
        }
    }

    /// Guesses the format from a file extension; CSV when unknown.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => ExportFormat::Json,
            Some("tsv" | "txt") => ExportFormat::Tsv,
            _ => ExportFormat::Csv,
        }
    }
}

/// Writes a result to any writer.
pub fn write_result<W: Write>(
    result: &AnalysisResult,
    mut writer: W,
    format: ExportFormat,
) -> Result<()> {
    match format {
        ExportFormat::Csv => write_delimited(result, writer, b','),
        ExportFormat::Tsv => write_delimited(result, writer, b'\t'),
        ExportFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, result)
                .map_err(|e| SidecarError::serialization("Failed to write JSON result", e))?;
            writeln!(writer).map_err(|e| SidecarError::Io {
                context: "Failed to write JSON result".to_string(),
                source: e,
            })
        }
    }
}

fn write_delimited<W: Write>(result: &AnalysisResult, writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer
        .write_record(&result.headers)
        .map_err(|e| SidecarError::csv("Failed to write header row", e))?;
    for row in &result.rows {
        csv_writer
            .write_record(row.iter().map(ToString::to_string))
            .map_err(|e| SidecarError::csv("Failed to write result row", e))?;
    }
    csv_writer.flush().map_err(|e| SidecarError::Io {
        context: "Failed to flush result".to_string(),
        source: e,
    })
}

/// Writes a result to a file, replacing it if it exists.
pub fn export_to_path(result: &AnalysisResult, path: &Path, format: ExportFormat) -> Result<()> {
    let file = File::create(path).map_err(|e| SidecarError::io("create", path, e))?;
    let mut writer = BufWriter::new(file);
    write_result(result, &mut writer, format)?;
    writer
        .flush()
        .map_err(|e| SidecarError::io("write", path, e))?;

    tracing::info!(
        "Exported {} rows to {} as {}",
        result.len(),
        path.display(),
        format.extension()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Cell;

    fn sample() -> AnalysisResult {
        AnalysisResult::new(
            &["Field", "Total", "Median", "Note"],
            vec![
                vec![
                    Cell::from("Age"),
                    Cell::Count(3),
                    Cell::Number(115.0),
                    Cell::from("a, b"),
                ],
                vec![
                    Cell::from("Name"),
                    Cell::Count(3),
                    Cell::NotApplicable,
                    Cell::from(""),
                ],
            ],
        )
    }

    fn render(format: ExportFormat) -> String {
        let mut buffer = Vec::new();
        write_result(&sample(), &mut buffer, format).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_csv_export() {
        assert_eq!(
            render(ExportFormat::Csv),
            "Field,Total,Median,Note\nAge,3,115,\"a, b\"\nName,3,N/A,\n"
        );
    }

    #[test]
    fn test_tsv_export() {
        assert_eq!(
            render(ExportFormat::Tsv),
            "Field\tTotal\tMedian\tNote\nAge\t3\t115\ta, b\nName\t3\tN/A\t\n"
        );
    }

    #[test]
    fn test_json_export() {
        let json: serde_json::Value = serde_json::from_str(&render(ExportFormat::Json)).unwrap();

        assert_eq!(json["headers"][0], "Field");
        assert_eq!(json["rows"][0][1], 3);
        assert_eq!(json["rows"][0][2], 115.0);
        assert_eq!(json["rows"][1][2], "N/A");
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JSON")), ExportFormat::Json);
        assert_eq!(ExportFormat::from_path(Path::new("out.txt")), ExportFormat::Tsv);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Csv);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");

        export_to_path(&sample(), &path, ExportFormat::Csv).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Field,Total,Median,Note\n"));

        let bad = dir.path().join("missing").join("profile.csv");
        assert!(matches!(
            export_to_path(&sample(), &bad, ExportFormat::Csv),
            Err(SidecarError::Io { .. })
        ));
    }
}
