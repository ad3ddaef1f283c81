//! Delimited text ingestion.
//!
//! Turns comma- or pipe-delimited text into a [`Table`]. The first record is
//! the header. Every cell is kept as untyped text; the analyses coerce values
//! as they need to.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SidecarError};
use crate::models::{Table, Value};

/// Options controlling how delimited text is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field delimiter; sniffed from the header line when unset
    pub delimiter: Option<char>,
    /// Cell contents that are read as null rather than text
    pub null_tokens: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            null_tokens: ["NULL", "null", "NA", "NaN"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl IngestOptions {
    /// Builder method to force a delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Builder method to replace the null tokens.
    pub fn with_null_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    fn to_value(&self, cell: &str) -> Value {
        if self.null_tokens.iter().any(|token| token == cell) {
            Value::Null
        } else {
            Value::Text(cell.to_string())
        }
    }
}

/// Picks `,` when the first line contains a comma, `|` otherwise.
pub fn sniff_delimiter(text: &str) -> char {
    match text.lines().next() {
        Some(first) if first.contains(',') => ',',
        _ => '|',
    }
}

/// Parses delimited text into a table.
///
/// Surrounding whitespace is ignored and empty text gives an empty table.
/// Rows shorter than the header are padded with nulls.
///
/// # Errors
/// Returns `RaggedRow` for a row with more values than the header, a
/// configuration error for a non-ASCII delimiter, and a CSV error for
/// malformed quoting.
pub fn parse_table(text: &str, options: &IngestOptions) -> Result<Table> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(Table::default());
    }

    let delimiter = options.delimiter.unwrap_or_else(|| sniff_delimiter(text));
    if !delimiter.is_ascii() {
        return Err(SidecarError::configuration(format!(
            "Delimiter '{}' is not an ASCII character",
            delimiter
        )));
    }
    let delimiter = delimiter as u8;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| SidecarError::csv("Failed to read header row", e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let width = columns.len();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| SidecarError::csv(format!("Failed to read row {}", index + 1), e))?;
        if record.len() > width {
            return Err(SidecarError::RaggedRow {
                row: index + 1,
                expected: width,
                found: record.len(),
            });
        }

        let mut row: Vec<Value> = record.iter().map(|cell| options.to_value(cell)).collect();
        row.resize(width, Value::Null);
        rows.push(row);
    }

    tracing::debug!(
        "Parsed {} rows x {} columns (delimiter {:?})",
        rows.len(),
        width,
        delimiter as char
    );
    Table::new(columns, rows)
}

/// Reads a table from any reader, such as stdin.
pub fn read_table<R: Read>(mut reader: R, options: &IngestOptions) -> Result<Table> {
    let mut text = String::new();
    reader.read_to_string(&mut text).map_err(|e| SidecarError::Io {
        context: "Failed to read input".to_string(),
        source: e,
    })?;
    parse_table(&text, options)
}

/// Reads a table from a file.
pub fn load_table(path: &Path, options: &IngestOptions) -> Result<Table> {
    let text = std::fs::read_to_string(path).map_err(|e| SidecarError::io("read", path, e))?;
    let table = parse_table(&text, options)?;
    tracing::info!(
        "Loaded {} rows from {}",
        table.row_count(),
        path.display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a,b\n1,2"), ',');
        assert_eq!(sniff_delimiter("a|b\n1,2"), '|');
        assert_eq!(sniff_delimiter("single"), '|');
    }

    #[test]
    fn test_parse_comma_table() {
        let table = parse_table("Name,Age\nAlice,30\nBob,\nCara,200\n", &IngestOptions::default())
            .unwrap();

        assert_eq!(table.columns(), ["Name", "Age"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.rows()[1], vec![Value::from("Bob"), Value::from("")]);
    }

    #[test]
    fn test_parse_pipe_table_with_quotes() {
        let table = parse_table(
            "id|note\n1|\"has | pipe\"\n2|plain",
            &IngestOptions::default(),
        )
        .unwrap();

        assert_eq!(table.rows()[0][1], Value::from("has | pipe"));
        assert_eq!(table.rows()[1][1], Value::from("plain"));
    }

    #[test]
    fn test_explicit_delimiter() {
        let options = IngestOptions::default().with_delimiter(';');
        let table = parse_table("a;b\n1;2", &options).unwrap();
        assert_eq!(table.column_count(), 2);

        let options = IngestOptions::default().with_delimiter('§');
        assert!(matches!(
            parse_table("a§b", &options),
            Err(SidecarError::Configuration { .. })
        ));
    }

    #[test]
    fn test_empty_and_header_only_input() {
        let table = parse_table("  \n ", &IngestOptions::default()).unwrap();
        assert_eq!(table.column_count(), 0);
        assert!(table.is_empty());

        let table = parse_table("a,b,c\n", &IngestOptions::default()).unwrap();
        assert_eq!(table.column_count(), 3);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_short_rows_are_padded_long_rows_rejected() {
        let table = parse_table("a,b,c\n1,2\n", &IngestOptions::default()).unwrap();
        assert_eq!(
            table.rows()[0],
            vec![Value::from("1"), Value::from("2"), Value::Null]
        );

        let err = parse_table("a,b\n1,2\n3,4,5\n", &IngestOptions::default()).unwrap_err();
        match err {
            SidecarError::RaggedRow {
                row,
                expected,
                found,
            } => {
                assert_eq!((row, expected, found), (2, 2, 3));
            }
            other => panic!("expected ragged row, got {:?}", other),
        }
    }

    #[test]
    fn test_null_tokens() {
        let table = parse_table("a,b\nNULL,x\nNaN,\n", &IngestOptions::default()).unwrap();
        assert_eq!(table.rows()[0][0], Value::Null);
        assert_eq!(table.rows()[1][0], Value::Null);
        assert_eq!(table.rows()[1][1], Value::from(""));

        let options = IngestOptions::default().with_null_tokens(["-"]);
        let table = parse_table("a\n-\nNULL", &options).unwrap();
        assert_eq!(table.rows()[0][0], Value::Null);
        assert_eq!(table.rows()[1][0], Value::from("NULL"));
    }

    #[test]
    fn test_read_table_from_reader() {
        let table = read_table("x|y\n1|2".as_bytes(), &IngestOptions::default()).unwrap();
        assert_eq!(table.columns(), ["x", "y"]);
    }

    #[test]
    fn test_load_table_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "UserId,Email").unwrap();
        writeln!(file, "1,a@b.com").unwrap();

        let table = load_table(file.path(), &IngestOptions::default()).unwrap();
        assert_eq!(table.row_count(), 1);

        let missing = file.path().with_extension("absent");
        assert!(matches!(
            load_table(&missing, &IngestOptions::default()),
            Err(SidecarError::Io { .. })
        ));
    }
}
