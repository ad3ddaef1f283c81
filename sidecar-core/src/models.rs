//! Core data models for tabular analysis.
//!
//! A [`Table`] is what ingestion produces and every analysis consumes; an
//! [`AnalysisResult`] is what every analysis returns. Results are tables in
//! their own right and can be exported or re-displayed as-is.

use std::borrow::Cow;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::error::{Result, SidecarError};

/// Display format for native timestamps when they are rendered as text.
pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single raw cell value.
///
/// Ingestion produces `Text` and `Null`; callers building tables in memory
/// may also hand in pre-typed numbers and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value
    Null,
    /// Untyped string value, exactly as read
    Text(String),
    /// Native numeric value
    Number(f64),
    /// Native timestamp value
    DateTime(NaiveDateTime),
}

impl Value {
    /// Returns true for the null marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the string form of a present value, or `None` for null.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::Text(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::DateTime(dt) => Some(Cow::Owned(
                dt.format(DATETIME_DISPLAY_FORMAT).to_string(),
            )),
        }
    }

    /// Returns true for a present value whose trimmed string form is empty.
    ///
    /// Nulls are not blanks; the two are counted separately.
    pub fn is_blank(&self) -> bool {
        self.as_text().is_some_and(|s| s.trim().is_empty())
    }

    /// Returns true for null or blank values.
    pub fn is_missing(&self) -> bool {
        self.is_null() || self.is_blank()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Borrowed view of one column: its name and its values in row order.
#[derive(Debug, Clone)]
pub struct Column<'a> {
    pub name: &'a str,
    pub values: Vec<&'a Value>,
}

impl Column<'_> {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true when the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An in-memory table: ordered column names plus rows aligned to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates a table, rejecting rows that do not match the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let expected = columns.len();
        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(SidecarError::RaggedRow {
                row: index + 1,
                expected,
                found: row.len(),
            });
        }
        Ok(Self { columns, rows })
    }

    /// Creates a table from string cells; `None` becomes null.
    pub fn from_cells<S: AsRef<str>>(
        columns: &[S],
        rows: Vec<Vec<Option<&str>>>,
    ) -> Result<Self> {
        Self::new(
            columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows.into_iter()
                .map(|row| row.into_iter().map(Value::from).collect())
                .collect(),
        )
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns true when the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a borrowed view of the column at `index`.
    pub fn column(&self, index: usize) -> Option<Column<'_>> {
        let name = self.columns.get(index)?;
        Some(Column {
            name,
            values: self.rows.iter().map(|row| &row[index]).collect(),
        })
    }

    /// Iterates over all columns in header order.
    pub fn iter_columns(&self) -> impl Iterator<Item = Column<'_>> {
        (0..self.columns.len()).filter_map(|index| self.column(index))
    }
}

/// A typed output cell of an analysis result.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Free text (field names, reasons, timestamps)
    Text(String),
    /// Non-negative integer count
    Count(u64),
    /// Measured or derived number
    Number(f64),
    /// Statistic that does not apply; rendered as `N/A`
    NotApplicable,
}

impl Cell {
    /// Returns the numeric content of a count or number cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Count(c) => Some(*c as f64),
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text content of a text cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Count(c) => write!(f, "{}", c),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::NotApplicable => write!(f, "N/A"),
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Text(s) => serializer.serialize_str(s),
            Cell::Count(c) => serializer.serialize_u64(*c),
            Cell::Number(n) if n.is_finite() => serializer.serialize_f64(*n),
            Cell::Number(_) | Cell::NotApplicable => serializer.serialize_str("N/A"),
        }
    }
}

/// Output of one analysis: a header row plus data rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl AnalysisResult {
    /// Creates a result with a fixed header schema.
    pub fn new(headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        Self {
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows,
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true when there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, if present.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Looks up a cell by row index and header name.
    pub fn get(&self, row: usize, header: &str) -> Option<&Cell> {
        let column = self.column_index(header)?;
        self.rows.get(row)?.get(column)
    }

    /// Finds the first row whose first cell is the given text.
    ///
    /// Per-column analyses put the field name first, so this is the lookup
    /// by field.
    pub fn row_for(&self, field: &str) -> Option<&[Cell]> {
        self.rows
            .iter()
            .find(|row| row.first().and_then(Cell::as_str) == Some(field))
            .map(Vec::as_slice)
    }
}
