//! Column classification.
//!
//! Every analysis decides per column whether to treat it as numeric,
//! temporal, email, identifier or free text. The decision is made once per
//! column per analysis by [`classify_column`]; the name vocabularies it
//! matches against are the constants in this module.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::models::{Column, Value};

/// Column-name substrings that mark a column as holding non-negative
/// quantities.
pub const NON_NEGATIVE_HINTS: &[&str] = &[
    "amount", "total", "price", "cost", "balance", "qty", "quantity", "count", "number", "age",
];

/// Column-name substrings that mark a column as holding dates.
pub const DATE_HINTS: &[&str] = &["date"];

/// Column-name substrings that mark a column as holding times.
pub const TIME_HINTS: &[&str] = &["time"];

/// Column-name substrings that mark a column as holding email addresses.
pub const EMAIL_HINTS: &[&str] = &["email"];

/// Prefix/suffix that marks a column as an identifier.
pub const IDENTIFIER_AFFIX: &str = "id";

/// Email shape: local part, `@`, domain, `.`, suffix; no whitespace or
/// extra `@` anywhere.
pub const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// Date-time layouts tried in order when parsing text.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d-%b-%Y %H:%M:%S",
];

/// Date-only layouts tried in order when parsing text.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%d %b %Y", "%b %d, %Y", "%d %B %Y",
    "%B %d, %Y",
];

/// Best-effort kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Values mostly parse as numbers
    Numeric,
    /// Name mentions a date or time, or values are native timestamps
    Temporal,
    /// Name mentions email
    Email,
    /// Name starts or ends with "id"
    Identifier,
    /// Anything else
    Text,
}

impl ColumnKind {
    /// Lower-case label used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Temporal => "temporal",
            ColumnKind::Email => "email",
            ColumnKind::Identifier => "identifier",
            ColumnKind::Text => "text",
        }
    }
}

/// Flags derived from the column name alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameHints {
    pub date: bool,
    pub time: bool,
    pub email: bool,
    pub identifier: bool,
    pub non_negative: bool,
}

impl NameHints {
    /// Derives hints from a column name, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        let contains_any = |hints: &[&str]| hints.iter().any(|h| lower.contains(h));

        Self {
            date: contains_any(DATE_HINTS),
            time: contains_any(TIME_HINTS),
            email: contains_any(EMAIL_HINTS),
            identifier: lower.starts_with(IDENTIFIER_AFFIX) || lower.ends_with(IDENTIFIER_AFFIX),
            non_negative: contains_any(NON_NEGATIVE_HINTS),
        }
    }
}

/// Classification of a single column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnClass {
    pub kind: ColumnKind,
    pub hints: NameHints,
    /// Present values are natively temporal
    pub native_temporal: bool,
    /// At least one value coerces to a number
    pub has_numeric: bool,
    /// At least half of all rows, blanks and nulls included, coerce to a
    /// number (and at least one does)
    pub mostly_numeric: bool,
}

/// Classifies a column from its name and values.
///
/// A column is numeric when at least half of its present, non-blank values
/// coerce to numbers. Otherwise the name hints decide, in the order
/// temporal, email, identifier, with text as the fallback.
///
/// The numeric evidence is also exposed on its own: the profiler switches
/// to numeric statistics on `has_numeric`, while default validity uses
/// `mostly_numeric`, whose denominator is the full row count.
pub fn classify_column(column: &Column<'_>) -> ColumnClass {
    let hints = NameHints::from_name(column.name);

    let present: Vec<&Value> = column
        .values
        .iter()
        .copied()
        .filter(|v| !v.is_missing())
        .collect();
    let numeric = present.iter().filter(|v| parse_number(v).is_some()).count();
    let native_temporal =
        !present.is_empty() && present.iter().all(|v| matches!(v, Value::DateTime(_)));

    let kind = if numeric > 0 && numeric * 2 >= present.len() {
        ColumnKind::Numeric
    } else if hints.date || hints.time || native_temporal {
        ColumnKind::Temporal
    } else if hints.email {
        ColumnKind::Email
    } else if hints.identifier {
        ColumnKind::Identifier
    } else {
        ColumnKind::Text
    };

    tracing::trace!("Column '{}' classified as {}", column.name, kind.name());

    ColumnClass {
        kind,
        hints,
        native_temporal,
        has_numeric: numeric > 0,
        mostly_numeric: numeric >= (column.values.len() / 2).max(1),
    }
}

/// Coerces a value to a finite number.
///
/// Text is trimmed and thousands separators are stripped first. Non-finite
/// results such as "NaN" or "inf" are rejected so they cannot poison the
/// statistics.
pub fn parse_number(value: &Value) -> Option<f64> {
    let numeric = match value {
        Value::Number(n) => Some(*n),
        Value::Text(s) => {
            let cleaned = s.trim().replace(',', "");
            if cleaned.is_empty() {
                None
            } else {
                cleaned.parse::<f64>().ok()
            }
        }
        Value::Null | Value::DateTime(_) => None,
    };
    numeric.filter(|v| v.is_finite())
}

/// Coerces a value to a timestamp.
///
/// RFC 3339 input with an offset is normalised to UTC. Date-only input maps
/// to midnight. Numbers are not treated as epochs.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::DateTime(dt) => Some(*dt),
        Value::Text(s) => parse_datetime_str(s.trim()),
        Value::Null | Value::Number(_) => None,
    }
}

fn parse_datetime_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Returns true when the whole string has the email shape.
pub fn is_email(s: &str) -> bool {
    EMAIL_RE.is_match(s)
}
