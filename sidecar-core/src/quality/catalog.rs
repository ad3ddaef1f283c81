//! Data catalog generation.
//!
//! Derives a friendly name, a templated business description, a coarse data
//! type, nullability and an example value for every column.

use chrono::NaiveDateTime;

use crate::models::{AnalysisResult, Cell, Column, Table};

use super::classify::{ColumnKind, classify_column};
use super::config::AnalysisConfig;

/// Output header of the catalog.
pub const CATALOG_HEADERS: &[&str] = &[
    "Field",
    "Friendly Name",
    "Description",
    "Data Type",
    "Nullable",
    "Example",
    "Analysis Date",
];

const MONETARY_TOKENS: &[&str] = &["amount", "total", "price", "cost", "balance"];
const QUANTITY_TOKENS: &[&str] = &["qty", "quantity", "count", "number"];
const PHONE_TOKENS: &[&str] = &["phone", "tel", "telephone"];

/// Builds the catalog for every column of a table.
pub fn catalog_analysis(
    table: &Table,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> AnalysisResult {
    let timestamp = config.format_timestamp(now);
    let rows = table
        .iter_columns()
        .map(|column| catalog_row(&column, &timestamp))
        .collect();

    AnalysisResult::new(CATALOG_HEADERS, rows)
}

fn catalog_row(column: &Column<'_>, timestamp: &str) -> Vec<Cell> {
    let description = business_description(column.name);
    let data_type = if classify_column(column).kind == ColumnKind::Numeric {
        "Numeric"
    } else if description.contains("date") {
        "Date"
    } else {
        "Text"
    };
    let nullable = if column.values.iter().any(|v| v.is_missing()) {
        "Yes"
    } else {
        "No"
    };
    let example = column
        .values
        .iter()
        .find(|v| !v.is_missing())
        .and_then(|v| v.as_text())
        .map(|text| text.into_owned())
        .unwrap_or_default();

    vec![
        Cell::from(column.name),
        Cell::Text(friendly_name(column.name)),
        Cell::Text(description),
        Cell::from(data_type),
        Cell::from(nullable),
        Cell::Text(example),
        Cell::from(timestamp),
    ]
}

/// Turns a column name into a title-cased label.
///
/// Underscores become spaces and a space is inserted wherever a lower-case
/// letter or digit is followed by an upper-case letter.
pub fn friendly_name(field: &str) -> String {
    title_case(&split_words(field))
}

fn split_words(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    let mut previous: Option<char> = None;
    for ch in field.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_uppercase()
            && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
        {
            out.push(' ');
        }
        out.push(ch);
        previous = Some(ch);
    }
    out
}

/// Upper-cases the first letter of every run of letters and lower-cases the
/// rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}

/// Generates a one-sentence business description from a column name.
///
/// The name is lower-cased, anything outside `[a-z0-9_]` becomes a space and
/// the result is split into tokens. The first matching template wins.
pub fn business_description(field: &str) -> String {
    let cleaned: String = field
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let tokens: Vec<&str> = cleaned
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .collect();

    let Some((last, leading)) = tokens.split_last() else {
        return "Field describing the record.".to_string();
    };
    let has = |candidates: &[&str]| tokens.iter().any(|t| candidates.contains(t));
    let noun = tokens.join(" ").replace(" id", "").trim().to_string();

    if *last == "id" {
        let entity = if leading.is_empty() {
            "record".to_string()
        } else {
            leading.join(" ")
        };
        format!("Unique identifier for each {}.", entity)
    } else if has(&["email"]) {
        format!("Email address of the {}.", noun)
    } else if has(PHONE_TOKENS) {
        format!("Telephone number associated with the {}.", noun)
    } else if has(&["date", "timestamp"]) {
        format!("Date or time related to the {}.", noun)
    } else if has(MONETARY_TOKENS) {
        format!("Monetary amount representing the {}.", noun)
    } else if has(QUANTITY_TOKENS) {
        format!("Number of {}.", noun)
    } else if has(&["status"]) {
        format!("Current status of the {}.", noun)
    } else if has(&["flag"]) {
        format!("Indicator flag for the {}.", noun)
    } else if has(&["type", "category"]) {
        format!("Classification type of the {}.", noun)
    } else if has(&["code"]) {
        format!("Standard code representing the {}.", noun)
    } else {
        format!("{} for each record.", friendly_name(field))
    }
}
