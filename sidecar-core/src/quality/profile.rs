//! Column profiling.
//!
//! One summary row per column: presence counts plus either a numeric
//! distribution or a text-length distribution.

use chrono::NaiveDateTime;

use crate::models::{AnalysisResult, Cell, Column, Table};

use super::classify::{classify_column, parse_number};
use super::completeness::ColumnCounts;
use super::config::AnalysisConfig;
use super::stats::{median, sample_std_dev};

/// Output header of the profiler.
pub const PROFILE_HEADERS: &[&str] = &[
    "Field",
    "Total",
    "Unique",
    "Completeness (%)",
    "Nulls",
    "Blanks",
    "Min",
    "Max",
    "Median",
    "Std",
    "Analysis Date",
];

/// Profiles every column of a table.
///
/// Non-numeric entries of a numeric column and blank entries of a text
/// column are left out of the distribution statistics rather than failing
/// the column. Columns with nothing measurable report `N/A`.
pub fn profile_analysis(
    table: &Table,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> AnalysisResult {
    let timestamp = config.format_timestamp(now);

    let rows = table
        .iter_columns()
        .map(|column| {
            let counts = ColumnCounts::from_column(&column);
            let class = classify_column(&column);
            let [min, max, mid, std] = if class.has_numeric {
                numeric_summary(&column)
            } else {
                length_summary(&column)
            };

            tracing::trace!(
                "Profiled column '{}': {} nulls, {} blanks, {} unique",
                column.name,
                counts.nulls,
                counts.blanks,
                counts.unique
            );

            vec![
                Cell::from(column.name),
                Cell::Count(counts.total),
                Cell::Count(counts.unique),
                Cell::Number(counts.completeness()),
                Cell::Count(counts.nulls),
                Cell::Count(counts.blanks),
                min,
                max,
                mid,
                std,
                Cell::Text(timestamp.clone()),
            ]
        })
        .collect();

    AnalysisResult::new(PROFILE_HEADERS, rows)
}

fn numeric_summary(column: &Column<'_>) -> [Cell; 4] {
    let values: Vec<f64> = column.values.iter().filter_map(|v| parse_number(v)).collect();
    if values.is_empty() {
        return not_applicable();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    [
        Cell::Number(min),
        Cell::Number(max),
        median(&values).map_or(Cell::NotApplicable, Cell::Number),
        sample_std_dev(&values).map_or(Cell::NotApplicable, Cell::Number),
    ]
}

fn length_summary(column: &Column<'_>) -> [Cell; 4] {
    let lengths: Vec<u64> = column
        .values
        .iter()
        .filter_map(|v| v.as_text())
        .map(|text| text.trim().chars().count() as u64)
        .filter(|&len| len > 0)
        .collect();

    let (Some(&min), Some(&max)) = (lengths.iter().min(), lengths.iter().max()) else {
        return not_applicable();
    };
    let as_float: Vec<f64> = lengths.iter().map(|&len| len as f64).collect();

    [
        Cell::Count(min),
        Cell::Count(max),
        median(&as_float).map_or(Cell::NotApplicable, Cell::Number),
        Cell::NotApplicable,
    ]
}

fn not_applicable() -> [Cell; 4] {
    [
        Cell::NotApplicable,
        Cell::NotApplicable,
        Cell::NotApplicable,
        Cell::NotApplicable,
    ]
}
