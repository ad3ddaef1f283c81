//! Per-column quality scoring.
//!
//! The quality score is the unweighted mean of completeness and validity.
//! Uniqueness is reported alongside it but does not feed into it.

use chrono::NaiveDateTime;

use crate::models::{AnalysisResult, Cell, Column, Table};

use super::classify::{ColumnClass, classify_column, is_email, parse_datetime, parse_number};
use super::completeness::ColumnCounts;
use super::config::AnalysisConfig;
use super::rules::{QualityRules, is_valid_match};
use super::stats::{percent, round2};

/// Output header of the quality scorer.
pub const QUALITY_HEADERS: &[&str] = &[
    "Field",
    "Total",
    "Completeness (%)",
    "Uniqueness (%)",
    "Validity (%)",
    "Quality Score (%)",
    "Analysis Date",
];

/// Quality figures for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnScore {
    pub field: String,
    pub total: u64,
    pub completeness: f64,
    pub uniqueness: f64,
    pub validity: f64,
    pub quality_score: f64,
}

impl ColumnScore {
    fn to_cells(&self, timestamp: &str) -> Vec<Cell> {
        vec![
            Cell::Text(self.field.clone()),
            Cell::Count(self.total),
            Cell::Number(self.completeness),
            Cell::Number(self.uniqueness),
            Cell::Number(self.validity),
            Cell::Number(self.quality_score),
            Cell::from(timestamp),
        ]
    }
}

/// Scores every column of a table.
///
/// Columns with a rule in `rules` are validated against it; all others use
/// the default validity check for their classification.
pub fn quality_analysis(
    table: &Table,
    rules: Option<&QualityRules>,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> AnalysisResult {
    let timestamp = config.format_timestamp(now);
    let rows = score_columns(table, rules)
        .iter()
        .map(|score| score.to_cells(&timestamp))
        .collect();

    AnalysisResult::new(QUALITY_HEADERS, rows)
}

/// Computes the quality figures for every column, in column order.
pub fn score_columns(table: &Table, rules: Option<&QualityRules>) -> Vec<ColumnScore> {
    table
        .iter_columns()
        .map(|column| score_column(&column, rules))
        .collect()
}

fn score_column(column: &Column<'_>, rules: Option<&QualityRules>) -> ColumnScore {
    let counts = ColumnCounts::from_column(column);
    let valid = match rules.and_then(|r| r.get(column.name)) {
        Some(rule) => column
            .values
            .iter()
            .filter_map(|v| v.as_text())
            .filter(|text| is_valid_match(rule, text))
            .count() as u64,
        None => default_valid_count(column, &classify_column(column)),
    };

    let completeness = counts.completeness();
    let validity = percent(valid, counts.total);
    let quality_score = round2((completeness + validity) / 2.0);

    tracing::trace!(
        "Scored column '{}': {} of {} valid",
        column.name,
        valid,
        counts.total
    );

    ColumnScore {
        field: column.name.to_string(),
        total: counts.total,
        completeness,
        uniqueness: counts.uniqueness(),
        validity,
        quality_score,
    }
}

/// Counts valid values when the caller supplied no rule for the column.
fn default_valid_count(column: &Column<'_>, class: &ColumnClass) -> u64 {
    let values = column.values.iter();
    let count = if class.mostly_numeric {
        values.filter(|v| parse_number(v).is_some()).count()
    } else if class.hints.date || class.native_temporal {
        values.filter(|v| parse_datetime(v).is_some()).count()
    } else if class.hints.email {
        values
            .filter_map(|v| v.as_text())
            .filter(|text| is_email(text))
            .count()
    } else {
        values
            .filter_map(|v| v.as_text())
            .filter(|text| !text.trim().is_empty())
            .count()
    };
    count as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn single(name: &str, values: &[Option<&str>]) -> Table {
        Table::from_cells(&[name], values.iter().map(|v| vec![*v]).collect()).unwrap()
    }

    fn score(table: &Table, rules: Option<&QualityRules>) -> ColumnScore {
        score_columns(table, rules).remove(0)
    }

    #[test]
    fn test_email_validity() {
        let table = single("Email", &[Some("a@b.com"), Some("not-an-email"), Some("")]);
        let score = score(&table, None);

        assert_eq!(score.total, 3);
        assert_eq!(score.validity, 33.33);
        assert_eq!(score.completeness, 66.67);
        assert_eq!(score.quality_score, 50.0);
    }

    #[test]
    fn test_numeric_validity() {
        let table = single("Age", &[Some("30"), Some("abc"), Some("1,200"), None]);
        let score = score(&table, None);

        assert_eq!(score.validity, 50.0);
        assert_eq!(score.completeness, 75.0);
        assert_eq!(score.quality_score, 62.5);
    }

    #[test]
    fn test_sparse_numbers_fall_back_to_non_blank() {
        // One number in four rows is not enough to validate as numeric
        let table = single("val", &[Some("1"), Some(""), Some(""), Some("abc")]);
        assert_eq!(score(&table, None).validity, 50.0);

        let table = single("val", &[Some("1"), Some("2"), Some(""), Some("abc")]);
        assert_eq!(score(&table, None).validity, 50.0);

        let table = single("val", &[Some("1"), Some("2"), Some("3"), Some("abc")]);
        assert_eq!(score(&table, None).validity, 75.0);
    }

    #[test]
    fn test_date_validity() {
        let table = single(
            "created_date",
            &[Some("2024-01-01"), Some("yesterday"), Some("03/15/2023"), Some("")],
        );
        let score = score(&table, None);

        assert_eq!(score.validity, 50.0);
    }

    #[test]
    fn test_text_validity_excludes_nulls_and_blanks() {
        let table = single("notes", &[Some("ok"), Some(" "), None, Some("fine")]);
        let score = score(&table, None);

        assert_eq!(score.validity, 50.0);
        assert_eq!(score.uniqueness, 75.0);
    }

    #[test]
    fn test_rule_overrides_default() {
        let table = single("Code", &[Some("AB-1"), Some("AB-22x"), Some("X-1"), None]);
        let mut rules = QualityRules::new();
        rules.assign("Code", r"AB-\d+").unwrap();

        let score = score(&table, Some(&rules));
        // Prefix match: "AB-22x" counts as valid
        assert_eq!(score.validity, 50.0);

        // Rules for other fields do not apply
        let mut other = QualityRules::new();
        other.assign("Name", "^$").unwrap();
        assert_eq!(score_columns(&table, Some(&other))[0].validity, 75.0);
    }

    #[test]
    fn test_quality_score_ignores_uniqueness() {
        let table = single("status", &[Some("a"), Some("a"), Some("a"), Some("a")]);
        let score = score(&table, None);

        assert_eq!(score.uniqueness, 25.0);
        assert_eq!(score.quality_score, 100.0);
    }

    #[test]
    fn test_quality_result_layout() {
        let table = single("Email", &[Some("a@b.com")]);
        let result = quality_analysis(&table, None, &AnalysisConfig::default(), now());

        assert_eq!(result.headers, QUALITY_HEADERS);
        assert_eq!(
            result.rows[0],
            vec![
                Cell::from("Email"),
                Cell::Count(1),
                Cell::Number(100.0),
                Cell::Number(100.0),
                Cell::Number(100.0),
                Cell::Number(100.0),
                Cell::from("2024-06-01 12:00:00"),
            ]
        );
    }

    #[test]
    fn test_empty_table_scores_zero() {
        let table = Table::from_cells(&["Email", "Age"], vec![]).unwrap();
        for score in score_columns(&table, None) {
            assert_eq!(score.total, 0);
            assert_eq!(score.completeness, 0.0);
            assert_eq!(score.uniqueness, 0.0);
            assert_eq!(score.validity, 0.0);
            assert_eq!(score.quality_score, 0.0);
        }
    }
}
