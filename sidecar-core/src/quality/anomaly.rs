//! Row-level anomaly detection.
//!
//! Each column is checked against a fixed sequence of rule categories. A
//! finding names the 1-based row, the field, the offending value as text,
//! a reason and a remediation hint. Findings are meant for human review;
//! nothing is corrected.
//!
//! Output order is deterministic: by column in table order, then by
//! category in [`AnomalyCategory::ALL`] order, then by row.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};

use crate::models::{AnalysisResult, Cell, Column, Table, Value};

use super::classify::{
    ColumnClass, ColumnKind, classify_column, is_email, parse_datetime, parse_number,
};
use super::config::AnalysisConfig;
use super::stats::{IqrFences, quantile_sorted, sorted};

/// Output header of the anomaly detector.
pub const ANOMALY_HEADERS: &[&str] = &["Row #", "Field", "Value", "Reason", "Recommendation"];

/// Marker appended to display values that were cut short.
pub const TRUNCATION_MARKER: &str = "…";

/// Rule categories, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnomalyCategory {
    /// Null or blank cell
    Missing,
    /// Number outside the Tukey fences
    NumericOutlier,
    /// Negative number in a column expected to be non-negative
    UnexpectedNegative,
    /// Unparseable, far-future or pre-cutoff date
    DateTime,
    /// Value not shaped like an email address
    InvalidEmail,
    /// Identifier value occurring more than once
    DuplicateIdentifier,
    /// Text longer than the configured length percentile
    LongText,
}

impl AnomalyCategory {
    /// All categories in evaluation order.
    pub const ALL: [AnomalyCategory; 7] = [
        AnomalyCategory::Missing,
        AnomalyCategory::NumericOutlier,
        AnomalyCategory::UnexpectedNegative,
        AnomalyCategory::DateTime,
        AnomalyCategory::InvalidEmail,
        AnomalyCategory::DuplicateIdentifier,
        AnomalyCategory::LongText,
    ];

    /// Remediation hint shown with every finding of this category.
    pub fn recommendation(&self) -> &'static str {
        match self {
            AnomalyCategory::Missing => {
                "Populate or impute the value, or enforce a NOT NULL constraint"
            }
            AnomalyCategory::NumericOutlier => {
                "Verify against the source; cap or winsorize if it is an error"
            }
            AnomalyCategory::UnexpectedNegative => {
                "Check sign handling upstream or add a non-negative constraint"
            }
            AnomalyCategory::DateTime => "Validate the date source and enforce a date format",
            AnomalyCategory::InvalidEmail => "Validate and cleanse email addresses at the source",
            AnomalyCategory::DuplicateIdentifier => {
                "Deduplicate records or enforce a unique key"
            }
            AnomalyCategory::LongText => "Review for concatenated or corrupted text",
        }
    }
}

/// One row-level data quality problem.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyFinding {
    /// 1-based row number
    pub row: usize,
    pub field: String,
    /// Offending value, truncated for display
    pub value: String,
    pub category: AnomalyCategory,
    pub reason: String,
}

impl AnomalyFinding {
    /// Remediation hint for this finding.
    pub fn recommendation(&self) -> &'static str {
        self.category.recommendation()
    }

    fn to_cells(&self) -> Vec<Cell> {
        vec![
            Cell::Count(self.row as u64),
            Cell::Text(self.field.clone()),
            Cell::Text(self.value.clone()),
            Cell::Text(self.reason.clone()),
            Cell::from(self.recommendation()),
        ]
    }
}

/// Runs anomaly detection and renders the findings as a result table.
pub fn anomaly_analysis(
    table: &Table,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> AnalysisResult {
    let rows = detect_anomalies(table, config, now)
        .iter()
        .map(AnomalyFinding::to_cells)
        .collect();
    AnalysisResult::new(ANOMALY_HEADERS, rows)
}

/// Detects anomalies in every column of a table.
///
/// `now` anchors the future-date check. An empty table yields no findings.
pub fn detect_anomalies(
    table: &Table,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> Vec<AnomalyFinding> {
    if table.is_empty() {
        return Vec::new();
    }

    let mut findings = Vec::new();
    for column in table.iter_columns() {
        let before = findings.len();
        ColumnScan::new(&column, config, now, &mut findings).run();

        let found = findings.len() - before;
        if found > 0 {
            tracing::debug!("Column '{}': {} anomalies", column.name, found);
        }
    }

    if !findings.is_empty() {
        tracing::warn!(
            "Found {} anomalies across {} rows",
            findings.len(),
            table.row_count()
        );
    }
    findings
}

/// Scan state for a single column.
struct ColumnScan<'a, 'c> {
    column: &'c Column<'a>,
    class: ColumnClass,
    config: &'c AnalysisConfig,
    now: NaiveDateTime,
    findings: &'c mut Vec<AnomalyFinding>,
}

impl<'a, 'c> ColumnScan<'a, 'c> {
    fn new(
        column: &'c Column<'a>,
        config: &'c AnalysisConfig,
        now: NaiveDateTime,
        findings: &'c mut Vec<AnomalyFinding>,
    ) -> Self {
        Self {
            column,
            class: classify_column(column),
            config,
            now,
            findings,
        }
    }

    fn run(&mut self) {
        for category in AnomalyCategory::ALL {
            match category {
                AnomalyCategory::Missing => self.missing(),
                AnomalyCategory::NumericOutlier => self.numeric_outliers(),
                AnomalyCategory::UnexpectedNegative => self.unexpected_negatives(),
                AnomalyCategory::DateTime => self.dates(),
                AnomalyCategory::InvalidEmail => self.emails(),
                AnomalyCategory::DuplicateIdentifier => self.duplicate_identifiers(),
                AnomalyCategory::LongText => self.long_text(),
            }
        }
    }

    fn push(&mut self, index: usize, value: &Value, category: AnomalyCategory, reason: String) {
        let display = display_value(value, self.config.max_display_chars);
        self.record(index, display, category, reason);
    }

    fn record(
        &mut self,
        index: usize,
        display: String,
        category: AnomalyCategory,
        reason: String,
    ) {
        self.findings.push(AnomalyFinding {
            row: index + 1,
            field: self.column.name.to_string(),
            value: display,
            category,
            reason,
        });
    }

    /// Missing cells are shown blank, whatever whitespace they held.
    fn missing(&mut self) {
        let column = self.column;
        for (index, value) in column.values.iter().enumerate() {
            if value.is_missing() {
                self.record(
                    index,
                    String::new(),
                    AnomalyCategory::Missing,
                    "Missing/blank value".to_string(),
                );
            }
        }
    }

    fn numeric_outliers(&mut self) {
        if !self.class.has_numeric {
            return;
        }
        let numbers: Vec<(usize, f64)> = self
            .column
            .values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| parse_number(value).map(|n| (index, n)))
            .collect();
        let values: Vec<f64> = numbers.iter().map(|&(_, n)| n).collect();
        let Some(fences) = IqrFences::from_values(&values, self.config.outlier_iqr_multiplier)
        else {
            return;
        };

        let reason = format!(
            "Numeric outlier outside IQR [{:.2}, {:.2}]",
            fences.lower, fences.upper
        );
        for (index, number) in numbers {
            if fences.is_outlier(number) {
                let value = self.column.values[index];
                self.push(index, value, AnomalyCategory::NumericOutlier, reason.clone());
            }
        }
    }

    fn unexpected_negatives(&mut self) {
        if self.class.kind != ColumnKind::Numeric || !self.class.hints.non_negative {
            return;
        }
        let column = self.column;
        for (index, value) in column.values.iter().enumerate() {
            if parse_number(value).is_some_and(|n| n < 0.0) {
                self.push(
                    index,
                    value,
                    AnomalyCategory::UnexpectedNegative,
                    "Negative value where non-negative expected".to_string(),
                );
            }
        }
    }

    /// Within a row the checks run unparseable, future, historic; rows are
    /// visited once, in order.
    fn dates(&mut self) {
        let hints = self.class.hints;
        if !(hints.date || hints.time || self.class.native_temporal) {
            return;
        }

        let horizon = TimeDelta::try_days(self.config.future_horizon_days)
            .and_then(|delta| self.now.checked_add_signed(delta));
        let cutoff = self.config.historic_cutoff.and_time(NaiveTime::MIN);

        let column = self.column;
        for (index, value) in column.values.iter().enumerate() {
            let Some(parsed) = parse_datetime(value) else {
                if !value.is_missing() {
                    self.push(
                        index,
                        value,
                        AnomalyCategory::DateTime,
                        "Unparseable date/time".to_string(),
                    );
                }
                continue;
            };

            if horizon.is_some_and(|horizon| parsed > horizon) {
                self.push(
                    index,
                    value,
                    AnomalyCategory::DateTime,
                    "Suspicious future date (> 1 year ahead)".to_string(),
                );
            }
            if parsed < cutoff {
                self.push(
                    index,
                    value,
                    AnomalyCategory::DateTime,
                    "Suspicious historic date (< 1970)".to_string(),
                );
            }
        }
    }

    fn emails(&mut self) {
        if !self.class.hints.email {
            return;
        }
        let column = self.column;
        for (index, value) in column.values.iter().enumerate() {
            let invalid = value
                .as_text()
                .is_some_and(|text| !text.trim().is_empty() && !is_email(&text));
            if invalid {
                self.push(
                    index,
                    value,
                    AnomalyCategory::InvalidEmail,
                    "Invalid email format".to_string(),
                );
            }
        }
    }

    fn duplicate_identifiers(&mut self) {
        if !self.class.hints.identifier {
            return;
        }
        let keys: Vec<Option<Cow<'a, str>>> = self
            .column
            .values
            .iter()
            .map(|value| value.as_text().filter(|text| !text.trim().is_empty()))
            .collect();

        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for key in keys.iter().flatten() {
            *occurrences.entry(key.as_ref()).or_insert(0) += 1;
        }

        for (index, key) in keys.iter().enumerate() {
            let repeated = key
                .as_deref()
                .is_some_and(|k| occurrences.get(k).copied().unwrap_or(0) > 1);
            if repeated {
                let value = self.column.values[index];
                self.push(
                    index,
                    value,
                    AnomalyCategory::DuplicateIdentifier,
                    "Duplicate identifier".to_string(),
                );
            }
        }
    }

    fn long_text(&mut self) {
        if self.class.kind == ColumnKind::Numeric {
            return;
        }
        let lengths: Vec<Option<usize>> = self
            .column
            .values
            .iter()
            .map(|value| value.as_text().map(|text| text.chars().count()))
            .collect();
        let measured: Vec<f64> = lengths.iter().flatten().map(|&len| len as f64).collect();
        let Some(threshold) =
            quantile_sorted(&sorted(&measured), self.config.long_text_percentile)
        else {
            return;
        };

        let reason = format!("Unusually long text (> p99 ≈ {:.0} chars)", threshold);
        for (index, length) in lengths.iter().enumerate() {
            if length.is_some_and(|len| len as f64 > threshold) {
                let value = self.column.values[index];
                self.push(index, value, AnomalyCategory::LongText, reason.clone());
            }
        }
    }
}

/// Renders a value for display, cutting it at `max_chars` characters and
/// appending [`TRUNCATION_MARKER`] when it was longer.
pub fn display_value(value: &Value, max_chars: usize) -> String {
    let Some(text) = value.as_text() else {
        return String::new();
    };
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
        None => text.into_owned(),
    }
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

    fn detect(table: &Table) -> Vec<AnomalyFinding> {
        detect_anomalies(table, &AnalysisConfig::default(), now())
    }

    fn of(findings: &[AnomalyFinding], category: AnomalyCategory) -> Vec<usize> {
        findings
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.row)
            .collect()
    }

    #[test]
    fn test_empty_table_has_no_findings() {
        let table = Table::from_cells(&["UserId", "Email"], vec![]).unwrap();
        assert!(detect(&table).is_empty());
    }

    #[test]
    fn test_missing_values() {
        let table = single("Name", &[Some("Alice"), None, Some("  ")]);
        let findings = detect(&table);

        assert_eq!(of(&findings, AnomalyCategory::Missing), vec![2, 3]);
        let first = &findings[0];
        assert_eq!(first.field, "Name");
        assert_eq!(first.reason, "Missing/blank value");
        assert_eq!(first.value, "");
    }

    #[test]
    fn test_whitespace_cells_display_blank() {
        let table = single("Name", &[Some("  "), Some("\t"), Some("Alice")]);
        let findings = detect(&table);

        let missing: Vec<_> = findings
            .iter()
            .filter(|f| f.category == AnomalyCategory::Missing)
            .collect();
        assert_eq!(missing.len(), 2);
        assert!(missing.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_numeric_outliers() {
        let table = single(
            "reading",
            &[Some("1"), Some("2"), Some("3"), Some("4"), Some("100")],
        );
        let findings = detect(&table);

        let outliers: Vec<_> = findings
            .iter()
            .filter(|f| f.category == AnomalyCategory::NumericOutlier)
            .collect();
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].row, 5);
        assert_eq!(outliers[0].value, "100");
        assert_eq!(
            outliers[0].reason,
            "Numeric outlier outside IQR [-1.00, 7.00]"
        );
    }

    #[test]
    fn test_fence_values_are_not_outliers() {
        // q1 = 2, q3 = 4, fences [-1, 7]
        let table = single(
            "reading",
            &[Some("-1"), Some("2"), Some("3"), Some("4"), Some("7")],
        );
        assert!(of(&detect(&table), AnomalyCategory::NumericOutlier).is_empty());
    }

    #[test]
    fn test_negative_values_in_quantity_columns() {
        let table = single("TotalAmountUSD", &[Some("10"), Some("-5"), Some("12")]);
        let findings = detect(&table);
        assert_eq!(of(&findings, AnomalyCategory::UnexpectedNegative), vec![2]);

        let table = single("temperature", &[Some("10"), Some("-5"), Some("12")]);
        assert!(of(&detect(&table), AnomalyCategory::UnexpectedNegative).is_empty());
    }

    #[test]
    fn test_date_anomalies() {
        let table = single(
            "SignupDate",
            &[
                Some("2030-01-15"),
                Some("1960-05-01"),
                Some("soon"),
                Some(""),
                Some("2024-01-01"),
            ],
        );
        let findings = detect(&table);
        let dates: Vec<_> = findings
            .iter()
            .filter(|f| f.category == AnomalyCategory::DateTime)
            .map(|f| (f.row, f.reason.as_str()))
            .collect();

        assert_eq!(
            dates,
            vec![
                (1, "Suspicious future date (> 1 year ahead)"),
                (2, "Suspicious historic date (< 1970)"),
                (3, "Unparseable date/time"),
            ]
        );
    }

    #[test]
    fn test_date_findings_follow_row_order() {
        let table = single(
            "event_time",
            &[Some("soon"), Some("1960-05-01"), Some("2030-01-15"), Some("later")],
        );
        let rows = of(&detect(&table), AnomalyCategory::DateTime);
        assert_eq!(rows, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_future_horizon_is_configurable() {
        let table = single("due_date", &[Some("2024-07-15")]);
        let config = AnalysisConfig::new().with_future_horizon_days(30);

        let findings = detect_anomalies(&table, &config, now());
        assert_eq!(of(&findings, AnomalyCategory::DateTime), vec![1]);
    }

    #[test]
    fn test_invalid_emails() {
        let table = single("Email", &[Some("a@b.com"), Some("not-an-email"), Some("")]);
        let findings = detect(&table);

        assert_eq!(of(&findings, AnomalyCategory::InvalidEmail), vec![2]);
        assert_eq!(of(&findings, AnomalyCategory::Missing), vec![3]);
    }

    #[test]
    fn test_duplicate_identifiers_flag_all_occurrences() {
        let table = single("UserId", &[Some("1"), Some("2"), Some("2"), Some("3")]);
        let findings = detect(&table);

        assert_eq!(of(&findings, AnomalyCategory::DuplicateIdentifier), vec![2, 3]);
        assert!(
            findings
                .iter()
                .filter(|f| f.category == AnomalyCategory::DuplicateIdentifier)
                .all(|f| f.value == "2" && f.reason == "Duplicate identifier")
        );
    }

    #[test]
    fn test_duplicate_identifiers_skip_blanks() {
        let table = single("ID", &[Some(""), Some(""), None, None, Some("x")]);
        assert!(of(&detect(&table), AnomalyCategory::DuplicateIdentifier).is_empty());
    }

    #[test]
    fn test_long_text() {
        let mut values: Vec<Option<&str>> = vec![Some("short"); 200];
        let long = "x".repeat(300);
        values.push(Some(&long));
        let table = single("comment", &values);

        let findings = detect(&table);
        let long_findings: Vec<_> = findings
            .iter()
            .filter(|f| f.category == AnomalyCategory::LongText)
            .collect();
        assert_eq!(long_findings.len(), 1);
        assert_eq!(long_findings[0].row, 201);
        assert!(long_findings[0].reason.starts_with("Unusually long text (> p99 ≈ "));
        assert_eq!(long_findings[0].value.chars().count(), 121);
        assert!(long_findings[0].value.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_uniform_text_is_not_long() {
        let table = single("comment", &[Some("abc"), Some("def"), Some("ghi")]);
        assert!(of(&detect(&table), AnomalyCategory::LongText).is_empty());
    }

    #[test]
    fn test_ordering_by_column_then_category_then_row() {
        let table = Table::from_cells(
            &["UserId", "Email"],
            vec![
                vec![Some("1"), Some("bad")],
                vec![Some("1"), None],
                vec![None, Some("ok@x.io")],
            ],
        )
        .unwrap();
        let findings = detect(&table);
        let order: Vec<_> = findings
            .iter()
            .map(|f| (f.field.as_str(), f.category, f.row))
            .collect();

        assert_eq!(
            order,
            vec![
                ("UserId", AnomalyCategory::Missing, 3),
                ("UserId", AnomalyCategory::DuplicateIdentifier, 1),
                ("UserId", AnomalyCategory::DuplicateIdentifier, 2),
                ("Email", AnomalyCategory::Missing, 2),
                ("Email", AnomalyCategory::InvalidEmail, 1),
                ("Email", AnomalyCategory::LongText, 3),
            ]
        );
    }

    #[test]
    fn test_display_value_truncation() {
        assert_eq!(display_value(&Value::Null, 5), "");
        assert_eq!(display_value(&Value::from("abcde"), 5), "abcde");
        assert_eq!(display_value(&Value::from("abcdef"), 5), "abcde…");
        assert_eq!(display_value(&Value::from("ééééééé"), 3), "ééé…");
    }

    #[test]
    fn test_anomaly_result_layout() {
        let table = single("UserId", &[Some("7"), Some("7")]);
        let result = anomaly_analysis(&table, &AnalysisConfig::default(), now());

        assert_eq!(result.headers, ANOMALY_HEADERS);
        assert_eq!(result.len(), 2);
        assert_eq!(result.rows[0][0], Cell::Count(1));
        assert_eq!(result.rows[0][3], Cell::from("Duplicate identifier"));
        assert_eq!(
            result.rows[0][4],
            Cell::from(AnomalyCategory::DuplicateIdentifier.recommendation())
        );
    }
}
