//! Property-based tests for the analyses.
//!
//! Random tables are generated from a small vocabulary of cell shapes
//! (numbers, dates, emails, blanks, nulls, free text) so that every column
//! classification is exercised. The properties checked are:
//! - Percentages stay within `[0, 100]`
//! - The quality score is the rounded mean of completeness and validity
//! - Profiler and scorer agree on completeness
//! - IQR fences bracket the quartiles and never flag in-fence values
//! - Anomaly row numbers are 1-based and within the table
//! - Repeated runs give identical results

use chrono::{NaiveDate, NaiveDateTime};
use proptest::prelude::*;
use sidecar_core::{
    AnalysisKind, Analyzer, Table, Value,
    quality::{
        AnalysisConfig, IqrFences, PROFILE_HEADERS, QUALITY_HEADERS, detect_anomalies, round2,
        score_columns,
    },
};

// ============================================================================
// Test Data Generation Utilities
// ============================================================================

const COLUMN_NAMES: &[&str] = &[
    "UserId",
    "Email",
    "SignupDate",
    "TotalAmount",
    "Notes",
    "status",
    "event_time",
];

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn cell_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        Just(Value::from("")),
        Just(Value::from("  ")),
        (-1000i64..1000).prop_map(|n| Value::from(n.to_string())),
        (-1.0e6f64..1.0e6).prop_map(Value::from),
        (1900i32..2100, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| Value::from(format!("{:04}-{:02}-{:02}", y, m, d))),
        "[a-z]{1,8}@[a-z]{1,8}\\.(com|org|io)".prop_map(Value::from),
        "[a-zA-Z ]{0,40}".prop_map(Value::from),
    ]
}

fn table_strategy() -> impl Strategy<Value = Table> {
    (1usize..=COLUMN_NAMES.len(), 0usize..30).prop_flat_map(|(width, height)| {
        prop::collection::vec(prop::collection::vec(cell_strategy(), width), height).prop_map(
            move |rows| {
                let columns = COLUMN_NAMES[..width].iter().map(|c| c.to_string()).collect();
                Table::new(columns, rows).unwrap()
            },
        )
    })
}

fn number(cell: &sidecar_core::Cell) -> f64 {
    cell.as_f64().expect("numeric cell")
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_percentages_within_bounds(table in table_strategy()) {
        for score in score_columns(&table, None) {
            for value in [score.completeness, score.uniqueness, score.validity, score.quality_score] {
                prop_assert!((0.0..=100.0).contains(&value), "{} out of range", value);
            }
        }
    }

    #[test]
    fn prop_quality_score_is_mean_of_completeness_and_validity(table in table_strategy()) {
        for score in score_columns(&table, None) {
            prop_assert_eq!(
                score.quality_score,
                round2((score.completeness + score.validity) / 2.0)
            );
        }
    }

    #[test]
    fn prop_completeness_agrees(table in table_strategy()) {
        let analyzer = Analyzer::with_defaults();
        let profile = analyzer.run_at(AnalysisKind::Profile, &table, now()).unwrap();
        let quality = analyzer.run_at(AnalysisKind::Quality, &table, now()).unwrap();

        let profile_idx = PROFILE_HEADERS.iter().position(|h| *h == "Completeness (%)").unwrap();
        let quality_idx = QUALITY_HEADERS.iter().position(|h| *h == "Completeness (%)").unwrap();
        for (p, q) in profile.rows.iter().zip(&quality.rows) {
            prop_assert_eq!(number(&p[profile_idx]), number(&q[quality_idx]));
        }
    }

    #[test]
    fn prop_iqr_fences_bracket_quartiles(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 1..50),
        multiplier in 0.5f64..3.0,
    ) {
        let fences = IqrFences::from_values(&values, multiplier).unwrap();
        prop_assert!(fences.lower <= fences.q1);
        prop_assert!(fences.q1 <= fences.q3);
        prop_assert!(fences.q3 <= fences.upper);

        for value in values {
            if value >= fences.lower && value <= fences.upper {
                prop_assert!(!fences.is_outlier(value));
            }
        }
    }

    #[test]
    fn prop_anomaly_rows_within_table(table in table_strategy()) {
        let findings = detect_anomalies(&table, &AnalysisConfig::default(), now());
        for finding in &findings {
            prop_assert!(finding.row >= 1 && finding.row <= table.row_count());
            prop_assert!(table.columns().contains(&finding.field));
        }
        if table.is_empty() {
            prop_assert!(findings.is_empty());
        }
    }

    #[test]
    fn prop_analyses_are_idempotent(table in table_strategy()) {
        let analyzer = Analyzer::with_defaults();
        for kind in AnalysisKind::ALL {
            let first = analyzer.run_at(kind, &table, now()).unwrap();
            let second = analyzer.run_at(kind, &table, now()).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
