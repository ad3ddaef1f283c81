//! Tabular data analysis module.
//!
//! This module provides the analyses run over a [`Table`](crate::models::Table):
//! - **Profile**: completeness, uniqueness and value distribution per column
//! - **Quality**: completeness, validity and a blended quality score per column
//! - **Catalog**: friendly names and business descriptions per column
//! - **Compliance**: table-level scores checked against an SLA
//! - **Anomalies**: row-level findings with a reason and a recommendation
//!
//! # Guarantees
//! - Analyses are single-pass and in-memory, and never mutate their input
//! - Malformed cell values are excluded from statistics, never fatal
//! - Output is deterministic for a given table and analysis time
//!
//! # Example
//! ```rust
//! use sidecar_core::models::Table;
//! use sidecar_core::quality::{AnalysisConfig, AnalysisKind, Analyzer};
//!
//! let table = Table::from_cells(
//!     &["Name", "Age"],
//!     vec![
//!         vec![Some("Alice"), Some("30")],
//!         vec![Some("Bob"), Some("")],
//!         vec![Some("Cara"), Some("200")],
//!     ],
//! )?;
//!
//! let analyzer = Analyzer::new(AnalysisConfig::default());
//! let profile = analyzer.run(AnalysisKind::Profile, &table)?;
//! assert_eq!(profile.len(), 2);
//! # Ok::<(), sidecar_core::SidecarError>(())
//! ```

mod analyzer;
mod anomaly;
mod catalog;
mod classify;
mod completeness;
mod compliance;
mod config;
mod profile;
mod rules;
mod scoring;
mod stats;

// Re-export public API
pub use analyzer::{AnalysisKind, Analyzer};
pub use anomaly::{
    ANOMALY_HEADERS, AnomalyCategory, AnomalyFinding, TRUNCATION_MARKER, anomaly_analysis,
    detect_anomalies, display_value,
};
pub use catalog::{CATALOG_HEADERS, business_description, catalog_analysis, friendly_name};
pub use classify::{
    ColumnClass, ColumnKind, NON_NEGATIVE_HINTS, NameHints, classify_column, is_email,
    parse_datetime, parse_number,
};
pub use completeness::ColumnCounts;
pub use compliance::{
    AspectScore, COMPLIANCE_HEADERS, ComplianceTarget, ThresholdViolation, ViolationSeverity,
    aspect_scores, compliance_analysis,
};
pub use config::{AnalysisConfig, ConfigValidationError};
pub use profile::{PROFILE_HEADERS, profile_analysis};
pub use rules::{QualityRules, is_valid_match};
pub use scoring::{ColumnScore, QUALITY_HEADERS, quality_analysis, score_columns};
pub use stats::{IqrFences, quantile_sorted, round2};
