//! Core data structures and analyses for Sidecar data governance.
//!
//! This crate loads delimited tabular data and runs descriptive analyses
//! over it: profiling, quality scoring, catalog generation, SLA compliance
//! and row-level anomaly detection. Every analysis returns a header row
//! plus data rows that can be displayed or exported as-is.
//!
//! # Guarantees
//! - Analyses are synchronous, single-pass and never mutate their input
//! - Malformed values are excluded from statistics rather than failing
//! - No network access; input and output are local files or streams
//!
//! # Architecture
//! - `ingest` turns delimited text into a [`Table`]
//! - `quality` classifies columns and runs the analyses
//! - `export` writes an [`AnalysisResult`] as CSV, TSV or JSON
//! - `settings` holds the explicit, file-backed configuration

pub mod error;
pub mod export;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod quality;
pub mod settings;

// Re-export commonly used types
pub use error::{Result, SidecarError};
pub use export::{ExportFormat, export_to_path, write_result};
pub use ingest::{IngestOptions, load_table, parse_table, read_table};
pub use logging::{LogFormat, init_logging, init_logging_with_format};
pub use models::{AnalysisResult, Cell, Column, Table, Value};
pub use quality::{AnalysisConfig, AnalysisKind, Analyzer, ComplianceTarget, QualityRules};
pub use settings::Settings;
