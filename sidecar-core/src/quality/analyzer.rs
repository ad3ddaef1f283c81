//! Analysis facade.
//!
//! This module provides the `Analyzer` that owns the configuration, the
//! caller's quality rules and the compliance target, and dispatches a table
//! to one of the five analyses.

use chrono::{Local, NaiveDateTime};

use crate::Result;
use crate::error::SidecarError;
use crate::models::{AnalysisResult, Table};

use super::anomaly::anomaly_analysis;
use super::catalog::catalog_analysis;
use super::compliance::{ComplianceTarget, compliance_analysis};
use super::config::AnalysisConfig;
use super::profile::profile_analysis;
use super::rules::QualityRules;
use super::scoring::quality_analysis;

/// The analyses an [`Analyzer`] can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisKind {
    /// Per-column completeness and distribution summary
    Profile,
    /// Per-column completeness, uniqueness, validity and quality score
    Quality,
    /// Friendly names and business descriptions
    Catalog,
    /// Table-level scores against an SLA
    Compliance,
    /// Row-level findings
    Anomalies,
}

impl AnalysisKind {
    /// All analyses.
    pub const ALL: [AnalysisKind; 5] = [
        AnalysisKind::Profile,
        AnalysisKind::Quality,
        AnalysisKind::Catalog,
        AnalysisKind::Compliance,
        AnalysisKind::Anomalies,
    ];

    /// Lower-case name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::Profile => "profile",
            AnalysisKind::Quality => "quality",
            AnalysisKind::Catalog => "catalog",
            AnalysisKind::Compliance => "compliance",
            AnalysisKind::Anomalies => "anomalies",
        }
    }
}

/// Runs analyses over tables.
///
/// # Example
///
/// ```rust
/// use sidecar_core::models::Table;
/// use sidecar_core::quality::{AnalysisKind, Analyzer};
///
/// let table = Table::from_cells(
///     &["UserId"],
///     vec![vec![Some("1")], vec![Some("2")], vec![Some("2")]],
/// )?;
///
/// let result = Analyzer::with_defaults().run(AnalysisKind::Anomalies, &table)?;
/// assert_eq!(result.len(), 2);
/// # Ok::<(), sidecar_core::SidecarError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
    rules: QualityRules,
    target: ComplianceTarget,
}

impl Analyzer {
    /// Creates a new analyzer with the given configuration.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Creates a new analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Builder method to set the quality rules.
    pub fn with_rules(mut self, rules: QualityRules) -> Self {
        self.rules = rules;
        self
    }

    /// Builder method to set the compliance target.
    pub fn with_target(mut self, target: ComplianceTarget) -> Self {
        self.target = target;
        self
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Returns the quality rules.
    pub fn rules(&self) -> &QualityRules {
        &self.rules
    }

    /// Returns the rules mutably, for assigning or removing patterns
    /// between runs.
    pub fn rules_mut(&mut self) -> &mut QualityRules {
        &mut self.rules
    }

    /// Returns the compliance target.
    pub fn target(&self) -> &ComplianceTarget {
        &self.target
    }

    /// Runs an analysis stamped with the local time.
    pub fn run(&self, kind: AnalysisKind, table: &Table) -> Result<AnalysisResult> {
        self.run_at(kind, table, Local::now().naive_local())
    }

    /// Runs an analysis as of `now`.
    ///
    /// # Errors
    /// Returns a configuration error if the analysis configuration is
    /// invalid. The analyses themselves do not fail on malformed values.
    pub fn run_at(
        &self,
        kind: AnalysisKind,
        table: &Table,
        now: NaiveDateTime,
    ) -> Result<AnalysisResult> {
        self.config
            .validate()
            .map_err(|e| SidecarError::configuration(e.to_string()))?;

        tracing::debug!(
            "Running {} analysis over {} columns and {} rows",
            kind.name(),
            table.column_count(),
            table.row_count()
        );

        let rules = (!self.rules.is_empty()).then_some(&self.rules);
        let result = match kind {
            AnalysisKind::Profile => profile_analysis(table, &self.config, now),
            AnalysisKind::Quality => quality_analysis(table, rules, &self.config, now),
            AnalysisKind::Catalog => catalog_analysis(table, &self.config, now),
            AnalysisKind::Compliance => {
                compliance_analysis(table, rules, &self.target, &self.config, now)
            }
            AnalysisKind::Anomalies => anomaly_analysis(table, &self.config, now),
        };

        tracing::debug!("{} analysis produced {} rows", kind.name(), result.len());
        Ok(result)
    }
}
