//! SLA compliance report.
//!
//! Aggregates the per-column quality figures into table-level aspects and
//! checks each against a service-level target.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::{AnalysisResult, Cell, Table};

use super::config::AnalysisConfig;
use super::rules::QualityRules;
use super::scoring::{ColumnScore, score_columns};
use super::stats::round2;

/// Output header of the compliance report.
pub const COMPLIANCE_HEADERS: &[&str] = &[
    "Aspect",
    "Application",
    "Layer",
    "Table",
    "Score",
    "SLA",
    "Compliant",
    "Notes",
    "Analysis Date",
];

/// Scores below this fraction of the SLA are critical.
const CRITICAL_SEVERITY_RATIO: f64 = 0.8;

/// Where the analysed table lives and the SLA it is held to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplianceTarget {
    pub application: String,
    pub layer: String,
    pub table: String,
    /// Minimum acceptable score, in percent
    pub sla_percent: f64,
}

impl Default for ComplianceTarget {
    fn default() -> Self {
        Self {
            application: "MyApp".to_string(),
            layer: "DataLake".to_string(),
            table: "Table".to_string(),
            sla_percent: 80.0,
        }
    }
}

/// Severity of an SLA miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationSeverity {
    /// Score is below the SLA but not critical
    Warning,
    /// Score is below 80% of the SLA
    Critical,
}

/// An aspect whose score missed the SLA.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdViolation {
    /// Aspect that missed the SLA
    pub metric: String,
    /// The SLA, in percent
    pub threshold: f64,
    /// The measured score, in percent
    pub actual: f64,
    pub severity: ViolationSeverity,
}

impl ThresholdViolation {
    /// Checks a score against an SLA; `None` when the SLA is met.
    ///
    /// # Severity Classification
    /// - Critical: score is below 80% of the SLA
    /// - Warning: score is between 80% and 100% of the SLA
    pub fn check(metric: impl Into<String>, threshold: f64, actual: f64) -> Option<Self> {
        if actual >= threshold {
            return None;
        }
        let severity = if actual < threshold * CRITICAL_SEVERITY_RATIO {
            ViolationSeverity::Critical
        } else {
            ViolationSeverity::Warning
        };

        Some(Self {
            metric: metric.into(),
            threshold,
            actual,
            severity,
        })
    }
}

/// One aspect line of the compliance report.
#[derive(Debug, Clone, PartialEq)]
pub struct AspectScore {
    pub aspect: &'static str,
    /// Mean over columns, in percent
    pub score: f64,
    pub violation: Option<ThresholdViolation>,
}

impl AspectScore {
    fn new(aspect: &'static str, score: f64, sla: f64) -> Self {
        Self {
            aspect,
            score,
            violation: ThresholdViolation::check(aspect, sla, score),
        }
    }

    /// Returns true when the aspect meets the SLA.
    pub fn is_compliant(&self) -> bool {
        self.violation.is_none()
    }

    /// Human-readable verdict.
    pub fn notes(&self) -> &'static str {
        match self.violation.as_ref().map(|v| v.severity) {
            None => "Meets SLA",
            Some(ViolationSeverity::Warning) => "Below SLA",
            Some(ViolationSeverity::Critical) => "Critically below SLA",
        }
    }
}

/// Aggregates quality, completeness and validity over all columns.
pub fn aspect_scores(
    table: &Table,
    rules: Option<&QualityRules>,
    target: &ComplianceTarget,
) -> Vec<AspectScore> {
    let scores = score_columns(table, rules);
    let mean = |metric: fn(&ColumnScore) -> f64| {
        if scores.is_empty() {
            0.0
        } else {
            round2(scores.iter().map(metric).sum::<f64>() / scores.len() as f64)
        }
    };

    let aspects = vec![
        AspectScore::new("Quality", mean(|s| s.quality_score), target.sla_percent),
        AspectScore::new("Completeness", mean(|s| s.completeness), target.sla_percent),
        AspectScore::new("Validity", mean(|s| s.validity), target.sla_percent),
    ];

    for violation in aspects.iter().filter_map(|a| a.violation.as_ref()) {
        tracing::warn!(
            "{} score {:.2}% is below the {}% SLA ({:?})",
            violation.metric,
            violation.actual,
            violation.threshold,
            violation.severity
        );
    }
    aspects
}

/// Builds the compliance report for a table.
pub fn compliance_analysis(
    table: &Table,
    rules: Option<&QualityRules>,
    target: &ComplianceTarget,
    config: &AnalysisConfig,
    now: NaiveDateTime,
) -> AnalysisResult {
    let timestamp = config.format_timestamp(now);
    let rows = aspect_scores(table, rules, target)
        .iter()
        .map(|aspect| {
            vec![
                Cell::from(aspect.aspect),
                Cell::Text(target.application.clone()),
                Cell::Text(target.layer.clone()),
                Cell::Text(target.table.clone()),
                Cell::Text(format!("{:.2}%", aspect.score)),
                Cell::Text(format!("{}%", target.sla_percent)),
                Cell::from(if aspect.is_compliant() { "✔" } else { "✘" }),
                Cell::from(aspect.notes()),
                Cell::Text(timestamp.clone()),
            ]
        })
        .collect();

    AnalysisResult::new(COMPLIANCE_HEADERS, rows)
}
