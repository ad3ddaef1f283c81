//! Analysis configuration.
//!
//! Defaults reproduce the fixed behaviour of the analyses: Tukey fences at
//! 1.5 IQR, a one-year future horizon, a 1970 historic cutoff, the 99th
//! percentile for long text and 120-character display values.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default multiplier applied to the interquartile range.
pub const DEFAULT_IQR_MULTIPLIER: f64 = 1.5;
/// Default number of days ahead of now before a date is suspicious.
pub const DEFAULT_FUTURE_HORIZON_DAYS: i64 = 365;
/// Default percentile of text length above which text is unusually long.
pub const DEFAULT_LONG_TEXT_PERCENTILE: f64 = 0.99;
/// Default maximum number of characters shown for an offending value.
pub const DEFAULT_MAX_DISPLAY_CHARS: usize = 120;
/// Default timestamp format for the analysis-date column.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn default_historic_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Tunables shared by all analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Multiplier for the IQR outlier fences
    pub outlier_iqr_multiplier: f64,
    /// Dates further than this many days ahead of now are suspicious
    pub future_horizon_days: i64,
    /// Dates before this day are suspicious
    pub historic_cutoff: NaiveDate,
    /// Text-length percentile (0.0-1.0) above which text is unusually long
    pub long_text_percentile: f64,
    /// Offending values longer than this are truncated for display
    pub max_display_chars: usize,
    /// `chrono` format string for the analysis-date column
    pub timestamp_format: String,
}

/// Validation errors for analysis configuration.
#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("outlier_iqr_multiplier must be a positive finite number, got {0}")]
    InvalidIqrMultiplier(f64),
    #[error("future_horizon_days must not be negative, got {0}")]
    InvalidFutureHorizon(i64),
    #[error("long_text_percentile must be between 0.0 and 1.0, got {0}")]
    InvalidPercentile(f64),
    #[error("max_display_chars must be at least 1")]
    InvalidDisplayWidth,
    #[error("timestamp_format must not be empty")]
    EmptyTimestampFormat,
    #[error("timestamp_format '{0}' is not a valid chrono format")]
    InvalidTimestampFormat(String),
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: DEFAULT_IQR_MULTIPLIER,
            future_horizon_days: DEFAULT_FUTURE_HORIZON_DAYS,
            historic_cutoff: default_historic_cutoff(),
            long_text_percentile: DEFAULT_LONG_TEXT_PERCENTILE,
            max_display_chars: DEFAULT_MAX_DISPLAY_CHARS,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Creates a new analysis config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the IQR multiplier.
    pub fn with_outlier_iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_iqr_multiplier = multiplier;
        self
    }

    /// Builder method to set the future horizon in days.
    pub fn with_future_horizon_days(mut self, days: i64) -> Self {
        self.future_horizon_days = days;
        self
    }

    /// Builder method to set the historic cutoff date.
    pub fn with_historic_cutoff(mut self, cutoff: NaiveDate) -> Self {
        self.historic_cutoff = cutoff;
        self
    }

    /// Builder method to set the long-text percentile.
    pub fn with_long_text_percentile(mut self, percentile: f64) -> Self {
        if !(0.0..=1.0).contains(&percentile) {
            tracing::warn!(
                "long_text_percentile {} clamped to valid range [0.0, 1.0]",
                percentile
            );
        }
        self.long_text_percentile = percentile.clamp(0.0, 1.0);
        self
    }

    /// Builder method to set the display truncation width.
    pub fn with_max_display_chars(mut self, chars: usize) -> Self {
        self.max_display_chars = chars;
        self
    }

    /// Builder method to set the analysis-date format.
    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = format.into();
        self
    }

    /// Renders the analysis-date column for `now`.
    ///
    /// Falls back to the default layout if `timestamp_format` contains an
    /// item chrono cannot render.
    pub fn format_timestamp(&self, now: NaiveDateTime) -> String {
        render_timestamp(now, &self.timestamp_format).unwrap_or_else(|| {
            tracing::warn!(
                "timestamp_format '{}' is not renderable, using default",
                self.timestamp_format
            );
            now.format(DEFAULT_TIMESTAMP_FORMAT).to_string()
        })
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.outlier_iqr_multiplier.is_finite() && self.outlier_iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::InvalidIqrMultiplier(
                self.outlier_iqr_multiplier,
            ));
        }
        if self.future_horizon_days < 0 {
            return Err(ConfigValidationError::InvalidFutureHorizon(
                self.future_horizon_days,
            ));
        }
        if !(0.0..=1.0).contains(&self.long_text_percentile) {
            return Err(ConfigValidationError::InvalidPercentile(
                self.long_text_percentile,
            ));
        }
        if self.max_display_chars == 0 {
            return Err(ConfigValidationError::InvalidDisplayWidth);
        }
        if self.timestamp_format.trim().is_empty() {
            return Err(ConfigValidationError::EmptyTimestampFormat);
        }
        if render_timestamp(NaiveDateTime::default(), &self.timestamp_format).is_none() {
            return Err(ConfigValidationError::InvalidTimestampFormat(
                self.timestamp_format.clone(),
            ));
        }
        Ok(())
    }
}

fn render_timestamp(now: NaiveDateTime, format: &str) -> Option<String> {
    let mut rendered = String::new();
    write!(rendered, "{}", now.format(format)).ok()?;
    Some(rendered)
}
