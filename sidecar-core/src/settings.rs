//! Persistent settings.
//!
//! Settings are an explicit value loaded from and saved to a JSON file. They
//! are handed to whatever builds the analyzer; nothing reads them globally.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SidecarError};
use crate::ingest::IngestOptions;
use crate::quality::{AnalysisConfig, Analyzer, ComplianceTarget, QualityRules};

/// Default settings file name, relative to the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "sidecar.json";

/// Everything configurable about ingestion and analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub analysis: AnalysisConfig,
    pub ingest: IngestOptions,
    pub compliance: ComplianceTarget,
    /// Validity patterns by field name
    pub quality_rules: BTreeMap<String, String>,
}

impl Settings {
    /// Loads settings from a JSON file.
    ///
    /// A missing file yields the defaults; an unreadable or malformed file is
    /// an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "No settings file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let json =
            std::fs::read_to_string(path).map_err(|e| SidecarError::io("read", path, e))?;
        let settings: Settings = serde_json::from_str(&json).map_err(|e| {
            SidecarError::serialization(format!("Invalid settings file {}", path.display()), e)
        })?;

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Saves settings to a JSON file, replacing it if it exists.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SidecarError::serialization("Failed to serialize settings", e))?;
        std::fs::write(path, json).map_err(|e| SidecarError::io("write", path, e))?;

        tracing::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Compiles the configured quality rules.
    pub fn quality_rules(&self) -> Result<QualityRules> {
        QualityRules::from_patterns(&self.quality_rules)
    }

    /// Validates the settings and builds an analyzer from them.
    pub fn analyzer(&self) -> Result<Analyzer> {
        self.analysis
            .validate()
            .map_err(|e| SidecarError::configuration(e.to_string()))?;

        Ok(Analyzer::new(self.analysis.clone())
            .with_rules(self.quality_rules()?)
            .with_target(self.compliance.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_settings_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_SETTINGS_FILE);

        let mut settings = Settings::default();
        settings.analysis = settings.analysis.with_future_horizon_days(30);
        settings.ingest = settings.ingest.with_delimiter(';');
        settings.compliance.sla_percent = 95.0;
        settings
            .quality_rules
            .insert("Zip".to_string(), r"\d{5}$".to_string());

        settings.save(&path).unwrap();
        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{"compliance": {"application": "CRM"}}"#).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.compliance.application, "CRM");
        assert_eq!(settings.compliance.sla_percent, 80.0);
        assert_eq!(settings.analysis, AnalysisConfig::default());
    }

    #[test]
    fn test_malformed_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(SidecarError::Serialization { .. })
        ));
    }

    #[test]
    fn test_analyzer_from_settings() {
        let mut settings = Settings::default();
        settings
            .quality_rules
            .insert("Code".to_string(), "AB-".to_string());

        let analyzer = settings.analyzer().unwrap();
        assert_eq!(analyzer.rules().len(), 1);

        settings
            .quality_rules
            .insert("Bad".to_string(), "(".to_string());
        assert!(matches!(
            settings.analyzer(),
            Err(SidecarError::InvalidRule { .. })
        ));

        settings.quality_rules.clear();
        settings.analysis.outlier_iqr_multiplier = -1.0;
        assert!(matches!(
            settings.analyzer(),
            Err(SidecarError::Configuration { .. })
        ));
    }
}
