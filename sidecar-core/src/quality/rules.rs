//! Caller-owned quality rules.
//!
//! A rule set maps a field name to a compiled regular expression. Patterns
//! are compiled when they are assigned, so an invalid pattern is rejected
//! there and the scorer only ever sees valid rules.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Result, SidecarError};

/// Mapping from field name to validity pattern.
#[derive(Debug, Clone, Default)]
pub struct QualityRules {
    rules: BTreeMap<String, Regex>,
}

/// Rule entry as it appears in a rules file: either the bare pattern or an
/// object carrying it.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RuleEntry {
    Pattern(String),
    Detailed { pattern: String },
}

impl RuleEntry {
    fn into_pattern(self) -> String {
        match self {
            RuleEntry::Pattern(pattern) | RuleEntry::Detailed { pattern } => pattern,
        }
    }
}

impl QualityRules {
    /// Creates an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a set of `field -> pattern` pairs.
    ///
    /// # Errors
    /// Returns `InvalidRule` naming the first field whose pattern does not
    /// compile.
    pub fn from_patterns<I, K, V>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut rules = Self::new();
        for (field, pattern) in patterns {
            rules.assign(field, pattern.as_ref())?;
        }
        Ok(rules)
    }

    /// Parses a JSON rules document.
    ///
    /// Accepts `{"field": "pattern"}` and `{"field": {"pattern": "..."}}`
    /// entries, mixed freely.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: BTreeMap<String, RuleEntry> = serde_json::from_str(json)
            .map_err(|e| SidecarError::serialization("Failed to parse quality rules", e))?;
        Self::from_patterns(
            entries
                .into_iter()
                .map(|(field, entry)| (field, entry.into_pattern())),
        )
    }

    /// Loads a JSON rules file.
    pub fn load(path: &Path) -> Result<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| SidecarError::io("read", path, e))?;
        let rules = Self::from_json_str(&json)?;
        tracing::debug!("Loaded {} quality rules from {}", rules.len(), path.display());
        Ok(rules)
    }

    /// Compiles and assigns a pattern to a field, replacing any previous
    /// rule for it.
    pub fn assign(&mut self, field: impl Into<String>, pattern: &str) -> Result<()> {
        let field = field.into();
        let regex = Regex::new(pattern).map_err(|e| SidecarError::invalid_rule(&field, e))?;
        self.rules.insert(field, regex);
        Ok(())
    }

    /// Removes the rule for a field, returning whether one existed.
    pub fn remove(&mut self, field: &str) -> bool {
        self.rules.remove(field).is_some()
    }

    /// Rule for a field, if any.
    pub fn get(&self, field: &str) -> Option<&Regex> {
        self.rules.get(field)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true when no rules are assigned.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Source patterns by field, in field order.
    pub fn patterns(&self) -> BTreeMap<String, String> {
        self.rules
            .iter()
            .map(|(field, regex)| (field.clone(), regex.as_str().to_string()))
            .collect()
    }
}

/// Returns true when the pattern matches at the start of `text`.
///
/// The match need not consume the whole string; a pattern that must cover
/// the full value has to anchor its end with `$`.
pub fn is_valid_match(rule: &Regex, text: &str) -> bool {
    rule.find(text).is_some_and(|m| m.start() == 0)
}
