//! Completeness and uniqueness counts shared by the profiler and the scorer.
//!
//! Both analyses report completeness for the same column; computing it in one
//! place keeps the two figures identical.

use std::borrow::Cow;
use std::collections::HashSet;

use crate::models::Column;

use super::stats::percent;

/// Presence counts for one column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnCounts {
    /// Number of rows
    pub total: u64,
    /// Null values
    pub nulls: u64,
    /// Present values whose trimmed string form is empty
    pub blanks: u64,
    /// Distinct non-null values, compared by string form
    pub unique: u64,
}

impl ColumnCounts {
    /// Counts nulls, blanks and distinct values in a column.
    pub fn from_column(column: &Column<'_>) -> Self {
        let mut nulls: u64 = 0;
        let mut blanks: u64 = 0;
        let mut seen: HashSet<Cow<'_, str>> = HashSet::new();

        for value in &column.values {
            match value.as_text() {
                None => nulls += 1,
                Some(text) => {
                    if text.trim().is_empty() {
                        blanks += 1;
                    }
                    seen.insert(text);
                }
            }
        }

        Self {
            total: column.len() as u64,
            nulls,
            blanks,
            unique: seen.len() as u64,
        }
    }

    /// Rows holding a usable value.
    pub fn present(&self) -> u64 {
        self.total.saturating_sub(self.nulls + self.blanks)
    }

    /// Share of rows that are neither null nor blank, in percent.
    pub fn completeness(&self) -> f64 {
        percent(self.present(), self.total)
    }

    /// Share of rows holding a distinct value, in percent.
    pub fn uniqueness(&self) -> f64 {
        percent(self.unique, self.total)
    }
}
