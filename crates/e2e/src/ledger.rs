//! Pass/fail/warning bookkeeping for one run

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{error, info, warn};

use crate::error::E2eResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Passed,
    Failed,
    Warning,
}

/// Outcomes accumulated while scenarios run. Append-only; serialized with
/// the field order `passed`, `failed`, `warnings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub passed: Vec<String>,
    pub failed: Vec<String>,
    pub warnings: Vec<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and mirror it to the log
    pub fn record(&mut self, category: Category, message: impl Into<String>) {
        let message = message.into();
        match category {
            Category::Passed => {
                info!("✓ {}", message);
                self.passed.push(message);
            }
            Category::Failed => {
                error!("✗ {}", message);
                self.failed.push(message);
            }
            Category::Warning => {
                warn!("⚠ {}", message);
                self.warnings.push(message);
            }
        }
    }

    pub fn pass(&mut self, message: impl Into<String>) {
        self.record(Category::Passed, message);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.record(Category::Failed, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.record(Category::Warning, message);
    }

    pub fn len(&self) -> usize {
        self.passed.len() + self.failed.len() + self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Write the ledger as pretty JSON, replacing any previous file
    pub fn flush(&self, path: &Path) -> E2eResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Results written to: {}", path.display());
        Ok(())
    }

    /// Print counts followed by each non-empty list
    pub fn log_summary(&self) {
        info!("═══════════════════════════════════════");
        info!("TEST SUMMARY");
        info!("═══════════════════════════════════════");
        info!("Passed: {}", self.passed.len());
        info!("Failed: {}", self.failed.len());
        info!("Warnings: {}", self.warnings.len());

        if !self.passed.is_empty() {
            info!("Passed tests:");
            for entry in &self.passed {
                info!("   - {}", entry);
            }
        }
        if !self.failed.is_empty() {
            error!("Failed tests:");
            for entry in &self.failed {
                error!("   - {}", entry);
            }
        }
        if !self.warnings.is_empty() {
            warn!("Warnings:");
            for entry in &self.warnings {
                warn!("   - {}", entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_keeps_order_per_category() {
        let mut ledger = Ledger::new();
        ledger.pass("a");
        ledger.warn("w");
        ledger.pass("b");
        ledger.fail("f");

        assert_eq!(ledger.passed, vec!["a", "b"]);
        assert_eq!(ledger.failed, vec!["f"]);
        assert_eq!(ledger.warnings, vec!["w"]);
        assert_eq!(ledger.len(), 4);
        assert!(ledger.has_failures());
    }

    #[test]
    fn test_serialized_field_order() {
        let json = serde_json::to_string(&Ledger::new()).unwrap();
        assert_eq!(json, r#"{"passed":[],"failed":[],"warnings":[]}"#);
    }
}
