//! Run outcome: severity policy, threshold and rendering

use lint_config::Configuration;
use lint_rules::{Severity, Violation};

/// Output formats for violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// `path:line:character: severity: reason (rule_id)`, one per line
    #[default]
    Text,
    Json,
}

impl ReportFormat {
    /// Format named by the `reporter` setting; unknown names fall back to text.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("json") => Self::Json,
            Some("text") | Some("xcode") | None => Self::Text,
            Some(other) => {
                tracing::warn!(reporter = other, "Unknown reporter, using text output");
                Self::Text
            }
        }
    }
}

/// Violations of a run after the policy's severity rules were applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub violations: Vec<Violation>,
    warning_threshold: Option<usize>,
}

impl Report {
    /// Apply `strict` (warnings become errors) and record the warning threshold.
    pub fn new(mut violations: Vec<Violation>, configuration: &Configuration) -> Self {
        if configuration.is_strict() {
            for violation in &mut violations {
                violation.severity = Severity::Error;
            }
        }
        Self {
            violations,
            warning_threshold: configuration.warning_threshold,
        }
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    fn count(&self, severity: Severity) -> usize {
        self.violations.iter().filter(|v| v.severity == severity).count()
    }

    /// Whether the number of warnings reached `warning_threshold`.
    pub fn threshold_reached(&self) -> bool {
        self.warning_threshold
            .is_some_and(|threshold| self.warnings() >= threshold)
    }

    /// Whether the run should fail.
    pub fn is_failure(&self) -> bool {
        self.errors() > 0 || self.threshold_reached()
    }

    pub fn render(&self, format: ReportFormat) -> serde_json::Result<String> {
        match format {
            ReportFormat::Text => Ok(self
                .violations
                .iter()
                .map(|v| format!("{v}\n"))
                .collect()),
            ReportFormat::Json => serde_json::to_string_pretty(&self.violations),
        }
    }

    /// One-line summary of the run.
    pub fn summary(&self, files: usize) -> String {
        let mut summary = format!(
            "Done linting! Found {} violation{}, {} serious in {} file{}.",
            self.violations.len(),
            if self.violations.len() == 1 { "" } else { "s" },
            self.errors(),
            files,
            if files == 1 { "" } else { "s" },
        );
        if self.threshold_reached() {
            summary.push_str(" Number of warnings exceeded threshold.");
        }
        summary
    }
}
