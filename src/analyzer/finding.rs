//! Finding model shared by both detectors

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is.
///
/// Variants are declared most severe first, so sorting a list of severities
/// puts `Critical` at the front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which check produced a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    DangerousFunction,
    UnsafeScanfWidth,
    FormatStringVulnerability,
    /// Informational; none of the shipped checks emit it.
    BufferDeclarationTracked,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DangerousFunction => "dangerous_function",
            Category::UnsafeScanfWidth => "unsafe_scanf_width",
            Category::FormatStringVulnerability => "format_string_vulnerability",
            Category::BufferDeclarationTracked => "buffer_declaration_tracked",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported issue.
///
/// `line` is 1-based; 0 means the structural path had no location for the
/// call. `function` is only filled in by the structural path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub category: Category,
    pub line: usize,
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub function: Option<String>,
}

impl Finding {
    pub fn new(
        category: Category,
        line: usize,
        severity: Severity,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            category,
            line,
            message: message.into(),
            suggestion: suggestion.into(),
            severity,
            function: None,
        }
    }

    pub fn in_function(mut self, function: Option<String>) -> Self {
        self.function = function;
        self
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: [{}] {}", self.line, self.severity, self.message)?;
        if let Some(function) = &self.function {
            write!(f, " (in {})", function)?;
        }
        Ok(())
    }
}

/// Finding counts per severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl SeveritySummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for finding in findings {
            summary.record(finding.severity);
        }
        summary
    }

    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
