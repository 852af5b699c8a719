//! Security analysis of C source
//!
//! Two detectors share one finding model:
//! - [`StructuralDetector`]: parses the source and walks the syntax tree,
//!   attributing each finding to its enclosing function
//! - [`LexicalDetector`]: pattern checks on raw lines; never fails
//!
//! [`Analyzer`] picks one according to [`AnalyzerOptions`]. When the
//! structural parse fails it either reruns the input through the lexical
//! scanner, recording the parse error in the [`Report`], or returns the
//! error, so a failed parse is never mistaken for a clean file.
//!
//! # Example
//!
//! ```
//! use csentry::analyzer::{Analyzer, AnalyzerOptions, Strategy};
//!
//! let mut analyzer = Analyzer::new(AnalyzerOptions {
//!     strategy: Strategy::Structural,
//!     fallback_on_parse_error: true,
//! });
//! let report = analyzer.analyze("int main() { gets(buf); }").unwrap();
//! assert_eq!(report.findings[0].function.as_deref(), Some("main"));
//! ```

pub mod catalog;
pub mod finding;
pub mod lexical;
pub mod structural;

pub use catalog::{catalog, DangerCatalog, DangerEntry, FORMAT_FUNCTIONS};
pub use finding::{Category, Finding, Severity, SeveritySummary};
pub use lexical::{TrackedVariable, VariableKind, VariableTable};

use crate::parser::ast::SyntaxNode;
use crate::parser::parse::{ParseError, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal analysis failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("structural analysis failed: {0}")]
    Parse(#[from] ParseError),
}

/// Which detector produced a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Structural,
    #[default]
    Lexical,
}

impl Strategy {
    /// Map a "use the parser" switch onto a strategy.
    pub fn from_structural_flag(structural: bool) -> Self {
        if structural {
            Strategy::Structural
        } else {
            Strategy::Lexical
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerOptions {
    pub strategy: Strategy,
    /// Rerun a source that fails to parse through the lexical scanner.
    pub fallback_on_parse_error: bool,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Lexical,
            fallback_on_parse_error: true,
        }
    }
}

/// Findings accumulated by one analysis, plus the lexical buffer table
#[derive(Debug, Clone, Default)]
pub struct AnalysisRun {
    findings: Vec<Finding>,
    variables: VariableTable,
}

impl AnalysisRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn summary(&self) -> SeveritySummary {
        SeveritySummary::from_findings(&self.findings)
    }

    pub fn findings_by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .collect()
    }

    /// Drop all findings and tracked buffers.
    pub fn clear(&mut self) {
        self.findings.clear();
        self.variables.clear();
    }
}

/// A finding source over C text
pub trait Detector: Send + Sync {
    fn name(&self) -> &'static str;

    /// Analyze `source`, appending to `run`.
    fn detect(&self, source: &str, run: &mut AnalysisRun) -> Result<(), AnalysisError>;
}

/// Parse, then walk the syntax tree
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralDetector;

impl StructuralDetector {
    /// Walk an already parsed tree.
    pub fn detect_tree(&self, tree: &SyntaxNode, run: &mut AnalysisRun) {
        structural::analyze_tree(tree, &mut run.findings);
    }
}

impl Detector for StructuralDetector {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn detect(&self, source: &str, run: &mut AnalysisRun) -> Result<(), AnalysisError> {
        let mut parser = Parser::new(source);
        let tree = parser.parse_translation_unit()?;
        if !parser.lex_diagnostics().is_empty() {
            log::debug!(
                "{} characters skipped while tokenizing",
                parser.lex_diagnostics().len()
            );
        }
        self.detect_tree(&tree, run);
        Ok(())
    }
}

/// Line pattern scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalDetector;

impl Detector for LexicalDetector {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn detect(&self, source: &str, run: &mut AnalysisRun) -> Result<(), AnalysisError> {
        lexical::scan_source(source, &mut run.findings, &mut run.variables);
        Ok(())
    }
}

/// Result of [`Analyzer::analyze`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Detector that produced `findings`; `Lexical` after a fallback.
    pub strategy: Strategy,
    pub findings: Vec<Finding>,
    pub summary: SeveritySummary,
    /// Set when the structural parse failed and the lexical scanner ran instead.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parse_error: Option<ParseError>,
}

impl Report {
    pub fn fell_back(&self) -> bool {
        self.parse_error.is_some()
    }
}

/// Strategy selection and fallback around the two detectors
#[derive(Debug, Default)]
pub struct Analyzer {
    options: AnalyzerOptions,
    run: AnalysisRun,
    structural: StructuralDetector,
    lexical: LexicalDetector,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &AnalyzerOptions {
        &self.options
    }

    /// Analyze `source` from a clean state with the configured strategy.
    pub fn analyze(&mut self, source: &str) -> Result<Report, AnalysisError> {
        self.run.clear();

        if self.options.strategy == Strategy::Lexical {
            self.lexical.detect(source, &mut self.run)?;
            return Ok(self.report(Strategy::Lexical, None));
        }

        match self.structural.detect(source, &mut self.run) {
            Ok(()) => Ok(self.report(Strategy::Structural, None)),
            Err(AnalysisError::Parse(err)) if self.options.fallback_on_parse_error => {
                log::warn!("{}; falling back to lexical scan", err);
                self.run.clear();
                self.lexical.detect(source, &mut self.run)?;
                Ok(self.report(Strategy::Lexical, Some(err)))
            }
            Err(err) => Err(err),
        }
    }

    /// Run the structural walk over `tree` without clearing earlier findings.
    pub fn analyze_tree(&mut self, tree: &SyntaxNode) {
        self.structural.detect_tree(tree, &mut self.run);
    }

    /// Run the lexical scanner over `source` without clearing earlier findings.
    pub fn analyze_source(&mut self, source: &str) -> Result<(), AnalysisError> {
        self.lexical.detect(source, &mut self.run)
    }

    pub fn findings(&self) -> &[Finding] {
        self.run.findings()
    }

    pub fn variables(&self) -> &VariableTable {
        self.run.variables()
    }

    pub fn summary(&self) -> SeveritySummary {
        self.run.summary()
    }

    pub fn findings_by_severity(&self, severity: Severity) -> Vec<&Finding> {
        self.run.findings_by_severity(severity)
    }

    pub fn clear(&mut self) {
        self.run.clear();
    }

    fn report(&self, strategy: Strategy, parse_error: Option<ParseError>) -> Report {
        let findings = self.run.findings().to_vec();
        log::debug!(
            "{} analysis finished with {} findings",
            strategy_name(strategy),
            findings.len()
        );
        Report {
            strategy,
            summary: SeveritySummary::from_findings(&findings),
            findings,
            parse_error,
        }
    }
}

fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Structural => StructuralDetector.name(),
        Strategy::Lexical => LexicalDetector.name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse::parse;

    fn structural(fallback: bool) -> Analyzer {
        Analyzer::new(AnalyzerOptions {
            strategy: Strategy::Structural,
            fallback_on_parse_error: fallback,
        })
    }

    #[test]
    fn test_default_options() {
        let options = AnalyzerOptions::default();
        assert_eq!(options.strategy, Strategy::Lexical);
        assert!(options.fallback_on_parse_error);
        assert_eq!(Strategy::from_structural_flag(true), Strategy::Structural);
        assert_eq!(Strategy::from_structural_flag(false), Strategy::Lexical);
    }

    #[test]
    fn test_structural_report() {
        let report = structural(true)
            .analyze("void f() {\n  system(cmd);\n  gets(buf);\n}")
            .unwrap();
        assert_eq!(report.strategy, Strategy::Structural);
        assert!(!report.fell_back());
        assert_eq!(report.summary.critical, 1);
        assert_eq!(report.summary.high, 1);
        assert_eq!(report.summary.total, 2);
    }

    #[test]
    fn test_fallback_records_parse_error() {
        let report = structural(true).analyze("int main() {\n  gets(buf);\n").unwrap();
        assert_eq!(report.strategy, Strategy::Lexical);
        assert!(matches!(report.parse_error, Some(ParseError::UnexpectedEof { .. })));
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].line, 2);
    }

    #[test]
    fn test_no_fallback_returns_error() {
        let mut analyzer = structural(false);
        let err = analyzer.analyze("int main() { gets(buf);").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
        assert!(analyzer.findings().is_empty());
    }

    #[test]
    fn test_analyze_resets_state() {
        let mut analyzer = Analyzer::default();
        analyzer.analyze("char buf[10];\ngets(buf);").unwrap();
        assert_eq!(analyzer.variables().len(), 1);

        let report = analyzer.analyze("int x;").unwrap();
        assert!(report.findings.is_empty());
        assert!(analyzer.variables().is_empty());
    }

    #[test]
    fn test_accumulating_entry_points() {
        let mut analyzer = Analyzer::default();
        let tree = parse("void f() { popen(c, m); }").unwrap();
        analyzer.analyze_tree(&tree);
        analyzer.analyze_source("strcat(a, b);").unwrap();

        assert_eq!(analyzer.findings().len(), 2);
        assert_eq!(analyzer.findings_by_severity(Severity::Critical).len(), 1);
        assert_eq!(analyzer.findings_by_severity(Severity::High).len(), 1);
        assert_eq!(analyzer.summary().total, 2);

        analyzer.clear();
        assert!(analyzer.findings().is_empty());
    }

    #[test]
    fn test_detector_names() {
        let detectors: Vec<Box<dyn Detector>> =
            vec![Box::new(StructuralDetector), Box::new(LexicalDetector)];
        let names: Vec<&str> = detectors.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["structural", "lexical"]);
    }
}
