//! # Introduction
//!
//! csentry finds insecure coding patterns in C source: unbounded string
//! copies, calls that hand text to a shell, format strings that are not
//! literals and `scanf("%s")` without a field width. Every finding carries a
//! line, a severity, a message and a remediation hint.
//!
//! ## Analysis pipeline
//!
//! ```text
//! Source → Lexer → Parser → SyntaxNode tree → structural walk ─┐
//!    │                                                         ├→ Findings
//!    └──────────────────────────────→ lexical line scanner ────┘
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds a generic syntax tree for
//!    a subset of C.
//! 2. [`analyzer`]: the danger catalog, the two detectors and the
//!    [`analyzer::Analyzer`] facade that chooses between them and falls
//!    back from the tree walk to the line scanner when parsing fails.
//!
//! The crate logs through the [`log`] facade and installs no logger.
//!
//! ## Supported C subset
//!
//! Declarations with storage classes, qualifiers, pointers, arrays,
//! `struct`/`union`/`enum` and heuristic typedef names; function
//! definitions including K&R style. Statements: blocks, `if/else`, `while`,
//! `return`, labels and expression statements. Preprocessor lines are
//! skipped, never expanded.

pub mod analyzer;
pub mod parser;

pub use analyzer::{
    AnalysisError, Analyzer, AnalyzerOptions, Category, Finding, Report, Severity,
    SeveritySummary, Strategy,
};
pub use parser::{parse, ParseError, SyntaxNode};
