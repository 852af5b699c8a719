//! Catalog of dangerous C library functions
//!
//! The catalog is built once per process on first use and is read-only
//! afterwards. Iteration follows the declaration order below, which keeps
//! same-line findings from the lexical scanner in a stable order.

use crate::analyzer::finding::Severity;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

/// Functions whose first argument is a format string.
pub const FORMAT_FUNCTIONS: [&str; 5] = ["printf", "fprintf", "sprintf", "snprintf", "syslog"];

/// Functions of the `exec` family that share one message template.
const EXEC_VARIANTS: [&str; 5] = ["execl", "execlp", "execle", "execv", "execvp"];

/// One catalog row: what to report when `name` is called.
#[derive(Debug, Clone)]
pub struct DangerEntry {
    pub name: &'static str,
    pub severity: Severity,
    pub message: String,
    pub suggestion: String,
    call_pattern: Regex,
}

impl DangerEntry {
    fn new(name: &'static str, severity: Severity, message: String, suggestion: &str) -> Self {
        let call_pattern = Regex::new(&format!(r"\b{}\s*\(", regex::escape(name)))
            .expect("Invalid regex");
        Self {
            name,
            severity,
            message,
            suggestion: suggestion.to_string(),
            call_pattern,
        }
    }

    /// Whether `line` contains a call of this function, matched as a whole
    /// word followed by `(`.
    pub fn is_called_in(&self, line: &str) -> bool {
        self.call_pattern.is_match(line)
    }
}

/// Ordered, name-indexed set of [`DangerEntry`] rows
#[derive(Debug)]
pub struct DangerCatalog {
    entries: Vec<DangerEntry>,
    index: FxHashMap<&'static str, usize>,
}

impl DangerCatalog {
    fn build() -> Self {
        let mut entries = vec![
            DangerEntry::new(
                "gets",
                Severity::High,
                "Use of dangerous function gets() can cause buffer overflow".to_string(),
                "Use fgets() with proper buffer size instead",
            ),
            DangerEntry::new(
                "strcpy",
                Severity::High,
                "Use of strcpy() can cause buffer overflow".to_string(),
                "Use strncpy() or strlcpy() with proper bounds checking",
            ),
            DangerEntry::new(
                "strcat",
                Severity::High,
                "Use of strcat() can cause buffer overflow".to_string(),
                "Use strncat() or strlcat() with proper bounds checking",
            ),
            DangerEntry::new(
                "sprintf",
                Severity::High,
                "Use of sprintf() can cause buffer overflow".to_string(),
                "Use snprintf() with proper buffer size",
            ),
            DangerEntry::new(
                "scanf",
                Severity::Medium,
                "Use of scanf() without field width can cause buffer overflow".to_string(),
                "Use scanf with field width specifier (e.g., %10s) or fgets()",
            ),
            DangerEntry::new(
                "system",
                Severity::Critical,
                "Use of system() can lead to command injection".to_string(),
                "Use execve() family functions with proper input validation",
            ),
            DangerEntry::new(
                "popen",
                Severity::Critical,
                "Use of popen() can lead to command injection".to_string(),
                "Use safer alternatives with proper input validation",
            ),
            DangerEntry::new(
                "exec",
                Severity::Critical,
                "Use of exec*() functions can be dangerous with user input".to_string(),
                "Validate and sanitize all input before using exec functions",
            ),
        ];

        for name in EXEC_VARIANTS {
            entries.push(DangerEntry::new(
                name,
                Severity::Critical,
                format!("Use of {}() can be dangerous with user input", name),
                "Validate and sanitize all input",
            ));
        }

        entries.push(DangerEntry::new(
            "execve",
            Severity::Medium,
            "Use of execve() - ensure proper input validation".to_string(),
            "This is safer than other exec functions but still validate input",
        ));

        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.name, i))
            .collect();

        Self { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&DangerEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &DangerEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static CATALOG: Lazy<DangerCatalog> = Lazy::new(DangerCatalog::build);

/// The process-wide catalog.
pub fn catalog() -> &'static DangerCatalog {
    &CATALOG
}
