//! Line-oriented pattern scanner
//!
//! Works on raw text, so it still produces findings when the input does not
//! parse. Each non-comment line is run through four independent checks:
//! dangerous calls, unsized `scanf("%s")`, `char` buffer declarations and
//! non-literal format strings.

use crate::analyzer::catalog::{catalog, FORMAT_FUNCTIONS};
use crate::analyzer::finding::{Category, Finding, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

static SCANF_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"scanf\s*\([^)]*%s[^)]*\)").expect("Invalid regex"));
static SCANF_BOUNDED_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"scanf\s*\([^)]*%\d+s[^)]*\)").expect("Invalid regex"));
static CHAR_ARRAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"char\s+(\w+)\s*\[(\d*)\]").expect("Invalid regex"));
static CHAR_POINTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"char\s*\*\s*(\w+)").expect("Invalid regex"));

/// `\bNAME\s*\(\s*(\w+)[^)]*\)` per format function: a call whose first
/// argument is a bare word rather than a string literal, closed on the same
/// line.
static FORMAT_CALLS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FORMAT_FUNCTIONS
        .iter()
        .map(|&name| {
            let pattern = format!(r"\b{}\s*\(\s*(\w+)[^)]*\)", regex::escape(name));
            (name, Regex::new(&pattern).expect("Invalid regex"))
        })
        .collect()
});

/// Declared shape of a tracked `char` variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    CharArray,
    CharPointer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedVariable {
    pub kind: VariableKind,
    /// Declared array length; `None` for pointers and `char x[]`.
    pub size: Option<usize>,
    pub line: usize,
}

/// `char` buffers seen by the scanner, keyed by name.
///
/// The last declaration of a name wins. Nothing in the shipped checks reads
/// the table back; it is exposed for callers.
#[derive(Debug, Clone, Default)]
pub struct VariableTable {
    variables: FxHashMap<String, TrackedVariable>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: impl Into<String>, variable: TrackedVariable) {
        self.variables.insert(name.into(), variable);
    }

    pub fn get(&self, name: &str) -> Option<&TrackedVariable> {
        self.variables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedVariable)> {
        self.variables.iter().map(|(name, var)| (name.as_str(), var))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

/// Scan `source` line by line, appending findings and recording buffers.
pub fn scan_source(source: &str, findings: &mut Vec<Finding>, variables: &mut VariableTable) {
    let before = findings.len();
    let mut in_block_comment = false;

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();

        if in_block_comment {
            in_block_comment = ends_inside_comment(line, true);
            continue;
        }
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if line.starts_with("/*") {
            in_block_comment = ends_inside_comment(line, false);
            continue;
        }

        scan_line(line, index + 1, findings, variables);
    }

    log::debug!(
        "lexical pass produced {} findings, tracking {} buffers",
        findings.len() - before,
        variables.len()
    );
}

/// Whether a block comment is still open at the end of `line`, given
/// whether one was open at its start.
fn ends_inside_comment(line: &str, mut open: bool) -> bool {
    let mut rest = line;
    loop {
        let marker = if open { "*/" } else { "/*" };
        match rest.find(marker) {
            Some(at) => {
                rest = &rest[at + marker.len()..];
                open = !open;
            }
            None => return open,
        }
    }
}

fn scan_line(
    line: &str,
    line_no: usize,
    findings: &mut Vec<Finding>,
    variables: &mut VariableTable,
) {
    check_dangerous_calls(line, line_no, findings);
    check_scanf_width(line, line_no, findings);
    track_buffers(line, line_no, variables);
    check_format_strings(line, line_no, findings);
}

fn check_dangerous_calls(line: &str, line_no: usize, findings: &mut Vec<Finding>) {
    for entry in catalog().iter().filter(|entry| entry.is_called_in(line)) {
        log::trace!("line {}: call to {}", line_no, entry.name);
        findings.push(Finding::new(
            Category::DangerousFunction,
            line_no,
            entry.severity,
            entry.message.clone(),
            entry.suggestion.clone(),
        ));
    }
}

fn check_scanf_width(line: &str, line_no: usize, findings: &mut Vec<Finding>) {
    if SCANF_STRING.is_match(line) && !SCANF_BOUNDED_STRING.is_match(line) {
        log::trace!("line {}: scanf %s without width", line_no);
        findings.push(Finding::new(
            Category::UnsafeScanfWidth,
            line_no,
            Severity::Medium,
            "scanf() with %s format specifier without width limit",
            "Use field width specifier like %10s or use fgets() instead",
        ));
    }
}

fn track_buffers(line: &str, line_no: usize, variables: &mut VariableTable) {
    if let Some(caps) = CHAR_ARRAY.captures(line) {
        variables.record(
            &caps[1],
            TrackedVariable {
                kind: VariableKind::CharArray,
                size: caps[2].parse().ok(),
                line: line_no,
            },
        );
    }

    if let Some(caps) = CHAR_POINTER.captures(line) {
        variables.record(
            &caps[1],
            TrackedVariable {
                kind: VariableKind::CharPointer,
                size: None,
                line: line_no,
            },
        );
    }
}

fn check_format_strings(line: &str, line_no: usize, findings: &mut Vec<Finding>) {
    for (name, pattern) in FORMAT_CALLS.iter() {
        if pattern.is_match(line) {
            log::trace!("line {}: {} with non-literal format", line_no, name);
            findings.push(Finding::new(
                Category::FormatStringVulnerability,
                line_no,
                Severity::High,
                format!("Potential format string vulnerability in {}()", name),
                format!("Use {} with literal format string or validate input", name),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Finding>, VariableTable) {
        let mut findings = Vec::new();
        let mut variables = VariableTable::new();
        scan_source(source, &mut findings, &mut variables);
        (findings, variables)
    }

    fn categories(findings: &[Finding]) -> Vec<Category> {
        findings.iter().map(|f| f.category).collect()
    }

    #[test]
    fn test_every_catalog_entry_detected() {
        for entry in catalog().iter() {
            let (findings, _) = scan(&format!("{}(arg);", entry.name));
            assert!(
                findings.iter().any(|f| {
                    f.category == Category::DangerousFunction && f.severity == entry.severity
                }),
                "no finding for {}",
                entry.name
            );
        }
    }

    #[test]
    fn test_scanf_width() {
        let (findings, _) = scan("scanf(\"%s\", buf);");
        assert_eq!(
            categories(&findings),
            vec![Category::DangerousFunction, Category::UnsafeScanfWidth]
        );

        let (findings, _) = scan("scanf(\"%10s\", buf);");
        assert_eq!(categories(&findings), vec![Category::DangerousFunction]);
    }

    #[test]
    fn test_format_string() {
        let (findings, _) = scan("printf(fmt);");
        assert_eq!(categories(&findings), vec![Category::FormatStringVulnerability]);
        assert_eq!(findings[0].message, "Potential format string vulnerability in printf()");
        assert_eq!(
            findings[0].suggestion,
            "Use printf with literal format string or validate input"
        );

        let (findings, _) = scan("printf(\"literal %d\\n\", x);");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_sprintf_does_not_count_as_printf() {
        let (findings, _) = scan("sprintf(out, \"%d\", n);");
        let messages: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "Use of sprintf() can cause buffer overflow",
                "Potential format string vulnerability in sprintf()",
            ]
        );
    }

    #[test]
    fn test_comments_and_blank_lines_skipped() {
        let source = "\n// gets(a);\n/* system(cmd); */\n/*\n strcpy(a, b);\n*/\n   \n";
        let (findings, _) = scan(source);
        assert!(findings.is_empty());

        let (findings, _) = scan("");
        assert!(findings.is_empty());
    }

    #[test]
    fn test_comment_reopened_on_same_line() {
        let source = "/* header */ /* usage:\n   gets(buf);\n   system(cmd);\n*/\n";
        let (findings, _) = scan(source);
        assert!(findings.is_empty());

        let (findings, _) = scan("/* a */ /* b */\ngets(buf);");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 2);

        let (findings, _) = scan("/* a\n b */ /* c\n system(cmd);\n*/\ngets(buf);");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 5);
    }

    #[test]
    fn test_format_call_must_close_on_line() {
        let (findings, _) = scan("printf(fmt,\n       value);");
        assert!(findings.is_empty());

        let (findings, _) = scan("snprintf(out, sizeof(out), \"%s\", name);");
        assert_eq!(categories(&findings), vec![Category::FormatStringVulnerability]);
    }

    #[test]
    fn test_code_after_closed_comment_is_scanned() {
        let (findings, _) = scan("/* start\n end */\ngets(buf);");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].line, 3);
    }

    #[test]
    fn test_buffer_tracking() {
        let (findings, variables) =
            scan("char buf[64];\nchar *name = argv[1];\nchar tail[];\nchar buf[8];");
        assert!(findings.is_empty());
        assert_eq!(variables.len(), 3);

        let buf = variables.get("buf").unwrap();
        assert_eq!(buf.kind, VariableKind::CharArray);
        assert_eq!(buf.size, Some(8));
        assert_eq!(buf.line, 4);

        assert_eq!(variables.get("name").unwrap().kind, VariableKind::CharPointer);
        assert_eq!(variables.get("tail").unwrap().size, None);
    }

    #[test]
    fn test_line_numbers_follow_input() {
        let (findings, _) =
            scan("int main() {\n    char buf[10];\n    gets(buf);\n    system(buf);\n}");
        let lines: Vec<usize> = findings.iter().map(|f| f.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert_eq!(findings[1].severity, Severity::Critical);
        assert_eq!(findings[0].function, None);
    }
}
