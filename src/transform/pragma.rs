//! Line-pragma suppression (spec.md §4.3 "Comment-pragma suppression",
//! §6 "Line pragmas").
//!
//! `// mutflow:ignore <reason>` or `// mutflow:falsePositive <reason>`:
//! inline on a code line suppresses that line; standalone (the line
//! begins, ignoring whitespace, with `//`) suppresses the *next* line.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static PRAGMA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"//.*mutflow:(ignore|falsePositive)\b").expect("valid regex"));

/// The set of 1-based line numbers suppressed for one source file.
#[derive(Debug, Clone, Default)]
pub struct SuppressedLines(HashSet<u32>);

impl SuppressedLines {
    pub fn contains(&self, line: u32) -> bool {
        self.0.contains(&line)
    }
}

/// Scan `content` once for pragma comments and compute the suppressed
/// line set.
pub fn scan(content: &str) -> SuppressedLines {
    let mut suppressed = HashSet::new();
    for (idx, line) in content.lines().enumerate() {
        let line_number = (idx + 1) as u32;
        if !PRAGMA.is_match(line) {
            continue;
        }
        if line.trim_start().starts_with("//") {
            suppressed.insert(line_number + 1);
        } else {
            suppressed.insert(line_number);
        }
    }
    SuppressedLines(suppressed)
}
