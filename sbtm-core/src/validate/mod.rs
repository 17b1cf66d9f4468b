//! Section validators
//!
//! Every section kind has a validator that turns the section's raw lines into
//! extracted data plus diagnostics. Validators are pure: they never write
//! output tables and never touch the diagnostics sink. The only outside state
//! they read is the filesystem (DATA FILES entries must exist).
//!
//! ```text
//!   SessionSheet ──lines──► SectionValidator ──► Checked<Output>
//!                                 ▲                 ├─ value
//!                           SheetContext            └─ diagnostics
//! ```

mod breakdown;
mod charter;
mod items;
mod notes;
mod start;
mod tester;

pub use breakdown::BreakdownValidator;
pub use charter::CharterValidator;
pub use items::{record_count, ItemKind, ItemsValidator};
pub use notes::{DataFilesValidator, TestNotesValidator};
pub use start::{parse_timestamp, StartValidator};
pub use tester::TesterValidator;

use crate::config::{AllowLists, ScanOptions, TimeboxConfig};
use crate::diagnostics::Checked;
use crate::types::{SectionKind, SessionKind};
use std::path::Path;

/// Everything a validator may consult besides the section's own lines.
pub struct SheetContext<'a> {
    /// Lower-cased file name of the sheet
    pub file_name: &'a str,
    /// Dated session or TODO sheet
    pub kind: SessionKind,
    pub options: &'a ScanOptions,
    pub timebox: &'a TimeboxConfig,
    pub allow_lists: &'a AllowLists,
    /// Directory DATA FILES entries are resolved against
    pub data_dir: &'a Path,
}

/// Validator for one section kind.
pub trait SectionValidator {
    /// Data extracted from a section
    type Output;

    /// The section this validator reads.
    fn section(&self) -> SectionKind;

    /// Validate a section's lines.
    ///
    /// Problems in the sheet are reported as diagnostics; the returned value
    /// always carries whatever could be extracted.
    fn validate(&self, lines: &[String], ctx: &SheetContext) -> Checked<Self::Output>;
}

// ============================================
// Line helpers
// ============================================

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Line contains at least one word character.
pub(crate) fn has_word(line: &str) -> bool {
    line.chars().any(is_word_char)
}

/// Non-blank lines, trimmed.
pub(crate) fn trimmed_lines(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Non-blank lines, as written.
pub(crate) fn non_blank_lines(lines: &[String]) -> Vec<&str> {
    lines
        .iter()
        .map(String::as_str)
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// ASCII case-insensitive `starts_with`.
pub(crate) fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.len() >= prefix.len()
        && line.is_char_boundary(prefix.len())
        && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}

/// `#N/A` marker at the start of a line.
pub(crate) fn is_not_applicable(line: &str) -> bool {
    starts_with_ignore_case(line, "#N/A")
}

/// Drop trailing blank lines.
pub(crate) fn trim_trailing_blanks(lines: &mut Vec<String>) {
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
}

// ============================================
// Lenient number parsing
// ============================================

/// Integer prefix of a string: leading whitespace, optional sign, digits.
/// Returns 0 when there are no digits.
pub(crate) fn leading_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    let value = digits.parse::<i64>().unwrap_or(if digits.is_empty() { 0 } else { i64::MAX });
    if negative {
        -value
    } else {
        value
    }
}

/// Decimal prefix of a string (`2.5x` is 2.5). Returns 0.0 when nothing parses.
pub(crate) fn leading_float(text: &str) -> f64 {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-') | Some(b'+')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == int_start {
        return 0.0;
    }
    if end + 1 < bytes.len() && bytes[end] == b'.' && bytes[end + 1].is_ascii_digit() {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    text[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("70"), 70);
        assert_eq!(leading_int(" 7x"), 7);
        assert_eq!(leading_int("-5"), -5);
        assert_eq!(leading_int("abc"), 0);
        assert_eq!(leading_int(""), 0);
    }

    #[test]
    fn test_leading_float() {
        assert_eq!(leading_float("1.5"), 1.5);
        assert_eq!(leading_float("2"), 2.0);
        assert_eq!(leading_float("2."), 2.0);
        assert_eq!(leading_float("0.25 hrs"), 0.25);
        assert_eq!(leading_float("x"), 0.0);
    }

    #[test]
    fn test_starts_with_ignore_case() {
        assert!(starts_with_ignore_case("#bug 12", "#BUG"));
        assert!(starts_with_ignore_case("#n/a", "#N/A"));
        assert!(!starts_with_ignore_case("#N", "#N/A"));
        assert!(!starts_with_ignore_case("é#N/A", "#N/A"));
    }

    #[test]
    fn test_trim_trailing_blanks() {
        let mut lines = vec!["a".to_string(), "".to_string(), "  ".to_string()];
        trim_trailing_blanks(&mut lines);
        assert_eq!(lines, vec!["a"]);
    }

    #[test]
    fn test_line_selection() {
        let lines = vec!["  Paul ".to_string(), "   ".to_string(), "Sam".to_string()];
        assert_eq!(trimmed_lines(&lines), vec!["Paul", "Sam"]);
        assert_eq!(non_blank_lines(&lines), vec!["  Paul ", "Sam"]);
    }
}
