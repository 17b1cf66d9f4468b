//! Core domain types for sbtm
//!
//! These types describe session sheets (`.SES` files) and the values a scan
//! extracts from them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session sheet** | One exploratory-testing log in the line-oriented `.SES` format |
//! | **Section** | A block opened by an all-caps header such as `CHARTER` or `BUGS` |
//! | **Charter** | The stated testing mission of a session |
//! | **TBS** | The Test design / Bug investigation / session Setup percentage triple |
//! | **C vs O** | Charter-vs-Opportunity split (planned vs. exploratory time) |
//! | **Timebox** | Relative weight of a short, normal or long session |
//! | **N-value** | Person-time metric derived from a session, used for aggregation |
//! | **TODO sheet** | An undated sheet describing planned future work |

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

// ============================================
// Session sheet names
// ============================================

/// Whether a sheet records a completed session or planned work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// A dated session sheet: `et-<initials>-<yymmdd>-<letter>.ses`
    Test,
    /// A TODO sheet: `et-todo-<priority>-<title>.ses`
    Todo,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Test => "test",
            SessionKind::Todo => "todo",
        }
    }

    /// Classify a lower-cased file name.
    pub fn of(file_name: &str) -> Self {
        if file_name.contains("et-todo") {
            SessionKind::Todo
        } else {
            SessionKind::Test
        }
    }
}

/// The date embedded in a session file name (`-yymmdd-`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameDate {
    /// Two-digit year exactly as written
    pub year: String,
    pub month: u32,
    pub day: u32,
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Check a lower-cased name against `et-<2-3 word chars>-<6 digits>-<word char>.ses`.
pub fn is_session_file_name(file_name: &str) -> bool {
    let Some(rest) = file_name.strip_prefix("et-") else {
        return false;
    };
    let Some((initials, rest)) = rest.split_once('-') else {
        return false;
    };
    if !(2..=3).contains(&initials.len()) || !initials.chars().all(is_word_char) {
        return false;
    }
    let Some((date, rest)) = rest.split_once('-') else {
        return false;
    };
    if date.len() != 6 || !date.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut chars = rest.chars();
    matches!(chars.next(), Some(c) if is_word_char(c)) && chars.as_str().starts_with(".ses")
}

/// Extract the first `-yymmdd-` group from a file name.
pub fn file_name_date(file_name: &str) -> Option<FileNameDate> {
    let bytes = file_name.as_bytes();
    (0..bytes.len().saturating_sub(7)).find_map(|i| {
        let window = &bytes[i..i + 8];
        let digits = &window[1..7];
        if window[0] == b'-' && window[7] == b'-' && digits.iter().all(u8::is_ascii_digit) {
            let text = &file_name[i + 1..i + 7];
            Some(FileNameDate {
                year: text[0..2].to_string(),
                month: text[2..4].parse().ok()?,
                day: text[4..6].parse().ok()?,
            })
        } else {
            None
        }
    })
}

/// Priority and title of a TODO sheet (`et-todo-<digit>-<title>.ses`).
pub fn todo_name_parts(file_name: &str) -> Option<(String, String)> {
    let start = file_name.find("et-todo-")?;
    let rest = &file_name[start + "et-todo-".len()..];
    let mut chars = rest.chars();
    let priority = chars.next().filter(char::is_ascii_digit)?;
    let rest = chars.as_str().strip_prefix('-')?;
    let end = rest.rfind(".ses")?;
    let title = &rest[..end];
    if title.is_empty() {
        return None;
    }
    Some((priority.to_string(), title.to_string()))
}

// ============================================
// Sections
// ============================================

/// The eight fixed section kinds of a session sheet, in conventional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionKind {
    Charter,
    Start,
    Tester,
    TaskBreakdown,
    DataFiles,
    TestNotes,
    Bugs,
    Issues,
}

impl SectionKind {
    pub const ALL: [SectionKind; 8] = [
        SectionKind::Charter,
        SectionKind::Start,
        SectionKind::Tester,
        SectionKind::TaskBreakdown,
        SectionKind::DataFiles,
        SectionKind::TestNotes,
        SectionKind::Bugs,
        SectionKind::Issues,
    ];

    /// Header keyword that opens this section. Headers are case-sensitive.
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Charter => "CHARTER",
            SectionKind::Start => "START",
            SectionKind::Tester => "TESTER",
            SectionKind::TaskBreakdown => "TASK BREAKDOWN",
            SectionKind::DataFiles => "DATA FILES",
            SectionKind::TestNotes => "TEST NOTES",
            SectionKind::Bugs => "BUGS",
            SectionKind::Issues => "ISSUES",
        }
    }

    /// Find the section a line opens, if any.
    pub fn from_header_line(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| line.starts_with(kind.header()))
    }

    fn article(&self) -> &'static str {
        match self {
            SectionKind::Issues => "an",
            _ => "a",
        }
    }

    pub(crate) fn missing_message(&self) -> String {
        format!("Missing {} {} section", self.article(), self.header())
    }
}

impl std::fmt::Display for SectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

// ============================================
// Extracted section data
// ============================================

/// Values extracted from the CHARTER section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCharter {
    /// Description lines, trailing blanks trimmed. Empty when missing.
    pub description: Vec<String>,
    /// Accepted `#LTTD_AREA` labels, upper-cased, without duplicates
    pub lttd_areas: Vec<String>,
    /// Accepted `#AREAS` labels, upper-cased, without duplicates
    pub areas: Vec<String>,
    /// Free-text `#BUILD` lines
    pub builds: Vec<String>,
}

/// `#DURATION` class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Short,
    Normal,
    Long,
}

impl DurationClass {
    /// Parse an already lower-cased token.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "short" => Some(DurationClass::Short),
            "normal" => Some(DurationClass::Normal),
            "long" => Some(DurationClass::Long),
            _ => None,
        }
    }
}

/// Raw values read from the TASK BREAKDOWN section.
///
/// Percentages keep whatever integer prefix the sheet supplied, so a value
/// that failed validation still flows into the metrics the same way it did
/// when it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownValues {
    /// `None` when `#DURATION` is missing or not one of short/normal/long
    pub duration_class: Option<DurationClass>,
    /// `#DURATION` multiplier: `1` when the value line omits it, `0` when
    /// there is no value line at all
    pub multiplier: f64,
    pub test_pct: i64,
    pub bug_pct: i64,
    pub setup_pct: i64,
    pub charter_pct: i64,
    pub opportunity_pct: i64,
}

impl Default for BreakdownValues {
    /// Starting point for a breakdown being parsed: no session length until a
    /// `#DURATION` value line is read, and all time is on charter until a
    /// `#CHARTER VS. OPPORTUNITY` line says otherwise.
    fn default() -> Self {
        Self {
            duration_class: None,
            multiplier: 0.0,
            test_pct: 0,
            bug_pct: 0,
            setup_pct: 0,
            charter_pct: 100,
            opportunity_pct: 0,
        }
    }
}

impl BreakdownValues {
    /// Values recorded for a sheet whose breakdown is not scanned.
    pub fn zero() -> Self {
        Self {
            charter_pct: 0,
            ..Self::default()
        }
    }
}

/// Derived person-time metrics for one session (or a sum of sessions).
///
/// Fractional values are intentional: they are summed and split across
/// co-testers during aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub n_total: f64,
    pub n_charter: f64,
    pub n_opportunity: f64,
    pub n_test: f64,
    pub n_bug: f64,
    pub n_prep: f64,
}

impl DerivedMetrics {
    /// Every value divided by `divisor`.
    pub fn divided_by(&self, divisor: f64) -> Self {
        Self {
            n_total: self.n_total / divisor,
            n_charter: self.n_charter / divisor,
            n_opportunity: self.n_opportunity / divisor,
            n_test: self.n_test / divisor,
            n_bug: self.n_bug / divisor,
            n_prep: self.n_prep / divisor,
        }
    }
}

impl AddAssign for DerivedMetrics {
    fn add_assign(&mut self, other: Self) {
        self.n_total += other.n_total;
        self.n_charter += other.n_charter;
        self.n_opportunity += other.n_opportunity;
        self.n_test += other.n_test;
        self.n_bug += other.n_bug;
        self.n_prep += other.n_prep;
    }
}

/// A TASK BREAKDOWN with its computed duration and N-values.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBreakdown {
    pub values: BreakdownValues,
    /// Session length in normal-session units (timebox weight x multiplier)
    pub duration: f64,
    pub metrics: DerivedMetrics,
}

impl SessionBreakdown {
    /// Breakdown recorded when the section is absent or not scanned.
    pub fn zero() -> Self {
        Self {
            values: BreakdownValues::zero(),
            duration: 0.0,
            metrics: DerivedMetrics::default(),
        }
    }
}

/// Content of a section that accepts `#N/A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionContent<T> {
    /// Only `#N/A` was given
    NotApplicable,
    /// Real content
    Present(T),
    /// Content could not be used (empty, or mixed with `#N/A`)
    Invalid,
}

/// One `#BUG` or `#ISSUE` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemEntry {
    /// Body lines, trailing blank lines trimmed
    pub body: Vec<String>,
    /// ID written after the marker on the same line, or empty
    pub id: String,
}


// ============================================
// Session records
// ============================================

/// Everything the aggregation engine needs to know about one dated sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    /// Lower-cased file name, the record's key
    pub file_name: String,
    pub started_at: NaiveDateTime,
    pub breakdown: SessionBreakdown,
    pub bugs: usize,
    pub issues: usize,
    pub tester_count: usize,
}

impl SessionRecord {
    pub fn metrics(&self) -> &DerivedMetrics {
        &self.breakdown.metrics
    }

    pub fn date(&self) -> chrono::NaiveDate {
        self.started_at.date()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_kind_of() {
        assert_eq!(SessionKind::of("et-pc-240115-a.ses"), SessionKind::Test);
        assert_eq!(SessionKind::of("et-todo-1-login.ses"), SessionKind::Todo);
    }

    #[test]
    fn test_is_session_file_name() {
        assert!(is_session_file_name("et-pc-240115-a.ses"));
        assert!(is_session_file_name("et-abc-240115-z.ses"));
        assert!(!is_session_file_name("et-p-240115-a.ses"));
        assert!(!is_session_file_name("et-abcd-240115-a.ses"));
        assert!(!is_session_file_name("et-pc-24011-a.ses"));
        assert!(!is_session_file_name("et-pc-240115-ab.ses"));
        assert!(!is_session_file_name("notes.ses"));
    }

    #[test]
    fn test_file_name_date() {
        let date = file_name_date("et-pc-240115-a.ses").unwrap();
        assert_eq!(date.year, "24");
        assert_eq!(date.month, 1);
        assert_eq!(date.day, 15);

        assert!(file_name_date("et-todo-1-login.ses").is_none());
    }

    #[test]
    fn test_todo_name_parts() {
        assert_eq!(
            todo_name_parts("et-todo-2-checkout-flow.ses"),
            Some(("2".to_string(), "checkout-flow".to_string()))
        );
        assert!(todo_name_parts("et-todo-x-title.ses").is_none());
        assert!(todo_name_parts("et-todo-1-.ses").is_none());
    }

    #[test]
    fn test_section_header_detection() {
        assert_eq!(
            SectionKind::from_header_line("TEST NOTES"),
            Some(SectionKind::TestNotes)
        );
        assert_eq!(
            SectionKind::from_header_line("TESTER"),
            Some(SectionKind::Tester)
        );
        assert_eq!(
            SectionKind::from_header_line("TASK BREAKDOWN\n"),
            Some(SectionKind::TaskBreakdown)
        );
        assert_eq!(SectionKind::from_header_line("charter"), None);
        assert_eq!(SectionKind::from_header_line(" BUGS"), None);
    }

    #[test]
    fn test_missing_message_article() {
        assert_eq!(
            SectionKind::Issues.missing_message(),
            "Missing an ISSUES section"
        );
        assert_eq!(
            SectionKind::Charter.missing_message(),
            "Missing a CHARTER section"
        );
    }

    #[test]
    fn test_derived_metrics_arithmetic() {
        let mut sum = DerivedMetrics::default();
        let one = DerivedMetrics {
            n_total: 2.0,
            n_charter: 2.0,
            n_opportunity: 0.0,
            n_test: 1.0,
            n_bug: 0.5,
            n_prep: 0.5,
        };
        sum += one;
        sum += one;
        assert_eq!(sum.n_total, 4.0);

        let half = sum.divided_by(2.0);
        assert_eq!(half, one);
    }
}
