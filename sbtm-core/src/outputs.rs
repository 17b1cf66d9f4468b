//! Names and header rows of the files a scan writes to the metrics directory.
//!
//! Column sets are fixed: the report pages read these files by position.

pub const CHARTERS: &str = "charters.txt";
pub const BUILDS: &str = "builds.txt";
pub const TESTERS: &str = "testers.txt";
pub const DATA: &str = "data.txt";
pub const TEST_NOTES: &str = "testnotes.txt";
pub const BUGS: &str = "bugs.txt";
pub const ISSUES: &str = "issues.txt";
pub const CHARTERS_TODO: &str = "charters-todo.txt";

pub const BREAKDOWNS: &str = "breakdowns.txt";
pub const BREAKDOWNS_DAY: &str = "breakdowns-day.txt";
pub const BREAKDOWNS_TESTER_DAY: &str = "breakdowns-tester-day.txt";
pub const BREAKDOWNS_TESTERS_TOTAL: &str = "breakdowns-testers-total.txt";
pub const BREAKDOWNS_TESTERS_SESSIONS: &str = "breakdowns-testers-sessions.txt";
pub const BREAKDOWNS_COVERAGE_SESSIONS: &str = "breakdowns-coverage-sessions.txt";
pub const BREAKDOWNS_COVERAGE_TOTAL: &str = "breakdowns-coverage-total.txt";

/// Written by `sbtm-search` next to the sheets it searched.
pub const SEARCH_RESULTS: &str = "search_results_sheets.txt";

pub const CHARTERS_HEADER: &[&str] = &["Session", "Field", "Value"];
pub const BUILDS_HEADER: &[&str] = &["Session", "Build ID"];
pub const TESTERS_HEADER: &[&str] = &["Session", "Tester"];
pub const DATA_HEADER: &[&str] = &["Session", "Files"];
pub const TEST_NOTES_HEADER: &[&str] = &["Session", "Notes"];
pub const BUGS_HEADER: &[&str] = &["Session", "Bugs", "ID"];
pub const ISSUES_HEADER: &[&str] = &["Session", "Issues", "ID"];
pub const CHARTERS_TODO_HEADER: &[&str] = &["Title", "Area", "Priority", "Description"];

/// One row per session.
pub const SESSION_HEADER: [&str; 18] = [
    "Session",
    "Start",
    "Time",
    "Duration",
    "On Charter",
    "On Opportunity",
    "Test",
    "Bug",
    "Setup",
    "N Total",
    "N On Charter",
    "N Opportunity",
    "N Test",
    "N Bug",
    "N Setup",
    "Bugs",
    "Issues",
    "Testers",
];

/// The summed columns shared by every totals table.
pub const TOTALS_COLUMNS: [&str; 8] = [
    "Total",
    "On Charter",
    "Opportunity",
    "Test",
    "Bug",
    "Setup",
    "Bugs",
    "Issues",
];

/// Placeholder for a `#N/A` section in the per-record tables.
pub const EMPTY_FIELD: &str = "<empty>";

/// Placeholder in `charters-todo.txt` for a missing area or description.
pub const EMPTY_OR_MISSING: &str = "<empty or missing>";

/// `prefix` + `columns` + `suffix` as one header row.
pub fn header_with<'a>(prefix: &[&'a str], columns: &[&'a str], suffix: &[&'a str]) -> Vec<&'a str> {
    prefix.iter().chain(columns).chain(suffix).copied().collect()
}
