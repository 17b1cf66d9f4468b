//! Section splitter for session sheets
//!
//! A sheet is read line by line through a small state machine:
//!
//! ```text
//!   Idle ──header──► Separator(kind) ──any line──► Section(kind)
//!    ▲                                                 │
//!    └──────────────── header opens the next ◄─────────┘
//!                      coffee-break line ──► Done
//! ```
//!
//! - A header is an all-caps keyword at the very start of a line
//!   (`CHARTER`, `START`, `TESTER`, `TASK BREAKDOWN`, `DATA FILES`,
//!   `TEST NOTES`, `BUGS`, `ISSUES`).
//! - The line right after a header is always discarded: it is expected to be
//!   a dashed separator. A header placed there is lost with it.
//! - A `---- c[_] ----` line ends the sheet; nothing after it is read.
//! - Double quotes are replaced by single quotes before a line is stored,
//!   because every output table uses quote-delimited fields.

use crate::config::ScanOptions;
use crate::diagnostics::{skipped_notice, Checked, Findings};
use crate::error::{Error, Result};
use crate::types::SectionKind;
use std::collections::BTreeMap;
use std::path::Path;

/// A session sheet split into its sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSheet {
    sections: BTreeMap<SectionKind, Vec<String>>,
}

impl SessionSheet {
    /// Whether a header for `kind` was seen.
    pub fn has(&self, kind: SectionKind) -> bool {
        self.sections.contains_key(&kind)
    }

    /// Lines of a section; empty when the section was not found.
    pub fn lines(&self, kind: SectionKind) -> &[String] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Section kinds found, in conventional order.
    pub fn found(&self) -> impl Iterator<Item = SectionKind> + '_ {
        self.sections.keys().copied()
    }

    /// A sheet without any recognized section contributes no metrics.
    pub fn has_content(&self) -> bool {
        !self.sections.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    /// Before the first header; lines go nowhere
    Idle,
    /// A header was just read; the next line is the separator
    Separator(SectionKind),
    /// Collecting lines for a section
    Section(SectionKind),
    /// Coffee-break line reached
    Done,
}

/// What to do with a line in a given state.
enum Transition {
    SkipSeparator(SectionKind),
    Stop,
    Open(SectionKind),
    Collect(Option<SectionKind>),
}

fn transition(state: SplitState, line: &str) -> Transition {
    if let SplitState::Separator(kind) = state {
        return Transition::SkipSeparator(kind);
    }
    if is_coffee_break(line.trim()) {
        return Transition::Stop;
    }
    if let Some(kind) = SectionKind::from_header_line(line) {
        return Transition::Open(kind);
    }
    match state {
        SplitState::Section(kind) => Transition::Collect(Some(kind)),
        _ => Transition::Collect(None),
    }
}

/// `-+\s+c\[_\]\s+-+` on the whole (trimmed) line.
fn is_coffee_break(line: &str) -> bool {
    let Some((left, right)) = line.split_once("c[_]") else {
        return false;
    };
    let dashes_then_space = |part: &str| {
        let dashes = part.trim_end();
        dashes.len() < part.len() && !dashes.is_empty() && dashes.chars().all(|c| c == '-')
    };
    let space_then_dashes = |part: &str| {
        let dashes = part.trim_start();
        dashes.len() < part.len() && !dashes.is_empty() && dashes.chars().all(|c| c == '-')
    };
    dashes_then_space(left) && space_then_dashes(right)
}

/// Split sheet text into sections.
///
/// Structural problems are returned as diagnostics: duplicate headers, missing
/// required sections, sections present while their feature is switched off,
/// and tab characters.
pub fn split_sheet(text: &str, options: &ScanOptions) -> Checked<SessionSheet> {
    let mut findings = Findings::new();
    let mut sheet = SessionSheet::default();
    let mut state = SplitState::Idle;
    let mut tab_found = false;

    for line in text.lines() {
        match transition(state, line) {
            Transition::SkipSeparator(kind) => {
                state = SplitState::Section(kind);
            }
            Transition::Stop => {
                state = SplitState::Done;
                break;
            }
            Transition::Open(kind) => {
                if sheet.has(kind) {
                    findings.error(format!("More than one {} section found", kind));
                }
                sheet.sections.entry(kind).or_default();
                skipped_section_warning(kind, options, &mut findings);
                state = SplitState::Separator(kind);
            }
            Transition::Collect(target) => {
                let line = line.replace('"', "'");
                if line.contains('\t') {
                    tab_found = true;
                }
                if let Some(kind) = target {
                    sheet.sections.entry(kind).or_default().push(line);
                }
            }
        }
    }
    tracing::trace!(?state, sections = sheet.sections.len(), "Sheet split");

    for kind in SectionKind::ALL {
        if required(kind, options) && !sheet.has(kind) {
            findings.error(kind.missing_message());
        }
    }

    if tab_found {
        findings.warning(
            "[Tab] character found in file.  Tabs may cause unexpected formatting in \
             different editors.  Please convert Tabs to Spaces if possible.",
        );
    }

    findings.with(sheet)
}

/// Read and split a sheet from disk.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_sheet(path: &Path, options: &ScanOptions) -> Result<Checked<SessionSheet>> {
    let bytes = std::fs::read(path).map_err(|e| Error::open(path, e))?;
    Ok(split_sheet(&String::from_utf8_lossy(&bytes), options))
}

fn required(kind: SectionKind, options: &ScanOptions) -> bool {
    match kind {
        SectionKind::TaskBreakdown => options.task(),
        SectionKind::DataFiles => options.data_files,
        _ => true,
    }
}

fn skipped_section_warning(kind: SectionKind, options: &ScanOptions, findings: &mut Findings) {
    if !required(kind, options) {
        findings.warning(skipped_notice(&format!("{} section", kind)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = "\
CHARTER
-----------------------------------------------
Explore the login page
#AREAS
BUILD | 1.2
STRATEGY | EXPLORATORY

START
-----------------------------------------------
01/15/2024 09:00am

TESTER
-----------------------------------------------
Paul

TASK BREAKDOWN
-----------------------------------------------
#DURATION
normal

DATA FILES
-----------------------------------------------
#N/A

TEST NOTES
-----------------------------------------------
Tried \"admin\" first.

BUGS
-----------------------------------------------
#N/A

ISSUES
-----------------------------------------------
#N/A
";

    #[test]
    fn test_split_recovers_all_sections() {
        let checked = split_sheet(WELL_FORMED, &ScanOptions::all());
        let sheet = &checked.value;

        assert_eq!(sheet.found().collect::<Vec<_>>(), SectionKind::ALL.to_vec());
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.diagnostics);
        assert_eq!(
            sheet.lines(SectionKind::Charter),
            &[
                "Explore the login page",
                "#AREAS",
                "BUILD | 1.2",
                "STRATEGY | EXPLORATORY",
                ""
            ]
        );
        assert_eq!(sheet.lines(SectionKind::Tester), &["Paul", ""]);
        assert_eq!(sheet.lines(SectionKind::Issues), &["#N/A"]);
    }

    #[test]
    fn test_quotes_are_normalized() {
        let checked = split_sheet(WELL_FORMED, &ScanOptions::all());
        assert_eq!(
            checked.value.lines(SectionKind::TestNotes)[0],
            "Tried 'admin' first."
        );
    }

    #[test]
    fn test_line_after_header_is_discarded() {
        let text = "TESTER\nSam\nPaul\n";
        let checked = split_sheet(text, &ScanOptions::default());
        assert_eq!(checked.value.lines(SectionKind::Tester), &["Paul"]);
    }

    #[test]
    fn test_header_right_after_header_is_lost() {
        let text = "TESTER\nSTART\n01/15/2024 9:00\n";
        let checked = split_sheet(text, &ScanOptions::default());

        assert!(!checked.value.has(SectionKind::Start));
        assert_eq!(checked.value.lines(SectionKind::Tester), &["01/15/2024 9:00"]);
        assert!(checked
            .messages()
            .contains(&"Missing a START section"));
    }

    #[test]
    fn test_coffee_break_truncates() {
        let text = "TESTER\n----\nPaul\n----- c[_] -----\nBUGS\n----\n#N/A\n";
        let checked = split_sheet(text, &ScanOptions::default());

        assert!(!checked.value.has(SectionKind::Bugs));
        assert!(checked.messages().contains(&"Missing a BUGS section"));
    }

    #[test]
    fn test_is_coffee_break() {
        assert!(is_coffee_break("--- c[_] ---"));
        assert!(is_coffee_break("-\tc[_]  -----"));
        assert!(!is_coffee_break("---c[_] ---"));
        assert!(!is_coffee_break("--- c[_] --- more"));
        assert!(!is_coffee_break("c[_]"));
    }

    #[test]
    fn test_duplicate_section_keeps_lines() {
        let text = "BUGS\n----\n#BUG 1\nfirst\nBUGS\n----\n#BUG 2\nsecond\n";
        let checked = split_sheet(text, &ScanOptions::default());

        assert!(checked
            .messages()
            .contains(&"More than one BUGS section found"));
        assert_eq!(checked.value.lines(SectionKind::Bugs).len(), 4);
    }

    #[test]
    fn test_missing_optional_sections_depend_on_options() {
        let text = "CHARTER\n----\nx\n";

        let relaxed = split_sheet(text, &ScanOptions::default());
        assert!(!relaxed
            .messages()
            .contains(&"Missing a TASK BREAKDOWN section"));
        assert!(!relaxed.messages().contains(&"Missing a DATA FILES section"));

        let strict = split_sheet(text, &ScanOptions::all());
        assert!(strict
            .messages()
            .contains(&"Missing a TASK BREAKDOWN section"));
        assert!(strict.messages().contains(&"Missing a DATA FILES section"));
        assert!(strict.messages().contains(&"Missing an ISSUES section"));
    }

    #[test]
    fn test_disabled_section_warns() {
        let text = "DATA FILES\n----\nfixture.csv\n";
        let checked = split_sheet(text, &ScanOptions::default());

        let warnings: Vec<_> = checked
            .diagnostics
            .iter()
            .filter(|d| !d.is_error())
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.starts_with("DATA FILES section found but skipped"));
    }

    #[test]
    fn test_tab_warning() {
        let text = "TEST NOTES\n----\n\tindented\n";
        let checked = split_sheet(text, &ScanOptions::default());
        assert!(checked
            .diagnostics
            .iter()
            .any(|d| !d.is_error() && d.message.starts_with("[Tab] character")));
    }

    #[test]
    fn test_text_before_first_header_is_ignored() {
        let text = "Session sheet v2\n\nTESTER\n----\nPaul\n";
        let checked = split_sheet(text, &ScanOptions::default());
        assert_eq!(checked.value.lines(SectionKind::Tester), &["Paul"]);
    }

    #[test]
    fn test_empty_text_has_no_content() {
        let checked = split_sheet("", &ScanOptions::default());
        assert!(!checked.value.has_content());
        assert!(checked.has_errors());
    }
}
