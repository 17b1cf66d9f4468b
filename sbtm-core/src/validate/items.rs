//! BUGS and ISSUES sections.
//!
//! Both list records opened by a marker line (`#BUG`, `#ISSUE`). Text on the
//! marker line after the marker is the record's ID; the following lines, up
//! to the next marker, are its description.

use super::{is_not_applicable, non_blank_lines, starts_with_ignore_case, SectionValidator, SheetContext};
use crate::diagnostics::{Checked, Findings};
use crate::types::{ItemEntry, SectionContent, SectionKind};

/// Which itemized section is being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Bug,
    Issue,
}

impl ItemKind {
    /// `BUG` / `ISSUE`
    fn word(&self) -> &'static str {
        match self {
            ItemKind::Bug => "BUG",
            ItemKind::Issue => "ISSUE",
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            ItemKind::Bug => "#BUG",
            ItemKind::Issue => "#ISSUE",
        }
    }

    fn section_kind(&self) -> SectionKind {
        match self {
            ItemKind::Bug => SectionKind::Bugs,
            ItemKind::Issue => SectionKind::Issues,
        }
    }

    fn empty_section_message(&self) -> &'static str {
        match self {
            ItemKind::Bug => {
                "BUGS section is empty. If you have no bugs to report in this session, specify #N/A."
            }
            ItemKind::Issue => {
                "ISSUES section is empty. If you have no issues to report in this session, \
                 specify #N/A."
            }
        }
    }

    fn mixed_message(&self) -> &'static str {
        match self {
            ItemKind::Bug => {
                "Unexpected text found with #N/A tag in BUGS section. If you specify #N/A, no \
                 other text is permitted in this section."
            }
            ItemKind::Issue => {
                "Unexpected text found with #N/A tag in the ISSUES section. If you specify #N/A, \
                 no other text is permitted in this section."
            }
        }
    }

    fn empty_record_message(&self) -> &'static str {
        match self {
            ItemKind::Bug => {
                "Empty bug field in BUGS section. Please provide bug description text after each #BUG."
            }
            ItemKind::Issue => {
                "Empty issue field in ISSUES section. Please include an issue description after \
                 each #ISSUE."
            }
        }
    }

    fn unmarked_text_message(&self, line: &str) -> String {
        match self {
            ItemKind::Bug => format!(
                "Unexpected text in BUGS section: \"{}\". Please specify #BUG before each bug \
                 description in this section.",
                line
            ),
            ItemKind::Issue => format!(
                "Unexpected text in ISSUES section: \"{}\". Please specify #ISSUE before each \
                 issue in this section.",
                line
            ),
        }
    }

    fn typo_message(&self) -> String {
        let section = self.section_kind();
        let word = self.word();
        format!(
            "Possible typo in {} section. Don't put \"{}\" at the start of a line and don't put \
             \"# {}\" (space between # and {}).",
            section, word, word, word
        )
    }

    /// ID written after the marker (`#BUG 1234` is `1234`).
    fn record_id(&self, line: &str) -> String {
        let rest = &line[self.marker().len()..];
        let id = rest.trim_start();
        if id.len() == rest.len() {
            String::new()
        } else {
            id.trim_end().to_string()
        }
    }
}

/// Validates BUGS or ISSUES and extracts the records.
#[derive(Debug, Clone, Copy)]
pub struct ItemsValidator {
    kind: ItemKind,
}

impl ItemsValidator {
    pub fn new(kind: ItemKind) -> Self {
        Self { kind }
    }

    pub fn bugs() -> Self {
        Self::new(ItemKind::Bug)
    }

    pub fn issues() -> Self {
        Self::new(ItemKind::Issue)
    }

    fn close_record(
        &self,
        record: Option<ItemEntry>,
        entries: &mut Vec<ItemEntry>,
        findings: &mut Findings,
    ) {
        match record {
            Some(entry) if entry.body.is_empty() => {
                findings.error(self.kind.empty_record_message());
            }
            Some(entry) => entries.push(entry),
            None => {}
        }
    }
}

impl SectionValidator for ItemsValidator {
    type Output = SectionContent<Vec<ItemEntry>>;

    fn section(&self) -> SectionKind {
        self.kind.section_kind()
    }

    fn validate(&self, lines: &[String], _ctx: &SheetContext) -> Checked<Self::Output> {
        let kind = self.kind;
        let mut findings = Findings::new();
        let lines = non_blank_lines(lines);

        let mut not_applicable = false;
        let mut content = false;
        let typo_space = format!("# {}", kind.word());
        for line in &lines {
            if is_not_applicable(line) {
                not_applicable = true;
            } else {
                content = true;
            }
            if starts_with_ignore_case(line, kind.word())
                || starts_with_ignore_case(line, &typo_space)
            {
                findings.error(kind.typo_message());
            }
        }

        let result = match (not_applicable, content) {
            (false, false) => {
                findings.error(kind.empty_section_message());
                SectionContent::Invalid
            }
            (true, true) => {
                findings.error(kind.mixed_message());
                SectionContent::Invalid
            }
            (true, false) => SectionContent::NotApplicable,
            (false, true) => {
                let mut entries = Vec::new();
                let mut record: Option<ItemEntry> = None;

                for line in lines {
                    if starts_with_ignore_case(line, kind.marker()) {
                        self.close_record(record.take(), &mut entries, &mut findings);
                        record = Some(ItemEntry {
                            body: Vec::new(),
                            id: kind.record_id(line),
                        });
                    } else if let Some(entry) = record.as_mut() {
                        entry.body.push(line.to_string());
                    } else {
                        findings.error(kind.unmarked_text_message(line));
                    }
                }
                self.close_record(record, &mut entries, &mut findings);

                SectionContent::Present(entries)
            }
        };

        findings.with(result)
    }
}

/// Number of well-formed records in a validated section.
pub fn record_count(content: &SectionContent<Vec<ItemEntry>>) -> usize {
    match content {
        SectionContent::Present(entries) => entries.len(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllowLists, ScanOptions, TimeboxConfig};
    use crate::types::SessionKind;
    use std::path::Path;

    fn run(validator: ItemsValidator, text: &str) -> Checked<SectionContent<Vec<ItemEntry>>> {
        let options = ScanOptions::default();
        let timebox = TimeboxConfig::default();
        let lists = AllowLists::default();
        let ctx = SheetContext {
            file_name: "et-pc-240115-a.ses",
            kind: SessionKind::Test,
            options: &options,
            timebox: &timebox,
            allow_lists: &lists,
            data_dir: Path::new("."),
        };
        let lines: Vec<String> = text.lines().map(str::to_string).collect();
        validator.validate(&lines, &ctx)
    }

    #[test]
    fn test_not_applicable() {
        let checked = run(ItemsValidator::bugs(), "#N/A\n\n");
        assert!(checked.diagnostics.is_empty());
        assert_eq!(checked.value, SectionContent::NotApplicable);
        assert_eq!(record_count(&checked.value), 0);
    }

    #[test]
    fn test_records_with_ids() {
        let checked = run(
            ItemsValidator::bugs(),
            "#BUG 1234 \nLogin accepts blank password\n  (seen twice)\n\n#bug\nTimeout on logout\n",
        );
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());

        let SectionContent::Present(entries) = &checked.value else {
            panic!("expected records");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "1234");
        assert_eq!(
            entries[0].body,
            vec!["Login accepts blank password", "  (seen twice)"]
        );
        assert_eq!(entries[1].id, "");
        assert_eq!(record_count(&checked.value), 2);
    }

    #[test]
    fn test_empty_record() {
        let checked = run(ItemsValidator::bugs(), "#BUG 1\n#BUG 2\nreal bug\n");
        assert_eq!(
            checked.messages(),
            vec![
                "Empty bug field in BUGS section. Please provide bug description text after each \
                 #BUG."
            ]
        );
        assert_eq!(record_count(&checked.value), 1);
    }

    #[test]
    fn test_text_before_first_marker() {
        let checked = run(ItemsValidator::issues(), "stray\n#ISSUE\nflaky test env\n");
        assert_eq!(
            checked.messages(),
            vec![
                "Unexpected text in ISSUES section: \"stray\". Please specify #ISSUE before each \
                 issue in this section."
            ]
        );
        assert_eq!(record_count(&checked.value), 1);
    }

    #[test]
    fn test_typo_lines() {
        let checked = run(ItemsValidator::bugs(), "# BUG 12\nbroken\n");
        assert!(checked.messages().contains(
            &"Possible typo in BUGS section. Don't put \"BUG\" at the start of a line and don't \
              put \"# BUG\" (space between # and BUG)."
        ));

        let issue = run(ItemsValidator::issues(), "#ISSUE\nIssue tracker down\n");
        assert!(issue.messages()[0].starts_with("Possible typo in ISSUES section."));
    }

    #[test]
    fn test_tri_state_errors() {
        let empty = run(ItemsValidator::issues(), "\n\n");
        assert_eq!(
            empty.messages(),
            vec![
                "ISSUES section is empty. If you have no issues to report in this session, \
                 specify #N/A."
            ]
        );

        let mixed = run(ItemsValidator::bugs(), "#N/A\n#BUG\nsomething\n");
        assert_eq!(mixed.value, SectionContent::Invalid);
        assert!(mixed.messages()[0].starts_with("Unexpected text found with #N/A tag in BUGS"));
    }
}
