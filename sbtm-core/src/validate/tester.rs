//! TESTER section: one name per line.

use super::{has_word, trimmed_lines, SectionValidator, SheetContext};
use crate::diagnostics::{Checked, Findings};
use crate::types::SectionKind;

/// Validates TESTER and extracts the tester names.
///
/// Duplicate names are kept: each line credits one more person.
#[derive(Debug, Default, Clone, Copy)]
pub struct TesterValidator;

impl SectionValidator for TesterValidator {
    type Output = Vec<String>;

    fn section(&self) -> SectionKind {
        SectionKind::Tester
    }

    fn validate(&self, lines: &[String], _ctx: &SheetContext) -> Checked<Vec<String>> {
        let mut findings = Findings::new();
        let testers: Vec<String> = trimmed_lines(lines)
            .into_iter()
            .filter(|name| has_word(name))
            .map(str::to_string)
            .collect();

        if testers.is_empty() {
            findings.error("Missing tester name in TESTER section");
        }
        findings.with(testers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllowLists, ScanOptions, TimeboxConfig};
    use crate::types::SessionKind;
    use std::path::Path;

    fn run(text: &str) -> Checked<Vec<String>> {
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
        TesterValidator.validate(&lines, &ctx)
    }

    #[test]
    fn test_names_are_trimmed_and_duplicates_kept() {
        let checked = run("  Paul \n\nSam\nPaul\n");
        assert!(checked.diagnostics.is_empty());
        assert_eq!(checked.value, vec!["Paul", "Sam", "Paul"]);
    }

    #[test]
    fn test_punctuation_is_not_a_name() {
        let checked = run("---\n\n");
        assert!(checked.value.is_empty());
        assert_eq!(
            checked.messages(),
            vec!["Missing tester name in TESTER section"]
        );
    }
}
