//! DATA FILES and TEST NOTES sections.
//!
//! Both accept `#N/A` to say "deliberately empty". A section with neither
//! `#N/A` nor content, or with both, is an error.

use super::{
    has_word, is_not_applicable, trim_trailing_blanks, trimmed_lines, SectionValidator,
    SheetContext,
};
use crate::config::CONFIG_FILE_NAME;
use crate::diagnostics::{Checked, Findings};
use crate::types::{SectionContent, SectionKind};
use std::path::{Component, Path};

/// `#N/A` / content presence of a section.
#[derive(Debug, Default, Clone, Copy)]
struct Presence {
    not_applicable: bool,
    content: bool,
}

impl Presence {
    fn of<'a>(lines: impl IntoIterator<Item = &'a str>, is_content: impl Fn(&str) -> bool) -> Self {
        let mut presence = Presence::default();
        for line in lines {
            if is_not_applicable(line) {
                presence.not_applicable = true;
            } else if is_content(line) {
                presence.content = true;
            }
        }
        presence
    }
}

/// Whether `entry` names an existing file under `data_dir`.
///
/// Entries are relative to the data directory. Absolute paths and `..`
/// components never match, so a sheet cannot point outside it.
fn in_data_dir(data_dir: &Path, entry: &str) -> bool {
    let relative = Path::new(entry)
        .components()
        .all(|part| matches!(part, Component::Normal(_) | Component::CurDir));
    relative && data_dir.join(entry).exists()
}

/// Validates DATA FILES: each entry must exist in the data directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataFilesValidator;

impl SectionValidator for DataFilesValidator {
    /// Entries that exist in the data directory
    type Output = SectionContent<Vec<String>>;

    fn section(&self) -> SectionKind {
        SectionKind::DataFiles
    }

    fn validate(&self, lines: &[String], ctx: &SheetContext) -> Checked<Self::Output> {
        let mut findings = Findings::new();
        let lines = trimmed_lines(lines);
        let presence = Presence::of(lines.iter().copied(), has_word);

        let content = match (presence.not_applicable, presence.content) {
            (false, false) => {
                findings.error(
                    "DATA FILES section is empty. If you used no data files in this test \
                     session, specify #N/A.",
                );
                SectionContent::Invalid
            }
            (true, true) => {
                findings.error(
                    "Unexpected text found with #N/A tag in DATA FILES section. If you specify \
                     #N/A, no other text is permitted in this section.",
                );
                SectionContent::Invalid
            }
            (true, false) => SectionContent::NotApplicable,
            (false, true) => {
                let mut files = Vec::new();
                for line in lines {
                    if has_word(line) && in_data_dir(ctx.data_dir, line) {
                        files.push(line.to_string());
                    } else {
                        findings.error(format!(
                            "Missing data file \"{}\" in the data file directory. Ensure the file \
                             exists in the \"{}\" directory specified in the {} configuration file.",
                            line,
                            ctx.data_dir.display(),
                            CONFIG_FILE_NAME
                        ));
                    }
                }
                SectionContent::Present(files)
            }
        };

        findings.with(content)
    }
}

/// Validates TEST NOTES. Notes are kept verbatim, indentation included.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestNotesValidator;

impl SectionValidator for TestNotesValidator {
    /// Note lines, trailing blank lines removed
    type Output = SectionContent<Vec<String>>;

    fn section(&self) -> SectionKind {
        SectionKind::TestNotes
    }

    fn validate(&self, lines: &[String], _ctx: &SheetContext) -> Checked<Self::Output> {
        let mut findings = Findings::new();
        let presence = Presence::of(lines.iter().map(String::as_str), has_word);

        let content = match (presence.not_applicable, presence.content) {
            (false, false) => {
                findings.error("TEST NOTES section is empty. If you have no notes, specify #N/A.");
                SectionContent::Invalid
            }
            (true, true) => {
                findings.error(
                    "Unexpected text found with #N/A tag in TEST NOTES section. If you specify \
                     #N/A, no other text is permitted in this section.",
                );
                SectionContent::Invalid
            }
            (true, false) => {
                findings.warning(
                    "There are *no* Test Notes in this sheet. Are there no thoughts, test ideas, \
                     observations or setup information worth noting?",
                );
                SectionContent::NotApplicable
            }
            (false, true) => {
                let mut notes = lines.to_vec();
                trim_trailing_blanks(&mut notes);
                SectionContent::Present(notes)
            }
        };

        findings.with(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllowLists, ScanOptions, TimeboxConfig};
    use crate::types::SessionKind;
    use std::path::Path;
    use tempfile::TempDir;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn with_ctx<T>(data_dir: &Path, f: impl FnOnce(&SheetContext) -> T) -> T {
        let options = ScanOptions {
            data_files: true,
            ..Default::default()
        };
        let timebox = TimeboxConfig::default();
        let lists = AllowLists::default();
        let ctx = SheetContext {
            file_name: "et-pc-240115-a.ses",
            kind: SessionKind::Test,
            options: &options,
            timebox: &timebox,
            allow_lists: &lists,
            data_dir,
        };
        f(&ctx)
    }

    #[test]
    fn test_data_files_exist() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("users.csv"), "id,name\n").unwrap();

        let checked = with_ctx(dir.path(), |ctx| {
            DataFilesValidator.validate(&lines("  users.csv \n\n"), ctx)
        });
        assert!(checked.diagnostics.is_empty());
        assert_eq!(
            checked.value,
            SectionContent::Present(vec!["users.csv".to_string()])
        );
    }

    #[test]
    fn test_missing_data_file_names_file_and_directory() {
        let dir = TempDir::new().unwrap();
        let checked = with_ctx(dir.path(), |ctx| {
            DataFilesValidator.validate(&lines("fixture.csv"), ctx)
        });

        assert_eq!(checked.diagnostics.len(), 1);
        let message = &checked.diagnostics[0].message;
        assert!(message.starts_with("Missing data file \"fixture.csv\" in the data file directory."));
        assert!(message.contains(&dir.path().display().to_string()));
        assert_eq!(checked.value, SectionContent::Present(vec![]));
    }

    #[test]
    fn test_data_files_stay_inside_data_dir() {
        let root = TempDir::new().unwrap();
        let data_dir = root.path().join("data");
        std::fs::create_dir_all(data_dir.join("logs")).unwrap();
        std::fs::write(data_dir.join("logs").join("run.log"), "ok\n").unwrap();
        let outside = root.path().join("outside.csv");
        std::fs::write(&outside, "id\n").unwrap();

        let text = format!("logs/run.log\n../outside.csv\n{}\n", outside.display());
        let checked = with_ctx(&data_dir, |ctx| DataFilesValidator.validate(&lines(&text), ctx));

        assert_eq!(
            checked.value,
            SectionContent::Present(vec!["logs/run.log".to_string()])
        );
        let messages = checked.messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[0].starts_with("Missing data file \"../outside.csv\""));
        assert!(messages[1].starts_with(&format!("Missing data file \"{}\"", outside.display())));
    }

    #[test]
    fn test_data_files_tri_state() {
        let dir = TempDir::new().unwrap();
        with_ctx(dir.path(), |ctx| {
            let na = DataFilesValidator.validate(&lines("#n/a"), ctx);
            assert!(na.diagnostics.is_empty());
            assert_eq!(na.value, SectionContent::NotApplicable);

            let empty = DataFilesValidator.validate(&lines("\n  \n"), ctx);
            assert!(empty.messages()[0].starts_with("DATA FILES section is empty."));

            let mixed = DataFilesValidator.validate(&lines("#N/A\nusers.csv"), ctx);
            assert!(mixed.messages()[0].starts_with("Unexpected text found with #N/A tag"));
            assert_eq!(mixed.value, SectionContent::Invalid);
        });
    }

    #[test]
    fn test_notes_keep_indentation() {
        let dir = TempDir::new().unwrap();
        let checked = with_ctx(dir.path(), |ctx| {
            TestNotesValidator.validate(&lines("Setup:\n  * cleared cache\n\nLogin ok\n\n\n"), ctx)
        });
        assert!(checked.diagnostics.is_empty());
        assert_eq!(
            checked.value,
            SectionContent::Present(lines("Setup:\n  * cleared cache\n\nLogin ok"))
        );
    }

    #[test]
    fn test_notes_not_applicable_warns() {
        let dir = TempDir::new().unwrap();
        let checked = with_ctx(dir.path(), |ctx| TestNotesValidator.validate(&lines("#N/A\n"), ctx));

        assert_eq!(checked.value, SectionContent::NotApplicable);
        assert_eq!(checked.diagnostics.len(), 1);
        assert!(!checked.diagnostics[0].is_error());
    }

    #[test]
    fn test_indented_na_is_content() {
        let dir = TempDir::new().unwrap();
        let checked = with_ctx(dir.path(), |ctx| {
            TestNotesValidator.validate(&lines("  #N/A\n"), ctx)
        });
        assert!(matches!(checked.value, SectionContent::Present(_)));
    }
}
