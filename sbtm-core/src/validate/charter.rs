//! CHARTER section
//!
//! ```text
//! CHARTER
//! -----------------------------------------------
//! Explore the login page with invalid credentials   <- description
//!
//! #AREAS                                           <- tag, values follow
//! BUILD | 1.2
//! STRATEGY | EXPLORATORY
//! #BUILD
//! 1.2.0-rc3                                        <- free text
//! ```
//!
//! The description ends at the first line starting with `#`. After that, every
//! line must belong to an enabled tag.

use super::{trimmed_lines, SectionValidator, SheetContext};
use crate::diagnostics::{skipped_notice, Checked, Findings};
use crate::types::{ParsedCharter, SectionKind, SessionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharterTag {
    Areas,
    LttdArea,
    Build,
}

impl CharterTag {
    const ALL: [CharterTag; 3] = [CharterTag::Areas, CharterTag::LttdArea, CharterTag::Build];

    fn marker(&self) -> &'static str {
        match self {
            CharterTag::Areas => "#AREAS",
            CharterTag::LttdArea => "#LTTD_AREA",
            CharterTag::Build => "#BUILD",
        }
    }

    fn parse(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| line.starts_with(tag.marker()))
    }
}

/// Per-tag progress while walking the section.
#[derive(Debug, Default)]
struct TagsSeen {
    areas: bool,
    lttd: bool,
    build: bool,
}

impl TagsSeen {
    fn any(&self) -> bool {
        self.areas || self.lttd || self.build
    }

    fn mark(&mut self, tag: CharterTag) -> bool {
        let seen = match tag {
            CharterTag::Areas => &mut self.areas,
            CharterTag::LttdArea => &mut self.lttd,
            CharterTag::Build => &mut self.build,
        };
        std::mem::replace(seen, true)
    }
}

/// Validates CHARTER: description, `#AREAS`, `#LTTD_AREA` and `#BUILD`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharterValidator;

impl SectionValidator for CharterValidator {
    type Output = ParsedCharter;

    fn section(&self) -> SectionKind {
        SectionKind::Charter
    }

    fn validate(&self, lines: &[String], ctx: &SheetContext) -> Checked<ParsedCharter> {
        let options = ctx.options;
        let mut findings = Findings::new();
        let mut charter = ParsedCharter::default();
        let mut seen = TagsSeen::default();
        let mut active: Option<CharterTag> = None;
        let mut description_complete = false;
        let mut build_line_found = false;
        let mut strategy_line_found = false;

        for line in trimmed_lines(lines) {
            if let Some(tag) = CharterTag::parse(line) {
                let enabled = match tag {
                    CharterTag::Areas => options.areas,
                    CharterTag::LttdArea => options.lttd,
                    CharterTag::Build => options.build,
                };
                if enabled {
                    if seen.mark(tag) {
                        findings.error(format!(
                            "More than one {} hashtag found in CHARTER section",
                            tag.marker()
                        ));
                    }
                    active = Some(tag);
                } else {
                    findings.warning(skipped_notice(&format!("{} hashtag", tag.marker())));
                }
            }

            let is_hashtag = line.starts_with('#');
            if !description_complete {
                if is_hashtag {
                    description_complete = true;
                    if charter.description.is_empty() {
                        findings.error("No charter description was given in CHARTER section");
                    }
                } else {
                    charter.description.push(line.to_string());
                }
            } else if !seen.any() && !is_hashtag {
                findings.error(format!(
                    "Unexpected text \"{}\" found in CHARTER section. The charter description ends \
                     when '#' starts a new line. All other text in the CHARTER section must be \
                     preceded by a valid '#' hashtag.",
                    line
                ));
            }

            if is_hashtag {
                continue;
            }

            match active {
                Some(CharterTag::LttdArea) => {
                    let label = line.to_uppercase();
                    if ctx.allow_lists.lttd.contains(&label) {
                        if !charter.lttd_areas.contains(&label) {
                            charter.lttd_areas.push(label);
                        }
                    } else {
                        findings.error(format!(
                            "Unexpected #LTTD_AREA label \"{}\" in CHARTER section. Ensure that \
                             label exists in LTTD_AREAS.INI.",
                            label
                        ));
                    }
                }
                Some(CharterTag::Areas) => {
                    let label = line.to_uppercase();
                    if label.starts_with("BUILD") {
                        build_line_found = true;
                    }
                    if label.contains("STRATEGY") {
                        strategy_line_found = true;
                    }
                    if ctx.allow_lists.areas.contains(&label) {
                        if !charter.areas.contains(&label) {
                            charter.areas.push(label);
                        }
                    } else {
                        findings.error(format!(
                            "Unexpected #AREAS label \"{}\" in CHARTER section. Ensure that \
                             label exists in COVERAGE.INI.",
                            label
                        ));
                    }
                }
                Some(CharterTag::Build) => {
                    build_line_found = true;
                    charter.builds.push(line.to_string());
                }
                None => {}
            }
        }

        if !description_complete && !charter.description.is_empty() {
            description_complete = true;
        }

        if !description_complete {
            findings.error("Missing charter description in CHARTER section.");
        }
        if options.lttd && charter.lttd_areas.is_empty() {
            findings.error(
                "Missing #LTTD_AREA value in CHARTER section. Ensure the #LTTD_AREA hashtag \
                 is present and has valid area values underneath.",
            );
        }
        if options.areas && charter.areas.is_empty() {
            findings.error(
                "Missing #AREAS values in CHARTER section. Ensure the #AREAS hashtag is present \
                 and has valid area values underneath.",
            );
        }
        if options.build && charter.builds.is_empty() {
            findings.error(
                "Missing #BUILD value in CHARTER section. Ensure the #BUILD hashtag is present \
                 and has valid information underneath.",
            );
        }
        if ctx.kind != SessionKind::Todo && options.areas {
            if !options.build && !build_line_found {
                findings.error("Missing 'BUILD' line in the #AREAS section.  Please add it.");
            }
            if !strategy_line_found {
                findings.error("Missing 'STRATEGY' line in the #AREAS section.  Please add it.");
            }
        }

        findings.with(charter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AllowLists, ScanOptions, TimeboxConfig};
    use std::path::Path;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    fn allow_lists() -> AllowLists {
        AllowLists {
            areas: vec![
                "BUILD | 1.2".to_string(),
                "STRATEGY | EXPLORATORY".to_string(),
                "OS | LINUX".to_string(),
            ],
            lttd: vec!["LOGIN".to_string()],
        }
    }

    fn run(text: &str, options: ScanOptions, kind: SessionKind) -> Checked<ParsedCharter> {
        let timebox = TimeboxConfig::default();
        let lists = allow_lists();
        let ctx = SheetContext {
            file_name: "et-pc-240115-a.ses",
            kind,
            options: &options,
            timebox: &timebox,
            allow_lists: &lists,
            data_dir: Path::new("."),
        };
        CharterValidator.validate(&lines(text), &ctx)
    }

    fn areas_only() -> ScanOptions {
        ScanOptions {
            areas: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_description_only() {
        let checked = run(
            "Explore login\nwith bad passwords\n\n",
            ScanOptions::default(),
            SessionKind::Test,
        );
        assert!(checked.diagnostics.is_empty());
        assert_eq!(
            checked.value.description,
            vec!["Explore login", "with bad passwords"]
        );
    }

    #[test]
    fn test_areas_are_collected_and_deduplicated() {
        let checked = run(
            "Explore login\n#AREAS\nbuild | 1.2\nStrategy | Exploratory\nBUILD | 1.2\n",
            areas_only(),
            SessionKind::Test,
        );
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
        assert_eq!(
            checked.value.areas,
            vec!["BUILD | 1.2", "STRATEGY | EXPLORATORY"]
        );
    }

    #[test]
    fn test_areas_without_values() {
        let checked = run("Explore login\n#AREAS\n", areas_only(), SessionKind::Test);
        let messages = checked.messages();
        assert!(messages.iter().any(|m| m.starts_with("Missing #AREAS values")));
        assert!(messages.contains(&"Missing 'BUILD' line in the #AREAS section.  Please add it."));
        assert!(messages
            .contains(&"Missing 'STRATEGY' line in the #AREAS section.  Please add it."));
    }

    #[test]
    fn test_todo_sheets_skip_build_and_strategy_lines() {
        let checked = run("Plan checkout\n#AREAS\nOS | Linux\n", areas_only(), SessionKind::Todo);
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
    }

    #[test]
    fn test_unknown_area_label() {
        let checked = run(
            "Explore\n#AREAS\nBUILD | 1.2\nSTRATEGY | EXPLORATORY\nOS | Plan9\n",
            areas_only(),
            SessionKind::Test,
        );
        assert_eq!(
            checked.messages(),
            vec![
                "Unexpected #AREAS label \"OS | PLAN9\" in CHARTER section. Ensure that label \
                 exists in COVERAGE.INI."
            ]
        );
    }

    #[test]
    fn test_missing_description() {
        let checked = run("#AREAS\nBUILD | 1.2\nSTRATEGY | EXPLORATORY\n", areas_only(), SessionKind::Test);
        assert_eq!(
            checked.messages(),
            vec!["No charter description was given in CHARTER section"]
        );

        let empty = run("\n\n", ScanOptions::default(), SessionKind::Test);
        assert_eq!(
            empty.messages(),
            vec!["Missing charter description in CHARTER section."]
        );
    }

    #[test]
    fn test_text_after_unknown_hashtag() {
        let checked = run(
            "Explore\n#NOTES\nstray text\n",
            ScanOptions::default(),
            SessionKind::Test,
        );
        assert_eq!(checked.diagnostics.len(), 1);
        assert!(checked.messages()[0].starts_with("Unexpected text \"stray text\" found in CHARTER"));
    }

    #[test]
    fn test_disabled_tag_warns_and_values_become_unexpected() {
        let checked = run(
            "Explore\n#AREAS\nOS | Linux\n",
            ScanOptions::default(),
            SessionKind::Test,
        );
        assert!(!checked.diagnostics[0].is_error());
        assert_eq!(
            checked.diagnostics[0].message,
            "#AREAS hashtag found but skipped in SCAN based on sbtm.toml config."
        );
        assert!(checked.diagnostics[1].is_error());
        assert!(checked.value.areas.is_empty());
    }

    #[test]
    fn test_duplicate_tag() {
        let checked = run(
            "Explore\n#LTTD_AREA\nlogin\n#LTTD_AREA\nlogin\n",
            ScanOptions {
                lttd: true,
                ..Default::default()
            },
            SessionKind::Test,
        );
        assert_eq!(
            checked.messages(),
            vec!["More than one #LTTD_AREA hashtag found in CHARTER section"]
        );
        assert_eq!(checked.value.lttd_areas, vec!["LOGIN"]);
    }

    #[test]
    fn test_build_lines_are_free_text() {
        let options = ScanOptions {
            areas: true,
            build: true,
            ..Default::default()
        };
        let checked = run(
            "Explore\n#AREAS\nSTRATEGY | EXPLORATORY\n#BUILD\n1.2.0-rc3 (nightly)\n",
            options,
            SessionKind::Test,
        );
        assert!(checked.diagnostics.is_empty(), "{:?}", checked.messages());
        assert_eq!(checked.value.builds, vec!["1.2.0-rc3 (nightly)"]);
    }

    #[test]
    fn test_missing_build_value() {
        let options = ScanOptions {
            build: true,
            ..Default::default()
        };
        let checked = run("Explore\n#BUILD\n", options, SessionKind::Test);
        assert_eq!(checked.diagnostics.len(), 1);
        assert!(checked.messages()[0].starts_with("Missing #BUILD value"));
    }
}
