//! TASK BREAKDOWN section
//!
//! ```text
//! #DURATION
//! normal * 1.5
//! #TEST DESIGN AND EXECUTION
//! 70
//! #BUG INVESTIGATION AND REPORTING
//! 20
//! #SESSION SETUP
//! 10
//! #CHARTER VS. OPPORTUNITY
//! 90/10
//! ```
//!
//! Each sub-section is switched on separately (Duration, TBS, C vs O) and holds
//! exactly one value line.

use super::{
    is_word_char, leading_float, leading_int, trimmed_lines, SectionValidator, SheetContext,
};
use crate::config::ScanOptions;
use crate::diagnostics::{skipped_notice, Checked, Findings};
use crate::format::format_real;
use crate::types::{BreakdownValues, DurationClass, SectionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakdownTag {
    Duration,
    TestDesign,
    BugInvestigation,
    SessionSetup,
    CharterVsOpportunity,
}

impl BreakdownTag {
    const ALL: [BreakdownTag; 5] = [
        BreakdownTag::Duration,
        BreakdownTag::TestDesign,
        BreakdownTag::BugInvestigation,
        BreakdownTag::SessionSetup,
        BreakdownTag::CharterVsOpportunity,
    ];

    fn marker(&self) -> &'static str {
        match self {
            BreakdownTag::Duration => "#DURATION",
            BreakdownTag::TestDesign => "#TEST DESIGN AND EXECUTION",
            BreakdownTag::BugInvestigation => "#BUG INVESTIGATION AND REPORTING",
            BreakdownTag::SessionSetup => "#SESSION SETUP",
            BreakdownTag::CharterVsOpportunity => "#CHARTER VS. OPPORTUNITY",
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }

    fn enabled(&self, options: &ScanOptions) -> bool {
        match self {
            BreakdownTag::Duration => options.duration,
            BreakdownTag::TestDesign
            | BreakdownTag::BugInvestigation
            | BreakdownTag::SessionSetup => options.tbs,
            BreakdownTag::CharterVsOpportunity => options.charter_vs_opportunity,
        }
    }

    fn parse(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| line.starts_with(tag.marker()))
    }
}

/// Whether a tag was seen and whether it received its value line.
#[derive(Debug, Default, Clone, Copy)]
struct TagState {
    found: bool,
    has_value: bool,
}

/// Validates TASK BREAKDOWN and extracts the raw breakdown values.
#[derive(Debug, Default, Clone, Copy)]
pub struct BreakdownValidator;

impl SectionValidator for BreakdownValidator {
    type Output = BreakdownValues;

    fn section(&self) -> SectionKind {
        SectionKind::TaskBreakdown
    }

    fn validate(&self, lines: &[String], ctx: &SheetContext) -> Checked<BreakdownValues> {
        let options = ctx.options;
        let mut findings = Findings::new();
        let mut values = BreakdownValues::default();
        let mut states = [TagState::default(); 5];
        let mut active: Option<BreakdownTag> = None;

        for line in trimmed_lines(lines) {
            if let Some(tag) = BreakdownTag::parse(line) {
                if tag.enabled(options) {
                    let state = &mut states[tag.index()];
                    if state.found {
                        findings.error(format!(
                            "More than one {} hashtag found in TASK BREAKDOWN section",
                            tag.marker()
                        ));
                    }
                    state.found = true;
                    active = Some(tag);
                } else {
                    findings.warning(skipped_notice(&format!("{} hashtag", tag.marker())));
                }
                continue;
            }

            let Some(tag) = active else {
                continue;
            };
            let state = &mut states[tag.index()];
            if state.has_value {
                findings.error(format!(
                    "Unexpected value encountered under {} in the TASK BREAKDOWN section: \"{}\"",
                    tag.marker(),
                    line
                ));
                continue;
            }
            state.has_value = true;

            match tag {
                BreakdownTag::Duration => read_duration(line, &mut values, &mut findings),
                BreakdownTag::TestDesign => {
                    values.test_pct = read_percentage(line, tag, &mut findings)
                }
                BreakdownTag::BugInvestigation => {
                    values.bug_pct = read_percentage(line, tag, &mut findings)
                }
                BreakdownTag::SessionSetup => {
                    values.setup_pct = read_percentage(line, tag, &mut findings)
                }
                BreakdownTag::CharterVsOpportunity => {
                    read_charter_vs_opportunity(line, &mut values, &mut findings)
                }
            }
        }

        for tag in BreakdownTag::ALL {
            let state = states[tag.index()];
            if tag.enabled(options) && !(state.found && state.has_value) {
                findings.error(format!("Missing {} in TASK BREAKDOWN section", tag.marker()));
            }
        }

        let task_sum = values
            .setup_pct
            .saturating_add(values.test_pct)
            .saturating_add(values.bug_pct);
        if options.tbs && task_sum != 100 {
            findings.error(
                "Unexpected sum of TASK BREAKDOWN values. Values of #SESSION SETUP, #TEST DESIGN \
                 AND EXECUTION, and #BUG INVESTIGATION AND REPORTING must add up to 100",
            );
        }

        findings.with(values)
    }
}

/// `<class>[*<multiplier>]`
fn read_duration(line: &str, values: &mut BreakdownValues, findings: &mut Findings) {
    let mut parts = line.split('*');
    let class = parts.next().unwrap_or("").trim().to_lowercase();
    let multiplier = match parts.next().map(str::trim) {
        None | Some("") => "1",
        Some(text) => text,
    };

    values.duration_class = DurationClass::parse(&class);
    if values.duration_class.is_none() {
        findings.error(format!(
            "Unexpected #DURATION value \"{}\" in TASK BREAKDOWN section. Legal values are: short, \
             normal, or long",
            class
        ));
    }

    values.multiplier = leading_float(multiplier);
    if !is_positive_number(multiplier) {
        findings.error(format!(
            "Unexpected #DURATION multiplier \"{}\" in TASK BREAKDOWN section. Must be a positive \
             integer or decimal value.",
            multiplier
        ));
    }
}

/// A positive integer or decimal written in canonical form: `2`, `1.5`, `0.75`.
///
/// Leading zeros, trailing zeros after a fraction (`1.50`) and bare points
/// (`2.`) are rejected.
fn is_positive_number(text: &str) -> bool {
    let as_int = leading_int(text);
    if as_int.to_string() == text && as_int > 0 {
        return true;
    }
    let as_float = leading_float(text);
    format_real(as_float) == text && as_float > 0.0
}

fn read_percentage(line: &str, tag: BreakdownTag, findings: &mut Findings) -> i64 {
    let value = leading_int(line);
    if !(0..=100).contains(&value) || !line.chars().all(|c| c.is_ascii_digit()) {
        findings.error(format!(
            "Unexpected {} value in TASK BREAKDOWN section. Ensure that the value is an integer \
             from 0-100.",
            tag.marker()
        ));
    }
    value
}

/// `<charter><sep><opportunity>`, where the separator is whatever non-word
/// character sits between the two numbers (normally `/`).
fn read_charter_vs_opportunity(line: &str, values: &mut BreakdownValues, findings: &mut Findings) {
    let separator = charter_separator(line);
    if separator.is_none() {
        findings.error(format!(
            "Unexpected #CHARTER VS. OPPORTUNITY value \"{}\" in TASK BREAKDOWN section. Ensure \
             that the values are integers from 0-100 separated by '/'.",
            line
        ));
    }

    let parts: Vec<&str> = match separator {
        Some(sep) if !sep.is_whitespace() => line.split(sep).collect(),
        _ => line.split_whitespace().collect(),
    };
    let half = |index: usize| -> i64 {
        match parts.get(index).map(|part| part.trim()) {
            None | Some("") => 0,
            Some(part) => leading_int(part),
        }
    };
    values.charter_pct = half(0);
    values.opportunity_pct = half(1);

    if values.charter_pct.saturating_add(values.opportunity_pct) != 100 {
        findings.error(
            "#CHARTER VS. OPPORTUNITY value does not add up to 100 in TASK BREAKDOWN section",
        );
    }
}

/// Match `^\d+\s*(\W)\s*\d+` and return the captured separator.
fn charter_separator(line: &str) -> Option<char> {
    let chars: Vec<char> = line.chars().collect();
    let digits = chars.iter().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let spaces = chars[digits..]
        .iter()
        .take_while(|c| c.is_whitespace())
        .count();

    // Greedy whitespace first, then give characters back to the separator.
    (0..=spaces).rev().find_map(|taken| {
        let sep = *chars.get(digits + taken)?;
        if is_word_char(sep) {
            return None;
        }
        let after = &chars[digits + taken + 1..];
        let gap = after.iter().take_while(|c| c.is_whitespace()).count();
        after
            .get(gap)
            .filter(|c| c.is_ascii_digit())
            .map(|_| sep)
    })
}
