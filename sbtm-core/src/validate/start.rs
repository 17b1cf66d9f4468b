//! START section
//!
//! Holds a single time stamp such as `01/15/2024 09:00am` or `1/15/24 13:30`.
//! Dates are month/day/year; two-digit years are in the 2000s.

use super::{trimmed_lines, SectionValidator, SheetContext};
use crate::diagnostics::{Checked, Findings};
use crate::types::{file_name_date, SectionKind, SessionKind};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Validates START and extracts the session's start time.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartValidator;

impl SectionValidator for StartValidator {
    /// Last time stamp found, if any
    type Output = Option<NaiveDateTime>;

    fn section(&self) -> SectionKind {
        SectionKind::Start
    }

    fn validate(&self, lines: &[String], ctx: &SheetContext) -> Checked<Option<NaiveDateTime>> {
        let mut findings = Findings::new();
        let mut started_at = None;
        let name_date = file_name_date(ctx.file_name);

        for line in trimmed_lines(lines) {
            match parse_timestamp(line) {
                Some(timestamp) => {
                    if started_at.is_some() {
                        findings.error("Multiple time stamps detected in START section");
                    } else if ctx.kind == SessionKind::Test {
                        let matches_name = name_date.as_ref().is_some_and(|date| {
                            use chrono::Datelike;
                            timestamp.month() == date.month
                                && timestamp.day() == date.day
                                && format!("{:02}", timestamp.year().rem_euclid(100)) == date.year
                        });
                        if !matches_name {
                            findings.error("File name does not match date in START section");
                        }
                    }
                    started_at = Some(timestamp);
                }
                None => {
                    findings.error(format!(
                        "Unexpected text found \"{}\" in START section. Ensure that the time stamp \
                         is in this format: mm/dd/yyyy hh:mm{{am|pm}}. 12-hr or 24-hr time format works.",
                        line
                    ));
                }
            }
        }

        match ctx.kind {
            SessionKind::Test if started_at.is_none() => {
                findings.error("Missing time stamp in START section");
            }
            SessionKind::Todo if started_at.is_some() => {
                findings.error(
                    "START section must be empty if the sheet is named as a TODO. Did you forget \
                     to rename the session sheet?",
                );
            }
            _ => {}
        }

        findings.with(started_at)
    }
}

/// Find `m/d/y <time>` anywhere in a line and build a timestamp from it.
///
/// Returns `None` when there is no such date, or the date or time is not a
/// real one (`02/30/2024`, `25:00`).
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let (month, day, year, time) = split_date(line)?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.and_time(parse_time(time)?))
}

/// Locate `digits/digits/digits{2,4}` followed by whitespace and more text.
fn split_date(line: &str) -> Option<(u32, u32, i32, &str)> {
    let bytes = line.as_bytes();
    let run = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    (0..bytes.len())
        .filter(|&i| bytes[i].is_ascii_digit() && (i == 0 || !bytes[i - 1].is_ascii_digit()))
        .find_map(|start| {
            let month_len = run(start);
            let mut pos = start + month_len;
            (bytes.get(pos) == Some(&b'/')).then_some(())?;
            let day_start = pos + 1;
            let day_len = run(day_start);
            (day_len > 0).then_some(())?;
            pos = day_start + day_len;
            (bytes.get(pos) == Some(&b'/')).then_some(())?;
            let year_start = pos + 1;
            let year_len = run(year_start);
            (2..=4).contains(&year_len).then_some(())?;
            pos = year_start + year_len;

            let rest = &line[pos..];
            let time = rest.trim_start();
            if time.len() == rest.len() || time.is_empty() {
                return None;
            }

            let month = line[start..start + month_len].parse().ok()?;
            let day = line[day_start..day_start + day_len].parse().ok()?;
            let mut year: i32 = line[year_start..year_start + year_len].parse().ok()?;
            if year_len == 2 {
                year += 2000;
            }
            Some((month, day, year, time))
        })
}

/// `9:00`, `09:00am`, `1:30 PM`, `13:30`, `13:30:15`.
fn parse_time(text: &str) -> Option<NaiveTime> {
    let lower = text.trim().to_ascii_lowercase();
    let (clock, meridiem) = if let Some(clock) = lower.strip_suffix("am") {
        (clock.trim_end(), Some(false))
    } else if let Some(clock) = lower.strip_suffix("pm") {
        (clock.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let mut parts = clock.split(':');
    let number = |part: Option<&str>| -> Option<u32> {
        let part = part?;
        if part.is_empty() || part.len() > 2 || !part.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        part.parse().ok()
    };
    let mut hour = number(parts.next())?;
    let minute = number(parts.next())?;
    let second = match parts.next() {
        Some(part) => number(Some(part))?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    match meridiem {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}
