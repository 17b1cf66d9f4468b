//! Recent progress summary, read back from `breakdowns-day.txt`.

use crate::error::Result;
use crate::format::format_summary_number;
use crate::outputs;
use crate::tsv::read_table;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::Path;

/// Totals for one day, as written by the last scan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: String,
    pub total: f64,
    pub on_charter: f64,
    pub opportunity: f64,
    pub test: f64,
    pub bug: f64,
    pub setup: f64,
    pub bugs: f64,
    pub issues: f64,
}

impl DaySummary {
    fn from_row(row: &[String]) -> Option<Self> {
        let [date, values @ ..] = row else {
            return None;
        };
        let numbers: Vec<f64> = values.iter().map(|v| v.trim().parse().ok()).collect::<Option<_>>()?;
        let &[total, on_charter, opportunity, test, bug, setup, bugs, issues] = numbers.as_slice() else {
            return None;
        };
        Some(Self {
            date: date.clone(),
            total,
            on_charter,
            opportunity,
            test,
            bug,
            setup,
            bugs,
            issues,
        })
    }

    fn labelled_values(&self) -> [(&'static str, f64); 8] {
        [
            ("Total", self.total),
            ("On Charter", self.on_charter),
            ("Opportunity", self.opportunity),
            ("Test", self.test),
            ("Bug", self.bug),
            ("Setup", self.setup),
            ("Bugs", self.bugs),
            ("Issues", self.issues),
        ]
    }
}

/// Number of days to show: a positive integer, anything else means 1.
pub fn parse_day_count(arg: Option<&str>) -> usize {
    arg.and_then(|text| text.trim().parse::<usize>().ok())
        .filter(|days| *days > 0)
        .unwrap_or(1)
}

/// The newest `days` rows of `breakdowns-day.txt` in `metrics_dir`.
pub fn recent_days(metrics_dir: &Path, days: usize) -> Result<Vec<DaySummary>> {
    let rows = read_table(&metrics_dir.join(outputs::BREAKDOWNS_DAY))?;
    let summaries = rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let summary = DaySummary::from_row(row);
            if summary.is_none() {
                tracing::warn!(?row, "Skipping malformed day row");
            }
            summary
        })
        .take(days)
        .collect();
    Ok(summaries)
}

/// Day rows as a pretty-printed JSON array.
pub fn days_to_json(days: &[DaySummary]) -> Result<String> {
    Ok(serde_json::to_string_pretty(days)?)
}

/// Render the summary as the console text shown by `sbtm-recent`.
pub fn render_days(days: &[DaySummary], requested: usize, now: DateTime<Local>) -> String {
    let mut out = format!(
        "\nThese are the last {} days of test session progress\n{}\n",
        requested,
        now.format("as of %m/%d/%y at %I:%M%p:").to_string().to_lowercase()
    );
    for day in days {
        out.push('\n');
        out.push_str(&format!("{:>12}: {}\n", "Date", day.date));
        for (label, value) in day.labelled_values() {
            out.push_str(&format!("{:>12}: {}\n", label, format_summary_number(value)));
        }
    }
    out
}
