//! Rendering of the aggregate tables.

use super::aggregate::{
    by_area, by_date, by_tester, newest_first, AreaSummary, SessionIndex, SessionMap,
    TesterSummary, Totals,
};
use crate::error::Result;
use crate::format::{format_date, format_real, format_time};
use crate::outputs::{self, header_with, SESSION_HEADER, TOTALS_COLUMNS};
use crate::tsv::TsvWriter;
use crate::types::{DerivedMetrics, SessionRecord};
use std::path::Path;

/// Count columns hold whole numbers unless they were split across testers.
fn format_count(value: f64) -> String {
    format!("{:.0}", value)
}

fn metric_fields(metrics: &DerivedMetrics) -> [String; 6] {
    [
        format_real(metrics.n_total),
        format_real(metrics.n_charter),
        format_real(metrics.n_opportunity),
        format_real(metrics.n_test),
        format_real(metrics.n_bug),
        format_real(metrics.n_prep),
    ]
}

fn totals_fields(totals: &Totals, count: fn(f64) -> String) -> Vec<String> {
    let mut fields = metric_fields(&totals.metrics).to_vec();
    fields.push(count(totals.bugs));
    fields.push(count(totals.issues));
    fields
}

/// The 18 session columns. `values` is either the record's own totals or a
/// tester's share of them.
fn session_fields(record: &SessionRecord, values: &Totals, count: fn(f64) -> String) -> Vec<String> {
    let raw = &record.breakdown.values;
    let mut fields = vec![
        record.file_name.clone(),
        format_date(record.date()),
        format_time(record.started_at),
        format_real(record.breakdown.duration),
        raw.charter_pct.to_string(),
        raw.opportunity_pct.to_string(),
        raw.test_pct.to_string(),
        raw.bug_pct.to_string(),
        raw.setup_pct.to_string(),
    ];
    fields.extend(totals_fields(values, count));
    fields.push(record.tester_count.to_string());
    fields
}

/// `breakdowns.txt`: every session, newest first.
pub fn write_breakdowns(dir: &Path, sessions: &SessionMap) -> Result<()> {
    let mut table = TsvWriter::create(&dir.join(outputs::BREAKDOWNS), &SESSION_HEADER)?;
    for record in newest_first(sessions) {
        table.write_row(session_fields(record, &Totals::of(record), format_count))?;
    }
    table.finish()
}

/// `breakdowns-day.txt`: totals per day, newest first.
pub fn write_day_totals(dir: &Path, sessions: &SessionMap) -> Result<()> {
    let header = header_with(&["Date"], &TOTALS_COLUMNS, &[]);
    let mut table = TsvWriter::create(&dir.join(outputs::BREAKDOWNS_DAY), &header)?;
    for (date, totals) in by_date(sessions) {
        let mut row = vec![format_date(date)];
        row.extend(totals_fields(&totals, format_count));
        table.write_row(row)?;
    }
    table.finish()
}

/// The three per-tester tables.
pub fn write_tester_tables(dir: &Path, sessions: &SessionMap, testers: &SessionIndex) -> Result<()> {
    let summaries: Vec<TesterSummary> = by_tester(sessions, testers);

    let tester_header = header_with(&["Tester"], &TOTALS_COLUMNS, &[]);
    let mut totals_table =
        TsvWriter::create(&dir.join(outputs::BREAKDOWNS_TESTERS_TOTAL), &tester_header)?;

    let day_header = header_with(&["Tester", "Date"], &TOTALS_COLUMNS, &[]);
    let mut days_table = TsvWriter::create(&dir.join(outputs::BREAKDOWNS_TESTER_DAY), &day_header)?;

    let sessions_header = header_with(&[], &SESSION_HEADER, &["Tester"]);
    let mut sessions_table =
        TsvWriter::create(&dir.join(outputs::BREAKDOWNS_TESTERS_SESSIONS), &sessions_header)?;

    let mut day_rows = Vec::new();
    for summary in &summaries {
        for share in &summary.sessions {
            let mut row = session_fields(share.record, &share.share, format_real);
            row.push(summary.tester.clone());
            sessions_table.write_row(row)?;
        }

        let mut row = vec![summary.tester.clone()];
        row.extend(totals_fields(&summary.total, format_real));
        totals_table.write_row(row)?;

        day_rows.extend(summary.days.iter().map(|(date, totals)| (*date, &summary.tester, totals)));
    }

    // Day rows are ordered by date, then tester.
    day_rows.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    for (date, tester, totals) in day_rows {
        let mut row = vec![tester.clone(), format_date(date)];
        row.extend(totals_fields(totals, format_real));
        days_table.write_row(row)?;
    }

    totals_table.finish()?;
    days_table.finish()?;
    sessions_table.finish()
}

/// The two coverage tables. Areas nobody covered get placeholder rows.
pub fn write_coverage_tables(
    dir: &Path,
    sessions: &SessionMap,
    areas: &SessionIndex,
    roster: &[String],
) -> Result<()> {
    let summaries: Vec<AreaSummary> = by_area(sessions, areas, roster);

    let sessions_header = header_with(&[], &SESSION_HEADER, &["Area"]);
    let mut sessions_table =
        TsvWriter::create(&dir.join(outputs::BREAKDOWNS_COVERAGE_SESSIONS), &sessions_header)?;

    let totals_header = header_with(&[], &TOTALS_COLUMNS, &["Area"]);
    let mut totals_table =
        TsvWriter::create(&dir.join(outputs::BREAKDOWNS_COVERAGE_TOTAL), &totals_header)?;

    for summary in &summaries {
        let area = summary.area.clone();
        if summary.covered {
            for record in &summary.sessions {
                let mut row = session_fields(record, &Totals::of(record), format_count);
                row.push(area.clone());
                sessions_table.write_row(row)?;
            }
            let mut row = totals_fields(&summary.total, format_count);
            row.push(area);
            totals_table.write_row(row)?;
        } else {
            let mut row = vec![String::new(); SESSION_HEADER.len()];
            row.push(area.clone());
            sessions_table.write_row(row)?;

            let mut row = vec!["0".to_string(); TOTALS_COLUMNS.len()];
            row.push(area);
            totals_table.write_row(row)?;
        }
    }

    sessions_table.finish()?;
    totals_table.finish()
}
