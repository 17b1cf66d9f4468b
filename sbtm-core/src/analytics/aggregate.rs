//! Group-by folds over session records.
//!
//! Each fold sums [`Totals`] into an ordered map keyed by a typed key (date,
//! tester name, coverage area).

use crate::types::{DerivedMetrics, SessionRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::ops::AddAssign;

/// Session records of one scan, keyed by lower-cased file name.
pub type SessionMap = BTreeMap<String, SessionRecord>;

/// Group name (tester or area) to the sessions listed under it, in scan order.
///
/// A session may appear more than once under the same name when the sheet
/// lists it twice.
pub type SessionIndex = BTreeMap<String, Vec<String>>;

/// Summed metrics plus bug and issue counts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub metrics: DerivedMetrics,
    pub bugs: f64,
    pub issues: f64,
}

impl Totals {
    /// The contribution of one session.
    pub fn of(record: &SessionRecord) -> Self {
        Self {
            metrics: *record.metrics(),
            bugs: record.bugs as f64,
            issues: record.issues as f64,
        }
    }

    /// Every value divided by `divisor`.
    pub fn divided_by(&self, divisor: f64) -> Self {
        Self {
            metrics: self.metrics.divided_by(divisor),
            bugs: self.bugs / divisor,
            issues: self.issues / divisor,
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        self.metrics += other.metrics;
        self.bugs += other.bugs;
        self.issues += other.issues;
    }
}

/// Totals per calendar day, newest day first.
pub fn by_date(sessions: &SessionMap) -> Vec<(NaiveDate, Totals)> {
    let mut days: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for record in sessions.values() {
        *days.entry(record.date()).or_default() += Totals::of(record);
    }
    days.into_iter().rev().collect()
}

/// One tester's share of a session.
#[derive(Debug, Clone)]
pub struct TesterShare<'a> {
    pub record: &'a SessionRecord,
    /// The session's totals split evenly across its testers
    pub share: Totals,
}

/// Everything reported about one tester.
#[derive(Debug, Clone)]
pub struct TesterSummary<'a> {
    pub tester: String,
    pub sessions: Vec<TesterShare<'a>>,
    pub total: Totals,
    /// Per-day totals, oldest day first
    pub days: BTreeMap<NaiveDate, Totals>,
}

/// Fold each tester's sessions, splitting every session across its testers.
///
/// Sessions in the index without a record (no valid START timestamp) are
/// left out.
pub fn by_tester<'a>(sessions: &'a SessionMap, testers: &SessionIndex) -> Vec<TesterSummary<'a>> {
    testers
        .iter()
        .map(|(tester, names)| {
            let mut summary = TesterSummary {
                tester: tester.clone(),
                sessions: Vec::new(),
                total: Totals::default(),
                days: BTreeMap::new(),
            };
            for record in names.iter().filter_map(|name| sessions.get(name)) {
                let share = Totals::of(record).divided_by(record.tester_count.max(1) as f64);
                summary.total += share;
                *summary.days.entry(record.date()).or_default() += share;
                summary.sessions.push(TesterShare { record, share });
            }
            summary
        })
        .collect()
}

/// Everything reported about one coverage area.
#[derive(Debug, Clone)]
pub struct AreaSummary<'a> {
    pub area: String,
    /// Whether any sheet named the area at all
    pub covered: bool,
    pub sessions: Vec<&'a SessionRecord>,
    pub total: Totals,
}

/// Fold sessions by coverage area, one summary per area in the roster.
///
/// The roster is sorted so areas without sessions still show up in order.
pub fn by_area<'a>(
    sessions: &'a SessionMap,
    areas: &SessionIndex,
    roster: &[String],
) -> Vec<AreaSummary<'a>> {
    let mut roster: Vec<&String> = roster.iter().collect();
    roster.sort();
    roster.dedup();

    roster
        .into_iter()
        .map(|area| {
            let names = areas.get(area);
            let records: Vec<&SessionRecord> = names
                .into_iter()
                .flatten()
                .filter_map(|name| sessions.get(name))
                .collect();
            let mut total = Totals::default();
            for record in &records {
                total += Totals::of(record);
            }
            AreaSummary {
                area: area.clone(),
                covered: names.is_some(),
                sessions: records,
                total,
            }
        })
        .collect()
}

/// All sessions, latest START first. Equal start times keep file-name order.
pub fn newest_first(sessions: &SessionMap) -> Vec<&SessionRecord> {
    let mut records: Vec<&SessionRecord> = sessions.values().collect();
    records.sort_by(|a, b| {
        b.started_at
            .cmp(&a.started_at)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionBreakdown;
    use chrono::NaiveDateTime;

    fn at(text: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M").unwrap()
    }

    fn record(name: &str, start: &str, n_total: f64, bugs: usize, testers: usize) -> SessionRecord {
        let mut breakdown = SessionBreakdown::zero();
        breakdown.metrics = DerivedMetrics {
            n_total,
            n_charter: n_total,
            n_test: n_total / 2.0,
            ..Default::default()
        };
        SessionRecord {
            file_name: name.to_string(),
            started_at: at(start),
            breakdown,
            bugs,
            issues: 0,
            tester_count: testers,
        }
    }

    fn sessions(records: Vec<SessionRecord>) -> SessionMap {
        records
            .into_iter()
            .map(|r| (r.file_name.clone(), r))
            .collect()
    }

    fn index(entries: &[(&str, &[&str])]) -> SessionIndex {
        entries
            .iter()
            .map(|(key, names)| {
                (
                    key.to_string(),
                    names.iter().map(|n| n.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_by_date_sums_and_sorts_descending() {
        let map = sessions(vec![
            record("et-pc-240115-a.ses", "2024-01-15 09:00", 1.0, 2, 1),
            record("et-pc-240115-b.ses", "2024-01-15 13:00", 0.5, 1, 1),
            record("et-pc-240116-a.ses", "2024-01-16 09:00", 2.0, 0, 1),
        ]);

        let days = by_date(&map);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].0, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
        assert_eq!(days[1].1.metrics.n_total, 1.5);
        assert_eq!(days[1].1.bugs, 3.0);
    }

    #[test]
    fn test_by_tester_splits_shared_sessions() {
        let map = sessions(vec![
            record("et-ps-240115-a.ses", "2024-01-15 09:00", 2.0, 1, 2),
            record("et-ps-240116-a.ses", "2024-01-16 09:00", 1.0, 0, 1),
        ]);
        let testers = index(&[
            ("Paul", &["et-ps-240115-a.ses", "et-ps-240116-a.ses"]),
            ("Sam", &["et-ps-240115-a.ses"]),
        ]);

        let summaries = by_tester(&map, &testers);
        assert_eq!(summaries.len(), 2);

        let paul = &summaries[0];
        assert_eq!(paul.tester, "Paul");
        assert_eq!(paul.sessions.len(), 2);
        assert_eq!(paul.sessions[0].share.metrics.n_total, 1.0);
        assert_eq!(paul.sessions[0].share.bugs, 0.5);
        assert_eq!(paul.total.metrics.n_total, 2.0);
        assert_eq!(paul.days.len(), 2);

        let sam = &summaries[1];
        assert_eq!(sam.total.metrics.n_total, 1.0);
        assert_eq!(sam.total.bugs, 0.5);
    }

    #[test]
    fn test_by_tester_skips_sessions_without_records() {
        let map = sessions(vec![record("et-pc-240115-a.ses", "2024-01-15 09:00", 1.0, 0, 1)]);
        let testers = index(&[("Paul", &["et-pc-240115-a.ses", "et-pc-240115-b.ses"])]);

        let summaries = by_tester(&map, &testers);
        assert_eq!(summaries[0].sessions.len(), 1);
        assert_eq!(summaries[0].total.metrics.n_total, 1.0);
    }

    #[test]
    fn test_by_area_keeps_full_roster() {
        let map = sessions(vec![
            record("et-pc-240115-a.ses", "2024-01-15 09:00", 1.0, 1, 2),
            record("et-pc-240116-a.ses", "2024-01-16 09:00", 1.0, 1, 1),
        ]);
        let areas = index(&[("LOGIN", &["et-pc-240115-a.ses", "et-pc-240116-a.ses"])]);
        let roster = vec!["REPORTS".to_string(), "LOGIN".to_string()];

        let summaries = by_area(&map, &areas, &roster);
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].area, "LOGIN");
        assert!(summaries[0].covered);
        // Coverage totals are not split across testers
        assert_eq!(summaries[0].total.metrics.n_total, 2.0);
        assert_eq!(summaries[0].total.bugs, 2.0);

        assert_eq!(summaries[1].area, "REPORTS");
        assert!(!summaries[1].covered);
        assert!(summaries[1].sessions.is_empty());
    }

    #[test]
    fn test_newest_first_breaks_ties_by_name() {
        let map = sessions(vec![
            record("et-ab-240115-a.ses", "2024-01-15 09:00", 1.0, 0, 1),
            record("et-pc-240115-a.ses", "2024-01-15 09:00", 1.0, 0, 1),
            record("et-pc-240116-a.ses", "2024-01-16 08:00", 1.0, 0, 1),
        ]);

        let names: Vec<&str> = newest_first(&map)
            .iter()
            .map(|r| r.file_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["et-pc-240116-a.ses", "et-ab-240115-a.ses", "et-pc-240115-a.ses"]
        );
    }
}
