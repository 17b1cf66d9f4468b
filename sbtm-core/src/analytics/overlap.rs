//! Date-time collision check.
//!
//! Per tester, sessions are ordered by name (names carry the date) and each
//! session is compared with the next one only. Two findings are possible:
//! identical START timestamps, usually a copy-and-paste slip, and a session
//! that starts before the previous one has ended, less an allowed overlap.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// A session on one tester's timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    /// Upper-cased session file name
    pub session: String,
    pub started_at: NaiveDateTime,
    /// Not rounded; `normal * 1.25` at a 90 minute timebox is 112.5
    pub duration_minutes: f64,
}

/// Collects timelines during a scan and checks them afterwards.
#[derive(Debug, Clone, Default)]
pub struct OverlapCheck {
    allowable_overlap_minutes: f64,
    timelines: BTreeMap<String, Vec<TimelineEntry>>,
}

impl OverlapCheck {
    pub fn new(allowable_overlap_minutes: f64) -> Self {
        Self {
            allowable_overlap_minutes,
            timelines: BTreeMap::new(),
        }
    }

    /// Add a session to a tester's timeline. Tester names are matched
    /// case-insensitively.
    pub fn record(&mut self, tester: &str, entry: TimelineEntry) {
        self.timelines
            .entry(tester.to_lowercase())
            .or_default()
            .push(entry);
    }

    /// Number of testers with at least one session.
    pub fn testers(&self) -> usize {
        self.timelines.len()
    }

    /// Error messages for every collision, testers in name order.
    pub fn check(&self) -> Vec<String> {
        let overlap_seconds = self.allowable_overlap_minutes * 60.0;
        let mut errors = Vec::new();

        for (tester, timeline) in &self.timelines {
            let mut ordered: Vec<&TimelineEntry> = timeline.iter().collect();
            ordered.sort_by(|a, b| a.session.cmp(&b.session));

            for pair in ordered.windows(2) {
                let (first, second) = (pair[0], pair[1]);
                if first.started_at == second.started_at {
                    errors.push(format!(
                        "START timestamps for two sessions are identical: \"{}\" and \"{}\"",
                        first.session, second.session
                    ));
                    continue;
                }

                let gap = (second.started_at - first.started_at).num_seconds() as f64;
                let allowed = first.duration_minutes * 60.0 - overlap_seconds;
                if gap < allowed {
                    tracing::debug!(tester = %tester, first = %first.session, second = %second.session, "Sessions overlap");
                    errors.push(format!(
                        "START timestamp in \"{}\" begins *before* the previous session \"{}\" has ended!",
                        second.session, first.session
                    ));
                }
            }
        }

        errors
    }
}
