//! Aggregation of session records
//!
//! After every sheet has been validated, the scanner folds the collected
//! [`SessionRecord`](crate::types::SessionRecord)s into the summary tables
//! and checks each tester's sessions for timestamp collisions.
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────────────────────────────┐
//! │ SessionMap   │──►│ by_date    ──► breakdowns-day.txt          │
//! │ (valid START │   │ by_tester  ──► breakdowns-tester*.txt      │
//! │  only)       │   │ by_area    ──► breakdowns-coverage-*.txt   │
//! └──────────────┘   │ newest_first ► breakdowns.txt              │
//!        ▲           └──────────────────────────────────────────┘
//!        │
//! tester / area SessionIndex (from testers.txt and charters.txt rows)
//! ```

mod aggregate;
mod overlap;
mod tables;

pub use aggregate::{
    by_area, by_date, by_tester, newest_first, AreaSummary, SessionIndex, SessionMap,
    TesterShare, TesterSummary, Totals,
};
pub use overlap::{OverlapCheck, TimelineEntry};
pub use tables::{write_breakdowns, write_coverage_tables, write_day_totals, write_tester_tables};
