//! Session metrics
//!
//! Turns raw TASK BREAKDOWN values into a session length and N-values:
//!
//! ```text
//! duration  = weight(class) * multiplier       weight: long/normal, 1, short/normal
//!                                              (0 without a #DURATION value line)
//! n_total   = duration * testers
//! n_charter = n_total * charter%       n_opportunity = n_total * opportunity%
//! n_test    = n_total * test%  * f     f = charter% when C vs O is on, else 1
//! n_bug     = n_total * bug%   * f
//! n_prep    = n_total * setup% * f
//! ```
//!
//! Test, bug and setup time only happens on charter time, hence the extra
//! charter factor. With Duration off the reported duration and `n_total` are 0
//! while the splits are taken from a nominal total of 1.

use crate::config::{ScanOptions, TimeboxConfig};
use crate::types::{BreakdownValues, DerivedMetrics, DurationClass, SessionBreakdown};

/// Duration of a session in normal-session units.
pub fn session_duration(values: &BreakdownValues, timebox: &TimeboxConfig) -> f64 {
    let weight = match values.duration_class {
        Some(DurationClass::Long) => timebox.long_weight(),
        Some(DurationClass::Normal) => 1.0,
        Some(DurationClass::Short) | None => timebox.short_weight(),
    };
    weight * values.multiplier
}

/// Compute duration and N-values for one session.
pub fn derive(
    values: BreakdownValues,
    tester_count: usize,
    options: &ScanOptions,
    timebox: &TimeboxConfig,
) -> SessionBreakdown {
    let testers = tester_count as f64;
    let (duration, basis) = if options.duration {
        let duration = session_duration(&values, timebox);
        (duration, duration * testers)
    } else {
        (0.0, 1.0)
    };

    let charter_factor = if options.charter_vs_opportunity {
        values.charter_pct as f64 / 100.0
    } else {
        1.0
    };
    let share = |pct: i64| basis * pct as f64 / 100.0;

    let metrics = DerivedMetrics {
        n_total: duration * testers,
        n_charter: share(values.charter_pct),
        n_opportunity: share(values.opportunity_pct),
        n_test: share(values.test_pct) * charter_factor,
        n_bug: share(values.bug_pct) * charter_factor,
        n_prep: share(values.setup_pct) * charter_factor,
    };

    SessionBreakdown {
        values,
        duration,
        metrics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(class: DurationClass, multiplier: f64) -> BreakdownValues {
        BreakdownValues {
            duration_class: Some(class),
            multiplier,
            test_pct: 70,
            bug_pct: 20,
            setup_pct: 10,
            ..Default::default()
        }
    }

    fn duration_and_tbs() -> ScanOptions {
        ScanOptions {
            duration: true,
            tbs: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_single_normal_session() {
        let breakdown = derive(
            values(DurationClass::Normal, 1.0),
            1,
            &duration_and_tbs(),
            &TimeboxConfig::default(),
        );
        let m = breakdown.metrics;

        assert_eq!(breakdown.duration, 1.0);
        assert_eq!(m.n_total, 1.0);
        assert_eq!(m.n_charter, 1.0);
        assert_eq!(m.n_opportunity, 0.0);
        assert_eq!(m.n_test, 0.7);
        assert_eq!(m.n_bug, 0.2);
        assert_eq!(m.n_prep, 0.1);
    }

    #[test]
    fn test_long_session_with_two_testers() {
        let timebox = TimeboxConfig::default();
        let breakdown = derive(
            values(DurationClass::Long, 1.5),
            2,
            &duration_and_tbs(),
            &timebox,
        );

        let duration = 120.0 / 90.0 * 1.5;
        assert!((breakdown.duration - duration).abs() < 1e-12);
        assert!((breakdown.metrics.n_total - duration * 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_class_counts_as_short() {
        let timebox = TimeboxConfig::default();
        let mut raw = values(DurationClass::Short, 1.0);
        raw.duration_class = None;
        assert_eq!(
            session_duration(&raw, &timebox),
            timebox.short_weight()
        );
    }

    #[test]
    fn test_missing_duration_value_gives_no_time() {
        let raw = BreakdownValues {
            test_pct: 70,
            bug_pct: 20,
            setup_pct: 10,
            ..Default::default()
        };
        let breakdown = derive(raw, 1, &duration_and_tbs(), &TimeboxConfig::default());
        assert_eq!(breakdown.duration, 0.0);
        assert_eq!(breakdown.metrics.n_total, 0.0);
        assert_eq!(breakdown.metrics.n_test, 0.0);
        assert_eq!(breakdown.metrics.n_charter, 0.0);
    }

    #[test]
    fn test_charter_factor_applies_to_task_splits() {
        let options = ScanOptions {
            duration: true,
            tbs: true,
            charter_vs_opportunity: true,
            ..Default::default()
        };
        let mut raw = values(DurationClass::Normal, 2.0);
        raw.charter_pct = 50;
        raw.opportunity_pct = 50;

        let m = derive(raw, 1, &options, &TimeboxConfig::default()).metrics;
        assert_eq!(m.n_total, 2.0);
        assert_eq!(m.n_charter, 1.0);
        assert_eq!(m.n_opportunity, 1.0);
        assert!((m.n_test - 0.7).abs() < 1e-12);
        assert!((m.n_prep - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_duration_off_uses_nominal_total() {
        let options = ScanOptions {
            tbs: true,
            ..Default::default()
        };
        let breakdown = derive(
            values(DurationClass::Long, 3.0),
            3,
            &options,
            &TimeboxConfig::default(),
        );
        assert_eq!(breakdown.duration, 0.0);
        assert_eq!(breakdown.metrics.n_total, 0.0);
        assert_eq!(breakdown.metrics.n_charter, 1.0);
        assert_eq!(breakdown.metrics.n_test, 0.7);
    }
}
