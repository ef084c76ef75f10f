//! The two enumerated load metrics.

use crate::handle::{stat_or_zero, StatsMap};

/// Which load metric the refresher uses to turn a `stats()` response into a rate.
///
/// Modeled as a tagged enum with explicit dispatch rather than an open-ended callback: only two
/// metrics are defined and each has specific field requirements on the stats payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMetric {
    /// CPU-time based: `rusage_user + rusage_system`. Approximates CPU utilization.
    RUsage,
    /// Request-count based: `cmd_get + cmd_set + cmd_flush + cmd_touch`. Approximates
    /// requests/second served.
    #[default]
    CumulativeRequest,
}

impl LoadMetric {
    /// Compute `(new_cumulative, rate)` from a `stats()` response, the server's previous
    /// cumulative value, and the elapsed time since the last refresh.
    ///
    /// `elapsed` is assumed to already be checked `> 0` by the caller. A cumulative counter
    /// that appears to have decreased (e.g. a server restart) yields a clamped rate of `0.0`
    /// rather than a negative rate.
    pub(crate) fn compute(&self, stats: &StatsMap, previous_cumulative: f64, elapsed: f64) -> (f64, f64) {
        let new_cumulative = match self {
            LoadMetric::RUsage => stat_or_zero(stats, "rusage_user") + stat_or_zero(stats, "rusage_system"),
            LoadMetric::CumulativeRequest => {
                stat_or_zero(stats, "cmd_get")
                    + stat_or_zero(stats, "cmd_set")
                    + stat_or_zero(stats, "cmd_flush")
                    + stat_or_zero(stats, "cmd_touch")
            }
        };
        let rate = ((new_cumulative - previous_cumulative) / elapsed).max(0.0);
        (new_cumulative, rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test_support::stats;

    #[test]
    fn test_rusage_load() {
        let s = stats(&[("rusage_user", 2.0), ("rusage_system", 1.0)]);
        let (cumulative, rate) = LoadMetric::RUsage.compute(&s, 0.0, 3.0);
        assert_eq!(cumulative, 3.0);
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_cum_req_load() {
        let s = stats(&[
            ("cmd_get", 10.0),
            ("cmd_set", 5.0),
            ("cmd_flush", 1.0),
            ("cmd_touch", 0.0),
        ]);
        let (cumulative, rate) = LoadMetric::CumulativeRequest.compute(&s, 8.0, 2.0);
        assert_eq!(cumulative, 16.0);
        assert_eq!(rate, 4.0);
    }

    #[test]
    fn test_missing_fields_treated_as_zero() {
        let s = stats(&[]);
        let (cumulative, rate) = LoadMetric::CumulativeRequest.compute(&s, 0.0, 1.0);
        assert_eq!(cumulative, 0.0);
        assert_eq!(rate, 0.0);
    }

    #[test]
    fn test_counter_reset_clamped_to_zero() {
        let s = stats(&[("cmd_get", 5.0)]);
        // previous_cumulative (100) > new_cumulative (5): looks like a counter reset.
        let (cumulative, rate) = LoadMetric::CumulativeRequest.compute(&s, 100.0, 1.0);
        assert_eq!(cumulative, 5.0);
        assert_eq!(rate, 0.0);
    }
}
