//! The published, read-only view of the roster's load state.

use hashbrown::HashMap;

/// Moving average and sample standard deviation of a server's recent load rates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowStats {
    /// Moving average of recent per-interval rates.
    pub average: f64,
    /// Sample standard deviation of recent per-interval rates.
    pub stddev: f64,
}

impl WindowStats {
    /// The "loaded" threshold for this server: `average + 2 * stddev`.
    pub(crate) fn threshold(&self) -> f64 {
        self.average + 2.0 * self.stddev
    }
}

/// The load manager's published, read-only snapshot.
///
/// A server id is present here iff it has survived at least one successful refresh since
/// being added and has not since been removed. Readers never observe a snapshot containing
/// data from two different refresh rounds for the same id, because this whole struct is
/// replaced as one unit on every publish.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub(crate) inst_load: HashMap<String, f64>,
    pub(crate) moving_stats: HashMap<String, WindowStats>,
}

impl Snapshot {
    /// Instantaneous load for `id`, if it has a published entry.
    pub(crate) fn inst_load(&self, id: &str) -> Option<f64> {
        self.inst_load.get(id).copied()
    }

    /// Moving statistics for `id`, if it has a published entry.
    pub(crate) fn stats(&self, id: &str) -> Option<WindowStats> {
        self.moving_stats.get(id).copied()
    }

    pub(crate) fn remove(&mut self, id: &str) {
        self.inst_load.remove(id);
        self.moving_stats.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let stats = WindowStats {
            average: 3.3333333333,
            stddev: 5.7735026919,
        };
        assert!((stats.threshold() - 14.8803386757).abs() < 1e-6);
    }

    #[test]
    fn test_remove_purges_both_maps() {
        let mut snap = Snapshot::default();
        snap.inst_load.insert("a".to_string(), 1.0);
        snap.moving_stats.insert(
            "a".to_string(),
            WindowStats {
                average: 1.0,
                stddev: 0.0,
            },
        );
        snap.remove("a");
        assert!(snap.inst_load("a").is_none());
        assert!(snap.stats("a").is_none());
    }
}
