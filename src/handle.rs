//! The caller-supplied server handle boundary.

use crate::error::HandleError;
use hashbrown::HashMap;

/// A mapping from memcached stat names to their numeric values, as returned by a single
/// `stats()` probe.
///
/// The core only reads a fixed set of keys (`rusage_user`, `rusage_system`, `cmd_get`,
/// `cmd_set`, `cmd_flush`, `cmd_touch`, `uptime`); anything else in the map is ignored.
pub type StatsMap = HashMap<String, f64>;

/// An opaque reference to a single backend server.
///
/// The core never opens a socket itself — callers hand in something that already knows how
/// to talk to one memcached-compatible server, and the load manager only ever calls `stats()`
/// and, on removal, `close()`.
pub trait ServerHandle: Send + Sync {
    /// Probe the server for its current counters.
    ///
    /// Implementations should map socket errors, timeouts, and resets to a [`HandleError`]
    /// rather than panicking — the refresher treats every `stats()` failure as "skip this
    /// server this round", never as a crash.
    fn stats(&self) -> Result<StatsMap, HandleError>;

    /// Release any resources held by this handle. Idempotent: called once on
    /// `remove_server`/manager teardown, but must tolerate being called more than once.
    fn close(&self);
}

/// Read a fixed stat key, treating a missing entry as `0.0`.
pub(crate) fn stat_or_zero(stats: &StatsMap, key: &str) -> f64 {
    stats.get(key).copied().unwrap_or(0.0)
}
