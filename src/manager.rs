use crate::config::ManagerConfig;
use crate::entry::ServerEntry;
use crate::handle::ServerHandle;
use crate::prober::ProbeWorker;
use crate::snapshot::{Snapshot, WindowStats};
use arc_swap::ArcSwap;
use hashbrown::HashMap;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// Elapsed times below this are treated as "zero or negative".
const ELAPSED_EPSILON: f64 = 1e-6;

/// Shared state between the public `LoadManager` handle and its background refresher thread.
struct Inner {
    roster: Mutex<HashMap<String, ServerEntry>>,
    snapshot: ArcSwap<Snapshot>,
    config: ManagerConfig,
}

/// A condvar-interruptible sleep, used so the refresher's inter-round wait can be woken early
/// by `Drop` rather than left running as an undroppable daemon thread.
struct Shutdown {
    requested: Mutex<bool>,
    condvar: Condvar,
}

impl Shutdown {
    fn new() -> Self {
        Self {
            requested: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Sleep for `duration` unless shutdown is (or becomes) requested. Returns `true` if the
    /// refresher should stop.
    fn sleep(&self, duration: Duration) -> bool {
        let mut requested = self.requested.lock();
        if *requested {
            return true;
        }
        self.condvar.wait_for(&mut requested, duration);
        *requested
    }

    fn signal(&self) {
        *self.requested.lock() = true;
        self.condvar.notify_all();
    }
}

/// Owns the server roster and per-server load state for a fleet of memcached-compatible
/// servers, running a background refresher that periodically scrapes each server's `stats()`
/// and publishes a consistent snapshot for routing queries to consult.
pub struct LoadManager {
    inner: Arc<Inner>,
    shutdown: Arc<Shutdown>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl LoadManager {
    /// Create a new manager with defaults (`refresh_rate=1`, `load_metric=cum_req`,
    /// `window_size=100`).
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create a new manager with custom config, starting its background refresher.
    pub fn with_config(config: ManagerConfig) -> Self {
        let inner = Arc::new(Inner {
            roster: Mutex::new(HashMap::new()),
            snapshot: ArcSwap::from_pointee(Snapshot::default()),
            config,
        });
        let shutdown = Arc::new(Shutdown::new());

        let refresher_inner = Arc::clone(&inner);
        let refresher_shutdown = Arc::clone(&shutdown);
        let thread = thread::spawn(move || run_refresher(refresher_inner, refresher_shutdown));

        Self {
            inner,
            shutdown,
            thread: Mutex::new(Some(thread)),
        }
    }

    /// Install or replace a server entry. The id gains snapshot entries on its first
    /// successful refresh.
    pub fn add_server(&self, id: impl Into<String>, client: Arc<dyn ServerHandle>) {
        let id = id.into();
        let window_size = self.inner.config.window_size;
        self.inner
            .roster
            .lock()
            .insert(id, ServerEntry::new(client, window_size));
    }

    /// Remove a server from the roster and purge it from the snapshot. Any refresh round
    /// currently sampling this id will discard its update for it on commit.
    pub fn remove_server(&self, id: &str) {
        let removed = self.inner.roster.lock().remove(id);
        if let Some(entry) = removed {
            entry.client.close();
        }
        // `rcu` retries the read-copy-update under contention, so this purge can never lose
        // a race against a refresh round publishing a snapshot that still names `id`.
        self.inner.snapshot.rcu(|snap| {
            let mut next = (**snap).clone();
            next.remove(id);
            next
        });
    }

    /// The current instantaneous-load snapshot: rate over the last refresh interval, per id.
    pub fn load(&self) -> HashMap<String, f64> {
        self.inner.snapshot.load().inst_load.clone()
    }

    /// The current windowed load statistics (moving average and standard deviation), per id.
    pub fn load_statistics(&self) -> HashMap<String, WindowStats> {
        self.inner.snapshot.load().moving_stats.clone()
    }

    #[cfg(test)]
    pub(crate) fn inject_snapshot_for_test(&self, snapshot: Snapshot) {
        self.inner.snapshot.store(Arc::new(snapshot));
    }

    #[cfg(test)]
    pub(crate) fn run_refresh_round_for_test(&self) {
        refresh_round(&self.inner);
    }
}

impl Default for LoadManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LoadManager {
    fn drop(&mut self) {
        self.shutdown.signal();
        if let Some(handle) = self.thread.lock().take() {
            drop(handle.join());
        }
    }
}

fn run_refresher(inner: Arc<Inner>, shutdown: Arc<Shutdown>) {
    let period = Duration::from_secs(inner.config.refresh_rate);
    loop {
        if shutdown.sleep(period) {
            break;
        }
        refresh_round(&inner);
    }
}

/// One traversal of the roster: probe every server, compute the new load metric, and publish
/// the round's results as a single atomic batch.
fn refresh_round(inner: &Arc<Inner>) {
    let refresh_rate = inner.config.refresh_rate;
    let timeout = Duration::from_secs(refresh_rate);

    // Collect phase: snapshot the roster into a local list so `stats()` I/O runs without
    // holding the roster lock. Each server keeps its own persistent probe worker, so a slow
    // or hung server only ever costs that one worker thread, not one per round.
    let candidates: Vec<(String, Arc<ProbeWorker>, f64, f64)> = inner
        .roster
        .lock()
        .iter()
        .map(|(id, entry)| {
            (
                id.clone(),
                Arc::clone(&entry.prober),
                entry.cumulative_load,
                entry.last_uptime,
            )
        })
        .collect();

    let mut results: Vec<(String, f64, f64, f64)> = Vec::with_capacity(candidates.len());

    for (id, prober, prev_cumulative, prev_last_uptime) in candidates {
        let stats = match prober.probe(timeout) {
            Some(Ok(stats)) => stats,
            Some(Err(e)) => {
                debug!(server = %id, error = %e, "stats() failed, skipping this round");
                continue;
            }
            None => {
                warn!(server = %id, "stats() timed out, skipping this round");
                continue;
            }
        };

        let elapsed = match stats.get("uptime") {
            Some(&uptime) => uptime - prev_last_uptime,
            None => refresh_rate as f64,
        };
        if elapsed < ELAPSED_EPSILON {
            debug!(server = %id, elapsed, "elapsed <= 0, skipping update this round");
            continue;
        }

        let (new_cumulative, rate) = inner.config.load_metric.compute(&stats, prev_cumulative, elapsed);
        results.push((id, new_cumulative, elapsed, rate));
    }

    // Commit phase: reacquire the roster lock once to commit results (discarding updates for
    // ids removed mid-round) and build the new snapshot from the roster's resulting state,
    // then publish after releasing the lock.
    let new_snapshot = {
        let mut roster = inner.roster.lock();
        for (id, new_cumulative, elapsed, rate) in results {
            if let Some(entry) = roster.get_mut(&id) {
                entry.commit(new_cumulative, elapsed, rate);
            }
        }

        let mut snapshot = Snapshot::default();
        for (id, entry) in roster.iter() {
            if let Some((rate, stats)) = entry.last_published {
                snapshot.inst_load.insert(id.clone(), rate);
                snapshot.moving_stats.insert(id.clone(), stats);
            }
        }
        snapshot
    };

    inner.snapshot.store(Arc::new(new_snapshot));
}
