//! A single roster member's mutable state.

use crate::handle::ServerHandle;
use crate::prober::ProbeWorker;
use crate::snapshot::WindowStats;
use crate::window::MovingStats;
use std::sync::Arc;

/// One server's entry in the load manager's roster.
///
/// This has no lock of its own — the whole roster lives behind the load manager's single
/// roster lock rather than a lock per server.
pub(crate) struct ServerEntry {
    pub(crate) client: Arc<dyn ServerHandle>,
    pub(crate) prober: Arc<ProbeWorker>,
    pub(crate) cumulative_load: f64,
    pub(crate) last_uptime: f64,
    pub(crate) window: MovingStats,
    /// The last rate and window statistics this entry contributed to a snapshot, if it has
    /// ever been refreshed successfully. `None` means this server hasn't completed a refresh
    /// yet and should not be reported as loaded or unloaded.
    pub(crate) last_published: Option<(f64, WindowStats)>,
}

impl ServerEntry {
    pub(crate) fn new(client: Arc<dyn ServerHandle>, window_size: usize) -> Self {
        let prober = Arc::new(ProbeWorker::spawn(Arc::clone(&client)));
        Self {
            client,
            prober,
            cumulative_load: 0.0,
            last_uptime: 0.0,
            window: MovingStats::new(window_size),
            last_published: None,
        }
    }

    /// Commit one round's refresh result: advance `cumulative_load`/`last_uptime`, append the
    /// rate to the window, and cache what this round publishes.
    pub(crate) fn commit(&mut self, new_cumulative: f64, elapsed: f64, rate: f64) {
        self.cumulative_load = new_cumulative;
        self.last_uptime += elapsed;
        self.window.add(rate);
        self.last_published = Some((
            rate,
            WindowStats {
                average: self.window.average(),
                stddev: self.window.stddev(),
            },
        ));
    }
}
