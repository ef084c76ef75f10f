//! Rendezvous hashing with load avoidance, wired to a backing [`LoadManager`].

use crate::config::ManagerConfig;
use crate::error::Error;
use crate::handle::ServerHandle;
use crate::hash::score;
use crate::manager::LoadManager;
use hashbrown::HashSet;
use parking_lot::RwLock;
use std::sync::Arc;

/// Routes keys to server ids using Highest Random Weight rendezvous hashing, skipping any
/// server whose load has crossed its `average + 2 * stddev` threshold in favor of the next
/// highest-scoring alternative.
pub struct RendezvousRouter {
    ids: RwLock<HashSet<String>>,
    manager: Arc<LoadManager>,
}

impl RendezvousRouter {
    /// Create a router backed by a new `LoadManager` with default configuration.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create a router backed by a new `LoadManager` with custom configuration.
    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_manager(Arc::new(LoadManager::with_config(config)))
    }

    /// Create a router backed by an existing, already-shared `LoadManager`.
    pub fn with_manager(manager: Arc<LoadManager>) -> Self {
        Self {
            ids: RwLock::new(HashSet::new()),
            manager,
        }
    }

    /// The `LoadManager` backing this router, for callers that want to read `load()` or
    /// `load_statistics()` directly.
    pub fn manager(&self) -> &Arc<LoadManager> {
        &self.manager
    }

    /// Add a server to the routable set.
    pub fn add_node(&self, id: impl Into<String>, client: Arc<dyn ServerHandle>) {
        let id = id.into();
        self.ids.write().insert(id.clone());
        self.manager.add_server(id, client);
    }

    /// Remove a server from the routable set.
    pub fn remove_node(&self, id: &str) {
        self.ids.write().remove(id);
        self.manager.remove_server(id);
    }

    /// The ids currently registered with this router, irrespective of their load state.
    pub fn nodes(&self) -> Vec<String> {
        self.ids.read().iter().cloned().collect()
    }

    /// Pick a server id for `key`.
    ///
    /// Scores every registered id via rendezvous hashing and walks candidates in descending
    /// `(score, id)` order (ties broken by the lexicographically greatest id). Returns the
    /// first candidate whose instantaneous load is below its own `average + 2 * stddev`
    /// threshold; if every candidate is loaded, falls back to the single highest-scoring id.
    pub fn get_node(&self, key: &str) -> Result<String, Error> {
        let ids = self.ids.read();
        if ids.is_empty() {
            return Err(Error::NoServers);
        }

        let mut candidates: Vec<(u32, &str)> = ids.iter().map(|id| (score(id, key), id.as_str())).collect();
        candidates.sort_unstable_by(|a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(a.1)));

        let winner_by_score = candidates[0].1.to_string();

        let inst_load = self.manager.load();
        let load_stats = self.manager.load_statistics();

        let winner_overall = candidates.iter().find_map(|(_, id)| {
            // A server with no published entry yet (bootstrap grace) has no load data to
            // avoid, so it is always a valid candidate.
            let load = inst_load.get(*id).copied().unwrap_or(0.0);
            let threshold = load_stats.get(*id).map(|s| s.threshold()).unwrap_or(f64::INFINITY);
            if load < threshold {
                Some((*id).to_string())
            } else {
                None
            }
        });

        Ok(winner_overall.unwrap_or(winner_by_score))
    }
}

impl Default for RendezvousRouter {
    fn default() -> Self {
        Self::new()
    }
}
