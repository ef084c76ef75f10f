//! # loadhash
//!
//! A **load-aware rendezvous hashing layer** for a fleet of memcached-compatible servers. Built
//! for clients that want deterministic key-to-server routing (Highest Random Weight) without
//! piling requests onto a server that is visibly overloaded.
//!
//! ## Design
//!
//! - **Deterministic routing** — `get_node(key)` always returns the same server id for the same
//!   key and roster, via murmur3-based rendezvous scoring ([`hash::score`]).
//! - **Load avoidance, not load balancing** — A background refresher scrapes each server's
//!   `stats()` on a fixed interval and tracks both an instantaneous rate and a moving average
//!   with standard deviation. A candidate server is skipped in favor of the next-highest scorer
//!   only once its instantaneous load exceeds `average + 2 * stddev`.
//! - **Snapshot-based reads** — Routing queries never block on the refresher; they read an
//!   atomically-published, immutable [`snapshot::Snapshot`] (see [`manager::LoadManager`]).
//!
//! ## Quick example
//!
//! ```rust,no_run
//! use loadhash::RendezvousRouter;
//! # use loadhash::handle::{ServerHandle, StatsMap};
//! # use loadhash::error::HandleError;
//! # use std::sync::Arc;
//! # struct MyHandle;
//! # impl ServerHandle for MyHandle {
//! #     fn stats(&self) -> Result<StatsMap, HandleError> { Ok(StatsMap::new()) }
//! #     fn close(&self) {}
//! # }
//! let router = RendezvousRouter::new();
//! router.add_node("10.0.0.1:11211", Arc::new(MyHandle));
//! router.add_node("10.0.0.2:11211", Arc::new(MyHandle));
//!
//! let server = router.get_node("some-cache-key")?;
//! println!("routing to {server}");
//! # Ok::<(), loadhash::Error>(())
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use loadhash::{ManagerConfig, LoadMetric, RendezvousRouter};
//!
//! let config = ManagerConfig::new()
//!     .refresh_rate(5)?
//!     .load_metric(LoadMetric::RUsage)
//!     .window_size(50)?;
//! let router = RendezvousRouter::with_config(config);
//! # Ok::<(), loadhash::Error>(())
//! ```
//!
//! ## Introspection
//!
//! - **[`RendezvousRouter::manager`]** exposes the backing [`manager::LoadManager`], whose
//!   [`LoadManager::load`](manager::LoadManager::load) and
//!   [`LoadManager::load_statistics`](manager::LoadManager::load_statistics) give per-server
//!   instantaneous rate and moving-window statistics.
//! - **[`RendezvousRouter::nodes`]** lists every registered server id, independent of load state.
//!
//! ## Non-goals
//!
//! Not a connection pool or a memcached wire-protocol client — callers supply a
//! [`handle::ServerHandle`] that already knows how to reach one server. No hash-ring rebalancing
//! beyond rendezvous hashing's own minimal-disruption property; no cross-process coordination.

#![deny(missing_docs)]
#![warn(clippy::all)]

/// Validated configuration for a [`manager::LoadManager`].
pub mod config;
/// A single roster member's mutable state.
mod entry;
/// Error types.
pub mod error;
/// The rendezvous-hashing score function.
pub mod hash;
/// The caller-supplied server handle boundary.
pub mod handle;
/// The load manager: roster ownership and the background refresher.
pub mod manager;
/// The two enumerated load metrics.
pub mod metric;
/// Persistent per-server probe worker threads.
mod prober;
/// Rendezvous hashing with load avoidance.
pub mod router;
/// The published, read-only view of the roster's load state.
pub mod snapshot;
/// The moving-average/standard-deviation window.
pub mod window;

// Re-export main types
pub use config::{ManagerConfig, ManagerConfigBuilder};
pub use error::Error;
pub use manager::LoadManager;
pub use metric::LoadMetric;
pub use router::RendezvousRouter;
pub use snapshot::{Snapshot, WindowStats};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test_support::{stats, MockHandle};
    use std::sync::Arc;

    #[test]
    fn test_add_and_route_single_node() {
        let router = RendezvousRouter::new();
        router.add_node("only", Arc::new(MockHandle::constant(stats(&[("uptime", 10.0)]))));
        assert_eq!(router.get_node("any-key").unwrap(), "only");
    }

    #[test]
    fn test_no_nodes_is_an_error() {
        let router = RendezvousRouter::new();
        assert_eq!(router.get_node("k").unwrap_err(), Error::NoServers);
    }

    #[test]
    fn test_manager_reports_no_load_before_first_refresh() {
        let router = RendezvousRouter::with_config(ManagerConfig::new().window_size(2).unwrap());
        router.add_node("a", Arc::new(MockHandle::constant(stats(&[("uptime", 10.0)]))));
        assert!(router.manager().load().is_empty());
    }

    #[test]
    fn test_remove_then_add_again_resets_state() {
        let router = RendezvousRouter::with_config(ManagerConfig::new().window_size(2).unwrap());
        router.add_node("a", Arc::new(MockHandle::constant(stats(&[("uptime", 10.0)]))));
        router.remove_node("a");
        assert!(!router.nodes().contains(&"a".to_string()));
        router.add_node("a", Arc::new(MockHandle::constant(stats(&[("uptime", 5.0)]))));
        assert_eq!(router.nodes(), vec!["a".to_string()]);
    }
}
