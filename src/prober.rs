//! A persistent per-server worker thread for bounded `stats()` probing.

use crate::error::HandleError;
use crate::handle::{ServerHandle, StatsMap};
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

struct ProbeChannel {
    request_tx: mpsc::Sender<u64>,
    response_rx: mpsc::Receiver<(u64, Result<StatsMap, HandleError>)>,
    next_id: u64,
}

/// Runs one long-lived thread per server that calls `stats()` on request. Reusing the same
/// thread for every round means a server that never replies costs exactly one blocked thread
/// for as long as the server is registered, rather than one new thread per refresh round.
pub(crate) struct ProbeWorker {
    channel: Mutex<ProbeChannel>,
}

impl ProbeWorker {
    pub(crate) fn spawn(client: Arc<dyn ServerHandle>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<u64>();
        let (response_tx, response_rx) = mpsc::channel();
        thread::spawn(move || {
            while let Ok(id) = request_rx.recv() {
                let result = client.stats();
                if response_tx.send((id, result)).is_err() {
                    break;
                }
            }
        });
        Self {
            channel: Mutex::new(ProbeChannel {
                request_tx,
                response_rx,
                next_id: 0,
            }),
        }
    }

    /// Ask the worker to call `stats()`, waiting up to `timeout` for a reply. Replies tagged
    /// with an older request id (left over from a round that already timed out on this same
    /// server) are discarded rather than handed back as this round's result.
    pub(crate) fn probe(&self, timeout: Duration) -> Option<Result<StatsMap, HandleError>> {
        let mut channel = self.channel.lock();
        channel.next_id += 1;
        let id = channel.next_id;
        if channel.request_tx.send(id).is_err() {
            return None;
        }

        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            match channel.response_rx.recv_timeout(remaining) {
                Ok((reply_id, result)) if reply_id == id => return Some(result),
                Ok(_stale) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::test_support::{stats, MockHandle};
    use std::thread;

    #[test]
    fn test_probe_returns_response() {
        let worker = ProbeWorker::spawn(Arc::new(MockHandle::constant(stats(&[("uptime", 1.0)]))));
        let result = worker.probe(Duration::from_secs(1)).unwrap().unwrap();
        assert_eq!(result.get("uptime"), Some(&1.0));
    }

    #[test]
    fn test_probe_times_out_without_leaking_one_thread_per_call() {
        struct NeverReplies;
        impl ServerHandle for NeverReplies {
            fn stats(&self) -> Result<StatsMap, HandleError> {
                thread::sleep(Duration::from_secs(3600));
                Ok(StatsMap::new())
            }
            fn close(&self) {}
        }

        let worker = ProbeWorker::spawn(Arc::new(NeverReplies));
        // Every call reuses the same background thread; none of these time out by spawning a
        // fresh one.
        for _ in 0..5 {
            assert!(worker.probe(Duration::from_millis(20)).is_none());
        }
    }

    #[test]
    fn test_stale_reply_from_timed_out_round_is_discarded() {
        let worker = ProbeWorker::spawn(Arc::new(MockHandle::constant(stats(&[("uptime", 2.0)]))));
        // First call should succeed well within a generous timeout.
        let first = worker.probe(Duration::from_secs(1));
        assert!(first.is_some());
        // A later call, after the worker is idle, still gets a fresh reply rather than a
        // mismatched one.
        let second = worker.probe(Duration::from_secs(1));
        assert!(second.is_some());
    }
}
