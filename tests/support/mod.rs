//! Shared `ServerHandle` test double for the integration test suite.

use loadhash::error::HandleError;
use loadhash::handle::{ServerHandle, StatsMap};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A handle driven by a scripted sequence of `stats()` responses. Once the script is
/// exhausted, repeats the last response forever (so a long-running refresher doesn't start
/// erroring out from under a test that only cares about the first few rounds).
pub struct ScriptedHandle {
    responses: Mutex<VecDeque<Result<StatsMap, HandleError>>>,
}

impl ScriptedHandle {
    pub fn new(responses: Vec<Result<StatsMap, HandleError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }

    pub fn constant(stats: StatsMap) -> Self {
        Self::new(vec![Ok(stats)])
    }
}

impl ServerHandle for ScriptedHandle {
    fn stats(&self) -> Result<StatsMap, HandleError> {
        let mut queue = self.responses.lock();
        match queue.pop_front() {
            Some(result) => {
                if queue.is_empty() {
                    if let Ok(ref stats) = result {
                        queue.push_back(Ok(stats.clone()));
                    }
                }
                result
            }
            None => Err(HandleError("scripted handle exhausted".to_string())),
        }
    }

    fn close(&self) {}
}

pub fn stats(pairs: &[(&str, f64)]) -> StatsMap {
    pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
}
