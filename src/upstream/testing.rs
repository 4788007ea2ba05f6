//! Scripted in-memory upstream for unit tests.

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::upstream::types::{CatalogUpstream, UpstreamError, UpstreamResult};

/// Returns a settable outcome for every call and counts calls.
pub struct ScriptedUpstream {
    outcome: Mutex<UpstreamResult<Value>>,
    delay: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self {
            outcome: Mutex::new(Err(UpstreamError::Transport("not scripted".into()))),
            delay: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond(&self, value: Value) {
        *self.outcome.lock().unwrap() = Ok(value);
    }

    pub fn fail(&self, error: UpstreamError) {
        *self.outcome.lock().unwrap() = Err(error);
    }

    /// Delay every subsequent call by `delay`.
    pub fn stall(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn next(&self) -> UpstreamResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.lock().unwrap().clone()
    }
}

impl CatalogUpstream for ScriptedUpstream {
    async fn get_product(&self, _id: &str) -> UpstreamResult<Value> {
        self.next().await
    }

    async fn get_page(&self, _page: u32) -> UpstreamResult<Value> {
        self.next().await
    }
}
