//! Degraded-mode switch.

use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide flag: substitute fallback data instead of failing.
///
/// Read once per fetch, so flipping it affects subsequent calls only.
#[derive(Debug)]
pub struct DegradedMode(AtomicBool);

impl DegradedMode {
    pub fn new(enabled: bool) -> Self {
        Self(AtomicBool::new(enabled))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Returns the previous value.
    pub fn set(&self, enabled: bool) -> bool {
        self.0.swap(enabled, Ordering::Relaxed)
    }
}

impl Default for DegradedMode {
    fn default() -> Self {
        Self::new(true)
    }
}
