use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Wall-clock time accumulated across dispatches since the last read.
#[derive(Debug, Default)]
pub struct DurationTracker {
    nanos: AtomicU64,
}

impl DurationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(nanos))
            });
    }

    /// Returns the accumulated time and clears it in one step.
    pub fn take(&self) -> Duration {
        Duration::from_nanos(self.nanos.swap(0, Ordering::SeqCst))
    }

    pub fn peek(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }

    pub fn reset(&self) {
        self.nanos.store(0, Ordering::SeqCst);
    }
}
