use std::time::{Duration, Instant};
use tracing::info;

/// Logs how long a scrape took once it goes out of scope.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        let label = label.into();
        info!(label = %label, "scrape started");
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        info!(label = %self.label, elapsed_ms = self.elapsed_ms() as u64, "scrape finished");
    }
}
