//! Rate and volume limits for a run: inter-chapter delay and a run-wide
//! chapter cap shared across all fictions in the batch.

use std::time::Duration;

/// Enforces the configured pacing between chapter fetches and the run-wide
/// chapter cap. The cap is checked against the global fetched count with a
/// threshold comparison, so it holds as a hard ceiling across fiction
/// boundaries.
#[derive(Debug)]
pub struct Governor {
    delay: Duration,
    limit: Option<u64>,
}

impl Governor {
    /// `delay_secs` is clamped to zero if negative or non-finite; `limit` of
    /// `None` means unlimited.
    pub fn new(delay_secs: f64, limit: Option<u64>) -> Self {
        let delay = if delay_secs.is_finite() && delay_secs > 0.0 {
            Duration::from_secs_f64(delay_secs)
        } else {
            Duration::ZERO
        };
        Self { delay, limit }
    }

    /// Whether another chapter may be fetched given the run-wide count of
    /// chapters fetched so far. Consulted once per chapter attempt.
    pub fn has_capacity(&self, fetched: u64) -> bool {
        self.limit.map_or(true, |cap| fetched < cap)
    }

    /// Blocking pause after a chapter that was actually fetched. Not invoked
    /// for chapters skipped because they were already logged.
    pub fn after_chapter(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}
