//! Run-scoped counters and the end-of-run summary.

/// Aggregate counters for one batch run. `chapters_fetched` is the single
/// global count the governor's cap is checked against; it is passed
/// explicitly, never held as ambient global state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    /// Chapters successfully materialized across all fictions.
    pub chapters_fetched: u64,
    /// Fictions that reached the end of their chapter loop.
    pub fictions_completed: u64,
    /// Fictions skipped (unsupported site, swallowed errors).
    pub fictions_skipped: u64,
}

impl RunStats {
    pub fn record_chapter(&mut self) {
        self.chapters_fetched += 1;
    }

    /// One-line operator summary.
    pub fn summary(&self) -> String {
        format!(
            "Fetched {} chapter(s) across {} completed fiction(s) ({} skipped).",
            self.chapters_fetched, self.fictions_completed, self.fictions_skipped
        )
    }
}
