//! Shared error type for site resolution, HTTP, site structure, and artifact writes.

use std::path::PathBuf;
use thiserror::Error;

/// Every failure the scrape pipeline can surface. There are no automatic
/// retries: each error is either swallowed-and-logged (ignore-errors set) or
/// propagated, aborting the remaining batch. `InvalidUrl` and
/// `UnsupportedSite` are the exception: they only ever skip the current
/// fiction.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Invalid URL: {input}: {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Unsupported site: {origin}")]
    UnsupportedSite { origin: String },

    #[error("Network error: could not reach {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("HTTP {status} when fetching: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Unexpected page structure at {url}: {reason}")]
    Structure { url: String, reason: String },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    /// Failures that only ever skip the current fiction; the batch continues
    /// and the failure is reported regardless of the ignore-errors setting.
    pub fn skips_fiction_only(&self) -> bool {
        matches!(
            self,
            ScrapeError::UnsupportedSite { .. } | ScrapeError::InvalidUrl { .. }
        )
    }
}
