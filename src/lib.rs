//! novelpull: CLI scraper for web fiction, saving one text file per chapter
//! with resumable update runs.

pub mod cli;
pub mod config;
pub mod governor;
pub mod orderlog;
pub mod run;
pub mod sanitize;
pub mod scraper;
pub mod stats;

// Re-exports for CLI and consumers.
pub use config::RunConfig;
pub use governor::Governor;
pub use orderlog::{OrderLog, PersistMode, ORDER_FILE_NAME};
pub use run::{run_batch, BatchOptions, FictionOutcome, FICTIONS_DIR};
pub use scraper::{
    origin_of, resolve, FictionListing, HttpClient, HttpClientBuilder, ScrapeError, SiteAdapter,
};
pub use stats::RunStats;
