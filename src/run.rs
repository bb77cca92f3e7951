//! Scrape orchestration: the batch loop over fiction URLs and the per-fiction
//! state machine (Resolving -> Listing -> Reconciling -> FetchLoop ->
//! Finalizing -> Done/Skipped).
//!
//! Single-threaded and fully synchronous: network calls block for their full
//! round-trip, and the governor's delay is the only pause. The run-wide
//! chapter counter lives in `RunStats` and is passed explicitly.

use crate::config::RunConfig;
use crate::governor::Governor;
use crate::orderlog::{self, OrderLog, PersistMode, ORDER_FILE_NAME};
use crate::sanitize::sanitize_title;
use crate::scraper::{self, FictionListing, HttpClient, ScrapeError, SiteAdapter};
use crate::stats::RunStats;
use std::path::PathBuf;

/// Subdirectory of the output root holding one folder per fiction.
pub const FICTIONS_DIR: &str = "Fictions";

/// Pluggable origin-to-adapter lookup; production code passes
/// [scraper::resolve].
pub type AdapterResolver<'a> = &'a dyn Fn(&str) -> Result<Box<dyn SiteAdapter>, ScrapeError>;

/// Terminal result for one fiction within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FictionOutcome {
    /// Chapter loop ran to completion or was cut short by the cap.
    Done,
    /// Fiction abandoned (unsupported site or a swallowed error).
    Skipped,
}

/// Batch-level options. `progress` is called after each fiction with
/// (processed, total).
#[derive(Default)]
pub struct BatchOptions<'a> {
    pub progress: Option<&'a dyn Fn(u64, u64)>,
}

/// Per-fiction progress through the pipeline. Each state carries exactly the
/// data its transition needs, so transitions are guarded by construction.
enum FictionState {
    Resolving,
    Listing {
        origin: String,
        adapter: Box<dyn SiteAdapter>,
    },
    Reconciling {
        origin: String,
        adapter: Box<dyn SiteAdapter>,
        listing: FictionListing,
    },
    FetchLoop {
        origin: String,
        adapter: Box<dyn SiteAdapter>,
        listing: FictionListing,
        folder: PathBuf,
        prior: OrderLog,
    },
    Finalizing {
        folder: PathBuf,
        new_entries: Vec<String>,
    },
    Done,
    Skipped,
}

/// Process an ordered batch of fiction URLs. Unsupported sites always skip
/// just their fiction; other failures abort the remaining batch unless
/// ignore-errors is set.
pub fn run_batch(
    urls: &[String],
    cfg: &RunConfig,
    client: &mut HttpClient,
    options: &BatchOptions<'_>,
) -> Result<RunStats, ScrapeError> {
    run_batch_with(urls, cfg, client, options, &scraper::resolve)
}

pub(crate) fn run_batch_with(
    urls: &[String],
    cfg: &RunConfig,
    client: &mut HttpClient,
    options: &BatchOptions<'_>,
    resolver: AdapterResolver<'_>,
) -> Result<RunStats, ScrapeError> {
    let mut stats = RunStats::default();
    let governor = Governor::new(cfg.delay_secs, cfg.chapter_limit);
    let action = if cfg.update_mode { "Updating" } else { "Creating" };
    let total = urls.len() as u64;

    for (i, url) in urls.iter().enumerate() {
        if cfg.verbose {
            eprintln!("{}: {}", action, url);
        }
        match run_fiction(url, cfg, client, &governor, &mut stats, resolver)? {
            FictionOutcome::Done => stats.fictions_completed += 1,
            FictionOutcome::Skipped => stats.fictions_skipped += 1,
        }
        if let Some(progress) = options.progress {
            progress(i as u64 + 1, total);
        }
    }

    Ok(stats)
}

/// Drive one fiction through the state machine. Returns Err only for
/// failures that abort the whole batch.
fn run_fiction(
    url: &str,
    cfg: &RunConfig,
    client: &mut HttpClient,
    governor: &Governor,
    stats: &mut RunStats,
    resolver: AdapterResolver<'_>,
) -> Result<FictionOutcome, ScrapeError> {
    let mut state = FictionState::Resolving;
    loop {
        let step = advance(state, url, cfg, client, governor, stats, resolver);
        state = match step {
            Ok(next) => next,
            // Unsupported/unparseable URLs skip this fiction only, and are
            // always reported, regardless of ignore-errors.
            Err(e) if e.skips_fiction_only() => {
                eprintln!("{}\nURL: {}", e, url);
                FictionState::Skipped
            }
            Err(e) if cfg.ignore_errors => {
                eprintln!("Skipping {}: {}", url, e);
                FictionState::Skipped
            }
            Err(e) => return Err(e),
        };
        match state {
            FictionState::Done => return Ok(FictionOutcome::Done),
            FictionState::Skipped => return Ok(FictionOutcome::Skipped),
            _ => {}
        }
    }
}

fn advance(
    state: FictionState,
    url: &str,
    cfg: &RunConfig,
    client: &mut HttpClient,
    governor: &Governor,
    stats: &mut RunStats,
    resolver: AdapterResolver<'_>,
) -> Result<FictionState, ScrapeError> {
    match state {
        FictionState::Resolving => {
            let origin = scraper::origin_of(url)?;
            let adapter = resolver(&origin)?;
            Ok(FictionState::Listing { origin, adapter })
        }

        FictionState::Listing {
            origin,
            mut adapter,
        } => {
            let listing = adapter.discover(client, url)?;
            if listing.chapter_refs.is_empty() {
                eprintln!(
                    "The fiction at {} does not exist or is no longer available.",
                    url
                );
                // No folder, no order-log write, stats unchanged.
                return Ok(FictionState::Done);
            }
            Ok(FictionState::Reconciling {
                origin,
                adapter,
                listing,
            })
        }

        FictionState::Reconciling {
            origin,
            adapter,
            listing,
        } => {
            let folder = cfg
                .output_dir
                .join(FICTIONS_DIR)
                .join(sanitize_title(&listing.title));
            std::fs::create_dir_all(&folder).map_err(|e| ScrapeError::Write {
                path: folder.clone(),
                source: e,
            })?;
            let prior = if cfg.update_mode {
                let path = folder.join(ORDER_FILE_NAME);
                OrderLog::load(&path).map_err(|e| ScrapeError::Write { path, source: e })?
            } else {
                OrderLog::default()
            };
            Ok(FictionState::FetchLoop {
                origin,
                adapter,
                listing,
                folder,
                prior,
            })
        }

        FictionState::FetchLoop {
            origin,
            mut adapter,
            listing,
            folder,
            prior,
        } => {
            let mut new_entries = Vec::new();
            for chapter_ref in &listing.chapter_refs {
                // Run-wide cap: cuts this fiction's loop short; the batch
                // moves on and every later fiction breaks here too.
                if !governor.has_capacity(stats.chapters_fetched) {
                    break;
                }
                let chapter_url = format!("{}{}", origin, chapter_ref);
                if cfg.update_mode && prior.contains(&chapter_url) {
                    continue;
                }
                match adapter.fetch(client, &chapter_url, &folder) {
                    Ok(()) => {
                        if cfg.verbose {
                            eprintln!("{}", chapter_url);
                        }
                        new_entries.push(chapter_url);
                        stats.record_chapter();
                        governor.after_chapter();
                    }
                    Err(e) if cfg.ignore_errors => {
                        // Swallowed failures skip the chapter and leave it
                        // out of the log, so a later update run retries it.
                        // Write failures are only reported when verbose.
                        if cfg.verbose || !matches!(e, ScrapeError::Write { .. }) {
                            eprintln!("Skipping chapter {}: {}", chapter_url, e);
                        }
                    }
                    Err(e) => return Err(e),
                }
            }
            Ok(FictionState::Finalizing {
                folder,
                new_entries,
            })
        }

        FictionState::Finalizing {
            folder,
            new_entries,
        } => {
            let path = folder.join(ORDER_FILE_NAME);
            let mode = if cfg.update_mode {
                PersistMode::Append
            } else {
                PersistMode::Replace
            };
            orderlog::persist(&path, &new_entries, mode)
                .map_err(|e| ScrapeError::Write { path, source: e })?;
            Ok(FictionState::Done)
        }

        // Terminal states are handled by the driver and never re-entered.
        FictionState::Done => Ok(FictionState::Done),
        FictionState::Skipped => Ok(FictionState::Skipped),
    }
}
