//! CLI parsing and top-level wiring. Parses args, merges settings and the
//! optional JSON batch file into a RunConfig, runs the batch, and maps errors
//! to exit codes.

use crate::config::{self, BatchConfig, RunConfig, Settings};
use crate::run::{run_batch, BatchOptions};
use crate::scraper::{HttpClient, ScrapeError};
use clap::Parser;
use std::cell::RefCell;
use std::path::PathBuf;
use thiserror::Error;

/// CLI error carrying exit code and message.
#[derive(Debug, Error)]
pub enum CliRunError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Scrape(#[from] ScrapeError),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliRunError::InvalidInput(_) => 1,
            CliRunError::Scrape(ScrapeError::Write { .. }) => 3,
            CliRunError::Scrape(_) => 2,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "novelpull")]
#[command(about = "Scrape web fiction chapter by chapter into text files, resumably")]
#[command(
    after_help = "Settings file keys (output_dir, user_agent, timeout_secs, delay_secs, chapter_limit) are read from ./novelpull.toml or the user config directory. The JSON batch file given with --config overrides CLI flags for keys it sets."
)]
pub struct Args {
    /// Fiction URLs (landing pages), processed in order.
    pub urls: Vec<String>,

    /// Path to a JSON batch file: {"urls": [...], "update_mode": ..., ...}.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to save scraped fiction under (default: current directory).
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Update mode: fetch only chapters not already recorded for a fiction.
    #[arg(short, long)]
    pub update: bool,

    /// Per-chapter logging and full error chains.
    #[arg(short, long)]
    pub verbose: bool,

    /// Ignore errors and continue scraping even if issues are encountered.
    #[arg(short, long)]
    pub ignore_errors: bool,

    /// Delay in seconds between chapter fetches (default 0). An explicit 0
    /// overrides a settings-file delay.
    #[arg(long, allow_negative_numbers = true)]
    pub delay: Option<f64>,

    /// Stop after this many chapters across the whole run.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub limit: Option<u64>,

    /// HTTP User-Agent (overrides settings).
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Request timeout in seconds (overrides settings; default 30).
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Merge CLI flags, optional settings, and the optional batch file into the
/// URL list and run configuration. Batch file keys win over flags; settings
/// only fill gaps.
fn build_plan(
    args: &Args,
    settings: Option<&Settings>,
    batch: Option<BatchConfig>,
) -> Result<(Vec<String>, RunConfig), CliRunError> {
    if let Some(d) = args.delay {
        if !d.is_finite() || d < 0.0 {
            return Err(CliRunError::InvalidInput(format!(
                "Invalid --delay: {} (must be a finite number >= 0)",
                d
            )));
        }
    }
    if let Some(d) = settings.and_then(|s| s.delay_secs) {
        if !d.is_finite() || d < 0.0 {
            return Err(CliRunError::InvalidInput(format!(
                "Invalid delay_secs in settings file: {} (must be a finite number >= 0)",
                d
            )));
        }
    }

    let mut cfg = RunConfig {
        output_dir: args
            .output_dir
            .clone()
            .or_else(|| settings.and_then(|s| s.output_dir.clone()))
            .unwrap_or_else(|| PathBuf::from(".")),
        update_mode: args.update,
        verbose: args.verbose,
        ignore_errors: args.ignore_errors,
        delay_secs: args
            .delay
            .or_else(|| settings.and_then(|s| s.delay_secs))
            .unwrap_or(0.0),
        chapter_limit: args.limit.or_else(|| settings.and_then(|s| s.chapter_limit)),
    };

    let urls = match batch {
        Some(batch) => {
            if let Some(dir) = batch.output_dir {
                cfg.output_dir = dir;
            }
            if let Some(v) = batch.update_mode {
                cfg.update_mode = v;
            }
            if let Some(v) = batch.verbose {
                cfg.verbose = v;
            }
            if let Some(v) = batch.ignore_errors {
                cfg.ignore_errors = v;
            }
            if let Some(v) = batch.delay_secs {
                if !v.is_finite() || v < 0.0 {
                    return Err(CliRunError::InvalidInput(format!(
                        "Invalid delay_secs in batch config: {} (must be >= 0)",
                        v
                    )));
                }
                cfg.delay_secs = v;
            }
            if let Some(v) = batch.chapter_limit {
                if v == 0 {
                    return Err(CliRunError::InvalidInput(
                        "Invalid chapter_limit in batch config: must be positive".to_string(),
                    ));
                }
                cfg.chapter_limit = Some(v);
            }
            batch.urls
        }
        None => args.urls.clone(),
    };

    if urls.is_empty() {
        return Err(CliRunError::InvalidInput(
            "Please provide fiction URLs or a JSON batch file via --config".to_string(),
        ));
    }

    Ok((urls, cfg))
}

/// Entry point for the CLI. Returns Ok(()) on success; Err with exit code and
/// message on failure.
pub fn run(args: &Args) -> Result<(), CliRunError> {
    let settings = config::load_settings().map_err(CliRunError::InvalidInput)?;
    let batch = match &args.config {
        Some(path) => Some(config::load_batch(path).map_err(CliRunError::InvalidInput)?),
        None => None,
    };
    let (urls, cfg) = build_plan(args, settings.as_ref(), batch)?;

    const DEFAULT_TIMEOUT_SECS: u64 = 30;
    let timeout_secs = args
        .timeout
        .or_else(|| settings.as_ref().and_then(|s| s.timeout_secs))
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    let user_agent = args
        .user_agent
        .clone()
        .or_else(|| settings.as_ref().and_then(|s| s.user_agent.clone()));

    let mut builder = HttpClient::builder().timeout_secs(timeout_secs);
    if let Some(ua) = user_agent {
        builder = builder.user_agent(ua);
    }
    let mut client = builder
        .build()
        .map_err(|e| CliRunError::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

    let action = if cfg.update_mode { "Updating" } else { "Creating" };
    eprintln!("{} a total of {} novel(s).", action, urls.len());

    // Fiction-level progress bar; suppressed when verbose logging is on.
    let bar_state: RefCell<Option<indicatif::ProgressBar>> = RefCell::new(None);
    let progress_cb = |done: u64, total: u64| {
        let mut state = bar_state.borrow_mut();
        let bar = state.get_or_insert_with(|| {
            let bar = indicatif::ProgressBar::new(total);
            bar.set_style(
                indicatif::ProgressStyle::default_bar()
                    .template("Scraping novels [{bar:40}] {pos}/{len} ({elapsed})")
                    .unwrap()
                    .progress_chars("█▉▊▋▌▍▎▏ "),
            );
            bar
        });
        bar.set_position(done);
    };
    let progress: Option<&dyn Fn(u64, u64)> = if cfg.verbose { None } else { Some(&progress_cb) };

    let stats = run_batch(&urls, &cfg, &mut client, &BatchOptions { progress })?;

    if let Some(bar) = bar_state.borrow_mut().take() {
        bar.finish_and_clear();
    }
    eprintln!("{}", stats.summary());
    Ok(())
}
