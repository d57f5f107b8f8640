//! # Crypto News Archive
//!
//! Crawls cryptocurrency news and reference sites and archives every article
//! or glossary entry as a JSON/CSV/Markdown triple, skipping items that are
//! already on disk.
//!
//! ## Usage
//!
//! ```sh
//! crypto_news_archive -c sources.yaml -o ./output
//! ```
//!
//! ## Architecture
//!
//! Sources run one after another, each with its own crawl session:
//! 1. **Indexing**: read the feed or index page named in the source config
//! 2. **Extraction**: pull each item's fields with the configured selectors
//! 3. **Output**: write JSON, Markdown and CSV, then rename keys to the
//!    archive schema (see [`rename`])
//!
//! A failing source is logged and the run moves on; the exit status is
//! non-zero if any source failed or a `--source` name is unknown.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod models;
mod outputs;
mod rename;
mod scrapers;
mod text;
mod utils;

use cli::Cli;
use config::load_config;
use utils::{ensure_writable_dir, truncate_for_log};

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match run(Cli::parse()).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}

/// Run every selected source. Returns `Ok(false)` if any source failed.
#[instrument(level = "info", skip_all)]
async fn run(args: Cli) -> Result<bool, Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("crypto_news_archive starting up");
    debug!(?args.config, ?args.output_dir, ?args.sources, ?args.rename_mode, "Parsed CLI arguments");

    let config = load_config(&args.config).await?;

    if args.list {
        for source in &config.sources {
            println!("{}\t{:?}\t{}", source.name, source.kind, source.url);
        }
        return Ok(true);
    }

    let mut failed = Vec::new();
    for name in &args.sources {
        if !config.sources.iter().any(|s| &s.name == name) {
            warn!(source = %name, "No such source in configuration");
            failed.push(name.as_str());
        }
    }

    // Early check: ensure the output root is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }

    let mut saved = 0;
    for source in config.select(&args.sources) {
        match scrapers::run_source(source, &args.output_dir, args.rename_mode).await {
            Ok(stats) => saved += stats.saved,
            Err(e) => {
                error!(
                    source = %source.name,
                    error = %truncate_for_log(&e.to_string(), 300),
                    "Source failed; continuing with the next one"
                );
                failed.push(source.name.as_str());
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        saved,
        failed = ?failed,
        "Execution complete"
    );
    Ok(failed.is_empty())
}
