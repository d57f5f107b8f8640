//! Command-line interface definitions.
//!
//! All path options can also be provided through environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::rename::RenameMode;

/// Archive cryptocurrency news and glossary sites as JSON, CSV and Markdown.
///
/// # Examples
///
/// ```sh
/// # Crawl every configured source
/// crypto_news_archive -c sources.yaml -o ./output
///
/// # Crawl two sources only
/// crypto_news_archive -s cointelegraph -s coindesk-glossary
///
/// # Keep the historical first-substring rename behaviour
/// crypto_news_archive --rename-mode first-occurrence
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// YAML file describing the sources to crawl
    #[arg(short, long, env = "NEWS_ARCHIVE_CONFIG", default_value = "sources.yaml")]
    pub config: PathBuf,

    /// Root directory for archived items; each source writes to a subdirectory
    #[arg(short, long, env = "NEWS_ARCHIVE_OUTPUT", default_value = "output")]
    pub output_dir: PathBuf,

    /// Only crawl the named sources (repeatable)
    #[arg(short, long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// How renamed keys are located in the written files
    #[arg(long, value_enum, default_value_t = RenameMode::Structural)]
    pub rename_mode: RenameMode,

    /// Print the configured source names and exit
    #[arg(long)]
    pub list: bool,
}
