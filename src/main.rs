//! Tag-Harvest main entry point
//!
//! This is the command-line interface for the Tag-Harvest author harvester.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use tag_harvest::config::{load_settings, DedupeMode, Settings};
use tag_harvest::crawler::harvest;
use tag_harvest::logging;
use tag_harvest::state::{StateStore, TomlStateStore};

/// Tag-Harvest: a resumable hashtag feed author harvester
///
/// Tag-Harvest pages through a hashtag feed, fetches the profile of every
/// author it has not stored yet, and records it. The cursor is saved back into
/// the settings file after every page, so an interrupted run resumes where it
/// stopped.
#[derive(Parser, Debug)]
#[command(name = "tag-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable hashtag feed author harvester", long_about = None)]
struct Cli {
    /// Path to the TOML settings file (also holds the crawl cursor)
    #[arg(value_name = "SETTINGS")]
    settings: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Start again from the first page of the feed, discarding the saved cursor
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    reset: bool,

    /// Validate settings and show where the crawl would resume without sending requests
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the record database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = load_settings(&cli.settings);

    // The log file location comes from the settings; without them only stdout is used
    let log_path = loaded
        .as_ref()
        .ok()
        .map(|s| PathBuf::from(&s.output.log_path));
    logging::init(cli.verbose, cli.quiet, log_path.as_deref())
        .context("Failed to open the log file")?;

    let settings = match loaded {
        Ok(settings) => {
            tracing::info!("Settings loaded from: {}", cli.settings.display());
            settings
        }
        Err(e) => {
            tracing::error!("Failed to load settings: {}", e);
            return Err(e).context(format!("Invalid settings file {}", cli.settings.display()));
        }
    };

    if cli.dry_run {
        handle_dry_run(&cli.settings, settings);
    } else if cli.stats {
        handle_stats(&settings)?;
    } else {
        handle_harvest(&cli.settings, cli.reset).await?;
    }

    Ok(())
}

/// Handles the --dry-run mode: shows the settings and where the crawl would resume
fn handle_dry_run(path: &Path, settings: Settings) {
    println!("=== Tag-Harvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Hashtag: #{}", settings.crawl.hashtag);
    println!("  Dedupe strategy: {:?}", settings.crawl.dedupe);
    if settings.crawl.dedupe == DedupeMode::Claim {
        println!("  Abandoned claims expire after: {}s", settings.crawl.claim_ttl_secs);
    }

    println!("\nRemote API:");
    println!("  Base URL: {}", settings.api.base_url);
    println!("  Timeout: {}s", settings.api.timeout_secs);
    println!(
        "  Session cookie: {} bytes (with csrftoken)",
        settings.session.cookie.len()
    );

    println!("\nPacing:");
    println!(
        "  Between pages: {}-{}s",
        settings.pacing.page_delay_min, settings.pacing.page_delay_max
    );
    println!(
        "  Before author re-check: {}-{}s",
        settings.pacing.author_delay_min, settings.pacing.author_delay_max
    );

    println!("\nOutput:");
    println!("  Database: {}", settings.database.path);
    println!("  Log: {}", settings.output.log_path);

    let cursor = TomlStateStore::new(path, settings).load();
    println!("\n✓ Settings are valid");
    if cursor.is_at_start() {
        println!("✓ Would start from the first page of #{}", cursor.tag);
    } else {
        println!("✓ Would resume from {}", cursor);
    }
}

/// Handles the --stats mode: shows statistics from the record database
fn handle_stats(settings: &Settings) -> anyhow::Result<()> {
    use tag_harvest::output::{load_statistics, print_statistics};
    use tag_harvest::storage::SqliteRecordStore;

    println!("Database: {}\n", settings.database.path);

    let store = SqliteRecordStore::open(Path::new(&settings.database.path))?;
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(path: &Path, reset: bool) -> anyhow::Result<()> {
    match harvest(path, reset).await {
        Ok(stats) => {
            tracing::info!(
                "Harvest completed: {} new authors saved from {} pages",
                stats.authors_saved,
                stats.pages
            );
            Ok(())
        }
        Err(e) if e.is_blocked() => {
            tracing::error!("Account has been banned! Stopping the harvest.");
            Err(e.into())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
