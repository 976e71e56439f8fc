//! Retainer
//!
//! Runs a tiered retention pass over a bucket snapshot: blocks whose tiers
//! have all lapsed are marked deleted, and blocks whose kept or dropped tiers
//! changed get their retention record rewritten.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use common::bucket_file::{load_bucket, save_bucket};
use common::cli::{CommonArgs, CommonCommands, utils};
use common::config::Configuration;
use retention::{BucketRetentionDriver, RetentionMetrics};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one retention pass over a bucket snapshot
    Apply {
        /// Bucket snapshot (JSON array of blocks)
        bucket: PathBuf,

        /// Evaluation time, RFC 3339 or seconds since the Unix epoch (defaults to now)
        #[arg(long, value_parser = parse_now)]
        now: Option<i64>,

        /// Write the updated bucket here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log decisions without writing the bucket
        #[arg(long)]
        dry_run: bool,
    },

    #[command(flatten)]
    Common(CommonCommands),
}

fn parse_now(value: &str) -> Result<i64, String> {
    if let Ok(seconds) = value.parse::<i64>() {
        return Ok(seconds);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.timestamp())
        .map_err(|e| format!("expected RFC 3339 time or epoch seconds: {e}"))
}

fn run_apply(
    config: &Configuration,
    bucket_path: PathBuf,
    now: Option<i64>,
    output: Option<PathBuf>,
    dry_run: bool,
) -> Result<()> {
    utils::validate_config(config)?;

    let now = now.unwrap_or_else(|| Utc::now().timestamp());
    let dry_run = dry_run || config.driver.dry_run;

    let mut bucket = load_bucket(&bucket_path)?;
    log::info!(
        "Applying retention to {} blocks from {} at {}",
        bucket.len(),
        bucket_path.display(),
        DateTime::<Utc>::from_timestamp(now, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| now.to_string())
    );

    let metrics = RetentionMetrics::new();
    let driver = BucketRetentionDriver::new(metrics.clone()).with_dry_run(dry_run);
    let result = driver.apply(&config.retention, &mut bucket, now);

    log::info!(
        "Retention pass finished: {} skipped, {} unchanged, {} rewritten, {} deleted ({} drop / {} keep fingerprints recorded)",
        result.blocks_skipped,
        result.blocks_unchanged,
        result.blocks_rewritten,
        result.blocks_deleted,
        metrics.drop_fingerprints_recorded(),
        metrics.keep_fingerprints_recorded()
    );

    if dry_run {
        log::info!("Dry run enabled, bucket snapshot not written");
        return Ok(());
    }

    let destination = output.unwrap_or(bucket_path);
    save_bucket(&destination, &bucket)
        .with_context(|| format!("Failed to save bucket to {}", destination.display()))?;
    log::info!("Bucket written to {}", destination.display());

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    utils::init_logging(&args.common);

    let config = utils::load_config(args.common.config.as_ref())?;

    match args.command {
        Command::Apply {
            bucket,
            now,
            output,
            dry_run,
        } => run_apply(&config, bucket, now, output, dry_run),
        Command::Common(command) => utils::handle_common_command(&command, &config),
    }
}
