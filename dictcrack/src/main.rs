use std::io;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use dictcrack::{Error, MatchSink, PoolConfig, crack, load_dictionary, load_records};
use dictcrack_core::DEFAULT_ITERATIONS;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dictcrack")]
#[command(about = "Recover plaintext passwords for a username/digest database from a candidate dictionary")]
struct Args {
    /// Dictionary file, one candidate password per line
    dictionary: PathBuf,

    /// Credential database, one `username hex_digest` record per line
    database: PathBuf,

    /// Number of blocking hash worker threads (defaults to available parallelism)
    #[arg(short = 'j', long)]
    hash_workers: Option<usize>,

    /// Cap on concurrently waiting matchers (defaults to available parallelism)
    #[arg(long)]
    match_workers: Option<usize>,

    /// Seconds each user waits for its digest to resolve
    #[arg(long, value_parser = parse_secs, default_value = "10")]
    timeout: Duration,

    /// Hash applications per candidate
    #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: NonZeroU32,

    /// Disable progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_secs(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg
        .parse()
        .map_err(|_| format!("`{arg}` is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| err.to_string())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Result lines own stdout; diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let started = Instant::now();

    // Load and validate inputs; any malformed record aborts here.
    let candidates = load_dictionary(&args.dictionary)?;
    let records = load_records(&args.database)?;
    info!(
        candidates = candidates.len(),
        users = records.len(),
        "inputs loaded"
    );

    let defaults = PoolConfig::default();
    let config = PoolConfig {
        iterations: args.iterations,
        wait_timeout: args.timeout,
        hash_workers: args.hash_workers.unwrap_or(defaults.hash_workers),
        match_workers: args.match_workers.unwrap_or(defaults.match_workers),
    };

    // Set up progress bar
    let total_candidates = candidates.len() as u64;
    let progress_counter = Arc::new(AtomicU64::new(0));
    let progress_bar = if !args.no_progress {
        let pb = ProgressBar::new(total_candidates);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} candidates ({percent}%)",
                )
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    // Spawn progress updater task
    let progress_counter_clone = Arc::clone(&progress_counter);
    let progress_bar_clone = progress_bar.clone();
    let progress_task = tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;
            let current = progress_counter_clone.load(Ordering::Relaxed);
            if let Some(ref pb) = progress_bar_clone {
                pb.set_position(current);
            }
            if current >= total_candidates {
                break;
            }
        }
    });

    let sink = Arc::new(MatchSink::new(io::stdout()));
    let summary = crack(records, candidates, &config, sink, progress_counter).await?;

    // Clean up progress
    progress_task.abort();
    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    info!(
        users = summary.users,
        candidates = summary.candidates,
        matched = summary.matched,
        timed_out = summary.timed_out,
        exhausted = summary.exhausted,
        elapsed = ?started.elapsed(),
        "run complete"
    );
    Ok(())
}
