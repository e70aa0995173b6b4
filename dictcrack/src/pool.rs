//! Run scheduling: spawn matchers, fan hashing out, join with a barrier.

use std::io::Write;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::time::Duration;

use dictcrack_core::{DEFAULT_ITERATIONS, HashRegistry};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::Error;
use crate::input::Record;
use crate::sink::MatchSink;
use crate::worker::{MatchOutcome, hash_worker, match_worker};

/// Tuning for one run.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Hash applications per candidate.
    pub iterations: NonZeroU32,
    /// How long each matcher waits for its digest to resolve.
    pub wait_timeout: Duration,
    /// Blocking threads digesting the dictionary.
    pub hash_workers: usize,
    /// Cap on concurrently waiting matchers.
    pub match_workers: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            iterations: DEFAULT_ITERATIONS,
            wait_timeout: Duration::from_secs(10),
            hash_workers: parallelism,
            match_workers: parallelism,
        }
    }
}

/// What a finished run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrackSummary {
    pub users: usize,
    pub candidates: usize,
    pub matched: u64,
    pub timed_out: u64,
    pub exhausted: u64,
}

/// Run the full matching protocol over `records` and `candidates`.
///
/// One matcher task per record is spawned first, so every cell watch exists
/// before any producer runs; the dictionary is then split into contiguous
/// chunks across blocking hash workers. Termination is a completion barrier,
/// not a clock: when the last hasher finishes, the registry is dropped, which
/// closes every unresolved cell and lets still-waiting matchers return
/// immediately instead of sleeping out their deadline.
///
/// The first worker error aborts the run; sibling outcomes already tallied
/// are discarded with it.
pub async fn crack<W>(
    records: Vec<Record>,
    candidates: Vec<String>,
    config: &PoolConfig,
    sink: Arc<MatchSink<W>>,
    progress: Arc<AtomicU64>,
) -> Result<CrackSummary, Error>
where
    W: Write + Send + 'static,
{
    let mut summary = CrackSummary {
        users: records.len(),
        candidates: candidates.len(),
        ..CrackSummary::default()
    };

    let registry = Arc::new(HashRegistry::build(records.iter().map(|r| r.digest)));

    let match_workers = config.match_workers.min(records.len()).max(1);
    let hash_workers = config.hash_workers.min(candidates.len()).max(1);
    debug!(
        users = summary.users,
        candidates = summary.candidates,
        distinct_digests = registry.len(),
        hash_workers,
        match_workers,
        "scheduling run"
    );

    let match_permits = Arc::new(Semaphore::new(match_workers));
    let mut matchers: Vec<JoinHandle<Result<MatchOutcome, Error>>> =
        Vec::with_capacity(records.len());
    for record in records {
        // build() saw every record digest, so the lookup cannot miss.
        let Some(cell) = registry.lookup(&record.digest) else {
            continue;
        };
        let watch = cell.watch();
        let permits = Arc::clone(&match_permits);
        let sink = Arc::clone(&sink);
        let limit = config.wait_timeout;
        matchers.push(tokio::spawn(async move {
            // The semaphore is never closed, so the permit always arrives.
            let _permit = permits.acquire_owned().await.ok();
            match_worker(record, watch, limit, &sink).await
        }));
    }

    let chunk_size = candidates.len().div_ceil(hash_workers).max(1);
    let mut hashers: Vec<JoinHandle<()>> = Vec::with_capacity(hash_workers);
    for chunk in candidates.chunks(chunk_size) {
        let chunk = chunk.to_vec();
        let registry = Arc::clone(&registry);
        let progress = Arc::clone(&progress);
        let iterations = config.iterations;
        hashers.push(tokio::task::spawn_blocking(move || {
            hash_worker(&registry, chunk, iterations, &progress)
        }));
    }

    let mut first_error: Option<Error> = None;
    for handle in hashers {
        if let Err(join_err) = handle.await {
            if first_error.is_none() {
                first_error = Some(Error::WorkerPanic {
                    scope: "hash",
                    message: join_err.to_string(),
                });
            }
        }
    }

    // Every producer is done. Dropping the last registry owner closes the
    // unresolved cells, which is the matchers' end-of-dictionary signal.
    drop(registry);

    for handle in matchers {
        match handle.await {
            Ok(Ok(MatchOutcome::Matched)) => summary.matched += 1,
            Ok(Ok(MatchOutcome::TimedOut)) => summary.timed_out += 1,
            Ok(Ok(MatchOutcome::Exhausted)) => summary.exhausted += 1,
            Ok(Err(err)) => {
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
            Err(join_err) => {
                if first_error.is_none() {
                    first_error = Some(Error::WorkerPanic {
                        scope: "match",
                        message: join_err.to_string(),
                    });
                }
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(summary),
    }
}
