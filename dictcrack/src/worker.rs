//! Hash producers and match consumers.

use std::io::Write;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dictcrack_core::{CellWatch, HashRegistry, WaitOutcome, iterated_digest};
use tracing::debug;

use crate::error::Error;
use crate::input::Record;
use crate::sink::MatchSink;

/// How one matcher finished. The scheduler tallies these into its summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    TimedOut,
    Exhausted,
}

/// Digest every candidate in `chunk` and publish plaintexts for digests the
/// registry wants.
///
/// Pure CPU, intended for a blocking thread. `progress` counts candidates
/// finished, not matches found.
pub fn hash_worker(
    registry: &HashRegistry,
    chunk: Vec<String>,
    iterations: NonZeroU32,
    progress: &AtomicU64,
) {
    for candidate in chunk {
        let digest = iterated_digest(&candidate, iterations);
        if let Some(cell) = registry.lookup(&digest) {
            if cell.resolve(&candidate) {
                debug!(%digest, "candidate resolved a wanted digest");
            }
        }
        progress.fetch_add(1, Ordering::Relaxed);
    }
}

/// Wait on one record's cell and emit `username plaintext` if it resolves
/// within `limit`.
///
/// Misses are not errors. A timeout or an exhausted dictionary only shapes
/// the outcome; the sole failure mode here is the sink refusing the write.
pub async fn match_worker<W: Write>(
    record: Record,
    watch: CellWatch,
    limit: Duration,
    sink: &MatchSink<W>,
) -> Result<MatchOutcome, Error> {
    match watch.wait(limit).await {
        WaitOutcome::Resolved(plaintext) => {
            sink.emit(&record.username, &plaintext)?;
            Ok(MatchOutcome::Matched)
        }
        WaitOutcome::TimedOut => {
            debug!(username = %record.username, timeout = ?limit, "no match before deadline");
            Ok(MatchOutcome::TimedOut)
        }
        WaitOutcome::Exhausted => {
            debug!(username = %record.username, "dictionary exhausted without a match");
            Ok(MatchOutcome::Exhausted)
        }
    }
}
