//! Digest-keyed lookup table of resolution cells.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cell::ResolutionCell;
use crate::digest::Digest;

/// All the cells of one run, keyed by the digest they resolve.
///
/// Built once from the full set of wanted digests before any producer or
/// consumer starts, and never mutated afterwards, so lookups are plain
/// hash-map reads with no locking. Dropping the registry drops the last owner
/// of every cell, which is how consumers learn that production has ended.
pub struct HashRegistry {
    cells: HashMap<Digest, Arc<ResolutionCell>>,
}

impl HashRegistry {
    /// One cell per distinct digest; duplicate digests share a cell.
    pub fn build<I>(digests: I) -> Self
    where
        I: IntoIterator<Item = Digest>,
    {
        let mut cells = HashMap::new();
        for digest in digests {
            cells
                .entry(digest)
                .or_insert_with(|| Arc::new(ResolutionCell::new()));
        }
        Self { cells }
    }

    /// The cell for `digest`, if that digest was asked for at build time.
    pub fn lookup(&self, digest: &Digest) -> Option<&Arc<ResolutionCell>> {
        self.cells.get(digest)
    }

    /// Number of distinct digests.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroU32;
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::cell::WaitOutcome;
    use crate::digest::iterated_digest;

    fn digest_of(candidate: &str) -> Digest {
        iterated_digest(candidate, NonZeroU32::new(8).unwrap())
    }

    #[test]
    fn test_duplicate_digests_share_cell() {
        let shared = digest_of("shared");
        let lone = digest_of("lone");
        let registry = HashRegistry::build([shared, lone, shared]);

        assert_eq!(registry.len(), 2);
        let a = registry.lookup(&shared).unwrap();
        let b = registry.lookup(&shared).unwrap();
        assert!(Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_unknown_digest_misses() {
        let registry = HashRegistry::build([digest_of("present")]);
        assert!(registry.lookup(&digest_of("absent")).is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_empty_build() {
        let registry = HashRegistry::build([]);
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shared_cell_fan_out() {
        let shared = digest_of("shared");
        let registry = HashRegistry::build([shared]);
        let cell = registry.lookup(&shared).unwrap();

        let first = tokio::spawn(cell.watch().wait(Duration::from_secs(30)));
        let second = tokio::spawn(cell.watch().wait(Duration::from_secs(30)));

        assert!(cell.resolve("shared"));

        let expected = WaitOutcome::Resolved(Arc::from("shared"));
        assert_eq!(first.await.unwrap(), expected);
        assert_eq!(second.await.unwrap(), expected);
    }
}
