//! One-shot resolution cells: single write, any number of waiting readers.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, Instant};

/// Write side of a one-shot slot holding the plaintext behind one digest.
///
/// A cell starts unresolved. The first [`resolve`](Self::resolve) wins and
/// wakes every watcher; later calls are no-ops. Watchers subscribe through
/// [`watch`](Self::watch) and outlive the cell without keeping it open: once
/// every owner of an unresolved cell is gone, pending waits end in
/// [`WaitOutcome::Exhausted`].
pub struct ResolutionCell {
    slot: watch::Sender<Option<Arc<str>>>,
}

/// Reader half of a [`ResolutionCell`].
pub struct CellWatch {
    slot: watch::Receiver<Option<Arc<str>>>,
}

/// What a waiter observed by its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The cell resolved in time; every waiter sees this same plaintext.
    Resolved(Arc<str>),
    /// The deadline passed with the cell still unresolved.
    TimedOut,
    /// Every cell owner is gone, so no plaintext can arrive anymore.
    Exhausted,
}

impl ResolutionCell {
    pub fn new() -> Self {
        Self {
            slot: watch::Sender::new(None),
        }
    }

    /// Publish `candidate` as this cell's plaintext.
    ///
    /// Returns whether this call performed the transition. Exactly one call
    /// per cell ever returns `true`, no matter how many producers race.
    pub fn resolve(&self, candidate: &str) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(Arc::from(candidate));
                true
            } else {
                false
            }
        })
    }

    /// Current plaintext, if the cell has resolved.
    pub fn plaintext(&self) -> Option<Arc<str>> {
        self.slot.borrow().clone()
    }

    pub fn is_resolved(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// New reader handle. Subscribing after resolution still sees the value.
    pub fn watch(&self) -> CellWatch {
        CellWatch {
            slot: self.slot.subscribe(),
        }
    }
}

impl Default for ResolutionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl CellWatch {
    /// Wait until the cell resolves, every owner drops, or `limit` elapses,
    /// whichever comes first.
    ///
    /// A cell that resolved before the call returns immediately, even with a
    /// zero `limit`.
    pub async fn wait(mut self, limit: Duration) -> WaitOutcome {
        let deadline = Instant::now() + limit;
        loop {
            if let Some(plaintext) = self.slot.borrow_and_update().clone() {
                return WaitOutcome::Resolved(plaintext);
            }
            match time::timeout_at(deadline, self.slot.changed()).await {
                Ok(Ok(())) => continue,
                Ok(Err(_)) => return WaitOutcome::Exhausted,
                Err(_) => return WaitOutcome::TimedOut,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const LONG: Duration = Duration::from_secs(30);
    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn test_first_resolve_wins() {
        let cell = ResolutionCell::new();
        assert!(!cell.is_resolved());
        assert!(cell.resolve("first"));
        assert!(!cell.resolve("second"));
        assert!(cell.is_resolved());
        assert_eq!(cell.plaintext().as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_resolved_cell_returns_immediately() {
        let cell = ResolutionCell::new();
        cell.resolve("hunter2");
        let outcome = cell.watch().wait(Duration::ZERO).await;
        assert_eq!(outcome, WaitOutcome::Resolved(Arc::from("hunter2")));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_waiter_fan_out() {
        let cell = Arc::new(ResolutionCell::new());
        let waiters: Vec<_> = (0..8)
            .map(|_| {
                let watch = cell.watch();
                tokio::spawn(watch.wait(LONG))
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(cell.resolve("letmein"));

        for waiter in waiters {
            let outcome = waiter.await.unwrap();
            assert_eq!(outcome, WaitOutcome::Resolved(Arc::from("letmein")));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_racing_producers_publish_once() {
        let cell = Arc::new(ResolutionCell::new());
        let a = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move { cell.resolve("alpha") })
        };
        let b = {
            let cell = Arc::clone(&cell);
            tokio::spawn(async move { cell.resolve("bravo") })
        };
        let (won_a, won_b) = (a.await.unwrap(), b.await.unwrap());

        assert!(won_a ^ won_b);
        let winner = if won_a { "alpha" } else { "bravo" };
        assert_eq!(cell.plaintext().as_deref(), Some(winner));
    }

    #[tokio::test]
    async fn test_unresolved_cell_times_out() {
        let cell = ResolutionCell::new();
        let start = std::time::Instant::now();
        let outcome = cell.watch().wait(SHORT).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(start.elapsed() >= SHORT);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_drop_ends_waits_early() {
        let cell = ResolutionCell::new();
        let waiter = tokio::spawn(cell.watch().wait(LONG));
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(cell);
        assert_eq!(waiter.await.unwrap(), WaitOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_late_watch_of_resolved_cell() {
        let cell = ResolutionCell::new();
        cell.resolve("persist");
        let watch = cell.watch();
        drop(cell);
        assert_eq!(watch.wait(LONG).await, WaitOutcome::Resolved(Arc::from("persist")));
    }
}
