//! Serialized result output shared by every matcher.

use std::io::{self, Write};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only `username plaintext` stream.
///
/// Matchers on different tasks emit through one shared sink; the lock is held
/// per line, so concurrent emissions never interleave within a line and each
/// emitted line is complete.
pub struct MatchSink<W> {
    out: Mutex<W>,
    emitted: AtomicU64,
}

impl<W: Write> MatchSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            emitted: AtomicU64::new(0),
        }
    }

    /// Write one `username plaintext` line.
    pub fn emit(&self, username: &str, plaintext: &str) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(|err| err.into_inner());
        writeln!(out, "{username} {plaintext}")?;
        self.emitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Lines emitted so far.
    pub fn emitted(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|err| err.into_inner())
    }
}
