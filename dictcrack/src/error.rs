use std::io;
use std::path::PathBuf;

use dictcrack_core::ParseDigestError;

/// Fatal errors. Any of these aborts the run before results are trusted.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    ReadInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path}:{line}: malformed record, expected `username hex_digest`")]
    MalformedRecord { path: PathBuf, line: usize },

    #[error("{path}:{line}: bad digest for user `{username}`: {source}")]
    BadDigest {
        path: PathBuf,
        line: usize,
        username: String,
        #[source]
        source: ParseDigestError,
    },

    #[error("{scope} worker aborted: {message}")]
    WorkerPanic { scope: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
