//! Dictionary recovery of plaintext passwords for a hashed credential
//! database.
//!
//! Inputs are a candidate dictionary (one plaintext per line) and a database
//! of `username hex_digest` records. Hash workers push every candidate
//! through iterated SHA-256 while one matcher per user waits, with a
//! deadline, for the cell behind that user's digest to resolve. Recovered
//! credentials stream to the sink as `username plaintext` lines the moment
//! they are found.
//!
//! The cell and registry primitives live in [`dictcrack_core`]; this crate
//! adds input validation, worker scheduling, and the command-line front end.

pub mod error;
pub mod input;
pub mod pool;
pub mod sink;
pub mod worker;

pub use error::Error;
pub use input::{Record, load_dictionary, load_records, read_candidates, read_records};
pub use pool::{CrackSummary, PoolConfig, crack};
pub use sink::MatchSink;
pub use worker::{MatchOutcome, hash_worker, match_worker};
