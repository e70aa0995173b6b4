//! Core matching protocol for dictionary recovery of hashed credentials.
//!
//! The model is a one-shot publish/subscribe exchange keyed by digest. A
//! [`HashRegistry`] is built up front from every digest the caller wants
//! recovered, with one [`ResolutionCell`] per distinct digest. Hash producers
//! run [`iterated_digest`] over candidate plaintexts and publish into the
//! matching cell when a digest lines up; consumers hold a [`CellWatch`] and
//! wait with a deadline for their cell to fill.
//!
//! Cells resolve at most once. The first producer to publish wins, every
//! watcher observes that same plaintext, and watchers that subscribe after
//! resolution still see it. Dropping the registry closes the cells that never
//! resolved, so waiters learn that no producer is coming instead of sleeping
//! out their full deadline.

pub mod cell;
pub mod digest;
pub mod registry;

pub use cell::{CellWatch, ResolutionCell, WaitOutcome};
pub use digest::{DEFAULT_ITERATIONS, DIGEST_LEN, Digest, ParseDigestError, iterated_digest};
pub use registry::HashRegistry;
