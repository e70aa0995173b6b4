//! Iterated SHA-256 and the digest value type the registry is keyed by.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use sha2::{Digest as _, Sha256};

/// Width of a digest in bytes (SHA-256 output).
pub const DIGEST_LEN: usize = 32;

/// Hash applications per candidate in the stored credential format.
pub const DEFAULT_ITERATIONS: NonZeroU32 = NonZeroU32::new(100_000).unwrap();

/// Output of [`iterated_digest`], usable directly as a map key.
///
/// Equality is over the raw bytes, so a digest parsed from uppercase hex
/// compares equal to the same digest computed from a candidate.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

/// Why a digest field failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ParseDigestError {
    #[error("digest field must be {} hex digits, got {digits}", 2 * DIGEST_LEN)]
    Length { digits: usize },
    #[error("digest field contains non-hex byte 0x{byte:02x}")]
    Digit { byte: u8 },
}

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Strict parse of a hex digest field. Every byte must be a hex digit in
    /// either case and the field must decode to exactly [`DIGEST_LEN`] bytes.
    pub fn from_hex(hex: &str) -> Result<Self, ParseDigestError> {
        let raw = hex.as_bytes();
        if raw.len() != 2 * DIGEST_LEN {
            return Err(ParseDigestError::Length { digits: raw.len() });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        for (out, pair) in bytes.iter_mut().zip(raw.chunks_exact(2)) {
            let hi = hex_nibble(pair[0])?;
            let lo = hex_nibble(pair[1])?;
            *out = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

fn hex_nibble(byte: u8) -> Result<u8, ParseDigestError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        _ => Err(ParseDigestError::Digit { byte }),
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Digest {
    type Err = ParseDigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({self})")
    }
}

/// Apply SHA-256 to the UTF-8 bytes of `candidate`, then keep re-applying it
/// to its own output until `iterations` total applications have run.
///
/// Each call owns its hasher state, so any number of threads can digest
/// candidates concurrently without coordination.
pub fn iterated_digest(candidate: &str, iterations: NonZeroU32) -> Digest {
    let mut out: [u8; DIGEST_LEN] = Sha256::digest(candidate.as_bytes()).into();
    for _ in 1..iterations.get() {
        out = Sha256::digest(out).into();
    }
    Digest(out)
}
