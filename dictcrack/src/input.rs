//! Dictionary and credential-database loading.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use dictcrack_core::Digest;

use crate::error::Error;

/// One credential database line: a user and the digest of their password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub username: String,
    pub digest: Digest,
}

/// Read dictionary candidates, one per line.
///
/// Lines are taken verbatim, whitespace included, since the stored digest was
/// computed over the exact bytes of the original password. Repeated lines are
/// collapsed to their first occurrence; hashing a duplicate could never
/// resolve anything new.
pub fn read_candidates<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if seen.insert(line.clone()) {
            candidates.push(line);
        }
    }
    Ok(candidates)
}

/// Parse credential records from `reader`, attributing errors to `path`.
///
/// Each line must hold a username and a 64-digit hex field separated by
/// whitespace; anything after the second field is ignored. A username seen
/// again on a later line keeps its last digest. Any malformed line is fatal
/// and aborts the run before a single worker starts.
pub fn read_records<R: BufRead>(reader: R, path: &Path) -> Result<Vec<Record>, Error> {
    let mut records: Vec<Record> = Vec::new();
    let mut index_of: HashMap<String, usize> = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| Error::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;
        let mut fields = line.split_whitespace();
        let (Some(username), Some(digest_hex)) = (fields.next(), fields.next()) else {
            return Err(Error::MalformedRecord {
                path: path.to_path_buf(),
                line: idx + 1,
            });
        };
        let digest = Digest::from_hex(digest_hex).map_err(|source| Error::BadDigest {
            path: path.to_path_buf(),
            line: idx + 1,
            username: username.to_string(),
            source,
        })?;

        match index_of.get(username) {
            Some(&pos) => records[pos].digest = digest,
            None => {
                index_of.insert(username.to_string(), records.len());
                records.push(Record {
                    username: username.to_string(),
                    digest,
                });
            }
        }
    }
    Ok(records)
}

/// Load the candidate dictionary from `path`.
pub fn load_dictionary(path: &Path) -> Result<Vec<String>, Error> {
    let file = File::open(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    read_candidates(BufReader::new(file)).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the credential database from `path`.
pub fn load_records(path: &Path) -> Result<Vec<Record>, Error> {
    let file = File::open(path).map_err(|source| Error::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    read_records(BufReader::new(file), path)
}
