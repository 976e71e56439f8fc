//! Fingerprints for change detection on retention records.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of a string. It is stable
//! across processes and restarts, so it can be persisted in block metadata and
//! compared on a later pass.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Separator used when fingerprinting a set of tier labels.
pub const SET_SEPARATOR: &str = ";";

/// Deterministic identifier derived from a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a single string, usually one tier label.
    pub fn of(input: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Fingerprint a set of labels joined with `;` in the given order.
    ///
    /// Callers pass the keep set already sorted, so the result does not depend
    /// on configuration order.
    pub fn of_set<S: AsRef<str>>(labels: &[S]) -> Self {
        let joined = labels
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(SET_SEPARATOR);
        Self::of(&joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether `candidates` is what the keep history last recorded.
///
/// Only the newest history entry is consulted. An empty history matches only
/// an empty candidate set.
pub fn same_as_recorded<S: AsRef<str>>(history: &[Fingerprint], candidates: &[S]) -> bool {
    match history.last() {
        None => candidates.is_empty(),
        Some(latest) => *latest == Fingerprint::of_set(candidates),
    }
}
