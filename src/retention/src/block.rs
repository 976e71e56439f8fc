//! Block metadata the retention core reads and mutates.

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Retention bookkeeping persisted alongside a block.
///
/// Both lists are append-only. Only the last entry of `keep_history` is used
/// for change detection; earlier entries are kept as an audit trail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRecord {
    /// Fingerprints of kept tier sets, newest last.
    #[serde(default)]
    pub keep_history: Vec<Fingerprint>,

    /// Fingerprints of tier labels whose data has been dropped.
    #[serde(default)]
    pub drop_fingerprints: Vec<Fingerprint>,
}

impl RetentionRecord {
    /// Whether a tier fingerprint has already been recorded as dropped.
    pub fn has_dropped(&self, fingerprint: &Fingerprint) -> bool {
        self.drop_fingerprints.contains(fingerprint)
    }
}

/// An immutable storage block as seen by the retention core.
///
/// Timestamps are seconds since the Unix epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: String,
    pub min_timestamp: i64,
    pub max_timestamp: i64,

    #[serde(default)]
    pub retention_record: RetentionRecord,

    /// Number of retention rewrites requested for this block.
    #[serde(default)]
    pub rewrite_count: u64,

    /// Set once every tier has lapsed. Terminal for the retention core.
    #[serde(default)]
    pub marked_deleted: bool,
}

impl Block {
    pub fn new(id: impl Into<String>, min_timestamp: i64, max_timestamp: i64) -> Self {
        Self {
            id: id.into(),
            min_timestamp,
            max_timestamp,
            ..Default::default()
        }
    }
}

/// Ordered blocks of one bucket. The retention core never adds or removes
/// blocks.
pub type Bucket = Vec<Block>;
