//! Rewrite and delete decisions for a single block, and applying them to the
//! block's retention record.

use std::time::Duration;

use crate::block::Block;
use crate::fingerprint::{Fingerprint, same_as_recorded};
use crate::policy::has_expired;

/// Outcome of evaluating one block against the current tiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionDecision {
    /// The base period lapsed and no tier justifies keeping the block.
    pub delete: bool,
    /// The kept tier set differs from the last recorded one.
    pub rewrite_keep: bool,
    /// At least one expired short tier has not been recorded as dropped.
    pub rewrite_drop: bool,
}

impl RetentionDecision {
    pub const DELETE: Self = Self {
        delete: true,
        rewrite_keep: false,
        rewrite_drop: false,
    };

    /// Whether the retention record needs to change.
    pub fn needs_rewrite(&self) -> bool {
        !self.delete && (self.rewrite_keep || self.rewrite_drop)
    }

    /// Whether the block is left untouched.
    pub fn is_noop(&self) -> bool {
        !self.delete && !self.needs_rewrite()
    }
}

/// Decide whether `block` must be deleted or have its record rewritten.
///
/// Once the base period has lapsed an empty keep set deletes the block right
/// away, even if the longest configured period would suggest waiting.
pub fn evaluate<S: AsRef<str>>(
    drop_candidates: &[S],
    keep_candidates: &[S],
    block: &Block,
    now: i64,
    base_period: Duration,
) -> RetentionDecision {
    let record = &block.retention_record;
    let mut decision = RetentionDecision::default();

    if has_expired(block.max_timestamp, now, base_period) {
        if keep_candidates.is_empty() {
            return RetentionDecision::DELETE;
        }
        decision.rewrite_keep = !same_as_recorded(&record.keep_history, keep_candidates);
    }

    decision.rewrite_drop = drop_candidates
        .iter()
        .any(|label| !record.has_dropped(&Fingerprint::of(label.as_ref())));

    decision
}

/// Record the decided changes on the block and bump its rewrite counter.
///
/// Keep and drop changes found in the same pass count as one rewrite.
pub fn apply_record<S: AsRef<str>>(
    block: &mut Block,
    drop_candidates: &[S],
    keep_candidates: &[S],
    decision: RetentionDecision,
) {
    let record = &mut block.retention_record;

    if decision.rewrite_drop {
        for label in drop_candidates {
            let fingerprint = Fingerprint::of(label.as_ref());
            if !record.has_dropped(&fingerprint) {
                record.drop_fingerprints.push(fingerprint);
            }
        }
    }

    if decision.rewrite_keep {
        record.keep_history.push(Fingerprint::of_set(keep_candidates));
    }

    block.rewrite_count += 1;
}
