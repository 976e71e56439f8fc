//! Retention Pass Metrics
//!
//! Thread-safe counters for monitoring bucket retention passes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Thread-safe metrics for tracking retention passes
#[derive(Debug, Clone)]
pub struct RetentionMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Number of bucket passes completed
    passes: AtomicUsize,
    /// Blocks that went through a full keep/drop evaluation
    blocks_evaluated: AtomicUsize,
    /// Blocks skipped (too young, or already deleted)
    blocks_skipped: AtomicUsize,
    /// Blocks marked deleted
    blocks_deleted: AtomicUsize,
    /// Blocks whose retention record was rewritten
    blocks_rewritten: AtomicUsize,
    /// Drop fingerprints appended to retention records
    drop_fingerprints_recorded: AtomicU64,
    /// Keep history entries appended to retention records
    keep_fingerprints_recorded: AtomicU64,
}

impl Default for RetentionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RetentionMetrics {
    /// Create a new metrics tracker
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                passes: AtomicUsize::new(0),
                blocks_evaluated: AtomicUsize::new(0),
                blocks_skipped: AtomicUsize::new(0),
                blocks_deleted: AtomicUsize::new(0),
                blocks_rewritten: AtomicUsize::new(0),
                drop_fingerprints_recorded: AtomicU64::new(0),
                keep_fingerprints_recorded: AtomicU64::new(0),
            }),
        }
    }

    pub fn record_pass(&self) {
        self.inner.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_evaluated(&self) {
        self.inner.blocks_evaluated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_skipped(&self) {
        self.inner.blocks_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_deleted(&self) {
        self.inner.blocks_deleted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block_rewritten(&self) {
        self.inner.blocks_rewritten.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_drop_fingerprints(&self, count: u64) {
        self.inner
            .drop_fingerprints_recorded
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_keep_fingerprints(&self, count: u64) {
        self.inner
            .keep_fingerprints_recorded
            .fetch_add(count, Ordering::Relaxed);
    }

    /// Get total passes completed
    pub fn passes(&self) -> usize {
        self.inner.passes.load(Ordering::Relaxed)
    }

    /// Get total blocks evaluated
    pub fn blocks_evaluated(&self) -> usize {
        self.inner.blocks_evaluated.load(Ordering::Relaxed)
    }

    /// Get total blocks skipped
    pub fn blocks_skipped(&self) -> usize {
        self.inner.blocks_skipped.load(Ordering::Relaxed)
    }

    /// Get total blocks deleted
    pub fn blocks_deleted(&self) -> usize {
        self.inner.blocks_deleted.load(Ordering::Relaxed)
    }

    /// Get total blocks rewritten
    pub fn blocks_rewritten(&self) -> usize {
        self.inner.blocks_rewritten.load(Ordering::Relaxed)
    }

    pub fn drop_fingerprints_recorded(&self) -> u64 {
        self.inner.drop_fingerprints_recorded.load(Ordering::Relaxed)
    }

    pub fn keep_fingerprints_recorded(&self) -> u64 {
        self.inner.keep_fingerprints_recorded.load(Ordering::Relaxed)
    }
}
