//! Bucket Retention Driver
//!
//! Walks the blocks of a bucket and applies the retention tiers to each one
//! independently:
//!
//! 1. Blocks already marked deleted are left alone.
//! 2. Blocks younger than the shortest period are skipped.
//! 3. Blocks older than the longest period are marked deleted.
//! 4. Everything in between gets its keep and drop sets evaluated, and is
//!    either marked deleted or has its retention record rewritten when the
//!    sets changed since the last pass.
//!
//! Running the driver twice with the same configuration and clock is a no-op
//! on the second run.

use std::time::Duration;

use tracing::{debug, info};

use crate::block::Block;
use crate::config::RetentionConfig;
use crate::decision::{apply_record, evaluate};
use crate::metrics::RetentionMetrics;
use crate::policy::{build_drop_set, build_keep_set, has_expired, period_range};

/// What happened to a single block during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Already deleted, or not older than the shortest period.
    Skipped,
    /// Evaluated, nothing changed since the last recorded pass.
    Unchanged,
    /// Retention record rewritten.
    Rewritten,
    /// Marked deleted.
    Deleted,
}

/// Summary of one pass over a bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketRetentionResult {
    pub blocks_skipped: usize,
    pub blocks_unchanged: usize,
    pub blocks_rewritten: usize,
    pub blocks_deleted: usize,
    /// Set when the pass only computed decisions without mutating blocks.
    pub dry_run: bool,
}

impl BucketRetentionResult {
    fn record(&mut self, outcome: BlockOutcome) {
        match outcome {
            BlockOutcome::Skipped => self.blocks_skipped += 1,
            BlockOutcome::Unchanged => self.blocks_unchanged += 1,
            BlockOutcome::Rewritten => self.blocks_rewritten += 1,
            BlockOutcome::Deleted => self.blocks_deleted += 1,
        }
    }

    /// Number of blocks that went through keep/drop evaluation or deletion.
    pub fn blocks_evaluated(&self) -> usize {
        self.blocks_unchanged + self.blocks_rewritten + self.blocks_deleted
    }
}

/// Applies retention tiers to the blocks of a bucket.
#[derive(Debug, Clone, Default)]
pub struct BucketRetentionDriver {
    metrics: RetentionMetrics,
    dry_run: bool,
}

impl BucketRetentionDriver {
    pub fn new(metrics: RetentionMetrics) -> Self {
        Self {
            metrics,
            dry_run: false,
        }
    }

    /// In dry-run mode decisions are computed and logged but no block is
    /// mutated.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn metrics(&self) -> &RetentionMetrics {
        &self.metrics
    }

    /// Run one pass over `blocks` with the given configuration snapshot.
    pub fn apply(
        &self,
        config: &RetentionConfig,
        blocks: &mut [Block],
        now: i64,
    ) -> BucketRetentionResult {
        let (min_period, max_period) = period_range(&config.tiers, config.base_period);

        debug!(
            blocks = blocks.len(),
            tiers = config.tiers.len(),
            now,
            min_period = %humantime::format_duration(min_period),
            max_period = %humantime::format_duration(max_period),
            dry_run = self.dry_run,
            "Starting bucket retention pass"
        );

        let mut result = BucketRetentionResult {
            dry_run: self.dry_run,
            ..Default::default()
        };

        for block in blocks.iter_mut() {
            let outcome = self.apply_block(config, block, now, min_period, max_period);
            match outcome {
                BlockOutcome::Skipped => self.metrics.record_block_skipped(),
                BlockOutcome::Deleted => {
                    self.metrics.record_block_evaluated();
                    self.metrics.record_block_deleted();
                }
                BlockOutcome::Rewritten => {
                    self.metrics.record_block_evaluated();
                    self.metrics.record_block_rewritten();
                }
                BlockOutcome::Unchanged => self.metrics.record_block_evaluated(),
            }
            result.record(outcome);
        }

        self.metrics.record_pass();

        info!(
            blocks_skipped = result.blocks_skipped,
            blocks_unchanged = result.blocks_unchanged,
            blocks_rewritten = result.blocks_rewritten,
            blocks_deleted = result.blocks_deleted,
            dry_run = self.dry_run,
            "Bucket retention pass completed"
        );

        result
    }

    fn apply_block(
        &self,
        config: &RetentionConfig,
        block: &mut Block,
        now: i64,
        min_period: Duration,
        max_period: Duration,
    ) -> BlockOutcome {
        if block.marked_deleted {
            debug!(block_id = %block.id, "Block already marked deleted");
            return BlockOutcome::Skipped;
        }

        if !has_expired(block.max_timestamp, now, min_period) {
            debug!(
                block_id = %block.id,
                max_timestamp = block.max_timestamp,
                "Block within shortest retention period"
            );
            return BlockOutcome::Skipped;
        }

        if has_expired(block.max_timestamp, now, max_period) {
            info!(
                block_id = %block.id,
                max_timestamp = block.max_timestamp,
                dry_run = self.dry_run,
                "All retention tiers lapsed, marking block deleted"
            );
            self.mark_deleted(block);
            return BlockOutcome::Deleted;
        }

        let drop_set = build_drop_set(&config.tiers, config.base_period, now, block.max_timestamp);
        let keep_set = build_keep_set(&config.tiers, config.base_period, now, block.max_timestamp);
        let decision = evaluate(&drop_set, &keep_set, block, now, config.base_period);

        if decision.delete {
            info!(
                block_id = %block.id,
                max_timestamp = block.max_timestamp,
                dry_run = self.dry_run,
                "Base retention lapsed and no tier keeps the block, marking block deleted"
            );
            self.mark_deleted(block);
            return BlockOutcome::Deleted;
        }

        if !decision.needs_rewrite() {
            return BlockOutcome::Unchanged;
        }

        info!(
            block_id = %block.id,
            rewrite_keep = decision.rewrite_keep,
            rewrite_drop = decision.rewrite_drop,
            keep = ?keep_set,
            drop = ?drop_set,
            rewrite_count = block.rewrite_count,
            dry_run = self.dry_run,
            "Retention tiers changed, rewriting block retention record"
        );

        if !self.dry_run {
            let record = &block.retention_record;
            let (drops_before, keeps_before) =
                (record.drop_fingerprints.len(), record.keep_history.len());

            apply_record(block, &drop_set, &keep_set, decision);

            let record = &block.retention_record;
            self.metrics
                .record_drop_fingerprints((record.drop_fingerprints.len() - drops_before) as u64);
            self.metrics
                .record_keep_fingerprints((record.keep_history.len() - keeps_before) as u64);
        }

        BlockOutcome::Rewritten
    }

    fn mark_deleted(&self, block: &mut Block) {
        if !self.dry_run {
            block.marked_deleted = true;
        }
    }
}

/// Apply the retention tiers in `config` to every block of `bucket` as of
/// `now` (seconds since the Unix epoch), mutating the blocks in place.
pub fn apply_retention(config: &RetentionConfig, bucket: &mut [Block], now: i64) {
    BucketRetentionDriver::default().apply(config, bucket, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tier;
    use crate::fingerprint::Fingerprint;

    const DAY: i64 = 24 * 3600;
    const NOW: i64 = 1_700_000_000;

    fn days(n: i64) -> Duration {
        Duration::from_secs((n * DAY) as u64)
    }

    fn config() -> RetentionConfig {
        RetentionConfig::new(
            days(13 * 30),
            vec![
                Tier::new(days(6 * 30), "h1"),
                Tier::new(days(2 * 12 * 30), "b1"),
                Tier::new(days(3 * 12 * 30), "ying"),
            ],
        )
    }

    fn block_aged(id: &str, age_days: i64) -> Block {
        Block::new(id, NOW - age_days * DAY - 3600, NOW - age_days * DAY)
    }

    #[test]
    fn test_young_block_is_noop() {
        let mut bucket = vec![block_aged("young", 30)];
        let before = bucket.clone();

        let result = BucketRetentionDriver::default().apply(&config(), &mut bucket, NOW);

        assert_eq!(bucket, before);
        assert_eq!(result.blocks_skipped, 1);
        assert_eq!(result.blocks_evaluated(), 0);
    }

    #[test]
    fn test_blocks_evaluated_independently() {
        let mut bucket = vec![
            block_aged("young", 30),
            block_aged("short-expired", 6 * 30 + 1),
            block_aged("base-expired", 13 * 30 + 1),
            block_aged("ancient", 3 * 12 * 30 + 1),
        ];

        let metrics = RetentionMetrics::new();
        let result = BucketRetentionDriver::new(metrics.clone()).apply(&config(), &mut bucket, NOW);

        assert_eq!(result.blocks_skipped, 1);
        assert_eq!(result.blocks_rewritten, 2);
        assert_eq!(result.blocks_deleted, 1);
        assert_eq!(result.blocks_unchanged, 0);
        assert_eq!(result.blocks_evaluated(), 3);

        assert_eq!(bucket[0].rewrite_count, 0);
        assert_eq!(
            bucket[1].retention_record.drop_fingerprints,
            vec![Fingerprint::of("h1")]
        );
        assert_eq!(
            bucket[2].retention_record.keep_history,
            vec![Fingerprint::of("b1;ying")]
        );
        assert!(bucket[3].marked_deleted);
        assert_eq!(bucket[3].rewrite_count, 0);

        assert_eq!(metrics.passes(), 1);
        assert_eq!(metrics.blocks_skipped(), 1);
        assert_eq!(metrics.blocks_rewritten(), 2);
        assert_eq!(metrics.blocks_deleted(), 1);
        // base-expired block records both h1 (dropped) and the keep set
        assert_eq!(metrics.drop_fingerprints_recorded(), 2);
        assert_eq!(metrics.keep_fingerprints_recorded(), 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut bucket = vec![
            block_aged("short-expired", 6 * 30 + 1),
            block_aged("base-expired", 13 * 30 + 1),
        ];

        let driver = BucketRetentionDriver::default();
        driver.apply(&config(), &mut bucket, NOW);
        let after_first = bucket.clone();

        let result = driver.apply(&config(), &mut bucket, NOW);
        assert_eq!(bucket, after_first);
        assert_eq!(result.blocks_unchanged, 2);
        assert_eq!(result.blocks_rewritten, 0);
    }

    #[test]
    fn test_deleted_block_not_reevaluated() {
        let mut block = block_aged("gone", 13 * 30 + 1);
        block.marked_deleted = true;
        let mut bucket = vec![block];
        let before = bucket.clone();

        let result = BucketRetentionDriver::default().apply(&config(), &mut bucket, NOW);
        assert_eq!(bucket, before);
        assert_eq!(result.blocks_skipped, 1);
    }

    #[test]
    fn test_no_tiers_deletes_once_base_lapses() {
        let config = RetentionConfig::new(days(7), Vec::new());
        let mut bucket = vec![block_aged("young", 6), block_aged("old", 7)];

        apply_retention(&config, &mut bucket, NOW);

        assert!(!bucket[0].marked_deleted);
        assert!(bucket[1].marked_deleted);
        assert_eq!(bucket[1].rewrite_count, 0);
    }

    #[test]
    fn test_removing_long_tiers_deletes_kept_block() {
        let mut bucket = vec![block_aged("b", 13 * 30 + 1)];
        apply_retention(&config(), &mut bucket, NOW);
        assert!(!bucket[0].marked_deleted);
        assert_eq!(bucket[0].rewrite_count, 1);

        // Long tiers removed from configuration: nothing outlives base retention
        let config = RetentionConfig::new(days(13 * 30), vec![Tier::new(days(6 * 30), "h1")]);
        apply_retention(&config, &mut bucket, NOW);
        assert!(bucket[0].marked_deleted);
        assert_eq!(bucket[0].rewrite_count, 1);
    }

    #[test]
    fn test_kept_block_deleted_when_last_tier_lapses() {
        let config = RetentionConfig::new(
            days(100),
            vec![Tier::new(days(50), "short"), Tier::new(days(120), "long")],
        );
        let mut bucket = vec![block_aged("b", 110)];

        apply_retention(&config, &mut bucket, NOW);
        assert!(!bucket[0].marked_deleted);
        assert_eq!(
            bucket[0].retention_record.keep_history,
            vec![Fingerprint::of("long")]
        );
        assert_eq!(
            bucket[0].retention_record.drop_fingerprints,
            vec![Fingerprint::of("short")]
        );

        apply_retention(&config, &mut bucket, NOW + 11 * DAY);
        assert!(bucket[0].marked_deleted);
        assert_eq!(bucket[0].rewrite_count, 1);
    }

    #[test]
    fn test_sub_second_tier_not_expired_early() {
        let config = RetentionConfig::new(
            Duration::from_secs(10),
            vec![Tier::new(Duration::from_millis(1500), "x")],
        );
        let mut bucket = vec![Block::new("b", 90, 100)];

        apply_retention(&config, &mut bucket, 101);
        assert_eq!(bucket[0].rewrite_count, 0);
        assert!(bucket[0].retention_record.drop_fingerprints.is_empty());

        apply_retention(&config, &mut bucket, 102);
        assert_eq!(bucket[0].rewrite_count, 1);
        assert_eq!(
            bucket[0].retention_record.drop_fingerprints,
            vec![Fingerprint::of("x")]
        );
    }

    #[test]
    fn test_dry_run_does_not_mutate() {
        let mut bucket = vec![
            block_aged("short-expired", 6 * 30 + 1),
            block_aged("ancient", 3 * 12 * 30 + 1),
        ];
        let before = bucket.clone();

        let result = BucketRetentionDriver::default()
            .with_dry_run(true)
            .apply(&config(), &mut bucket, NOW);

        assert_eq!(bucket, before);
        assert!(result.dry_run);
        assert_eq!(result.blocks_rewritten, 1);
        assert_eq!(result.blocks_deleted, 1);
    }
}
