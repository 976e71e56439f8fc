//! Tiered block retention.
//!
//! Decides, for each immutable block of a time-series bucket, whether the
//! block's retention bookkeeping must change as time passes and retention tiers
//! are added, removed, or modified. A base period applies by default; override
//! tiers either shorten retention for some data (recorded as dropped once they
//! expire) or extend it (recorded as the kept set once the base period lapses).
//! Blocks are marked deleted once nothing justifies keeping them.
//!
//! ## Architecture
//!
//! - `config`: Tier and retention configuration with serde support
//! - `policy`: Period range, expiry, and keep/drop set construction
//! - `fingerprint`: Stable fingerprints for change detection
//! - `decision`: Per-block delete/rewrite decision and record updates
//! - `driver`: Bucket pass orchestrating the above
//! - `matcher`: Series matching used by the downstream rewrite step
//!
//! ## Usage
//!
//! ```
//! use retention::{Block, RetentionConfig, Tier, apply_retention};
//! use std::time::Duration;
//!
//! const DAY: u64 = 24 * 3600;
//!
//! let config = RetentionConfig::new(
//!     Duration::from_secs(390 * DAY),
//!     vec![
//!         Tier::new(Duration::from_secs(180 * DAY), "service=h1"),
//!         Tier::new(Duration::from_secs(720 * DAY), "namespace=b1"),
//!     ],
//! );
//!
//! let now = 1_700_000_000;
//! let mut bucket = vec![Block::new("01HBLOCK", now - 200 * DAY as i64, now - 181 * DAY as i64)];
//!
//! apply_retention(&config, &mut bucket, now);
//! assert_eq!(bucket[0].rewrite_count, 1);
//! assert_eq!(bucket[0].retention_record.drop_fingerprints.len(), 1);
//! ```

pub mod block;
pub mod config;
pub mod decision;
pub mod driver;
pub mod fingerprint;
pub mod matcher;
pub mod metrics;
pub mod policy;

// Re-export commonly used types
pub use block::{Block, Bucket, RetentionRecord};
pub use config::{RetentionConfig, RetentionConfigError, Tier};
pub use decision::{RetentionDecision, apply_record, evaluate};
pub use driver::{BlockOutcome, BucketRetentionDriver, BucketRetentionResult, apply_retention};
pub use fingerprint::{Fingerprint, same_as_recorded};
pub use matcher::{SubstringMatcher, TierMatcher, retained_series};
pub use metrics::RetentionMetrics;
pub use policy::{build_drop_set, build_keep_set, has_expired, period_range};
