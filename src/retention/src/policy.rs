//! Tier classification: period range, expiry, and the keep and drop sets.
//!
//! Every decision routes through [`has_expired`].

use std::time::Duration;

use crate::config::Tier;

/// Shortest and longest period among the base period and all tiers.
///
/// The base period is always part of the range, so a block younger than the
/// base period is never touched even when every tier is longer.
pub fn period_range(tiers: &[Tier], base_period: Duration) -> (Duration, Duration) {
    tiers
        .iter()
        .fold((base_period, base_period), |(min, max), tier| {
            (min.min(tier.period), max.max(tier.period))
        })
}

/// Whether `period` has elapsed since `latest_timestamp`, as of `now`.
///
/// `latest_timestamp + period <= now`. Sub-second periods round up to the next
/// whole second; a sum past `i64::MAX` is never expired.
pub fn has_expired(latest_timestamp: i64, now: i64, period: Duration) -> bool {
    let seconds = period
        .as_secs()
        .saturating_add(u64::from(period.subsec_nanos() > 0));
    i64::try_from(seconds)
        .ok()
        .and_then(|period| latest_timestamp.checked_add(period))
        .is_some_and(|expires_at| expires_at <= now)
}

/// Labels of the long tiers that still justify keeping the block once the base
/// period has lapsed, sorted lexicographically.
///
/// Empty while the base period has not lapsed: default retention still covers
/// the block and nothing needs recording.
pub fn build_keep_set<'a>(
    tiers: &'a [Tier],
    base_period: Duration,
    now: i64,
    max_timestamp: i64,
) -> Vec<&'a str> {
    if !has_expired(max_timestamp, now, base_period) {
        return Vec::new();
    }

    let mut keep: Vec<&str> = tiers
        .iter()
        .filter(|tier| tier.period > base_period && !has_expired(max_timestamp, now, tier.period))
        .map(|tier| tier.label.as_str())
        .collect();
    keep.sort_unstable();
    keep
}

/// Labels of the short tiers (period <= base) that have expired for the block,
/// in configuration order.
pub fn build_drop_set<'a>(
    tiers: &'a [Tier],
    base_period: Duration,
    now: i64,
    max_timestamp: i64,
) -> Vec<&'a str> {
    tiers
        .iter()
        .filter(|tier| tier.period <= base_period && has_expired(max_timestamp, now, tier.period))
        .map(|tier| tier.label.as_str())
        .collect()
}
