//! Series matching for the block rewrite step.
//!
//! The retention core only decides which tiers apply to a block's time range.
//! Whatever rewrites block content uses a [`TierMatcher`] to decide which
//! series a kept or dropped tier actually covers.

use std::collections::BTreeSet;

use crate::config::Tier;

/// Decides whether a tier selects a given series.
pub trait TierMatcher {
    fn matches(&self, series: &str) -> bool;
}

/// Basic matcher: a series is selected when the tier label contains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstringMatcher {
    selector: String,
}

impl SubstringMatcher {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl From<&Tier> for SubstringMatcher {
    fn from(tier: &Tier) -> Self {
        Self::new(tier.label.clone())
    }
}

impl TierMatcher for SubstringMatcher {
    fn matches(&self, series: &str) -> bool {
        !series.is_empty() && self.selector.contains(series)
    }
}

impl<F> TierMatcher for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, series: &str) -> bool {
        self(series)
    }
}

/// Series selected by at least one matcher, sorted and deduplicated.
pub fn retained_series<'a, M, I>(matchers: &[M], series: I) -> BTreeSet<&'a str>
where
    M: TierMatcher,
    I: IntoIterator<Item = &'a str>,
{
    series
        .into_iter()
        .filter(|s| matchers.iter().any(|m| m.matches(s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_substring_matcher() {
        let matcher = SubstringMatcher::new("namespace=b1");
        assert!(matcher.matches("namespace=b1"));
        assert!(matcher.matches("b1"));
        assert!(!matcher.matches("namespace=b2"));
        assert!(!matcher.matches(""));
    }

    #[test]
    fn test_matcher_from_tier() {
        let tier = Tier::new(Duration::from_secs(60), "name=ying");
        let matcher = SubstringMatcher::from(&tier);
        assert!(matcher.matches("name=ying"));
    }

    #[test]
    fn test_retained_series_with_kept_tiers() {
        let matchers = vec![
            SubstringMatcher::new("name=ying"),
            SubstringMatcher::new("namespace=b1"),
        ];
        let series = ["namespace=b1", "service=h1", "name=ying", "namespace=b1"];

        let kept = retained_series(&matchers, series);
        assert_eq!(
            kept.into_iter().collect::<Vec<_>>(),
            vec!["name=ying", "namespace=b1"]
        );
    }

    #[test]
    fn test_retained_series_without_matchers_is_empty() {
        let matchers: Vec<SubstringMatcher> = Vec::new();
        assert!(retained_series(&matchers, ["service=h1"]).is_empty());
    }

    #[test]
    fn test_closure_matcher() {
        let prefix = |series: &str| series.starts_with("service=");
        let kept = retained_series(&[prefix], ["service=h1", "name=ying"]);
        assert_eq!(kept.len(), 1);
        assert!(kept.contains("service=h1"));
    }
}
