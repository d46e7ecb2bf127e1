//! Duration estimation: override lookup and the diff-to-minutes ratio.

use serde::{Deserialize, Serialize};

/// An explicit duration for a commit, keyed by identifier prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Prefix of the commit identifier this rule applies to.
    pub prefix: String,
    /// The forced duration in minutes.
    pub minutes: f64,
}

/// Ordered override rules. Lookup returns the first rule whose prefix
/// matches, so earlier rules shadow later ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overrides(Vec<OverrideRule>);

impl Overrides {
    pub fn new(rules: Vec<OverrideRule>) -> Self {
        Self(rules)
    }

    /// The forced duration for `id`, if any rule's prefix matches it.
    pub fn lookup(&self, id: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|rule| id.starts_with(&rule.prefix))
            .map(|rule| rule.minutes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Running sums of known durations and diff sizes, collected during the
/// sweep and consumed by the repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EstimateTotals {
    known_minutes: f64,
    known_diff: f64,
}

impl EstimateTotals {
    /// Folds in a commit whose duration became known during the sweep.
    /// Only called for commits that carry a diff size.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn record(&mut self, minutes: f64, diff_size: u64) {
        self.known_minutes += minutes;
        self.known_diff += diff_size as f64;
    }

    /// Minutes of work per unit of diff, across everything recorded so
    /// far. None when no known-duration commits exist or their diff
    /// sizes sum to zero; that is a degenerate condition, not an error.
    pub fn minutes_per_diff(&self) -> Option<f64> {
        if self.known_minutes > 0.0 && self.known_diff > 0.0 {
            Some(self.known_minutes / self.known_diff)
        } else {
            None
        }
    }

    /// Estimated duration for a block-leading commit. Falls back to the
    /// accumulated `addition` alone when the ratio is undefined.
    #[allow(clippy::cast_precision_loss)]
    pub fn estimate(&self, diff_size: Option<u64>, factor: f64, addition: f64) -> f64 {
        match self.minutes_per_diff() {
            Some(rate) => diff_size.unwrap_or(0) as f64 * rate * factor + addition,
            None => addition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, f64)]) -> Overrides {
        Overrides::new(
            pairs
                .iter()
                .map(|&(prefix, minutes)| OverrideRule {
                    prefix: prefix.into(),
                    minutes,
                })
                .collect(),
        )
    }

    #[test]
    fn lookup_matches_on_prefix() {
        let overrides = rules(&[("a1b2", 90.0)]);
        assert_eq!(overrides.lookup("a1b2c3d4"), Some(90.0));
        assert_eq!(overrides.lookup("a1b9"), None);
    }

    #[test]
    fn lookup_prefers_earlier_rules() {
        let overrides = rules(&[("a1", 30.0), ("a1b2", 90.0)]);
        assert_eq!(overrides.lookup("a1b2c3"), Some(30.0));
    }

    #[test]
    fn estimate_scales_diff_by_the_known_ratio() {
        let mut totals = EstimateTotals::default();
        totals.record(30.0, 60);
        // 0.5 minutes per diff unit
        assert_eq!(totals.estimate(Some(40), 1.0, 0.0), 20.0);
        assert_eq!(totals.estimate(Some(40), 0.5, 0.0), 10.0);
        assert_eq!(totals.estimate(Some(40), 1.0, 5.0), 25.0);
    }

    #[test]
    fn estimate_falls_back_to_addition_when_ratio_is_undefined() {
        let totals = EstimateTotals::default();
        assert!(totals.minutes_per_diff().is_none());
        assert_eq!(totals.estimate(Some(500), 1.0, 0.0), 0.0);
        assert_eq!(totals.estimate(Some(500), 1.0, 12.0), 12.0);

        let mut zero_diff = EstimateTotals::default();
        zero_diff.record(45.0, 0);
        assert!(zero_diff.minutes_per_diff().is_none());
        assert_eq!(zero_diff.estimate(None, 1.0, 3.0), 3.0);
    }
}
