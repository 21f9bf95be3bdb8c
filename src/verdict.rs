//! Three-tier stream readiness verdict
//!
//! Thresholds are data: a [`ThresholdTable`] holds the SAFE and RISKY tiers,
//! evaluated in that order with the first match winning. Anything that
//! matches neither tier is UNSAFE.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream readiness classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Safe,
    Risky,
    Unsafe,
}

impl Verdict {
    /// Status text shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Safe => "STREAM STABLE",
            Verdict::Risky => "POSSIBLE FRAME DROPS",
            Verdict::Unsafe => "STREAM NOT SAFE",
        }
    }

    /// Style class paired with the label
    pub fn style_tag(&self) -> &'static str {
        match self {
            Verdict::Safe => "safe",
            Verdict::Risky => "risky",
            Verdict::Unsafe => "bad",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Verdict::Safe => "🟢",
            Verdict::Risky => "🟡",
            Verdict::Unsafe => "🔴",
        }
    }

    /// Label with its status symbol
    pub fn headline(&self) -> String {
        format!("{} {}", self.symbol(), self.label())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Safe => "SAFE",
            Verdict::Risky => "RISKY",
            Verdict::Unsafe => "UNSAFE",
        })
    }
}

/// Bounds a measurement must satisfy to reach one tier. `None` skips a check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    /// Inclusive lower bound on upload throughput
    pub min_upload_mbps: f64,
    /// Inclusive lower bound on the stability percentage
    pub min_stability: Option<u8>,
    /// Exclusive upper bound on jitter
    pub max_jitter_ms: Option<u64>,
}

impl Tier {
    /// A stability bound is never met by a run that has no stability reading
    pub fn admits(&self, upload_mbps: f64, jitter_ms: u64, stability: Option<u8>) -> bool {
        if upload_mbps < self.min_upload_mbps {
            return false;
        }

        if let Some(min) = self.min_stability {
            match stability {
                Some(value) if value >= min => {}
                _ => return false,
            }
        }

        match self.max_jitter_ms {
            Some(max) => jitter_ms < max,
            None => true,
        }
    }
}

/// Ordered SAFE and RISKY tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub safe: Tier,
    pub risky: Tier,
}

impl ThresholdTable {
    /// Multi-round table: upload, stability and jitter all gate both tiers
    pub fn extended() -> Self {
        Self {
            safe: Tier { min_upload_mbps: 6.0, min_stability: Some(80), max_jitter_ms: Some(20) },
            risky: Tier { min_upload_mbps: 4.0, min_stability: Some(60), max_jitter_ms: Some(35) },
        }
    }

    /// Single-round table: no stability, and RISKY only looks at upload
    pub fn simple() -> Self {
        Self {
            safe: Tier { min_upload_mbps: 6.0, min_stability: None, max_jitter_ms: Some(20) },
            risky: Tier { min_upload_mbps: 4.0, min_stability: None, max_jitter_ms: None },
        }
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::extended()
    }
}

/// Classify one run. Pure and total over every input triple.
pub fn classify(upload_mbps: f64, jitter_ms: u64, stability: Option<u8>, table: &ThresholdTable) -> Verdict {
    if table.safe.admits(upload_mbps, jitter_ms, stability) {
        Verdict::Safe
    } else if table.risky.admits(upload_mbps, jitter_ms, stability) {
        Verdict::Risky
    } else {
        Verdict::Unsafe
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extended_safe() {
        let table = ThresholdTable::extended();
        assert_eq!(classify(6.5, 15, Some(85), &table), Verdict::Safe);
    }

    #[test]
    fn test_extended_low_stability_falls_through_both_tiers() {
        // High upload is not enough once stability misses the RISKY floor too
        let table = ThresholdTable::extended();
        assert_eq!(classify(7.0, 10, Some(50), &table), Verdict::Unsafe);
    }

    #[test]
    fn test_extended_risky() {
        let table = ThresholdTable::extended();
        assert_eq!(classify(7.0, 10, Some(70), &table), Verdict::Risky);
        assert_eq!(classify(4.0, 34, Some(60), &table), Verdict::Risky);
        assert_eq!(classify(6.0, 20, Some(80), &table), Verdict::Risky);
    }

    #[test]
    fn test_extended_boundaries() {
        let table = ThresholdTable::extended();
        assert_eq!(classify(6.0, 19, Some(80), &table), Verdict::Safe);
        assert_eq!(classify(5.99, 0, Some(100), &table), Verdict::Risky);
        assert_eq!(classify(3.99, 0, Some(100), &table), Verdict::Unsafe);
        assert_eq!(classify(4.0, 35, Some(100), &table), Verdict::Unsafe);
        assert_eq!(classify(10.0, 5, None, &table), Verdict::Unsafe);
    }

    #[test]
    fn test_simple_table() {
        let table = ThresholdTable::simple();
        assert_eq!(classify(6.0, 19, None, &table), Verdict::Safe);
        assert_eq!(classify(6.0, 20, None, &table), Verdict::Risky);
        assert_eq!(classify(4.0, 500, None, &table), Verdict::Risky);
        assert_eq!(classify(3.5, 1, None, &table), Verdict::Unsafe);
    }

    #[test]
    fn test_labels_and_tags() {
        assert_eq!(Verdict::Safe.label(), "STREAM STABLE");
        assert_eq!(Verdict::Risky.style_tag(), "risky");
        assert_eq!(Verdict::Unsafe.style_tag(), "bad");
        assert_eq!(Verdict::Unsafe.to_string(), "UNSAFE");
        assert!(Verdict::Safe.headline().ends_with("STREAM STABLE"));
        assert_eq!(serde_json::to_string(&Verdict::Risky).unwrap(), "\"RISKY\"");
    }

    proptest! {
        #[test]
        fn prop_safe_tier_takes_priority(upload in 0.0f64..20.0, jitter in 0u64..200, stability in 0u8..=100) {
            let table = ThresholdTable::extended();
            let verdict = classify(upload, jitter, Some(stability), &table);

            if table.safe.admits(upload, jitter, Some(stability)) {
                prop_assert_eq!(verdict, Verdict::Safe);
            } else if table.risky.admits(upload, jitter, Some(stability)) {
                prop_assert_eq!(verdict, Verdict::Risky);
            } else {
                prop_assert_eq!(verdict, Verdict::Unsafe);
            }
        }

        #[test]
        fn prop_more_upload_never_hurts(upload in 0.0f64..20.0, extra in 0.0f64..20.0, jitter in 0u64..200, stability in 0u8..=100) {
            let table = ThresholdTable::extended();
            let rank = |v: Verdict| match v { Verdict::Safe => 2, Verdict::Risky => 1, Verdict::Unsafe => 0 };
            let base = classify(upload, jitter, Some(stability), &table);
            let better = classify(upload + extra, jitter, Some(stability), &table);
            prop_assert!(rank(better) >= rank(base));
        }
    }
}
