//! Aggregation of raw samples into latency and throughput results
//!
//! Everything here is pure arithmetic over already-collected samples so the
//! rounding and edge-case rules can be tested without a network.

use crate::{
    error::{AppError, Result},
    models::metrics::{LatencyResult, ThroughputResult},
};
use std::time::Duration;

/// Shortest elapsed time a throughput round is credited with
const MIN_ROUND_TIME: Duration = Duration::from_micros(1);

/// Ordered measurements from one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    values: Vec<f64>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { values: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Arithmetic mean
    pub fn mean(&self) -> Option<f64> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// max - min
    pub fn spread(&self) -> Option<f64> {
        Some(self.max()? - self.min()?)
    }
}

impl From<Vec<f64>> for SampleSet {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl FromIterator<f64> for SampleSet {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}

/// Round to the nearest integer, halves going up
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to the nearest whole millisecond
pub fn round_ms(value: f64) -> u64 {
    round_half_up(value.max(0.0)) as u64
}

/// Round to two decimal places
pub fn round_cents(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}

/// Effective rate in megabits per second for `bytes` moved in `elapsed`
pub fn mbps(bytes: usize, elapsed: Duration) -> f64 {
    let seconds = elapsed.max(MIN_ROUND_TIME).as_secs_f64();
    (bytes as f64 * 8.0) / seconds / 1_000_000.0
}

/// Slowest round as a percentage of the average, clamped to 0..=100.
/// A zero average (every round failed) yields 0.
pub fn stability_ratio(rates: &SampleSet) -> u8 {
    let (Some(avg), Some(min)) = (rates.mean(), rates.min()) else {
        return 0;
    };

    if avg <= 0.0 {
        return 0;
    }

    round_half_up(min / avg * 100.0).clamp(0.0, 100.0) as u8
}

/// Average and jitter of a latency sample set
pub fn summarize_latency(samples: &SampleSet, failures: usize) -> Result<LatencyResult> {
    let (Some(average), Some(jitter)) = (samples.mean(), samples.spread()) else {
        return Err(AppError::test_execution("No latency samples were recorded"));
    };

    Ok(LatencyResult {
        average_ms: round_ms(average),
        jitter_ms: round_ms(jitter),
        samples: samples.len(),
        failures,
    })
}

/// Average rate, plus the stability ratio when `with_stability` is set
pub fn summarize_throughput(rates: &SampleSet, failures: usize, with_stability: bool) -> Result<ThroughputResult> {
    let Some(average) = rates.mean() else {
        return Err(AppError::test_execution("No throughput rounds were recorded"));
    };

    Ok(ThroughputResult {
        average_mbps: round_cents(average),
        stability: with_stability.then(|| stability_ratio(rates)),
        rounds: rates.len(),
        failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sample_set_basics() {
        let set: SampleSet = vec![3.0, 1.0, 2.0].into();
        assert_eq!(set.len(), 3);
        assert_eq!(set.min(), Some(1.0));
        assert_eq!(set.max(), Some(3.0));
        assert_eq!(set.mean(), Some(2.0));
        assert_eq!(set.spread(), Some(2.0));

        let empty = SampleSet::new();
        assert!(empty.is_empty());
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.spread(), None);
    }

    #[test]
    fn test_rounding_helpers() {
        assert_eq!(round_ms(92.5), 93);
        assert_eq!(round_ms(92.49), 92);
        assert_eq!(round_ms(-3.0), 0);
        assert_eq!(round_cents(6.466_666), 6.47);
        assert_eq!(round_cents(6.125), 6.13);
        assert_eq!(round_cents(0.0), 0.0);
    }

    #[test]
    fn test_latency_scenario_with_penalty_sample() {
        let samples: SampleSet = vec![50.0, 55.0, 300.0, 52.0, 51.0, 50.0].into();
        let result = summarize_latency(&samples, 1).unwrap();

        assert_eq!(result.average_ms, 93);
        assert_eq!(result.jitter_ms, 250);
        assert_eq!(result.samples, 6);
        assert_eq!(result.failures, 1);
    }

    #[test]
    fn test_latency_empty_is_error() {
        let error = summarize_latency(&SampleSet::new(), 0).unwrap_err();
        assert_eq!(error.category(), "TEST");
    }

    #[test]
    fn test_single_zero_round_craters_stability() {
        let rates: SampleSet = vec![8.0, 7.5, 0.0, 7.8, 7.6, 7.9].into();
        let result = summarize_throughput(&rates, 1, true).unwrap();

        assert_eq!(result.average_mbps, 6.47);
        assert_eq!(result.stability, Some(0));
        assert_eq!(result.display_average(), "6.47");
    }

    #[test]
    fn test_all_zero_rates_give_zero_stability() {
        let rates: SampleSet = vec![0.0; 6].into();
        let result = summarize_throughput(&rates, 6, true).unwrap();

        assert_eq!(result.average_mbps, 0.0);
        assert_eq!(result.stability, Some(0));
    }

    #[test]
    fn test_uniform_rates_are_fully_stable() {
        let rates: SampleSet = vec![5.0; 4].into();
        assert_eq!(stability_ratio(&rates), 100);
    }

    #[test]
    fn test_single_round_has_no_stability() {
        let rates: SampleSet = vec![7.123].into();
        let result = summarize_throughput(&rates, 0, false).unwrap();

        assert_eq!(result.average_mbps, 7.12);
        assert_eq!(result.stability, None);
        assert_eq!(result.rounds, 1);
    }

    #[test]
    fn test_mbps_conversion() {
        // 512 KiB in one second
        let rate = mbps(512 * 1024, Duration::from_secs(1));
        assert!((rate - 4.194_304).abs() < 1e-9);

        // 1 MB in half a second
        assert!((mbps(1_000_000, Duration::from_millis(500)) - 16.0).abs() < 1e-9);

        assert!(mbps(1024, Duration::ZERO).is_finite());
    }

    proptest! {
        #[test]
        fn prop_jitter_non_negative_and_average_bounded(values in prop::collection::vec(0.0f64..5_000.0, 1..32)) {
            let set = SampleSet::from(values);
            let result = summarize_latency(&set, 0).unwrap();
            let min = set.min().unwrap();
            let max = set.max().unwrap();
            let mean = set.mean().unwrap();

            prop_assert!(set.spread().unwrap() >= 0.0);
            prop_assert!(mean >= min - 1e-9 && mean <= max + 1e-9);
            prop_assert!(result.average_ms >= round_ms(min) && result.average_ms <= round_ms(max));
            prop_assert!(result.jitter_ms <= round_ms(max));
        }

        #[test]
        fn prop_stability_in_range(values in prop::collection::vec(0.0f64..1_000.0, 1..16)) {
            let set = SampleSet::from(values);
            prop_assert!(stability_ratio(&set) <= 100);
        }

        #[test]
        fn prop_average_rounded_to_cents(values in prop::collection::vec(0.0f64..1_000.0, 1..16)) {
            let set = SampleSet::from(values);
            let result = summarize_throughput(&set, 0, true).unwrap();
            let cents = result.average_mbps * 100.0;
            prop_assert!((cents - cents.round()).abs() < 1e-6);
        }
    }
}
