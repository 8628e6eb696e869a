//! Streaming summary statistics.

use serde_json::json;

/// A streaming accumulator for count, mean, variance (via Welford's
/// algorithm), minimum, maximum, and sum.
///
/// Supports constant shifts of the location statistics without replaying the
/// data, which the aggregator uses to re-anchor energy profiles after the
/// fact.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStatistics {
    n: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
    sum: f64,
}

impl Default for SummaryStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryStatistics {
    pub fn new() -> Self {
        Self {
            n: 0,
            mean: 0.0,
            m2: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }

    /// Adds one observation.
    pub fn update(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
        self.sum += x;
        if x < self.min {
            self.min = x;
        }
        if x > self.max {
            self.max = x;
        }
    }

    /// Shifts mean and extremes by a constant without replaying the data.
    /// The variance is invariant under constant shifts.
    pub fn shift(&mut self, delta: f64) {
        if self.n == 0 {
            return;
        }
        self.mean += delta;
        self.min += delta;
        self.max += delta;
        self.sum += delta * self.n as f64;
    }

    /// Element-wise update of a vector of accumulators with a vector of
    /// observations of the same length.
    pub fn update_multiple(stats: &mut [SummaryStatistics], values: &[f64]) {
        assert_eq!(
            stats.len(),
            values.len(),
            "element-wise update requires equal-length vectors"
        );
        for (stat, &value) in stats.iter_mut().zip(values) {
            stat.update(value);
        }
    }

    pub fn num(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.mean
        }
    }

    pub fn var(&self) -> f64 {
        if self.n < 2 {
            0.0
        } else {
            self.m2 / (self.n - 1) as f64
        }
    }

    pub fn sd(&self) -> f64 {
        self.var().sqrt()
    }

    pub fn min(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.min
        }
    }

    pub fn max(&self) -> f64 {
        if self.n == 0 {
            f64::NAN
        } else {
            self.max
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// JSON object with the exported fields; non-finite values serialize as
    /// null.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "min": self.min(),
            "max": self.max(),
            "mean": self.mean(),
            "sd": self.sd(),
            "n": self.n,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_moments_match_two_pass_reference() {
        // deterministic pseudo-random data via a simple LCG
        let mut state: u64 = 88172645463325252;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % 100_000) as f64 / 1000.0 - 50.0
        };
        let data: Vec<f64> = (0..100_000).map(|_| next()).collect();

        let mut stats = SummaryStatistics::new();
        for &x in &data {
            stats.update(x);
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let var = data.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / (n - 1.0);

        assert!((stats.mean() - mean).abs() < 1e-9);
        assert!((stats.var() - var).abs() / var < 1e-9);
        assert_eq!(stats.num(), data.len() as u64);
    }

    #[test]
    fn shift_moves_location_statistics_but_not_variance() {
        let mut stats = SummaryStatistics::new();
        for x in [1.0, 2.0, 3.0] {
            stats.update(x);
        }
        let var_before = stats.var();
        stats.shift(10.0);
        assert!((stats.mean() - 12.0).abs() < 1e-12);
        assert!((stats.min() - 11.0).abs() < 1e-12);
        assert!((stats.max() - 13.0).abs() < 1e-12);
        assert!((stats.sum() - 36.0).abs() < 1e-12);
        assert_eq!(stats.var(), var_before);
    }

    #[test]
    fn shift_of_empty_accumulator_is_a_no_op() {
        let mut stats = SummaryStatistics::new();
        stats.shift(5.0);
        assert_eq!(stats.num(), 0);
        assert!(stats.mean().is_nan());
    }

    #[test]
    fn update_multiple_is_element_wise() {
        let mut stats = vec![SummaryStatistics::new(); 3];
        SummaryStatistics::update_multiple(&mut stats, &[1.0, 2.0, 3.0]);
        SummaryStatistics::update_multiple(&mut stats, &[3.0, 2.0, 1.0]);
        assert!((stats[0].mean() - 2.0).abs() < 1e-12);
        assert!((stats[1].mean() - 2.0).abs() < 1e-12);
        assert_eq!(stats[2].num(), 2);
        assert!((stats[2].max() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn json_export_uses_null_for_empty_accumulators() {
        let stats = SummaryStatistics::new();
        let value = stats.to_json();
        assert!(value["mean"].is_null());
        assert_eq!(value["n"], 0);
    }
}
