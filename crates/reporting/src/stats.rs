//! Descriptive statistics over plain `f64` slices.
//!
//! Every function is total: an empty slice yields `0.0`, and a single value
//! has zero spread. The standard deviation is the population form (divide by
//! `n`), and percentiles take the `ceil(p * n)`-th order statistic.

use serde::{Deserialize, Serialize};

/// Summary of one series of values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of values
    pub count: usize,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub average: f64,
    /// Median
    pub median: f64,
    /// 95th percentile
    pub p95: f64,
    /// Population standard deviation
    pub std_dev: f64,
}

impl Summary {
    /// Summarize `values`. Empty input gives the all-zero summary.
    pub fn of(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }
        let sorted = sorted(values);
        let average = mean(values);
        Self {
            count: values.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            average,
            median: median_of_sorted(&sorted),
            p95: percentile_of_sorted(&sorted, 0.95),
            std_dev: std_dev_around(values, average),
        }
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation: `sqrt(sum((x - mean)^2) / n)`.
pub fn population_std_dev(values: &[f64]) -> f64 {
    std_dev_around(values, mean(values))
}

/// Median: middle value, or the mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> f64 {
    median_of_sorted(&sorted(values))
}

/// Percentile `p` in `[0, 1]`: the `ceil(p * n)`-th smallest value (1-indexed),
/// clamped to the valid range.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    percentile_of_sorted(&sorted(values), p)
}

fn std_dev_around(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let rank = (p.clamp(0.0, 1.0) * n as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(n - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
        assert_eq!(median(&[]), 0.0);
        assert_eq!(percentile(&[], 0.95), 0.0);
        assert_eq!(Summary::of(&[]), Summary::default());
    }

    #[test]
    fn test_single_value() {
        let s = Summary::of(&[42.0]);
        assert_eq!(s.count, 1);
        assert_eq!(s.min, 42.0);
        assert_eq!(s.max, 42.0);
        assert_eq!(s.median, 42.0);
        assert_eq!(s.p95, 42.0);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn test_three_values() {
        let s = Summary::of(&[100.0, 200.0, 300.0]);
        assert_eq!(s.average, 200.0);
        assert_eq!(s.min, 100.0);
        assert_eq!(s.max, 300.0);
        assert_eq!(s.median, 200.0);
        assert!((s.std_dev - 81.65).abs() < 0.01);
        // ceil(0.95 * 3) = 3 -> the largest value
        assert_eq!(s.p95, 300.0);
    }

    #[test]
    fn test_even_median_averages_middles() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_percentile_rank() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        // ceil(9.5) = 10th value
        assert_eq!(percentile(&values, 0.95), 10.0);
        // ceil(5.0) = 5th value
        assert_eq!(percentile(&values, 0.5), 5.0);
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 10.0);
    }

    #[test]
    fn test_order_invariance() {
        let a = [5.0, 1.0, 9.0, 3.0, 7.0, 2.0];
        let b = [2.0, 9.0, 7.0, 1.0, 5.0, 3.0];
        assert_eq!(median(&a), median(&b));
        assert_eq!(percentile(&a, 0.95), percentile(&b, 0.95));
    }

    #[test]
    fn test_constant_series_has_zero_spread() {
        assert_eq!(population_std_dev(&[7.0; 12]), 0.0);
    }

    #[test]
    fn test_population_not_sample_std_dev() {
        // population: sqrt(((1-2)^2 + (3-2)^2) / 2) = 1, sample would be sqrt(2)
        assert_eq!(population_std_dev(&[1.0, 3.0]), 1.0);
    }
}
