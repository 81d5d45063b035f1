//! Weighted streaming statistics.
//!
//! Every `add` takes a value and a repetition count, so a row fed with a
//! distinct-count weight of `w` contributes exactly as `w` identical rows
//! would.
//!
//! - [`SummaryStatistics`] keeps O(1) state: count, extremes, sums and the
//!   second central moment, and merges exactly across partitions.
//! - [`DescriptiveStatistics`] retains every (value, weight) pair to answer
//!   percentile, skewness and kurtosis queries.
//! - [`AverageBuilder`] is a weighted running mean.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::float_repr;

/// Variances below this are treated as zero by the shape estimators.
const MIN_VARIANCE: f64 = 1e-19;

/// Constant-memory summary of a stream of weighted values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    n: u64,
    #[serde(with = "float_repr::option")]
    min: Option<f64>,
    #[serde(with = "float_repr::option")]
    max: Option<f64>,
    #[serde(with = "float_repr")]
    sum: f64,
    #[serde(with = "float_repr")]
    sum_of_squares: f64,
    #[serde(with = "float_repr")]
    sum_of_logs: f64,
    #[serde(with = "float_repr")]
    mean: f64,
    #[serde(with = "float_repr")]
    second_moment: f64,
}

impl SummaryStatistics {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a summary from the measures a finished result exposes.
    ///
    /// The sum of logarithms is recovered from the geometric mean, which is
    /// exact whenever the geometric mean is finite and positive.
    pub fn from_parts(
        n: u64,
        min: f64,
        max: f64,
        sum: f64,
        sum_of_squares: f64,
        second_moment: f64,
        geometric_mean: f64,
    ) -> Self {
        if n == 0 {
            return Self::default();
        }
        Self {
            n,
            min: Some(min),
            max: Some(max),
            sum,
            sum_of_squares,
            sum_of_logs: geometric_mean.ln() * n as f64,
            mean: sum / n as f64,
            second_moment,
        }
    }

    /// Adds `weight` occurrences of `value`.
    pub fn add(&mut self, value: f64, weight: u64) {
        if weight == 0 {
            return;
        }
        let w = weight as f64;
        let n = self.n + weight;
        let delta = value - self.mean;
        self.mean += delta * w / n as f64;
        self.second_moment += w * delta * (value - self.mean);
        self.n = n;

        self.sum += value * w;
        self.sum_of_squares += value * value * w;
        self.sum_of_logs += value.ln() * w;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    /// Combines another summary into this one (pairwise update).
    pub fn merge(&mut self, other: &SummaryStatistics) {
        if other.n == 0 {
            return;
        }
        if self.n == 0 {
            *self = other.clone();
            return;
        }
        let (na, nb) = (self.n as f64, other.n as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;

        self.mean += delta * nb / n;
        self.second_moment += other.second_moment + delta * delta * na * nb / n;
        self.n += other.n;
        self.sum += other.sum;
        self.sum_of_squares += other.sum_of_squares;
        self.sum_of_logs += other.sum_of_logs;
        self.min = merge_extreme(self.min, other.min, f64::min);
        self.max = merge_extreme(self.max, other.max, f64::max);
    }

    /// Orders summaries canonically so that folding them yields the same
    /// floating point result regardless of input order.
    pub fn canonical_cmp(&self, other: &SummaryStatistics) -> Ordering {
        self.n
            .cmp(&other.n)
            .then(self.mean.total_cmp(&other.mean))
            .then(self.sum.total_cmp(&other.sum))
            .then(self.second_moment.total_cmp(&other.second_moment))
            .then(self.sum_of_squares.total_cmp(&other.sum_of_squares))
    }

    /// Number of values (sum of weights).
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Smallest value.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Largest value.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Sum of values.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Sum of squared values.
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Arithmetic mean.
    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// Sum of squared deviations from the mean.
    pub fn second_moment(&self) -> Option<f64> {
        (self.n > 0).then_some(self.second_moment)
    }

    /// Geometric mean; NaN if any value is negative.
    pub fn geometric_mean(&self) -> Option<f64> {
        (self.n > 0).then(|| (self.sum_of_logs / self.n as f64).exp())
    }

    /// Sample variance; 0 for a single value.
    pub fn variance(&self) -> Option<f64> {
        match self.n {
            0 => None,
            1 => Some(0.0),
            n => Some(self.second_moment / (n - 1) as f64),
        }
    }

    /// Sample standard deviation.
    pub fn standard_deviation(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }
}

fn merge_extreme(a: Option<f64>, b: Option<f64>, pick: fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}

/// Exact order statistics over retained (value, weight) pairs.
///
/// Memory grows with the number of distinct rows fed in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStatistics {
    values: Vec<(f64, u64)>,
    n: u64,
}

impl DescriptiveStatistics {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `weight` occurrences of `value`.
    pub fn add(&mut self, value: f64, weight: u64) {
        if weight > 0 {
            self.values.push((value, weight));
            self.n += weight;
        }
    }

    /// Appends every value of another accumulator.
    pub fn merge(&mut self, other: &DescriptiveStatistics) {
        self.values.extend_from_slice(&other.values);
        self.n += other.n;
    }

    /// Number of values (sum of weights).
    pub fn n(&self) -> u64 {
        self.n
    }

    fn sorted(&self) -> Vec<(f64, u64)> {
        let mut sorted = self.values.clone();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        sorted
    }

    /// Returns the `p`-th percentile (`0 < p <= 100`).
    ///
    /// Uses the `(n + 1) * p` position estimator with linear interpolation
    /// between neighbours, clamped to the extremes.
    pub fn percentile(&self, p: f64) -> Option<f64> {
        if self.n == 0 || !(p > 0.0 && p <= 100.0) {
            return None;
        }
        let sorted = self.sorted();
        let n = self.n as f64;
        let position = p / 100.0 * (n + 1.0);
        if position < 1.0 {
            return nth(&sorted, 1);
        }
        if position >= n {
            return nth(&sorted, self.n);
        }
        let lower = position.floor();
        let fraction = position - lower;
        let lower = lower as u64;
        let low = nth(&sorted, lower)?;
        let high = nth(&sorted, lower + 1)?;
        Some(low + fraction * (high - low))
    }

    /// Median (50th percentile).
    pub fn median(&self) -> Option<f64> {
        self.percentile(50.0)
    }

    fn central_moments(&self) -> (f64, f64, f64, f64) {
        let n = self.n as f64;
        let mean = self.values.iter().map(|(v, w)| v * *w as f64).sum::<f64>() / n;
        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for (value, weight) in &self.values {
            let w = *weight as f64;
            let d = value - mean;
            let d2 = d * d;
            m2 += w * d2;
            m3 += w * d2 * d;
            m4 += w * d2 * d2;
        }
        (n, m2, m3, m4)
    }

    /// Bias-corrected sample skewness; requires at least three values.
    pub fn skewness(&self) -> Option<f64> {
        if self.n < 3 {
            return None;
        }
        let (n, m2, m3, _) = self.central_moments();
        let variance = m2 / (n - 1.0);
        if variance < MIN_VARIANCE {
            return Some(0.0);
        }
        let standardized = m3 / variance.powf(1.5);
        Some(n / ((n - 1.0) * (n - 2.0)) * standardized)
    }

    /// Bias-corrected sample excess kurtosis; requires at least four values.
    pub fn kurtosis(&self) -> Option<f64> {
        if self.n < 4 {
            return None;
        }
        let (n, m2, _, m4) = self.central_moments();
        let variance = m2 / (n - 1.0);
        if variance < MIN_VARIANCE {
            return Some(0.0);
        }
        let prefix = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0));
        let term = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
        Some(prefix * (m4 / (variance * variance)) - term)
    }
}

/// Returns the `k`-th (1-based) value of the expanded sorted sequence.
fn nth(sorted: &[(f64, u64)], k: u64) -> Option<f64> {
    let mut seen = 0;
    for (value, weight) in sorted {
        seen += weight;
        if seen >= k {
            return Some(*value);
        }
    }
    None
}

/// Weighted running mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AverageBuilder {
    #[serde(with = "float_repr")]
    sum: f64,
    count: u64,
}

impl AverageBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from a known average and count.
    pub fn from_average(average: f64, count: u64) -> Self {
        Self {
            sum: average * count as f64,
            count,
        }
    }

    /// Adds `weight` occurrences of `value`.
    pub fn add(&mut self, value: f64, weight: u64) {
        self.sum += value * weight as f64;
        self.count += weight;
    }

    /// Combines another builder into this one.
    pub fn merge(&mut self, other: &AverageBuilder) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Orders builders canonically, see [`SummaryStatistics::canonical_cmp`].
    pub fn canonical_cmp(&self, other: &AverageBuilder) -> Ordering {
        self.count
            .cmp(&other.count)
            .then(self.sum.total_cmp(&other.sum))
    }

    /// Number of values (sum of weights).
    pub fn count(&self) -> u64 {
        self.count
    }

    /// The average, absent when nothing was added.
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * (1.0 + a.abs().max(b.abs()))
    }

    fn summary_of(values: &[f64]) -> SummaryStatistics {
        let mut s = SummaryStatistics::new();
        for v in values {
            s.add(*v, 1);
        }
        s
    }

    #[test]
    fn test_summary_basic_measures() {
        let s = summary_of(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(s.n(), 8);
        assert_eq!(s.min(), Some(2.0));
        assert_eq!(s.max(), Some(9.0));
        assert_eq!(s.sum(), 40.0);
        assert!(close(s.mean().unwrap(), 5.0));
        assert!(close(s.second_moment().unwrap(), 32.0));
        assert!(close(s.variance().unwrap(), 32.0 / 7.0));
        assert!(close(s.sum_of_squares(), 232.0));
    }

    #[test]
    fn test_weighted_add_matches_repetition() {
        let mut weighted = SummaryStatistics::new();
        weighted.add(3.0, 4);
        weighted.add(1.0, 2);

        let repeated = summary_of(&[3.0, 3.0, 3.0, 3.0, 1.0, 1.0]);
        assert_eq!(weighted.n(), repeated.n());
        assert!(close(weighted.mean().unwrap(), repeated.mean().unwrap()));
        assert!(close(
            weighted.second_moment().unwrap(),
            repeated.second_moment().unwrap()
        ));
        assert!(close(
            weighted.geometric_mean().unwrap(),
            repeated.geometric_mean().unwrap()
        ));
    }

    #[test]
    fn test_single_value_and_empty() {
        let empty = SummaryStatistics::new();
        assert_eq!(empty.mean(), None);
        assert_eq!(empty.variance(), None);
        assert_eq!(empty.geometric_mean(), None);

        let single = summary_of(&[42.0]);
        assert_eq!(single.variance(), Some(0.0));
        assert_eq!(single.standard_deviation(), Some(0.0));
    }

    #[test]
    fn test_merge_equals_single_pass() {
        let all = summary_of(&[1.0, 2.0, 3.0, 10.0, 20.0, 30.0]);
        let mut left = summary_of(&[1.0, 2.0, 3.0]);
        let right = summary_of(&[10.0, 20.0, 30.0]);
        left.merge(&right);

        assert_eq!(left.n(), all.n());
        assert_eq!(left.min(), Some(1.0));
        assert_eq!(left.max(), Some(30.0));
        assert!(close(left.mean().unwrap(), all.mean().unwrap()));
        assert!(close(left.second_moment().unwrap(), all.second_moment().unwrap()));
        assert!(close(left.geometric_mean().unwrap(), all.geometric_mean().unwrap()));
    }

    #[test]
    fn test_from_parts_roundtrip() {
        let s = summary_of(&[1.0, 2.0, 4.0]);
        let rebuilt = SummaryStatistics::from_parts(
            s.n(),
            s.min().unwrap(),
            s.max().unwrap(),
            s.sum(),
            s.sum_of_squares(),
            s.second_moment().unwrap(),
            s.geometric_mean().unwrap(),
        );
        assert!(close(rebuilt.geometric_mean().unwrap(), 2.0));
        assert!(close(rebuilt.variance().unwrap(), s.variance().unwrap()));
    }

    #[test]
    fn test_summary_with_undefined_logs_survives_json() {
        let mut s = summary_of(&[-1.0, 4.0]);
        s.add(f64::INFINITY, 1);
        let json = serde_json::to_string(&s).unwrap();
        let back: SummaryStatistics = serde_json::from_str(&json).unwrap();
        assert!(back.geometric_mean().unwrap().is_nan());
        assert_eq!(back.n(), 3);
        assert_eq!(back.min(), Some(-1.0));
        assert_eq!(back.max(), Some(f64::INFINITY));
        assert_eq!(back.sum(), f64::INFINITY);
    }

    #[test]
    fn test_percentiles() {
        let mut d = DescriptiveStatistics::new();
        for v in [1.0, 2.0, 3.0, 4.0] {
            d.add(v, 1);
        }
        assert!(close(d.median().unwrap(), 2.5));
        assert!(close(d.percentile(25.0).unwrap(), 1.25));
        assert!(close(d.percentile(75.0).unwrap(), 3.75));
        assert_eq!(d.percentile(1.0), Some(1.0));
        assert_eq!(d.percentile(100.0), Some(4.0));
        assert_eq!(d.percentile(0.0), None);
    }

    #[test]
    fn test_weighted_percentiles() {
        let mut weighted = DescriptiveStatistics::new();
        weighted.add(5.0, 3);
        weighted.add(1.0, 1);

        // expanded: 1, 5, 5, 5
        assert_eq!(weighted.n(), 4);
        assert!(close(weighted.median().unwrap(), 5.0));
        assert!(close(weighted.percentile(25.0).unwrap(), 2.0));
    }

    #[test]
    fn test_shape_statistics() {
        let mut d = DescriptiveStatistics::new();
        for v in [1.0, 2.0] {
            d.add(v, 1);
        }
        assert_eq!(d.skewness(), None);
        d.add(3.0, 1);
        assert!(close(d.skewness().unwrap(), 0.0));
        assert_eq!(d.kurtosis(), None);
        d.add(10.0, 1);
        assert!(d.skewness().unwrap() > 0.0);
        assert!(d.kurtosis().is_some());

        let mut flat = DescriptiveStatistics::new();
        flat.add(7.0, 5);
        assert_eq!(flat.skewness(), Some(0.0));
        assert_eq!(flat.kurtosis(), Some(0.0));
    }

    #[test]
    fn test_average_builder() {
        let mut avg = AverageBuilder::new();
        assert_eq!(avg.average(), None);
        avg.add(2.0, 3);
        avg.add(6.0, 1);
        assert_eq!(avg.count(), 4);
        assert!(close(avg.average().unwrap(), 3.0));

        let mut other = AverageBuilder::from_average(10.0, 4);
        other.merge(&avg);
        assert!(close(other.average().unwrap(), 6.5));
    }
}
