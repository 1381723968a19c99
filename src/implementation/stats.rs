// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module provides the running burden statistics: an online
//! mean/variance accumulator in Welford form, extended with exponential
//! aging, rescaling and unbiased pooling.

use crate::Norm;

/// A running mean/variance accumulator over a stream of burden samples, kept
/// in Welford form: the sample count, the running mean and the running sum
/// of squared deviations from the mean. The count is fractional because the
/// exponential-aging operations shrink it smoothly.
///
/// Invariants: `count >= 0`; `variance() == sum_sq / max(count - 1, 1)`;
/// both `mean()` and `variance()` are nonnegative as long as every sample
/// pushed was.
///
/// # Example
/// ```
/// # use perfgoblin::*;
/// let mut stat = BurdenStat::new();
/// stat.push(1.0);
/// stat.push(2.0);
/// stat.push(3.0);
/// assert_eq!(3.0, stat.count());
/// assert_eq!(2.0, stat.mean());
/// assert_eq!(1.0, stat.variance());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BurdenStat {
    /// The (possibly fractional, due to aging) number of samples.
    count: f64,
    /// The running mean of the samples.
    mean: f64,
    /// The running sum of squared deviations from the mean.
    sum_sq: f64,
}

impl BurdenStat {
    /// An accumulator that has seen no sample yet.
    pub fn new() -> Self {
        Default::default()
    }

    /// Rebuilds an accumulator from the summary a profile persists: a sample
    /// count, a mean and a standard deviation.
    pub fn from_summary(count: f64, mean: f64, std_dev: f64) -> Self {
        let sum_sq = std_dev * std_dev * (count - 1.0).max(1.0);
        BurdenStat { count, mean, sum_sq }
    }

    /// The number of samples this accumulator currently stands for.
    pub fn count(&self) -> f64 {
        self.count
    }

    /// Tells whether the accumulator has seen any sample at all.
    pub fn is_empty(&self) -> bool {
        self.count <= 0.0
    }

    /// The sample mean (zero when empty).
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The unbiased sample variance (zero until two samples are in).
    pub fn variance(&self) -> f64 {
        if self.count <= 0.0 {
            0.0
        } else {
            self.sum_sq / (self.count - 1.0).max(1.0)
        }
    }

    /// The sample standard deviation.
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// The `(mean, variance)` summary of this accumulator, ready to be
    /// turned into a burden by an economy.
    pub fn burden_norm(&self) -> Norm {
        Norm::new(self.mean(), self.variance())
    }

    /// Incorporates one sample (one Welford step).
    pub fn push(&mut self, sample: f64) {
        self.count += 1.0;
        let delta = sample - self.mean;
        self.mean += delta / self.count;
        self.sum_sq += delta * (sample - self.mean);
    }

    /// Ages the accumulator by `alpha` (in `(0, 1)`), then incorporates one
    /// sample. With a constant stream of pushes this turns the accumulator
    /// into an exponentially weighted one whose count converges to
    /// `1 / (1 - alpha)`.
    pub fn push_decay(&mut self, sample: f64, alpha: f64) {
        self.count *= alpha;
        self.sum_sq *= alpha;
        self.push(sample);
    }

    /// Ages the accumulator by `alpha` without incorporating any sample: the
    /// count shrinks towards one and the spread towards zero while the mean
    /// stays untouched.
    pub fn decay(&mut self, alpha: f64) {
        if self.is_empty() {
            return;
        }
        self.count = 1.0 + (self.count - 1.0) * alpha;
        self.sum_sq *= alpha;
    }

    /// Rescales every sample this accumulator stands for by `factor`: the
    /// mean scales linearly, the spread quadratically.
    pub fn scale(&mut self, factor: f64) {
        self.mean *= factor;
        self.sum_sq *= factor * factor;
    }

    /// Combines this accumulator with another independent one, yielding the
    /// accumulator of the concatenated sample streams (O'Neill's unbiased
    /// combination).
    pub fn pool(&self, other: &BurdenStat) -> BurdenStat {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let count = self.count + other.count;
        let mean = (self.count * self.mean + other.count * other.mean) / count;
        let delta = other.mean - self.mean;
        let sum_sq = self.sum_sq + other.sum_sq + delta * delta * self.count * other.count / count;
        BurdenStat { count, mean, sum_sq }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_burden_stat {
    use crate::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    fn naive_mean(samples: &[f64]) -> f64 {
        samples.iter().sum::<f64>() / samples.len() as f64
    }
    fn naive_variance(samples: &[f64]) -> f64 {
        let mean = naive_mean(samples);
        let sq = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>();
        sq / (samples.len() as f64 - 1.0).max(1.0)
    }
    fn collect(samples: &[f64]) -> BurdenStat {
        let mut stat = BurdenStat::new();
        for &x in samples {
            stat.push(x);
        }
        stat
    }

    #[test]
    fn by_default_it_is_empty() {
        let stat = BurdenStat::new();
        assert!(stat.is_empty());
        assert_eq!(0.0, stat.count());
        assert_eq!(0.0, stat.mean());
        assert_eq!(0.0, stat.variance());
    }

    // property 'stat round-trip': welford agrees with the naive formulas
    #[test]
    fn push_agrees_with_the_naive_formulas() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let n = rng.random_range(1..50);
            let samples: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..100.0)).collect();
            let stat = collect(&samples);
            assert!((stat.mean() - naive_mean(&samples)).abs() < 1e-9);
            assert!((stat.variance() - naive_variance(&samples)).abs() < 1e-6);
        }
    }

    // pooling two accumulators equals accumulating the concatenated stream
    #[test]
    fn pool_agrees_with_the_concatenated_stream() {
        let mut rng = SmallRng::seed_from_u64(43);
        for _ in 0..100 {
            let n = rng.random_range(1..30);
            let m = rng.random_range(1..30);
            let left: Vec<f64> = (0..n).map(|_| rng.random_range(0.0..50.0)).collect();
            let right: Vec<f64> = (0..m).map(|_| rng.random_range(0.0..50.0)).collect();
            let both: Vec<f64> = left.iter().chain(right.iter()).copied().collect();

            let pooled = collect(&left).pool(&collect(&right));
            let whole = collect(&both);
            assert!((pooled.count() - whole.count()).abs() < 1e-9);
            assert!((pooled.mean() - whole.mean()).abs() < 1e-9);
            assert!((pooled.variance() - whole.variance()).abs() < 1e-6);
        }
    }

    #[test]
    fn pooling_with_an_empty_accumulator_is_neutral() {
        let stat = collect(&[1.0, 2.0, 3.0]);
        assert_eq!(stat, stat.pool(&BurdenStat::new()));
        assert_eq!(stat, BurdenStat::new().pool(&stat));
    }

    // decay shrinks count towards 1 and sum_sq towards 0, mean untouched
    #[test]
    fn decay_is_monotone_and_preserves_the_mean() {
        let mut stat = collect(&[2.0, 4.0, 6.0, 8.0]);
        let mean = stat.mean();
        let mut prev_count = stat.count();
        let mut prev_var = stat.variance();
        for _ in 0..200 {
            stat.decay(0.9);
            assert!(stat.count() <= prev_count);
            assert!(stat.count() >= 1.0);
            assert!(stat.variance() <= prev_var + 1e-12);
            assert_eq!(mean, stat.mean());
            prev_count = stat.count();
            prev_var = stat.variance();
        }
        assert!((stat.count() - 1.0).abs() < 1e-6);
        assert!(stat.variance() < 1e-6);
    }

    #[test]
    fn decaying_an_empty_accumulator_is_a_no_op() {
        let mut stat = BurdenStat::new();
        stat.decay(0.5);
        assert!(stat.is_empty());
        assert_eq!(0.0, stat.count());
    }

    // under a constant stream, the decayed count converges to 1/(1 - alpha)
    #[test]
    fn push_decay_count_converges() {
        let alpha: f64 = 0.9;
        let mut stat = BurdenStat::new();
        for _ in 0..500 {
            stat.push_decay(5.0, alpha);
        }
        assert!((stat.count() - 1.0 / (1.0 - alpha)).abs() < 1e-6);
        assert!((stat.mean() - 5.0).abs() < 1e-9);
    }

    // an exponentially aged accumulator tracks a shifted distribution faster
    // than the plain one
    #[test]
    fn push_decay_forgets_the_past() {
        let mut aged = BurdenStat::new();
        let mut flat = BurdenStat::new();
        for _ in 0..100 {
            aged.push_decay(1.0, 0.9);
            flat.push(1.0);
        }
        for _ in 0..30 {
            aged.push_decay(10.0, 0.9);
            flat.push(10.0);
        }
        assert!(aged.mean() > flat.mean());
        assert!(aged.mean() > 9.0);
    }

    #[test]
    fn scale_acts_linearly_on_the_mean_and_quadratically_on_the_variance() {
        let mut stat = collect(&[1.0, 2.0, 3.0]);
        let mean = stat.mean();
        let var = stat.variance();
        stat.scale(3.0);
        assert!((stat.mean() - 3.0 * mean).abs() < 1e-9);
        assert!((stat.variance() - 9.0 * var).abs() < 1e-9);
        assert_eq!(3.0, stat.count());
    }

    #[test]
    fn from_summary_round_trips_through_the_accessors() {
        let stat = BurdenStat::from_summary(30.0, 2.5, 0.5);
        assert_eq!(30.0, stat.count());
        assert_eq!(2.5, stat.mean());
        assert!((stat.std_dev() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn burden_norm_summarizes_mean_and_variance() {
        let stat = collect(&[1.0, 3.0]);
        let norm = stat.burden_norm();
        assert_eq!(2.0, norm.mean);
        assert_eq!(2.0, norm.var);
    }
}
