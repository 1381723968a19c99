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

//! This module provides the implementation of the normal economy: burdens are
//! normally distributed quantities and the capacity carries a pessimism
//! margin expressed in standard deviations.

use crate::{Economy, Norm};

/// The standard-deviation margin a `NormalCapacity` uses when none is given
/// explicitly. Three standard deviations below the limit leaves roughly a
/// 0.1% chance of the real cost overshooting it.
pub const DEFAULT_PESSIMISM_SD: f64 = 3.0;

// ----------------------------------------------------------------------------
// --- NORMAL BURDEN ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// A burden in the normal economy: a normally distributed cost summarized by
/// its mean and variance. Sums of burdens treat the variables as independent,
/// hence both components add.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NormalBurden {
    /// The expected cost.
    pub mean: f64,
    /// The variance of the cost.
    pub var: f64,
}
impl NormalBurden {
    pub fn new(mean: f64, var: f64) -> Self {
        NormalBurden { mean, var }
    }
    /// A burden that is known exactly (zero variance).
    pub fn exact(mean: f64) -> Self {
        NormalBurden { mean, var: 0.0 }
    }
}

// ----------------------------------------------------------------------------
// --- NORMAL CAPACITY --------------------------------------------------------
// ----------------------------------------------------------------------------
/// A capacity in the normal economy: a hard `limit` together with a `sigma`
/// margin. A burden `(m, v)` is acceptable iff `m + sigma·sqrt(v) < limit`,
/// which the acceptability test evaluates in the square-root-free closed
/// form `m < limit && sigma²·v < (limit − m)²`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalCapacity {
    /// The hard limit the estimated cost must stay below.
    pub limit: f64,
    /// How many standard deviations of headroom to demand below the limit.
    pub sigma: f64,
}
impl NormalCapacity {
    pub fn new(limit: f64, sigma: f64) -> Self {
        NormalCapacity { limit, sigma }
    }
    /// A capacity with the default pessimism margin of
    /// [`DEFAULT_PESSIMISM_SD`] standard deviations.
    pub fn pessimistic(limit: f64) -> Self {
        NormalCapacity { limit, sigma: DEFAULT_PESSIMISM_SD }
    }
}

// ----------------------------------------------------------------------------
// --- NORMAL ECONOMY ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// The economy layered on top of the scalar one in which every burden is a
/// `(mean, variance)` pair. This is the economy the controller uses: it lets
/// the solver stay clear of selections whose *uncertainty* (not just whose
/// expected cost) puts them at risk of blowing the frame budget.
///
/// # Example
/// ```
/// # use perfgoblin::*;
/// let capacity = NormalCapacity::new(2.5, 2.0);
/// // 2.0 + 2.0 * sqrt(0.25) = 3.0 >= 2.5: too risky.
/// assert!(!NormalEconomy::acceptable(NormalBurden::new(2.0, 0.25), capacity));
/// // An exactly-known burden of 1.0 fits comfortably.
/// assert!(NormalEconomy::acceptable(NormalBurden::exact(1.0), capacity));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalEconomy;

impl Economy for NormalEconomy {
    type Burden = NormalBurden;
    type Capacity = NormalCapacity;

    fn zero() -> NormalBurden {
        NormalBurden::new(0.0, 0.0)
    }
    fn infinite() -> NormalBurden {
        NormalBurden::new(f64::INFINITY, f64::INFINITY)
    }
    fn is_possible(burden: NormalBurden) -> bool {
        burden.mean.is_finite() && burden.var.is_finite()
    }
    fn lesser(a: NormalBurden, b: NormalBurden) -> bool {
        a.mean < b.mean
    }
    fn add(a: NormalBurden, b: NormalBurden) -> NormalBurden {
        NormalBurden::new(a.mean + b.mean, a.var + b.var)
    }
    fn sub(a: NormalBurden, b: NormalBurden) -> NormalBurden {
        // independence: taking an estimate back out does not cancel its
        // uncertainty
        NormalBurden::new(a.mean - b.mean, a.var + b.var)
    }
    fn scale(burden: NormalBurden, factor: f64) -> NormalBurden {
        NormalBurden::new(burden.mean * factor, burden.var * factor * factor)
    }
    fn acceptable(burden: NormalBurden, capacity: NormalCapacity) -> bool {
        let headroom = capacity.limit - burden.mean;
        burden.mean < capacity.limit
            && capacity.sigma * capacity.sigma * burden.var < headroom * headroom
    }
    fn from_norm(norm: Norm) -> NormalBurden {
        NormalBurden::new(norm.mean, norm.var)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_normal_economy {
    use crate::*;

    #[test]
    fn addition_is_componentwise() {
        let sum = NormalEconomy::add(NormalBurden::new(1.0, 0.5), NormalBurden::new(2.0, 0.25));
        assert_eq!(NormalBurden::new(3.0, 0.75), sum);
    }

    #[test]
    fn subtraction_still_adds_variances() {
        let diff = NormalEconomy::sub(NormalBurden::new(3.0, 0.5), NormalBurden::new(1.0, 0.25));
        assert_eq!(NormalBurden::new(2.0, 0.75), diff);
    }

    #[test]
    fn scaling_squares_the_variance() {
        let scaled = NormalEconomy::scale(NormalBurden::new(2.0, 0.5), 3.0);
        assert_eq!(NormalBurden::new(6.0, 4.5), scaled);
    }

    #[test]
    fn lesser_orders_by_mean_only() {
        assert!(NormalEconomy::lesser(
            NormalBurden::new(1.0, 100.0),
            NormalBurden::new(2.0, 0.0)
        ));
        assert!(!NormalEconomy::lesser(
            NormalBurden::new(2.0, 0.0),
            NormalBurden::new(2.0, 100.0)
        ));
    }

    // the closed form must agree with `mean + sigma * sqrt(var) < limit`
    #[test]
    fn acceptability_matches_the_square_root_formulation() {
        let capacity = NormalCapacity::new(2.5, 2.0);
        for &(mean, var) in &[(1.0, 0.0), (2.0, 0.25), (2.0, 0.0624), (2.4, 0.001), (3.0, 0.0)] {
            let closed = NormalEconomy::acceptable(NormalBurden::new(mean, var), capacity);
            let naive = mean + capacity.sigma * var.sqrt() < capacity.limit;
            assert_eq!(naive, closed, "mean {mean} var {var}");
        }
    }

    // 2.0 + 2 sd of sqrt(0.25) overshoots a limit of 2.5: 4 * 0.25 = 1.0
    // exceeds (2.5 - 2.0)^2 = 0.25
    #[test]
    fn a_risky_burden_below_the_limit_is_still_rejected() {
        let capacity = NormalCapacity::new(2.5, 2.0);
        assert!(!NormalEconomy::acceptable(NormalBurden::new(2.0, 0.25), capacity));
        assert!(NormalEconomy::acceptable(NormalBurden::exact(2.0), capacity));
    }

    #[test]
    fn the_default_margin_is_three_standard_deviations() {
        let capacity = NormalCapacity::pessimistic(10.0);
        assert_eq!(3.0, capacity.sigma);
        assert_eq!(10.0, capacity.limit);
    }

    #[test]
    fn the_infinite_burden_is_impossible() {
        assert!(!NormalEconomy::is_possible(NormalEconomy::infinite()));
        assert!(NormalEconomy::is_possible(NormalEconomy::zero()));
    }
}
