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

//! This module defines the `Economy` abstraction: the algebra of burdens.
//!
//! Both the knapsack solver and the controller are generic over an economy.
//! An economy tells them what a burden *is* (a plain nonnegative real, or a
//! normally distributed quantity), how burdens combine, how they compare, and
//! when an accumulated burden is still acceptable under a given capacity.

use std::fmt::Debug;

use crate::Norm;

/// The policy describing burden arithmetic. An economy is a zero-sized type:
/// all of its operations are associated functions, so that the solver and
/// the controller monomorphize per economy and no dispatch happens in the
/// solver's inner loop.
///
/// Two implementations ship with the library: `ScalarEconomy` (a burden is a
/// nonnegative real, a capacity is the same scalar) and `NormalEconomy` (a
/// burden is a `(mean, variance)` pair, a capacity is a limit together with
/// a standard-deviation margin).
pub trait Economy: Copy + Clone + Debug + PartialEq {
    /// The type of one burden (the cost of one selection, or a sum thereof).
    type Burden: Copy + Clone + Debug + PartialEq;
    /// The type of the capacity a net burden is checked against.
    type Capacity: Copy + Clone + Debug + PartialEq;

    /// The neutral element of burden addition (the burden of selecting
    /// nothing at all).
    fn zero() -> Self::Burden;
    /// The absorbing element of burden addition: a burden so large that no
    /// capacity ever accepts it. Used to mark options that must not be
    /// selected (except through the lightest-burden fallback).
    fn infinite() -> Self::Burden;
    /// Tells whether the given burden could ever be part of an accepted
    /// selection (i.e. whether it is finite).
    fn is_possible(burden: Self::Burden) -> bool;
    /// A total order on burdens suitable for frontier pruning. Ordering by
    /// mean only is correct here: two same-mean burdens with different
    /// variances are only told apart at acceptability time, and the solver
    /// admits a candidate only if it is acceptable.
    fn lesser(a: Self::Burden, b: Self::Burden) -> bool;
    /// The burden of selecting both `a` and `b` (the variables are treated
    /// as independent).
    fn add(a: Self::Burden, b: Self::Burden) -> Self::Burden;
    /// The burden of `a` with `b` taken back out. Since the variables are
    /// independent, uncertainty does not cancel: variances still add.
    fn sub(a: Self::Burden, b: Self::Burden) -> Self::Burden;
    /// The burden scaled by a nonnegative factor (the variance component, if
    /// any, scales by the square of the factor: the scaling is correlated).
    fn scale(burden: Self::Burden, factor: f64) -> Self::Burden;
    /// Tells whether the given net burden fits within the capacity. This
    /// predicate is strict: a burden exactly at the limit is rejected.
    fn acceptable(burden: Self::Burden, capacity: Self::Capacity) -> bool;
    /// Builds a burden out of the `(mean, variance)` summary of a stream of
    /// measurements.
    fn from_norm(norm: Norm) -> Self::Burden;
}
