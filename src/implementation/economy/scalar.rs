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

//! This module provides the implementation of the scalar economy: the
//! simplest burden algebra you can think of.

use crate::{Economy, Norm};

/// In the scalar economy, a burden is a plain nonnegative real and the
/// capacity is the same scalar. A net burden is acceptable iff it is
/// strictly below the capacity.
///
/// # Example
/// ```
/// # use perfgoblin::*;
/// assert!( ScalarEconomy::acceptable(1.9, 2.0));
/// assert!(!ScalarEconomy::acceptable(2.0, 2.0));
/// assert!(!ScalarEconomy::acceptable(ScalarEconomy::infinite(), 2.0));
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScalarEconomy;

impl Economy for ScalarEconomy {
    type Burden = f64;
    type Capacity = f64;

    fn zero() -> f64 {
        0.0
    }
    fn infinite() -> f64 {
        f64::INFINITY
    }
    fn is_possible(burden: f64) -> bool {
        burden.is_finite()
    }
    fn lesser(a: f64, b: f64) -> bool {
        a < b
    }
    fn add(a: f64, b: f64) -> f64 {
        a + b
    }
    fn sub(a: f64, b: f64) -> f64 {
        a - b
    }
    fn scale(burden: f64, factor: f64) -> f64 {
        burden * factor
    }
    fn acceptable(burden: f64, capacity: f64) -> bool {
        burden < capacity
    }
    fn from_norm(norm: Norm) -> f64 {
        norm.mean
    }
}
