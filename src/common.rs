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

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client application is likely to work with.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::Economy;

// ----------------------------------------------------------------------------
// --- CONTROLLER ID ----------------------------------------------------------
// ----------------------------------------------------------------------------
/// This type identifies one controller instance. Every setting remembers the
/// identifier of the controller it is registered with (if any), which is how
/// the single ownership of the setting-to-controller link is enforced without
/// any owning back pointer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ControllerId(pub u64);
impl ControllerId {
    /// This function returns the id (numeric value) of the controller.
    pub fn id(self) -> u64 {
        self.0
    }
    /// Hands out an identifier that no other controller of this process uses.
    pub(crate) fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ControllerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

// ----------------------------------------------------------------------------
// --- NORM -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The `(mean, variance)` summary of a stream of burden samples. This is what
/// a `BurdenStat` exports and what an `Economy` turns into an actual burden
/// (the scalar economy only retains the mean, the normal economy keeps both
/// components).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Norm {
    /// The sample mean of the stream.
    pub mean: f64,
    /// The (unbiased) sample variance of the stream.
    pub var: f64,
}
impl Norm {
    pub fn new(mean: f64, var: f64) -> Self {
        Norm { mean, var }
    }
}

// ----------------------------------------------------------------------------
// --- MEASUREMENT ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One cost sample reported by the application: while option `choice` of some
/// setting was active, one activation of that setting cost `burden`.
///
/// The contract is that `choice` must be a valid index into the option array
/// of the setting that produced the measurement; a negative `burden` is
/// clamped to zero by the controller when it is harvested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// The option that was active while the cost was incurred.
    pub choice: usize,
    /// The measured cost (typically a time, in whatever unit the application
    /// consistently uses for its capacity).
    pub burden: f64,
}

// ----------------------------------------------------------------------------
// --- SETTING OPTION ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// One option of a setting, as exposed by the application. A setting-facing
/// option only carries a subjective `value`: its burden is never declared, it
/// is inferred from live measurements by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingOption {
    /// The subjective value of running with this option active. Larger is
    /// better; the unit is up to the application but must be consistent
    /// across settings since the controller maximizes the sum.
    pub value: f64,
}

// ----------------------------------------------------------------------------
// --- APPLY STRATEGY ---------------------------------------------------------
// ----------------------------------------------------------------------------
/// Tells a setting how it should take a freshly decided choice into account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApplyStrategy {
    /// The new choice takes effect right away. This is the only strategy the
    /// controller currently emits after a solve.
    #[default]
    Immediate,
}

// ----------------------------------------------------------------------------
// --- ITEM -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// One selectable option of a knapsack decision: a burden (in the currency of
/// the economy `E`) paired with a subjective value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Item<E: Economy> {
    /// What selecting this item costs.
    pub burden: E::Burden,
    /// What selecting this item is worth.
    pub value: f64,
}
impl<E: Economy> Item<E> {
    pub fn new(burden: E::Burden, value: f64) -> Self {
        Item { burden, value }
    }
    /// An item is possible iff its burden is finite. Impossible items can
    /// only ever be selected through the lightest-burden fallback of the
    /// solver.
    pub fn possible(&self) -> bool {
        E::is_possible(self.burden)
    }
}

// ----------------------------------------------------------------------------
// --- DECISION ---------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A group of mutually exclusive items out of which exactly one must be
/// selected. The item list is owned by the caller; the three indices are
/// written by the solver.
///
/// After a solve, `items[choice].possible()` holds unless no possible item
/// exists at all, in which case the solver selects the lightest one anyway
/// (and reports the problem as infeasible).
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<E: Economy> {
    /// The items (options) of this decision.
    pub items: Vec<Item<E>>,
    /// The index of the item selected by the last solve.
    pub choice: usize,
    /// The index of the minimum-burden item (possibly an impossible one, if
    /// every item is impossible).
    pub choice_easy: usize,
    /// The index of the maximum-value item among the possible ones.
    pub choice_high: usize,
}
impl<E: Economy> Decision<E> {
    pub fn new(items: Vec<Item<E>>) -> Self {
        Decision { items, choice: 0, choice_easy: 0, choice_high: 0 }
    }
    /// The item currently selected.
    pub fn chosen(&self) -> &Item<E> {
        &self.items[self.choice]
    }
    /// The minimum-burden item.
    pub fn option_easy(&self) -> &Item<E> {
        &self.items[self.choice_easy]
    }
    /// The maximum-value possible item.
    pub fn option_high(&self) -> &Item<E> {
        &self.items[self.choice_high]
    }
}

// ----------------------------------------------------------------------------
// --- STATS ------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The aggregate burden, value and quantized score of one complete selection
/// (one item per decision). The solver reports three of these: the selection
/// it chose, the highest-value selection and the lightest-burden one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats<E: Economy> {
    /// The net burden of the selection.
    pub burden: E::Burden,
    /// The net value of the selection.
    pub value: f64,
    /// The net quantized score of the selection (see the solver for how
    /// values are quantized into scores).
    pub score: usize,
}
impl<E: Economy> Stats<E> {
    /// The neutral element: the stats of an empty selection.
    pub fn zero() -> Self {
        Stats { burden: E::zero(), value: 0.0, score: 0 }
    }
}
impl<E: Economy> Default for Stats<E> {
    fn default() -> Self {
        Self::zero()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
