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

//! This is the multiple-choice knapsack solver: given a set of decisions
//! (each a small group of mutually exclusive items) and a capacity, it
//! selects one item per decision so as to maximize the net value while
//! keeping the net burden acceptable. It is a fully polynomial approximation
//! scheme: values are quantized into integer scores whose range is bounded
//! by the requested precision, and an exact dynamic program runs over the
//! quantized problem.

use crate::{Decision, Economy, Item, Stats};

/// The solver never quantizes coarser than this: any requested precision is
/// clamped up to it.
pub const MIN_PRECISION: usize = 4;

/// One retained frontier entry: the lightest net burden known to reach
/// `score` after some prefix of decisions, together with the item chosen at
/// the last decision of that prefix.
#[derive(Debug, Clone, Copy)]
struct Minimum<E: Economy> {
    /// The net quantized score this entry reaches.
    score: usize,
    /// The lightest net burden known to reach that score.
    burden: E::Burden,
    /// The item selected at the last decision of the prefix.
    choice: usize,
}

/// The multiple-choice knapsack solver.
///
/// Item burdens must be nonnegative in the `lesser` order of the economy
/// (measurements are clamped upstream); this is what makes rejecting a
/// partial selection that already exceeds the capacity sound.
///
/// The solver owns all of its scratch buffers (quantized scores, the two
/// dense score frontiers and the sparse store of validated rows), so a
/// single instance can be reused every tick without reallocating.
///
/// # Example
/// ```
/// # use perfgoblin::*;
/// let mut decisions = vec![
///     Decision::new(vec![Item::new(0.0, 0.0), Item::new(1.0, 10.0)]),
///     Decision::new(vec![Item::new(0.0, 0.0), Item::new(1.0, 8.0)]),
///     Decision::new(vec![Item::new(0.0, 0.0), Item::new(2.0, 12.0)]),
/// ];
/// let mut solver = KnapsackSolver::<ScalarEconomy>::default();
/// assert!(solver.decide(&mut decisions, 2.5, 50));
/// assert_eq!(1, decisions[0].choice);
/// assert_eq!(1, decisions[1].choice);
/// assert_eq!(0, decisions[2].choice);
/// assert_eq!(2.0, solver.chosen().burden);
/// assert_eq!(18.0, solver.chosen().value);
/// ```
#[derive(Debug, Clone)]
pub struct KnapsackSolver<E: Economy> {
    /// The stats of the selection retained by the last solve.
    chosen: Stats<E>,
    /// The stats of the all-highest selection of the last solve.
    highest: Stats<E>,
    /// The stats of the all-lightest selection of the last solve.
    lightest: Stats<E>,
    /// How many candidate extensions the last solve examined.
    iterations: usize,

    /// The quantized score of every item, one slice per decision.
    scores: Vec<isize>,
    /// Where each decision's slice starts within `scores`.
    offsets: Vec<usize>,
    /// The decisions sorted by ascending highest score.
    order: Vec<usize>,
    /// The dense frontier of the already-processed prefix.
    previous: Vec<Option<Minimum<E>>>,
    /// The dense frontier being built for the current decision.
    current: Vec<Option<Minimum<E>>>,
    /// Every validated frontier row, spilled in score order.
    store: Vec<Minimum<E>>,
    /// The exclusive end of each row within `store`.
    row_end: Vec<usize>,
}

impl<E: Economy> Default for KnapsackSolver<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Economy> KnapsackSolver<E> {
    pub fn new() -> Self {
        KnapsackSolver {
            chosen: Stats::zero(),
            highest: Stats::zero(),
            lightest: Stats::zero(),
            iterations: 0,
            scores: vec![],
            offsets: vec![],
            order: vec![],
            previous: vec![],
            current: vec![],
            store: vec![],
            row_end: vec![],
        }
    }

    /// The stats of the selection the last solve retained.
    pub fn chosen(&self) -> &Stats<E> {
        &self.chosen
    }

    /// The stats of the selection taking the maximum-value possible item of
    /// every decision.
    pub fn highest(&self) -> &Stats<E> {
        &self.highest
    }

    /// The stats of the selection taking the minimum-burden item of every
    /// decision.
    pub fn lightest(&self) -> &Stats<E> {
        &self.lightest
    }

    /// How many candidate extensions the last solve examined.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Selects one item per decision, writing each `decision.choice` (and
    /// `choice_easy` / `choice_high`), so as to maximize the net value while
    /// keeping the net burden acceptable under `capacity`.
    ///
    /// Returns true iff a selection within capacity was found. A false
    /// return means even the all-lightest selection exceeds the capacity;
    /// the lightest items are selected anyway so that the caller always has
    /// a best-effort assignment to apply.
    ///
    /// The retained net value is within `N * max(range, 1) / precision` of
    /// the acceptable optimum, where `N` is the number of decisions and
    /// `range` is the largest value spread (highest minus lightest item)
    /// of any single decision: each decision contributes at most one
    /// quantization step of error. `precision` trades accuracy for time and
    /// is clamped to at least [`MIN_PRECISION`].
    pub fn decide(
        &mut self,
        decisions: &mut [Decision<E>],
        capacity: E::Capacity,
        precision: usize,
    ) -> bool {
        let precision = precision.max(MIN_PRECISION);
        self.iterations = 0;
        self.scores.clear();
        self.offsets.clear();
        self.store.clear();
        self.row_end.clear();

        // -- prepare: easy/high indices and quantized scores ----------------
        let mut value_range = 0.0_f64;
        for decision in decisions.iter_mut() {
            assert!(!decision.items.is_empty(), "a decision must offer at least one item");
            let mut easy = 0;
            let mut high = None;
            for (i, item) in decision.items.iter().enumerate() {
                if E::lesser(item.burden, decision.items[easy].burden) {
                    easy = i;
                }
                if item.possible() {
                    let switch = match high {
                        None => true,
                        Some(h) => {
                            let best: &Item<E> = &decision.items[h];
                            item.value > best.value
                                || (item.value == best.value && E::lesser(item.burden, best.burden))
                        }
                    };
                    if switch {
                        high = Some(i);
                    }
                }
            }
            decision.choice_easy = easy;
            // when no item is possible, the lightest shortcut below is bound
            // to fire; the high index merely needs to be in range
            decision.choice_high = high.unwrap_or(easy);
            value_range =
                value_range.max(decision.option_high().value - decision.option_easy().value);
        }

        let scale = precision as f64 / value_range.max(1.0);
        for decision in decisions.iter() {
            self.offsets.push(self.scores.len());
            let base = decision.option_easy().value;
            for item in decision.items.iter() {
                self.scores.push(((item.value - base) * scale).ceil() as isize);
            }
        }

        // -- shortcuts ------------------------------------------------------
        let mut lightest = Stats::<E>::zero();
        let mut highest = Stats::<E>::zero();
        for (d, decision) in decisions.iter().enumerate() {
            lightest.burden = E::add(lightest.burden, decision.option_easy().burden);
            lightest.value += decision.option_easy().value;
            highest.burden = E::add(highest.burden, decision.option_high().burden);
            highest.value += decision.option_high().value;
            highest.score += self.scores[self.offsets[d] + decision.choice_high].max(0) as usize;
        }
        self.lightest = lightest;
        self.highest = highest;

        if !E::acceptable(lightest.burden, capacity) {
            // nothing fits: apply the lightest selection anyway
            for decision in decisions.iter_mut() {
                decision.choice = decision.choice_easy;
            }
            self.chosen = lightest;
            return false;
        }
        if E::acceptable(highest.burden, capacity) {
            // everything fits: no need to search
            for decision in decisions.iter_mut() {
                decision.choice = decision.choice_high;
            }
            self.chosen = highest;
            return true;
        }

        // -- main loop: one frontier row per decision -----------------------
        let mut order = std::mem::take(&mut self.order);
        let mut previous = std::mem::take(&mut self.previous);
        let mut current = std::mem::take(&mut self.current);
        order.clear();
        order.extend(0..decisions.len());
        let scores = &self.scores;
        let offsets = &self.offsets;
        order.sort_by_key(|&d| scores[offsets[d] + decisions[d].choice_high]);

        previous.clear();
        previous.push(Some(Minimum { score: 0, burden: E::zero(), choice: usize::MAX }));

        let mut row_cap = 0_usize;
        for &d in order.iter() {
            let decision = &decisions[d];
            row_cap += scores[offsets[d] + decision.choice_high].max(0) as usize;
            current.clear();
            current.resize(row_cap + 1, None);

            for prev in previous.iter().flatten() {
                for (i, item) in decision.items.iter().enumerate() {
                    let score = scores[offsets[d] + i];
                    if score < 0 || !item.possible() {
                        continue;
                    }
                    self.iterations += 1;
                    let burden = E::add(prev.burden, item.burden);
                    if !E::acceptable(burden, capacity) {
                        continue;
                    }
                    let net_score = prev.score + score as usize;
                    let keep = match &current[net_score] {
                        Some(kept) => E::lesser(burden, kept.burden),
                        None => true,
                    };
                    if keep {
                        current[net_score] = Some(Minimum { score: net_score, burden, choice: i });
                    }
                }
            }

            for minimum in current.iter().flatten() {
                self.store.push(*minimum);
            }
            self.row_end.push(self.store.len());
            std::mem::swap(&mut previous, &mut current);
        }

        // -- reconstruct ----------------------------------------------------
        // every stored entry is acceptable, so the best solution is the
        // highest-score entry of the last row; walking the rows backwards
        // recovers one choice per decision, peeling that choice's score off
        // the required net score at every step
        let n = order.len();
        let row = |i: usize| {
            let lo = if i == 0 { 0 } else { self.row_end[i - 1] };
            &self.store[lo..self.row_end[i]]
        };
        let last = *row(n - 1)
            .iter()
            .rev()
            .find(|m| E::acceptable(m.burden, capacity))
            .expect("the all-lightest path survives in every row");

        let mut chosen = Stats { burden: last.burden, value: 0.0, score: last.score };
        let mut want = last.score;
        for (i, &d) in order.iter().enumerate().rev() {
            let entries = row(i);
            let at = entries
                .binary_search_by_key(&want, |m| m.score)
                .expect("the frontier chain is unbroken");
            let minimum = entries[at];
            decisions[d].choice = minimum.choice;
            chosen.value += decisions[d].items[minimum.choice].value;
            want -= scores[offsets[d] + minimum.choice] as usize;
        }
        debug_assert_eq!(0, want, "the residual score at the first row must be zero");

        self.order = order;
        self.previous = previous;
        self.current = current;
        self.chosen = chosen;
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
