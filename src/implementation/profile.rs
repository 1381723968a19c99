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

//! This module provides the profile: the per-task, per-option burden
//! statistics a controller accumulates over the course of a run (and can
//! load back from a prior run).

use std::cell::Cell;

use fxhash::FxHashMap;

use crate::{BurdenStat, Measurement};

// ----------------------------------------------------------------------------
// --- OPTION STAT ------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The pair of accumulators a task keeps for each of its options: `full`
/// spans the whole run, `recent` is exponentially aged once per controller
/// tick and thus tracks the current cost regime.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OptionStat {
    /// The lifetime statistics of this option.
    pub full: BurdenStat,
    /// The exponentially aged statistics of this option.
    pub recent: BurdenStat,
}

// ----------------------------------------------------------------------------
// --- TASK -------------------------------------------------------------------
// ----------------------------------------------------------------------------
/// The record a profile keeps for one task id: one `OptionStat` per option,
/// plus bookkeeping. The option count is fixed for the lifetime of the task;
/// collecting under the same id with a different count is a programmer error.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    /// One accumulator pair per option of the task.
    options: Vec<OptionStat>,
    /// How many measurements have been collected into this task.
    data_count: u64,
    /// Latches to true the first time every option is found to meet the
    /// measurement quota (counts only ever grow, so the latch is sound).
    fully_explored: Cell<bool>,
}

impl Task {
    fn new(option_count: usize) -> Self {
        Task {
            options: vec![Default::default(); option_count],
            data_count: 0,
            fully_explored: Cell::new(false),
        }
    }

    /// Rebuilds a task from per-option lifetime statistics (this is how a
    /// persisted profile is loaded back: `recent` restarts from scratch).
    pub(crate) fn from_full(full: Vec<BurdenStat>) -> Self {
        let data_count = full.iter().map(|s| s.count().max(0.0) as u64).sum();
        Task {
            options: full
                .into_iter()
                .map(|full| OptionStat { full, recent: BurdenStat::new() })
                .collect(),
            data_count,
            fully_explored: Cell::new(false),
        }
    }

    /// The number of options of this task.
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// The statistics of one option.
    pub fn option(&self, choice: usize) -> &OptionStat {
        &self.options[choice]
    }

    /// An iterator over the per-option statistics.
    pub fn options(&self) -> impl Iterator<Item = &OptionStat> {
        self.options.iter()
    }

    /// How many measurements have been collected into this task.
    pub fn data_count(&self) -> u64 {
        self.data_count
    }

    /// True iff every option of this task holds at least `quota` lifetime
    /// samples. The result latches: once a task has been fully explored it
    /// stays so (lifetime counts never shrink).
    pub fn meets_quota(&self, quota: f64) -> bool {
        if self.fully_explored.get() {
            return true;
        }
        let met = self.options.iter().all(|o| o.full.count() >= quota);
        self.fully_explored.set(met);
        met
    }

    fn collect(&mut self, measurement: Measurement) {
        let stat = &mut self.options[measurement.choice];
        stat.full.push(measurement.burden);
        stat.recent.push(measurement.burden);
        self.data_count += 1;
    }

    fn decay_recent(&mut self, alpha: f64) {
        for option in self.options.iter_mut() {
            option.recent.decay(alpha);
        }
    }

    fn assimilate(&mut self, other: &Task, scale: f64) {
        assert_eq!(
            self.options.len(),
            other.options.len(),
            "assimilating a task with a different option count"
        );
        for (mine, theirs) in self.options.iter_mut().zip(other.options.iter()) {
            let mut scaled = theirs.full;
            scaled.scale(scale);
            mine.full = mine.full.pool(&scaled);
        }
        self.data_count += other.data_count;
    }
}

// ----------------------------------------------------------------------------
// --- PROFILE ----------------------------------------------------------------
// ----------------------------------------------------------------------------
/// A mapping from task id to the burden statistics collected for that task.
/// Tasks are created lazily on the first `collect` or `assimilate` under
/// their id.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    tasks: FxHashMap<String, Task>,
}

impl Profile {
    /// An empty profile.
    pub fn new() -> Self {
        Default::default()
    }

    /// A read-only handle on the task collected under `id`, if any.
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Incorporates one measurement for the task `id`, creating the task
    /// with `option_count` options if this is the first time the id is seen.
    ///
    /// The burden is pushed into both the `full` and the `recent`
    /// accumulator of the measured option. Collecting under an existing id
    /// with a mismatched `option_count`, or with an out-of-range choice, is
    /// a programmer error.
    pub fn collect(&mut self, id: &str, option_count: usize, measurement: Measurement) {
        let task = self
            .tasks
            .entry(id.to_string())
            .or_insert_with(|| Task::new(option_count));
        assert_eq!(
            task.options.len(),
            option_count,
            "task {id:?} was first collected with {} options",
            task.options.len()
        );
        assert!(
            measurement.choice < option_count,
            "measurement choice {} out of range for task {id:?}",
            measurement.choice
        );
        debug_assert!(measurement.burden >= 0.0);
        task.collect(measurement);
    }

    /// Ages the `recent` accumulator of every option of every task by
    /// `alpha`. The controller does this once per tick so that `recent`
    /// follows the current cost regime.
    pub fn decay_recent(&mut self, alpha: f64) {
        for task in self.tasks.values_mut() {
            task.decay_recent(alpha);
        }
    }

    /// Pools the `full` statistics of `task`, scaled by `scale`, into the
    /// local task registered under `id` (creating it if the id is new).
    pub fn assimilate(&mut self, id: &str, task: &Task, scale: f64) {
        let mine = self
            .tasks
            .entry(id.to_string())
            .or_insert_with(|| Task::new(task.option_count()));
        mine.assimilate(task, scale);
    }

    /// Forgets every task.
    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// The number of tasks this profile holds.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Tells whether this profile holds no task at all.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// An iterator over the `(id, task)` pairs of this profile.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.tasks.iter().map(|(id, task)| (id.as_str(), task))
    }

    pub(crate) fn insert(&mut self, id: String, task: Task) {
        self.tasks.insert(id, task);
    }
}

#[cfg(test)]
mod test_profile {
    use crate::*;

    fn measure(choice: usize, burden: f64) -> Measurement {
        Measurement { choice, burden }
    }

    #[test]
    fn tasks_are_created_lazily_on_first_collect() {
        let mut profile = Profile::new();
        assert!(profile.is_empty());
        assert!(profile.find("shadows").is_none());

        profile.collect("shadows", 2, measure(0, 1.5));
        assert_eq!(1, profile.len());
        let task = profile.find("shadows").unwrap();
        assert_eq!(2, task.option_count());
        assert_eq!(1, task.data_count());
        assert_eq!(1.5, task.option(0).full.mean());
        assert_eq!(1.5, task.option(0).recent.mean());
        assert!(task.option(1).full.is_empty());
    }

    #[test]
    #[should_panic]
    fn collecting_with_a_mismatched_option_count_panics() {
        let mut profile = Profile::new();
        profile.collect("shadows", 2, measure(0, 1.0));
        profile.collect("shadows", 3, measure(0, 1.0));
    }

    #[test]
    #[should_panic]
    fn collecting_an_out_of_range_choice_panics() {
        let mut profile = Profile::new();
        profile.collect("shadows", 2, measure(2, 1.0));
    }

    #[test]
    fn decay_recent_ages_recent_but_not_full() {
        let mut profile = Profile::new();
        for _ in 0..10 {
            profile.collect("shadows", 1, measure(0, 2.0));
        }
        profile.decay_recent(0.5);
        let task = profile.find("shadows").unwrap();
        assert_eq!(10.0, task.option(0).full.count());
        assert!(task.option(0).recent.count() < 10.0);
        assert_eq!(2.0, task.option(0).recent.mean());
    }

    #[test]
    fn meets_quota_requires_every_option() {
        let mut profile = Profile::new();
        for _ in 0..5 {
            profile.collect("shadows", 2, measure(0, 1.0));
        }
        assert!(!profile.find("shadows").unwrap().meets_quota(5.0));
        for _ in 0..5 {
            profile.collect("shadows", 2, measure(1, 1.0));
        }
        assert!(profile.find("shadows").unwrap().meets_quota(5.0));
    }

    #[test]
    fn assimilate_scales_then_pools() {
        let mut source = Profile::new();
        for _ in 0..4 {
            source.collect("shadows", 1, measure(0, 2.0));
        }
        let mut profile = Profile::new();
        profile.assimilate("shadows", source.find("shadows").unwrap(), 1.5);

        let task = profile.find("shadows").unwrap();
        assert_eq!(4.0, task.option(0).full.count());
        assert!((task.option(0).full.mean() - 3.0).abs() < 1e-9);
        // recent stays untouched by assimilation
        assert!(task.option(0).recent.is_empty());
    }

    // property 'profile idempotence': assimilating the same task twice at
    // scale 1 equals assimilating a task with twice the samples
    #[test]
    fn assimilating_twice_doubles_the_samples() {
        let samples = [1.0, 2.0, 3.0, 4.0];
        let mut once = Profile::new();
        let mut twice_the_data = Profile::new();
        for &x in samples.iter() {
            once.collect("t", 1, measure(0, x));
        }
        for &x in samples.iter().chain(samples.iter()) {
            twice_the_data.collect("t", 1, measure(0, x));
        }

        let mut target = Profile::new();
        target.assimilate("t", once.find("t").unwrap(), 1.0);
        target.assimilate("t", once.find("t").unwrap(), 1.0);

        let a = target.find("t").unwrap().option(0);
        let b = twice_the_data.find("t").unwrap().option(0);
        assert!((a.full.count() - b.full.count()).abs() < 1e-9);
        assert!((a.full.mean() - b.full.mean()).abs() < 1e-9);
        assert!((a.full.variance() - b.full.variance()).abs() < 1e-6);
    }

    #[test]
    fn a_copied_profile_is_independent() {
        let mut profile = Profile::new();
        profile.collect("shadows", 1, measure(0, 1.0));
        let copy = profile.clone();
        profile.collect("shadows", 1, measure(0, 100.0));
        assert_eq!(1, copy.find("shadows").unwrap().data_count());
        assert_eq!(2, profile.find("shadows").unwrap().data_count());
    }

    #[test]
    fn clear_forgets_every_task() {
        let mut profile = Profile::new();
        profile.collect("a", 1, measure(0, 1.0));
        profile.collect("b", 1, measure(0, 1.0));
        assert_eq!(2, profile.len());
        profile.clear();
        assert!(profile.is_empty());
    }
}
