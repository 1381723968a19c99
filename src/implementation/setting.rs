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

//! This module provides the simplest setting implementation you can think
//! of: a fixed array of option values together with an unbounded FIFO
//! measurement queue.

use std::collections::VecDeque;

use crate::{ApplyStrategy, ControllerId, Measurement, Setting, SettingOption};

/// A ready-made `Setting` over a fixed array of option values. The
/// application queues cost samples with [`SimpleSetting::record`] and reads
/// the controller's verdict back with [`SimpleSetting::choice`].
///
/// # Example
/// ```
/// # use perfgoblin::*;
/// let mut shadows = SimpleSetting::new("shadows", &[0.0, 10.0]);
/// shadows.record(0, 1.25);
/// assert_eq!(Some(Measurement { choice: 0, burden: 1.25 }), shadows.measurement());
/// assert_eq!(None, shadows.measurement());
/// ```
pub struct SimpleSetting {
    /// The stable identifier of this setting.
    id: String,
    /// The option values, in choice order.
    options: Vec<SettingOption>,
    /// The choice to fall back to while no burden data exists.
    choice_default: usize,
    /// The currently applied choice.
    choice: usize,
    /// The controller owning this setting, if any.
    controller: Option<ControllerId>,
    /// The queued, not yet harvested measurements.
    queue: VecDeque<Measurement>,
}

impl SimpleSetting {
    /// Creates a setting identified by `id` with one option per entry of
    /// `values`. The default choice is the first option.
    pub fn new(id: impl Into<String>, values: &[f64]) -> Self {
        assert!(!values.is_empty(), "a setting must expose at least one option");
        SimpleSetting {
            id: id.into(),
            options: values.iter().map(|&value| SettingOption { value }).collect(),
            choice_default: 0,
            choice: 0,
            controller: None,
            queue: VecDeque::new(),
        }
    }

    /// Overrides the default choice (and starts out on it).
    pub fn with_default_choice(mut self, choice: usize) -> Self {
        assert!(choice < self.options.len(), "default choice out of range");
        self.choice_default = choice;
        self.choice = choice;
        self
    }

    /// Queues one cost sample for the given option.
    pub fn record(&mut self, choice: usize, burden: f64) {
        assert!(choice < self.options.len(), "measured choice out of range");
        self.queue.push_back(Measurement { choice, burden });
    }

    /// The choice currently applied to this setting.
    pub fn choice(&self) -> usize {
        self.choice
    }
}

impl Setting for SimpleSetting {
    fn options(&self) -> &[SettingOption] {
        &self.options
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn choice_default(&self) -> usize {
        self.choice_default
    }

    fn measurement(&mut self) -> Option<Measurement> {
        self.queue.pop_front()
    }

    fn choice_set(&mut self, choice: usize, _strategy: ApplyStrategy) {
        self.choice = choice;
    }

    fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    fn set_controller(&mut self, controller: Option<ControllerId>) {
        self.controller = controller;
    }
}
