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

//! This module defines the `Setting` abstraction: the contract between the
//! application code and the controller.
//!
//! A setting is one controllable knob of the application (shadow quality,
//! particle density, simulation step, ...) with a small fixed set of
//! discrete options. The application measures what its active option costs
//! and queues those measurements; the controller drains them every tick and
//! writes a (possibly new) choice back.

use crate::{ApplyStrategy, ControllerId, Measurement, SettingOption};

/// The contract a controllable setting must fulfill.
///
/// # Ownership of the link
/// At most one controller may own a setting at any point in time. The link
/// is materialized by the `ControllerId` the setting stores: registering an
/// unowned setting stores the controller's id, re-registering with the same
/// controller is a no-op, and registering with a *different* controller is
/// rejected. The controller clears the id again on unregistration and on
/// teardown, so ownership never flows along this back reference.
///
/// # Identity
/// `id()` must be stable for the lifetime of the setting and is the key
/// under which its statistics are recorded in a profile (and persisted, if
/// the application saves profiles). It must not contain control characters
/// nor double quotes.
pub trait Setting {
    /// An immutable view of the options of this setting. The option count
    /// must never change once the setting has produced its first
    /// measurement: profiles key their per-option statistics on it.
    fn options(&self) -> &[SettingOption];

    /// The stable identifier of this setting.
    fn id(&self) -> &str;

    /// The choice to fall back to as long as no burden data exists for this
    /// setting (neither measured in this run nor applicable from a prior
    /// one). Defaults to the first option.
    fn choice_default(&self) -> usize {
        0
    }

    /// Pulls the next queued measurement, or `None` when the queue is
    /// drained. The controller calls this repeatedly during its harvest
    /// phase; whether the underlying queue is bounded is up to the
    /// implementer.
    fn measurement(&mut self) -> Option<Measurement>;

    /// Called by the controller after every decide phase with the choice the
    /// solver retained for this setting.
    fn choice_set(&mut self, choice: usize, strategy: ApplyStrategy);

    /// The controller currently owning this setting, if any.
    fn controller(&self) -> Option<ControllerId>;

    /// Stores (or clears) the owning controller. Only ever called by a
    /// controller while registering or unregistering the setting.
    fn set_controller(&mut self, controller: Option<ControllerId>);
}
