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

//! # PERFGOBLIN
//! Perfgoblin is an online, self-calibrating quality-settings controller for
//! soft-real-time applications (games, audio/video engines). Every tick it
//! selects, for each controllable setting, one of its discrete options so as
//! to maximize a subjective value you define, subject to a hard bound on the
//! total predicted cost (the *burden*, typically a frame time). Burdens are
//! never declared: they are learned from live measurements and, optionally,
//! from the persisted profile of a prior run.
//!
//! Two engines do the hard work:
//!
//! 1. the [`KnapsackSolver`]: a fully polynomial approximation scheme for
//!    the multiple-choice knapsack problem, generic over a pluggable
//!    [`Economy`] that defines the burden algebra (a plain scalar, or a
//!    normally distributed quantity with a pessimism margin);
//! 2. the [`Goblin`] controller: the outer loop that harvests measurements,
//!    maintains rolling statistics per (setting, option), fuses them with a
//!    prior-run profile through a correlated scaling factor, estimates a
//!    burden for every option (including the ones never measured yet) and
//!    applies the solver's choices.
//!
//! ## Quick Example
//! The following example controls two settings of an imaginary renderer.
//! Each has a cheap base option and a pricey upgrade; the budget only admits
//! the upgrade of the more valuable one. The application is only responsible
//! for measuring what its current choices cost; the controller explores,
//! learns and settles on the best affordable configuration.
//!
//! ```
//! use perfgoblin::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! // the true (unknown to the controller) cost of every option
//! const SHADOW_COST: [f64; 2] = [1.0, 4.0];
//! const PARTICLE_COST: [f64; 2] = [0.5, 3.0];
//!
//! // 1. Expose the settings: one option value per discrete option.
//! let shadows = Rc::new(RefCell::new(SimpleSetting::new("shadows", &[0.0, 10.0])));
//! let particles = Rc::new(RefCell::new(SimpleSetting::new("particles", &[0.0, 8.0])));
//!
//! // 2. Create a controller and register the settings with it. A small
//! //    measurement quota keeps this example short.
//! let config = GoblinConfigBuilder::default().measure_quota(5.0).build().unwrap();
//! let mut goblin: Goblin<NormalEconomy> = Goblin::with_config(config);
//! assert!(goblin.register(shadows.clone()));
//! assert!(goblin.register(particles.clone()));
//!
//! // 3. Every frame: measure what the active options cost, then update.
//! //    The budget is 6 time units with a 3-sigma pessimism margin.
//! for _ in 0..100 {
//!     let choice = shadows.borrow().choice();
//!     shadows.borrow_mut().record(choice, SHADOW_COST[choice]);
//!     let choice = particles.borrow().choice();
//!     particles.borrow_mut().record(choice, PARTICLE_COST[choice]);
//!     goblin.update(NormalCapacity::new(6.0, 3.0), 30);
//! }
//!
//! // 4. Upgrading both would cost 7 > 6; the controller keeps the shadow
//! //    upgrade (worth 10) and leaves the particles at their base option.
//! assert_eq!(1, shadows.borrow().choice());
//! assert_eq!(0, particles.borrow().choice());
//!
//! // 5. Persist what was learned for the next run.
//! let saved = goblin.profile().to_json().unwrap();
//! let mut next_run: Goblin<NormalEconomy> = Goblin::new();
//! next_run.set_past_profile(Profile::from_json(&saved).unwrap());
//! ```
//!
//! ## Using the solver on its own
//! The solver has no opinion about where burdens come from: hand it a list
//! of decisions and a capacity and it selects one item per decision.
//!
//! ```
//! use perfgoblin::*;
//!
//! let mut decisions = vec![
//!     Decision::new(vec![Item::new(0.0, 0.0), Item::new(1.0, 10.0)]),
//!     Decision::new(vec![Item::new(0.0, 0.0), Item::new(1.0, 8.0)]),
//!     Decision::new(vec![Item::new(0.0, 0.0), Item::new(2.0, 12.0)]),
//! ];
//! let mut solver = KnapsackSolver::<ScalarEconomy>::new();
//!
//! assert!(solver.decide(&mut decisions, 2.5, 50));
//! assert_eq!(vec![1, 1, 0], decisions.iter().map(|d| d.choice).collect::<Vec<_>>());
//! assert_eq!(18.0, solver.chosen().value);
//! ```
//!
//! ## Going further
//! The types you are most likely to interact with are [`Setting`] (the one
//! trait an application must implement, unless [`SimpleSetting`] suffices),
//! [`Goblin`] and [`GoblinConfig`]. If you need a custom burden algebra,
//! look at [`Economy`] and its two provided implementations,
//! [`ScalarEconomy`] and [`NormalEconomy`].

mod common;
mod abstraction;
mod implementation;

pub use common::*;
pub use abstraction::*;
pub use implementation::*;
