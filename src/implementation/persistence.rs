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

//! This module provides the textual (JSON) form of a profile, which is how
//! the statistics of one run are carried over to the next.
//!
//! The persisted document is an object mapping each task id to one
//! `[count, mean, std_dev]` triple per option:
//!
//! ```json
//! { "shadows": [[30, 1.02, 0.11], [30, 3.97, 0.35]] }
//! ```
//!
//! Only the lifetime (`full`) accumulators are persisted; the `recent` ones
//! are tied to the cost regime of the run that produced them and restart
//! from scratch on load.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::{BurdenStat, Profile, Task};

/// The ways loading or saving a profile can fail.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The document is not the JSON shape described by this module.
    #[error("malformed profile document: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A task id contains a control character or a double quote.
    #[error("task id {0:?} contains a forbidden character")]
    InvalidId(String),
    /// A persisted option triple carries a negative sample count.
    #[error("task {id:?} option {option} has a negative sample count")]
    NegativeCount { id: String, option: usize },
}

/// One `[count, mean, std_dev]` triple per option, keyed by task id. Using a
/// sorted map keeps the serialized output stable across runs.
type ProfileDoc = BTreeMap<String, Vec<[f64; 3]>>;

fn valid_id(id: &str) -> bool {
    !id.chars().any(|c| c.is_control() || c == '"')
}

impl Profile {
    /// Serializes the lifetime statistics of this profile to their JSON
    /// textual form.
    pub fn to_json(&self) -> Result<String, ProfileError> {
        let mut doc = ProfileDoc::new();
        for (id, task) in self.iter() {
            if !valid_id(id) {
                return Err(ProfileError::InvalidId(id.to_string()));
            }
            let triples = task
                .options()
                .map(|o| [o.full.count(), o.full.mean(), o.full.std_dev()])
                .collect();
            doc.insert(id.to_string(), triples);
        }
        Ok(serde_json::to_string_pretty(&doc)?)
    }

    /// Parses a profile back from its JSON textual form. The `recent`
    /// accumulators of every task start out empty.
    pub fn from_json(text: &str) -> Result<Profile, ProfileError> {
        let doc: ProfileDoc = serde_json::from_str(text)?;
        let mut profile = Profile::new();
        for (id, triples) in doc {
            if !valid_id(&id) {
                return Err(ProfileError::InvalidId(id));
            }
            let mut full = Vec::with_capacity(triples.len());
            for (option, [count, mean, std_dev]) in triples.into_iter().enumerate() {
                if count < 0.0 {
                    return Err(ProfileError::NegativeCount { id, option });
                }
                full.push(BurdenStat::from_summary(count, mean, std_dev));
            }
            profile.insert(id, Task::from_full(full));
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod test_persistence {
    use crate::*;

    #[test]
    fn a_profile_round_trips_through_json() {
        let mut profile = Profile::new();
        for x in [1.0, 2.0, 3.0] {
            profile.collect("shadows", 2, Measurement { choice: 0, burden: x });
        }
        profile.collect("shadows", 2, Measurement { choice: 1, burden: 4.0 });
        profile.collect("particles", 1, Measurement { choice: 0, burden: 0.5 });

        let text = profile.to_json().unwrap();
        let loaded = Profile::from_json(&text).unwrap();

        assert_eq!(2, loaded.len());
        let task = loaded.find("shadows").unwrap();
        assert_eq!(2, task.option_count());
        assert_eq!(3.0, task.option(0).full.count());
        assert!((task.option(0).full.mean() - 2.0).abs() < 1e-9);
        assert!((task.option(0).full.variance() - 1.0).abs() < 1e-6);
        assert_eq!(1.0, task.option(1).full.count());
    }

    #[test]
    fn recent_stats_are_not_persisted() {
        let mut profile = Profile::new();
        profile.collect("shadows", 1, Measurement { choice: 0, burden: 2.0 });
        let loaded = Profile::from_json(&profile.to_json().unwrap()).unwrap();
        assert!(loaded.find("shadows").unwrap().option(0).recent.is_empty());
        assert!(!loaded.find("shadows").unwrap().option(0).full.is_empty());
    }

    #[test]
    fn an_id_with_a_double_quote_is_rejected() {
        let mut profile = Profile::new();
        profile.collect("sha\"dows", 1, Measurement { choice: 0, burden: 1.0 });
        assert!(matches!(profile.to_json(), Err(ProfileError::InvalidId(_))));
    }

    #[test]
    fn an_id_with_a_newline_is_rejected_on_load() {
        let text = "{\"a\\nb\": [[1.0, 1.0, 0.0]]}";
        assert!(matches!(Profile::from_json(text), Err(ProfileError::InvalidId(_))));
    }

    #[test]
    fn garbage_is_rejected_as_malformed() {
        assert!(matches!(Profile::from_json("not json"), Err(ProfileError::Malformed(_))));
        assert!(matches!(
            Profile::from_json("{\"a\": [[1.0, 2.0]]}"),
            Err(ProfileError::Malformed(_))
        ));
    }

    #[test]
    fn a_negative_count_is_rejected() {
        let text = "{\"a\": [[-1.0, 1.0, 0.0]]}";
        assert!(matches!(
            Profile::from_json(text),
            Err(ProfileError::NegativeCount { .. })
        ));
    }

    #[test]
    fn an_empty_profile_serializes_to_an_empty_object() {
        let profile = Profile::new();
        assert_eq!("{}", profile.to_json().unwrap());
        assert!(Profile::from_json("{}").unwrap().is_empty());
    }
}
