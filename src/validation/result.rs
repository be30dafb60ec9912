//! Validation outcomes and their merge algebra

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Severity of a validation outcome, ordered `Success < Warning < Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    #[default]
    Success,
    Warning,
    Error,
}

impl State {
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Success => "SUCCESS",
            State::Warning => "WARNING",
            State::Error => "ERROR",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity plus the findings behind it
///
/// Identical messages collapse. Merging takes the highest severity and the
/// union of messages, so results can be combined in any order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub state: State,
    pub messages: BTreeSet<String>,
}

impl ValidationResult {
    pub fn new(state: State, messages: impl IntoIterator<Item = String>) -> Self {
        Self {
            state,
            messages: messages.into_iter().collect(),
        }
    }

    pub fn success() -> Self {
        Self::default()
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(State::Warning, [message.into()])
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(State::Error, [message.into()])
    }

    pub fn is_success(&self) -> bool {
        self.state == State::Success
    }

    pub fn has_errors(&self) -> bool {
        self.state == State::Error
    }

    /// Combines two results
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.state = self.state.max(other.state);
        self.messages.extend(other.messages);
        self
    }

    /// Combines any number of results; an empty input is a success
    pub fn merge_all(results: impl IntoIterator<Item = ValidationResult>) -> Self {
        results
            .into_iter()
            .fold(ValidationResult::success(), ValidationResult::merge)
    }
}
