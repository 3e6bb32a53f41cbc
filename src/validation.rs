//! Structural Action-List Validation
//!
//! Purely structural: an action list is well-formed when it is a
//! sequence of objects that each carry a `name` string and an
//! `arguments` mapping. No check against the registry and no argument
//! typing happens here; those fail later, at dispatch and at the
//! argument adaptation boundary respectively.
//!
//! Checks return a tagged reason rather than a bare boolean so the
//! boundary can log what was wrong; [`actions_valid`] keeps the plain
//! verdict for callers that only want the gate.

use serde_json::Value;
use thiserror::Error;

use crate::pipeline::Action;

pub const NAME_KEY: &str = "name";
pub const ARGUMENTS_KEY: &str = "arguments";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("actions must be a sequence")]
    NotASequence,

    #[error("action at index {0} is not an object")]
    ElementNotAnObject(usize),

    #[error("action at index {0} is missing `name`")]
    MissingName(usize),

    #[error("action at index {0} has a non-string `name`")]
    NameNotAString(usize),

    #[error("action at index {0} is missing `arguments`")]
    MissingArguments(usize),

    #[error("action at index {0} has a non-mapping `arguments`")]
    ArgumentsNotAnObject(usize),
}

/// Convert a candidate action list into executable [`Action`]s,
/// reporting the first structural defect found.
pub fn parse_actions(value: &Value) -> Result<Vec<Action>, ValidationError> {
    let items = value.as_array().ok_or(ValidationError::NotASequence)?;
    let mut actions = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let fields = item
            .as_object()
            .ok_or(ValidationError::ElementNotAnObject(index))?;
        let name = fields
            .get(NAME_KEY)
            .ok_or(ValidationError::MissingName(index))?
            .as_str()
            .ok_or(ValidationError::NameNotAString(index))?;
        let arguments = fields
            .get(ARGUMENTS_KEY)
            .ok_or(ValidationError::MissingArguments(index))?
            .as_object()
            .ok_or(ValidationError::ArgumentsNotAnObject(index))?;
        actions.push(Action::new(name, arguments.clone()));
    }
    Ok(actions)
}

/// Structural check without conversion.
pub fn check_actions(value: &Value) -> Result<(), ValidationError> {
    parse_actions(value).map(|_| ())
}

/// Boolean boundary verdict: true only when every element has both
/// required fields. Never signals failure upward.
pub fn actions_valid(value: &Value) -> bool {
    check_actions(value).is_ok()
}
