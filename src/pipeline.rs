//! Pipeline Executor - Sequential Action Dispatch
//!
//! A strict left-to-right fold: each step's output buffer is the next
//! step's input, dispatched through the registry. The first failure
//! aborts the whole pipeline; no partial result escapes, and no
//! rollback is needed because the caller's buffer is never touched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::buffer::PixelBuffer;
use crate::codec::{self, CodecError, OutputFormat, DEFAULT_FORMAT, DEFAULT_QUALITY};
use crate::registry::{Arguments, Registry};
use crate::validation::{self, ValidationError};

/// Everything that can go wrong between a caller's input and the
/// encoded result. All variants are caller-input errors: never
/// retried, never fatal to the process.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Decode failed: {0}")]
    Decode(#[from] CodecError),

    #[error("Invalid action list: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid arguments for `{action}`: {reason}")]
    Argument { action: String, reason: String },
}

/// A named operation plus its keyword arguments, as submitted by a
/// caller. Immutable after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl Action {
    pub fn new(name: impl Into<String>, arguments: Arguments) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// Action with no arguments.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Arguments::new())
    }
}

/// Apply an ordered action list to an initial buffer.
///
/// The initial buffer is cloned before the first step so the caller's
/// copy is never observably mutated; an empty list therefore yields an
/// equal but distinct buffer.
pub fn apply(
    registry: &Registry,
    initial: &PixelBuffer,
    actions: &[Action],
) -> Result<PixelBuffer, PipelineError> {
    let mut current = initial.clone();
    for action in actions {
        let transformation = registry
            .get(&action.name)
            .ok_or_else(|| PipelineError::UnknownAction(action.name.clone()))?;
        log::debug!(
            "applying `{}` to {}x{}x{} buffer",
            action.name,
            current.width(),
            current.height(),
            current.channels()
        );
        current = transformation(&current, &action.arguments)?;
    }
    Ok(current)
}

/// The full chain a boundary invokes: decode, validate, apply, encode,
/// with an explicit output container and quality.
pub fn process_as(
    registry: &Registry,
    wire: &str,
    actions: &Value,
    format: OutputFormat,
    quality: u8,
) -> Result<String, PipelineError> {
    let buffer = codec::decode(wire)?;
    let actions = validation::parse_actions(actions)?;
    let result = apply(registry, &buffer, &actions)?;
    Ok(codec::encode(&result, format, quality)?)
}

/// [`process_as`] with the default container (PNG) and quality (100).
pub fn process(registry: &Registry, wire: &str, actions: &Value) -> Result<String, PipelineError> {
    process_as(registry, wire, actions, DEFAULT_FORMAT, DEFAULT_QUALITY)
}
