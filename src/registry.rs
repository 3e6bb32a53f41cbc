//! Action Registry - Closed Transformation Table
//!
//! The name -> transformation mapping is assembled once at startup by
//! an explicit builder and never mutated afterwards, so it can be
//! shared across concurrent callers without coordination. No run-time
//! registration is exposed.
//!
//! Each registered entry is also the argument adaptation boundary: it
//! converts the caller's free-form argument map into the operator's
//! typed parameter struct, and any mismatch surfaces as an `Argument`
//! error right here rather than deep inside the operator.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::buffer::PixelBuffer;
use crate::ops::{self, Axis, DerivativeParams, ResizeParams, ThresholdParams};
use crate::pipeline::PipelineError;

/// A caller-supplied keyword-argument map.
pub type Arguments = Map<String, Value>;

/// A registered transformation capability.
pub type Transformation = fn(&PixelBuffer, &Arguments) -> Result<PixelBuffer, PipelineError>;

/// Read-only-after-init name -> transformation table.
pub struct Registry {
    table: HashMap<&'static str, Transformation>,
}

/// Builder that assembles a [`Registry`] deterministically at startup.
pub struct RegistryBuilder {
    table: HashMap<&'static str, Transformation>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add a transformation under a unique name.
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered; the table is a static
    /// startup value and a duplicate is a programming error.
    pub fn register(mut self, name: &'static str, transformation: Transformation) -> Self {
        let previous = self.table.insert(name, transformation);
        assert!(previous.is_none(), "duplicate transformation name: {name}");
        self
    }

    pub fn build(self) -> Registry {
        Registry { table: self.table }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The fixed transformation set exposed to callers.
    pub fn built_in() -> Self {
        Registry::builder()
            .register("gray", apply_gray)
            .register("resize", apply_resize)
            .register("dx", apply_dx)
            .register("dy", apply_dy)
            .register("canny_edges", apply_canny_edges)
            .register("binary", apply_binary)
            .register("binary_inverted", apply_binary_inverted)
            .build()
    }

    pub fn get(&self, name: &str) -> Option<Transformation> {
        self.table.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Registered names, sorted for stable listings.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.table.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::built_in()
    }
}

/// Adapt a generic argument map into a typed parameter struct.
fn params<T: DeserializeOwned>(action: &str, arguments: &Arguments) -> Result<T, PipelineError> {
    serde_json::from_value(Value::Object(arguments.clone())).map_err(|err| {
        PipelineError::Argument {
            action: action.to_string(),
            reason: err.to_string(),
        }
    })
}

fn argument_error(action: &str, reason: String) -> PipelineError {
    PipelineError::Argument {
        action: action.to_string(),
        reason,
    }
}

fn apply_gray(buffer: &PixelBuffer, arguments: &Arguments) -> Result<PixelBuffer, PipelineError> {
    if let Some(key) = arguments.keys().next() {
        return Err(argument_error("gray", format!("unexpected argument `{key}`")));
    }
    Ok(ops::gray(buffer))
}

fn apply_resize(buffer: &PixelBuffer, arguments: &Arguments) -> Result<PixelBuffer, PipelineError> {
    let p: ResizeParams = params("resize", arguments)?;
    p.validate().map_err(|reason| argument_error("resize", reason))?;
    Ok(ops::resize(buffer, &p))
}

fn apply_dx(buffer: &PixelBuffer, arguments: &Arguments) -> Result<PixelBuffer, PipelineError> {
    let p: DerivativeParams = params("dx", arguments)?;
    p.validate().map_err(|reason| argument_error("dx", reason))?;
    Ok(ops::derivative(buffer, Axis::Horizontal, &p))
}

fn apply_dy(buffer: &PixelBuffer, arguments: &Arguments) -> Result<PixelBuffer, PipelineError> {
    let p: DerivativeParams = params("dy", arguments)?;
    p.validate().map_err(|reason| argument_error("dy", reason))?;
    Ok(ops::derivative(buffer, Axis::Vertical, &p))
}

fn apply_canny_edges(
    buffer: &PixelBuffer,
    arguments: &Arguments,
) -> Result<PixelBuffer, PipelineError> {
    let p: ThresholdParams = params("canny_edges", arguments)?;
    Ok(ops::canny_edges(buffer, &p))
}

fn apply_binary(buffer: &PixelBuffer, arguments: &Arguments) -> Result<PixelBuffer, PipelineError> {
    let p: ThresholdParams = params("binary", arguments)?;
    Ok(ops::threshold(buffer, &p, false))
}

fn apply_binary_inverted(
    buffer: &PixelBuffer,
    arguments: &Arguments,
) -> Result<PixelBuffer, PipelineError> {
    let p: ThresholdParams = params("binary_inverted", arguments)?;
    Ok(ops::threshold(buffer, &p, true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_table_is_complete() {
        let registry = Registry::built_in();
        assert_eq!(
            registry.names(),
            vec![
                "binary",
                "binary_inverted",
                "canny_edges",
                "dx",
                "dy",
                "gray",
                "resize",
            ]
        );
    }

    #[test]
    #[should_panic(expected = "duplicate transformation name")]
    fn duplicate_name_is_rejected_at_build_time() {
        let _ = Registry::builder()
            .register("gray", apply_gray)
            .register("gray", apply_gray);
    }

    #[test]
    fn unknown_argument_is_an_argument_error() {
        let registry = Registry::built_in();
        let gray = registry.get("gray").unwrap();
        let buffer = PixelBuffer::from_samples(2, 2, 1, vec![0; 4]);
        let mut arguments = Arguments::new();
        arguments.insert("oops".to_string(), Value::from(1));
        assert!(matches!(
            gray(&buffer, &arguments),
            Err(PipelineError::Argument { .. })
        ));
    }

    #[test]
    fn missing_required_argument_is_an_argument_error() {
        let registry = Registry::built_in();
        let resize = registry.get("resize").unwrap();
        let buffer = PixelBuffer::from_samples(2, 2, 1, vec![0; 4]);
        let err = resize(&buffer, &Arguments::new()).unwrap_err();
        assert!(matches!(err, PipelineError::Argument { .. }));
    }
}
