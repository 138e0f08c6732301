//! Schema-based argument validation
//!
//! Pure and side-effect free: validation never touches the catalog or the
//! network. The dispatcher runs this before handing arguments to a backend.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::types::{ArgumentSchema, ParamType};

/// Errors produced by argument validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A parameter marked required is absent from the arguments
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(String),

    /// An argument name is not declared in the schema
    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    /// An argument's runtime type does not match its declared type tag
    #[error("type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ParamType,
        actual: &'static str,
    },
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate `arguments` against `schema` and resolve defaults.
///
/// Checks run in a fixed order so callers get deterministic failures:
/// required presence, then unknown names, then types. On success the
/// returned map carries every supplied argument plus declared defaults for
/// absent optional parameters.
pub fn validate(
    schema: &ArgumentSchema,
    arguments: &Map<String, Value>,
) -> ValidationResult<Map<String, Value>> {
    // 1. Every required parameter must be present
    for name in schema.required_params() {
        if !arguments.contains_key(name) {
            return Err(ValidationError::MissingRequiredArgument(name.to_string()));
        }
    }

    // 2. No undeclared names unless the schema allows extras
    if !schema.allow_extra {
        for name in arguments.keys() {
            if schema.get(name).is_none() {
                return Err(ValidationError::UnknownArgument(name.clone()));
            }
        }
    }

    // 3. Declared parameters that are present must match their type tag
    for (name, value) in arguments {
        if let Some(spec) = schema.get(name) {
            if !spec.kind.matches(value) {
                return Err(ValidationError::TypeMismatch {
                    name: name.clone(),
                    expected: spec.kind,
                    actual: ParamType::type_of(value),
                });
            }
        }
    }

    // 4. Resolve defaults for absent optional parameters
    let mut resolved = arguments.clone();
    for (name, spec) in &schema.params {
        if !resolved.contains_key(name) {
            if let Some(default) = &spec.default {
                resolved.insert(name.clone(), default.clone());
            }
        }
    }

    Ok(resolved)
}
