//! Argument schema types for tool parameters

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Type tag for a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

impl ParamType {
    /// Human-readable name of the type tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
        }
    }

    /// Check whether a JSON value matches this type tag.
    ///
    /// Numbers accept both integer and floating representations.
    /// Booleans must be literal booleans, never truthy strings.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
        }
    }

    /// Describe the runtime type of a JSON value (for error messages)
    pub fn type_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specification of a single tool parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Declared type of the parameter
    #[serde(rename = "type")]
    pub kind: ParamType,
    /// Whether the parameter must be present in a call
    #[serde(default)]
    pub required: bool,
    /// Default applied when an optional parameter is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParamSpec {
    /// Create a required parameter of the given type
    pub fn required(kind: ParamType) -> Self {
        Self {
            kind,
            required: true,
            default: None,
            description: None,
        }
    }

    /// Create an optional parameter of the given type
    pub fn optional(kind: ParamType) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            description: None,
        }
    }

    /// Set the default value (builder pattern)
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Argument schema for a tool: parameter name to spec, plus extras policy.
///
/// Uses a `BTreeMap` so serialized schemas and error reporting are
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Declared parameters by name
    #[serde(default)]
    pub params: BTreeMap<String, ParamSpec>,
    /// Whether undeclared argument names are accepted
    #[serde(default)]
    pub allow_extra: bool,
}

impl ArgumentSchema {
    /// Create an empty schema (no parameters, extras rejected)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder pattern)
    pub fn with_param(mut self, name: impl Into<String>, spec: ParamSpec) -> Self {
        self.params.insert(name.into(), spec);
        self
    }

    /// Allow undeclared argument names to pass through (builder pattern)
    pub fn with_extras_allowed(mut self) -> Self {
        self.allow_extra = true;
        self
    }

    /// Look up a parameter spec by name
    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name)
    }

    /// Names of all required parameters
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
    }

    /// Check the invariant that required parameters carry no default
    pub fn is_well_formed(&self) -> bool {
        self.params
            .values()
            .all(|spec| !(spec.required && spec.default.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_param_type_matches() {
        assert!(ParamType::String.matches(&json!("x")));
        assert!(ParamType::Number.matches(&json!(5)));
        assert!(ParamType::Number.matches(&json!(5.5)));
        assert!(ParamType::Boolean.matches(&json!(true)));
        assert!(ParamType::Object.matches(&json!({})));
        assert!(ParamType::Array.matches(&json!([])));

        // Truthy strings are not booleans
        assert!(!ParamType::Boolean.matches(&json!("true")));
        // Numeric strings are not numbers
        assert!(!ParamType::Number.matches(&json!("5")));
    }

    #[test]
    fn test_schema_builder() {
        let schema = ArgumentSchema::new()
            .with_param("title", ParamSpec::required(ParamType::String))
            .with_param(
                "limit",
                ParamSpec::optional(ParamType::Number).with_default(json!(10)),
            );

        assert_eq!(schema.params.len(), 2);
        assert!(schema.get("title").unwrap().required);
        assert_eq!(schema.get("limit").unwrap().default, Some(json!(10)));
        assert_eq!(schema.required_params().collect::<Vec<_>>(), vec!["title"]);
        assert!(schema.is_well_formed());
    }

    #[test]
    fn test_required_with_default_is_malformed() {
        let schema = ArgumentSchema::new().with_param(
            "bad",
            ParamSpec::required(ParamType::String).with_default(json!("x")),
        );
        assert!(!schema.is_well_formed());
    }

    #[test]
    fn test_schema_serde_round_trip() {
        let schema = ArgumentSchema::new()
            .with_param(
                "query",
                ParamSpec::required(ParamType::String).with_description("Search query"),
            )
            .with_extras_allowed();

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["params"]["query"]["type"], "string");

        let parsed: ArgumentSchema = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, schema);
    }
}
