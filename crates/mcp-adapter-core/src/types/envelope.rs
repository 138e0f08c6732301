//! Standard response envelope for boundary operations
//!
//! Every facade operation returns `{success, data, message, error}` so the
//! HTTP layer and the calling agent only ever (de)serialize one shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable envelope wrapping every boundary response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub success: bool,
    /// Operation payload, `null` when there is none
    #[serde(default)]
    pub data: Value,
    /// Short human-readable summary of what happened
    pub message: String,
    /// Error description, `null` on success
    #[serde(default)]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful response with a payload
    pub fn ok(data: Value, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
            error: None,
        }
    }

    /// Failed response; `data` stays null
    pub fn err(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Value::Null,
            message: message.into(),
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ok_envelope() {
        let env = ResponseEnvelope::ok(json!({"count": 3}), "listed 3 servers");
        assert!(env.success);
        assert!(env.error.is_none());
        assert_eq!(env.data["count"], 3);
    }

    #[test]
    fn test_err_envelope() {
        let env = ResponseEnvelope::err("server 'x' not found", "lookup failed");
        assert!(!env.success);
        assert_eq!(env.data, Value::Null);
        assert_eq!(env.error.as_deref(), Some("server 'x' not found"));
    }
}
