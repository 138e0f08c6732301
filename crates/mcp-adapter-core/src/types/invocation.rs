//! Invocation outcome and record types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, SystemTime};

/// Classified outcome of a single tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationOutcome {
    /// Backend returned successfully
    Success,
    /// Arguments failed parsing or schema validation
    ValidationError,
    /// Backend failed or returned an error
    ExecutionError,
    /// Server (or tool) was disabled
    ServerDisabled,
    /// Server or tool missing from the catalog
    NotFound,
    /// Call exceeded its timeout
    Timeout,
    /// Caller cancelled mid-flight
    Cancelled,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::ValidationError => "validation_error",
            InvocationOutcome::ExecutionError => "execution_error",
            InvocationOutcome::ServerDisabled => "server_disabled",
            InvocationOutcome::NotFound => "not_found",
            InvocationOutcome::Timeout => "timeout",
            InvocationOutcome::Cancelled => "cancelled",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, InvocationOutcome::Success)
    }
}

impl std::fmt::Display for InvocationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral record of one invocation, fed to the analytics counter.
///
/// Used only for aggregate counters; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationRecord {
    /// Server the call targeted
    pub server: String,
    /// Tool the call targeted
    pub tool: String,
    /// Classified outcome
    pub outcome: InvocationOutcome,
    /// Wall-clock duration of the whole invoke, resolution included
    pub duration: Duration,
    /// When the invocation started
    pub timestamp: SystemTime,
}

impl InvocationRecord {
    pub fn new(
        server: impl Into<String>,
        tool: impl Into<String>,
        outcome: InvocationOutcome,
        duration: Duration,
    ) -> Self {
        Self {
            server: server.into(),
            tool: tool.into(),
            outcome,
            duration,
            timestamp: SystemTime::now(),
        }
    }
}

/// Structured error surfaced by a failed invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationError {
    /// Machine-readable error kind (error taxonomy name)
    pub kind: String,
    /// Human-readable detail: which field, which constraint
    pub message: String,
}

/// Result of a dispatched invocation: `{success, data, error}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationResult {
    pub success: bool,
    /// Backend payload on success, `null` otherwise
    #[serde(default)]
    pub data: Value,
    /// Structured failure, `null` on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<InvocationError>,
    /// Classified outcome, mirrored into the analytics record
    pub outcome: InvocationOutcome,
    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

impl InvocationResult {
    /// Build a success result carrying the backend payload
    pub fn success(data: Value, duration: Duration) -> Self {
        Self {
            success: true,
            data,
            error: None,
            outcome: InvocationOutcome::Success,
            duration,
        }
    }

    /// Build a failure result with a classified kind and message
    pub fn failure(
        outcome: InvocationOutcome,
        kind: impl Into<String>,
        message: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            success: false,
            data: Value::Null,
            error: Some(InvocationError {
                kind: kind.into(),
                message: message.into(),
            }),
            outcome,
            duration,
        }
    }
}
