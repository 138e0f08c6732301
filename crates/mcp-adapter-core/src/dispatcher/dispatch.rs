//! Tool invocation dispatch
//!
//! Resolution, validation, execution and classification for a single tool
//! call. The dispatcher reads catalog snapshots and never holds a catalog
//! lock across backend I/O, so a slow remote tool cannot block refreshes or
//! other dispatches.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::analytics::InvocationRecorder;
use crate::catalog::{Catalog, CatalogError};
use crate::dispatcher::backend::{BackendError, ToolBackend};
use crate::logging::Logger;
use crate::types::{CancellationToken, InvocationOutcome, InvocationRecord, InvocationResult};
use crate::validator::{self, ValidationError};

/// Default per-call execution timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Classified dispatch failures (the error taxonomy for one call)
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("server not found: {0}")]
    ServerNotFound(String),

    #[error("server disabled: {0}")]
    ServerDisabled(String),

    #[error("tool not found: {tool} on server {server}")]
    ToolNotFound { server: String, tool: String },

    #[error("tool disabled: {tool} on server {server}")]
    ToolDisabled { server: String, tool: String },

    #[error("argument parse error: {0}")]
    ArgumentParse(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("execution error: {0}")]
    Execution(String),

    #[error("call timed out after {0:?}")]
    Timeout(Duration),

    #[error("call cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Taxonomy name, surfaced as `error.kind` in invocation results
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ServerNotFound(_) => "ServerNotFound",
            DispatchError::ServerDisabled(_) => "ServerDisabled",
            DispatchError::ToolNotFound { .. } => "ToolNotFound",
            DispatchError::ToolDisabled { .. } => "ToolDisabled",
            DispatchError::ArgumentParse(_) => "ArgumentParseError",
            DispatchError::Validation(ValidationError::MissingRequiredArgument(_)) => {
                "MissingRequiredArgument"
            }
            DispatchError::Validation(ValidationError::UnknownArgument(_)) => "UnknownArgument",
            DispatchError::Validation(ValidationError::TypeMismatch { .. }) => "TypeMismatch",
            DispatchError::Execution(_) => "ExecutionError",
            DispatchError::Timeout(_) => "Timeout",
            DispatchError::Cancelled => "Cancelled",
        }
    }

    /// Outcome bucket for the analytics record
    pub fn outcome(&self) -> InvocationOutcome {
        match self {
            DispatchError::ServerNotFound(_) | DispatchError::ToolNotFound { .. } => {
                InvocationOutcome::NotFound
            }
            DispatchError::ServerDisabled(_) | DispatchError::ToolDisabled { .. } => {
                InvocationOutcome::ServerDisabled
            }
            DispatchError::ArgumentParse(_) | DispatchError::Validation(_) => {
                InvocationOutcome::ValidationError
            }
            DispatchError::Execution(_) => InvocationOutcome::ExecutionError,
            DispatchError::Timeout(_) => InvocationOutcome::Timeout,
            DispatchError::Cancelled => InvocationOutcome::Cancelled,
        }
    }
}

/// Dispatches validated tool invocations against the configured backend.
///
/// Holds shared handles only; cloning-free concurrent use via `Arc`.
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    backend: Arc<dyn ToolBackend>,
    recorder: Arc<dyn InvocationRecorder>,
    logger: Arc<dyn Logger>,
    call_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        catalog: Arc<Catalog>,
        backend: Arc<dyn ToolBackend>,
        recorder: Arc<dyn InvocationRecorder>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            catalog,
            backend,
            recorder,
            logger,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Set the per-call execution timeout (builder pattern)
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Invoke a tool with already-parsed arguments.
    ///
    /// Exactly one [`InvocationRecord`] is emitted per call, whatever the
    /// outcome. No automatic retry: tool side effects must not be silently
    /// duplicated.
    pub async fn invoke(
        &self,
        server: &str,
        tool: &str,
        arguments: Map<String, Value>,
        validate: bool,
        cancel: &CancellationToken,
    ) -> InvocationResult {
        let start = Instant::now();
        let result = self
            .invoke_inner(server, tool, arguments, validate, cancel)
            .await;
        self.finish(server, tool, start, result)
    }

    /// Invoke a tool with arguments supplied as JSON text.
    ///
    /// Empty text means no arguments. Malformed text or a non-object top
    /// level fails with `ArgumentParseError` before validation runs.
    pub async fn invoke_text(
        &self,
        server: &str,
        tool: &str,
        arguments_text: &str,
        validate: bool,
        cancel: &CancellationToken,
    ) -> InvocationResult {
        let start = Instant::now();
        let arguments = match parse_arguments_text(arguments_text) {
            Ok(args) => args,
            Err(err) => return self.finish(server, tool, start, Err(err)),
        };
        let result = self
            .invoke_inner(server, tool, arguments, validate, cancel)
            .await;
        self.finish(server, tool, start, result)
    }

    async fn invoke_inner(
        &self,
        server: &str,
        tool: &str,
        arguments: Map<String, Value>,
        validate: bool,
        cancel: &CancellationToken,
    ) -> Result<Value, DispatchError> {
        // Resolution against a point-in-time snapshot. A refresh landing
        // after this read does not affect the in-flight call.
        let descriptor = match self.catalog.get_server(server) {
            Ok(descriptor) => descriptor,
            Err(CatalogError::ServerNotFound(name)) => {
                return Err(DispatchError::ServerNotFound(name))
            }
            Err(other) => return Err(DispatchError::Execution(other.to_string())),
        };
        if !descriptor.enabled {
            return Err(DispatchError::ServerDisabled(server.to_string()));
        }
        // Stale is a discovery-completeness signal, not an availability
        // veto: stale servers stay dispatchable.

        let tool_descriptor =
            descriptor
                .tool(tool)
                .cloned()
                .ok_or_else(|| DispatchError::ToolNotFound {
                    server: server.to_string(),
                    tool: tool.to_string(),
                })?;
        if !tool_descriptor.enabled {
            return Err(DispatchError::ToolDisabled {
                server: server.to_string(),
                tool: tool.to_string(),
            });
        }
        drop(descriptor);

        let resolved = if validate {
            validator::validate(&tool_descriptor.schema, &arguments)?
        } else {
            arguments
        };

        self.logger.info(&format!(
            "[Dispatcher] Executing '{}' on '{}' via {} backend",
            tool,
            server,
            self.backend.name()
        ));

        // Execution with timeout and cancellation; the catalog lock was
        // released before any await point.
        tokio::select! {
            result = self.backend.execute(server, tool, &resolved) => {
                result.map_err(|e| match e {
                    BackendError::Transport(message) => DispatchError::Execution(message),
                    BackendError::Rejected(message) => DispatchError::Execution(message),
                })
            }
            _ = tokio::time::sleep(self.call_timeout) => {
                Err(DispatchError::Timeout(self.call_timeout))
            }
            _ = cancel.cancelled() => Err(DispatchError::Cancelled),
        }
    }

    /// Classify, record and convert the raw outcome into a result
    fn finish(
        &self,
        server: &str,
        tool: &str,
        start: Instant,
        result: Result<Value, DispatchError>,
    ) -> InvocationResult {
        let duration = start.elapsed();
        let invocation = match result {
            Ok(data) => InvocationResult::success(data, duration),
            Err(err) => {
                self.logger.warn(&format!(
                    "[Dispatcher] '{}' on '{}' failed: {}",
                    tool, server, err
                ));
                InvocationResult::failure(err.outcome(), err.kind(), err.to_string(), duration)
            }
        };
        self.recorder.record(InvocationRecord::new(
            server,
            tool,
            invocation.outcome,
            duration,
        ));
        invocation
    }
}

fn parse_arguments_text(text: &str) -> Result<Map<String, Value>, DispatchError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Map::new());
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| DispatchError::ArgumentParse(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DispatchError::ArgumentParse(format!(
            "arguments must be a JSON object, got {}",
            crate::types::ParamType::type_of(&other)
        ))),
    }
}
