//! Tool backend implementations
//!
//! The backend is the seam between dispatch logic and the concrete server
//! transport. Two variants exist, selected by configuration at construction
//! time: an in-process mock executor and a remote HTTP transport.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::logging::Logger;

/// Errors from a backend execution attempt
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure: connect, timeout, bad payload
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote side answered and reported a tool failure
    #[error("tool failed: {0}")]
    Rejected(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Capability to execute one tool call against a server.
///
/// Implementations must not retry: the dispatcher surfaces one clean
/// failure per call and leaves retry policy to the caller.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &'static str;

    /// Execute `tool` on `server` with fully-resolved arguments
    async fn execute(
        &self,
        server: &str,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> BackendResult<Value>;
}

/// Response mode for the mock backend
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Canned per-tool responses, generic fallback for unknown tools
    #[default]
    Canned,
    /// Always return this value
    Fixed(Value),
    /// Always fail with this message
    Fail(String),
}

/// In-process executor returning deterministic canned responses.
///
/// The canned payloads mirror what the real integrations return so callers
/// can develop against realistic shapes without any server running.
pub struct MockBackend {
    mode: MockMode,
    /// Artificial latency before answering, for timeout/cancellation tests
    delay: Option<Duration>,
    logger: Arc<dyn Logger>,
}

impl MockBackend {
    /// Canned-response backend with no artificial delay
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            mode: MockMode::Canned,
            delay: None,
            logger,
        }
    }

    /// Set the response mode (builder pattern)
    pub fn with_mode(mut self, mode: MockMode) -> Self {
        self.mode = mode;
        self
    }

    /// Delay every execution by `delay` (builder pattern)
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn canned_response(server: &str, tool: &str, args: &Map<String, Value>) -> Value {
        let arg_str = |key: &str, fallback: &str| -> String {
            args.get(key)
                .and_then(Value::as_str)
                .unwrap_or(fallback)
                .to_string()
        };

        match tool {
            "create_issue" => json!({
                "issue_id": 12345,
                "issue_url": format!(
                    "https://github.com/{}/issues/12345",
                    arg_str("repository", "owner/repo")
                ),
                "title": arg_str("title", ""),
                "status": "open",
            }),
            "send_message" => json!({
                "message_id": "1234567890.123456",
                "channel": arg_str("channel", "#general"),
                "status": "sent",
            }),
            "execute_query" => json!({
                "rows_affected": 3,
                "result": [
                    {"id": 1, "name": "John Doe", "active": true},
                    {"id": 2, "name": "Jane Smith", "active": true},
                    {"id": 3, "name": "Bob Johnson", "active": true}
                ],
            }),
            "get_repository" => json!({
                "name": arg_str("repository", "example-repo"),
                "full_name": format!("owner/{}", arg_str("repository", "example-repo")),
                "description": "Example repository",
                "stars": 42,
                "forks": 7,
            }),
            "search_code" => json!({
                "total_count": 15,
                "results": [
                    {"file": "src/main.rs", "line": 25, "match": "fn main()"},
                    {"file": "src/lib.rs", "line": 12, "match": "pub mod main"},
                    {"file": "tests/main.rs", "line": 5, "match": "use crate::main"}
                ],
            }),
            _ => json!({
                "status": "executed",
                "tool": tool,
                "server": server,
                "arguments": Value::Object(args.clone()),
                "message": format!("Tool '{}' executed successfully on '{}'", tool, server),
            }),
        }
    }
}

#[async_trait]
impl ToolBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn execute(
        &self,
        server: &str,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> BackendResult<Value> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.logger.debug(&format!(
            "[MockBackend] Executing '{}' on '{}'",
            tool, server
        ));

        match &self.mode {
            MockMode::Canned => Ok(Self::canned_response(server, tool, arguments)),
            MockMode::Fixed(value) => Ok(value.clone()),
            MockMode::Fail(message) => Err(BackendError::Rejected(message.clone())),
        }
    }
}

/// Remote transport executor: POSTs the call to a per-server tool endpoint.
///
/// The remote side answers `{success, data|error}`; a `success: false`
/// answer is a rejected execution, anything unparsable is a transport error.
pub struct HttpBackend {
    base_url: String,
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl HttpBackend {
    /// Create a backend posting to `{base_url}/{server}/tools/{tool}`
    pub fn new(base_url: impl Into<String>, timeout: Duration, logger: Arc<dyn Logger>) -> Self {
        // A client without the configured timeout would hang on a stalled
        // backend, so a broken TLS backend fails construction outright.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build backend HTTP client");
        Self {
            base_url: base_url.into(),
            http,
            logger,
        }
    }

    fn call_url(&self, server: &str, tool: &str) -> String {
        format!(
            "{}/{}/tools/{}",
            self.base_url.trim_end_matches('/'),
            server,
            tool
        )
    }
}

#[async_trait]
impl ToolBackend for HttpBackend {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn execute(
        &self,
        server: &str,
        tool: &str,
        arguments: &Map<String, Value>,
    ) -> BackendResult<Value> {
        let url = self.call_url(server, tool);
        self.logger
            .debug(&format!("[HttpBackend] POST {}", url));

        let response = self
            .http
            .post(&url)
            .json(&Value::Object(arguments.clone()))
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Transport(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Transport(format!("invalid JSON body: {}", e)))?;

        match body.get("success").and_then(Value::as_bool) {
            Some(true) => Ok(body.get("data").cloned().unwrap_or(Value::Null)),
            Some(false) => {
                let message = body
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("remote tool reported failure");
                Err(BackendError::Rejected(message.to_string()))
            }
            None => Err(BackendError::Transport(
                "response missing 'success' field".to_string(),
            )),
        }
    }
}
