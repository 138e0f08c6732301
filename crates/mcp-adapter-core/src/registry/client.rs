//! HTTP client for the server registry endpoint

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::logging::Logger;
use crate::types::{ArgumentSchema, DescriptorOrigin, ServerDescriptor, ToolDescriptor};

/// Default timeout for a registry fetch
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Registry acquisition errors
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The endpoint could not be reached (connect failure or timeout)
    #[error("registry unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered, but not with a well-formed descriptor array
    #[error("registry response malformed: {0}")]
    Malformed(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Wire shape of one registry entry: `{name, description?, tags?, tools}`
#[derive(Debug, Deserialize)]
struct WireServer {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
    tools: Vec<WireTool>,
}

#[derive(Debug, Deserialize)]
struct WireTool {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    schema: ArgumentSchema,
    #[serde(default)]
    examples: Vec<Value>,
}

/// Client for fetching server descriptors from the remote registry.
///
/// Enforces a request timeout and treats non-2xx responses and wrong-shape
/// payloads as [`RegistryError::Malformed`]. Contains no fallback policy;
/// the refresh orchestrator decides what to do on failure.
pub struct RegistryClient {
    http: reqwest::Client,
    logger: Arc<dyn Logger>,
}

impl RegistryClient {
    /// Create a client with the default fetch timeout
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self::with_timeout(DEFAULT_FETCH_TIMEOUT, logger)
    }

    /// Create a client with an explicit fetch timeout
    pub fn with_timeout(timeout: Duration, logger: Arc<dyn Logger>) -> Self {
        // A client without the configured timeout would hang on a stalled
        // registry, so a broken TLS backend fails construction outright.
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build registry HTTP client");
        Self { http, logger }
    }

    /// Fetch the descriptor list from `url`.
    ///
    /// The endpoint must return a top-level JSON array of
    /// `{name, tools: [{name, schema, examples}]}` objects; any other shape
    /// is malformed.
    pub async fn fetch(&self, url: &str) -> RegistryResult<Vec<ServerDescriptor>> {
        self.logger
            .info(&format!("[RegistryClient] Fetching servers from {}", url));

        let response = self.http.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                RegistryError::Unreachable(e.to_string())
            } else {
                RegistryError::Malformed(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Malformed(format!(
                "unexpected status {}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RegistryError::Malformed(format!("invalid JSON body: {}", e)))?;

        let servers = parse_descriptor_array(body)?;
        self.logger.info(&format!(
            "[RegistryClient] Fetched {} server descriptors",
            servers.len()
        ));
        Ok(servers)
    }
}

/// Parse and validate the wire payload into catalog descriptors
fn parse_descriptor_array(body: Value) -> RegistryResult<Vec<ServerDescriptor>> {
    if !body.is_array() {
        return Err(RegistryError::Malformed(
            "top-level value is not an array".to_string(),
        ));
    }

    let wire: Vec<WireServer> = serde_json::from_value(body)
        .map_err(|e| RegistryError::Malformed(format!("bad descriptor entry: {}", e)))?;

    let mut servers = Vec::with_capacity(wire.len());
    for entry in wire {
        if entry.name.is_empty() {
            return Err(RegistryError::Malformed(
                "server entry with empty name".to_string(),
            ));
        }
        let mut server = ServerDescriptor::new(&entry.name, DescriptorOrigin::Registry)
            .with_description(entry.description)
            .with_tags(entry.tags);
        for tool in entry.tools {
            if tool.name.is_empty() {
                return Err(RegistryError::Malformed(format!(
                    "tool entry with empty name on server '{}'",
                    entry.name
                )));
            }
            server.tools.push(
                ToolDescriptor::new(&tool.name)
                    .with_description(tool.description)
                    .with_schema(tool.schema),
            );
            if let Some(last) = server.tools.last_mut() {
                last.examples = tool.examples;
            }
        }
        servers.push(server);
    }
    Ok(servers)
}
