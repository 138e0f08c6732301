//! MCP Adapter Core
//!
//! Runtime-agnostic MCP server catalog and tool invocation engine.
//! This crate provides the core functionality that can be used from any
//! environment (native CLI, plugin host, service embedding).
//!
//! ## Catalog and Dispatch
//!
//! The catalog holds server descriptors discovered from a registry (or the
//! built-in mock dataset); the dispatcher validates arguments against each
//! tool's schema and executes the call through a pluggable backend.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mcp_adapter_core::{McpAdapter, AdapterSettings, ConsoleLogger};
//!
//! let adapter = McpAdapter::new(AdapterSettings::mock(), Arc::new(ConsoleLogger::new()));
//! adapter.refresh().await;
//!
//! // Invoke a tool; arguments arrive as JSON text from the host
//! let envelope = adapter
//!     .invoke("github-mcp", "create_issue", r#"{"repository": "a/b", "title": "t"}"#, true)
//!     .await;
//! ```

pub mod types;
pub mod logging;
pub mod config;
pub mod validator;
pub mod catalog;
pub mod registry;
pub mod dispatcher;
pub mod analytics;
pub mod facade;

// Re-export commonly used types
pub use types::{
    ArgumentSchema, ParamSpec, ParamType,
    ServerDescriptor, ToolDescriptor, DescriptorOrigin, ServerFilter,
    InvocationOutcome, InvocationRecord, InvocationResult, InvocationError,
    ResponseEnvelope,
    CancellationToken,
};

pub use logging::{Logger, NoOpLogger, ConsoleLogger, FileLogger, LogLevel};

pub use config::{AdapterSettings, ConfigProvider, MemoryConfigProvider, FileConfigProvider};

pub use validator::{validate, ValidationError, ValidationResult};

pub use catalog::{Catalog, CatalogError, CatalogResult, CatalogStatus, RefreshStats};

pub use registry::{RegistryClient, RegistryError, mock_registry_servers};

pub use dispatcher::{
    Dispatcher, DispatchError, ToolBackend, MockBackend, MockMode, HttpBackend, BackendError,
};

pub use analytics::{AnalyticsCounter, AnalyticsSnapshot, InvocationRecorder, NoOpRecorder};

pub use facade::{McpAdapter, RefreshSource};
