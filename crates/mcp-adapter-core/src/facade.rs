//! Top-level adapter facade
//!
//! Composes the catalog, registry client, dispatcher and analytics counter
//! behind a small set of operations that all return [`ResponseEnvelope`].
//! This is the boundary an embedding host (CLI, plugin runtime) talks to;
//! everything below it uses typed results.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::analytics::{AnalyticsCounter, InvocationRecorder};
use crate::catalog::Catalog;
use crate::config::{AdapterSettings, ConfigProvider};
use crate::dispatcher::{Dispatcher, HttpBackend, MockBackend, ToolBackend};
use crate::logging::Logger;
use crate::registry::{mock_registry_servers, RegistryClient};
use crate::types::{
    CancellationToken, DescriptorOrigin, ResponseEnvelope, ServerDescriptor, ServerFilter,
};

/// Where the last refresh got its data from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSource {
    Registry,
    Mock,
}

impl RefreshSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshSource::Registry => "registry",
            RefreshSource::Mock => "mock",
        }
    }
}

/// The adapter facade.
///
/// Cheap to share: wrap in an `Arc` and call from any task.
pub struct McpAdapter {
    settings: AdapterSettings,
    logger: Arc<dyn Logger>,
    catalog: Arc<Catalog>,
    registry: RegistryClient,
    analytics: Arc<AnalyticsCounter>,
    dispatcher: Dispatcher,
}

impl McpAdapter {
    /// Build an adapter from settings, choosing the backend they imply.
    ///
    /// `use_mock_data` (or a missing `registry_url`) selects the canned mock
    /// backend; otherwise tool calls go over HTTP to the registry host.
    pub fn new(settings: AdapterSettings, logger: Arc<dyn Logger>) -> Self {
        let call_timeout = Duration::from_secs(settings.call_timeout_secs);
        let backend: Arc<dyn ToolBackend> = match (&settings.registry_url, settings.use_mock_data) {
            (Some(url), false) => {
                Arc::new(HttpBackend::new(url.clone(), call_timeout, Arc::clone(&logger)))
            }
            _ => Arc::new(MockBackend::new(Arc::clone(&logger))),
        };
        Self::with_backend(settings, backend, logger)
    }

    /// Build an adapter with an explicitly injected execution backend
    pub fn with_backend(
        settings: AdapterSettings,
        backend: Arc<dyn ToolBackend>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        let catalog = Arc::new(Catalog::new(Arc::clone(&logger)));
        let registry = RegistryClient::with_timeout(
            Duration::from_secs(settings.request_timeout_secs),
            Arc::clone(&logger),
        );
        let analytics = Arc::new(AnalyticsCounter::new());
        let dispatcher = Dispatcher::new(
            Arc::clone(&catalog),
            backend,
            Arc::clone(&analytics) as Arc<dyn InvocationRecorder>,
            Arc::clone(&logger),
        )
        .with_call_timeout(Duration::from_secs(settings.call_timeout_secs));

        Self {
            settings,
            logger,
            catalog,
            registry,
            analytics,
            dispatcher,
        }
    }

    /// Build an adapter from a configuration provider
    pub async fn from_config(config: &dyn ConfigProvider, logger: Arc<dyn Logger>) -> Self {
        let settings = config.get_settings().await;
        Self::new(settings, logger)
    }

    pub fn settings(&self) -> &AdapterSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn analytics(&self) -> &Arc<AnalyticsCounter> {
        &self.analytics
    }

    /// Refresh the catalog from the configured source.
    ///
    /// The mock dataset is served only under the explicit mock policy
    /// (`use_mock_data`, or no registry URL configured). A fetch failure
    /// never substitutes mock data: it propagates as a failed envelope and
    /// the catalog keeps its previous state.
    pub async fn refresh(&self) -> ResponseEnvelope {
        let (batch, origin, source) = match (
            &self.settings.registry_url,
            self.settings.use_mock_data,
        ) {
            (Some(url), false) => match self.registry.fetch(url).await {
                Ok(batch) => (batch, DescriptorOrigin::Registry, RefreshSource::Registry),
                Err(err) => {
                    self.logger
                        .warn(&format!("[McpAdapter] Registry fetch failed: {}", err));
                    return ResponseEnvelope::err(err.to_string(), "Catalog refresh failed");
                }
            },
            _ => (
                mock_registry_servers(),
                DescriptorOrigin::Mock,
                RefreshSource::Mock,
            ),
        };

        let stats = self.catalog.refresh(batch, origin);
        let status = self.catalog.status();

        let message = match source {
            RefreshSource::Registry => {
                format!("Refreshed {} servers from registry", status.total_servers)
            }
            RefreshSource::Mock => {
                format!("Loaded {} servers from mock dataset", status.total_servers)
            }
        };

        ResponseEnvelope::ok(
            json!({
                "source": source.as_str(),
                "added": stats.added,
                "updated": stats.updated,
                "marked_stale": stats.marked_stale,
                "total_servers": status.total_servers,
            }),
            message,
        )
    }

    /// List catalog servers as summary rows
    pub fn list_servers(&self, filter: ServerFilter) -> ResponseEnvelope {
        let servers = self.catalog.list_servers(filter);
        let count = servers.len();
        let rows: Vec<Value> = servers.iter().map(server_summary).collect();
        ResponseEnvelope::ok(json!({ "servers": rows }), format!("{} servers", count))
    }

    /// Full descriptor for one server, tools and schemas included
    pub fn get_server_details(&self, name: &str) -> ResponseEnvelope {
        match self.catalog.get_server(name) {
            Ok(server) => match serde_json::to_value(&server) {
                Ok(value) => {
                    ResponseEnvelope::ok(value, format!("Server '{}'", name))
                }
                Err(err) => ResponseEnvelope::err(err.to_string(), "Serialization failed"),
            },
            Err(err) => ResponseEnvelope::err(err.to_string(), "Server lookup failed"),
        }
    }

    /// Aggregate catalog counts
    pub fn get_status(&self) -> ResponseEnvelope {
        let status = self.catalog.status();
        ResponseEnvelope::ok(
            json!({
                "total_servers": status.total_servers,
                "enabled_servers": status.enabled_servers,
                "stale_servers": status.stale_servers,
                "total_tools": status.total_tools,
            }),
            "Catalog status",
        )
    }

    /// Enable or disable a server
    pub fn set_enabled(&self, name: &str, enabled: bool) -> ResponseEnvelope {
        match self.catalog.set_enabled(name, enabled) {
            Ok(previous) => ResponseEnvelope::ok(
                json!({ "server": name, "enabled": enabled, "previous": previous }),
                format!(
                    "Server '{}' {}",
                    name,
                    if enabled { "enabled" } else { "disabled" }
                ),
            ),
            Err(err) => ResponseEnvelope::err(err.to_string(), "Server lookup failed"),
        }
    }

    /// Enable or disable a single tool on a server
    pub fn set_tool_enabled(&self, server: &str, tool: &str, enabled: bool) -> ResponseEnvelope {
        match self.catalog.set_tool_enabled(server, tool, enabled) {
            Ok(previous) => ResponseEnvelope::ok(
                json!({ "server": server, "tool": tool, "enabled": enabled, "previous": previous }),
                format!(
                    "Tool '{}' on '{}' {}",
                    tool,
                    server,
                    if enabled { "enabled" } else { "disabled" }
                ),
            ),
            Err(err) => ResponseEnvelope::err(err.to_string(), "Tool lookup failed"),
        }
    }

    /// Drop stale servers from the catalog
    pub fn purge_stale(&self) -> ResponseEnvelope {
        let removed = self.catalog.purge_stale();
        ResponseEnvelope::ok(
            json!({ "removed": removed }),
            format!("Purged {} stale servers", removed),
        )
    }

    /// Usage counters, snapshot-consistent
    pub fn analytics_snapshot(&self) -> ResponseEnvelope {
        let snapshot = self.analytics.snapshot();
        match serde_json::to_value(&snapshot) {
            Ok(value) => ResponseEnvelope::ok(value, "Usage analytics"),
            Err(err) => ResponseEnvelope::err(err.to_string(), "Serialization failed"),
        }
    }

    /// Invoke a tool with arguments supplied as JSON text
    pub async fn invoke(
        &self,
        server: &str,
        tool: &str,
        arguments_text: &str,
        validate: bool,
    ) -> ResponseEnvelope {
        self.invoke_with_token(
            server,
            tool,
            arguments_text,
            validate,
            &CancellationToken::new(),
        )
        .await
    }

    /// Invoke a tool with an externally held cancellation token
    pub async fn invoke_with_token(
        &self,
        server: &str,
        tool: &str,
        arguments_text: &str,
        validate: bool,
        cancel: &CancellationToken,
    ) -> ResponseEnvelope {
        let result = self
            .dispatcher
            .invoke_text(server, tool, arguments_text, validate, cancel)
            .await;

        if result.success {
            ResponseEnvelope::ok(
                json!({
                    "result": result.data,
                    "outcome": result.outcome.as_str(),
                    "duration_ms": result.duration.as_millis() as u64,
                }),
                format!("Tool '{}' executed on '{}'", tool, server),
            )
        } else {
            let error = result
                .error
                .map(|e| format!("{}: {}", e.kind, e.message))
                .unwrap_or_else(|| "unknown error".to_string());
            ResponseEnvelope::err(error, format!("Tool '{}' failed on '{}'", tool, server))
        }
    }

    /// Spawn a background task that refreshes the catalog periodically.
    ///
    /// Returns immediately when auto refresh is disabled in the settings.
    /// The task stops when `cancel` fires.
    pub fn spawn_auto_refresh(
        adapter: Arc<Self>,
        cancel: CancellationToken,
    ) -> Option<tokio::task::JoinHandle<()>> {
        if !adapter.settings.auto_refresh {
            return None;
        }
        let interval = Duration::from_secs(adapter.settings.refresh_interval_secs.max(1));
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; the initial refresh is the
            // caller's responsibility.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let envelope = adapter.refresh().await;
                        if !envelope.success {
                            adapter.logger.warn(&format!(
                                "[McpAdapter] Auto refresh failed: {}",
                                envelope.error.as_deref().unwrap_or("unknown")
                            ));
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
        }))
    }
}

fn server_summary(server: &ServerDescriptor) -> Value {
    json!({
        "name": server.name,
        "description": server.description,
        "tags": server.tags,
        "enabled": server.enabled,
        "stale": server.stale,
        "origin": server.origin.as_str(),
        "tool_count": server.tools.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::registry::MOCK_SERVER_NAMES;

    fn mock_adapter() -> McpAdapter {
        McpAdapter::new(AdapterSettings::mock(), Arc::new(NoOpLogger::new()))
    }

    #[tokio::test]
    async fn test_refresh_mock_source() {
        let adapter = mock_adapter();
        let envelope = adapter.refresh().await;

        assert!(envelope.success);
        assert_eq!(envelope.data["source"], "mock");
        assert_eq!(
            envelope.data["total_servers"].as_u64().unwrap() as usize,
            MOCK_SERVER_NAMES.len()
        );
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates_without_mock_policy() {
        // Port 1 is never listening. With the mock policy off, the fetch
        // failure must surface as a failed envelope, never as mock data.
        let settings =
            AdapterSettings::default().with_registry_url("http://127.0.0.1:1/servers");
        let adapter = McpAdapter::new(settings, Arc::new(NoOpLogger::new()));

        let envelope = adapter.refresh().await;
        assert!(!envelope.success);
        assert!(envelope.error.as_ref().unwrap().contains("unreachable"));
        // The catalog is untouched by the failed refresh
        assert!(adapter.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_mock_policy_wins_over_registry_url() {
        // use_mock_data set: the registry is never contacted, even when a
        // URL is configured (and even an unreachable one)
        let settings = AdapterSettings::mock().with_registry_url("http://127.0.0.1:1/servers");
        let adapter = McpAdapter::new(settings, Arc::new(NoOpLogger::new()));

        let envelope = adapter.refresh().await;
        assert!(envelope.success);
        assert_eq!(envelope.data["source"], "mock");
        assert_eq!(
            envelope.data["total_servers"].as_u64().unwrap() as usize,
            MOCK_SERVER_NAMES.len()
        );
    }

    #[tokio::test]
    async fn test_list_and_details() {
        let adapter = mock_adapter();
        adapter.refresh().await;

        let list = adapter.list_servers(ServerFilter::all());
        assert!(list.success);
        assert_eq!(
            list.data["servers"].as_array().unwrap().len(),
            MOCK_SERVER_NAMES.len()
        );

        let details = adapter.get_server_details("github-mcp");
        assert!(details.success);
        assert_eq!(details.data["name"], "github-mcp");
        assert!(!details.data["tools"].as_array().unwrap().is_empty());

        let missing = adapter.get_server_details("ghost");
        assert!(!missing.success);
        assert!(missing.error.unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_enable_disable_roundtrip() {
        let adapter = mock_adapter();
        adapter.refresh().await;

        let disabled = adapter.set_enabled("github-mcp", false);
        assert!(disabled.success);
        assert_eq!(disabled.data["previous"], true);

        let status = adapter.get_status();
        assert_eq!(
            status.data["enabled_servers"].as_u64().unwrap() as usize,
            MOCK_SERVER_NAMES.len() - 1
        );

        let filtered = adapter.list_servers(ServerFilter::enabled());
        assert_eq!(
            filtered.data["servers"].as_array().unwrap().len(),
            MOCK_SERVER_NAMES.len() - 1
        );
    }

    #[tokio::test]
    async fn test_invoke_success_and_analytics() {
        let adapter = mock_adapter();
        adapter.refresh().await;

        let envelope = adapter
            .invoke(
                "github-mcp",
                "create_issue",
                r#"{"repository": "a/b", "title": "t"}"#,
                true,
            )
            .await;
        assert!(envelope.success);
        assert_eq!(envelope.data["outcome"], "success");

        let analytics = adapter.analytics_snapshot();
        assert!(analytics.success);
        assert_eq!(analytics.data["total_calls"], 1);
    }

    #[tokio::test]
    async fn test_invoke_validation_failure_envelope() {
        let adapter = mock_adapter();
        adapter.refresh().await;

        let envelope = adapter
            .invoke("github-mcp", "create_issue", r#"{"title": "t"}"#, true)
            .await;
        assert!(!envelope.success);
        assert!(envelope
            .error
            .as_ref()
            .unwrap()
            .starts_with("MissingRequiredArgument"));
    }

    #[tokio::test]
    async fn test_purge_stale_via_facade() {
        let adapter = mock_adapter();
        adapter.refresh().await;
        adapter.catalog().refresh(Vec::new(), DescriptorOrigin::Mock);

        let purged = adapter.purge_stale();
        assert!(purged.success);
        assert_eq!(
            purged.data["removed"].as_u64().unwrap() as usize,
            MOCK_SERVER_NAMES.len()
        );
        assert!(adapter.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_auto_refresh_disabled_returns_none() {
        let adapter = Arc::new(mock_adapter());
        let handle = McpAdapter::spawn_auto_refresh(adapter, CancellationToken::new());
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_auto_refresh_task_stops_on_cancel() {
        let mut settings = AdapterSettings::mock();
        settings.auto_refresh = true;
        settings.refresh_interval_secs = 1;
        let adapter = Arc::new(McpAdapter::new(settings, Arc::new(NoOpLogger::new())));

        let cancel = CancellationToken::new();
        let handle = McpAdapter::spawn_auto_refresh(Arc::clone(&adapter), cancel.clone()).unwrap();
        cancel.cancel();
        handle.await.unwrap();
    }
}
