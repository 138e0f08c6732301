//! Catalog storage and refresh protocol

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::Logger;
use crate::types::{DescriptorOrigin, ServerDescriptor, ServerFilter, ToolDescriptor};

/// Errors from catalog operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("server not found: {0}")]
    ServerNotFound(String),

    #[error("tool not found: {tool} on server {server}")]
    ToolNotFound { server: String, tool: String },

    #[error("server already exists: {0}")]
    ServerExists(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Counts returned by a refresh merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshStats {
    /// Servers newly inserted by this refresh
    pub added: usize,
    /// Existing servers whose tool list and last_seen were updated
    pub updated: usize,
    /// Servers absent from the batch and marked stale
    pub marked_stale: usize,
}

/// Aggregate counts for dashboard consumption
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStatus {
    pub total_servers: usize,
    pub enabled_servers: usize,
    pub stale_servers: usize,
    pub total_tools: usize,
}

/// The authoritative map of servers -> tools -> schemas -> enabled state.
///
/// Concurrency: readers take clone-snapshots under a read lock; every
/// mutator (refresh included) holds the write lock for its whole critical
/// section, so mutations are mutually exclusive and a reader sees either
/// the pre- or post-refresh state, never an interleaving. The merge is pure
/// in-memory work, no I/O ever happens under the lock.
pub struct Catalog {
    servers: RwLock<HashMap<String, ServerDescriptor>>,
    logger: Arc<dyn Logger>,
}

impl Catalog {
    /// Create an empty catalog
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            servers: RwLock::new(HashMap::new()),
            logger,
        }
    }

    /// Merge a freshly fetched batch of descriptors into the catalog.
    ///
    /// Merge policy:
    /// - existing server: tool list, description, tags, origin and
    ///   `last_seen` are updated; the operator's server `enabled` flag and
    ///   any per-tool disable survive; `stale` is cleared
    /// - new server: inserted as-is, enabled by default
    /// - server missing from the batch: marked stale, never deleted
    pub fn refresh(
        &self,
        batch: Vec<ServerDescriptor>,
        origin: DescriptorOrigin,
    ) -> RefreshStats {
        let now = SystemTime::now();
        let mut stats = RefreshStats::default();

        // Merge under the write lock: a concurrent set_enabled or
        // add/remove either lands before the merge and is carried over, or
        // waits for it. Nothing here blocks on I/O.
        let mut servers = self.servers.write();
        let mut seen: Vec<String> = Vec::with_capacity(batch.len());

        for mut incoming in batch {
            incoming.origin = origin;
            incoming.last_seen = now;
            incoming.stale = false;
            seen.push(incoming.name.clone());

            match servers.get(&incoming.name) {
                Some(existing) => {
                    incoming.enabled = existing.enabled;
                    carry_tool_states(&mut incoming.tools, &existing.tools);
                    stats.updated += 1;
                }
                None => {
                    stats.added += 1;
                }
            }
            servers.insert(incoming.name.clone(), incoming);
        }

        for (name, server) in servers.iter_mut() {
            if !seen.contains(name) && !server.stale {
                server.stale = true;
                stats.marked_stale += 1;
            }
        }
        drop(servers);

        self.logger.info(&format!(
            "[Catalog] Refresh from {} source - added: {}, updated: {}, marked stale: {}",
            origin.as_str(),
            stats.added,
            stats.updated,
            stats.marked_stale
        ));

        stats
    }

    /// Snapshot of servers matching the filter, sorted by name
    pub fn list_servers(&self, filter: ServerFilter) -> Vec<ServerDescriptor> {
        let mut servers: Vec<_> = self
            .servers
            .read()
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        servers.sort_by(|a, b| a.name.cmp(&b.name));
        servers
    }

    /// Snapshot of one server by exact name (stale servers included)
    pub fn get_server(&self, name: &str) -> CatalogResult<ServerDescriptor> {
        self.servers
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| CatalogError::ServerNotFound(name.to_string()))
    }

    /// Snapshot of one tool descriptor
    pub fn get_tool(&self, server: &str, tool: &str) -> CatalogResult<ToolDescriptor> {
        let servers = self.servers.read();
        let descriptor = servers
            .get(server)
            .ok_or_else(|| CatalogError::ServerNotFound(server.to_string()))?;
        descriptor
            .tool(tool)
            .cloned()
            .ok_or_else(|| CatalogError::ToolNotFound {
                server: server.to_string(),
                tool: tool.to_string(),
            })
    }

    /// Flip a server's enabled flag, returning the prior value
    pub fn set_enabled(&self, name: &str, enabled: bool) -> CatalogResult<bool> {
        let mut servers = self.servers.write();
        let server = servers
            .get_mut(name)
            .ok_or_else(|| CatalogError::ServerNotFound(name.to_string()))?;
        let prior = server.enabled;
        server.enabled = enabled;
        self.logger.info(&format!(
            "[Catalog] Server '{}' {} (was {})",
            name,
            if enabled { "enabled" } else { "disabled" },
            if prior { "enabled" } else { "disabled" }
        ));
        Ok(prior)
    }

    /// Flip one tool's enabled flag, returning the prior value.
    ///
    /// Tool state is independent of the server flag and survives refreshes.
    pub fn set_tool_enabled(
        &self,
        server: &str,
        tool: &str,
        enabled: bool,
    ) -> CatalogResult<bool> {
        let mut servers = self.servers.write();
        let descriptor = servers
            .get_mut(server)
            .ok_or_else(|| CatalogError::ServerNotFound(server.to_string()))?;
        let entry = descriptor
            .tools
            .iter_mut()
            .find(|t| t.name == tool)
            .ok_or_else(|| CatalogError::ToolNotFound {
                server: server.to_string(),
                tool: tool.to_string(),
            })?;
        let prior = entry.enabled;
        entry.enabled = enabled;
        Ok(prior)
    }

    /// Manually add a server; fails if the name is already taken
    pub fn add_server(&self, server: ServerDescriptor) -> CatalogResult<()> {
        let mut servers = self.servers.write();
        if servers.contains_key(&server.name) {
            return Err(CatalogError::ServerExists(server.name));
        }
        self.logger
            .info(&format!("[Catalog] Added server '{}'", server.name));
        servers.insert(server.name.clone(), server);
        Ok(())
    }

    /// Explicitly remove a server by name
    pub fn remove_server(&self, name: &str) -> CatalogResult<ServerDescriptor> {
        let mut servers = self.servers.write();
        let removed = servers
            .remove(name)
            .ok_or_else(|| CatalogError::ServerNotFound(name.to_string()))?;
        self.logger
            .info(&format!("[Catalog] Removed server '{}'", name));
        Ok(removed)
    }

    /// Drop every stale server, returning how many were purged.
    ///
    /// Staleness is otherwise non-destructive; this is the only expiry path.
    pub fn purge_stale(&self) -> usize {
        let mut servers = self.servers.write();
        let before = servers.len();
        servers.retain(|_, s| !s.stale);
        let purged = before - servers.len();
        if purged > 0 {
            self.logger
                .info(&format!("[Catalog] Purged {} stale servers", purged));
        }
        purged
    }

    /// Aggregate counts for the dashboard
    pub fn status(&self) -> CatalogStatus {
        let servers = self.servers.read();
        CatalogStatus {
            total_servers: servers.len(),
            enabled_servers: servers.values().filter(|s| s.enabled).count(),
            stale_servers: servers.values().filter(|s| s.stale).count(),
            total_tools: servers.values().map(|s| s.tools.len()).sum(),
        }
    }

    /// Check whether a server exists (stale included)
    pub fn contains(&self, name: &str) -> bool {
        self.servers.read().contains_key(name)
    }

    /// Total number of servers, stale included
    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    /// Whether the catalog holds no servers at all
    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }
}

/// Carry per-tool disable state from the previous descriptor into the
/// incoming tool list, matching by tool name.
fn carry_tool_states(incoming: &mut [ToolDescriptor], existing: &[ToolDescriptor]) {
    for tool in incoming.iter_mut() {
        if let Some(prior) = existing.iter().find(|t| t.name == tool.name) {
            tool.enabled = prior.enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::{ArgumentSchema, ParamSpec, ParamType};

    fn catalog() -> Catalog {
        Catalog::new(Arc::new(NoOpLogger::new()))
    }

    fn server(name: &str, tools: &[&str]) -> ServerDescriptor {
        let mut s = ServerDescriptor::new(name, DescriptorOrigin::Registry);
        for tool in tools {
            s.tools.push(ToolDescriptor::new(*tool));
        }
        s
    }

    #[test]
    fn test_refresh_populates_empty_catalog() {
        let catalog = catalog();
        let stats = catalog.refresh(
            vec![server("alpha", &["t1"]), server("beta", &["t2", "t3"])],
            DescriptorOrigin::Registry,
        );

        assert_eq!(stats.added, 2);
        assert_eq!(stats.updated, 0);
        assert_eq!(stats.marked_stale, 0);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.status().total_tools, 3);
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let catalog = catalog();
        let batch = || vec![server("alpha", &["t1"]), server("beta", &["t2"])];

        catalog.refresh(batch(), DescriptorOrigin::Registry);
        let stats = catalog.refresh(batch(), DescriptorOrigin::Registry);

        assert_eq!(stats.added, 0);
        assert_eq!(stats.updated, 2);
        assert_eq!(stats.marked_stale, 0);
        assert_eq!(catalog.len(), 2);

        // Same names, same tool lists, no flag changes
        let alpha = catalog.get_server("alpha").unwrap();
        assert!(alpha.enabled);
        assert!(!alpha.stale);
        assert_eq!(alpha.tools.len(), 1);
    }

    #[test]
    fn test_enabled_flag_survives_refresh() {
        let catalog = catalog();
        catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);
        catalog.set_enabled("alpha", false).unwrap();

        catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);
        assert!(!catalog.get_server("alpha").unwrap().enabled);
    }

    #[test]
    fn test_tool_disable_survives_refresh() {
        let catalog = catalog();
        catalog.refresh(
            vec![server("alpha", &["t1", "t2"])],
            DescriptorOrigin::Registry,
        );
        catalog.set_tool_enabled("alpha", "t1", false).unwrap();

        catalog.refresh(
            vec![server("alpha", &["t1", "t2"])],
            DescriptorOrigin::Registry,
        );
        let alpha = catalog.get_server("alpha").unwrap();
        assert!(!alpha.tool("t1").unwrap().enabled);
        assert!(alpha.tool("t2").unwrap().enabled);
    }

    #[test]
    fn test_absent_server_marked_stale_not_deleted() {
        let catalog = catalog();
        catalog.refresh(
            vec![server("alpha", &["t1"]), server("beta", &["t2"])],
            DescriptorOrigin::Registry,
        );

        let stats = catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);
        assert_eq!(stats.marked_stale, 1);

        // Still retrievable by exact name, flagged stale
        let beta = catalog.get_server("beta").unwrap();
        assert!(beta.stale);

        // Excluded from fresh views, present in the stale-inclusive view
        let fresh = catalog.list_servers(ServerFilter::fresh());
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].name, "alpha");
        let all = catalog.list_servers(ServerFilter::all());
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_stale_server_revived_by_reappearance() {
        let catalog = catalog();
        catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);
        catalog.refresh(vec![server("beta", &["t2"])], DescriptorOrigin::Registry);
        assert!(catalog.get_server("alpha").unwrap().stale);

        catalog.refresh(
            vec![server("alpha", &["t1"]), server("beta", &["t2"])],
            DescriptorOrigin::Registry,
        );
        assert!(!catalog.get_server("alpha").unwrap().stale);
    }

    #[test]
    fn test_refresh_updates_tool_list() {
        let catalog = catalog();
        catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);
        catalog.refresh(
            vec![server("alpha", &["t1", "t2"])],
            DescriptorOrigin::Registry,
        );

        let alpha = catalog.get_server("alpha").unwrap();
        assert_eq!(alpha.tools.len(), 2);
    }

    #[test]
    fn test_set_enabled_returns_prior_value() {
        let catalog = catalog();
        catalog.refresh(vec![server("alpha", &[])], DescriptorOrigin::Registry);

        assert_eq!(catalog.set_enabled("alpha", false).unwrap(), true);
        assert_eq!(catalog.set_enabled("alpha", false).unwrap(), false);
        assert!(matches!(
            catalog.set_enabled("ghost", true),
            Err(CatalogError::ServerNotFound(_))
        ));
    }

    #[test]
    fn test_get_tool() {
        let catalog = catalog();
        let mut srv = server("alpha", &[]);
        srv.tools.push(
            ToolDescriptor::new("t1").with_schema(
                ArgumentSchema::new().with_param("q", ParamSpec::required(ParamType::String)),
            ),
        );
        catalog.refresh(vec![srv], DescriptorOrigin::Registry);

        let tool = catalog.get_tool("alpha", "t1").unwrap();
        assert!(tool.schema.get("q").is_some());

        assert!(matches!(
            catalog.get_tool("alpha", "ghost"),
            Err(CatalogError::ToolNotFound { .. })
        ));
        assert!(matches!(
            catalog.get_tool("ghost", "t1"),
            Err(CatalogError::ServerNotFound(_))
        ));
    }

    #[test]
    fn test_manual_add_and_remove() {
        let catalog = catalog();
        catalog
            .add_server(ServerDescriptor::new("manual", DescriptorOrigin::Manual))
            .unwrap();
        assert!(matches!(
            catalog.add_server(ServerDescriptor::new("manual", DescriptorOrigin::Manual)),
            Err(CatalogError::ServerExists(_))
        ));

        catalog.remove_server("manual").unwrap();
        assert!(catalog.is_empty());
        assert!(matches!(
            catalog.remove_server("manual"),
            Err(CatalogError::ServerNotFound(_))
        ));
    }

    #[test]
    fn test_purge_stale() {
        let catalog = catalog();
        catalog.refresh(
            vec![server("alpha", &[]), server("beta", &[])],
            DescriptorOrigin::Registry,
        );
        catalog.refresh(vec![server("alpha", &[])], DescriptorOrigin::Registry);

        assert_eq!(catalog.purge_stale(), 1);
        assert_eq!(catalog.len(), 1);
        assert!(matches!(
            catalog.get_server("beta"),
            Err(CatalogError::ServerNotFound(_))
        ));
        // Purge with nothing stale is a no-op
        assert_eq!(catalog.purge_stale(), 0);
    }

    #[test]
    fn test_status_counts() {
        let catalog = catalog();
        catalog.refresh(
            vec![server("alpha", &["t1", "t2"]), server("beta", &["t3"])],
            DescriptorOrigin::Registry,
        );
        catalog.set_enabled("beta", false).unwrap();
        catalog.refresh(vec![server("alpha", &["t1", "t2"])], DescriptorOrigin::Registry);

        let status = catalog.status();
        assert_eq!(status.total_servers, 2);
        assert_eq!(status.enabled_servers, 1);
        assert_eq!(status.stale_servers, 1);
        assert_eq!(status.total_tools, 3);
    }

    #[test]
    fn test_concurrent_disable_survives_refresh() {
        // An operator disable racing a refresh must never be lost: either
        // it lands before the merge and the merge carries it over, or it
        // lands after and overwrites the merged entry.
        for _ in 0..50 {
            let catalog = Arc::new(catalog());
            catalog.refresh(vec![server("alpha", &["t1"])], DescriptorOrigin::Registry);

            let refresher = Arc::clone(&catalog);
            let handle = std::thread::spawn(move || {
                refresher.refresh(
                    (0..100)
                        .map(|i| server(&format!("srv-{:04}", i), &["t"]))
                        .chain(std::iter::once(server("alpha", &["t1"])))
                        .collect(),
                    DescriptorOrigin::Registry,
                );
            });
            catalog.set_enabled("alpha", false).unwrap();
            handle.join().unwrap();

            assert!(!catalog.get_server("alpha").unwrap().enabled);
        }
    }

    #[test]
    fn test_listing_is_a_snapshot() {
        let catalog = catalog();
        catalog.refresh(vec![server("alpha", &[])], DescriptorOrigin::Registry);

        let mut snapshot = catalog.list_servers(ServerFilter::all());
        snapshot[0].enabled = false;

        // Mutating the snapshot does not touch the catalog
        assert!(catalog.get_server("alpha").unwrap().enabled);
    }
}
