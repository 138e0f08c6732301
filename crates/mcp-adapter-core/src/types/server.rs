//! Server and tool descriptor types
//!
//! These are the entities the Catalog owns. Callers always receive clones;
//! mutation goes through Catalog operations only.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::SystemTime;

use super::schema::ArgumentSchema;

/// Where a server descriptor came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriptorOrigin {
    /// Discovered via the remote registry
    Registry,
    /// Configured manually by an operator
    Manual,
    /// Substituted from the fixed mock dataset
    Mock,
}

impl DescriptorOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            DescriptorOrigin::Registry => "registry",
            DescriptorOrigin::Manual => "manual",
            DescriptorOrigin::Mock => "mock",
        }
    }
}

/// A callable operation exposed by a server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, unique within its server
    pub name: String,
    /// Human-readable description
    #[serde(default)]
    pub description: String,
    /// Argument schema for invocation validation
    #[serde(default)]
    pub schema: ArgumentSchema,
    /// Example argument sets, if the registry supplied any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Value>,
    /// Whether the tool is individually enabled.
    ///
    /// Inherits the server's enabled state for discovery and dispatch;
    /// a tool can be disabled independently of its server.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ToolDescriptor {
    /// Create a new enabled tool with an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            schema: ArgumentSchema::new(),
            examples: Vec::new(),
            enabled: true,
        }
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the argument schema (builder pattern)
    pub fn with_schema(mut self, schema: ArgumentSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Add an example argument set (builder pattern)
    pub fn with_example(mut self, example: Value) -> Self {
        self.examples.push(example);
        self
    }
}

/// A named remote tool provider known to the Catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerDescriptor {
    /// Globally unique server name, stable across refreshes
    pub name: String,
    /// Human-readable description from the registry
    #[serde(default)]
    pub description: String,
    /// Classification tags from the registry
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operator-controlled enabled flag; survives refreshes
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Set when the server was absent from the latest successful refresh.
    /// Stale servers stay addressable by name and remain dispatchable.
    #[serde(default)]
    pub stale: bool,
    /// How this descriptor entered the catalog
    pub origin: DescriptorOrigin,
    /// Timestamp of the last refresh that confirmed this server
    pub last_seen: SystemTime,
    /// Tools exposed by this server, unique by name
    #[serde(default)]
    pub tools: Vec<ToolDescriptor>,
}

impl ServerDescriptor {
    /// Create a new enabled, fresh server with no tools
    pub fn new(name: impl Into<String>, origin: DescriptorOrigin) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            enabled: true,
            stale: false,
            origin,
            last_seen: SystemTime::now(),
            tools: Vec::new(),
        }
    }

    /// Set the description (builder pattern)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags (builder pattern)
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Add a tool (builder pattern)
    pub fn with_tool(mut self, tool: ToolDescriptor) -> Self {
        self.tools.push(tool);
        self
    }

    /// Look up a tool by name
    pub fn tool(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Number of enabled tools on this server
    pub fn enabled_tool_count(&self) -> usize {
        self.tools.iter().filter(|t| t.enabled).count()
    }
}

/// Filter for catalog listings
#[derive(Debug, Clone, Copy)]
pub struct ServerFilter {
    /// Only include servers with `enabled = true`
    pub enabled_only: bool,
    /// Include servers marked stale
    pub include_stale: bool,
}

impl Default for ServerFilter {
    fn default() -> Self {
        // Default listing: fresh servers regardless of enabled state
        Self {
            enabled_only: false,
            include_stale: false,
        }
    }
}

impl ServerFilter {
    /// Fresh servers, enabled and disabled alike
    pub fn fresh() -> Self {
        Self::default()
    }

    /// Enabled and fresh servers only (the dispatchable discovery view)
    pub fn enabled() -> Self {
        Self {
            enabled_only: true,
            include_stale: false,
        }
    }

    /// Every server in the catalog, stale and disabled included
    pub fn all() -> Self {
        Self {
            enabled_only: false,
            include_stale: true,
        }
    }

    /// Check if a server matches this filter
    pub fn matches(&self, server: &ServerDescriptor) -> bool {
        if self.enabled_only && !server.enabled {
            return false;
        }
        if !self.include_stale && server.stale {
            return false;
        }
        true
    }
}
