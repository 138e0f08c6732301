//! Fixed mock registry dataset
//!
//! Used when the registry is unreachable and the mock-data policy is
//! enabled, and as the in-process development dataset. Deterministic:
//! repeated calls always yield the same three servers and tool sets.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::types::{
    ArgumentSchema, DescriptorOrigin, ParamSpec, ParamType, ServerDescriptor, ToolDescriptor,
};

/// Names of the mock servers, in the order they are generated
pub const MOCK_SERVER_NAMES: &[&str] = &["github-mcp", "slack-mcp", "database-mcp"];

// Built once; the catalog stamps origin and last_seen on every refresh
static DATASET: Lazy<Vec<ServerDescriptor>> =
    Lazy::new(|| vec![github_server(), slack_server(), database_server()]);

/// The fixed mock dataset: three servers with small fixed tool sets
pub fn mock_registry_servers() -> Vec<ServerDescriptor> {
    DATASET.clone()
}

fn github_server() -> ServerDescriptor {
    ServerDescriptor::new("github-mcp", DescriptorOrigin::Mock)
        .with_description("GitHub integration for MCP")
        .with_tags(["version-control".to_string(), "collaboration".to_string()])
        .with_tool(
            ToolDescriptor::new("create_issue")
                .with_description("Create a new issue in a GitHub repository")
                .with_schema(
                    ArgumentSchema::new()
                        .with_param(
                            "repository",
                            ParamSpec::required(ParamType::String)
                                .with_description("Repository in owner/name form"),
                        )
                        .with_param(
                            "title",
                            ParamSpec::required(ParamType::String)
                                .with_description("Issue title"),
                        )
                        .with_param(
                            "body",
                            ParamSpec::optional(ParamType::String)
                                .with_default(json!(""))
                                .with_description("Issue body text"),
                        )
                        .with_param(
                            "labels",
                            ParamSpec::optional(ParamType::Array)
                                .with_description("Labels to attach"),
                        ),
                )
                .with_example(json!({
                    "repository": "owner/repo-name",
                    "title": "Bug: Application crashes on startup",
                    "labels": ["bug", "high-priority"]
                })),
        )
        .with_tool(
            ToolDescriptor::new("get_repository")
                .with_description("Fetch metadata for a repository")
                .with_schema(ArgumentSchema::new().with_param(
                    "repository",
                    ParamSpec::required(ParamType::String)
                        .with_description("Repository in owner/name form"),
                )),
        )
        .with_tool(
            ToolDescriptor::new("search_code")
                .with_description("Search code across repositories")
                .with_schema(
                    ArgumentSchema::new()
                        .with_param(
                            "query",
                            ParamSpec::required(ParamType::String)
                                .with_description("Search query"),
                        )
                        .with_param(
                            "limit",
                            ParamSpec::optional(ParamType::Number)
                                .with_default(json!(10))
                                .with_description("Maximum results"),
                        ),
                ),
        )
}

fn slack_server() -> ServerDescriptor {
    ServerDescriptor::new("slack-mcp", DescriptorOrigin::Mock)
        .with_description("Slack integration for MCP")
        .with_tags(["communication".to_string(), "collaboration".to_string()])
        .with_tool(
            ToolDescriptor::new("send_message")
                .with_description("Send a message to a Slack channel")
                .with_schema(
                    ArgumentSchema::new()
                        .with_param(
                            "channel",
                            ParamSpec::required(ParamType::String)
                                .with_description("Channel name, e.g. #general"),
                        )
                        .with_param(
                            "message",
                            ParamSpec::required(ParamType::String)
                                .with_description("Message text"),
                        )
                        .with_param(
                            "thread_ts",
                            ParamSpec::optional(ParamType::String)
                                .with_description("Thread timestamp to reply to"),
                        ),
                )
                .with_example(json!({
                    "channel": "#general",
                    "message": "Hello team! The deployment was successful."
                })),
        )
        .with_tool(
            ToolDescriptor::new("create_channel")
                .with_description("Create a new Slack channel")
                .with_schema(
                    ArgumentSchema::new()
                        .with_param(
                            "name",
                            ParamSpec::required(ParamType::String)
                                .with_description("Channel name"),
                        )
                        .with_param(
                            "private",
                            ParamSpec::optional(ParamType::Boolean)
                                .with_default(json!(false))
                                .with_description("Create as a private channel"),
                        ),
                ),
        )
        .with_tool(
            ToolDescriptor::new("get_users")
                .with_description("List workspace users")
                .with_schema(ArgumentSchema::new().with_param(
                    "limit",
                    ParamSpec::optional(ParamType::Number).with_default(json!(100)),
                )),
        )
}

fn database_server() -> ServerDescriptor {
    ServerDescriptor::new("database-mcp", DescriptorOrigin::Mock)
        .with_description("Database operations for MCP")
        .with_tags(["database".to_string(), "sql".to_string()])
        .with_tool(
            ToolDescriptor::new("execute_query")
                .with_description("Execute a SQL query on the database")
                .with_schema(
                    ArgumentSchema::new()
                        .with_param(
                            "query",
                            ParamSpec::required(ParamType::String)
                                .with_description("SQL statement to run"),
                        )
                        .with_param(
                            "database",
                            ParamSpec::optional(ParamType::String)
                                .with_default(json!("production"))
                                .with_description("Target database name"),
                        ),
                )
                .with_example(json!({
                    "query": "SELECT * FROM users WHERE active = true LIMIT 10",
                    "database": "production"
                })),
        )
        .with_tool(
            ToolDescriptor::new("get_schema")
                .with_description("Describe tables and columns")
                .with_schema(ArgumentSchema::new().with_param(
                    "table",
                    ParamSpec::optional(ParamType::String)
                        .with_description("Restrict to one table"),
                )),
        )
        .with_tool(
            ToolDescriptor::new("backup_database")
                .with_description("Trigger a database backup")
                .with_schema(ArgumentSchema::new().with_param(
                    "database",
                    ParamSpec::required(ParamType::String)
                        .with_description("Database to back up"),
                )),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_dataset_is_deterministic() {
        let first = mock_registry_servers();
        let second = mock_registry_servers();

        let names = |servers: &[ServerDescriptor]| {
            servers.iter().map(|s| s.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), MOCK_SERVER_NAMES);

        for (a, b) in first.iter().zip(second.iter()) {
            let tools_a: Vec<_> = a.tools.iter().map(|t| &t.name).collect();
            let tools_b: Vec<_> = b.tools.iter().map(|t| &t.name).collect();
            assert_eq!(tools_a, tools_b);
        }
    }

    #[test]
    fn test_mock_servers_have_three_tools_each() {
        for server in mock_registry_servers() {
            assert_eq!(server.tools.len(), 3, "{} tool count", server.name);
            assert!(server.enabled);
            assert!(!server.stale);
            assert_eq!(server.origin, DescriptorOrigin::Mock);
        }
    }

    #[test]
    fn test_mock_schemas_are_well_formed() {
        for server in mock_registry_servers() {
            for tool in &server.tools {
                assert!(
                    tool.schema.is_well_formed(),
                    "schema for {}.{}",
                    server.name,
                    tool.name
                );
            }
        }
    }

    #[test]
    fn test_create_issue_schema() {
        let servers = mock_registry_servers();
        let github = servers.iter().find(|s| s.name == "github-mcp").unwrap();
        let tool = github.tool("create_issue").unwrap();

        assert!(tool.schema.get("repository").unwrap().required);
        assert!(tool.schema.get("title").unwrap().required);
        assert!(!tool.schema.get("body").unwrap().required);
        assert!(!tool.examples.is_empty());
    }
}
