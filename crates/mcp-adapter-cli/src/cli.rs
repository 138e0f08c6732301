//! CLI argument parsing using clap derive

use clap::{Parser, Subcommand};

/// MCP Adapter - Discover, inspect and invoke MCP server tools
#[derive(Parser, Debug)]
#[command(name = "mcp-adapter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Registry endpoint serving the server catalog
    #[arg(long, env = "MCP_REGISTRY_URL", global = true)]
    pub registry_url: Option<String>,

    /// Serve the built-in mock dataset instead of fetching the registry
    #[arg(long, global = true)]
    pub mock: bool,

    /// Path to a config file (defaults to the user-level config)
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    /// Print log output to the console
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append log output to a file instead of the console
    #[arg(long, env = "MCP_ADAPTER_LOG_FILE", global = true)]
    pub log_file: Option<std::path::PathBuf>,

    /// Emit raw JSON envelopes instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Refresh the catalog from the registry (or mock dataset)
    Refresh,

    /// List catalog servers
    List {
        /// Only show enabled servers
        #[arg(long)]
        enabled: bool,

        /// Include stale servers
        #[arg(long)]
        stale: bool,
    },

    /// Show aggregate catalog counts
    Status,

    /// Show one server's full descriptor, tools and schemas included
    Show {
        /// Server name
        server: String,
    },

    /// Enable a server (or one of its tools)
    Enable {
        /// Server name
        server: String,

        /// Tool name; omit to toggle the whole server
        tool: Option<String>,
    },

    /// Disable a server (or one of its tools)
    Disable {
        /// Server name
        server: String,

        /// Tool name; omit to toggle the whole server
        tool: Option<String>,
    },

    /// Invoke a tool
    ///
    /// Examples:
    ///   mcp-adapter call github-mcp create_issue --args '{"repository": "a/b", "title": "bug"}'
    ///   mcp-adapter call slack-mcp get_users
    Call {
        /// Server name
        server: String,

        /// Tool name
        tool: String,

        /// Tool arguments as a JSON object
        #[arg(long, default_value = "")]
        args: String,

        /// Skip schema validation of the arguments
        #[arg(long)]
        no_validate: bool,
    },

    /// Show tool usage analytics
    Analytics,

    /// Drop stale servers from the catalog
    Purge,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_call_arguments() {
        let cli = Cli::parse_from([
            "mcp-adapter",
            "--mock",
            "call",
            "github-mcp",
            "create_issue",
            "--args",
            r#"{"repository": "a/b", "title": "t"}"#,
        ]);
        assert!(cli.mock);
        match cli.command {
            Commands::Call {
                server,
                tool,
                args,
                no_validate,
            } => {
                assert_eq!(server, "github-mcp");
                assert_eq!(tool, "create_issue");
                assert!(args.contains("repository"));
                assert!(!no_validate);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_list_flags() {
        let cli = Cli::parse_from(["mcp-adapter", "list", "--enabled", "--stale"]);
        assert!(matches!(
            cli.command,
            Commands::List {
                enabled: true,
                stale: true
            }
        ));
    }
}
