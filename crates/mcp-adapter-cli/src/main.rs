//! MCP Adapter CLI
//!
//! Command-line front end over the adapter facade. Every subcommand maps to
//! one facade operation and prints its response envelope.

mod cli;
mod output;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use mcp_adapter_core::config::{ConfigLevel, ConfigProvider, FileConfigProvider};
use mcp_adapter_core::logging::{ConsoleLogger, FileLogger, Logger, NoOpLogger};
use mcp_adapter_core::{AdapterSettings, McpAdapter, ResponseEnvelope, ServerFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = load_settings(&cli).await;
    let adapter = McpAdapter::new(settings, build_logger(&cli));

    let envelope = run(&adapter, &cli).await;
    output::print(&envelope, cli.json);
    if envelope.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Resolve settings from the config file, then apply command-line overrides
async fn load_settings(cli: &Cli) -> AdapterSettings {
    let provider = match &cli.config {
        Some(path) => FileConfigProvider::new(path, ConfigLevel::Workspace),
        None => FileConfigProvider::user(),
    };
    let mut settings = provider.get_settings().await;
    if let Some(url) = &cli.registry_url {
        settings.registry_url = Some(url.clone());
    }
    if cli.mock {
        settings.use_mock_data = true;
    }
    settings
}

/// Pick the logger: file when requested, console when verbose, silent otherwise
fn build_logger(cli: &Cli) -> Arc<dyn Logger> {
    if let Some(path) = &cli.log_file {
        match FileLogger::open(path) {
            Ok(logger) => return Arc::new(logger),
            Err(err) => {
                eprintln!(
                    "mcp-adapter: cannot open log file {}: {}",
                    path.display(),
                    err
                );
            }
        }
    }
    if cli.verbose {
        Arc::new(ConsoleLogger::new())
    } else {
        Arc::new(NoOpLogger::new())
    }
}

/// Refresh the catalog, then dispatch the command against it
///
/// Every command starts from a freshly refreshed catalog; state does not
/// persist between CLI runs. A failed refresh short-circuits: its envelope
/// is returned as-is, and `refresh` itself just returns the same envelope.
async fn run(adapter: &McpAdapter, cli: &Cli) -> ResponseEnvelope {
    let refresh = adapter.refresh().await;
    if !refresh.success {
        return refresh;
    }

    match &cli.command {
        Commands::Refresh => refresh,
        Commands::List { enabled, stale } => {
            let filter = ServerFilter {
                enabled_only: *enabled,
                include_stale: *stale,
            };
            adapter.list_servers(filter)
        }
        Commands::Status => adapter.get_status(),
        Commands::Show { server } => adapter.get_server_details(server),
        Commands::Enable { server, tool } => match tool {
            Some(tool) => adapter.set_tool_enabled(server, tool, true),
            None => adapter.set_enabled(server, true),
        },
        Commands::Disable { server, tool } => match tool {
            Some(tool) => adapter.set_tool_enabled(server, tool, false),
            None => adapter.set_enabled(server, false),
        },
        Commands::Call {
            server,
            tool,
            args,
            no_validate,
        } => adapter.invoke(server, tool, args, !no_validate).await,
        Commands::Analytics => adapter.analytics_snapshot(),
        Commands::Purge => adapter.purge_stale(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_adapter() -> McpAdapter {
        McpAdapter::new(AdapterSettings::mock(), Arc::new(NoOpLogger::new()))
    }

    #[tokio::test]
    async fn test_refresh_command_returns_refresh_envelope() {
        let adapter = mock_adapter();
        let cli = Cli::parse_from(["mcp-adapter", "--mock", "refresh"]);

        let envelope = run(&adapter, &cli).await;
        assert!(envelope.success);
        assert_eq!(envelope.data["source"], "mock");
    }

    #[tokio::test]
    async fn test_status_runs_against_refreshed_catalog() {
        let adapter = mock_adapter();
        let cli = Cli::parse_from(["mcp-adapter", "--mock", "status"]);

        let envelope = run(&adapter, &cli).await;
        assert!(envelope.success);
        assert!(envelope.data["total_servers"].as_u64().unwrap() > 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_short_circuits_command() {
        // Port 1 is never listening
        let settings =
            AdapterSettings::default().with_registry_url("http://127.0.0.1:1/servers");
        let adapter = McpAdapter::new(settings, Arc::new(NoOpLogger::new()));
        let cli = Cli::parse_from(["mcp-adapter", "status"]);

        let envelope = run(&adapter, &cli).await;
        assert!(!envelope.success);
        assert!(envelope.error.is_some());
    }

    #[test]
    fn test_log_file_flag_builds_file_logger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cli.log");
        let cli = Cli::parse_from([
            "mcp-adapter",
            "--log-file",
            path.to_str().unwrap(),
            "status",
        ]);

        let logger = build_logger(&cli);
        logger.info("started");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("started"));
    }
}
