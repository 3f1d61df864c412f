//! Google Workspace MCP Server
//!
//! A Model Context Protocol (MCP) server for Google Workspace integration.
//! Provides tools for reading and editing Google Docs tabs and managing
//! document comments.

use std::sync::Arc;

use clap::{Parser, Subcommand};

use workspace_mcp_server::config::Config;
use workspace_mcp_server::error::Result;
use workspace_mcp_server::google::auth::Authenticator;
use workspace_mcp_server::google::client::WorkspaceClient;
use workspace_mcp_server::mcp::server::McpServer;
use workspace_mcp_server::mcp::tools::{ToolHandler, ALL_TOOLS};

/// Google Workspace MCP Server
#[derive(Parser)]
#[command(name = "workspace-mcp-server")]
#[command(author, version, about = "Google Workspace MCP Server - Docs tools over the Model Context Protocol")]
struct Cli {
    /// Comma-separated subset of tools to register (default: all)
    #[arg(long, value_delimiter = ',')]
    tools: Option<Vec<String>>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with Google (run this first)
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging goes to stderr; stdout is the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = Config::new()?;

    match cli.command {
        Some(Commands::Auth) => {
            let authenticator = Authenticator::new(config).await?;
            authenticator.authenticate_interactive().await?;
            eprintln!("Authentication completed successfully!");
            std::process::exit(0);
        }
        None => {
            run_server(config, cli.tools).await?;
        }
    }

    Ok(())
}

async fn run_server(config: Config, tools: Option<Vec<String>>) -> Result<()> {
    if !config.oauth_client_configured() {
        eprintln!("Error: OAuth client is not configured.");
        eprintln!(
            "Set GOOGLE_OAUTH_CLIENT_ID and GOOGLE_OAUTH_CLIENT_SECRET, or place a client secret file at {}",
            config.client_secret_path.display()
        );
        std::process::exit(1);
    }

    let authenticator = Arc::new(Authenticator::new(config).await?);

    if !authenticator.is_authenticated().await {
        eprintln!(
            "Warning: no stored credentials. Tools will fail with an authentication error \
             until `start_google_auth` or `workspace-mcp-server auth` completes."
        );
    }

    let client = Arc::new(WorkspaceClient::new(authenticator));

    let tool_handler = match tools {
        Some(subset) => {
            for name in &subset {
                if !ALL_TOOLS.contains(&name.as_str()) {
                    eprintln!("Warning: ignoring unknown tool name '{}'", name);
                }
            }
            ToolHandler::with_tools(client, subset)
        }
        None => ToolHandler::new(client),
    };

    let mut server = McpServer::new(tool_handler);
    server.run_stdio().await?;

    Ok(())
}
