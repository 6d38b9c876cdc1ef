use agora_mcp::docs_client::DEFAULT_BASE_URL;
use agora_mcp::server;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(version, about = "Agora design system catalog MCP server")]
struct Cli {
    /// Type of server to run
    #[arg(short, long, value_enum, default_value_t = ServerType::Sse)]
    server_type: ServerType,

    /// Address for the SSE server
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    address: String,

    /// Base URL of the documentation site publishing the catalog index
    #[arg(short, long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Hours a fetched catalog index stays fresh
    #[arg(long, default_value_t = 24)]
    cache_ttl_hours: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ServerType {
    /// Start an SSE server
    Sse,
    /// Start a stdio server
    Stdio,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let ttl = Duration::from_secs(cli.cache_ttl_hours * 3600);

    match cli.server_type {
        ServerType::Sse => {
            println!("Starting SSE server on {}", cli.address);
            server::start_sse_server(&cli.address, &cli.base_url, ttl).await?;
        }
        ServerType::Stdio => {
            server::start_stdio_server(&cli.base_url, ttl).await?;
        }
    }

    Ok(())
}
