use std::env;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use manualqa_cli::{init_tracing, router};
use manualqa_core::config::Config;
use manualqa_retrieval::QueryService;

#[derive(Parser, Debug)]
#[command(name = "manualqa-server", about = "Serve flight-manual questions over HTTP")]
struct Args {
    /// Overrides server.host.
    #[arg(long)]
    host: Option<String>,
    /// Overrides server.port.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load()?;
    let settings = config.settings()?;
    let base = env::current_dir()?;
    info!(env = config.env_name(), "configuration loaded");

    let service = Arc::new(QueryService::from_settings(&settings, &base).await?);

    let host = args.host.unwrap_or_else(|| settings.server.host.clone());
    let port = args.port.unwrap_or(settings.server.port);
    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router(service)).await?;
    Ok(())
}
