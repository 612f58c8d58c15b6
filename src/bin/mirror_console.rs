use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use mirror_console::config::{AppConfig, CONFIG_PATH};
use mirror_console::server::{self, AppState};
use mirror_console::store::Store;

#[derive(Parser)]
#[command(name = "mirror-console", about = "Operator console for the mirroring relay")]
struct Args {
    /// Path to the TOML config file (defaults apply when it is missing)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Listen host, overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides `server.port`
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Build string shown by `/__version`, overrides `server.version`
    #[arg(long)]
    version_tag: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(tag) = args.version_tag {
        config.server.version = tag;
    }
    info!(
        "Config: log capacity={} retain={}, live link stale after {}s",
        config.store.log_capacity, config.store.log_retain, config.store.live_stale_secs,
    );

    let store = Arc::new(Store::new(&config.store));
    let state = AppState::new(store, &config.server.version);
    server::serve(&config.server, state).await
}
