mod config;
mod error;
mod tracking;

use std::path::PathBuf;

use clap::Parser;
use tracking::TrackingServer;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Issues unique shipment tracking numbers over HTTP.
#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, default_value = "config.toml")]
    config_path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=error,hyper_util=error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let config = Config::from(&args.config_path)
        .await
        .inspect_err(|err| tracing::error!(%err, "Failed to load config"))?;

    let server = TrackingServer::new(config);
    server
        .start()
        .await
        .inspect_err(|err| tracing::error!(%err, "Failed to start tracking server"))?;
    Ok(())
}
