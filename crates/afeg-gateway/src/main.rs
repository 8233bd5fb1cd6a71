//! AFEG gateway daemon.
//!
//! Exposes the KVU valuation formula, governance gate, session ledgers, and
//! audit export over REST.

use afeg_gateway::config::GatewayConfig;
use afeg_gateway::server::Server;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// AFEG gateway CLI.
#[derive(Parser)]
#[command(name = "afegd")]
#[command(about = "AFEG KVU gateway daemon", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "AFEG_CONFIG")]
    config: Option<String>,

    /// Listen address
    #[arg(short, long, env = "AFEG_LISTEN_ADDR")]
    listen: Option<String>,

    /// Treasury access key (stored as a SHA-256 digest)
    #[arg(long, env = "AFEG_ACCESS_KEY")]
    access_key: Option<String>,

    /// Log level
    #[arg(long, env = "AFEG_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "AFEG_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| cli.log_level.clone().into());

    if cli.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let mut config = GatewayConfig::load(cli.config.as_deref())
        .context("failed to load gateway configuration")?;

    if let Some(listen) = cli.listen {
        config.server.listen_addr = listen
            .parse()
            .with_context(|| format!("invalid listen address: {listen}"))?;
    }
    if let Some(key) = cli.access_key {
        config.treasury.set_key(&key);
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        listen = %config.server.listen_addr,
        treasury_enabled = config.treasury.access_key_digest.is_some(),
        "starting AFEG gateway"
    );

    Server::new(config).run().await?;
    Ok(())
}
