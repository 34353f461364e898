//! duet-relay: random one-to-one pairing and relay server.
//!
//! Accepts WebSocket connections, pairs waiting participants two at a
//! time, and relays chat plus media-handshake signals between the two
//! members of each room. Signaling payloads are forwarded untouched.

mod connection;
mod lifecycle;
mod outbox;
mod pairing;
mod pool;
mod protocol;
mod rate_limit;
mod registry;
mod rooms;
mod router;
mod state;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use duet_config::DuetConfig;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tracing_subscriber::EnvFilter;

use crate::connection::{handle_connection, ConnectionSettings};
use crate::lifecycle::Matchmaker;
use crate::registry::ProfileDefaults;

#[derive(Parser)]
#[command(name = "duet-relay", about = "Random pairing and chat/signal relay")]
struct Args {
    /// Path to a TOML config file. Defaults to the platform config dir.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind (overrides `server.host`).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides `server.port`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter directive, e.g. `duet_relay=debug`. `RUST_LOG` wins.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> duet_common::Result<()> {
    let args = Args::parse();

    // Logging is configured from the config file, so load it first and
    // report the outcome once the subscriber is up.
    let loaded = duet_config::load_config(args.config.as_deref());
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => DuetConfig::default(),
    };

    let directive = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    if let Err(e) = loaded {
        if args.config.is_some() {
            tracing::error!("Config load failed: {e}");
            return Err(e.into());
        }
        tracing::warn!("Config load failed, using defaults: {e}");
    }

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = u32::from(port);
    }

    let matchmaker = Matchmaker::new(ProfileDefaults::from(&config.profile));
    let settings = ConnectionSettings::from(&config);

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("duet-relay v{} listening on {}", env!("CARGO_PKG_VERSION"), addr);

    let sweeper = pairing::spawn_sweeper(
        matchmaker.clone(),
        Duration::from_millis(u64::from(config.matching.sweep_interval_ms)),
        Duration::from_secs(u64::from(config.matching.stats_interval_secs)),
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    // Accept loop.
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Ctrl-C received");
                break;
            }
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    let matchmaker = matchmaker.clone();
                    let settings = settings.clone();
                    tokio::spawn(async move {
                        match accept_async(stream).await {
                            Ok(ws) => handle_connection(ws, peer, matchmaker, settings).await,
                            Err(e) => {
                                tracing::warn!(peer = %peer, error = %e, "WS handshake failed");
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "TCP accept error");
                }
            },
        }
    }

    matchmaker.shutdown();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Sweeper task failed");
    }
    Ok(())
}
