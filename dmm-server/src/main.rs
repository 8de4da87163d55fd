//! Discord Mirror Messages relay server
//!
//! Mirrors messages from source channels to destination webhooks, rewriting
//! affiliate links along the way.

mod adapters;
mod api;
mod config;
mod handshake;
mod server;
mod shutdown;
mod state;

use adapters::{DiscordChannelDirectory, HttpLinkResolver, WebhookSink};
use clap::Parser;
use config::ConfigLoader;
use dmm_core::audit::{AuditSink, JsonLinesAuditSink, TracingAuditSink};
use dmm_core::events::mirror_event_channel;
use dmm_core::processors::{Collaborators, MirrorEngine};
use dmm_core::resolution::{NoRedirects, ReadinessGate, RedirectFollower, RedirectResolver};
use dmm_sdk::client::{ChannelClient, ResolverClient};
use server::{build_router, run_server};
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Discord Mirror Messages - message relay with affiliate link rewriting
#[derive(Parser, Debug)]
#[command(name = "dmm-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./dmm-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Bot token used for channel lookups
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting dmm-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = ConfigLoader::new(&args.config, args.listen, args.token);
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let listen_addr = loaded_config.server.listen;

    // Audit trail
    let audit: Arc<dyn AuditSink> = match &loaded_config.audit.path {
        Some(path) => {
            tracing::info!("Appending audit records to {:?}", path);
            Arc::new(JsonLinesAuditSink::open(path).await?)
        }
        None => Arc::new(TracingAuditSink),
    };

    // Collaborators
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()?;
    let channel_client = ChannelClient::new(
        loaded_config.discord.api_base.clone(),
        loaded_config.discord.token.clone(),
    )
    .with_http_client(http.clone());
    let resolver_client = ResolverClient::new(loaded_config.resolver.endpoint.clone());

    let redirect_config = &loaded_config.relay.resolution.redirect;
    let redirects: Arc<dyn RedirectFollower> = if redirect_config.enabled {
        Arc::new(RedirectResolver::new(redirect_config)?)
    } else {
        Arc::new(NoRedirects)
    };

    let collaborators = Collaborators {
        channels: Arc::new(DiscordChannelDirectory::new(channel_client)),
        sink: Arc::new(WebhookSink::new(http)),
        resolver: Arc::new(HttpLinkResolver::new(resolver_client.clone())),
        redirects,
        audit,
    };

    // Engine and its resolution worker
    let readiness = ReadinessGate::new();
    let (engine, resolution_queue) =
        MirrorEngine::new(loaded_config.relay, collaborators, readiness.clone());
    let engine = Arc::new(engine);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (event_tx, event_rx) = mirror_event_channel();

    let queue_handle = tokio::spawn(resolution_queue.run(shutdown_rx.clone()));
    let engine_handle = tokio::spawn(engine.run(shutdown_rx.clone(), event_rx));
    let handshake_handle = tokio::spawn(handshake::await_resolver_ready(
        resolver_client,
        readiness.clone(),
        loaded_config.resolver.readiness_poll,
        shutdown_rx,
    ));

    // Build the router
    let router = build_router(AppState::new(event_tx, readiness));

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr, shutdown_tx.clone()).await;

    // Stop background processors even if the server failed to start
    let _ = shutdown_tx.send(true);
    for handle in [engine_handle, queue_handle, handshake_handle] {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "Background task ended abnormally");
        }
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dmm_core=debug,reqwest=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
