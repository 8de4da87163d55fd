//! Validated runtime configuration handed to the rest of the server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub use dmm_core::config::{RedirectConfig, RelayConfig, ResolutionConfig};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub api_base: Url,
}

/// How to reach the link-resolution automation service.
#[derive(Debug, Clone)]
pub struct ResolverEndpoint {
    pub endpoint: Url,
    pub readiness_poll: Duration,
}

#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub path: Option<PathBuf>,
}
