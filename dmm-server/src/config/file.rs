//! TOML file configuration structures.
//!
//! These structs directly map to the `dmm-config.toml` file format.

use dmm_core::config::{DEFAULT_ALLOWED_DOMAINS, DEFAULT_CACHE_FLUSH_THRESHOLD};
use dmm_sdk::config::MirrorConfig;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub mirrors: Vec<MirrorConfig>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port the ingress listens on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))
}

/// Chat platform API section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token used for channel lookups. Usually supplied through
    /// `DISCORD_TOKEN` instead.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub api_base: Url,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse(dmm_sdk::client::DISCORD_API_BASE).expect("valid default api base")
}

/// Link resolution section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Base URL of the link-resolution automation service.
    pub endpoint: Url,
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    #[serde(default = "default_cache_flush_threshold")]
    pub cache_flush_threshold: usize,
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,
    /// Interval between readiness checks during startup.
    #[serde(default = "default_readiness_poll_secs")]
    pub readiness_poll_secs: u64,
    #[serde(default)]
    pub redirect: RedirectConfig,
}

fn default_allowed_domains() -> Vec<String> {
    DEFAULT_ALLOWED_DOMAINS
        .iter()
        .map(|d| (*d).to_owned())
        .collect()
}

fn default_cache_flush_threshold() -> usize {
    DEFAULT_CACHE_FLUSH_THRESHOLD
}

fn default_resolve_timeout_secs() -> u64 {
    60
}

fn default_readiness_poll_secs() -> u64 {
    2
}

/// Redirect following before resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedirectConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    #[serde(default = "default_redirect_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_redirects: default_max_redirects(),
            timeout_secs: default_redirect_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_redirects() -> usize {
    10
}

fn default_redirect_timeout_secs() -> u64 {
    15
}

/// Audit trail section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines file to append to. Records go to the log when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}
