//! Configuration module for dmm-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::FileConfig;
use crate::config::runtime::{
    AuditConfig, DiscordConfig, RedirectConfig, RelayConfig, ResolutionConfig, ResolverEndpoint,
    ServerConfig,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no bot token configured (set DISCORD_TOKEN or discord.token)")]
    MissingToken,
}

/// Loaded configuration result containing all parts.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    pub resolver: ResolverEndpoint,
    pub audit: AuditConfig,
    pub relay: RelayConfig,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
    token_override: Option<String>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(
        config_path: impl AsRef<Path>,
        listen_override: Option<SocketAddr>,
        token_override: Option<String>,
    ) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
            token_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI/environment overrides
    /// 3. Validate the configuration
    /// 4. Build the loaded configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, config_content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }
        if let Some(token) = &self.token_override {
            file_config.discord.token = Some(token.clone());
        }

        validate(&file_config)?;
        build_loaded_config(file_config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    for (index, mirror) in config.mirrors.iter().enumerate() {
        if mirror.channels.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "mirror #{index} has no source channels"
            )));
        }
        match Url::parse(&mirror.webhook) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::ValidationError(format!(
                    "mirror #{index} has an invalid webhook url"
                )));
            }
        }
    }

    let resolver = &config.resolver;
    if resolver.allowed_domains.iter().all(|d| d.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "resolver.allowed_domains must name at least one domain".into(),
        ));
    }
    if resolver.cache_flush_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.cache_flush_threshold must be greater than zero".into(),
        ));
    }
    if resolver.resolve_timeout_secs == 0 || resolver.readiness_poll_secs == 0 {
        return Err(ConfigError::ValidationError(
            "resolver timeouts and intervals must be greater than zero".into(),
        ));
    }
    if resolver.redirect.enabled && resolver.redirect.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.redirect.timeout_secs must be greater than zero".into(),
        ));
    }

    if config.mirrors.is_empty() {
        tracing::warn!("No mirrors configured, every event will be ignored");
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    let token = file_config
        .discord
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or(ConfigError::MissingToken)?;
    let resolver = file_config.resolver;

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        discord: DiscordConfig {
            token,
            api_base: file_config.discord.api_base,
        },
        resolver: ResolverEndpoint {
            endpoint: resolver.endpoint,
            readiness_poll: Duration::from_secs(resolver.readiness_poll_secs),
        },
        audit: AuditConfig {
            path: file_config.audit.path,
        },
        relay: RelayConfig {
            mirrors: file_config.mirrors,
            resolution: ResolutionConfig {
                allowed_domains: resolver
                    .allowed_domains
                    .into_iter()
                    .filter(|d| !d.trim().is_empty())
                    .collect(),
                cache_flush_threshold: resolver.cache_flush_threshold,
                resolve_timeout: Duration::from_secs(resolver.resolve_timeout_secs),
                redirect: RedirectConfig {
                    enabled: resolver.redirect.enabled,
                    max_redirects: resolver.redirect.max_redirects,
                    timeout: Duration::from_secs(resolver.redirect.timeout_secs),
                },
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
[resolver]
endpoint = "http://127.0.0.1:9000/"

[[mirrors]]
webhook = "https://discord.com/api/webhooks/1/abc"
channels = ["100"]
"#;

    fn loader(token: Option<&str>) -> ConfigLoader {
        ConfigLoader::new("unused.toml", None, token.map(str::to_owned))
    }

    #[test]
    fn test_token_override_and_conversion() {
        let loaded = loader(Some("env-token")).load_str(BASE).unwrap();
        assert_eq!(loaded.discord.token, "env-token");
        assert_eq!(loaded.relay.mirrors.len(), 1);
        assert_eq!(loaded.relay.resolution.cache_flush_threshold, 10);
        assert_eq!(
            loaded.relay.resolution.resolve_timeout,
            Duration::from_secs(60)
        );
        assert_eq!(loaded.resolver.readiness_poll, Duration::from_secs(2));
    }

    #[test]
    fn test_listen_override() {
        let addr: SocketAddr = "127.0.0.1:4000".parse().unwrap();
        let loaded = ConfigLoader::new("unused.toml", Some(addr), Some("t".into()))
            .load_str(BASE)
            .unwrap();
        assert_eq!(loaded.server.listen, addr);
    }

    #[test]
    fn test_missing_token_is_fatal() {
        assert!(matches!(
            loader(None).load_str(BASE),
            Err(ConfigError::MissingToken)
        ));
    }

    #[test]
    fn test_mirror_without_channels_is_rejected() {
        let toml_str = r#"
[resolver]
endpoint = "http://127.0.0.1:9000/"

[[mirrors]]
webhook = "https://discord.com/api/webhooks/1/abc"
channels = []
"#;
        assert!(matches!(
            loader(Some("t")).load_str(toml_str),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_invalid_webhook_is_rejected() {
        let toml_str = r#"
[resolver]
endpoint = "http://127.0.0.1:9000/"

[[mirrors]]
webhook = "not a url"
channels = ["1"]
"#;
        assert!(matches!(
            loader(Some("t")).load_str(toml_str),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let toml_str = r#"
[resolver]
endpoint = "http://127.0.0.1:9000/"
cache_flush_threshold = 0
"#;
        assert!(matches!(
            loader(Some("t")).load_str(toml_str),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_allowlist_is_rejected() {
        let toml_str = r#"
[resolver]
endpoint = "http://127.0.0.1:9000/"
allowed_domains = [" "]
"#;
        assert!(matches!(
            loader(Some("t")).load_str(toml_str),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = ConfigLoader::new("/nonexistent/dmm-config.toml", None, None).load();
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
