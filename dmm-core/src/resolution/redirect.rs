//! Redirect following and URL cleaning before resolution.
//!
//! Short links in deal posts usually bounce through one or more trackers.
//! The capability is given the final destination with its query stripped.

use crate::config::RedirectConfig;
use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum RedirectError {
    /// Transport failure, timeout or too many redirects.
    #[error("redirect request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The final hop answered with a server error.
    #[error("redirect target {url} returned status {status}")]
    ServerError { status: u16, url: String },
}

/// Resolves a URL to the final destination of its redirect chain.
#[async_trait]
pub trait RedirectFollower: Send + Sync {
    async fn follow(&self, url: &str) -> Result<String, RedirectError>;
}

/// HTTP redirect follower with a bounded hop count and timeout.
pub struct RedirectResolver {
    http: reqwest::Client,
}

impl RedirectResolver {
    pub fn new(config: &RedirectConfig) -> Result<Self, RedirectError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl RedirectFollower for RedirectResolver {
    /// Client errors still count as a destination: a 404 product page has a
    /// perfectly usable final URL. Only server errors are failures.
    async fn follow(&self, url: &str) -> Result<String, RedirectError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let final_url = response.url().to_string();

        if status.is_server_error() {
            return Err(RedirectError::ServerError {
                status: status.as_u16(),
                url: final_url,
            });
        }

        debug!(url, final_url = %final_url, status = status.as_u16(), "Followed redirects");
        Ok(final_url)
    }
}

/// Follower used when redirect following is disabled.
pub struct NoRedirects;

#[async_trait]
impl RedirectFollower for NoRedirects {
    async fn follow(&self, url: &str) -> Result<String, RedirectError> {
        Ok(url.to_owned())
    }
}

/// `origin + path` of `url`, dropping query and fragment.
///
/// Unparseable input is returned unchanged.
pub fn clean_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.origin().ascii_serialization(), parsed.path()),
        Err(_) => url.to_owned(),
    }
}
