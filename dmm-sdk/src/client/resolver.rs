//! Link-resolution automation service client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{ReadinessResponse, ResolveLinkRequest, ResolveLinkResponse};

/// Typed client for the automation service that turns product URLs into
/// affiliate links.
///
/// The service drives a single logged-in browser session, so callers must
/// not issue overlapping [`resolve`](ResolverClient::resolve) calls.
#[derive(Debug, Clone)]
pub struct ResolverClient {
    http: Client,
    base_url: Url,
}

impl ResolverClient {
    pub fn new(base_url: Url) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `POST /links` – resolve one URL. `Ok(None)` means the service ran
    /// but produced no link.
    pub async fn resolve(&self, url: &str) -> Result<Option<String>, ClientError> {
        let endpoint = self.base_url.join("links")?;
        let resp = self
            .http
            .post(endpoint)
            .json(&ResolveLinkRequest {
                url: url.to_owned(),
            })
            .send()
            .await?;
        let body: ResolveLinkResponse = parse_response(resp).await?;
        Ok(body.link.filter(|link| !link.trim().is_empty()))
    }

    /// `GET /ready` – whether the session finished logging in.
    pub async fn ready(&self) -> Result<bool, ClientError> {
        let endpoint = self.base_url.join("ready")?;
        let resp = self.http.get(endpoint).send().await?;
        let body: ReadinessResponse = parse_response(resp).await?;
        Ok(body.ready)
    }
}
