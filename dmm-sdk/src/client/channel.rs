//! Channel metadata client.

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::ChannelMetadata;

/// Default base of the Discord REST API. Must end with a slash so that
/// endpoint paths are joined below it.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v9/";

/// Typed client for the channel endpoint of the chat-platform REST API.
///
/// Requests are authorized with the raw account token in the
/// `Authorization` header.
#[derive(Debug, Clone)]
pub struct ChannelClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl ChannelClient {
    /// * `base_url` – API root ending with `/` (see [`DISCORD_API_BASE`]).
    /// * `token` – account token sent as `Authorization`.
    pub fn new(base_url: Url, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `GET channels/{id}` – fetch channel metadata.
    pub async fn get_channel(&self, channel_id: &str) -> Result<ChannelMetadata, ClientError> {
        let url = self.base_url.join(&format!("channels/{channel_id}"))?;
        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, &self.token)
            .send()
            .await?;
        parse_response(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_channel_sends_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v9/channels/42")
            .match_header("authorization", "secret-token")
            .with_status(200)
            .with_body(r#"{"id":"42","name":"deals","parent_id":"7","type":0}"#)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/api/v9/", server.url())).unwrap();
        let channel = ChannelClient::new(base, "secret-token")
            .get_channel("42")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(channel.name, "deals");
        assert_eq!(channel.parent_id.as_deref(), Some("7"));
    }

    #[tokio::test]
    async fn test_unknown_channel_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v9/channels/0")
            .with_status(404)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/api/v9/", server.url())).unwrap();
        let result = ChannelClient::new(base, "t").get_channel("0").await;
        assert!(matches!(result, Err(ClientError::Api { .. })));
    }
}
