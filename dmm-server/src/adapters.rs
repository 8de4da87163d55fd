//! Bridges from the SDK HTTP clients to the core collaborator traits.

use async_trait::async_trait;
use dmm_core::entities::LookupError;
use dmm_core::framework::{ChannelDirectory, DestinationSink, LinkResolver};
use dmm_core::processors::RelayError;
use dmm_core::resolution::ResolutionError;
use dmm_sdk::client::{ChannelClient, ClientError, ResolverClient, WebhookClient};
use dmm_sdk::objects::{ChannelMetadata, EventKind, WebhookPayload};
use url::Url;

/// Delivers mirrored messages through execute-webhook URLs.
///
/// One `reqwest::Client` is shared by every destination webhook.
pub struct WebhookSink {
    http: reqwest::Client,
}

impl WebhookSink {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn client(&self, webhook: &str, operation: EventKind) -> Result<WebhookClient, RelayError> {
        let url = Url::parse(webhook).map_err(|e| RelayError::sink(operation, e))?;
        Ok(WebhookClient::new(url).with_http_client(self.http.clone()))
    }
}

#[async_trait]
impl DestinationSink for WebhookSink {
    async fn send(&self, webhook: &str, payload: &WebhookPayload) -> Result<String, RelayError> {
        let message = self
            .client(webhook, EventKind::Create)?
            .send(payload)
            .await
            .map_err(|e| RelayError::sink(EventKind::Create, e))?;
        Ok(message.id)
    }

    async fn edit(
        &self,
        webhook: &str,
        message_id: &str,
        payload: &WebhookPayload,
    ) -> Result<(), RelayError> {
        self.client(webhook, EventKind::Update)?
            .edit(message_id, payload)
            .await
            .map_err(|e| RelayError::sink(EventKind::Update, e))?;
        Ok(())
    }

    async fn delete(&self, webhook: &str, message_id: &str) -> Result<(), RelayError> {
        self.client(webhook, EventKind::Delete)?
            .delete(message_id)
            .await
            .map_err(|e| RelayError::sink(EventKind::Delete, e))
    }
}

pub struct DiscordChannelDirectory {
    client: ChannelClient,
}

impl DiscordChannelDirectory {
    pub fn new(client: ChannelClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelDirectory for DiscordChannelDirectory {
    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelMetadata, LookupError> {
        self.client
            .get_channel(channel_id)
            .await
            .map_err(|e| LookupError::new(channel_id, e))
    }
}

/// The automation service as the core's link-resolution capability.
pub struct HttpLinkResolver {
    client: ResolverClient,
}

impl HttpLinkResolver {
    pub fn new(client: ResolverClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkResolver for HttpLinkResolver {
    async fn resolve(&self, url: &str) -> Result<Option<String>, ResolutionError> {
        self.client.resolve(url).await.map_err(|e| match e {
            ClientError::Api { status, body } if status.is_server_error() => {
                ResolutionError::Unavailable(format!("status {status}: {body}"))
            }
            other => ResolutionError::failed(format!("resolving {url}"), other),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEBHOOK_PATH: &str = "/api/webhooks/1/token";

    #[tokio::test]
    async fn test_sink_send_returns_message_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", WEBHOOK_PATH)
            .match_query(mockito::Matcher::UrlEncoded("wait".into(), "true".into()))
            .with_status(200)
            .with_body(r#"{"id":"555","channel_id":"9"}"#)
            .create_async()
            .await;

        let sink = WebhookSink::new(reqwest::Client::new());
        let webhook = format!("{}{WEBHOOK_PATH}", server.url());
        let payload = WebhookPayload {
            content: Some("hi".into()),
            ..Default::default()
        };
        assert_eq!(sink.send(&webhook, &payload).await.unwrap(), "555");
    }

    #[tokio::test]
    async fn test_sink_maps_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", format!("{WEBHOOK_PATH}/messages/555").as_str())
            .with_status(404)
            .with_body(r#"{"message":"Unknown Message"}"#)
            .create_async()
            .await;

        let sink = WebhookSink::new(reqwest::Client::new());
        let webhook = format!("{}{WEBHOOK_PATH}", server.url());
        let result = sink.delete(&webhook, "555").await;
        assert!(matches!(
            result,
            Err(RelayError::Sink {
                operation: EventKind::Delete,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_sink_rejects_bad_webhook() {
        let sink = WebhookSink::new(reqwest::Client::new());
        let result = sink.send("not a url", &WebhookPayload::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_directory_wraps_lookup_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/channels/42")
            .with_status(401)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let directory = DiscordChannelDirectory::new(ChannelClient::new(base, "token"));
        let err = directory.fetch_channel("42").await.unwrap_err();
        assert_eq!(err.channel_id, "42");
    }

    #[tokio::test]
    async fn test_resolver_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/links")
            .with_status(503)
            .with_body("logging in")
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let resolver = HttpLinkResolver::new(ResolverClient::new(base));
        assert!(matches!(
            resolver.resolve("https://mavely.example/x").await,
            Err(ResolutionError::Unavailable(_))
        ));
    }
}
