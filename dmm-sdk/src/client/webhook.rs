//! Destination webhook client.

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tracing::debug;
use url::Url;

use super::{ClientError, expect_success, parse_response};
use crate::objects::{WebhookMessage, WebhookPayload};

/// Typed client for one execute-webhook URL
/// (`https://discord.com/api/webhooks/{id}/{token}`).
///
/// * `send` – `POST {webhook}?wait=true`
/// * `edit` – `PATCH {webhook}/messages/{id}`
/// * `delete` – `DELETE {webhook}/messages/{id}`
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: Client,
    url: Url,
}

impl WebhookClient {
    pub fn new(url: Url) -> Self {
        Self {
            http: Client::new(),
            url,
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Execute the webhook and return the created message.
    ///
    /// Attachments are downloaded from their source URL and re-uploaded as
    /// multipart file parts.
    pub async fn send(&self, payload: &WebhookPayload) -> Result<WebhookMessage, ClientError> {
        let mut url = self.url.clone();
        url.query_pairs_mut().append_pair("wait", "true");

        let request = if payload.files.is_empty() {
            self.http.post(url).json(payload)
        } else {
            self.http.post(url).multipart(self.multipart(payload).await?)
        };

        let resp = request.send().await?;
        parse_response(resp).await
    }

    /// Edit a message previously sent through this webhook.
    pub async fn edit(
        &self,
        message_id: &str,
        payload: &WebhookPayload,
    ) -> Result<WebhookMessage, ClientError> {
        let resp = self
            .http
            .patch(self.message_url(message_id)?)
            .json(payload)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// Delete a message previously sent through this webhook.
    pub async fn delete(&self, message_id: &str) -> Result<(), ClientError> {
        let resp = self
            .http
            .delete(self.message_url(message_id)?)
            .send()
            .await?;
        expect_success(resp).await
    }

    fn message_url(&self, message_id: &str) -> Result<Url, ClientError> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidWebhook(self.url.to_string()))?
            .pop_if_empty()
            .push("messages")
            .push(message_id);
        Ok(url)
    }

    async fn multipart(&self, payload: &WebhookPayload) -> Result<Form, ClientError> {
        let json = serde_json::to_string(payload)?;
        let mut form = Form::new().part("payload_json", Part::text(json).mime_str("application/json")?);

        for (index, file) in payload.files.iter().enumerate() {
            debug!(url = %file.url, filename = %file.filename, "Downloading attachment");
            let bytes = self
                .http
                .get(&file.url)
                .send()
                .await?
                .error_for_status()?
                .bytes()
                .await?;
            let mut part = Part::bytes(bytes.to_vec()).file_name(file.filename.clone());
            if let Some(content_type) = &file.content_type {
                part = part.mime_str(content_type)?;
            }
            form = form.part(format!("files[{index}]"), part);
        }

        Ok(form)
    }
}
