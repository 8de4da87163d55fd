use super::text_transformer::TransformedMessage;
use dmm_sdk::config::TransformSettings;
use dmm_sdk::objects::{ThreadContext, WebhookPayload};

/// Shape a transformed message into the webhook body, honoring the
/// suppression switches of `settings`.
pub fn build_payload(
    transformed: TransformedMessage,
    settings: &TransformSettings,
    thread: Option<&ThreadContext>,
) -> WebhookPayload {
    let content = if settings.no_content || transformed.content.is_empty() {
        None
    } else {
        Some(transformed.content)
    };
    let embeds = if settings.no_embeds {
        Vec::new()
    } else {
        transformed.embeds
    };
    let files = if settings.no_attachments {
        Vec::new()
    } else {
        transformed.attachments
    };

    WebhookPayload {
        content,
        embeds,
        files,
        thread_name: thread.map(|t| t.name.clone()),
    }
}
