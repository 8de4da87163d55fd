//! Candidate link extraction.

use dmm_sdk::objects::WebhookPayload;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// A URL candidate: scheme followed by everything up to the next whitespace.
#[allow(clippy::expect_used)]
pub(crate) static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("valid url pattern"));

/// Pulls allowlisted URLs out of the text a mirrored message will carry.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    allowed_domains: Vec<String>,
}

impl LinkExtractor {
    pub fn new(allowed_domains: Vec<String>) -> Self {
        Self { allowed_domains }
    }

    /// Every URL in `content` and in each embed's description and url, in
    /// order of first appearance, without duplicates.
    pub fn extract_all(payload: &WebhookPayload) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        let texts = payload.content.iter().chain(
            payload
                .embeds
                .iter()
                .flat_map(|e| e.description.iter().chain(e.url.iter())),
        );
        for text in texts {
            for found in URL_PATTERN.find_iter(text) {
                let url = found.as_str();
                if seen.insert(url) {
                    urls.push(url.to_owned());
                }
            }
        }
        urls
    }

    /// URLs of `payload` that contain an allowlisted domain.
    pub fn extract(&self, payload: &WebhookPayload) -> Vec<String> {
        Self::extract_all(payload)
            .into_iter()
            .filter(|url| self.is_allowed(url))
            .collect()
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|domain| url.contains(domain.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_sdk::objects::Embed;

    fn extractor() -> LinkExtractor {
        LinkExtractor::new(vec!["mavely".into()])
    }

    #[test]
    fn test_scans_content_and_embeds() {
        let payload = WebhookPayload {
            content: Some("Check https://mavely.example/x?ref=1 now".into()),
            embeds: vec![Embed {
                description: Some("also http://mavely.example/y".into()),
                url: Some("https://mavely.example/z".into()),
                title: Some("https://mavely.example/title-is-not-scanned".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            extractor().extract(&payload),
            vec![
                "https://mavely.example/x?ref=1",
                "http://mavely.example/y",
                "https://mavely.example/z",
            ]
        );
    }

    #[test]
    fn test_duplicates_collapse_in_first_seen_order() {
        let payload = WebhookPayload {
            content: Some(
                "https://mavely.example/b https://mavely.example/a https://mavely.example/b"
                    .into(),
            ),
            embeds: vec![Embed {
                url: Some("https://mavely.example/a".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            extractor().extract(&payload),
            vec!["https://mavely.example/b", "https://mavely.example/a"]
        );
    }

    #[test]
    fn test_non_allowlisted_urls_are_filtered() {
        let payload = WebhookPayload {
            content: Some("https://other.example/p and https://mavely.example/q".into()),
            ..Default::default()
        };
        assert_eq!(extractor().extract(&payload), vec!["https://mavely.example/q"]);
        assert_eq!(LinkExtractor::extract_all(&payload).len(), 2);
    }

    #[test]
    fn test_no_text_yields_nothing() {
        assert!(extractor().extract(&WebhookPayload::default()).is_empty());
    }
}
