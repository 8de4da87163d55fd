use super::link_extractor::URL_PATTERN;
use dmm_sdk::objects::WebhookPayload;
use std::collections::HashMap;

/// Prefix marking a text field whose links were rewritten.
pub const REWRITTEN_MARKER: &str = "🟠 ";

/// Substitute resolved links into the payload.
///
/// `content` and every embed `description` get [`REWRITTEN_MARKER`] once
/// when at least one link in them changed. Embed `url` values are only
/// substituted. Only whole URL occurrences that appear as keys of `resolved`
/// are replaced; every other URL, including one that merely starts with a
/// resolved URL, is left byte-for-byte.
pub fn rewrite_links(payload: &mut WebhookPayload, resolved: &HashMap<String, String>) {
    if resolved.iter().all(|(raw, link)| raw == link) {
        return;
    }

    if let Some(content) = &mut payload.content {
        rewrite_text(content, resolved);
    }
    for embed in &mut payload.embeds {
        if let Some(description) = &mut embed.description {
            rewrite_text(description, resolved);
        }
        if let Some(url) = &mut embed.url {
            substitute(url, resolved);
        }
    }
}

fn rewrite_text(text: &mut String, resolved: &HashMap<String, String>) {
    if substitute(text, resolved) {
        text.insert_str(0, REWRITTEN_MARKER);
    }
}

fn substitute(text: &mut String, resolved: &HashMap<String, String>) -> bool {
    let mut rebuilt = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for found in URL_PATTERN.find_iter(text) {
        let Some(link) = resolved.get(found.as_str()) else {
            continue;
        };
        if link == found.as_str() {
            continue;
        }
        rebuilt.push_str(&text[last..found.start()]);
        rebuilt.push_str(link);
        last = found.end();
        changed = true;
    }

    if changed {
        rebuilt.push_str(&text[last..]);
        *text = rebuilt;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use dmm_sdk::objects::Embed;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_content_gets_marker_once() {
        let mut payload = WebhookPayload {
            content: Some("Check https://mavely.example/x?ref=1".into()),
            ..Default::default()
        };
        rewrite_links(
            &mut payload,
            &map(&[("https://mavely.example/x?ref=1", "https://aff.example/abc")]),
        );
        assert_eq!(
            payload.content.as_deref(),
            Some("🟠 Check https://aff.example/abc")
        );
    }

    #[test]
    fn test_embed_url_has_no_marker() {
        let mut payload = WebhookPayload {
            embeds: vec![Embed {
                description: Some("a https://mavely.example/1 b https://mavely.example/2".into()),
                url: Some("https://mavely.example/1".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        rewrite_links(
            &mut payload,
            &map(&[
                ("https://mavely.example/1", "https://aff.example/1"),
                ("https://mavely.example/2", "https://aff.example/2"),
            ]),
        );
        let embed = &payload.embeds[0];
        assert_eq!(
            embed.description.as_deref(),
            Some("🟠 a https://aff.example/1 b https://aff.example/2")
        );
        assert_eq!(embed.url.as_deref(), Some("https://aff.example/1"));
    }

    #[test]
    fn test_prefix_urls_replaced_independently() {
        let mut payload = WebhookPayload {
            content: Some("https://mavely.example/a https://mavely.example/ab".into()),
            ..Default::default()
        };
        rewrite_links(
            &mut payload,
            &map(&[
                ("https://mavely.example/a", "https://aff.example/short"),
                ("https://mavely.example/ab", "https://aff.example/long"),
            ]),
        );
        assert_eq!(
            payload.content.as_deref(),
            Some("🟠 https://aff.example/short https://aff.example/long")
        );
    }

    #[test]
    fn test_passthrough_url_sharing_prefix_is_kept() {
        let mut payload = WebhookPayload {
            content: Some("a https://mavely.example/a b https://mavely.example/ab".into()),
            embeds: vec![Embed {
                url: Some("https://mavely.example/ab".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        rewrite_links(
            &mut payload,
            &map(&[("https://mavely.example/a", "https://aff.example/A")]),
        );
        assert_eq!(
            payload.content.as_deref(),
            Some("🟠 a https://aff.example/A b https://mavely.example/ab")
        );
        assert_eq!(
            payload.embeds[0].url.as_deref(),
            Some("https://mavely.example/ab")
        );
    }

    #[test]
    fn test_repeated_url_replaced_everywhere() {
        let mut payload = WebhookPayload {
            content: Some("https://mavely.example/x and again https://mavely.example/x".into()),
            ..Default::default()
        };
        rewrite_links(
            &mut payload,
            &map(&[("https://mavely.example/x", "https://aff.example/x")]),
        );
        assert_eq!(
            payload.content.as_deref(),
            Some("🟠 https://aff.example/x and again https://aff.example/x")
        );
    }

    #[test]
    fn test_untouched_fields_keep_no_marker() {
        let mut payload = WebhookPayload {
            content: Some("nothing to see".into()),
            embeds: vec![Embed {
                description: Some("https://other.example/x".into()),
                ..Default::default()
            }],
            ..Default::default()
        };
        let before = payload.clone();
        rewrite_links(
            &mut payload,
            &map(&[("https://mavely.example/x", "https://aff.example/x")]),
        );
        assert_eq!(payload, before);
    }
}
