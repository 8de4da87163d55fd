//! Find/replace rules over message text fields.
//!
//! Each [`FieldSelector`] maps to one small function that rewrites exactly
//! that field on every embed that has it. Rules run in declaration order and
//! see each other's output.

use dmm_sdk::config::{FieldSelector, Replacer, TransformSettings};
use dmm_sdk::objects::{Attachment, Embed, InboundMessage};
use tracing::debug;

/// Zero-width space used for blank embed field names and values, which the
/// destination rejects.
pub const FIELD_PLACEHOLDER: &str = "\u{200B}";

/// A message after replacers ran, before suppression settings apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformedMessage {
    pub content: String,
    pub embeds: Vec<Embed>,
    pub attachments: Vec<Attachment>,
}

/// Apply every replacer of `settings` to a copy of `message`.
pub fn apply(message: &InboundMessage, settings: &TransformSettings) -> TransformedMessage {
    let mut transformed = TransformedMessage {
        content: message.content.clone(),
        embeds: message.embeds.clone(),
        attachments: message.attachments.clone(),
    };

    for replacer in &settings.replacers {
        match replacer.target {
            Some(selector) => apply_replacer(&mut transformed, selector, replacer),
            None => debug!(replace = %replacer.replace, "Replacer without target skipped"),
        }
    }

    for embed in &mut transformed.embeds {
        for field in &mut embed.fields {
            fill_blank(&mut field.name);
            fill_blank(&mut field.value);
        }
    }

    transformed
}

fn apply_replacer(message: &mut TransformedMessage, selector: FieldSelector, r: &Replacer) {
    let rewrite_embed: fn(&mut Embed, &Replacer) = match selector {
        FieldSelector::Content => {
            rewrite(&mut message.content, r);
            return;
        }
        FieldSelector::EmbedAuthor => author_name,
        FieldSelector::EmbedAuthorIcon => author_icon,
        FieldSelector::EmbedAuthorUrl => author_url,
        FieldSelector::EmbedUrl => url,
        FieldSelector::EmbedTitle => title,
        FieldSelector::EmbedDescription => description,
        FieldSelector::EmbedFieldsName => field_names,
        FieldSelector::EmbedFieldsValue => field_values,
        FieldSelector::EmbedFooter => footer_text,
        FieldSelector::EmbedFooterIcon => footer_icon,
    };

    for embed in &mut message.embeds {
        rewrite_embed(embed, r);
    }
}

fn author_name(embed: &mut Embed, r: &Replacer) {
    if let Some(author) = &mut embed.author {
        rewrite(&mut author.name, r);
    }
}

fn author_icon(embed: &mut Embed, r: &Replacer) {
    if let Some(author) = &mut embed.author {
        rewrite_present(&mut author.icon_url, r);
    }
}

fn author_url(embed: &mut Embed, r: &Replacer) {
    if let Some(author) = &mut embed.author {
        rewrite_present(&mut author.url, r);
    }
}

fn url(embed: &mut Embed, r: &Replacer) {
    rewrite_present(&mut embed.url, r);
}

fn title(embed: &mut Embed, r: &Replacer) {
    rewrite_present(&mut embed.title, r);
}

fn description(embed: &mut Embed, r: &Replacer) {
    rewrite_present(&mut embed.description, r);
}

fn field_names(embed: &mut Embed, r: &Replacer) {
    for field in &mut embed.fields {
        rewrite(&mut field.name, r);
    }
}

fn field_values(embed: &mut Embed, r: &Replacer) {
    for field in &mut embed.fields {
        rewrite(&mut field.value, r);
    }
}

fn footer_text(embed: &mut Embed, r: &Replacer) {
    if let Some(footer) = embed.footer.as_mut().filter(|f| !f.text.is_empty()) {
        rewrite(&mut footer.text, r);
    }
}

fn footer_icon(embed: &mut Embed, r: &Replacer) {
    if let Some(footer) = &mut embed.footer {
        rewrite_present(&mut footer.icon_url, r);
    }
}

/// Empty values count as absent.
fn rewrite_present(value: &mut Option<String>, r: &Replacer) {
    if let Some(value) = value.as_mut().filter(|v| !v.is_empty()) {
        rewrite(value, r);
    }
}

/// Wildcard rules replace the whole value; other rules replace the first
/// literal occurrence.
fn rewrite(value: &mut String, r: &Replacer) {
    if r.is_wildcard() {
        value.clone_from(&r.with);
    } else if value.contains(&r.replace) {
        *value = value.replacen(&r.replace, &r.with, 1);
    }
}

fn fill_blank(value: &mut String) {
    if value.trim().is_empty() {
        *value = FIELD_PLACEHOLDER.to_owned();
    }
}
