//! Mirror configuration.

use serde::{Deserialize, Serialize};

/// Match pattern that replaces the whole field instead of a substring.
pub const WILDCARD: &str = "*";

/// One mirror: a destination webhook fed by one or more source channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Destination webhook URL.
    pub webhook: String,
    /// Source channel ids.
    pub channels: Vec<String>,
    #[serde(default)]
    pub settings: TransformSettings,
}

/// How a mirrored message is reshaped before relaying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformSettings {
    /// Drop the text content.
    #[serde(default)]
    pub no_content: bool,
    /// Drop all embeds.
    #[serde(default)]
    pub no_embeds: bool,
    /// Drop all attachments.
    #[serde(default)]
    pub no_attachments: bool,
    /// Find/replace rules, applied in declaration order.
    #[serde(default)]
    pub replacers: Vec<Replacer>,
}

/// A find/replace rule targeting one message field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacer {
    /// Literal text to find, or [`WILDCARD`] to replace the whole field.
    pub replace: String,
    pub with: String,
    /// Field to rewrite. A rule without a target does nothing.
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub target: Option<FieldSelector>,
}

impl Replacer {
    pub fn is_wildcard(&self) -> bool {
        self.replace == WILDCARD
    }
}

/// The message fields a [`Replacer`] can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSelector {
    Content,
    EmbedAuthor,
    EmbedAuthorIcon,
    EmbedAuthorUrl,
    EmbedUrl,
    EmbedTitle,
    EmbedDescription,
    EmbedFieldsName,
    EmbedFieldsValue,
    EmbedFooter,
    EmbedFooterIcon,
}

impl std::fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldSelector::Content => "content",
            FieldSelector::EmbedAuthor => "embed_author",
            FieldSelector::EmbedAuthorIcon => "embed_author_icon",
            FieldSelector::EmbedAuthorUrl => "embed_author_url",
            FieldSelector::EmbedUrl => "embed_url",
            FieldSelector::EmbedTitle => "embed_title",
            FieldSelector::EmbedDescription => "embed_description",
            FieldSelector::EmbedFieldsName => "embed_fields_name",
            FieldSelector::EmbedFieldsValue => "embed_fields_value",
            FieldSelector::EmbedFooter => "embed_footer",
            FieldSelector::EmbedFooterIcon => "embed_footer_icon",
        };
        f.write_str(name)
    }
}
