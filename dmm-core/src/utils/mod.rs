pub mod link_extractor;
pub mod link_rewriter;
pub mod payload;
pub mod text_transformer;

pub use link_extractor::LinkExtractor;
pub use link_rewriter::{REWRITTEN_MARKER, rewrite_links};
pub use payload::build_payload;
pub use text_transformer::{FIELD_PLACEHOLDER, TransformedMessage};
