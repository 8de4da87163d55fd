//! Request and response bodies of the link-resolution automation service.

use serde::{Deserialize, Serialize};

/// `POST /links` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveLinkRequest {
    pub url: String,
}

/// `POST /links` response. `link` is `None` when the service could not
/// produce an affiliate link for the URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveLinkResponse {
    #[serde(default)]
    pub link: Option<String>,
}

/// `GET /ready` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub ready: bool,
}
