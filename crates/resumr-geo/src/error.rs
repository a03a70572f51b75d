use thiserror::Error;

use crate::types::ProviderKind;

/// Provider-level failures. These are logged and folded into
/// [`crate::Miss::Failed`]; the aggregator never returns them to callers.
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} provider returned HTTP {status}")]
    HttpStatus { provider: ProviderKind, status: u16 },

    /// The provider answered 200 but flagged the request in its body
    /// (e.g. `REQUEST_DENIED`, `OVER_QUERY_LIMIT`).
    #[error("{provider} provider returned status {status}: {message}")]
    Provider {
        provider: ProviderKind,
        status: String,
        message: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
