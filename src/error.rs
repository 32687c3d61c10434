//! Error types for providers, stores and dispatch operations.

use thiserror::Error;

/// Tagged failure of an external geocoding or routing call.
///
/// These never reach callers of the dispatch operations: the call site
/// applies a deterministic fallback chosen from the tag and logs it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,

    #[error("provider returned HTTP {0}")]
    Status(u16),

    #[error("provider answered with code {code}")]
    NoRoute { code: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    /// Stable tag used in fallback log lines.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Status(_) => "http_status",
            Self::NoRoute { .. } => "no_route",
            Self::Malformed(_) => "malformed",
            Self::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Status(status.as_u16())
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Failure reported by one of the persistence collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("store backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    /// A stop had neither coordinates nor an address to geocode.
    #[error("stop {stop} has no coordinates and no address")]
    MissingCoordinates { stop: String },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("courier {0} not found")]
    CourierNotFound(i64),

    #[error("order {0} not found")]
    OrderNotFound(i64),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
