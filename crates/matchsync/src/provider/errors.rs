use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to an upstream match-data provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider signalled that its rate limit was exceeded.
    #[error("Rate limited by {resource}")]
    Throttled { resource: String },

    /// Non-success response other than throttling.
    #[error("Request to {resource} failed ({status} {status_text}): {body}")]
    Request {
        resource: String,
        status: u16,
        status_text: String,
        body: String,
    },

    /// Throttled on every attempt.
    #[error("Failed to fetch {resource} after {attempts} attempts")]
    RetriesExhausted { resource: String, attempts: u32 },

    /// Network or connection error.
    #[error("Network error: {0}")]
    Transport(#[from] HttpError),

    /// Response body did not deserialize.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record deserialized but is missing data needed to normalize it.
    #[error("Malformed match record {match_id}: {reason}")]
    Malformed { match_id: String, reason: String },

    /// The League client lock file is missing or unreadable.
    #[error("League client lock file error: {0}")]
    Lockfile(String),

    /// The MCP server answered with a JSON-RPC error or an unexpected payload.
    #[error("MCP error: {0}")]
    Mcp(String),

    /// The adapter is missing something it needs from its configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProviderError {
    /// Create a malformed-record error.
    #[inline]
    pub fn malformed(match_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            match_id: match_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this error is a throttling signal (retryable).
    #[inline]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::Throttled { .. } => Some(429),
            _ => None,
        }
    }
}

/// Extract a short error message suitable for display.
///
/// Takes the first line of an error message, which is useful for errors
/// that include multi-line response bodies.
#[inline]
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;
