//! Error types for the SilverCare domain.
//!
//! Uses `thiserror` for ergonomic error definitions. Each bounded context
//! has its own enum; the recovery policy (failover, degrade to nothing)
//! lives with the callers, so none of these ever reach the HTTP caller.

use thiserror::Error;

/// A failed attempt against one chat-completion provider.
///
/// `Clone` so failover tests can hand out the same error repeatedly.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider returned no usable text")]
    EmptyResponse,
}

/// A failed search-augmentation attempt. Always recovered locally.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Search API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed search response: {0}")]
    MalformedResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_status() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn empty_response_display() {
        assert!(
            ProviderError::EmptyResponse
                .to_string()
                .contains("no usable text")
        );
    }

    #[test]
    fn search_error_displays_reason() {
        let err = SearchError::Network("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
    }
}
