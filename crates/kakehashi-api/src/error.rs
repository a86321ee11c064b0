use thiserror::Error;

use crate::provider::Provider;

/// Errors from the tracking-service API layer.
///
/// Public client operations never surface these; they log and return an
/// absent or empty result instead. The enum exists for the internal seams
/// (dispatcher, GraphQL plumbing) where propagation with `?` is the rule.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("auth error: {0}")]
    Auth(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("no GraphQL endpoint for provider {0}")]
    NoGraphQlEndpoint(Provider),
}
