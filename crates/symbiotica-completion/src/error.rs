//! Completion API error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request to completion API timed out")]
    Timeout,

    #[error("completion API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("completion API returned no content")]
    EmptyResponse,
}

impl CompletionError {
    pub fn transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err)
        }
    }
}
