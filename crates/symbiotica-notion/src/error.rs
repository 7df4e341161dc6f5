//! Document API error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request to document API timed out")]
    Timeout,

    #[error("document API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl NotionError {
    /// Classify a transport failure; timeouts get their own variant.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = NotionError::Api {
            status: 404,
            code: "object_not_found".to_string(),
            message: "Could not find page".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "document API error 404 (object_not_found): Could not find page"
        );
        assert_eq!(
            NotionError::Timeout.to_string(),
            "request to document API timed out"
        );
    }
}
