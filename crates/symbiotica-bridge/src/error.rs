//! Request errors and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0}")]
    NotFound(String),

    /// A collaborator (document API, completion API, article fetch) or a
    /// configuration gap failed the request.
    #[error("{context}")]
    Upstream {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl BridgeError {
    pub fn upstream(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Upstream {
            context,
            source: source.into(),
        }
    }

    /// Closure for `map_err` that wraps any error under `context`.
    pub fn within<E: Into<BoxError>>(context: &'static str) -> impl FnOnce(E) -> Self {
        move |source| Self::upstream(context, source)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Upstream { context, source } => {
                error!(error = %source, "{context}");
                json!({ "error": context, "details": source.to_string() })
            }
            other => {
                warn!(status = status.as_u16(), error = %other, "request rejected");
                json!({ "error": other.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Trimmed value of a required text field.
pub fn required(value: Option<String>, field: &'static str) -> Result<String, BridgeError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(BridgeError::MissingField(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            BridgeError::MissingField("title").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BridgeError::NotFound("nope".into()).status(),
            StatusCode::NOT_FOUND
        );
        let upstream = BridgeError::upstream("Failed to create page", "boom");
        assert_eq!(upstream.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(upstream.to_string(), "Failed to create page");
    }

    #[test]
    fn test_missing_field_message() {
        assert_eq!(
            BridgeError::MissingField("pageId").to_string(),
            "Missing required field: pageId"
        );
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required(Some(" x ".into()), "title").unwrap(), "x");
        assert!(matches!(
            required(Some("  ".into()), "title"),
            Err(BridgeError::MissingField("title"))
        ));
        assert!(matches!(
            required(None, "title"),
            Err(BridgeError::MissingField("title"))
        ));
    }
}
