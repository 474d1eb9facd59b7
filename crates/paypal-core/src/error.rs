//! # PayPal Error Types
//!
//! Typed error handling for the PayPal client.
//! All client operations return `Result<T, PayPalError>`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed underlying cause carried by connection and transport errors
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Code used when the provider error payload carries no `name`
pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";

/// Message used when the provider error payload carries no `message`
pub const DEFAULT_API_ERROR_MESSAGE: &str = "PayPal API Error";

/// A field-level issue reported by the PayPal API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Core error type for all PayPal client operations
#[derive(Debug, Error)]
pub enum PayPalError {
    /// The remote API answered with an error payload
    #[error("PayPal API error [{code}] (HTTP {http_status}): {message}")]
    Api {
        message: String,
        http_status: u16,
        code: String,
        debug_id: Option<String>,
        details: Vec<ErrorDetail>,
    },

    /// Network failure, timeout, or failed token refresh
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Credentials rejected by the token endpoint
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Malformed caller input
    #[error("Invalid request: {message}")]
    InvalidRequest {
        message: String,
        param: Option<String>,
    },

    /// Idempotency key reused with a different request
    #[error("Idempotency error: {0}")]
    Idempotency(String),

    /// Throttled by the provider
    #[error("Rate limit error: {0}")]
    RateLimit(String),

    /// Missing or invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Transport failure outside the taxonomy, passed through as-is
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),
}

impl PayPalError {
    /// Build an API error, applying the defaults used for incomplete payloads
    pub fn api(
        message: Option<String>,
        http_status: u16,
        code: Option<String>,
        debug_id: Option<String>,
        details: Option<Vec<ErrorDetail>>,
    ) -> Self {
        PayPalError::Api {
            message: message.unwrap_or_else(|| DEFAULT_API_ERROR_MESSAGE.to_string()),
            http_status,
            code: code.unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
            debug_id,
            details: details.unwrap_or_default(),
        }
    }

    /// Build a connection error wrapping its cause
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        PayPalError::Connection {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Build an invalid-request error naming the offending parameter
    pub fn invalid_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        PayPalError::InvalidRequest {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Discriminant tag of this error
    pub fn error_type(&self) -> &'static str {
        match self {
            PayPalError::Api { .. } => "api_error",
            PayPalError::Connection { .. } => "connection_error",
            PayPalError::Authentication(_) => "authentication_error",
            PayPalError::InvalidRequest { .. } => "invalid_request_error",
            PayPalError::Idempotency(_) => "idempotency_error",
            PayPalError::RateLimit(_) => "rate_limit_error",
            PayPalError::Configuration(_) => "configuration_error",
            PayPalError::Serialization(_) => "serialization_error",
            PayPalError::Transport(_) => "transport_error",
        }
    }

    /// Returns true if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PayPalError::Connection { .. } | PayPalError::RateLimit(_) => true,
            PayPalError::Api { http_status, .. } => *http_status >= 500 || *http_status == 429,
            _ => false,
        }
    }

    /// Provider code for API errors
    pub fn code(&self) -> Option<&str> {
        match self {
            PayPalError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Provider debug correlation id for API errors
    pub fn debug_id(&self) -> Option<&str> {
        match self {
            PayPalError::Api { debug_id, .. } => debug_id.as_deref(),
            _ => None,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PayPalError::Api { http_status, .. } => *http_status,
            PayPalError::Connection { .. } => 503,
            PayPalError::Authentication(_) => 401,
            PayPalError::InvalidRequest { .. } => 400,
            PayPalError::Idempotency(_) => 409,
            PayPalError::RateLimit(_) => 429,
            PayPalError::Configuration(_) | PayPalError::Serialization(_) => 500,
            PayPalError::Transport(_) => 502,
        }
    }
}

impl From<serde_json::Error> for PayPalError {
    fn from(err: serde_json::Error) -> Self {
        PayPalError::Serialization(err.to_string())
    }
}

/// Result type alias for PayPal operations
pub type PayPalResult<T> = Result<T, PayPalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_api_error_defaults() {
        let err = PayPalError::api(None, 500, None, None, None);
        match err {
            PayPalError::Api {
                message,
                code,
                details,
                debug_id,
                ..
            } => {
                assert_eq!(message, DEFAULT_API_ERROR_MESSAGE);
                assert_eq!(code, UNKNOWN_ERROR_CODE);
                assert!(details.is_empty());
                assert!(debug_id.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_error_type_tags() {
        assert_eq!(
            PayPalError::api(None, 404, Some("RESOURCE_NOT_FOUND".into()), None, None).error_type(),
            "api_error"
        );
        assert_eq!(
            PayPalError::connection("boom", "cause").error_type(),
            "connection_error"
        );
        assert_eq!(
            PayPalError::Authentication("bad creds".into()).error_type(),
            "authentication_error"
        );
        assert_eq!(
            PayPalError::invalid_param("missing", "plan_id").error_type(),
            "invalid_request_error"
        );
        assert_eq!(
            PayPalError::Idempotency("reused".into()).error_type(),
            "idempotency_error"
        );
        assert_eq!(
            PayPalError::RateLimit("slow down".into()).error_type(),
            "rate_limit_error"
        );
    }

    #[test]
    fn test_connection_error_keeps_source() {
        let err = PayPalError::connection("Failed to authenticate with PayPal", "socket closed");
        assert_eq!(err.source().map(|s| s.to_string()), Some("socket closed".to_string()));
    }

    #[test]
    fn test_retryable_errors() {
        assert!(PayPalError::connection("timeout", "t").is_retryable());
        assert!(PayPalError::api(None, 503, None, None, None).is_retryable());
        assert!(PayPalError::api(None, 429, None, None, None).is_retryable());
        assert!(!PayPalError::api(None, 404, None, None, None).is_retryable());
        assert!(!PayPalError::Authentication("x".into()).is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            PayPalError::api(None, 422, None, None, None).status_code(),
            422
        );
        assert_eq!(PayPalError::Idempotency("x".into()).status_code(), 409);
        assert_eq!(PayPalError::Configuration("x".into()).status_code(), 500);
    }

    #[test]
    fn test_error_detail_deserializes_partial_payload() {
        let detail: ErrorDetail = serde_json::from_str(
            r#"{"field":"/purchase_units/0/amount","issue":"INVALID_PARAMETER_VALUE"}"#,
        )
        .unwrap();
        assert_eq!(detail.issue, "INVALID_PARAMETER_VALUE");
        assert!(detail.description.is_none());
    }
}
