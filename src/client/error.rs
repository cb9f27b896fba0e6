//! Error types for PocketBase client operations

use thiserror::Error;

/// Structured error types for PocketBase client operations
#[derive(Debug, Error)]
pub enum ClientError {
    /// Obtaining or refreshing the auth token failed
    #[error("[auth] authorization failed: {source}")]
    Authorization {
        #[source]
        source: Box<ClientError>,
    },

    /// The request never produced a response (connect, DNS, timeout)
    #[error("[{op}] can't send request to pocketbase: {source}")]
    Transport {
        op: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// PocketBase answered with a status >= 400
    #[error("[{op}] pocketbase returned status: {status}, msg: {body}, err invalid response")]
    InvalidResponse {
        op: &'static str,
        status: u16,
        body: String,
    },

    /// A successful response body did not match the expected shape
    #[error("[{op}] can't unmarshal response: {source}")]
    Decode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized
    #[error("[{op}] can't serialize request body: {source}")]
    Encode {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration field validation failed
    #[error("Invalid {field}: {message}")]
    ConfigValidation { field: String, message: String },
}

impl ClientError {
    pub fn authorization(source: ClientError) -> Self {
        Self::Authorization { source: Box::new(source) }
    }

    pub fn transport(op: &'static str, source: reqwest::Error) -> Self {
        Self::Transport { op, source }
    }

    pub fn invalid_response(op: &'static str, status: u16, body: impl Into<String>) -> Self {
        Self::InvalidResponse { op, status, body: body.into() }
    }

    pub fn decode(op: &'static str, source: serde_json::Error) -> Self {
        Self::Decode { op, source }
    }

    pub fn encode(op: &'static str, source: serde_json::Error) -> Self {
        Self::Encode { op, source }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a configuration field validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation { field: field.into(), message: message.into() }
    }

    /// True when this error, or the error it wraps, is the invalid-response
    /// sentinel. Holds for any operation, including a failed auth exchange.
    pub fn is_invalid_response(&self) -> bool {
        match self {
            ClientError::InvalidResponse { .. } => true,
            ClientError::Authorization { source } => source.is_invalid_response(),
            _ => false,
        }
    }

    /// HTTP status carried by an invalid response, looking through the auth wrapper
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::InvalidResponse { status, .. } => Some(*status),
            ClientError::Authorization { source } => source.status(),
            _ => None,
        }
    }

    /// Check if this error is retryable at the transport layer
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } => is_retryable_transport(source),
            _ => false,
        }
    }
}

/// Connection, timeout and request-level failures are retried; body and
/// redirect failures are not.
pub(crate) fn is_retryable_transport(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_request()
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("not json").unwrap_err()
    }

    #[test]
    fn test_error_creation() {
        let err = ClientError::config("base url is required");
        assert!(matches!(err, ClientError::Config(_)));
        assert_eq!(err.to_string(), "Configuration error: base url is required");
    }

    #[test]
    fn test_invalid_response_message() {
        let err = ClientError::invalid_response("one", 404, r#"{"message":"not found"}"#);
        assert_eq!(
            err.to_string(),
            r#"[one] pocketbase returned status: 404, msg: {"message":"not found"}, err invalid response"#
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_invalid_response_through_authorization() {
        let err = ClientError::authorization(ClientError::invalid_response("auth", 400, ""));
        assert!(err.is_invalid_response());
        assert_eq!(err.status(), Some(400));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_decode_is_not_invalid_response() {
        let err = ClientError::decode("list", decode_error());
        assert!(!err.is_invalid_response());
        assert!(err.to_string().starts_with("[list] can't unmarshal response"));
    }

    #[test]
    fn test_non_transport_errors_are_not_retryable() {
        assert!(!ClientError::invalid_response("list", 503, "").is_retryable());
        assert!(!ClientError::decode("list", decode_error()).is_retryable());
        assert!(!ClientError::config("test").is_retryable());
    }
}
