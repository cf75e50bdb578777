//! Error types for queue operations.
//!
//! Failures fall into three groups that callers usually want to tell apart:
//! the remote service refused a request ([`TransportError`]), the service
//! answered with something this client does not understand
//! ([`QueueError::Decode`]), or the request was rejected locally before any
//! network traffic ([`ValidationError`]). An empty queue is not an error.

use thiserror::Error;

/// Comprehensive error type for all queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to decode {context} response: {message}")]
    Decode { context: String, message: String },

    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl QueueError {
    /// Build a decode error for the named response shape.
    pub(crate) fn decode(context: &str, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            context: context.to_string(),
            message: message.to_string(),
        }
    }

    /// HTTP status returned by the service, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport(TransportError::Http { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Check if error is transient and the same request may succeed later.
    ///
    /// This client never retries on its own; the classification exists so
    /// callers can build their own policy.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_transient(),
            Self::Decode { .. } => false,
            Self::Encode(_) => false,
            Self::Validation(_) => false,
            Self::Configuration(_) => false,
        }
    }
}

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The service answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// No status was received (DNS, TLS, connect, timeout, body read).
    #[error("Connection failed: {message}")]
    Connection { message: String },
}

impl TransportError {
    /// Service-provided error text.
    ///
    /// IronMQ reports errors as `{"msg": "..."}`; when the body has that
    /// shape the `msg` value is returned, otherwise the raw body.
    pub fn message(&self) -> String {
        match self {
            Self::Http { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("msg").and_then(|m| m.as_str()).map(str::to_string))
                .unwrap_or_else(|| body.clone()),
            Self::Connection { message } => message.clone(),
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Connection { .. } => true,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {key}")]
    Missing { key: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },
}

/// Validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
