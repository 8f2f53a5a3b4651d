//! Error types for JSON-RPC calls.
//!
//! [`RpcError`] is the single error type every call returns. Its variants map
//! one-to-one onto the failure classes a caller needs to tell apart: bad client
//! setup, missing or rejected credentials, transport failures, errors reported
//! by the remote service, responses that cannot be decoded, and responses that
//! break the single-element result convention.
//!
//! Nothing in this crate retries or swallows an error. Callers decide.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed error used as the source of transport-level failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// ---------------------------------------------------------------------------
// Remote error payload
// ---------------------------------------------------------------------------

/// The `error` member of a JSON-RPC response, passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    /// Error class name reported by the server (e.g. `"JSONRPCError"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Numeric error code.
    pub code: i64,

    /// Human-readable message.
    pub message: String,

    /// Additional data, typically a server-side traceback.
    ///
    /// Servers of this family send it under `error`; `data` is the JSON-RPC
    /// spelling. Both are accepted.
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} {}: {}", self.code, self.message),
            None => write!(f, "{}: {}", self.code, self.message),
        }
    }
}

// ---------------------------------------------------------------------------
// Call errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while constructing a client or invoking a
/// remote method.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The client is set up in a way that cannot be used.
    ///
    /// Produced by: malformed endpoint, credential over plaintext HTTP without
    /// an explicit override, unbuildable HTTP client, invalid environment
    /// configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// A credential is required but absent, or the auth service rejected it.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Why the call or construction was refused.
        message: String,
    },

    /// The HTTP exchange failed: connection, timeout, TLS, unexpected status,
    /// or writing the captured response.
    #[error("I/O error calling {method}: {source}")]
    Io {
        /// Wire method name of the failed call (or the auth operation).
        method: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },

    /// The remote service answered with a JSON-RPC error.
    #[error("{method} failed on the server: {error}")]
    Server {
        /// Wire method name of the failed call.
        method: String,
        /// The error object exactly as the server sent it.
        error: ServerError,
    },

    /// The argument list could not be encoded as JSON.
    #[error("Cannot serialize arguments of {method}: {source}")]
    Serialize {
        /// Wire method name of the failed call.
        method: String,
        /// Encoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("Cannot deserialize response of {method}: {source}")]
    Deserialize {
        /// Wire method name of the failed call.
        method: String,
        /// Decoder error.
        #[source]
        source: serde_json::Error,
    },

    /// The result array length contradicts the single-value convention.
    #[error("{method} returned {actual} result elements, expected {expected}")]
    ProtocolViolation {
        /// Wire method name of the offending call.
        method: String,
        /// Number of elements the convention requires.
        expected: usize,
        /// Number of elements received.
        actual: usize,
    },
}

impl RpcError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub(crate) fn io(method: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Io {
            method: method.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for JSON-RPC errors: a server-reported error or a local
    /// encoding/decoding failure.
    pub fn is_json_rpc(&self) -> bool {
        matches!(
            self,
            Self::Server { .. } | Self::Serialize { .. } | Self::Deserialize { .. }
        )
    }

    /// The server's error payload, if this is a server-reported error.
    pub fn server_error(&self) -> Option<&ServerError> {
        match self {
            Self::Server { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The wire method name the error relates to, where there is one.
    pub fn method(&self) -> Option<&str> {
        match self {
            Self::Io { method, .. }
            | Self::Server { method, .. }
            | Self::Serialize { method, .. }
            | Self::Deserialize { method, .. }
            | Self::ProtocolViolation { method, .. } => Some(method),
            Self::Configuration { .. } | Self::Unauthorized { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_accepts_both_data_spellings() {
        let e: ServerError = serde_json::from_str(
            r#"{"name":"JSONRPCError","code":-32500,"message":"boom","error":"Traceback..."}"#,
        )
        .unwrap();
        assert_eq!(e.data, Some(serde_json::json!("Traceback...")));

        let e: ServerError =
            serde_json::from_str(r#"{"code":-1,"message":"boom","data":{"k":1}}"#).unwrap();
        assert_eq!(e.name, None);
        assert_eq!(e.data, Some(serde_json::json!({"k": 1})));
    }

    #[test]
    fn display_names_method_and_code() {
        let err = RpcError::Server {
            method: "Svc.run".into(),
            error: ServerError {
                name: None,
                code: -1,
                message: "boom".into(),
                data: None,
            },
        };
        assert_eq!(err.to_string(), "Svc.run failed on the server: -1: boom");
        assert!(err.is_json_rpc());
        assert_eq!(err.method(), Some("Svc.run"));
    }

    #[test]
    fn io_is_not_json_rpc() {
        let err = RpcError::io("Svc.run", "connection refused");
        assert!(!err.is_json_rpc());
        assert!(err.server_error().is_none());
    }
}
