//! Client-wide call configuration.
//!
//! [`ClientConfig`] holds every setting that affects how a call is sent. A
//! client keeps one behind a lock and each call works from a clone taken when
//! the call starts, so a setter never changes a call already in flight.

use std::time::Duration;

use crate::RpcError;

/// Environment variable names read by [`ClientConfig::from_env`].
pub mod env {
    /// Read timeout in milliseconds; `0` means no timeout.
    pub const TIMEOUT_MS: &str = "FEATURE_VALUES_TIMEOUT_MS";
    /// `true`/`false`: allow sending credentials over plain `http`.
    pub const ALLOW_INSECURE_HTTP: &str = "FEATURE_VALUES_ALLOW_INSECURE_HTTP";
    /// `true`/`false`: accept any TLS certificate.
    pub const TRUST_ALL_CERTS: &str = "FEATURE_VALUES_TRUST_ALL_CERTS";
    /// `true`/`false`: stream request bodies.
    pub const STREAMING: &str = "FEATURE_VALUES_STREAMING";
    /// Service version to pin; unset or empty means the server default.
    pub const SERVICE_VERSION: &str = "FEATURE_VALUES_SERVICE_VERSION";
}

/// Settings applied to every call a client issues.
///
/// Defaults are the conservative ones: no read timeout override, plaintext
/// credentials refused, certificates verified, bodies buffered, no version pin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum time to wait for the response. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,

    /// Allow a credential to be sent over a plain `http` endpoint.
    pub insecure_http_allowed: bool,

    /// Accept any server certificate, including self-signed ones.
    pub trust_all_certificates: bool,

    /// Stream the request body in chunks instead of buffering it.
    ///
    /// Many servers do not accept chunked request bodies.
    pub streaming_mode: bool,

    /// Service version appended to every method name as `:version`.
    pub service_version: Option<String>,
}

impl ClientConfig {
    /// Create config from environment variables (see [`env`]).
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] if a variable is set to a value that does
    /// not parse.
    pub fn from_env() -> Result<Self, RpcError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RpcError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(env::TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                RpcError::configuration(format!("{} must be an integer, got '{raw}'", env::TIMEOUT_MS))
            })?;
            config.read_timeout = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(raw) = lookup(env::ALLOW_INSECURE_HTTP) {
            config.insecure_http_allowed = parse_bool(env::ALLOW_INSECURE_HTTP, &raw)?;
        }
        if let Some(raw) = lookup(env::TRUST_ALL_CERTS) {
            config.trust_all_certificates = parse_bool(env::TRUST_ALL_CERTS, &raw)?;
        }
        if let Some(raw) = lookup(env::STREAMING) {
            config.streaming_mode = parse_bool(env::STREAMING, &raw)?;
        }
        config.service_version = lookup(env::SERVICE_VERSION).filter(|v| !v.trim().is_empty());

        Ok(config)
    }

    /// Set the read timeout. `Duration::ZERO` is treated as no timeout.
    pub fn with_read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    /// Allow or refuse credentials over plain `http`.
    pub fn with_insecure_http_allowed(mut self, allowed: bool) -> Self {
        self.insecure_http_allowed = allowed;
        self
    }

    /// Trust all certificates.
    pub fn with_trust_all_certificates(mut self, trust_all: bool) -> Self {
        self.trust_all_certificates = trust_all;
        self
    }

    /// Enable or disable streaming request bodies.
    pub fn with_streaming_mode(mut self, streaming: bool) -> Self {
        self.streaming_mode = streaming;
        self
    }

    /// Pin (or unpin with `None`) the service version.
    pub fn with_service_version(mut self, version: Option<String>) -> Self {
        self.service_version = version;
        self
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, RpcError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(RpcError::configuration(format!(
            "{key} must be a boolean, got '{raw}'"
        ))),
    }
}
