//! The generic JSON-RPC caller.
//!
//! [`JsonClientCaller`] turns `(method, positional args, context)` into one
//! HTTP POST and the response body into a vector of typed results. It knows
//! nothing about any particular service; typed facades sit on top of it.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::auth::{AuthToken, Authenticator};
use crate::body::json_stream;
use crate::envelope::{decode_result, wire_method, Positional, RequestEnvelope};
use crate::transport::{HttpRequest, HttpTransport, RequestBody, Transport};
use crate::{ClientConfig, Endpoint, RpcContext, RpcError};

/// Whether a method needs a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// The call fails with [`RpcError::Unauthorized`] when no token is held.
    Required,
    /// The token is attached when held, and the call proceeds without one.
    Optional,
}

/// Static description of one remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSpec<'a> {
    /// Fully qualified name, `Service.method`, without any version suffix.
    pub method: &'a str,
    /// `false` for methods whose result is ignored.
    pub has_result: bool,
    pub auth: AuthPolicy,
}

impl<'a> CallSpec<'a> {
    pub const fn returning(method: &'a str, auth: AuthPolicy) -> Self {
        Self {
            method,
            has_result: true,
            auth,
        }
    }

    pub const fn void(method: &'a str, auth: AuthPolicy) -> Self {
        Self {
            method,
            has_result: false,
            auth,
        }
    }
}

/// Sends JSON-RPC calls to one endpoint.
///
/// Safe to share between tasks. Configuration setters take effect for calls
/// started after they return.
pub struct JsonClientCaller {
    endpoint: Endpoint,
    token: Option<AuthToken>,
    config: RwLock<ClientConfig>,
    transport: Arc<dyn Transport>,
    capture_next: Mutex<Option<PathBuf>>,
}

impl std::fmt::Debug for JsonClientCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonClientCaller")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token)
            .field("config", &self.config())
            .finish_non_exhaustive()
    }
}

impl JsonClientCaller {
    /// Anonymous caller over HTTP.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] if the HTTP client cannot be built.
    pub fn new(endpoint: Endpoint) -> Result<Self, RpcError> {
        Ok(Self::with_transport(
            endpoint,
            None,
            Arc::new(HttpTransport::new()?),
        ))
    }

    /// Caller holding a token that `authenticator` has validated.
    ///
    /// # Errors
    ///
    /// Whatever the authenticator reports, typically
    /// [`RpcError::Unauthorized`] for a rejected token.
    pub async fn with_token(
        endpoint: Endpoint,
        token: &str,
        authenticator: &dyn Authenticator,
    ) -> Result<Self, RpcError> {
        let token = authenticator.validate_token(token).await?;
        Self::with_validated_token(endpoint, token)
    }

    /// Caller holding a token obtained by logging in.
    ///
    /// # Errors
    ///
    /// Whatever the authenticator reports for the login attempt.
    pub async fn with_credentials(
        endpoint: Endpoint,
        user: &str,
        password: &str,
        authenticator: &dyn Authenticator,
    ) -> Result<Self, RpcError> {
        let token = authenticator.login(user, password).await?;
        Self::with_validated_token(endpoint, token)
    }

    /// Caller holding a token the application has already validated.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] if the HTTP client cannot be built.
    pub fn with_validated_token(endpoint: Endpoint, token: AuthToken) -> Result<Self, RpcError> {
        Ok(Self::with_transport(
            endpoint,
            Some(token),
            Arc::new(HttpTransport::new()?),
        ))
    }

    /// Caller over a custom [`Transport`].
    pub fn with_transport(
        endpoint: Endpoint,
        token: Option<AuthToken>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            endpoint,
            token,
            config: RwLock::new(ClientConfig::default()),
            transport,
            capture_next: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> ClientConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the whole configuration.
    pub fn set_config(&self, config: ClientConfig) {
        self.update(|c| *c = config);
    }

    fn update(&self, f: impl FnOnce(&mut ClientConfig)) {
        let mut guard = self.config.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard);
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.config().read_timeout
    }

    /// `None` or `Duration::ZERO` waits indefinitely.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) {
        self.update(|c| c.read_timeout = timeout.filter(|t| !t.is_zero()));
    }

    pub fn is_insecure_http_allowed(&self) -> bool {
        self.config().insecure_http_allowed
    }

    /// Allow the token to travel over a plain `http` endpoint.
    pub fn set_insecure_http_allowed(&self, allowed: bool) {
        self.update(|c| c.insecure_http_allowed = allowed);
    }

    #[deprecated(note = "use `is_insecure_http_allowed`")]
    pub fn is_auth_allowed_for_http(&self) -> bool {
        self.is_insecure_http_allowed()
    }

    #[deprecated(note = "use `set_insecure_http_allowed`")]
    pub fn set_auth_allowed_for_http(&self, allowed: bool) {
        self.set_insecure_http_allowed(allowed);
    }

    pub fn is_trust_all_certificates(&self) -> bool {
        self.config().trust_all_certificates
    }

    pub fn set_trust_all_certificates(&self, trust_all: bool) {
        self.update(|c| c.trust_all_certificates = trust_all);
    }

    pub fn is_streaming_mode(&self) -> bool {
        self.config().streaming_mode
    }

    pub fn set_streaming_mode(&self, streaming: bool) {
        self.update(|c| c.streaming_mode = streaming);
    }

    pub fn service_version(&self) -> Option<String> {
        self.config().service_version
    }

    /// Pins calls to `version`; `None` or an empty string clears the pin.
    pub fn set_service_version(&self, version: Option<String>) {
        self.update(|c| c.service_version = version.filter(|v| !v.is_empty()));
    }

    /// Writes the raw body of the next dispatched response to `path`.
    ///
    /// The slot is consumed by the first call that reaches the network, so
    /// calls refused before sending leave it armed.
    pub fn set_file_for_next_rpc_response(&self, path: impl Into<PathBuf>) {
        *self
            .capture_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(path.into());
    }

    fn take_capture(&self) -> Option<PathBuf> {
        self.capture_next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Performs one remote call and returns every element of the result
    /// array.
    ///
    /// # Errors
    ///
    /// - [`RpcError::Unauthorized`] when `spec.auth` is required and no token
    ///   is held; nothing is sent.
    /// - [`RpcError::Configuration`] when a token would be sent over plain
    ///   `http` without the insecure override; nothing is sent.
    /// - [`RpcError::Io`] for transport failures, capture write failures and
    ///   HTTP statuses other than 2xx and 500.
    /// - [`RpcError::Server`], [`RpcError::Serialize`] and
    ///   [`RpcError::Deserialize`] as described on those variants.
    #[tracing::instrument(level = "debug", skip_all, fields(method = spec.method))]
    pub async fn invoke<A, R>(
        &self,
        spec: CallSpec<'_>,
        args: A,
        context: Option<&RpcContext>,
    ) -> Result<Vec<R>, RpcError>
    where
        A: Positional,
        R: DeserializeOwned,
    {
        if spec.auth == AuthPolicy::Required && self.token.is_none() {
            return Err(RpcError::unauthorized(format!(
                "{} requires authentication but no token is configured",
                spec.method
            )));
        }

        let config = self.config();
        if self.token.is_some() && !self.endpoint.is_secure() && !config.insecure_http_allowed {
            return Err(RpcError::configuration(format!(
                "refusing to send a token over insecure endpoint {}",
                self.endpoint
            )));
        }

        let method = wire_method(spec.method, config.service_version.as_deref());
        let envelope = RequestEnvelope::new(method.clone(), args, context);
        let body = if config.streaming_mode {
            RequestBody::Streamed(json_stream(envelope))
        } else {
            let bytes = serde_json::to_vec(&envelope).map_err(|source| RpcError::Serialize {
                method: method.clone(),
                source,
            })?;
            RequestBody::Buffered(Bytes::from(bytes))
        };

        let capture = self.take_capture();
        let request = HttpRequest {
            url: self.endpoint.url().clone(),
            authorization: self.token.as_ref().map(|t| t.token().to_string()),
            body,
            read_timeout: config.read_timeout,
            trust_all_certificates: config.trust_all_certificates,
        };
        debug!(
            wire_method = %method,
            streamed = request.body.is_streamed(),
            authenticated = request.authorization.is_some(),
            "dispatching call"
        );

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| RpcError::io(&method, e))?;

        if let Some(path) = capture {
            tokio::fs::write(&path, &response.body)
                .await
                .map_err(|e| RpcError::io(&method, e))?;
            debug!(path = %path.display(), "response body captured");
        }

        // Servers of this family report method errors with status 500.
        if !(200..300).contains(&response.status) && response.status != 500 {
            return Err(RpcError::io(
                &method,
                format!("HTTP status {}", response.status),
            ));
        }

        decode_result(&method, &response.body, spec.has_result)
    }
}
