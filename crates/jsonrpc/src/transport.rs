//! HTTP transport seam.
//!
//! The caller hands a fully prepared [`HttpRequest`] to a [`Transport`] and
//! gets back the status code and raw body. [`HttpTransport`] is the
//! production implementation over `reqwest`; tests substitute their own to
//! observe what would have been sent.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use tracing::debug;

use crate::{BoxError, RpcError};

/// A request body produced incrementally.
pub type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync + 'static>>;

/// Body of an outgoing request.
pub enum RequestBody {
    /// The whole body, serialized up front.
    Buffered(Bytes),
    /// Chunks produced while the request is being sent.
    Streamed(BodyStream),
}

impl RequestBody {
    /// Drains the body into a single buffer.
    pub async fn into_bytes(self) -> io::Result<Bytes> {
        match self {
            Self::Buffered(bytes) => Ok(bytes),
            Self::Streamed(stream) => {
                let chunks: Vec<Bytes> = stream.try_collect().await?;
                Ok(chunks.concat().into())
            }
        }
    }

    /// Returns `true` for [`RequestBody::Streamed`].
    pub fn is_streamed(&self) -> bool {
        matches!(self, Self::Streamed(_))
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streamed(_) => f.write_str("Streamed"),
        }
    }
}

/// One POST to a JSON-RPC endpoint.
pub struct HttpRequest {
    pub url: Url,
    /// Value for the `Authorization` header, if a credential is attached.
    pub authorization: Option<String>,
    pub body: RequestBody,
    /// Longest silence tolerated while reading the response; `None` waits
    /// indefinitely. Data still arriving keeps the exchange alive.
    pub read_timeout: Option<Duration>,
    /// Skip certificate verification for this request.
    pub trust_all_certificates: bool,
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("url", &self.url.as_str())
            .field(
                "authorization",
                &self.authorization.as_ref().map(|_| "<redacted>"),
            )
            .field("body", &self.body)
            .field("read_timeout", &self.read_timeout)
            .field("trust_all_certificates", &self.trust_all_certificates)
            .finish()
    }
}

/// Status and raw body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Bytes,
}

/// Sends one HTTP request and returns the response.
///
/// Implementations report connection, timeout and TLS problems as `Err`; any
/// HTTP status, including errors, is a successful exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// `reqwest`-backed transport.
///
/// Certificate trust and read timeout are client-level settings in `reqwest`,
/// so one client is built per combination in use and reused after that.
#[derive(Debug)]
pub struct HttpTransport {
    clients: Mutex<HashMap<ClientKey, Client>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClientKey {
    trust_all_certificates: bool,
    read_timeout: Option<Duration>,
}

impl ClientKey {
    fn build(self) -> reqwest::Result<Client> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(self.trust_all_certificates);
        if let Some(timeout) = self.read_timeout {
            builder = builder.read_timeout(timeout);
        }
        builder.build()
    }
}

impl HttpTransport {
    /// Builds the default client: certificates verified, no read timeout.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self, RpcError> {
        let key = ClientKey {
            trust_all_certificates: false,
            read_timeout: None,
        };
        let client = key
            .build()
            .map_err(|e| RpcError::configuration(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            clients: Mutex::new(HashMap::from([(key, client)])),
        })
    }

    fn client_for(&self, key: ClientKey) -> reqwest::Result<Client> {
        let mut clients = self.clients.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = clients.get(&key) {
            return Ok(client.clone());
        }
        let client = key.build()?;
        debug!(?key, "built HTTP client");
        clients.insert(key, client.clone());
        Ok(client)
    }

    /// Number of distinct clients built so far.
    pub fn client_count(&self) -> usize {
        self.clients
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let client = self.client_for(ClientKey {
            trust_all_certificates: request.trust_all_certificates,
            read_timeout: request.read_timeout,
        })?;

        let mut builder = client
            .post(request.url)
            .header(CONTENT_TYPE, "application/json");
        if let Some(auth) = request.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }
        builder = match request.body {
            RequestBody::Buffered(bytes) => builder.body(bytes),
            RequestBody::Streamed(stream) => builder.body(reqwest::Body::wrap_stream(stream)),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "HTTP exchange complete");

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn buffered_body_drains_as_is() {
        let body = RequestBody::Buffered(Bytes::from_static(b"{\"a\":1}"));
        assert!(!body.is_streamed());
        assert_eq!(body.into_bytes().await.unwrap(), Bytes::from_static(b"{\"a\":1}"));
    }

    #[tokio::test]
    async fn streamed_body_is_concatenated() {
        let chunks: Vec<io::Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"[1,")),
            Ok(Bytes::from_static(b"2]")),
        ];
        let body = RequestBody::Streamed(Box::pin(futures_util::stream::iter(chunks)));
        assert!(body.is_streamed());
        assert_eq!(body.into_bytes().await.unwrap(), Bytes::from_static(b"[1,2]"));
    }

    #[test]
    fn clients_are_reused_per_trust_and_timeout() {
        let transport = HttpTransport::new().unwrap();
        assert_eq!(transport.client_count(), 1);

        let key = |trust_all_certificates, ms: Option<u64>| ClientKey {
            trust_all_certificates,
            read_timeout: ms.map(Duration::from_millis),
        };
        transport.client_for(key(false, None)).unwrap();
        assert_eq!(transport.client_count(), 1);
        transport.client_for(key(true, None)).unwrap();
        transport.client_for(key(false, Some(300))).unwrap();
        transport.client_for(key(false, Some(300))).unwrap();
        assert_eq!(transport.client_count(), 3);
    }

    #[test]
    fn debug_hides_the_authorization_value() {
        let request = HttpRequest {
            url: Url::parse("https://svc.example/rpc").unwrap(),
            authorization: Some("secret-token".into()),
            body: RequestBody::Buffered(Bytes::from_static(b"[]")),
            read_timeout: None,
            trust_all_certificates: false,
        };
        let shown = format!("{request:?}");
        assert!(!shown.contains("secret-token"));
        assert!(shown.contains("<redacted>"));
    }
}
