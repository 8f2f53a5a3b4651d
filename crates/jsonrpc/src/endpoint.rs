//! Service endpoint: the immutable URL a client talks to.

use reqwest::Url;

use crate::RpcError;

/// Absolute `http` or `https` URL of a JSON-RPC service.
///
/// Fixed at client construction; a different endpoint means a new client.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint(Url);

impl Endpoint {
    /// Parses and checks an endpoint URL.
    ///
    /// # Errors
    ///
    /// [`RpcError::Configuration`] if `url` does not parse or its scheme is
    /// neither `http` nor `https`.
    pub fn parse(url: &str) -> Result<Self, RpcError> {
        let parsed = Url::parse(url)
            .map_err(|e| RpcError::configuration(format!("invalid endpoint URL '{url}': {e}")))?;
        Self::from_url(parsed)
    }

    /// Wraps an already-parsed URL after checking its scheme.
    pub fn from_url(url: Url) -> Result<Self, RpcError> {
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(RpcError::configuration(format!(
                "unsupported endpoint scheme '{other}' in '{url}'"
            ))),
        }
    }

    /// Returns `true` for `https` endpoints.
    pub fn is_secure(&self) -> bool {
        self.0.scheme() == "https"
    }

    /// The underlying URL.
    pub fn url(&self) -> &Url {
        &self.0
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Endpoint {
    type Err = RpcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
