//! Credentials and the authentication collaborator.
//!
//! The client never interprets a token. It either receives one that is already
//! known to be good, or asks an [`Authenticator`] to validate a token or to
//! exchange a user name and password for one. Both happen only while a client
//! is being constructed.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::debug;

use crate::RpcError;

/// Default base URL of the auth service.
pub const DEFAULT_AUTH_URL: &str = "https://kbase.us/services/auth/";

/// Default username/password login endpoint.
pub const DEFAULT_LOGIN_URL: &str =
    "https://kbase.us/services/auth/api/legacy/KBase/Sessions/Login";

/// An opaque bearer credential and the user it was issued to.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    token: String,
    user_name: String,
}

impl AuthToken {
    /// Wraps a token that is already known to be valid.
    pub fn new(token: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_name: user_name.into(),
        }
    }

    /// The raw token, exactly as sent in the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_name(&self) -> &str {
        &self.user_name
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("token", &"<redacted>")
            .field("user_name", &self.user_name)
            .finish()
    }
}

/// Validates tokens and logs users in.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Checks `token` and returns it together with its owner.
    ///
    /// # Errors
    ///
    /// [`RpcError::Unauthorized`] if the token is rejected, [`RpcError::Io`] if
    /// the check cannot be performed.
    async fn validate_token(&self, token: &str) -> Result<AuthToken, RpcError>;

    /// Exchanges a user name and password for a token.
    ///
    /// # Errors
    ///
    /// Same as [`Authenticator::validate_token`].
    async fn login(&self, user: &str, password: &str) -> Result<AuthToken, RpcError>;
}

/// [`Authenticator`] talking to the auth service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: Client,
    token_url: Url,
    login_url: Url,
}

#[derive(Deserialize)]
struct TokenInfo {
    user: String,
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    error_msg: Option<String>,
}

impl HttpAuthenticator {
    /// Uses [`DEFAULT_AUTH_URL`] and [`DEFAULT_LOGIN_URL`].
    pub fn new() -> Result<Self, RpcError> {
        Self::with_urls(DEFAULT_AUTH_URL, DEFAULT_LOGIN_URL)
    }

    /// Uses a custom login endpoint and the default validation endpoint.
    pub fn with_login_url(login_url: &str) -> Result<Self, RpcError> {
        Self::with_urls(DEFAULT_AUTH_URL, login_url)
    }

    /// Uses a custom auth service base URL and login endpoint.
    ///
    /// Tokens are validated at `<auth_url>/api/V2/token`.
    pub fn with_urls(auth_url: &str, login_url: &str) -> Result<Self, RpcError> {
        let mut base = parse_url("auth service", auth_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let token_url = base
            .join("api/V2/token")
            .map_err(|e| RpcError::configuration(format!("invalid auth service URL: {e}")))?;
        let login_url = parse_url("login", login_url)?;
        let client = Client::builder()
            .build()
            .map_err(|e| RpcError::configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            client,
            token_url,
            login_url,
        })
    }
}

fn parse_url(what: &str, url: &str) -> Result<Url, RpcError> {
    Url::parse(url).map_err(|e| RpcError::configuration(format!("invalid {what} URL '{url}': {e}")))
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn validate_token(&self, token: &str) -> Result<AuthToken, RpcError> {
        const OP: &str = "auth.validate_token";

        let response = self
            .client
            .get(self.token_url.clone())
            .header(AUTHORIZATION, token)
            .send()
            .await
            .map_err(|e| RpcError::io(OP, e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "token validation answered");
        if status == StatusCode::UNAUTHORIZED {
            return Err(RpcError::unauthorized("token is not valid"));
        }
        if !status.is_success() {
            return Err(RpcError::io(OP, format!("auth service returned HTTP {status}")));
        }

        let info: TokenInfo = response.json().await.map_err(|e| RpcError::io(OP, e))?;
        Ok(AuthToken::new(token, info.user))
    }

    async fn login(&self, user: &str, password: &str) -> Result<AuthToken, RpcError> {
        const OP: &str = "auth.login";

        let response = self
            .client
            .post(self.login_url.clone())
            .form(&[
                ("user_id", user),
                ("password", password),
                ("fields", "un,token,user_id"),
            ])
            .send()
            .await
            .map_err(|e| RpcError::io(OP, e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "login answered");
        if status.is_server_error() {
            return Err(RpcError::io(OP, format!("auth service returned HTTP {status}")));
        }

        let reply: LoginReply = response.json().await.map_err(|e| RpcError::io(OP, e))?;
        match (reply.token, status.is_success()) {
            (Some(token), true) => {
                let owner = reply.user_id.unwrap_or_else(|| user.to_string());
                Ok(AuthToken::new(token, owner))
            }
            _ => Err(RpcError::unauthorized(
                reply
                    .error_msg
                    .unwrap_or_else(|| format!("login failed for user '{user}'")),
            )),
        }
    }
}
