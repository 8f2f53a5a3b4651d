//! Generic JSON-RPC client core.
//!
//! Sends `{"method", "params", "context"}` envelopes to a single HTTP
//! endpoint and decodes `{"result"}` / `{"error"}` replies. Service-specific
//! facades (see the `feature-values` crate) describe each method with a
//! [`CallSpec`] and delegate to [`JsonClientCaller::invoke`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP, TLS, credential handling and wire framing all
//! live here. Nothing in this crate knows any method name or payload type.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`caller`] | [`JsonClientCaller`], [`CallSpec`], [`AuthPolicy`] |
//! | [`envelope`] | Positional argument lists, request/response framing |
//! | [`config`] | [`ClientConfig`] and its environment variables |
//! | [`context`] | Per-call provenance metadata |
//! | [`auth`] | Tokens and the [`Authenticator`] collaborator |
//! | [`transport`] | The [`Transport`] seam and its `reqwest` implementation |
//! | [`errors`] | [`RpcError`] and the server error payload |

pub mod auth;
mod body;
pub mod caller;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod envelope;
pub mod errors;
pub mod transport;

pub use auth::{AuthToken, Authenticator, HttpAuthenticator};
pub use caller::{AuthPolicy, CallSpec, JsonClientCaller};
pub use config::ClientConfig;
pub use context::{ContextEntry, RpcContext};
pub use endpoint::Endpoint;
pub use envelope::{NoArgs, Positional};
pub use errors::{BoxError, RpcError, ServerError};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody, Transport};
