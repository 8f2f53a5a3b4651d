//! In-process HTTP server for client tests.
//!
//! Binds `127.0.0.1:0`, records every request it receives and answers each
//! one with the next queued [`CannedResponse`], whatever the method or path.
//! When the queue is empty it answers with a JSON-RPC error so a test that
//! forgot to enqueue fails loudly instead of hanging.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;

/// One request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    /// The body parsed as JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_slice(&self.body)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// The reply to one request.
#[derive(Debug, Clone)]
pub struct CannedResponse {
    status: StatusCode,
    body: Bytes,
    delay: Option<Duration>,
    trickle: Option<(usize, Duration)>,
}

impl CannedResponse {
    /// `200` with `{"result": result}`. `result` should already be the array.
    pub fn result(result: Value) -> Self {
        Self::json(200, json!({ "version": "1.1", "result": result }))
    }

    /// `500` with a JSON-RPC error object.
    pub fn error(code: i64, message: &str) -> Self {
        Self::json(
            500,
            json!({
                "version": "1.1",
                "error": { "name": "JSONRPCError", "code": code, "message": message },
            }),
        )
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self::raw(status, body.to_string())
    }

    /// Any status with an arbitrary body.
    pub fn raw(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.into(),
            delay: None,
            trickle: None,
        }
    }

    /// Waits before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sends the body `chunk_size` bytes at a time, pausing `interval`
    /// between chunks.
    pub fn trickled(mut self, chunk_size: usize, interval: Duration) -> Self {
        self.trickle = Some((chunk_size.max(1), interval));
        self
    }
}

fn trickle_body(body: Bytes, chunk_size: usize, interval: Duration) -> Body {
    let (tx, rx) = mpsc::channel::<Result<Bytes, std::io::Error>>(1);
    tokio::spawn(async move {
        let mut rest = body;
        while !rest.is_empty() {
            let chunk = rest.split_to(chunk_size.min(rest.len()));
            if tx.send(Ok(chunk)).await.is_err() {
                return;
            }
            sleep(interval).await;
        }
    });
    Body::from_stream(ReceiverStream::new(rx))
}

impl IntoResponse for CannedResponse {
    fn into_response(self) -> Response {
        let body = match self.trickle {
            Some((chunk_size, interval)) => trickle_body(self.body, chunk_size, interval),
            None => Body::from(self.body),
        };
        (
            self.status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[derive(Debug, Default)]
struct Script {
    queue: VecDeque<CannedResponse>,
    seen: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<Script>>;

fn lock(shared: &Shared) -> std::sync::MutexGuard<'_, Script> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn handle_any(
    State(shared): State<Shared>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> CannedResponse {
    let reply = {
        let mut script = lock(&shared);
        script.seen.push(RecordedRequest {
            method,
            path: uri.path().to_string(),
            headers,
            body,
        });
        script.queue.pop_front()
    };

    let reply = reply.unwrap_or_else(|| CannedResponse::error(-32603, "no canned response queued"));
    if let Some(delay) = reply.delay {
        sleep(delay).await;
    }
    reply
}

pub struct JsonRpcTestServer {
    addr: SocketAddr,
    shared: Shared,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl JsonRpcTestServer {
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let shared = Shared::default();
        let app = Router::new().fallback(handle_any).with_state(shared.clone());

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = serve.await;
        });

        Ok(Self {
            addr,
            shared,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://127.0.0.1:<port>` followed by `path`.
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Queues the reply for the next unanswered request.
    pub fn enqueue(&self, response: CannedResponse) {
        lock(&self.shared).queue.push_back(response);
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.shared).seen.clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.shared).seen.len()
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for JsonRpcTestServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
