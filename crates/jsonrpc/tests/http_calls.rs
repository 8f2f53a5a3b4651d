//! Calls over real HTTP against the local test server.

use std::time::Duration;

use jsonrpc::{
    AuthPolicy, AuthToken, CallSpec, ContextEntry, Endpoint, JsonClientCaller, NoArgs,
    RpcContext, RpcError,
};
use serde_json::{json, Value};
use testserver::{CannedResponse, JsonRpcTestServer};

const STATUS: CallSpec<'static> = CallSpec::returning("Svc.status", AuthPolicy::Optional);
const RUN: CallSpec<'static> = CallSpec::returning("Svc.run", AuthPolicy::Required);

fn anonymous(server: &JsonRpcTestServer) -> JsonClientCaller {
    JsonClientCaller::new(Endpoint::parse(&server.url("/rpc")).unwrap()).unwrap()
}

fn authenticated(server: &JsonRpcTestServer) -> JsonClientCaller {
    let caller = JsonClientCaller::with_validated_token(
        Endpoint::parse(&server.url("/rpc")).unwrap(),
        AuthToken::new("tok-123", "alice"),
    )
    .unwrap();
    caller.set_insecure_http_allowed(true);
    caller
}

#[tokio::test]
async fn posts_envelope_and_decodes_result() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([{"state": "OK"}])));

    let out: Vec<Value> = anonymous(&server).invoke(STATUS, NoArgs, None).await.unwrap();
    assert_eq!(out, vec![json!({"state": "OK"})]);

    let req = &server.requests()[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/rpc");
    assert_eq!(req.header("content-type"), Some("application/json"));
    assert_eq!(req.header("authorization"), None);
    assert_eq!(req.body_text(), r#"{"method":"Svc.status","params":[]}"#);
}

#[tokio::test]
async fn token_and_context_are_sent() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([7])));

    let ctx = RpcContext::new().with_entry(ContextEntry::new().with("tag", "t1"));
    let out: Vec<i64> = authenticated(&server)
        .invoke(RUN, ("ws/obj",), Some(&ctx))
        .await
        .unwrap();
    assert_eq!(out, vec![7]);

    let req = &server.requests()[0];
    assert_eq!(req.header("authorization"), Some("tok-123"));
    assert_eq!(
        req.json().unwrap(),
        json!({"method": "Svc.run", "params": ["ws/obj"], "context": [{"tag": "t1"}]})
    );
}

#[tokio::test]
async fn server_error_surfaces_code_and_message() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::error(-1, "boom"));

    let err = anonymous(&server)
        .invoke::<_, Value>(STATUS, NoArgs, None)
        .await
        .unwrap_err();
    let payload = err.server_error().unwrap();
    assert_eq!(payload.code, -1);
    assert_eq!(payload.message, "boom");
    assert_eq!(payload.name.as_deref(), Some("JSONRPCError"));
}

#[tokio::test]
async fn non_rpc_status_is_io() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::raw(502, "<html>bad gateway</html>"));

    let err = anonymous(&server)
        .invoke::<_, Value>(STATUS, NoArgs, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Io { .. }), "{err:?}");
    assert!(err.to_string().contains("502"));
}

#[tokio::test]
async fn slow_server_times_out() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([1])).with_delay(Duration::from_secs(2)));

    let caller = anonymous(&server);
    caller.set_read_timeout(Some(Duration::from_millis(100)));
    let err = caller
        .invoke::<_, i64>(STATUS, NoArgs, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Io { .. }), "{err:?}");
}

#[tokio::test]
async fn read_timeout_tolerates_a_slow_but_steady_response() {
    let server = JsonRpcTestServer::start().await.unwrap();
    let padding = "x".repeat(200);
    server.enqueue(
        CannedResponse::result(json!([{ "padding": padding }]))
            .trickled(8, Duration::from_millis(30)),
    );

    let caller = anonymous(&server);
    caller.set_read_timeout(Some(Duration::from_millis(300)));
    let started = std::time::Instant::now();
    let out: Vec<Value> = caller.invoke(STATUS, NoArgs, None).await.unwrap();

    assert_eq!(out[0]["padding"].as_str().map(str::len), Some(200));
    assert!(
        started.elapsed() > Duration::from_millis(300),
        "the body should take longer than the timeout to arrive"
    );
}

#[tokio::test]
async fn missing_token_is_refused_before_any_request() {
    let server = JsonRpcTestServer::start().await.unwrap();

    let err = anonymous(&server)
        .invoke::<_, i64>(RUN, NoArgs, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Unauthorized { .. }));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn token_over_http_needs_the_override() {
    let server = JsonRpcTestServer::start().await.unwrap();
    let caller = authenticated(&server);
    caller.set_insecure_http_allowed(false);

    let err = caller
        .invoke::<_, i64>(RUN, NoArgs, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Configuration { .. }));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn streaming_sends_the_same_bytes() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([0])));
    server.enqueue(CannedResponse::result(json!([0])));

    let caller = anonymous(&server);
    let payload = || (json!({"features": (0..50_000).map(|i| format!("f{i}")).collect::<Vec<_>>()}),);

    let _: Vec<i64> = caller.invoke(STATUS, payload(), None).await.unwrap();
    caller.set_streaming_mode(true);
    let _: Vec<i64> = caller.invoke(STATUS, payload(), None).await.unwrap();

    let reqs = server.requests();
    assert_eq!(reqs[0].body, reqs[1].body);
}

#[tokio::test]
async fn capture_file_is_written_for_one_call_only() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([{"first": true}])));
    server.enqueue(CannedResponse::result(json!([{"second": true}])));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("response.json");

    let caller = anonymous(&server);
    caller.set_file_for_next_rpc_response(&path);
    let _: Vec<Value> = caller.invoke(STATUS, NoArgs, None).await.unwrap();
    let captured: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(captured["result"], json!([{"first": true}]));

    std::fs::remove_file(&path).unwrap();
    let _: Vec<Value> = caller.invoke(STATUS, NoArgs, None).await.unwrap();
    assert!(!path.exists());
}
