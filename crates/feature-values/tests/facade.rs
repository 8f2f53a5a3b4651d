//! Typed operations against the local test server.

use feature_values::FeatureValuesClient;
use jsonrpc::{AuthPolicy, AuthToken, ContextEntry, HttpAuthenticator, RpcContext, RpcError};
use model::{
    GetMatrixDescriptorParams, GetMatrixItemDescriptorsParams, ObjectRef, ValidateMatrixParams,
};
use serde_json::json;
use testserver::{CannedResponse, JsonRpcTestServer};

fn matrix() -> ObjectRef {
    ObjectRef::new("my_ws/expr_matrix").unwrap()
}

fn anonymous(server: &JsonRpcTestServer) -> FeatureValuesClient {
    FeatureValuesClient::new(&server.url("/jsonrpc")).unwrap()
}

fn authenticated(server: &JsonRpcTestServer) -> FeatureValuesClient {
    let client =
        FeatureValuesClient::with_validated_token(&server.url("/jsonrpc"), AuthToken::new("tok", "alice"))
            .unwrap();
    client.set_insecure_http_allowed(true);
    client
}

#[tokio::test]
async fn status_without_credentials() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([{"state": "OK"}])));

    let status = anonymous(&server).status(None).await.unwrap();
    assert_eq!(status.get("state"), Some(&json!("OK")));
    assert_eq!(
        server.requests()[0].body_text(),
        r#"{"method":"KBaseFeatureValues.status","params":[]}"#
    );
}

#[tokio::test]
async fn list_result_is_unwrapped_once() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([[
        {"index": 0, "id": "a"},
        {"index": 1, "id": "b"}
    ]])));

    let rows = authenticated(&server)
        .get_matrix_row_descriptors(
            GetMatrixItemDescriptorsParams {
                input_data: matrix(),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);

    assert_eq!(
        server.requests()[0].json().unwrap(),
        json!({
            "method": "KBaseFeatureValues.get_matrix_row_descriptors",
            "params": [{"input_data": "my_ws/expr_matrix"}]
        })
    );
}

#[tokio::test]
async fn remote_error_is_reported() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::error(-1, "boom"));

    let err = authenticated(&server)
        .get_matrix_descriptor(GetMatrixDescriptorParams { input_data: matrix() }, None)
        .await
        .unwrap_err();
    assert!(err.is_json_rpc());
    let payload = err.server_error().unwrap();
    assert_eq!((payload.code, payload.message.as_str()), (-1, "boom"));
}

#[tokio::test]
async fn version_pin_is_applied_then_cleared() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([{}])));
    server.enqueue(CannedResponse::result(json!([{}])));

    let client = anonymous(&server);
    client.set_service_version(Some("1.2.0".to_string()));
    assert_eq!(client.service_version().as_deref(), Some("1.2.0"));
    client.status(None).await.unwrap();

    client.set_service_version(None);
    client.status(None).await.unwrap();

    let methods: Vec<_> = server
        .requests()
        .iter()
        .map(|r| r.json().unwrap()["method"].clone())
        .collect();
    assert_eq!(
        methods,
        [json!("KBaseFeatureValues.status:1.2.0"), json!("KBaseFeatureValues.status")]
    );
}

#[tokio::test]
async fn single_valued_call_rejects_other_lengths() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([])));
    server.enqueue(CannedResponse::result(json!([{"a": 1}, {"b": 2}])));

    let client = anonymous(&server);
    for expected_len in [0, 2] {
        match client.status(None).await.unwrap_err() {
            RpcError::ProtocolViolation { expected, actual, .. } => {
                assert_eq!((expected, actual), (1, expected_len));
            }
            other => panic!("expected protocol violation, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn void_operation_accepts_empty_result() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([])));

    anonymous(&server)
        .validate_matrix(
            ValidateMatrixParams {
                method: Some("validate_matrix".into()),
                input_data: matrix(),
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(server.request_count(), 1);
}

#[tokio::test]
async fn auth_required_operation_fails_without_token() {
    let server = JsonRpcTestServer::start().await.unwrap();

    let err = anonymous(&server)
        .get_matrix_descriptor(GetMatrixDescriptorParams { input_data: matrix() }, None)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Unauthorized { .. }));
    assert_eq!(server.request_count(), 0);
}

#[tokio::test]
async fn call_raw_qualifies_bare_names_and_sends_context() {
    let server = JsonRpcTestServer::start().await.unwrap();
    server.enqueue(CannedResponse::result(json!([{"state": "OK"}])));

    let ctx = RpcContext::new().with_entry(ContextEntry::method_call("status", None));
    let out = anonymous(&server)
        .call_raw("status", vec![], AuthPolicy::Optional, Some(&ctx))
        .await
        .unwrap();
    assert_eq!(out, vec![json!({"state": "OK"})]);

    let body = server.requests()[0].json().unwrap();
    assert_eq!(body["method"], "KBaseFeatureValues.status");
    assert_eq!(body["context"][0]["method"], "status");
}

#[tokio::test]
async fn constructors_report_bad_setup_and_rejected_tokens() {
    let server = JsonRpcTestServer::start().await.unwrap();
    let auth =
        HttpAuthenticator::with_urls(&server.url("/auth"), &server.url("/login")).unwrap();

    let err = FeatureValuesClient::with_token_and_authenticator("not a url", "tok", &auth)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Configuration { .. }));
    assert_eq!(server.request_count(), 0);

    server.enqueue(CannedResponse::json(401, json!({})));
    let err = FeatureValuesClient::with_token_and_authenticator(&server.url("/jsonrpc"), "bad", &auth)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Unauthorized { .. }));

    server.enqueue(CannedResponse::json(401, json!({"error_msg": "LoginFailure"})));
    let err = FeatureValuesClient::login_with_authenticator(&server.url("/jsonrpc"), "u", "p", &auth)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::Unauthorized { .. }));
}
