//! Request and response envelopes.
//!
//! A request is `{"method": ..., "params": [...], "context": [...]}` with
//! `context` present only when non-empty. A response carries either
//! `result`, which is always a JSON array, or `error`.
//!
//! Decoding here stops at the array: [`decode_result`] returns every element.
//! Picking element 0 of a single-valued call is the typed facade's job.

use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::value::RawValue;

use crate::{RpcContext, RpcError, ServerError};

// ---------------------------------------------------------------------------
// Positional argument lists
// ---------------------------------------------------------------------------

/// A value that serializes as a JSON array of positional arguments.
///
/// Implemented for [`NoArgs`], tuples of up to three serializable values and
/// `Vec<serde_json::Value>`. Argument lists are owned so a streaming body can
/// serialize them on a background thread.
pub trait Positional: Serialize + Send + 'static {}

/// The empty argument list, sent as `[]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoArgs;

impl Serialize for NoArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_seq(Some(0))?.end()
    }
}

impl Positional for NoArgs {}
impl Positional for Vec<serde_json::Value> {}

macro_rules! positional_tuple {
    ($($t:ident),+) => {
        impl<$($t: Serialize + Send + 'static),+> Positional for ($($t,)+) {}
    };
}

positional_tuple!(A);
positional_tuple!(A, B);
positional_tuple!(A, B, C);

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

/// Appends `:version` to `method` when a version is pinned.
pub fn wire_method(method: &str, service_version: Option<&str>) -> String {
    match service_version {
        Some(version) => format!("{method}:{version}"),
        None => method.to_string(),
    }
}

/// The request object sent for one call.
#[derive(Debug, Clone, Serialize)]
pub struct RequestEnvelope<A> {
    pub method: String,
    pub params: A,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<RpcContext>,
}

impl<A: Positional> RequestEnvelope<A> {
    /// Builds an envelope, dropping an empty context.
    pub fn new(method: String, params: A, context: Option<&RpcContext>) -> Self {
        Self {
            method,
            params,
            context: context.filter(|c| !c.is_empty()).cloned(),
        }
    }
}

#[derive(Deserialize)]
struct ResponseEnvelope<'a> {
    #[serde(default, borrow)]
    result: Option<&'a RawValue>,
    #[serde(default)]
    error: Option<ServerError>,
}

/// Decodes a response body.
///
/// A non-null `error` wins over anything else. With `has_result` false the
/// result is not inspected and an empty vector is returned. Otherwise
/// `result` must be an array whose elements all decode as `R`.
///
/// # Errors
///
/// [`RpcError::Server`] for a remote error, [`RpcError::Deserialize`] when
/// the body is not a well-formed envelope or the result has the wrong shape.
pub fn decode_result<R: DeserializeOwned>(
    method: &str,
    body: &[u8],
    has_result: bool,
) -> Result<Vec<R>, RpcError> {
    let deserialize = |source: serde_json::Error| RpcError::Deserialize {
        method: method.to_string(),
        source,
    };

    let envelope: ResponseEnvelope<'_> = serde_json::from_slice(body).map_err(deserialize)?;

    if let Some(error) = envelope.error {
        return Err(RpcError::Server {
            method: method.to_string(),
            error,
        });
    }
    if !has_result {
        return Ok(Vec::new());
    }
    match envelope.result {
        Some(raw) => serde_json::from_str(raw.get()).map_err(deserialize),
        None => Err(deserialize(serde_json::Error::custom(
            "response carries neither a result nor an error",
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ContextEntry;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Point {
        x: i64,
    }

    #[test]
    fn no_args_is_empty_array() {
        let env = RequestEnvelope::new("Svc.status".into(), NoArgs, None);
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"method":"Svc.status","params":[]}"#
        );
    }

    #[test]
    fn single_param_is_wrapped_in_array() {
        let env = RequestEnvelope::new("Svc.run".into(), (Point { x: 1 },), None);
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"method": "Svc.run", "params": [{"x": 1}]})
        );
    }

    #[test]
    fn positional_order_is_preserved() {
        let env = RequestEnvelope::new("Svc.pair".into(), ("a", 2, Point { x: 3 }), None);
        assert_eq!(
            serde_json::to_value(&env).unwrap()["params"],
            json!(["a", 2, {"x": 3}])
        );
    }

    #[test]
    fn empty_context_is_omitted_and_non_empty_is_sent() {
        let empty = RpcContext::new();
        let env = RequestEnvelope::new("Svc.run".into(), NoArgs, Some(&empty));
        assert!(serde_json::to_value(&env).unwrap().get("context").is_none());

        let ctx = RpcContext::new().with_entry(ContextEntry::new().with("tag", "t1"));
        let env = RequestEnvelope::new("Svc.run".into(), NoArgs, Some(&ctx));
        assert_eq!(
            serde_json::to_value(&env).unwrap()["context"],
            json!([{"tag": "t1"}])
        );
    }

    #[test]
    fn version_pin_suffixes_method() {
        assert_eq!(wire_method("Svc.run", Some("1.2.0")), "Svc.run:1.2.0");
        assert_eq!(wire_method("Svc.run", None), "Svc.run");
    }

    #[test]
    fn params_round_trip_through_the_wire() {
        let env = RequestEnvelope::new("Svc.run".into(), (Point { x: 42 },), None);
        let bytes = serde_json::to_vec(&env).unwrap();
        let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let p: Point = serde_json::from_value(back["params"][0].clone()).unwrap();
        assert_eq!(p, Point { x: 42 });
    }

    #[test]
    fn decodes_single_object_result() {
        let out: Vec<Point> = decode_result("Svc.run", br#"{"result":[{"x":1}]}"#, true).unwrap();
        assert_eq!(out, vec![Point { x: 1 }]);
    }

    #[test]
    fn decodes_nested_list_result_without_flattening() {
        let out: Vec<Vec<serde_json::Value>> = decode_result(
            "Svc.list",
            br#"{"result":[[{"id":"a"},{"id":"b"}]]}"#,
            true,
        )
        .unwrap();
        assert_eq!(out, vec![vec![json!({"id": "a"}), json!({"id": "b"})]]);
    }

    #[test]
    fn void_call_ignores_result() {
        let out: Vec<serde::de::IgnoredAny> =
            decode_result("Svc.void", br#"{"result":[]}"#, false).unwrap();
        assert!(out.is_empty());
        let out: Vec<serde::de::IgnoredAny> =
            decode_result("Svc.void", br#"{"version":"1.1","result":null}"#, false).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn error_member_becomes_server_error() {
        let err = decode_result::<Point>(
            "Svc.run",
            br#"{"error":{"code":-1,"message":"boom"}}"#,
            true,
        )
        .unwrap_err();
        match err {
            RpcError::Server { method, error } => {
                assert_eq!(method, "Svc.run");
                assert_eq!(error.code, -1);
                assert_eq!(error.message, "boom");
            }
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn null_error_with_result_is_success() {
        let out: Vec<Point> =
            decode_result("Svc.run", br#"{"result":[{"x":5}],"error":null}"#, true).unwrap();
        assert_eq!(out, vec![Point { x: 5 }]);
    }

    #[test]
    fn malformed_bodies_are_deserialize_errors() {
        let bodies: [&[u8]; 4] = [
            b"<html>bad gateway</html>",
            br#"{"result":{"x":1}}"#,
            br#"{"result":[{"y":1}]}"#,
            br#"{}"#,
        ];
        for body in bodies {
            let err = decode_result::<Point>("Svc.run", body, true).unwrap_err();
            assert!(
                matches!(err, RpcError::Deserialize { .. }),
                "body {:?} gave {err:?}",
                String::from_utf8_lossy(body)
            );
        }
    }
}
