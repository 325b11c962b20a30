use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A JSON-RPC 2.0 error
#[derive(Serialize, Deserialize, Debug, Clone, Error)]
pub struct JsonRpcError {
    /// The error code
    pub code: i64,
    /// The error message
    pub message: String,
    /// Additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(code: {}, message: {}, data: {:?})", self.code, self.message, self.data)
    }
}

/// A JSON-RPC request
#[derive(Serialize, Deserialize, Debug)]
pub struct Request<'a, T> {
    id: u64,
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
}

impl<'a, T> Request<'a, T> {
    /// Creates a new JSON-RPC request
    pub fn new(id: u64, method: &'a str, params: T) -> Self {
        Self { id, jsonrpc: "2.0", method, params }
    }
}

/// A JSON-RPC response: exactly one of `result` and `error` is present.
#[derive(Deserialize, Debug)]
pub struct Response<R> {
    #[allow(dead_code)]
    pub(crate) id: u64,
    pub(crate) result: Option<R>,
    pub(crate) error: Option<JsonRpcError>,
}

impl<R> Response<R> {
    pub(crate) fn into_result(self) -> Result<R, ResponseError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(ResponseError::JsonRpc(error)),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ResponseError::MissingResult),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ResponseError {
    #[error(transparent)]
    JsonRpc(#[from] JsonRpcError),
    #[error("response carries neither result nor error")]
    MissingResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let req = Request::new(7, "user.ping", serde_json::json!({}));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "user.ping");
    }

    #[test]
    fn error_response_wins() {
        let resp: Response<String> = serde_json::from_str(
            r#"{"id":1,"error":{"code":-901,"message":"authentication required"}}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(ResponseError::JsonRpc(err)) => assert_eq!(err.code, -901),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn success_response() {
        let resp: Response<String> =
            serde_json::from_str(r#"{"id":1,"result":"pong"}"#).unwrap();
        assert_eq!(resp.into_result().unwrap(), "pong");
    }
}
