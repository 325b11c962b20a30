use crate::transports::JsonRpcError;
use std::{error::Error, fmt::Debug};
use thiserror::Error;

/// RPC error code the gateway returns when a call needs an authenticated
/// session. Recoverable exactly once per call via the challenge flow.
pub const GATEWAY_AUTH_REQUIRED: i64 = -901;

/// An `RpcError` is an abstraction over error types returned by a
/// [`crate::JsonRpcClient`].
///
/// Transport errors are typically type-erased via [`ProviderError`]; this
/// trait keeps the JSON-RPC error response reachable through the erasure,
/// which the re-authentication logic depends on.
pub trait RpcError: Error + Debug + Send + Sync {
    /// Access an underlying JSON-RPC error response, if any.
    fn as_error_response(&self) -> Option<&JsonRpcError>;

    /// Access an underlying `serde_json` error, if any.
    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        None
    }
}

/// An error thrown when making a call to the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// An internal error in the JSON-RPC client.
    #[error("{0}")]
    JsonRpcClientError(Box<dyn RpcError>),

    /// An error response from the server.
    #[error(transparent)]
    JsonRpcError(#[from] JsonRpcError),

    /// The transaction was included but its execution failed.
    #[error("transaction {tx_hash} failed: {log}")]
    TransactionFailed { log: String, tx_hash: String },

    /// The gateway rejected the challenge-response exchange, or demanded
    /// authentication again right after a successful exchange.
    #[error("gateway authentication failed")]
    AuthenticationFailed,

    /// The response arrived but did not have the promised shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Broadcast was attempted with an unsigned envelope.
    #[error("transaction must be signed before broadcast")]
    UnsignedTransaction,

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    HexError(#[from] hex::FromHexError),

    /// An error produced by the caller-supplied signer during gateway
    /// authentication.
    #[error("signer error: {0}")]
    SignerError(Box<dyn Error + Send + Sync>),
}

impl ProviderError {
    /// The JSON-RPC error response carried by this error, if any.
    pub fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            ProviderError::JsonRpcClientError(err) => err.as_error_response(),
            ProviderError::JsonRpcError(err) => Some(err),
            _ => None,
        }
    }

    /// True iff this error is the gateway's authentication-required
    /// response (code `-901`).
    pub fn is_auth_required(&self) -> bool {
        self.as_error_response().map(|err| err.code == GATEWAY_AUTH_REQUIRED).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_required_detection() {
        let err = ProviderError::JsonRpcError(JsonRpcError {
            code: GATEWAY_AUTH_REQUIRED,
            message: "authentication required".into(),
            data: None,
        });
        assert!(err.is_auth_required());

        let other = ProviderError::JsonRpcError(JsonRpcError {
            code: -32601,
            message: "method not found".into(),
            data: None,
        });
        assert!(!other.is_auth_required());
        assert!(!ProviderError::AuthenticationFailed.is_auth_required());
    }
}
