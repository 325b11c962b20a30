use idos_providers::ProviderError;
use std::error::Error;
use thiserror::Error;

/// The closed error set of the public API.
///
/// Everything a caller can observe maps into one of these; richer
/// causes stay reachable through `Unknown::cause`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The action was rejected or its transaction failed. `tx_hash` is
    /// populated when a transaction made it to the chain.
    #[error("action failed: {msg}")]
    ActionFailed { msg: String, tx_hash: Option<String> },

    /// The input did not satisfy the action's declared parameters.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// A single-record read matched no (or more than one) row.
    #[error("not found")]
    NotFound,

    /// The gateway demanded authentication twice in a row; the session
    /// cannot be established with the current signer.
    #[error("authentication required")]
    AuthenticationRequired,

    #[error("{msg}")]
    Unknown {
        msg: String,
        #[source]
        cause: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl From<ProviderError> for ClientError {
    fn from(src: ProviderError) -> Self {
        match src {
            ProviderError::TransactionFailed { log, tx_hash } => {
                ClientError::ActionFailed { msg: log, tx_hash: Some(tx_hash) }
            }
            ProviderError::AuthenticationFailed => ClientError::AuthenticationRequired,
            ProviderError::JsonRpcError(err) => {
                ClientError::ActionFailed { msg: err.message.clone(), tx_hash: None }
            }
            other => ClientError::Unknown { msg: other.to_string(), cause: Some(Box::new(other)) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idos_providers::JsonRpcError;

    #[test]
    fn transaction_failure_keeps_the_hash() {
        let err: ClientError = ProviderError::TransactionFailed {
            log: "bad nonce".into(),
            tx_hash: "abcd".into(),
        }
        .into();
        match err {
            ClientError::ActionFailed { msg, tx_hash } => {
                assert_eq!(msg, "bad nonce");
                assert_eq!(tx_hash.as_deref(), Some("abcd"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn rpc_errors_become_action_failures() {
        let err: ClientError = ProviderError::JsonRpcError(JsonRpcError {
            code: -32000,
            message: "dataset not found".into(),
            data: None,
        })
        .into();
        assert!(matches!(err, ClientError::ActionFailed { tx_hash: None, .. }));
    }
}
