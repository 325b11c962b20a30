#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod errors;
pub use errors::{ProviderError, RpcError, GATEWAY_AUTH_REQUIRED};

mod provider;
pub use provider::{
    AccountRequest, BroadcastResponse, ChainInfo, ChallengeResponse, DatasetInfo,
    EstimatedPrice, GatewayAuthParam, GatewayAuthRequest, Provider, SignerIdentity,
    TxQueryResponse,
};

mod transports;
pub use transports::{Http, HttpClientError, JsonRpcError, MockError, MockResponse, MockTransport};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

/// Trait which must be implemented by data transports to be used with the
/// idOS JSON-RPC API.
#[async_trait]
pub trait JsonRpcClient: Debug + Send + Sync {
    /// A transport-specific error.
    type Error: RpcError + Into<ProviderError>;

    /// Sends a request with the provided JSON-RPC parameters and
    /// deserializes the response.
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, Self::Error>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned;
}
