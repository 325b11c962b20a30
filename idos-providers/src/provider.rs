use crate::{JsonRpcClient, ProviderError};
use idos_core::types::{
    Account, Base64Bytes, BroadcastSync, Bytes, CallMessage, KeyType, QueryResult, SignatureType,
    Transaction, TxResult, TxSignature,
};
use idos_signers::Signer;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Identity parameters of a `user.account` query.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountRequest {
    pub identifier: Bytes,
    pub key_type: KeyType,
}

/// Response of `user.chain_info`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub block_hash: String,
}

/// Response of `user.broadcast`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BroadcastResponse {
    pub tx_hash: Base64Bytes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TxResult>,
}

/// Response of `user.challenge`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: Bytes,
}

/// A deployed dataset as listed by `user.databases`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub name: String,
    pub owner: Bytes,
}

/// Response of `user.estimate_price`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EstimatedPrice {
    pub price: String,
}

/// Response of `kgw.authn_param`: the statement and domain the gateway
/// expects inside signed authentication messages.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GatewayAuthParam {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Parameters of `kgw.authn`: the signed challenge that opens a session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayAuthRequest {
    pub nonce: Bytes,
    pub sender: Bytes,
    pub signature: TxSignature,
}

/// Response of `user.tx_query`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TxQueryResponse {
    pub tx_hash: Base64Bytes,
    #[serde(default)]
    pub height: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<TxResult>,
}

/// A client for the network's RPC surface over an abstract JSON-RPC
/// transport.
///
/// The transport is shared (and with it the gateway session cookie);
/// cloning a provider clones the handle, not the connection.
#[derive(Clone, Debug)]
pub struct Provider<P> {
    inner: P,
}

impl<P: JsonRpcClient> Provider<P> {
    /// Instantiates a provider over an existing transport.
    pub fn new(transport: P) -> Self {
        Self { inner: transport }
    }

    /// A reference to the underlying transport.
    pub fn as_ref(&self) -> &P {
        &self.inner
    }

    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, ProviderError>
    where
        T: serde::Serialize + Send + Sync,
        R: serde::de::DeserializeOwned,
    {
        self.inner.request(method, params).await.map_err(Into::into)
    }

    /// Liveness probe.
    pub async fn ping(&self) -> Result<String, ProviderError> {
        #[derive(Deserialize)]
        struct Pong {
            message: String,
        }
        let pong: Pong = self.request("user.ping", serde_json::json!({})).await?;
        Ok(pong.message)
    }

    /// Node health report, passed through unshaped.
    pub async fn health(&self) -> Result<Json, ProviderError> {
        self.request("user.health", serde_json::json!({})).await
    }

    /// The chain id and current block of the backing chain.
    pub async fn chain_info(&self) -> Result<ChainInfo, ProviderError> {
        self.request("user.chain_info", serde_json::json!({})).await
    }

    /// Fetches the account record (balance and nonce) of an identifier.
    /// Unknown accounts come back with a zero nonce.
    #[instrument(skip(self))]
    pub async fn get_account(
        &self,
        identifier: Bytes,
        key_type: KeyType,
    ) -> Result<Account, ProviderError> {
        self.request("user.account", AccountRequest { identifier, key_type }).await
    }

    /// Broadcasts a signed transaction.
    ///
    /// With [`BroadcastSync::WaitForCommit`], a commit whose result code is
    /// non-zero fails with [`ProviderError::TransactionFailed`] carrying
    /// the execution log and the transaction hash.
    #[instrument(skip(self, tx), fields(nonce = tx.body.nonce))]
    pub async fn broadcast(
        &self,
        tx: &Transaction,
        sync: BroadcastSync,
    ) -> Result<Base64Bytes, ProviderError> {
        if !tx.is_signed() {
            return Err(ProviderError::UnsignedTransaction);
        }

        #[derive(Serialize)]
        struct BroadcastRequest<'a> {
            tx: &'a Transaction,
            sync: BroadcastSync,
        }

        let response: BroadcastResponse =
            self.request("user.broadcast", BroadcastRequest { tx, sync }).await?;

        if let Some(result) = &response.result {
            if result.code != 0 {
                warn!(code = result.code, "transaction failed on commit");
                return Err(ProviderError::TransactionFailed {
                    log: result.log.clone().unwrap_or_default(),
                    tx_hash: hex::encode(&response.tx_hash),
                });
            }
        }
        Ok(response.tx_hash)
    }

    /// Performs a view call, returning the column-aligned result set.
    #[instrument(skip(self, msg))]
    pub async fn call(&self, msg: &CallMessage) -> Result<QueryResult, ProviderError> {
        self.request("user.call", msg).await
    }

    /// Lists deployed datasets, optionally filtered by owner.
    pub async fn list_databases(
        &self,
        owner: Option<Bytes>,
    ) -> Result<Vec<DatasetInfo>, ProviderError> {
        #[derive(Serialize)]
        struct DatabasesRequest {
            #[serde(skip_serializing_if = "Option::is_none")]
            owner: Option<Bytes>,
        }
        #[derive(Deserialize)]
        struct DatabasesResponse {
            #[serde(default)]
            databases: Vec<DatasetInfo>,
        }
        let response: DatabasesResponse =
            self.request("user.databases", DatabasesRequest { owner }).await?;
        Ok(response.databases)
    }

    /// Asks the node to price a transaction before broadcast.
    pub async fn estimate_price(&self, tx: &Transaction) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct EstimateRequest<'a> {
            tx: &'a Transaction,
        }
        let response: EstimatedPrice =
            self.request("user.estimate_price", EstimateRequest { tx }).await?;
        Ok(response.price)
    }

    /// Runs an ad-hoc read-only SQL query.
    pub async fn query(&self, query: &str, params: Json) -> Result<QueryResult, ProviderError> {
        #[derive(Serialize)]
        struct QueryRequest<'a> {
            query: &'a str,
            params: Json,
        }
        self.request("user.query", QueryRequest { query, params }).await
    }

    /// Looks up a broadcast transaction by hash.
    pub async fn tx_query(&self, tx_hash: &Base64Bytes) -> Result<TxQueryResponse, ProviderError> {
        #[derive(Serialize)]
        struct TxQueryRequest<'a> {
            tx_hash: &'a Base64Bytes,
        }
        self.request("user.tx_query", TxQueryRequest { tx_hash }).await
    }

    /// Polls `tx_query` until the transaction commits, failing with
    /// [`ProviderError::TransactionFailed`] on a non-zero result code.
    ///
    /// Cancellation after broadcast cannot retract the transaction; this
    /// is the reconciliation path for callers that gave up waiting.
    pub async fn wait_for_tx(
        &self,
        tx_hash: &Base64Bytes,
        poll_interval: Duration,
    ) -> Result<TxQueryResponse, ProviderError> {
        loop {
            let response = self.tx_query(tx_hash).await?;
            if response.height > 0 {
                if let Some(result) = &response.result {
                    if result.code != 0 {
                        return Err(ProviderError::TransactionFailed {
                            log: result.log.clone().unwrap_or_default(),
                            tx_hash: hex::encode(&response.tx_hash),
                        });
                    }
                }
                return Ok(response);
            }
            debug!("transaction not yet committed, polling again");
            tokio::time::sleep(poll_interval).await;
        }
    }

    /// The schema of a deployed dataset, passed through unshaped (the SDK
    /// derives its action stubs from schemas offline).
    pub async fn schema(&self, namespace: &str) -> Result<Json, ProviderError> {
        #[derive(Serialize)]
        struct SchemaRequest<'a> {
            namespace: &'a str,
        }
        self.request("user.schema", SchemaRequest { namespace }).await
    }

    /// Fetches a fresh signing challenge from the gateway.
    pub async fn challenge(&self) -> Result<Bytes, ProviderError> {
        let response: ChallengeResponse =
            self.request("user.challenge", serde_json::json!({})).await?;
        Ok(response.challenge)
    }

    /// The gateway's authentication message parameters.
    pub async fn gateway_auth_param(&self) -> Result<GatewayAuthParam, ProviderError> {
        self.request("kgw.authn_param", serde_json::json!({})).await
    }

    /// Runs the full challenge-response exchange with the caller's signer.
    /// On success the gateway sets the session cookie on the shared HTTP
    /// client; nothing is returned.
    #[instrument(skip_all, fields(sender = %signer.identifier()))]
    pub async fn authenticate<S: Signer>(&self, signer: &S) -> Result<(), ProviderError> {
        let challenge = self.challenge().await?;
        debug!(challenge = %challenge, "signing gateway challenge");
        let sig = signer
            .sign(&challenge)
            .await
            .map_err(|err| ProviderError::SignerError(Box::new(err)))?;

        let request = GatewayAuthRequest {
            nonce: challenge,
            sender: signer.identifier(),
            signature: TxSignature {
                sig: Some(Base64Bytes(sig)),
                sig_type: signer.signature_type(),
            },
        };
        self.gateway_authn(request).await
    }

    /// Submits an already-signed challenge to the gateway.
    pub async fn gateway_authn(&self, request: GatewayAuthRequest) -> Result<(), ProviderError> {
        let _: Json = self.request("kgw.authn", request).await?;
        Ok(())
    }

    /// Tears down the gateway session.
    pub async fn logout(&self) -> Result<(), ProviderError> {
        let _: Json = self.request("kgw.logout", serde_json::json!({})).await?;
        Ok(())
    }
}

// keep the unauthenticated message constructor discoverable next to `call`
impl<P: JsonRpcClient> Provider<P> {
    /// Builds the RPC message for a view call: authenticated with the
    /// signer's identity when one is given, public otherwise.
    pub fn call_message(payload: Vec<u8>, signer: Option<&dyn SignerIdentity>) -> CallMessage {
        match signer {
            None => CallMessage::public(payload),
            Some(signer) => CallMessage {
                sender: Some(signer.identifier()),
                auth_type: signer.signature_type(),
                ..CallMessage::public(payload)
            },
        }
    }
}

/// Object-safe view of a signer's identity, used where only the identifier
/// and scheme are needed (view calls are not signed, only attributed).
pub trait SignerIdentity: Send + Sync {
    fn identifier(&self) -> Bytes;
    fn signature_type(&self) -> SignatureType;
}

impl<S: Signer> SignerIdentity for S {
    fn identifier(&self) -> Bytes {
        Signer::identifier(self)
    }

    fn signature_type(&self) -> SignatureType {
        Signer::signature_type(self)
    }
}
