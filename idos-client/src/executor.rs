use crate::{actions::ActionDef, ClientError};
use idos_core::{
    codec::{encode_call_payload, encode_execute_payload},
    types::{Account, BroadcastSync, CallMessage, KeyType, SignatureType, Transaction},
};
use idos_providers::{JsonRpcClient, Provider, ProviderError, SignerIdentity};
use idos_signers::Signer;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as Json;
use std::future::Future;
use tracing::{debug, instrument};

/// Executes actions against the network: encodes inputs, drives the
/// nonce/sign/broadcast pipeline for writes and the call path for reads,
/// and maps every outcome into the public error set.
///
/// The signer is shared with the caller and outlives the executor;
/// distinct calls may run concurrently, but two concurrent writes from
/// the same account will race on the nonce and at most one will commit.
pub struct ActionClient<P, S> {
    provider: Provider<P>,
    signer: S,
    chain_id: String,
}

impl<P: JsonRpcClient, S: Signer> ActionClient<P, S> {
    pub fn new(provider: Provider<P>, signer: S, chain_id: impl Into<String>) -> Self {
        Self { provider, signer, chain_id: chain_id.into() }
    }

    pub fn provider(&self) -> &Provider<P> {
        &self.provider
    }

    pub fn signer(&self) -> &S {
        &self.signer
    }

    fn key_type(&self) -> Result<KeyType, ClientError> {
        match self.signer.signature_type() {
            SignatureType::Secp256k1Personal | SignatureType::Eip712 => Ok(KeyType::Secp256k1),
            SignatureType::Ed25519 => Ok(KeyType::Ed25519),
            SignatureType::Invalid => {
                Err(ClientError::ValidationError("signer has no key type".to_owned()))
            }
        }
    }

    /// Runs one RPC step, recovering from a gateway `-901` exactly once
    /// by re-authenticating and re-running the step. A second `-901`
    /// surfaces as `AuthenticationRequired`.
    async fn with_reauth<T, F, Fut>(&self, f: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        match f().await {
            Ok(value) => Ok(value),
            Err(err) if err.is_auth_required() => {
                debug!("gateway requires authentication, running challenge flow");
                self.provider.authenticate(&self.signer).await.map_err(|err| {
                    if err.is_auth_required() {
                        ClientError::AuthenticationRequired
                    } else {
                        ClientError::from(err)
                    }
                })?;
                match f().await {
                    Ok(value) => Ok(value),
                    Err(err) if err.is_auth_required() => Err(ClientError::AuthenticationRequired),
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reads an action's result set as typed records, attributed to the
    /// signer's identity.
    #[instrument(skip(self, input), fields(action = action.name))]
    pub async fn view<T, R>(&self, action: &ActionDef, input: &T) -> Result<Vec<R>, ClientError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.run_view(action, input, Some(&self.signer as &dyn SignerIdentity)).await
    }

    /// Like [`Self::view`], without attributing the call to any identity.
    pub async fn view_public<T, R>(
        &self,
        action: &ActionDef,
        input: &T,
    ) -> Result<Vec<R>, ClientError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        self.run_view(action, input, None).await
    }

    async fn run_view<T, R>(
        &self,
        action: &ActionDef,
        input: &T,
        signer: Option<&dyn SignerIdentity>,
    ) -> Result<Vec<R>, ClientError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let args = action.project(input)?;
        let payload = encode_call_payload(action.namespace, action.name, &args)
            .map_err(|err| ClientError::ValidationError(err.to_string()))?;
        let msg: CallMessage = Provider::<P>::call_message(payload, signer);

        let result = self.with_reauth(|| self.provider.call(&msg)).await?;
        let records = result
            .into_records()
            .map_err(|err| ClientError::Unknown { msg: err.to_string(), cause: None })?;
        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(Json::Object(record)).map_err(|err| ClientError::Unknown {
                    msg: format!("cannot decode {} row: {err}", action.name),
                    cause: Some(Box::new(err)),
                })
            })
            .collect()
    }

    /// Reads exactly one record; anything else is `NotFound`.
    pub async fn view_single<T, R>(&self, action: &ActionDef, input: &T) -> Result<R, ClientError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut records: Vec<R> = self.view(action, input).await?;
        if records.len() != 1 {
            return Err(ClientError::NotFound);
        }
        Ok(records.remove(0))
    }

    /// Executes a write action and returns the transaction hash as hex.
    ///
    /// The pipeline: fetch the account, take `nonce + 1`, encode the
    /// execution payload, sign the canonical message, broadcast. With
    /// [`BroadcastSync::WaitForCommit`] a failed commit surfaces as
    /// `ActionFailed` with the hash populated.
    #[instrument(skip(self, input), fields(action = action.name))]
    pub async fn execute<T>(
        &self,
        action: &ActionDef,
        input: &T,
        sync: BroadcastSync,
    ) -> Result<String, ClientError>
    where
        T: Serialize + Sync,
    {
        let args = action.project(input)?;
        let payload = encode_execute_payload(action.namespace, action.name, &[args])
            .map_err(|err| ClientError::ValidationError(err.to_string()))?;

        let key_type = self.key_type()?;
        let identifier = self.signer.identifier();
        let account: Account = self
            .with_reauth(|| self.provider.get_account(identifier.clone(), key_type))
            .await?;
        let nonce = account.nonce + 1;

        let mut tx = Transaction::unsigned(
            payload,
            self.signer.signature_type(),
            identifier,
            nonce,
            self.chain_id.clone(),
        );
        let message = tx.signable_message();
        let sig = self.signer.sign(message.as_bytes()).await.map_err(|err| {
            ClientError::Unknown {
                msg: format!("signing failed: {err}"),
                cause: Some(Box::new(err)),
            }
        })?;
        tx.attach_signature(sig);

        let tx_hash = self.with_reauth(|| self.provider.broadcast(&tx, sync)).await?;
        debug!(tx_hash = %hex::encode(&tx_hash), "action broadcast");
        Ok(hex::encode(&tx_hash))
    }
}

impl<P: JsonRpcClient, S: Signer> std::fmt::Debug for ActionClient<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionClient")
            .field("sender", &self.signer.identifier())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}
