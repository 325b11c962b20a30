use crate::{
    actions::{access_grants, attributes, credentials, users, wallets},
    records::{
        AccessGrant, AddAttribute, AddCredential, AddWallet, Attribute, CreateAccessGrant,
        Credential, EditAttribute, EditCredential, ShareAttribute, ShareCredential, User, Wallet,
    },
    ActionClient, ClientError,
};
use idos_core::types::BroadcastSync;
use idos_enclave::{EnclaveError, EnclaveOrchestrator, EnclaveState, KeyStore};
use idos_providers::JsonRpcClient;
use idos_signers::Signer;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

/// The application-facing client: an action executor plus the enclave
/// orchestrator, covering the network's public operations.
///
/// The executor owns the protocol client, the orchestrator owns the
/// enclave; the signer is shared with the caller.
pub struct IdosClient<P, S, K> {
    actions: ActionClient<P, S>,
    enclave: EnclaveOrchestrator<K>,
}

impl<P, S, K> IdosClient<P, S, K>
where
    P: JsonRpcClient,
    S: Signer,
    K: KeyStore,
{
    pub fn new(actions: ActionClient<P, S>, enclave: EnclaveOrchestrator<K>) -> Self {
        Self { actions, enclave }
    }

    pub fn actions(&self) -> &ActionClient<P, S> {
        &self.actions
    }

    pub fn enclave(&self) -> &EnclaveOrchestrator<K> {
        &self.enclave
    }

    // ---- users ----

    /// The caller's profile; `NotFound` if the address has none.
    pub async fn get_user(&self) -> Result<User, ClientError> {
        self.actions.view_single(&users::GET, &json!({})).await
    }

    /// Whether `address` is attached to any profile. Public; does not
    /// require an authenticated session.
    pub async fn has_profile(&self, address: &str) -> Result<bool, ClientError> {
        #[derive(serde::Deserialize)]
        struct Row {
            has_profile: bool,
        }
        let rows: Vec<Row> = self
            .actions
            .view_public(&users::HAS_PROFILE, &json!({ "address": address }))
            .await?;
        Ok(rows.first().map(|row| row.has_profile).unwrap_or(false))
    }

    // ---- wallets ----

    pub async fn add_wallet(&self, input: &AddWallet) -> Result<String, ClientError> {
        self.actions.execute(&wallets::ADD, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn get_wallets(&self) -> Result<Vec<Wallet>, ClientError> {
        self.actions.view(&wallets::GET_ALL, &json!({})).await
    }

    pub async fn remove_wallet(&self, id: &Uuid) -> Result<String, ClientError> {
        self.actions
            .execute(&wallets::REMOVE, &json!({ "id": id }), BroadcastSync::WaitForCommit)
            .await
    }

    // ---- credentials ----

    pub async fn add_credential(&self, input: &AddCredential) -> Result<String, ClientError> {
        self.actions.execute(&credentials::ADD, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn get_credentials(&self) -> Result<Vec<Credential>, ClientError> {
        self.actions.view(&credentials::GET_ALL, &json!({})).await
    }

    pub async fn get_credentials_owned(&self) -> Result<Vec<Credential>, ClientError> {
        self.actions.view(&credentials::GET_OWNED, &json!({})).await
    }

    pub async fn get_credential_shared(&self, id: &Uuid) -> Result<Credential, ClientError> {
        self.actions.view_single(&credentials::GET_SHARED, &json!({ "id": id })).await
    }

    pub async fn edit_credential(&self, input: &EditCredential) -> Result<String, ClientError> {
        self.actions.execute(&credentials::EDIT, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn remove_credential(&self, id: &Uuid) -> Result<String, ClientError> {
        self.actions
            .execute(&credentials::REMOVE, &json!({ "id": id }), BroadcastSync::WaitForCommit)
            .await
    }

    pub async fn share_credential(&self, input: &ShareCredential) -> Result<String, ClientError> {
        self.actions.execute(&credentials::SHARE, input, BroadcastSync::WaitForCommit).await
    }

    // ---- access grants ----

    pub async fn create_access_grant(
        &self,
        input: &CreateAccessGrant,
    ) -> Result<String, ClientError> {
        self.actions.execute(&access_grants::CREATE, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn get_access_grants_owned(&self) -> Result<Vec<AccessGrant>, ClientError> {
        self.actions.view(&access_grants::GET_OWNED, &json!({})).await
    }

    pub async fn get_access_grants_granted(
        &self,
        page: i64,
        size: i64,
    ) -> Result<Vec<AccessGrant>, ClientError> {
        self.actions
            .view(&access_grants::GET_GRANTED, &json!({ "page": page, "size": size }))
            .await
    }

    pub async fn get_access_grants_for_credential(
        &self,
        credential_id: &Uuid,
    ) -> Result<Vec<AccessGrant>, ClientError> {
        self.actions
            .view(&access_grants::GET_FOR_CREDENTIAL, &json!({ "credential_id": credential_id }))
            .await
    }

    pub async fn revoke_access_grant(&self, id: &Uuid) -> Result<String, ClientError> {
        self.actions
            .execute(&access_grants::REVOKE, &json!({ "id": id }), BroadcastSync::WaitForCommit)
            .await
    }

    // ---- attributes ----

    pub async fn add_attribute(&self, input: &AddAttribute) -> Result<String, ClientError> {
        self.actions.execute(&attributes::ADD, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn get_attributes(&self) -> Result<Vec<Attribute>, ClientError> {
        self.actions.view(&attributes::GET_ALL, &json!({})).await
    }

    pub async fn edit_attribute(&self, input: &EditAttribute) -> Result<String, ClientError> {
        self.actions.execute(&attributes::EDIT, input, BroadcastSync::WaitForCommit).await
    }

    pub async fn remove_attribute(&self, id: &Uuid) -> Result<String, ClientError> {
        self.actions
            .execute(&attributes::REMOVE, &json!({ "id": id }), BroadcastSync::WaitForCommit)
            .await
    }

    pub async fn share_attribute(&self, input: &ShareAttribute) -> Result<String, ClientError> {
        self.actions.execute(&attributes::SHARE, input, BroadcastSync::WaitForCommit).await
    }

    // ---- enclave ----

    /// Derives the enclave key from the user's password, moving the
    /// orchestrator to `Unlocked`. Returns the enclave public key.
    pub async fn unlock_enclave(
        &self,
        user_id: &Uuid,
        password: &str,
        expiration: Duration,
    ) -> Result<[u8; 32], EnclaveError> {
        self.enclave.unlock(user_id, password, expiration).await
    }

    /// Locks the enclave; the state ends `Locked` unconditionally.
    pub async fn lock_enclave(&self) {
        self.enclave.lock().await
    }

    pub fn enclave_state(&self) -> EnclaveState {
        self.enclave.state()
    }

    /// Opens a credential's sealed content with the enclave key. The
    /// sender public key is the credential's `encryptor_public_key`.
    pub async fn decrypt_credential(
        &self,
        credential: &Credential,
    ) -> Result<Vec<u8>, EnclaveError> {
        let sealed: idos_core::types::Base64Bytes =
            credential.content.parse().map_err(|_| EnclaveError::DecryptionFailed {
                reason: idos_enclave::DecryptionFailure::CorruptedData,
                details: Some("content is not base64".to_owned()),
            })?;
        let sender_pub: [u8; 32] = hex::decode(&credential.encryptor_public_key)
            .ok()
            .and_then(|raw| raw.try_into().ok())
            .ok_or_else(|| EnclaveError::InvalidPublicKey {
                details: "encryptor public key is not 32 hex bytes".to_owned(),
            })?;

        self.enclave
            .with_enclave(|enclave| async move { enclave.decrypt(&sealed, &sender_pub).await })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idos_enclave::{Enclave, KeyKind, MemoryKeyStore};
    use idos_providers::{MockTransport, Provider};
    use idos_signers::LocalWallet;
    use serde_json::json;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    fn client() -> (IdosClient<MockTransport, LocalWallet, MemoryKeyStore>, MockTransport) {
        let mock = MockTransport::new();
        let actions = ActionClient::new(
            Provider::new(mock.clone()),
            LocalWallet::new(&mut idos_core::rand::thread_rng()),
            "idos-testnet",
        );
        let enclave = EnclaveOrchestrator::new(Enclave::new(MemoryKeyStore::new(), KeyKind::User));
        (IdosClient::new(actions, enclave), mock)
    }

    #[tokio::test]
    async fn has_profile_defaults_to_false_on_empty_result() {
        let (client, mock) = client();
        mock.push(json!({"column_names": [], "column_types": [], "values": []})).unwrap();
        assert!(!client.has_profile("0xabc").await.unwrap());

        // public call: no sender attribution
        let call = mock.assert_request("user.call").unwrap();
        assert_eq!(call["auth_type"], "invalid");
        assert!(call.get("sender").is_none());
    }

    #[tokio::test]
    async fn decrypt_credential_round_trips_through_the_enclave() {
        let (client, _mock) = client();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let public = client
            .unlock_enclave(&user_id, "correct horse battery staple", Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(client.enclave_state(), EnclaveState::Unlocked);

        // seal to the enclave's own key, as an issuer would
        let sealed = client
            .enclave()
            .with_enclave(|enclave| async move { enclave.encrypt(b"credential body", &public).await })
            .await
            .unwrap()
            .0;

        let credential = Credential {
            id: user_id,
            user_id,
            issuer_auth_public_key: String::new(),
            encryptor_public_key: hex::encode(public),
            content: idos_core::types::Base64Bytes(sealed).encode(),
            public_notes: String::new(),
        };
        let plaintext = client.decrypt_credential(&credential).await.unwrap();
        assert_eq!(plaintext, b"credential body");

        client.lock_enclave().await;
        assert!(matches!(
            client.decrypt_credential(&credential).await,
            Err(EnclaveError::NoKey)
        ));
    }
}
