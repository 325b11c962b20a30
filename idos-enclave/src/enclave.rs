use crate::{
    metadata::now_ms, metadata_slot, secret_slot, DecryptionFailure, EnclaveError,
    ExpirationPolicy, KeyKind, KeyMetadata, KeyStore,
};
use idos_core::crypto::{
    derive_enclave_secret, open, public_key_from_secret, seal, BoxError, ENCLAVE_SECRET_LEN,
};
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;
use zeroize::Zeroizing;

/// The user's secret-key holder and encryption engine.
///
/// The secret is either derived from a password (scrypt over the NFKC
/// password, salted with the user id) or imported from the
/// distributed-recovery network. It lives in the key store under a
/// kind-namespaced slot, next to JSON metadata carrying the expiration
/// policy.
pub struct Enclave<K> {
    store: K,
    kind: KeyKind,
}

impl<K: KeyStore> Enclave<K> {
    pub fn new(store: K, kind: KeyKind) -> Self {
        Self { store, kind }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    /// Derives a fresh secret key from `password`, persists it with a
    /// timed expiration, and returns the Curve25519 public key.
    ///
    /// scrypt runs on a blocking worker; the intermediate secret buffer is
    /// zeroed when it drops.
    #[instrument(skip(self, password))]
    pub async fn generate_key(
        &self,
        user_id: &Uuid,
        password: &str,
        expiration: Duration,
    ) -> Result<[u8; 32], EnclaveError> {
        let password = password.to_owned();
        let id = user_id.hyphenated().to_string();
        let secret = tokio::task::spawn_blocking(move || derive_enclave_secret(&password, &id))
            .await
            .map_err(|err| EnclaveError::KeyGenerationFailed { details: err.to_string() })?
            .map_err(|err| EnclaveError::KeyGenerationFailed { details: err.to_string() })?;

        let now = now_ms();
        let metadata = KeyMetadata {
            user_id: *user_id,
            public_key: idos_core::types::Bytes::from(public_key_from_secret(&secret)),
            kind: self.kind,
            expiration_type: ExpirationPolicy::Timed,
            expires_at: Some(now + expiration.as_millis() as u64),
            created_at: now,
            last_used_at: now,
            used: false,
        };
        self.persist(&secret, &metadata).await
    }

    /// Installs an externally recovered 32-byte secret (the
    /// distributed-recovery path) under the given policy.
    #[instrument(skip(self, secret))]
    pub async fn import_key(
        &self,
        user_id: &Uuid,
        secret: &[u8; ENCLAVE_SECRET_LEN],
        policy: ExpirationPolicy,
        expiration: Option<Duration>,
    ) -> Result<[u8; 32], EnclaveError> {
        let now = now_ms();
        let metadata = KeyMetadata {
            user_id: *user_id,
            public_key: idos_core::types::Bytes::from(public_key_from_secret(secret)),
            kind: self.kind,
            expiration_type: policy,
            expires_at: expiration.map(|e| now + e.as_millis() as u64),
            created_at: now,
            last_used_at: now,
            used: false,
        };
        if policy == ExpirationPolicy::Timed && metadata.expires_at.is_none() {
            return Err(EnclaveError::KeyGenerationFailed {
                details: "timed keys need an expiration".to_owned(),
            });
        }
        self.persist(&Zeroizing::new(*secret), &metadata).await
    }

    async fn persist(
        &self,
        secret: &Zeroizing<[u8; ENCLAVE_SECRET_LEN]>,
        metadata: &KeyMetadata,
    ) -> Result<[u8; 32], EnclaveError> {
        let meta_json = serde_json::to_vec(metadata)
            .map_err(|err| EnclaveError::StorageFailed { details: err.to_string() })?;

        self.store
            .write(&secret_slot(self.kind), secret.as_ref())
            .await
            .map_err(EnclaveError::storage)?;
        self.store
            .write(&metadata_slot(self.kind), &meta_json)
            .await
            .map_err(EnclaveError::storage)?;

        let mut public = [0u8; 32];
        public.copy_from_slice(&metadata.public_key);
        Ok(public)
    }

    /// Erases both slots. Idempotent.
    pub async fn delete_key(&self) -> Result<(), EnclaveError> {
        self.store.delete(&secret_slot(self.kind)).await.map_err(EnclaveError::storage)?;
        self.store.delete(&metadata_slot(self.kind)).await.map_err(EnclaveError::storage)?;
        Ok(())
    }

    /// Loads the metadata iff present and unexpired. An expired or absent
    /// key purges both slots before failing with `KeyExpired` / `NoKey`.
    pub async fn has_valid_key(&self) -> Result<KeyMetadata, EnclaveError> {
        let raw = self
            .store
            .read(&metadata_slot(self.kind))
            .await
            .map_err(EnclaveError::storage)?
            .ok_or(EnclaveError::NoKey)?;
        let metadata: KeyMetadata = serde_json::from_slice(&raw).map_err(|err| {
            EnclaveError::StorageFailed { details: format!("corrupt metadata: {err}") }
        })?;

        if metadata.is_expired(now_ms()) {
            debug!(kind = %self.kind, "purging expired enclave key");
            self.delete_key().await?;
            return Err(EnclaveError::KeyExpired);
        }
        Ok(metadata)
    }

    /// The stored key's Curve25519 public key.
    pub async fn public_key(&self) -> Result<[u8; 32], EnclaveError> {
        let metadata = self.has_valid_key().await?;
        metadata.public_key.as_ref().try_into().map_err(|_| EnclaveError::InvalidPublicKey {
            details: format!("stored public key has {} bytes", metadata.public_key.len()),
        })
    }

    /// Seals `msg` to `receiver_pub` under the stored secret, returning
    /// `(nonce || ciphertext, own_public_key)`.
    pub async fn encrypt(
        &self,
        msg: &[u8],
        receiver_pub: &[u8; 32],
    ) -> Result<(Vec<u8>, [u8; 32]), EnclaveError> {
        let mut metadata = self.has_valid_key().await?;
        let secret = self.load_secret().await?;
        let sealed = seal(msg, receiver_pub, &secret)
            .map_err(|err| EnclaveError::EncryptionFailed { details: err.to_string() })?;
        self.touch(&mut metadata).await?;

        let own_pub = public_key_from_secret(&secret);
        Ok((sealed, own_pub))
    }

    /// Opens `nonce || ciphertext` sealed by `sender_pub` to the stored
    /// key. An authentication failure on a present, unexpired key is
    /// classified as `WrongPassword`.
    pub async fn decrypt(
        &self,
        sealed: &[u8],
        sender_pub: &[u8; 32],
    ) -> Result<Vec<u8>, EnclaveError> {
        let mut metadata = self.has_valid_key().await?;
        let secret = self.load_secret().await?;
        let plaintext = match open(sealed, sender_pub, &secret) {
            Ok(plaintext) => plaintext,
            Err(BoxError::ShortCiphertext) => {
                return Err(EnclaveError::DecryptionFailed {
                    reason: DecryptionFailure::InvalidCiphertext,
                    details: Some("missing nonce prefix".to_owned()),
                })
            }
            Err(_) => {
                return Err(EnclaveError::DecryptionFailed {
                    reason: DecryptionFailure::WrongPassword,
                    details: None,
                })
            }
        };
        self.touch(&mut metadata).await?;
        Ok(plaintext)
    }

    async fn load_secret(&self) -> Result<Zeroizing<[u8; ENCLAVE_SECRET_LEN]>, EnclaveError> {
        let raw = Zeroizing::new(
            self.store
                .read(&secret_slot(self.kind))
                .await
                .map_err(EnclaveError::storage)?
                .ok_or(EnclaveError::NoKey)?,
        );
        let secret: [u8; ENCLAVE_SECRET_LEN] =
            raw.as_slice().try_into().map_err(|_| EnclaveError::StorageFailed {
                details: format!("secret slot has {} bytes", raw.len()),
            })?;
        Ok(Zeroizing::new(secret))
    }

    async fn touch(&self, metadata: &mut KeyMetadata) -> Result<(), EnclaveError> {
        metadata.touch(now_ms());
        let meta_json = serde_json::to_vec(metadata)
            .map_err(|err| EnclaveError::StorageFailed { details: err.to_string() })?;
        self.store.write(&metadata_slot(self.kind), &meta_json).await.map_err(EnclaveError::storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKeyStore;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
    const HOUR: Duration = Duration::from_secs(3600);

    fn enclave() -> Enclave<MemoryKeyStore> {
        Enclave::new(MemoryKeyStore::new(), KeyKind::User)
    }

    #[tokio::test]
    async fn generate_encrypt_decrypt_round_trip() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let public =
            enclave.generate_key(&user_id, "correct horse battery staple", HOUR).await.unwrap();

        // encrypt to our own public key, then open against it
        let (sealed, own_pub) = enclave.encrypt(b"hello", &public).await.unwrap();
        assert_eq!(own_pub, public);
        let plaintext = enclave.decrypt(&sealed, &public).await.unwrap();
        assert_eq!(plaintext, b"hello");
    }

    #[tokio::test]
    async fn same_password_same_public_key() {
        let user_id: Uuid = USER_ID.parse().unwrap();
        let a = enclave().generate_key(&user_id, "pw", HOUR).await.unwrap();
        let b = enclave().generate_key(&user_id, "pw", HOUR).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn delete_then_no_key() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        enclave.generate_key(&user_id, "pw", HOUR).await.unwrap();
        enclave.delete_key().await.unwrap();
        enclave.delete_key().await.unwrap();
        assert!(matches!(enclave.has_valid_key().await, Err(EnclaveError::NoKey)));
        assert!(matches!(
            enclave.decrypt(&[0u8; 40], &[0u8; 32]).await,
            Err(EnclaveError::NoKey)
        ));
    }

    #[tokio::test]
    async fn wrong_sender_classified_as_wrong_password() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let public = enclave.generate_key(&user_id, "pw", HOUR).await.unwrap();
        let (sealed, _) = enclave.encrypt(b"msg", &public).await.unwrap();

        let (_, stranger_pub) = idos_core::crypto::generate_box_keypair();
        match enclave.decrypt(&sealed, &stranger_pub).await {
            Err(EnclaveError::DecryptionFailed { reason, .. }) => {
                assert_eq!(reason, DecryptionFailure::WrongPassword)
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn truncated_ciphertext_classified_as_invalid() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let public = enclave.generate_key(&user_id, "pw", HOUR).await.unwrap();
        match enclave.decrypt(&[1, 2, 3], &public).await {
            Err(EnclaveError::DecryptionFailed { reason, .. }) => {
                assert_eq!(reason, DecryptionFailure::InvalidCiphertext)
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn expired_key_purges_storage() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        enclave.generate_key(&user_id, "pw", Duration::from_millis(0)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(matches!(enclave.has_valid_key().await, Err(EnclaveError::KeyExpired)));
        // the purge leaves nothing behind
        assert!(matches!(enclave.has_valid_key().await, Err(EnclaveError::NoKey)));
    }

    #[tokio::test]
    async fn one_shot_key_retires_after_single_use() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let secret = idos_core::crypto::random_bytes::<32>();
        let public = enclave
            .import_key(&user_id, &secret, ExpirationPolicy::OneShot, None)
            .await
            .unwrap();

        let (sealed, _) = enclave.encrypt(b"once", &public).await.unwrap();
        // second use fails: the first use retired the key
        assert!(matches!(
            enclave.decrypt(&sealed, &public).await,
            Err(EnclaveError::KeyExpired)
        ));
    }

    #[tokio::test]
    async fn session_key_survives_uses() {
        let enclave = enclave();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let secret = idos_core::crypto::random_bytes::<32>();
        let public = enclave
            .import_key(&user_id, &secret, ExpirationPolicy::Session, None)
            .await
            .unwrap();
        for _ in 0..3 {
            let (sealed, _) = enclave.encrypt(b"again", &public).await.unwrap();
            assert_eq!(enclave.decrypt(&sealed, &public).await.unwrap(), b"again");
        }
    }
}
