use crate::{Enclave, EnclaveError, KeyStore};
use std::{future::Future, sync::Arc, time::Duration};
use tokio::sync::{watch, Mutex};
use tracing::{instrument, warn};
use uuid::Uuid;

/// Lifecycle state of the enclave. Transitions only happen through the
/// orchestrator's operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnclaveState {
    Locked,
    Unlocking,
    Unlocked,
}

/// State machine around an [`Enclave`], exposing its lifecycle as an
/// observable value.
///
/// Subscribers receive the latest state on subscription and each
/// subsequent change. Unlock attempts are serialized internally so that
/// persisted metadata always corresponds to the persisted secret.
pub struct EnclaveOrchestrator<K> {
    enclave: Arc<Enclave<K>>,
    state_tx: watch::Sender<EnclaveState>,
    unlock_gate: Mutex<()>,
}

impl<K: KeyStore> EnclaveOrchestrator<K> {
    pub fn new(enclave: Enclave<K>) -> Self {
        let (state_tx, _) = watch::channel(EnclaveState::Locked);
        Self { enclave: Arc::new(enclave), state_tx, unlock_gate: Mutex::new(()) }
    }

    /// The current state.
    pub fn state(&self) -> EnclaveState {
        *self.state_tx.borrow()
    }

    /// A receiver that yields the current state immediately and every
    /// change afterwards.
    pub fn subscribe(&self) -> watch::Receiver<EnclaveState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: EnclaveState) {
        // send_replace updates the channel even with no subscribers
        self.state_tx.send_replace(state);
    }

    /// Re-derives the state from storage: `Unlocked` iff a valid key is
    /// present.
    pub async fn check_status(&self) -> EnclaveState {
        let state = match self.enclave.has_valid_key().await {
            Ok(_) => EnclaveState::Unlocked,
            Err(_) => EnclaveState::Locked,
        };
        self.set_state(state);
        state
    }

    /// Derives and persists a key for `user_id`, moving through
    /// `Unlocking` and ending `Unlocked` on success, `Locked` on any
    /// failure.
    #[instrument(skip(self, password))]
    pub async fn unlock(
        &self,
        user_id: &Uuid,
        password: &str,
        expiration: Duration,
    ) -> Result<[u8; 32], EnclaveError> {
        let _gate = self.unlock_gate.lock().await;
        self.set_state(EnclaveState::Unlocking);
        match self.enclave.generate_key(user_id, password, expiration).await {
            Ok(public_key) => {
                self.set_state(EnclaveState::Unlocked);
                Ok(public_key)
            }
            Err(err) => {
                self.set_state(EnclaveState::Locked);
                Err(err)
            }
        }
    }

    /// Erases the key and locks. The state always ends `Locked`, even
    /// when the erase fails.
    pub async fn lock(&self) {
        let _gate = self.unlock_gate.lock().await;
        if let Err(err) = self.enclave.delete_key().await {
            warn!(%err, "failed to erase enclave key while locking");
        }
        self.set_state(EnclaveState::Locked);
    }

    /// Runs `f` with the live enclave iff the current state is
    /// `Unlocked`; fails with `NoKey` otherwise. Callers are not queued.
    pub async fn with_enclave<F, Fut, T>(&self, f: F) -> Result<T, EnclaveError>
    where
        F: FnOnce(Arc<Enclave<K>>) -> Fut,
        Fut: Future<Output = Result<T, EnclaveError>>,
    {
        if self.state() != EnclaveState::Unlocked {
            return Err(EnclaveError::NoKey);
        }
        f(Arc::clone(&self.enclave)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeyKind, MemoryKeyStore};

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";
    const HOUR: Duration = Duration::from_secs(3600);

    fn orchestrator() -> EnclaveOrchestrator<MemoryKeyStore> {
        EnclaveOrchestrator::new(Enclave::new(MemoryKeyStore::new(), KeyKind::User))
    }

    #[tokio::test]
    async fn unlock_moves_to_unlocked() {
        let orch = orchestrator();
        assert_eq!(orch.state(), EnclaveState::Locked);

        let user_id: Uuid = USER_ID.parse().unwrap();
        orch.unlock(&user_id, "correct horse battery staple", HOUR).await.unwrap();
        assert_eq!(orch.state(), EnclaveState::Unlocked);
    }

    #[tokio::test]
    async fn failed_unlock_ends_locked() {
        use crate::StorageError;
        use async_trait::async_trait;

        #[derive(Debug)]
        struct BrokenStore;

        #[async_trait]
        impl crate::KeyStore for BrokenStore {
            async fn read(&self, _slot: &str) -> Result<Option<Vec<u8>>, StorageError> {
                Err(StorageError::new("backend offline"))
            }
            async fn write(&self, _slot: &str, _value: &[u8]) -> Result<(), StorageError> {
                Err(StorageError::new("backend offline"))
            }
            async fn delete(&self, _slot: &str) -> Result<(), StorageError> {
                Err(StorageError::new("backend offline"))
            }
        }

        let orch = EnclaveOrchestrator::new(Enclave::new(BrokenStore, KeyKind::User));
        let user_id: Uuid = USER_ID.parse().unwrap();
        let result = orch.unlock(&user_id, "pw", HOUR).await;
        assert!(matches!(result, Err(EnclaveError::StorageFailed { .. })));
        assert_eq!(orch.state(), EnclaveState::Locked);

        // lock still ends Locked even though delete_key fails
        orch.lock().await;
        assert_eq!(orch.state(), EnclaveState::Locked);
    }

    #[tokio::test]
    async fn lock_always_ends_locked() {
        let orch = orchestrator();
        orch.lock().await;
        assert_eq!(orch.state(), EnclaveState::Locked);
    }

    #[tokio::test]
    async fn with_enclave_requires_unlocked() {
        let orch = orchestrator();
        let result = orch.with_enclave(|enclave| async move { enclave.public_key().await }).await;
        assert!(matches!(result, Err(EnclaveError::NoKey)));
    }

    #[tokio::test]
    async fn encrypt_decrypt_through_orchestrator_then_lock() {
        let orch = orchestrator();
        let user_id: Uuid = USER_ID.parse().unwrap();
        let public = orch.unlock(&user_id, "correct horse battery staple", HOUR).await.unwrap();

        let sealed = orch
            .with_enclave(|enclave| async move { enclave.encrypt(b"hello", &public).await })
            .await
            .unwrap()
            .0;
        let plaintext = orch
            .with_enclave(|enclave| {
                let sealed = sealed.clone();
                async move { enclave.decrypt(&sealed, &public).await }
            })
            .await
            .unwrap();
        assert_eq!(plaintext, b"hello");

        orch.lock().await;
        let after = orch
            .with_enclave(|enclave| {
                let sealed = sealed.clone();
                async move { enclave.decrypt(&sealed, &public).await }
            })
            .await;
        assert!(matches!(after, Err(EnclaveError::NoKey)));
    }

    #[tokio::test]
    async fn check_status_recovers_unlocked_from_storage() {
        let store = MemoryKeyStore::new();
        let enclave = Enclave::new(store, KeyKind::User);
        let user_id: Uuid = USER_ID.parse().unwrap();
        enclave.generate_key(&user_id, "pw", HOUR).await.unwrap();

        let orch = EnclaveOrchestrator::new(enclave);
        assert_eq!(orch.state(), EnclaveState::Locked);
        assert_eq!(orch.check_status().await, EnclaveState::Unlocked);
    }

    #[tokio::test]
    async fn subscribers_see_latest_value_and_changes() {
        let orch = orchestrator();
        let mut rx = orch.subscribe();
        assert_eq!(*rx.borrow_and_update(), EnclaveState::Locked);

        let user_id: Uuid = USER_ID.parse().unwrap();
        orch.unlock(&user_id, "pw", HOUR).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), EnclaveState::Unlocked);
    }
}
