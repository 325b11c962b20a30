use crate::Signer;
use async_trait::async_trait;
use ed25519_dalek::{Signer as _, SigningKey, SECRET_KEY_LENGTH};
use idos_core::types::{Bytes, SignatureType};
use std::fmt;
use thiserror::Error;

/// Error thrown by the Ed25519 wallet.
#[derive(Debug, Error)]
pub enum Ed25519Error {
    #[error("secret key must be {SECRET_KEY_LENGTH} bytes, got {0}")]
    InvalidSecretLength(usize),
}

/// An Ed25519 keypair. Its identifier is the 32-byte public key and its
/// signatures are the plain 64-byte form.
#[derive(Clone)]
pub struct Ed25519Wallet {
    signer: SigningKey,
}

impl Ed25519Wallet {
    /// Creates a new random keypair seeded with the provided RNG.
    pub fn new<R: idos_core::rand::Rng + idos_core::rand::CryptoRng>(rng: &mut R) -> Self {
        Self { signer: SigningKey::generate(rng) }
    }

    /// Restores a wallet from a 32-byte secret key.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, Ed25519Error> {
        let secret: &[u8; SECRET_KEY_LENGTH] =
            secret.try_into().map_err(|_| Ed25519Error::InvalidSecretLength(secret.len()))?;
        Ok(Self { signer: SigningKey::from_bytes(secret) })
    }

    /// The 32-byte public key.
    pub fn public_key(&self) -> [u8; 32] {
        self.signer.verifying_key().to_bytes()
    }
}

impl fmt::Debug for Ed25519Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Wallet")
            .field("public_key", &hex::encode(self.public_key()))
            .finish()
    }
}

#[async_trait]
impl Signer for Ed25519Wallet {
    type Error = Ed25519Error;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Ok(self.signer.sign(message).to_bytes().to_vec())
    }

    fn identifier(&self) -> Bytes {
        Bytes::from(self.public_key())
    }

    fn signature_type(&self) -> SignatureType {
        SignatureType::Ed25519
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    #[tokio::test]
    async fn signature_verifies_under_identifier() {
        let wallet = Ed25519Wallet::new(&mut idos_core::rand::thread_rng());
        let sig = wallet.sign(b"challenge").await.unwrap();
        assert_eq!(sig.len(), 64);

        let public: [u8; 32] = wallet.identifier().as_ref().try_into().unwrap();
        let key = VerifyingKey::from_bytes(&public).unwrap();
        let sig = Signature::from_slice(&sig).unwrap();
        key.verify(b"challenge", &sig).unwrap();
    }

    #[test]
    fn rejects_short_secrets() {
        assert!(matches!(
            Ed25519Wallet::from_bytes(&[0u8; 16]),
            Err(Ed25519Error::InvalidSecretLength(16))
        ));
    }
}
