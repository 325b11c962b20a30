use crate::{Signer, TypedDataSigner};
use async_trait::async_trait;
use idos_core::{
    crypto::{secret_key_to_address, sign_message_recoverable, EcdsaError},
    eip712::{Eip712Domain, Eip712Field, TypedData},
    k256::ecdsa::SigningKey,
    rand::{CryptoRng, Rng},
    types::{Bytes, SignatureType},
};
use serde_json::json;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Error thrown by the wallet signers.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error(transparent)]
    EcdsaError(#[from] EcdsaError),
    #[error(transparent)]
    Eip712Error(#[from] idos_core::eip712::Eip712Error),
    #[error(transparent)]
    HexError(#[from] hex::FromHexError),
    #[error(transparent)]
    KeyError(#[from] idos_core::k256::ecdsa::Error),
}

/// A secp256k1 private-public key pair signing with EIP-191 personal sign.
///
/// The wallet's identifier is its 20-byte Ethereum-style address; every
/// signature it produces recovers to that address.
#[derive(Clone)]
pub struct LocalWallet {
    pub(crate) signer: SigningKey,
    pub(crate) address: [u8; 20],
}

impl LocalWallet {
    /// Creates a new random keypair seeded with the provided RNG.
    pub fn new<R: Rng + CryptoRng>(rng: &mut R) -> Self {
        let signer = SigningKey::random(rng);
        let address = secret_key_to_address(&signer);
        Self { signer, address }
    }

    /// Restores a wallet from a 32-byte secret key.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, WalletError> {
        let signer = SigningKey::from_slice(secret)?;
        let address = secret_key_to_address(&signer);
        Ok(Self { signer, address })
    }

    /// The wallet's 20-byte address.
    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<Vec<u8>, WalletError> {
        let (signature, recovery_id) = self.signer.sign_prehash_recoverable(digest)?;
        let mut out = Vec::with_capacity(65);
        out.extend_from_slice(&signature.to_bytes());
        out.push(27 + recovery_id.to_byte());
        Ok(out)
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet").field("address", &hex::encode(self.address)).finish()
    }
}

impl FromStr for LocalWallet {
    type Err = WalletError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.strip_prefix("0x").unwrap_or(value);
        Self::from_bytes(&hex::decode(value)?)
    }
}

#[async_trait]
impl Signer for LocalWallet {
    type Error = WalletError;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Self::Error> {
        Ok(sign_message_recoverable(&self.signer, message)?.to_vec())
    }

    fn identifier(&self) -> Bytes {
        Bytes::from(self.address)
    }

    fn signature_type(&self) -> SignatureType {
        SignatureType::Secp256k1Personal
    }
}

#[async_trait]
impl TypedDataSigner for LocalWallet {
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String, Self::Error> {
        let digest = typed_data.digest()?;
        Ok(format!("0x{}", hex::encode(self.sign_digest(&digest)?)))
    }
}

/// A secp256k1 wallet that authenticates with `eth_personal_sign_eip712`:
/// plain-text messages are wrapped in a one-field `Message` structure and
/// signed as typed data, the way wallets restricted to `eth_signTypedData`
/// operate.
#[derive(Clone, Debug)]
pub struct Eip712Wallet {
    inner: LocalWallet,
}

impl Eip712Wallet {
    pub fn new(inner: LocalWallet) -> Self {
        Self { inner }
    }

    fn wrap_message(message: &[u8]) -> TypedData {
        TypedData::new(
            "Message",
            vec![Eip712Field::new("contents", "string")],
            Eip712Domain {
                name: Some("idOS".to_owned()),
                version: Some("1".to_owned()),
                ..Default::default()
            },
            json!({ "contents": String::from_utf8_lossy(message) }),
        )
    }
}

#[async_trait]
impl Signer for Eip712Wallet {
    type Error = WalletError;

    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Self::Error> {
        let typed = Self::wrap_message(message);
        self.inner.sign_digest(&typed.digest()?)
    }

    fn identifier(&self) -> Bytes {
        self.inner.identifier()
    }

    fn signature_type(&self) -> SignatureType {
        SignatureType::Eip712
    }
}

#[async_trait]
impl TypedDataSigner for Eip712Wallet {
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String, Self::Error> {
        self.inner.sign_typed_data(typed_data).await
    }
}
