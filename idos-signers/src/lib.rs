#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod ed25519;
pub use ed25519::Ed25519Wallet;

mod wallet;
pub use wallet::{Eip712Wallet, LocalWallet, WalletError};

use async_trait::async_trait;
use idos_core::{
    eip712::TypedData,
    types::{Bytes, SignatureType},
};
use std::error::Error;

/// Trait for signing broadcast transactions and gateway challenges.
///
/// Implement this trait to support different signing modes, e.g. an
/// in-process key, a browser wallet bridge, or an HSM. Callers only ever
/// see the identifier, the declared signature type, and raw signature
/// bytes.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync + 'static;

    /// Signs raw message bytes under this signer's scheme.
    async fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Self::Error>;

    /// The signer's public identifier in wire form: the 20-byte address
    /// for secp256k1 schemes, the 32-byte public key for ed25519.
    fn identifier(&self) -> Bytes;

    /// The scheme the network should verify signatures under.
    fn signature_type(&self) -> SignatureType;
}

/// Signers that can additionally sign EIP-712 typed-data structures. The
/// distributed-recovery protocol requires this capability.
#[async_trait]
pub trait TypedDataSigner: Signer {
    /// Signs the typed-data digest, returning the `0x`-prefixed hex
    /// signature wallets produce.
    async fn sign_typed_data(&self, typed_data: &TypedData) -> Result<String, Self::Error>;
}
