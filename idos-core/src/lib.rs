#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Wire encoding for action calls and executions.
pub mod codec;

/// Cryptographic primitives: scrypt derivation, NaCl box, secp256k1, hashing.
pub mod crypto;

/// Dynamic EIP-712 typed-data hashing.
pub mod eip712;

/// Data types shared across the SDK.
pub mod types;

/// Hashing and byte-level helpers.
pub mod utils;

// Re-export the crypto crates so downstream users don't have to pin
// matching versions themselves.
pub use k256;
pub use rand;
pub use uuid;
