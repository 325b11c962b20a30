#![warn(missing_debug_implementations, rust_2018_idioms, unreachable_pub)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Complete idOS network SDK.
//!
//! ## Quickstart: `prelude`
//!
//! A prelude is provided which imports all the important data types and
//! traits for you. Use this when you want to quickly bootstrap a new
//! project.
//!
//! ```no_run
//! # #[allow(unused)]
//! use idos::prelude::*;
//! ```
//!
//! # Quick explanation of each module in ascending order of abstraction
//!
//! ## `core`
//!
//! Contains all the necessary data structures for talking to the network
//! (hex/base64/uuid wrappers, declared parameter types, the transaction
//! envelope), the little-endian action codec, and the cryptographic
//! primitives the SDK composes: keccak-256 and SHA-256 hashing, scrypt key
//! derivation, NaCl box encryption and secp256k1 personal sign.
//!
//! ## `signers`
//!
//! This module provides a [`Signer`] trait which can be used for signing
//! transactions and gateway challenges. Wallets for all three schemes the
//! network accepts are implemented: secp256k1 EIP-191 personal sign,
//! secp256k1 over EIP-712 typed data, and Ed25519.
//!
//! ## `providers`
//!
//! idOS nodes expose JSON-RPC endpoints at `/rpc/v1`. You can connect to
//! them by using the [`Provider`], which wraps the method surface, keeps
//! the gateway session cookie on its shared HTTP client, and distinguishes
//! transaction failure from transport failure.
//!
//! ## `enclave`
//!
//! The user's secret-key holder: derives a Curve25519 key from a password,
//! keeps it behind an expiration policy in platform storage, and performs
//! the authenticated public-key encryption credentials are protected
//! with, orchestrated through a `Locked / Unlocking / Unlocked` state
//! machine with observable state.
//!
//! ## `recovery`
//!
//! An alternative source for the enclave key: Shamir shares over GF(256),
//! blinded and committed, spread across the secret-store nodes and
//! recovered through signed, quorum-tolerant fan-out.
//!
//! ## `client`
//!
//! The [`ActionClient`] drives the execute/view pipelines (nonce, codec,
//! canonical signable message, broadcast, retry-once re-authentication)
//! and [`IdosClient`] exposes the application operations: profiles,
//! wallets, credentials, access grants and attributes.
//!
//! [`Signer`]: signers::Signer
//! [`Provider`]: providers::Provider
//! [`ActionClient`]: client::ActionClient
//! [`IdosClient`]: client::IdosClient

/// Action executor and high-level application client.
pub mod client {
    pub use idos_client::*;
}

/// Data types, cryptography and wire codecs.
pub mod core {
    pub use idos_core::*;
}

/// Password-derived key enclave and lifecycle orchestration.
pub mod enclave {
    pub use idos_enclave::*;
}

/// Clients for the network's RPC surface and gateway.
pub mod providers {
    pub use idos_providers::*;
}

/// Distributed secret recovery over the secret-store nodes.
pub mod recovery {
    pub use idos_recovery::*;
}

/// Signer implementations for the supported signature schemes.
pub mod signers {
    pub use idos_signers::*;
}

pub use crate::core::{codec, crypto, eip712, types, utils};

/// Easy imports of frequently used type definitions and traits.
#[doc(hidden)]
pub mod prelude {
    pub use super::client::*;

    pub use super::core::types::*;

    pub use super::enclave::*;

    pub use super::providers::*;

    pub use super::recovery::*;

    pub use super::signers::*;
}
