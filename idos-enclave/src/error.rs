use std::error::Error;
use thiserror::Error;

/// Classification of a failed decryption.
///
/// The box primitive cannot distinguish a wrong key from corrupted data;
/// `WrongPassword` is the classification applied when the stored key is
/// present and unexpired. It is a UX hint, not a security claim.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptionFailure {
    WrongPassword,
    CorruptedData,
    InvalidCiphertext,
    Unknown,
}

/// Error taxonomy of the enclave boundary.
#[derive(Debug, Error)]
pub enum EnclaveError {
    /// No key material is present (never generated, deleted, or locked).
    #[error("no enclave key present")]
    NoKey,

    /// Key material exists but its expiration policy has retired it.
    #[error("enclave key expired")]
    KeyExpired,

    #[error("decryption failed: {reason:?}")]
    DecryptionFailed { reason: DecryptionFailure, details: Option<String> },

    #[error("encryption failed: {details}")]
    EncryptionFailed { details: String },

    #[error("key storage failed: {details}")]
    StorageFailed { details: String },

    #[error("key generation failed: {details}")]
    KeyGenerationFailed { details: String },

    #[error("invalid public key: {details}")]
    InvalidPublicKey { details: String },

    #[error("{details}")]
    Unknown {
        details: String,
        #[source]
        cause: Option<Box<dyn Error + Send + Sync>>,
    },
}

impl EnclaveError {
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        EnclaveError::StorageFailed { details: err.to_string() }
    }
}
