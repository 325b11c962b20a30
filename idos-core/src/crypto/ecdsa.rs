use crate::utils::{hash_message, keccak256};
use k256::{
    ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
};
use thiserror::Error;

/// Length of a recoverable secp256k1 signature: `r || s || v`.
pub const SIGNATURE_LEN: usize = 65;

/// Error thrown by the secp256k1 helpers.
#[derive(Debug, Error)]
pub enum EcdsaError {
    #[error("invalid signature length, got {0}, expected {SIGNATURE_LEN}")]
    InvalidLength(usize),
    /// `v` must be 27 or 28 ('Electrum' notation).
    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryByte(u8),
    #[error(transparent)]
    Signature(#[from] k256::ecdsa::Error),
}

/// EIP-191 personal sign: hashes the prefixed message with keccak256 and
/// signs the digest, returning `r || s || v` with `v ∈ {27, 28}`.
pub fn sign_message_recoverable(key: &SigningKey, message: &[u8]) -> Result<[u8; SIGNATURE_LEN], EcdsaError> {
    let digest = hash_message(message);
    let (signature, recovery_id) = key.sign_prehash_recoverable(&digest)?;

    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Recovers the 20-byte address that personal-signed `message`.
pub fn recover_address(message: &[u8], signature: &[u8]) -> Result<[u8; 20], EcdsaError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(EcdsaError::InvalidLength(signature.len()));
    }
    let v = signature[64];
    let recovery_id = v
        .checked_sub(27)
        .and_then(RecoveryId::from_byte)
        .ok_or(EcdsaError::InvalidRecoveryByte(v))?;
    let signature = Signature::from_slice(&signature[..64])?;

    let digest = hash_message(message);
    let verifying_key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)?;
    Ok(public_key_to_address(&verifying_key))
}

/// Verifies a personal-sign signature against the expected signer address.
pub fn verify_message(message: &[u8], signature: &[u8], address: &[u8; 20]) -> Result<(), EcdsaError> {
    let recovered = recover_address(message, signature)?;
    if &recovered != address {
        return Err(EcdsaError::Signature(k256::ecdsa::Error::new()));
    }
    Ok(())
}

/// The Ethereum-style address of a secret key: last 20 bytes of the keccak
/// of the uncompressed public key.
pub fn secret_key_to_address(key: &SigningKey) -> [u8; 20] {
    public_key_to_address(key.verifying_key())
}

fn public_key_to_address(key: &VerifyingKey) -> [u8; 20] {
    let point = key.to_encoded_point(false);
    let digest = keccak256(&point.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn sign_recovers_to_signer() {
        let key = SigningKey::random(&mut OsRng);
        let address = secret_key_to_address(&key);

        let sig = sign_message_recoverable(&key, b"hello idos").unwrap();
        assert!(sig[64] == 27 || sig[64] == 28);
        assert_eq!(recover_address(b"hello idos", &sig).unwrap(), address);
        verify_message(b"hello idos", &sig, &address).unwrap();
    }

    #[test]
    fn tampered_message_fails_verification() {
        let key = SigningKey::random(&mut OsRng);
        let address = secret_key_to_address(&key);
        let sig = sign_message_recoverable(&key, b"hello").unwrap();
        assert!(verify_message(b"hellO", &sig, &address).is_err());
    }

    #[test]
    fn rejects_bad_recovery_byte() {
        let key = SigningKey::random(&mut OsRng);
        let mut sig = sign_message_recoverable(&key, b"m").unwrap();
        sig[64] = 99;
        assert!(matches!(
            recover_address(b"m", &sig),
            Err(EcdsaError::InvalidRecoveryByte(99))
        ));
    }

    #[test]
    // well-known test key: address derived from secret key 0x01
    fn known_address_derivation() {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let key = SigningKey::from_slice(&secret).unwrap();
        assert_eq!(
            hex::encode(secret_key_to_address(&key)),
            "7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }
}
