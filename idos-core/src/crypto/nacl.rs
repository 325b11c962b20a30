use super::random_bytes;
use crypto_box::{
    aead::{generic_array::GenericArray, Aead},
    PublicKey, SalsaBox, SecretKey,
};
use thiserror::Error;
use zeroize::Zeroizing;

/// Nonce length of the NaCl box construction; sealed output is
/// `nonce || ciphertext_with_mac`.
pub const BOX_NONCE_LEN: usize = 24;

/// Curve25519 secret scalar length.
pub const BOX_SECRET_LEN: usize = 32;

/// Error thrown by the NaCl box operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoxError {
    #[error("encryption failed")]
    Seal,
    /// Open failure is indistinguishable between a wrong key and corrupted
    /// ciphertext at this layer; callers classify.
    #[error("decryption failed")]
    Open,
    #[error("ciphertext shorter than the {BOX_NONCE_LEN}-byte nonce prefix")]
    ShortCiphertext,
}

/// Generates a fresh Curve25519 keypair `(secret, public)`.
pub fn generate_box_keypair() -> (Zeroizing<[u8; 32]>, [u8; 32]) {
    let secret = Zeroizing::new(random_bytes::<BOX_SECRET_LEN>());
    let public = public_key_from_secret(&secret);
    (secret, public)
}

/// Derives the Curve25519 public key of a 32-byte secret scalar.
pub fn public_key_from_secret(secret: &[u8; 32]) -> [u8; 32] {
    *SecretKey::from(*secret).public_key().as_bytes()
}

/// Authenticated public-key encryption: seals `msg` to `receiver_pub` from
/// `sender_secret`, returning `nonce(24) || ciphertext_with_mac` with a
/// fresh random nonce.
pub fn seal(msg: &[u8], receiver_pub: &[u8; 32], sender_secret: &[u8; 32]) -> Result<Vec<u8>, BoxError> {
    let sbox = SalsaBox::new(&PublicKey::from(*receiver_pub), &SecretKey::from(*sender_secret));
    let nonce = random_bytes::<BOX_NONCE_LEN>();
    let ciphertext =
        sbox.encrypt(GenericArray::from_slice(&nonce), msg).map_err(|_| BoxError::Seal)?;

    let mut out = Vec::with_capacity(BOX_NONCE_LEN + ciphertext.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Opens `nonce(24) || ciphertext_with_mac` sealed by `sender_pub` to
/// `receiver_secret`.
pub fn open(
    sealed: &[u8],
    sender_pub: &[u8; 32],
    receiver_secret: &[u8; 32],
) -> Result<Vec<u8>, BoxError> {
    if sealed.len() < BOX_NONCE_LEN {
        return Err(BoxError::ShortCiphertext);
    }
    let (nonce, ciphertext) = sealed.split_at(BOX_NONCE_LEN);
    let sbox = SalsaBox::new(&PublicKey::from(*sender_pub), &SecretKey::from(*receiver_secret));
    sbox.decrypt(GenericArray::from_slice(nonce), ciphertext).map_err(|_| BoxError::Open)
}
