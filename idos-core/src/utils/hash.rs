use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

/// Prefix of an EIP-191 personal-sign message.
pub const EIP191_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hash a message according to EIP-191.
///
/// The data is enveloped as `"\x19Ethereum Signed Message:\n" +
/// message.length + message` and hashed with keccak256.
pub fn hash_message<S>(message: S) -> [u8; 32]
where
    S: AsRef<[u8]>,
{
    let message = message.as_ref();

    let mut eth_message = format!("{EIP191_PREFIX}{}", message.len()).into_bytes();
    eth_message.extend_from_slice(message);

    keccak256(&eth_message)
}

/// Compute the Keccak-256 hash of input bytes.
pub fn keccak256<S>(bytes: S) -> [u8; 32]
where
    S: AsRef<[u8]>,
{
    let mut output = [0u8; 32];
    let mut hasher = Keccak::v256();
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);
    output
}

/// Compute the SHA-256 hash of input bytes. Transaction payload digests use
/// the first 20 bytes of this.
pub fn sha256<S>(bytes: S) -> [u8; 32]
where
    S: AsRef<[u8]>,
{
    let mut hasher = Sha256::new();
    hasher.update(bytes.as_ref());
    hasher.finalize().into()
}
