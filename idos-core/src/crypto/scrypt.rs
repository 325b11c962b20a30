use scrypt::{
    errors::{InvalidOutputLen, InvalidParams},
    Params,
};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Length of a derived enclave secret key.
pub const ENCLAVE_SECRET_LEN: usize = 32;

// scrypt cost parameters fixed by the network: N = 16384, r = 8, p = 1.
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;

/// Error thrown while deriving an enclave secret.
#[derive(Debug, Error)]
pub enum KeyDerivationError {
    /// The salt must be a canonical UUID (the user id).
    #[error("user id is not a valid uuid: {0}")]
    InvalidSalt(#[from] uuid::Error),
    #[error("invalid scrypt parameters: {0}")]
    Params(#[from] InvalidParams),
    #[error("invalid scrypt output length: {0}")]
    OutputLen(#[from] InvalidOutputLen),
}

/// Derives the user's 32-byte enclave secret from a password and user id.
///
/// The password is NFKC-normalized before hashing so that visually
/// identical inputs produce the same key across platforms. The salt is the
/// UTF-8 of the user id's canonical (lowercase hyphenated) UUID form.
///
/// This is CPU-bound; async callers dispatch it to a blocking worker.
pub fn derive_enclave_secret(
    password: &str,
    user_id: &str,
) -> Result<Zeroizing<[u8; ENCLAVE_SECRET_LEN]>, KeyDerivationError> {
    let salt = Uuid::parse_str(user_id)?.hyphenated().to_string();
    let normalized = Zeroizing::new(password.nfkc().collect::<String>());

    let params = Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, ENCLAVE_SECRET_LEN)?;
    let mut secret = Zeroizing::new([0u8; ENCLAVE_SECRET_LEN]);
    scrypt::scrypt(normalized.as_bytes(), salt.as_bytes(), &params, secret.as_mut())?;
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_ID: &str = "550e8400-e29b-41d4-a716-446655440000";

    #[test]
    fn rejects_non_uuid_salt() {
        assert!(matches!(
            derive_enclave_secret("pw", "not-a-uuid"),
            Err(KeyDerivationError::InvalidSalt(_))
        ));
    }

    #[test]
    fn deterministic_per_user() {
        let a = derive_enclave_secret("correct horse battery staple", USER_ID).unwrap();
        let b = derive_enclave_secret("correct horse battery staple", USER_ID).unwrap();
        assert_eq!(*a, *b);

        let other = derive_enclave_secret(
            "correct horse battery staple",
            "650e8400-e29b-41d4-a716-446655440000",
        )
        .unwrap();
        assert_ne!(*a, *other);
    }

    #[test]
    fn uppercase_uuid_is_same_salt() {
        let lower = derive_enclave_secret("pw", USER_ID).unwrap();
        let upper = derive_enclave_secret("pw", &USER_ID.to_uppercase()).unwrap();
        assert_eq!(*lower, *upper);
    }

    #[test]
    fn password_length_extremes() {
        let empty = derive_enclave_secret("", USER_ID).unwrap();
        let long = derive_enclave_secret(&"x".repeat(4096), USER_ID).unwrap();
        assert_ne!(*empty, *long);
        assert_eq!(empty.len(), ENCLAVE_SECRET_LEN);
    }

    #[test]
    fn nfkc_equivalent_passwords_agree() {
        // U+FB01 LATIN SMALL LIGATURE FI normalizes to "fi" under NFKC
        let ligature = derive_enclave_secret("\u{fb01}sh", USER_ID).unwrap();
        let plain = derive_enclave_secret("fish", USER_ID).unwrap();
        assert_eq!(*ligature, *plain);
    }

    #[test]
    // RFC 7914 section 12, the N=16384/r=8/p=1 vector
    fn scrypt_parameters_match_reference() {
        let params = Params::new(14, 8, 1, 64).unwrap();
        let mut out = [0u8; 64];
        scrypt::scrypt(b"pleaseletmein", b"SodiumChloride", &params, &mut out).unwrap();
        assert_eq!(
            hex::encode(out),
            "7023bdcb3afd7348461c06cd81fd38ebfda8fbba904f8e3ea9b543f6545da1f2\
             d5432955613f0fcf62d49705242a9af9e61e85dc0d651e40dfcf017b45575887"
        );
    }
}
