use rand::{distributions::Alphanumeric, rngs::OsRng, Rng, RngCore};
use zeroize::Zeroizing;

/// Fills an `N`-byte array from the OS RNG. Used for nonces, blinding
/// factors and ephemeral keys.
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut out = [0u8; N];
    OsRng.fill_bytes(&mut out);
    out
}

/// Generates an alphanumeric throwaway password, e.g. for enclave material
/// that is never typed by a user.
pub fn random_password(len: usize) -> Zeroizing<String> {
    Zeroizing::new((&mut OsRng).sample_iter(Alphanumeric).take(len).map(char::from).collect())
}
