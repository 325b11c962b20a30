//! Cryptographic primitives composed by the SDK.
//!
//! Nothing here is novel: scrypt key derivation, NaCl box
//! (Curve25519 + XSalsa20-Poly1305), secp256k1 EIP-191 personal sign and
//! OS-backed randomness, with the parameter choices the network fixes.

mod ecdsa;
pub use ecdsa::{
    recover_address, secret_key_to_address, sign_message_recoverable, verify_message,
    EcdsaError, SIGNATURE_LEN,
};

mod nacl;
pub use nacl::{
    generate_box_keypair, open, public_key_from_secret, seal, BoxError, BOX_NONCE_LEN,
    BOX_SECRET_LEN,
};

mod random;
pub use random::{random_bytes, random_password};

mod scrypt;
pub use self::scrypt::{derive_enclave_secret, KeyDerivationError, ENCLAVE_SECRET_LEN};
