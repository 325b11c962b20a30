use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The closed set of signature schemes the network accepts.
///
/// `Invalid` is the scheme of unauthenticated messages (public view calls
/// carry it together with an absent sender).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
pub enum SignatureType {
    /// secp256k1 EIP-191 personal sign.
    #[serde(rename = "secp256k1_ep")]
    #[strum(serialize = "secp256k1_ep")]
    Secp256k1Personal,
    /// secp256k1 over an EIP-712 typed-data structure.
    #[serde(rename = "eth_personal_sign_eip712")]
    #[strum(serialize = "eth_personal_sign_eip712")]
    Eip712,
    /// Plain Ed25519.
    #[serde(rename = "ed25519")]
    #[strum(serialize = "ed25519")]
    Ed25519,
    /// No signature.
    #[serde(rename = "invalid")]
    #[strum(serialize = "invalid")]
    Invalid,
}

impl Default for SignatureType {
    fn default() -> Self {
        SignatureType::Invalid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names() {
        assert_eq!(
            serde_json::to_string(&SignatureType::Secp256k1Personal).unwrap(),
            "\"secp256k1_ep\""
        );
        assert_eq!(
            serde_json::to_string(&SignatureType::Eip712).unwrap(),
            "\"eth_personal_sign_eip712\""
        );
        assert_eq!(serde_json::to_string(&SignatureType::Invalid).unwrap(), "\"invalid\"");
        assert_eq!(
            "secp256k1_ep".parse::<SignatureType>().unwrap(),
            SignatureType::Secp256k1Personal
        );
    }
}
