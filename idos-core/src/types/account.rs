use super::Bytes;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// The key scheme backing an account identifier.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum KeyType {
    Secp256k1,
    Ed25519,
}

/// An account identifier: the signer's wire-form identifier plus its key
/// scheme. For secp256k1 signers the identifier is the 20-byte address, for
/// ed25519 it is the 32-byte public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountId {
    pub identifier: Bytes,
    pub key_type: KeyType,
}

impl AccountId {
    pub fn new(identifier: impl Into<Bytes>, key_type: KeyType) -> Self {
        Self { identifier: identifier.into(), key_type }
    }
}

/// On-chain account state as returned by the `user.account` method.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Absent for accounts the chain has never seen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AccountId>,
    /// Decimal string balance.
    #[serde(default)]
    pub balance: String,
    /// The per-account transaction counter. The next transaction must carry
    /// `nonce + 1`.
    #[serde(default)]
    pub nonce: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_type_wire_names() {
        assert_eq!(serde_json::to_string(&KeyType::Secp256k1).unwrap(), "\"secp256k1\"");
        assert_eq!(serde_json::to_string(&KeyType::Ed25519).unwrap(), "\"ed25519\"");
        assert_eq!("secp256k1".parse::<KeyType>().unwrap(), KeyType::Secp256k1);
    }

    #[test]
    fn account_deserializes_with_missing_id() {
        let acct: Account = serde_json::from_str(r#"{"balance":"0","nonce":5}"#).unwrap();
        assert_eq!(acct.nonce, 5);
        assert!(acct.id.is_none());
    }
}
