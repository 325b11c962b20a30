//! Typed records for the catalog's inputs and outputs.
//!
//! Output records deserialize straight from query-result rows; input
//! records serialize into the projection the executor feeds the codec.
//! Field names match the network's column names, so everything is plain
//! serde.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Hex of the enclave public key credentials are encrypted to.
    pub recipient_encryption_public_key: String,
}

/// A wallet row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: String,
    #[serde(default)]
    pub wallet_type: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
}

/// Input of `wallets.add`. The message/signature pair proves control of
/// the address being attached.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddWallet {
    pub id: Uuid,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

/// A credential row. `content` is the sealed payload (base64 of
/// `nonce || ciphertext`), opened through the enclave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub issuer_auth_public_key: String,
    #[serde(default)]
    pub encryptor_public_key: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub public_notes: String,
}

/// Input of `credentials.add` / `credentials.edit`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddCredential {
    pub id: Uuid,
    pub issuer_auth_public_key: String,
    pub encryptor_public_key: String,
    pub content: String,
    #[serde(default)]
    pub public_notes: String,
}

/// Input of `credentials.edit`.
pub type EditCredential = AddCredential;

/// Input of `credentials.share`: a re-encrypted copy for a grantee.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareCredential {
    pub id: Uuid,
    pub original_credential_id: Uuid,
    pub grantee_wallet_identifier: String,
    #[serde(default)]
    pub locked_until: i64,
    pub content: String,
    pub encryptor_public_key: String,
}

/// An access-grant row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub id: Uuid,
    pub ag_owner_user_id: Uuid,
    pub ag_grantee_wallet_identifier: String,
    pub data_id: Uuid,
    #[serde(default)]
    pub locked_until: i64,
    #[serde(default)]
    pub content_hash: Option<String>,
}

/// Input of `access_grants.create`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateAccessGrant {
    pub data_id: Uuid,
    pub grantee_wallet_identifier: String,
    #[serde(default)]
    pub locked_until: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
}

/// An attribute row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: Uuid,
    pub user_id: Uuid,
    pub attribute_key: String,
    #[serde(default)]
    pub value: String,
}

/// Input of `attributes.add` / `attributes.edit`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AddAttribute {
    pub id: Uuid,
    pub attribute_key: String,
    pub value: String,
}

/// Input of `attributes.edit`.
pub type EditAttribute = AddAttribute;

/// Input of `attributes.share`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareAttribute {
    pub id: Uuid,
    pub original_attribute_id: Uuid,
    pub grantee_wallet_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn credential_row_deserializes() {
        let row = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "user_id": "650e8400-e29b-41d4-a716-446655440000",
            "issuer_auth_public_key": "aa",
            "encryptor_public_key": "bb",
            "content": "bm9uY2UuLi4=",
            "public_notes": "{\"type\":\"passport\"}",
        });
        let credential: Credential = serde_json::from_value(row).unwrap();
        assert_eq!(credential.public_notes, "{\"type\":\"passport\"}");
    }

    #[test]
    fn add_wallet_serializes_declared_fields() {
        let input = AddWallet {
            id: "550e8400-e29b-41d4-a716-446655440000".parse().unwrap(),
            address: "0xabc".into(),
            wallet_type: Some("EVM".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["address"], "0xabc");
        assert!(json.get("message").is_none());
    }
}
