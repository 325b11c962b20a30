use idos_core::eip712::{Eip712Domain, Eip712Field, TypedData};
use idos_signers::Signer;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::json;
use std::fmt;

/// Domain name fixed by the secret-store contract.
const DOMAIN_NAME: &str = "idOS secret store contract";
const DOMAIN_VERSION: &str = "1";

/// The EIP-712 domain every request is signed under. The verifying
/// contract is the last 20 bytes of the configured contract address.
pub(crate) fn signing_domain(contract_address: &str) -> Eip712Domain {
    let contract = contract_address.strip_prefix("0x").unwrap_or(contract_address);
    let tail = contract.len().saturating_sub(40);
    Eip712Domain {
        name: Some(DOMAIN_NAME.to_owned()),
        version: Some(DOMAIN_VERSION.to_owned()),
        chain_id: None,
        verifying_contract: Some(format!("0x{}", &contract[tail..])),
    }
}

/// A recovery address tagged with the signer scheme that controls it,
/// carried on the wire as `scheme:address`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaggedAddress {
    pub scheme: String,
    pub address: String,
}

impl TaggedAddress {
    pub fn new(scheme: impl Into<String>, address: impl Into<String>) -> Self {
        Self { scheme: scheme.into(), address: address.into() }
    }

    /// The tagged form of a signer's own identity.
    pub fn from_signer<S: Signer>(signer: &S) -> Self {
        Self::new(signer.signature_type().to_string(), format!("0x{}", signer.identifier()))
    }
}

impl fmt::Display for TaggedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.address)
    }
}

impl Serialize for TaggedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TaggedAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        let (scheme, address) = value
            .split_once(':')
            .ok_or_else(|| serde::de::Error::custom("expected scheme:address"))?;
        Ok(Self::new(scheme, address))
    }
}

/// `Upload`: commits to all blinded shares and pins the addresses allowed
/// to recover.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadRequest {
    /// `0x`-prefixed keccak-256 of each blinded share, one per node.
    pub share_commitments: Vec<String>,
    pub recovering_addresses: Vec<TaggedAddress>,
}

impl UploadRequest {
    pub fn to_typed_data(&self, contract_address: &str) -> TypedData {
        TypedData::new(
            "Upload",
            vec![
                Eip712Field::new("share_commitments", "bytes32[]"),
                Eip712Field::new("recovering_addresses", "string[]"),
            ],
            signing_domain(contract_address),
            json!({
                "share_commitments": self.share_commitments,
                "recovering_addresses": tagged_strings(&self.recovering_addresses),
            }),
        )
    }
}

/// `Download`: proves control of a recovery address and supplies the
/// ephemeral key shares are encrypted to.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub recovering_address: TaggedAddress,
    /// Unix millis; lets nodes reject stale replays.
    pub timestamp: u64,
    /// `0x`-prefixed hex of the ephemeral Curve25519 public key.
    pub public_key: String,
}

impl DownloadRequest {
    pub fn to_typed_data(&self, contract_address: &str) -> TypedData {
        TypedData::new(
            "Download",
            vec![
                Eip712Field::new("recovering_address", "string"),
                Eip712Field::new("timestamp", "uint256"),
                Eip712Field::new("public_key", "string"),
            ],
            signing_domain(contract_address),
            json!({
                "recovering_address": self.recovering_address.to_string(),
                "timestamp": self.timestamp,
                "public_key": self.public_key,
            }),
        )
    }
}

/// `AddAddress`: grants an additional address recovery rights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AddAddressRequest {
    pub address: TaggedAddress,
    pub timestamp: u64,
}

impl AddAddressRequest {
    pub fn to_typed_data(&self, contract_address: &str) -> TypedData {
        TypedData::new(
            "AddAddress",
            vec![
                Eip712Field::new("address", "string"),
                Eip712Field::new("timestamp", "uint256"),
            ],
            signing_domain(contract_address),
            json!({
                "address": self.address.to_string(),
                "timestamp": self.timestamp,
            }),
        )
    }
}

/// `RemoveAddress`: revokes an address's recovery rights.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoveAddressRequest {
    pub address: TaggedAddress,
    pub timestamp: u64,
}

impl RemoveAddressRequest {
    pub fn to_typed_data(&self, contract_address: &str) -> TypedData {
        TypedData::new(
            "RemoveAddress",
            vec![
                Eip712Field::new("address", "string"),
                Eip712Field::new("timestamp", "uint256"),
            ],
            signing_domain(contract_address),
            json!({
                "address": self.address.to_string(),
                "timestamp": self.timestamp,
            }),
        )
    }
}

/// `UpdateWallets`: replaces the recovery address set wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateWalletsRequest {
    pub recovering_addresses: Vec<TaggedAddress>,
    pub timestamp: u64,
}

impl UpdateWalletsRequest {
    pub fn to_typed_data(&self, contract_address: &str) -> TypedData {
        TypedData::new(
            "UpdateWallets",
            vec![
                Eip712Field::new("recovering_addresses", "string[]"),
                Eip712Field::new("timestamp", "uint256"),
            ],
            signing_domain(contract_address),
            json!({
                "recovering_addresses": tagged_strings(&self.recovering_addresses),
                "timestamp": self.timestamp,
            }),
        )
    }
}

fn tagged_strings(addresses: &[TaggedAddress]) -> Vec<String> {
    addresses.iter().map(ToString::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x00112233445566778899aabbccddeeff0011223344";

    #[test]
    fn domain_uses_contract_tail() {
        let domain = signing_domain(CONTRACT);
        assert_eq!(domain.name.as_deref(), Some(DOMAIN_NAME));
        assert_eq!(domain.version.as_deref(), Some(DOMAIN_VERSION));
        // the configured address is 21 bytes; the domain keeps the last 20
        assert_eq!(
            domain.verifying_contract.as_deref(),
            Some("0x112233445566778899aabbccddeeff0011223344")
        );
    }

    #[test]
    fn tagged_address_wire_form() {
        let address = TaggedAddress::new("secp256k1_ep", "0xabc");
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"secp256k1_ep:0xabc\"");
        let back: TaggedAddress = serde_json::from_str("\"secp256k1_ep:0xabc\"").unwrap();
        assert_eq!(back, address);
    }

    #[test]
    fn upload_typed_data_hashes() {
        let request = UploadRequest {
            share_commitments: vec![format!("0x{}", hex::encode([0x11u8; 32]))],
            recovering_addresses: vec![TaggedAddress::new("secp256k1_ep", "0xabc")],
        };
        let typed = request.to_typed_data(CONTRACT);
        assert!(typed.types.contains_key("EIP712Domain"));
        assert_eq!(typed.primary_type, "Upload");
        typed.digest().unwrap();
    }

    #[test]
    fn download_typed_data_hashes() {
        let request = DownloadRequest {
            recovering_address: TaggedAddress::new("ed25519", "0xdef"),
            timestamp: 1_700_000_000_000,
            public_key: format!("0x{}", hex::encode([0x22u8; 32])),
        };
        request.to_typed_data(CONTRACT).digest().unwrap();
    }
}
