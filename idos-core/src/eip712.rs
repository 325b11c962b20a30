//! Dynamic EIP-712 typed-data hashing.
//!
//! The distributed-recovery protocol signs every request as an EIP-712
//! structure, with the types map carried alongside so wallet signers can
//! re-derive the digest. This module hashes a [`TypedData`] without any
//! derive machinery; only the field types the protocol uses are supported.

use crate::{types::Uint256, utils::keccak256};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use thiserror::Error;

/// A single field of a typed-data struct definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Field {
    pub name: String,
    #[serde(rename = "type")]
    pub r#type: String,
}

impl Eip712Field {
    pub fn new(name: impl Into<String>, r#type: impl Into<String>) -> Self {
        Self { name: name.into(), r#type: r#type.into() }
    }
}

/// EIP-712 domain attributes. Only the populated fields participate in the
/// domain separator, in the canonical order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "chainId", default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Uint256>,
    #[serde(rename = "verifyingContract", default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,
}

impl Eip712Domain {
    /// The field list this domain contributes to the types map.
    pub fn type_fields(&self) -> Vec<Eip712Field> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push(Eip712Field::new("name", "string"));
        }
        if self.version.is_some() {
            fields.push(Eip712Field::new("version", "string"));
        }
        if self.chain_id.is_some() {
            fields.push(Eip712Field::new("chainId", "uint256"));
        }
        if self.verifying_contract.is_some() {
            fields.push(Eip712Field::new("verifyingContract", "address"));
        }
        fields
    }

    fn as_message(&self) -> Json {
        crate::utils::serialize(self)
    }
}

/// A complete EIP-712 signing request: types, primary type, domain and
/// message. Serializes to the JSON shape wallets expect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedData {
    pub types: BTreeMap<String, Vec<Eip712Field>>,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub domain: Eip712Domain,
    pub message: Json,
}

/// Error thrown while hashing typed data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Eip712Error {
    #[error("type {0} is not in the types map")]
    MissingType(String),
    #[error("message field {0} is missing")]
    MissingField(String),
    #[error("field {field}: expected a {expected} value")]
    InvalidValue { field: String, expected: &'static str },
    #[error("unsupported field type {0}")]
    UnsupportedType(String),
}

impl TypedData {
    /// Builds a request and inserts the `EIP712Domain` entry into the types
    /// map, which wallet signers require.
    pub fn new(
        primary_type: impl Into<String>,
        fields: Vec<Eip712Field>,
        domain: Eip712Domain,
        message: Json,
    ) -> Self {
        let primary_type = primary_type.into();
        let mut types = BTreeMap::new();
        types.insert("EIP712Domain".to_owned(), domain.type_fields());
        types.insert(primary_type.clone(), fields);
        Self { types, primary_type, domain, message }
    }

    /// The 32-byte digest to sign: `keccak256(0x1901 || domainSeparator ||
    /// hashStruct(message))`.
    pub fn digest(&self) -> Result<[u8; 32], Eip712Error> {
        let domain_separator = self.domain_separator()?;
        let message_hash = self.struct_hash(&self.primary_type, &self.message)?;

        let mut preimage = Vec::with_capacity(2 + 32 + 32);
        preimage.extend_from_slice(&[0x19, 0x01]);
        preimage.extend_from_slice(&domain_separator);
        preimage.extend_from_slice(&message_hash);
        Ok(keccak256(&preimage))
    }

    /// `hashStruct(EIP712Domain)` over the populated domain fields.
    pub fn domain_separator(&self) -> Result<[u8; 32], Eip712Error> {
        let mut types = self.types.clone();
        types.insert("EIP712Domain".to_owned(), self.domain.type_fields());
        hash_struct(&types, "EIP712Domain", &self.domain.as_message())
    }

    fn struct_hash(&self, type_name: &str, value: &Json) -> Result<[u8; 32], Eip712Error> {
        hash_struct(&self.types, type_name, value)
    }
}

/// `typeHash` of `type_name`: the keccak of its encoded type string, with
/// referenced struct types appended in alphabetical order.
fn type_hash(
    types: &BTreeMap<String, Vec<Eip712Field>>,
    type_name: &str,
) -> Result<[u8; 32], Eip712Error> {
    let mut referenced = BTreeMap::new();
    collect_referenced(types, type_name, &mut referenced)?;
    referenced.remove(type_name);

    let mut encoded = encode_single_type(types, type_name)?;
    for name in referenced.keys() {
        encoded.push_str(&encode_single_type(types, name)?);
    }
    Ok(keccak256(encoded.as_bytes()))
}

fn encode_single_type(
    types: &BTreeMap<String, Vec<Eip712Field>>,
    type_name: &str,
) -> Result<String, Eip712Error> {
    let fields = types.get(type_name).ok_or_else(|| Eip712Error::MissingType(type_name.into()))?;
    let params =
        fields.iter().map(|f| format!("{} {}", f.r#type, f.name)).collect::<Vec<_>>().join(",");
    Ok(format!("{type_name}({params})"))
}

fn collect_referenced(
    types: &BTreeMap<String, Vec<Eip712Field>>,
    type_name: &str,
    seen: &mut BTreeMap<String, ()>,
) -> Result<(), Eip712Error> {
    if seen.insert(type_name.to_owned(), ()).is_some() {
        return Ok(());
    }
    let fields = types.get(type_name).ok_or_else(|| Eip712Error::MissingType(type_name.into()))?;
    for field in fields {
        let base = field.r#type.trim_end_matches("[]");
        if types.contains_key(base) && base != "EIP712Domain" {
            collect_referenced(types, base, seen)?;
        }
    }
    Ok(())
}

fn hash_struct(
    types: &BTreeMap<String, Vec<Eip712Field>>,
    type_name: &str,
    value: &Json,
) -> Result<[u8; 32], Eip712Error> {
    let fields = types.get(type_name).ok_or_else(|| Eip712Error::MissingType(type_name.into()))?;
    let object = value
        .as_object()
        .ok_or_else(|| Eip712Error::InvalidValue { field: type_name.into(), expected: "object" })?;

    let mut encoded = Vec::with_capacity(32 * (1 + fields.len()));
    encoded.extend_from_slice(&type_hash(types, type_name)?);
    for field in fields {
        let field_value =
            object.get(&field.name).ok_or_else(|| Eip712Error::MissingField(field.name.clone()))?;
        encoded.extend_from_slice(&encode_field(types, &field.name, &field.r#type, field_value)?);
    }
    Ok(keccak256(&encoded))
}

fn encode_field(
    types: &BTreeMap<String, Vec<Eip712Field>>,
    field: &str,
    r#type: &str,
    value: &Json,
) -> Result<[u8; 32], Eip712Error> {
    if let Some(element_type) = r#type.strip_suffix("[]") {
        let elements = value
            .as_array()
            .ok_or_else(|| Eip712Error::InvalidValue { field: field.into(), expected: "array" })?;
        let mut encoded = Vec::with_capacity(32 * elements.len());
        for element in elements {
            encoded.extend_from_slice(&encode_field(types, field, element_type, element)?);
        }
        return Ok(keccak256(&encoded));
    }

    if types.contains_key(r#type) && r#type != "EIP712Domain" {
        return hash_struct(types, r#type, value);
    }

    match r#type {
        "string" => {
            let s = value.as_str().ok_or_else(|| Eip712Error::InvalidValue {
                field: field.into(),
                expected: "string",
            })?;
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => Ok(keccak256(hex_value(field, value)?)),
        "bytes32" => {
            let raw = hex_value(field, value)?;
            <[u8; 32]>::try_from(raw.as_slice())
                .map_err(|_| Eip712Error::InvalidValue { field: field.into(), expected: "bytes32" })
        }
        "address" => {
            let raw = hex_value(field, value)?;
            let address = <[u8; 20]>::try_from(raw.as_slice()).map_err(|_| {
                Eip712Error::InvalidValue { field: field.into(), expected: "address" }
            })?;
            let mut out = [0u8; 32];
            out[12..].copy_from_slice(&address);
            Ok(out)
        }
        "bool" => {
            let b = value.as_bool().ok_or_else(|| Eip712Error::InvalidValue {
                field: field.into(),
                expected: "bool",
            })?;
            let mut out = [0u8; 32];
            out[31] = b as u8;
            Ok(out)
        }
        t if t.starts_with("uint") => {
            let parsed = match value {
                Json::Number(n) => n.as_u64().map(Uint256::from),
                Json::String(s) => Uint256::from_dec_str(s).ok(),
                _ => None,
            };
            let parsed = parsed.ok_or_else(|| Eip712Error::InvalidValue {
                field: field.into(),
                expected: "unsigned integer",
            })?;
            Ok(parsed.to_be_bytes())
        }
        other => Err(Eip712Error::UnsupportedType(other.to_owned())),
    }
}

fn hex_value(field: &str, value: &Json) -> Result<Vec<u8>, Eip712Error> {
    let s = value
        .as_str()
        .ok_or_else(|| Eip712Error::InvalidValue { field: field.into(), expected: "hex string" })?;
    hex::decode(s.strip_prefix("0x").unwrap_or(s))
        .map_err(|_| Eip712Error::InvalidValue { field: field.into(), expected: "hex string" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // the canonical example from the EIP-712 reference implementation
    fn mail_typed_data() -> TypedData {
        let mut types = BTreeMap::new();
        types.insert(
            "EIP712Domain".to_owned(),
            vec![
                Eip712Field::new("name", "string"),
                Eip712Field::new("version", "string"),
                Eip712Field::new("chainId", "uint256"),
                Eip712Field::new("verifyingContract", "address"),
            ],
        );
        types.insert(
            "Person".to_owned(),
            vec![Eip712Field::new("name", "string"), Eip712Field::new("wallet", "address")],
        );
        types.insert(
            "Mail".to_owned(),
            vec![
                Eip712Field::new("from", "Person"),
                Eip712Field::new("to", "Person"),
                Eip712Field::new("contents", "string"),
            ],
        );
        TypedData {
            types,
            primary_type: "Mail".to_owned(),
            domain: Eip712Domain {
                name: Some("Ether Mail".to_owned()),
                version: Some("1".to_owned()),
                chain_id: Some(Uint256::from(1u64)),
                verifying_contract: Some(
                    "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC".to_owned(),
                ),
            },
            message: json!({
                "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
                "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
                "contents": "Hello, Bob!",
            }),
        }
    }

    #[test]
    fn reference_mail_digest() {
        let typed = mail_typed_data();
        assert_eq!(
            hex::encode(typed.domain_separator().unwrap()),
            "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
        );
        assert_eq!(
            hex::encode(typed.digest().unwrap()),
            "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
        );
    }

    #[test]
    fn domain_with_absent_fields_hashes_over_present_only() {
        let domain = Eip712Domain {
            name: Some("idOS secret store contract".to_owned()),
            version: Some("1".to_owned()),
            chain_id: None,
            verifying_contract: Some(format!("0x{}", hex::encode([0x22u8; 20]))),
        };
        assert_eq!(
            domain.type_fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            ["name", "version", "verifyingContract"]
        );
        let typed = TypedData::new(
            "Ping",
            vec![Eip712Field::new("value", "string")],
            domain,
            json!({"value": "x"}),
        );
        typed.digest().unwrap();
    }

    #[test]
    fn string_arrays_hash_elementwise() {
        let typed = TypedData::new(
            "Wallets",
            vec![Eip712Field::new("addresses", "string[]")],
            Eip712Domain::default(),
            json!({"addresses": ["a", "b"]}),
        );
        let digest = typed.digest().unwrap();

        let reordered = TypedData::new(
            "Wallets",
            vec![Eip712Field::new("addresses", "string[]")],
            Eip712Domain::default(),
            json!({"addresses": ["b", "a"]}),
        );
        assert_ne!(digest, reordered.digest().unwrap());
    }

    #[test]
    fn missing_message_field_is_an_error() {
        let typed = TypedData::new(
            "Ping",
            vec![Eip712Field::new("value", "string")],
            Eip712Domain::default(),
            json!({}),
        );
        assert!(matches!(typed.digest(), Err(Eip712Error::MissingField(_))));
    }

    #[test]
    fn types_map_always_carries_the_domain_entry() {
        let typed = TypedData::new("Ping", vec![], Eip712Domain::default(), json!({}));
        assert!(typed.types.contains_key("EIP712Domain"));
        let json = serde_json::to_value(&typed).unwrap();
        assert!(json["types"].get("EIP712Domain").is_some());
        assert_eq!(json["primaryType"], "Ping");
    }
}
