use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    ops::Deref,
    str::FromStr,
};
use thiserror::Error;

/// Byte string carried on the wire as standard-alphabet base64 without line
/// breaks. Payloads and signatures use this form.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Base64Bytes(pub Vec<u8>);

impl Base64Bytes {
    /// Base64 encode with the standard alphabet.
    pub fn encode(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Debug for Base64Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Base64Bytes({})", self.encode())
    }
}

impl Display for Base64Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.encode())
    }
}

impl Deref for Base64Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for Base64Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Base64Bytes {
    fn from(src: Vec<u8>) -> Self {
        Self(src)
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(src: &[u8]) -> Self {
        Self(src.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Base64Bytes {
    fn from(src: [u8; N]) -> Self {
        Self(src.to_vec())
    }
}

/// Error thrown when a base64 string fails to decode.
#[derive(Debug, Clone, Error)]
#[error("failed to decode base64: {0}")]
pub struct ParseBase64Error(#[source] base64::DecodeError);

impl FromStr for Base64Bytes {
    type Err = ParseBase64Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        STANDARD.decode(value).map(Self).map_err(ParseBase64Error)
    }
}

impl Serialize for Base64Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Base64Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let b = Base64Bytes::from(b"any carnal pleasure".as_slice());
        let encoded = serde_json::to_string(&b).unwrap();
        assert_eq!(encoded, "\"YW55IGNhcm5hbCBwbGVhc3VyZQ==\"");
        let back: Base64Bytes = serde_json::from_str(&encoded).unwrap();
        assert_eq!(back, b);
    }

    #[test]
    fn rejects_invalid_alphabet() {
        assert!("not base64!!".parse::<Base64Bytes>().is_err());
    }
}
