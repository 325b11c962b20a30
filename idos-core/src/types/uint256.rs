use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use thiserror::Error;

/// A 256-bit unsigned integer stored big-endian, matching both the 32-byte
/// `uint256` wire type and EIP-712 `uint256` fields.
///
/// Arithmetic is intentionally not implemented; the SDK only moves these
/// values between their decimal string form and their 32-byte form.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Uint256(pub [u8; 32]);

/// Error thrown when parsing a decimal string into a [`Uint256`].
#[derive(Debug, Clone, Error)]
pub enum ParseUint256Error {
    #[error("empty decimal string")]
    Empty,
    #[error("invalid decimal digit: {0}")]
    InvalidDigit(char),
    #[error("value does not fit in 256 bits")]
    Overflow,
}

impl Uint256 {
    pub const ZERO: Uint256 = Uint256([0u8; 32]);

    /// The big-endian byte representation.
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a base-10 string.
    pub fn from_dec_str(value: &str) -> Result<Self, ParseUint256Error> {
        if value.is_empty() {
            return Err(ParseUint256Error::Empty);
        }
        let mut out = [0u8; 32];
        for c in value.chars() {
            let digit = c.to_digit(10).ok_or(ParseUint256Error::InvalidDigit(c))? as u16;
            // out = out * 10 + digit, big-endian schoolbook style
            let mut carry = digit;
            for byte in out.iter_mut().rev() {
                let v = (*byte as u16) * 10 + carry;
                *byte = (v & 0xff) as u8;
                carry = v >> 8;
            }
            if carry != 0 {
                return Err(ParseUint256Error::Overflow);
            }
        }
        Ok(Self(out))
    }

    /// Format as a base-10 string.
    pub fn to_dec_string(self) -> String {
        let mut digits = Vec::new();
        let mut work = self.0;
        loop {
            // divide the big-endian buffer by 10, collecting the remainder
            let mut rem: u16 = 0;
            let mut all_zero = true;
            for byte in work.iter_mut() {
                let v = (rem << 8) | *byte as u16;
                *byte = (v / 10) as u8;
                rem = v % 10;
                if *byte != 0 {
                    all_zero = false;
                }
            }
            digits.push(b'0' + rem as u8);
            if all_zero {
                break;
            }
        }
        digits.reverse();
        digits.into_iter().map(char::from).collect()
    }
}

impl From<u64> for Uint256 {
    fn from(value: u64) -> Self {
        let mut out = [0u8; 32];
        out[24..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }
}

impl From<u128> for Uint256 {
    fn from(value: u128) -> Self {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&value.to_be_bytes());
        Self(out)
    }
}

impl AsRef<[u8]> for Uint256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Uint256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "Uint256({})", self.to_dec_string())
    }
}

impl Display for Uint256 {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.to_dec_string())
    }
}

impl FromStr for Uint256 {
    type Err = ParseUint256Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_dec_str(value)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_dec_string())
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}
