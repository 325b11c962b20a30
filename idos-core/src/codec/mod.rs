//! Binary wire format for action calls and executions.
//!
//! Every integer is little-endian; every variable-length field is prefixed
//! with its byte length as a 4-byte signed integer, with `-1` as the null
//! sentinel. Arrays are an element count followed by each element in scalar
//! form.

mod payload;
pub use payload::{encode_call_payload, encode_execute_payload, CODEC_VERSION};

mod value;
pub use value::{decode_value, encode_value, encode_value_into};

use crate::utils::ShortInput;
use thiserror::Error;

/// Error thrown while encoding or decoding wire values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("value does not match declared type {expected}")]
    TypeMismatch { expected: &'static str },
    #[error("scalar value where an array was declared")]
    ExpectedArray,
    #[error("array value where a scalar was declared")]
    UnexpectedArray,
    #[error("text length {len} exceeds declared maximum {max_len}")]
    TextTooLong { len: usize, max_len: u32 },
    #[error("fixed-width field has length {got}, expected {expected}")]
    BadWidth { expected: usize, got: usize },
    #[error("invalid utf-8 in text field")]
    InvalidUtf8,
    #[error("invalid uuid bytes")]
    InvalidUuid,
    #[error(transparent)]
    ShortInput(#[from] ShortInput),
    #[error("trailing bytes after value")]
    TrailingBytes,
}
