use super::CodecError;
use crate::{
    types::{Bytes, DataType, ParamType, Uint256, Value},
    utils::{read_exact, read_len, write_len_prefixed, write_null},
};
use uuid::Uuid;

/// Encodes a value for its declared type into a fresh buffer.
pub fn encode_value(value: &Value, declared: &DataType) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    encode_value_into(&mut out, value, declared)?;
    Ok(out)
}

/// Encodes a value for its declared type, appending to `out`.
///
/// Scalars become `len(4 LE) || bytes`; arrays become `count(4 LE)`
/// followed by each element in scalar form; null is the `-1` sentinel in
/// either position.
pub fn encode_value_into(
    out: &mut Vec<u8>,
    value: &Value,
    declared: &DataType,
) -> Result<(), CodecError> {
    if declared.is_array {
        let elements = match value {
            Value::Null => {
                write_null(out);
                return Ok(());
            }
            Value::Array(elements) => elements,
            _ => return Err(CodecError::ExpectedArray),
        };
        out.extend_from_slice(&(elements.len() as i32).to_le_bytes());
        for element in elements {
            encode_scalar(out, element, &declared.param)?;
        }
        Ok(())
    } else {
        encode_scalar(out, value, &declared.param)
    }
}

fn encode_scalar(out: &mut Vec<u8>, value: &Value, param: &ParamType) -> Result<(), CodecError> {
    match (value, param) {
        (Value::Null, _) => {
            write_null(out);
            Ok(())
        }
        (Value::Array(_), _) => Err(CodecError::UnexpectedArray),
        (Value::Text(s), ParamType::Text { max_len }) => {
            if let Some(max_len) = max_len {
                if s.len() > *max_len as usize {
                    return Err(CodecError::TextTooLong { len: s.len(), max_len: *max_len });
                }
            }
            write_len_prefixed(out, s.as_bytes());
            Ok(())
        }
        (Value::Int(i), ParamType::Int { .. }) => {
            write_len_prefixed(out, &i.to_le_bytes());
            Ok(())
        }
        (Value::Bool(b), ParamType::Bool) => {
            write_len_prefixed(out, &[*b as u8]);
            Ok(())
        }
        (Value::Bytea(b), ParamType::Bytea) => {
            write_len_prefixed(out, b);
            Ok(())
        }
        (Value::Uuid(u), ParamType::Uuid) => {
            write_len_prefixed(out, u.as_bytes());
            Ok(())
        }
        (Value::Numeric(n), ParamType::Numeric { .. }) => {
            write_len_prefixed(out, n.as_bytes());
            Ok(())
        }
        (Value::Uint256(u), ParamType::Uint256) => {
            write_len_prefixed(out, &u.to_be_bytes());
            Ok(())
        }
        _ => Err(CodecError::TypeMismatch { expected: param.type_name() }),
    }
}

/// Decodes a value of the declared type at `pos`, advancing it.
///
/// Fixed-width scalars are checked against their exact width; a negative
/// length other than the `-1` null sentinel is rejected.
pub fn decode_value(data: &[u8], pos: &mut usize, declared: &DataType) -> Result<Value, CodecError> {
    if declared.is_array {
        let count = match read_len(data, pos)? {
            None => return Ok(Value::Null),
            Some(count) => count,
        };
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            elements.push(decode_scalar(data, pos, &declared.param)?);
        }
        Ok(Value::Array(elements))
    } else {
        decode_scalar(data, pos, &declared.param)
    }
}

fn decode_scalar(data: &[u8], pos: &mut usize, param: &ParamType) -> Result<Value, CodecError> {
    let len = match read_len(data, pos)? {
        None => return Ok(Value::Null),
        Some(len) => len,
    };
    let raw = read_exact(data, pos, len)?;
    match param {
        ParamType::Text { max_len } => {
            if let Some(max_len) = max_len {
                if raw.len() > *max_len as usize {
                    return Err(CodecError::TextTooLong { len: raw.len(), max_len: *max_len });
                }
            }
            let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(Value::Text(s.to_owned()))
        }
        ParamType::Int { .. } => {
            let raw: [u8; 8] = fixed(raw)?;
            Ok(Value::Int(i64::from_le_bytes(raw)))
        }
        ParamType::Bool => {
            let raw: [u8; 1] = fixed(raw)?;
            Ok(Value::Bool(raw[0] != 0))
        }
        ParamType::Bytea => Ok(Value::Bytea(Bytes::from(raw.to_vec()))),
        ParamType::Uuid => {
            let raw: [u8; 16] = fixed(raw)?;
            Ok(Value::Uuid(Uuid::from_bytes(raw)))
        }
        ParamType::Numeric { .. } => {
            let s = std::str::from_utf8(raw).map_err(|_| CodecError::InvalidUtf8)?;
            Ok(Value::Numeric(s.to_owned()))
        }
        ParamType::Uint256 => {
            let raw: [u8; 32] = fixed(raw)?;
            Ok(Value::Uint256(Uint256::from_be_bytes(raw)))
        }
    }
}

fn fixed<const N: usize>(raw: &[u8]) -> Result<[u8; N], CodecError> {
    <[u8; N]>::try_from(raw).map_err(|_| CodecError::BadWidth { expected: N, got: raw.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: Value, declared: &DataType) {
        let encoded = encode_value(&value, declared).unwrap();
        let mut pos = 0;
        let decoded = decode_value(&encoded, &mut pos, declared).unwrap();
        assert_eq!(pos, encoded.len(), "trailing bytes for {value:?}");
        assert_eq!(decoded, value);
    }

    #[test]
    fn scalars_round_trip() {
        round_trip(Value::Text("héllo".into()), &DataType::TEXT);
        round_trip(Value::Text(String::new()), &DataType::TEXT);
        round_trip(Value::Int(-42), &DataType::INT);
        round_trip(Value::Bool(true), &DataType::BOOL);
        round_trip(Value::Bytea(Bytes::new()), &DataType::BYTEA);
        round_trip(Value::Bytea(Bytes::from(vec![0, 1, 2])), &DataType::BYTEA);
        round_trip(
            Value::Uuid("550e8400-e29b-41d4-a716-446655440000".parse().unwrap()),
            &DataType::UUID,
        );
        round_trip(Value::Uint256(Uint256::from(7u64)), &DataType::UINT256);
        round_trip(
            Value::Numeric("123.45".into()),
            &DataType::scalar(ParamType::Numeric { precision: 5, scale: 2 }),
        );
        round_trip(Value::Null, &DataType::TEXT);
        round_trip(Value::Null, &DataType::UINT256);
    }

    #[test]
    fn arrays_round_trip() {
        round_trip(
            Value::Array(vec![Value::Text("a".into()), Value::Null, Value::Text("b".into())]),
            &DataType::TEXT_ARRAY,
        );
        // empty array is a valid value, distinct from null
        round_trip(Value::Array(vec![]), &DataType::TEXT_ARRAY);
        round_trip(Value::Null, &DataType::TEXT_ARRAY);
    }

    #[test]
    fn empty_array_and_null_differ_on_the_wire() {
        let empty = encode_value(&Value::Array(vec![]), &DataType::TEXT_ARRAY).unwrap();
        let null = encode_value(&Value::Null, &DataType::TEXT_ARRAY).unwrap();
        assert_eq!(empty, [0, 0, 0, 0]);
        assert_eq!(null, [0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn text_layout_is_utf8_length_prefixed() {
        let encoded = encode_value(&Value::Text("é".into()), &DataType::TEXT).unwrap();
        assert_eq!(encoded, [2, 0, 0, 0, 0xc3, 0xa9]);
    }

    #[test]
    fn fixed_widths() {
        let uuid: Uuid = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        let encoded = encode_value(&Value::Uuid(uuid), &DataType::UUID).unwrap();
        assert_eq!(encoded.len(), 4 + 16);
        let encoded = encode_value(&Value::Uint256(Uint256::ZERO), &DataType::UINT256).unwrap();
        assert_eq!(encoded.len(), 4 + 32);
        let encoded = encode_value(&Value::Int(1), &DataType::INT).unwrap();
        assert_eq!(encoded, [8, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn max_len_enforced() {
        let declared = DataType::scalar(ParamType::Text { max_len: Some(3) });
        assert!(encode_value(&Value::Text("abcd".into()), &declared).is_err());
        assert!(encode_value(&Value::Text("abc".into()), &declared).is_ok());
    }

    #[test]
    fn type_mismatch_rejected() {
        assert!(matches!(
            encode_value(&Value::Int(1), &DataType::TEXT),
            Err(CodecError::TypeMismatch { expected: "text" })
        ));
        assert!(matches!(
            encode_value(&Value::Array(vec![]), &DataType::TEXT),
            Err(CodecError::UnexpectedArray)
        ));
        assert!(matches!(
            encode_value(&Value::Int(1), &DataType::UUID_ARRAY),
            Err(CodecError::ExpectedArray)
        ));
    }

    #[test]
    fn bad_width_rejected_on_decode() {
        // a uuid with only 4 payload bytes
        let bad = [4i32.to_le_bytes().to_vec(), vec![1, 2, 3, 4]].concat();
        let mut pos = 0;
        assert!(matches!(
            decode_value(&bad, &mut pos, &DataType::UUID),
            Err(CodecError::BadWidth { expected: 16, got: 4 })
        ));
    }
}
