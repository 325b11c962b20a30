//! Byte-level helpers shared by the codecs and signers.

mod hash;
pub use hash::{hash_message, keccak256, sha256, EIP191_PREFIX};

/// Appends `data` to `out`, prefixed with its byte length as a 4-byte
/// little-endian signed integer. Every length on the wire uses this form.
pub fn write_len_prefixed(out: &mut Vec<u8>, data: &[u8]) {
    out.extend_from_slice(&(data.len() as i32).to_le_bytes());
    out.extend_from_slice(data);
}

/// Appends the null sentinel: length `-1`, no payload.
pub fn write_null(out: &mut Vec<u8>) {
    out.extend_from_slice(&(-1i32).to_le_bytes());
}

/// UTF-8 byte count of a string, as carried in text length prefixes.
pub fn utf8_len(s: &str) -> u32 {
    s.len() as u32
}

/// Reads a 4-byte little-endian signed length at `pos`, advancing it.
/// Returns `None` for the null sentinel and an error for truncated input or
/// any other negative length.
pub fn read_len(data: &[u8], pos: &mut usize) -> Result<Option<usize>, ShortInput> {
    let end = pos.checked_add(4).filter(|&end| end <= data.len()).ok_or(ShortInput)?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&data[*pos..end]);
    *pos = end;
    match i32::from_le_bytes(raw) {
        -1 => Ok(None),
        len if len >= 0 => Ok(Some(len as usize)),
        _ => Err(ShortInput),
    }
}

/// Reads `len` raw bytes at `pos`, advancing it.
pub fn read_exact<'a>(data: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8], ShortInput> {
    let end = pos.checked_add(len).filter(|&end| end <= data.len()).ok_or(ShortInput)?;
    let out = &data[*pos..end];
    *pos = end;
    Ok(out)
}

/// Ran out of input while decoding a framed byte string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unexpected end of input")]
pub struct ShortInput;

/// Serialize a type into a JSON value.
///
/// # Panics
///
/// If the type returns an error during serialization.
pub fn serialize<T: serde::Serialize>(t: &T) -> serde_json::Value {
    serde_json::to_value(t).expect("types never fail to serialize")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_prefix_round_trip() {
        let mut buf = Vec::new();
        write_len_prefixed(&mut buf, b"idos");
        assert_eq!(buf, [4, 0, 0, 0, b'i', b'd', b'o', b's']);

        let mut pos = 0;
        let len = read_len(&buf, &mut pos).unwrap().unwrap();
        assert_eq!(read_exact(&buf, &mut pos, len).unwrap(), b"idos");
        assert_eq!(pos, buf.len());
    }

    #[test]
    fn null_sentinel() {
        let mut buf = Vec::new();
        write_null(&mut buf);
        assert_eq!(buf, [0xff, 0xff, 0xff, 0xff]);
        let mut pos = 0;
        assert_eq!(read_len(&buf, &mut pos).unwrap(), None);
    }

    #[test]
    fn other_negative_lengths_rejected() {
        let buf = (-2i32).to_le_bytes();
        let mut pos = 0;
        assert!(read_len(&buf, &mut pos).is_err());
    }

    #[test]
    fn truncated_input_rejected() {
        let mut pos = 0;
        assert!(read_len(&[1, 2], &mut pos).is_err());
        let mut pos = 0;
        assert!(read_exact(&[1, 2], &mut pos, 3).is_err());
    }

    #[test]
    fn utf8_len_counts_bytes() {
        assert_eq!(utf8_len(""), 0);
        assert_eq!(utf8_len("abc"), 3);
        assert_eq!(utf8_len("é"), 2);
    }
}
