use super::{encode_value_into, CodecError};
use crate::{
    types::{DataType, Value},
    utils::write_len_prefixed,
};

/// Version field leading every encoded payload.
pub const CODEC_VERSION: u16 = 0;

/// Encodes an action-call payload (submitted with a view RPC):
///
/// ```text
/// version(2 LE) || len(namespace,4) || namespace || len(name,4) || name
///               || len(args,4) || per-arg
/// ```
pub fn encode_call_payload(
    namespace: &str,
    name: &str,
    args: &[(Value, DataType)],
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_header(&mut out, namespace, name);
    write_args(&mut out, args)?;
    Ok(out)
}

/// Encodes an action-execution payload (submitted with a transaction). The
/// outer list carries one entry per call; a single-call execution has an
/// outer length of 1.
pub fn encode_execute_payload(
    namespace: &str,
    name: &str,
    calls: &[Vec<(Value, DataType)>],
) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_header(&mut out, namespace, name);
    out.extend_from_slice(&(calls.len() as i32).to_le_bytes());
    for args in calls {
        write_args(&mut out, args)?;
    }
    Ok(out)
}

fn write_header(out: &mut Vec<u8>, namespace: &str, name: &str) {
    out.extend_from_slice(&CODEC_VERSION.to_le_bytes());
    write_len_prefixed(out, namespace.as_bytes());
    write_len_prefixed(out, name.as_bytes());
}

fn write_args(out: &mut Vec<u8>, args: &[(Value, DataType)]) -> Result<(), CodecError> {
    out.extend_from_slice(&(args.len() as i32).to_le_bytes());
    for (value, declared) in args {
        write_type_descriptor(out, declared);
        encode_value_into(out, value, declared)?;
    }
    Ok(())
}

// Per-argument type descriptor:
// `len(type_name,4) || type_name || is_array(1) || precision(2 LE) || scale(2 LE)`.
fn write_type_descriptor(out: &mut Vec<u8>, declared: &DataType) {
    write_len_prefixed(out, declared.param.type_name().as_bytes());
    out.push(declared.is_array as u8);
    let [precision, scale] = declared.param.metadata();
    out.extend_from_slice(&precision.to_le_bytes());
    out.extend_from_slice(&scale.to_le_bytes());
}
