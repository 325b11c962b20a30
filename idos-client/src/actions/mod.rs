//! Action definitions and the input projection that feeds the codec.
//!
//! An action is a named, namespaced server-side routine with ordered,
//! typed parameters. Definitions here are mechanically derived from the
//! network schema; the executor only relies on the `(namespace, name,
//! parameter types, input projection)` contract.

mod catalog;
pub use catalog::{access_grants, attributes, credentials, users, wallets, NAMESPACE};

use crate::ClientError;
use idos_core::types::{Bytes, DataType, ParamType, Uint256, Value};
use serde::Serialize;
use serde_json::Value as Json;
use uuid::Uuid;

/// A server-side action: where it lives, what it is called, and the
/// ordered parameters it takes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionDef {
    pub namespace: &'static str,
    pub name: &'static str,
    /// Ordered `(field name, declared type)` pairs. The field name keys
    /// into the serialized input record.
    pub params: &'static [(&'static str, DataType)],
}

impl ActionDef {
    /// Projects a typed input record into the action's ordered values.
    ///
    /// The record is serialized to a JSON object and its fields are
    /// picked in declared parameter order; a missing field is a null.
    pub fn project<T: Serialize>(&self, input: &T) -> Result<Vec<(Value, DataType)>, ClientError> {
        let record = serde_json::to_value(input)
            .map_err(|err| ClientError::ValidationError(err.to_string()))?;
        let object = match record {
            Json::Object(object) => object,
            Json::Null => serde_json::Map::new(),
            other => {
                return Err(ClientError::ValidationError(format!(
                    "action input must be a record, got {other}"
                )))
            }
        };

        self.params
            .iter()
            .map(|(field, declared)| {
                let cell = object.get(*field).cloned().unwrap_or(Json::Null);
                let value = json_to_value(&cell, declared).map_err(|err| {
                    ClientError::ValidationError(format!("{}.{}: {err}", self.name, field))
                })?;
                Ok((value, declared.clone()))
            })
            .collect()
    }
}

/// Converts a JSON cell into a wire [`Value`] of the declared type. Used
/// both for input projection and for decoding query-result cells.
pub fn json_to_value(cell: &Json, declared: &DataType) -> Result<Value, String> {
    if declared.is_array {
        return match cell {
            Json::Null => Ok(Value::Null),
            Json::Array(cells) => {
                let scalar = DataType { param: declared.param.clone(), is_array: false };
                let elements = cells
                    .iter()
                    .map(|cell| json_to_value(cell, &scalar))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(elements))
            }
            other => Err(format!("expected an array, got {other}")),
        };
    }

    match (cell, &declared.param) {
        (Json::Null, _) => Ok(Value::Null),
        (Json::String(s), ParamType::Text { .. }) => Ok(Value::Text(s.clone())),
        (Json::Number(n), ParamType::Int { .. }) => {
            n.as_i64().map(Value::Int).ok_or_else(|| format!("{n} is not an int8"))
        }
        (Json::Bool(b), ParamType::Bool) => Ok(Value::Bool(*b)),
        (Json::String(s), ParamType::Bytea) => {
            let raw = hex::decode(s.strip_prefix("0x").unwrap_or(s))
                .map_err(|err| format!("invalid hex: {err}"))?;
            Ok(Value::Bytea(Bytes::from(raw)))
        }
        (Json::String(s), ParamType::Uuid) => {
            let id: Uuid = s.parse().map_err(|err| format!("invalid uuid: {err}"))?;
            Ok(Value::Uuid(id))
        }
        (Json::String(s), ParamType::Numeric { .. }) => Ok(Value::Numeric(s.clone())),
        (Json::String(s), ParamType::Uint256) => {
            let value = Uint256::from_dec_str(s).map_err(|err| format!("invalid uint256: {err}"))?;
            Ok(Value::Uint256(value))
        }
        (Json::Number(n), ParamType::Uint256) => {
            n.as_u64().map(|v| Value::Uint256(Uint256::from(v))).ok_or_else(|| {
                format!("{n} is not a uint256; pass larger values as decimal strings")
            })
        }
        (other, param) => Err(format!("cannot read {other} as {}", param.type_name())),
    }
}
