use super::{Bytes, Uint256};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declared scalar parameter type of an action argument or result column.
///
/// Each variant dictates how a value is laid out on the wire and the
/// `(type_name, [precision, scale])` metadata pair transmitted alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "name")]
pub enum ParamType {
    Text {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_len: Option<u32>,
    },
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Bool,
    Bytea,
    Uuid,
    Numeric {
        precision: u16,
        scale: u16,
    },
    Uint256,
}

impl ParamType {
    /// The wire name of this type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamType::Text { .. } => "text",
            ParamType::Int { .. } => "int8",
            ParamType::Bool => "bool",
            ParamType::Bytea => "bytea",
            ParamType::Uuid => "uuid",
            ParamType::Numeric { .. } => "numeric",
            ParamType::Uint256 => "uint256",
        }
    }

    /// The metadata pair sent next to the type name. Only `numeric` carries
    /// a non-zero pair.
    pub fn metadata(&self) -> [u16; 2] {
        match self {
            ParamType::Numeric { precision, scale } => [*precision, *scale],
            _ => [0, 0],
        }
    }
}

/// A declared parameter type together with its array flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    #[serde(flatten)]
    pub param: ParamType,
    #[serde(default)]
    pub is_array: bool,
}

impl DataType {
    pub const fn scalar(param: ParamType) -> Self {
        Self { param, is_array: false }
    }

    pub const fn array(param: ParamType) -> Self {
        Self { param, is_array: true }
    }

    /// Shorthands for the catalog definitions.
    pub const TEXT: DataType = DataType::scalar(ParamType::Text { max_len: None });
    pub const INT: DataType = DataType::scalar(ParamType::Int { min: None, max: None });
    pub const BOOL: DataType = DataType::scalar(ParamType::Bool);
    pub const BYTEA: DataType = DataType::scalar(ParamType::Bytea);
    pub const UUID: DataType = DataType::scalar(ParamType::Uuid);
    pub const UINT256: DataType = DataType::scalar(ParamType::Uint256);
    pub const TEXT_ARRAY: DataType = DataType::array(ParamType::Text { max_len: None });
    pub const UUID_ARRAY: DataType = DataType::array(ParamType::Uuid);
}

/// A runtime value for a declared parameter type.
///
/// `Null` and `Array` are structural; the rest mirror [`ParamType`]
/// one-to-one. An empty array is a valid value and is distinct from null.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Bool(bool),
    Bytea(Bytes),
    Uuid(Uuid),
    Numeric(String),
    Uint256(Uint256),
    Array(Vec<Value>),
}

impl Value {
    /// True for `Null` (the wire length sentinel `-1`).
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytea(v)
    }
}

impl From<Uint256> for Value {
    fn from(v: Uint256) -> Self {
        Value::Uint256(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}
