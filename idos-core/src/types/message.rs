use super::{Base64Bytes, Bytes, SignatureType};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Body of a view-call RPC message.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Base64Bytes>,
    /// Hex challenge, empty until the gateway has issued one.
    #[serde(default)]
    pub challenge: Bytes,
}

/// A view-call RPC message. Public calls omit `sender` and `signature` and
/// carry `auth_type = invalid`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMessage {
    pub body: CallBody,
    pub auth_type: SignatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<Bytes>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Base64Bytes>,
}

impl CallMessage {
    /// An unauthenticated message around an encoded call payload.
    pub fn public(payload: Vec<u8>) -> Self {
        Self {
            body: CallBody { payload: Some(Base64Bytes(payload)), challenge: Bytes::new() },
            auth_type: SignatureType::Invalid,
            sender: None,
            signature: None,
        }
    }
}

/// Declared type of a result column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnType {
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub metadata: [u16; 2],
}

/// Column-aligned query result as returned by `user.call` and `user.query`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub column_names: Vec<String>,
    #[serde(default)]
    pub column_types: Vec<ColumnType>,
    #[serde(default)]
    pub values: Vec<Vec<Json>>,
}

impl QueryResult {
    /// Pairs column names with row cells, producing one JSON object per
    /// row. Rows whose width differs from the header are rejected.
    pub fn into_records(self) -> Result<Vec<serde_json::Map<String, Json>>, RaggedRow> {
        let width = self.column_names.len();
        self.values
            .into_iter()
            .enumerate()
            .map(|(row, cells)| {
                if cells.len() != width {
                    return Err(RaggedRow { row, expected: width, got: cells.len() });
                }
                Ok(self.column_names.iter().cloned().zip(cells).collect())
            })
            .collect()
    }
}

/// A row whose cell count does not match the column header.
#[derive(Clone, Debug, thiserror::Error)]
#[error("row {row} has {got} cells, expected {expected}")]
pub struct RaggedRow {
    pub row: usize,
    pub expected: usize,
    pub got: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn public_message_shape() {
        let msg = CallMessage::public(vec![1, 2]);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["auth_type"], "invalid");
        assert_eq!(json["body"]["challenge"], "");
        assert!(json.get("sender").is_none());
    }

    #[test]
    fn records_pair_names_with_cells() {
        let result = QueryResult {
            column_names: vec!["id".into(), "address".into()],
            column_types: vec![],
            values: vec![vec![json!("u1"), json!("0xabc")]],
        };
        let records = result.into_records().unwrap();
        assert_eq!(records[0]["id"], "u1");
        assert_eq!(records[0]["address"], "0xabc");
    }

    #[test]
    fn ragged_rows_rejected() {
        let result = QueryResult {
            column_names: vec!["id".into()],
            column_types: vec![],
            values: vec![vec![json!(1), json!(2)]],
        };
        assert!(result.into_records().is_err());
    }
}
