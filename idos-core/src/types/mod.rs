//! Wire-visible data types for the idOS network.

mod account;
pub use account::{Account, AccountId, KeyType};

mod base64;
pub use self::base64::{Base64Bytes, ParseBase64Error};

mod bytes;
pub use self::bytes::{Bytes, ParseBytesError};

mod message;
pub use message::{CallBody, CallMessage, ColumnType, QueryResult, RaggedRow};

mod param;
pub use param::{DataType, ParamType, Value};

mod signature;
pub use signature::SignatureType;

mod transaction;
pub use transaction::{
    BroadcastSync, PayloadType, Transaction, TxBody, TxResult, TxSignature,
};

mod uint256;
pub use uint256::{ParseUint256Error, Uint256};
