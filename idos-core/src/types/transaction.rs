use super::{Base64Bytes, Bytes, SignatureType};
use crate::utils::sha256;
use serde::{Deserialize, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumString};

/// The kind of payload a transaction carries. The network only accepts
/// action executions from clients.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayloadType {
    Execute,
}

/// Signature slot of a transaction envelope. `sig` is `None` until the
/// envelope has been signed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxSignature {
    pub sig: Option<Base64Bytes>,
    #[serde(rename = "type")]
    pub sig_type: SignatureType,
}

/// Body of a transaction envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    pub desc: String,
    pub payload: Base64Bytes,
    #[serde(rename = "type")]
    pub payload_type: PayloadType,
    pub fee: String,
    pub nonce: u64,
    pub chain_id: String,
}

/// A transaction envelope, unsigned until [`Transaction::attach_signature`]
/// is called. A transaction must be signed before broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub signature: TxSignature,
    pub body: TxBody,
    pub sender: Bytes,
    pub serialization: String,
}

impl Transaction {
    /// Builds an unsigned envelope around an encoded execution payload.
    pub fn unsigned(
        payload: Vec<u8>,
        sig_type: SignatureType,
        sender: Bytes,
        nonce: u64,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            signature: TxSignature { sig: None, sig_type },
            body: TxBody {
                desc: String::new(),
                payload: Base64Bytes(payload),
                payload_type: PayloadType::Execute,
                fee: "0".to_owned(),
                nonce,
                chain_id: chain_id.into(),
            },
            sender,
            serialization: "concat".to_owned(),
        }
    }

    /// First 20 bytes of the SHA-256 of the payload. This truncation is part
    /// of the signable message format and must not change.
    pub fn payload_digest(&self) -> [u8; 20] {
        let mut digest = [0u8; 20];
        digest.copy_from_slice(&sha256(&self.body.payload)[..20]);
        digest
    }

    /// The canonical text the signer signs. Whitespace is normative.
    pub fn signable_message(&self) -> String {
        format!(
            "{}\n\nPayloadType: {}\nPayloadDigest: {}\nFee: {}\nNonce: {}\n\nKwil Chain ID: {}\n",
            self.body.desc,
            self.body.payload_type,
            hex::encode(self.payload_digest()),
            self.body.fee,
            self.body.nonce,
            self.body.chain_id,
        )
    }

    /// Attaches a raw signature produced over [`Self::signable_message`].
    pub fn attach_signature(&mut self, sig: Vec<u8>) {
        self.signature.sig = Some(Base64Bytes(sig));
    }

    pub fn is_signed(&self) -> bool {
        self.signature.sig.is_some()
    }
}

/// Broadcast synchronization mode, serialized as its numeric wire value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BroadcastSync {
    /// `0`: return as soon as the node accepts the transaction.
    FireAndForget,
    /// `1`: wait until the transaction commits and report its result.
    WaitForCommit,
}

impl BroadcastSync {
    pub fn as_u8(self) -> u8 {
        match self {
            BroadcastSync::FireAndForget => 0,
            BroadcastSync::WaitForCommit => 1,
        }
    }
}

impl Default for BroadcastSync {
    fn default() -> Self {
        BroadcastSync::WaitForCommit
    }
}

impl Serialize for BroadcastSync {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

/// Commit result attached to a synchronous broadcast response. `code != 0`
/// means the transaction was included but failed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub gas: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
}
