use crate::ShamirError;
use idos_core::eip712::Eip712Error;
use std::error::Error;
use thiserror::Error;

/// A single node's contribution to a failed quorum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    /// 0-based position in the discovered node list.
    pub node_index: usize,
    pub error: String,
}

impl std::fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node {}: {}", self.node_index, self.error)
    }
}

/// Error thrown by the distributed-recovery client.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("invalid recovery configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("discovered {discovered} nodes, configuration expects {expected}")]
    NodeCountMismatch { discovered: usize, expected: usize },

    /// Fewer than `k + m` nodes accepted a write.
    #[error("upload reached {success} of {required} required nodes")]
    MpcUploadFailed { success: usize, required: usize, failures: Vec<NodeFailure> },

    /// Fewer than `k` shares could be retrieved and opened.
    #[error("obtained {obtained} of {required} required shares")]
    MpcNotEnoughShares { obtained: usize, required: usize, failures: Vec<NodeFailure> },

    #[error(transparent)]
    Shamir(#[from] ShamirError),

    #[error(transparent)]
    Eip712(#[from] Eip712Error),

    #[error("signer error: {0}")]
    Signer(#[source] Box<dyn Error + Send + Sync>),
}
