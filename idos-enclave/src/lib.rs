#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod enclave;
pub use enclave::Enclave;

mod error;
pub use error::{DecryptionFailure, EnclaveError};

mod metadata;
pub use metadata::{now_ms, ExpirationPolicy, KeyKind, KeyMetadata};

mod orchestrator;
pub use orchestrator::{EnclaveOrchestrator, EnclaveState};

mod storage;
pub use storage::{metadata_slot, secret_slot, FileKeyStore, KeyStore, MemoryKeyStore, StorageError};
