#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod client;
pub use client::{RecoveryClient, RecoveryConfig};

mod discovery;
pub use discovery::{decode_node_registry, discover_nodes, NodeInfo};

mod error;
pub use error::{NodeFailure, RecoveryError};

mod gf256;

mod requests;
pub use requests::{
    AddAddressRequest, DownloadRequest, RemoveAddressRequest, TaggedAddress,
    UpdateWalletsRequest, UploadRequest,
};

mod shamir;
pub use shamir::{combine, split, ShamirError, Share};
