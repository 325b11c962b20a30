#![doc = include_str!("../README.md")]
#![deny(unsafe_code, rustdoc::broken_intra_doc_links)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod actions;

mod client;
pub use client::IdosClient;

mod error;
pub use error::ClientError;

mod executor;
pub use executor::ActionClient;

mod records;
pub use records::{
    AccessGrant, AddAttribute, AddCredential, AddWallet, Attribute, CreateAccessGrant,
    Credential, EditAttribute, EditCredential, ShareAttribute, ShareCredential, User, Wallet,
};
