use crate::{
    combine, discover_nodes, split, AddAddressRequest, DownloadRequest, NodeFailure, NodeInfo,
    RecoveryError, RemoveAddressRequest, Share, TaggedAddress, UpdateWalletsRequest,
    UploadRequest,
};
use futures_util::future::join_all;
use idos_core::{
    crypto::{generate_box_keypair, open, random_bytes},
    utils::keccak256,
};
use idos_signers::{Signer, TypedDataSigner};
use reqwest::{header::AUTHORIZATION, Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, instrument, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Bytes of random blinding appended to every share before it leaves the
/// client. The keccak of the blinded share is the public commitment.
const BLINDING_LEN: usize = 32;

/// Configuration of the secret-store deployment: where to discover nodes,
/// how many there are, and the failure budget.
///
/// A write must reach `threshold + malicious_nodes` nodes, a read must
/// recover `threshold` shares.
#[derive(Clone, Debug)]
pub struct RecoveryConfig {
    pub rpc_url: String,
    pub contract_address: String,
    pub total_nodes: u8,
    pub threshold: u8,
    pub malicious_nodes: u8,
}

impl RecoveryConfig {
    pub fn new(
        rpc_url: impl Into<String>,
        contract_address: impl Into<String>,
        total_nodes: u8,
        threshold: u8,
        malicious_nodes: u8,
    ) -> Result<Self, RecoveryError> {
        if threshold == 0 || threshold > total_nodes {
            return Err(RecoveryError::Config(format!(
                "threshold must satisfy 0 < k <= n, got k={threshold}, n={total_nodes}"
            )));
        }
        Ok(Self {
            rpc_url: rpc_url.into(),
            contract_address: contract_address.into(),
            total_nodes,
            threshold,
            malicious_nodes,
        })
    }

    /// Minimum successful nodes for a write.
    pub fn write_quorum(&self) -> usize {
        self.threshold as usize + self.malicious_nodes as usize
    }

    /// Minimum recovered shares for a read.
    pub fn read_quorum(&self) -> usize {
        self.threshold as usize
    }
}

/// Per-node body of an upload: the shared commitment set plus this node's
/// blinded share.
#[derive(Serialize)]
struct UploadBody<'a> {
    share_commitments: &'a [String],
    recovering_addresses: &'a [TaggedAddress],
    share_data: String,
}

/// Per-node response of a download.
#[derive(Deserialize)]
struct DownloadResponse {
    encrypted_share: String,
    nonce: String,
    public_key: String,
}

/// Client for the distributed-recovery network.
///
/// Every operation performs fresh node discovery, signs its request as
/// EIP-712 typed data with the user's signer, and fans out to all nodes
/// concurrently, tolerating failures up to the configured quorum.
pub struct RecoveryClient<S> {
    http: reqwest::Client,
    config: RecoveryConfig,
    signer: S,
}

impl<S: Signer + TypedDataSigner> RecoveryClient<S> {
    pub fn new(config: RecoveryConfig, signer: S) -> Self {
        Self { http: reqwest::Client::new(), config, signer }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, RecoveryError> {
        let nodes =
            discover_nodes(&self.http, &self.config.rpc_url, &self.config.contract_address).await?;
        if nodes.len() != self.config.total_nodes as usize {
            return Err(RecoveryError::NodeCountMismatch {
                discovered: nodes.len(),
                expected: self.config.total_nodes as usize,
            });
        }
        Ok(nodes)
    }

    fn share_url(&self, node: &NodeInfo, id: &Uuid) -> String {
        format!(
            "{}/offchain/{}/shares/{}",
            node.url.trim_end_matches('/'),
            self.config.contract_address,
            id.hyphenated(),
        )
    }

    async fn sign_request(
        &self,
        typed: &idos_core::eip712::TypedData,
    ) -> Result<String, RecoveryError> {
        self.signer
            .sign_typed_data(typed)
            .await
            .map_err(|err| RecoveryError::Signer(Box::new(err)))
    }

    /// Splits `secret` into one blinded share per node and uploads them,
    /// committing to each share with its keccak-256. Requires `k + m`
    /// nodes to answer HTTP 201.
    #[instrument(skip(self, secret, recovering_addresses))]
    pub async fn upload_secret(
        &self,
        id: &Uuid,
        secret: &[u8],
        recovering_addresses: Vec<TaggedAddress>,
    ) -> Result<(), RecoveryError> {
        let nodes = self.nodes().await?;
        let shares = split(secret, self.config.total_nodes, self.config.threshold)?;

        let blinded: Vec<Zeroizing<Vec<u8>>> = shares
            .iter()
            .map(|share| {
                let mut data = Zeroizing::new(share.data.clone());
                data.extend_from_slice(&random_bytes::<BLINDING_LEN>());
                data
            })
            .collect();
        let commitments: Vec<String> =
            blinded.iter().map(|share| format!("0x{}", hex::encode(keccak256(share)))).collect();

        let mut recovering_addresses = recovering_addresses;
        if recovering_addresses.is_empty() {
            recovering_addresses.push(TaggedAddress::from_signer(&self.signer));
        }

        let request = UploadRequest {
            share_commitments: commitments,
            recovering_addresses,
        };
        let signature = self.sign_request(&request.to_typed_data(&self.config.contract_address)).await?;

        let outcomes = join_all(nodes.iter().zip(&blinded).map(|(node, blinded_share)| {
            let url = self.share_url(node, id);
            let body = UploadBody {
                share_commitments: &request.share_commitments,
                recovering_addresses: &request.recovering_addresses,
                share_data: hex::encode(blinded_share),
            };
            let signature = &signature;
            async move {
                let response = self
                    .http
                    .put(&url)
                    .header(AUTHORIZATION, signature)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|err| err.to_string())?;
                match response.status() {
                    StatusCode::CREATED => Ok(()),
                    status => Err(format!("unexpected status {status}")),
                }
            }
        }))
        .await;

        let (success, failures) = tally(outcomes.into_iter());
        let required = self.config.write_quorum();
        if success < required {
            warn!(success, required, "upload quorum not reached");
            return Err(RecoveryError::MpcUploadFailed { success, required, failures });
        }
        debug!(success, "secret uploaded");
        Ok(())
    }

    /// Retrieves at least `k` blinded shares, each encrypted by its node
    /// to a fresh ephemeral keypair, strips the blinding, and recombines
    /// the secret.
    #[instrument(skip(self))]
    pub async fn download_secret(&self, id: &Uuid) -> Result<Zeroizing<Vec<u8>>, RecoveryError> {
        let nodes = self.nodes().await?;

        let (ephemeral_secret, ephemeral_public) = generate_box_keypair();
        let request = DownloadRequest {
            recovering_address: TaggedAddress::from_signer(&self.signer),
            timestamp: now_ms(),
            public_key: format!("0x{}", hex::encode(ephemeral_public)),
        };
        let signature = self.sign_request(&request.to_typed_data(&self.config.contract_address)).await?;

        let outcomes = join_all(nodes.iter().enumerate().map(|(node_index, node)| {
            let url = self.share_url(node, id);
            let request = &request;
            let signature = &signature;
            let ephemeral_secret = &ephemeral_secret;
            async move {
                let response = self
                    .http
                    .post(&url)
                    .header(AUTHORIZATION, signature)
                    .json(request)
                    .send()
                    .await
                    .map_err(|err| err.to_string())?;
                if !response.status().is_success() {
                    return Err(format!("unexpected status {}", response.status()));
                }
                let body: DownloadResponse =
                    response.json().await.map_err(|err| err.to_string())?;
                decrypt_share(node_index, &body, ephemeral_secret)
            }
        }))
        .await;

        let (shares, failures) = partition(outcomes.into_iter());
        let required = self.config.read_quorum();
        if shares.len() < required {
            warn!(obtained = shares.len(), required, "download quorum not reached");
            return Err(RecoveryError::MpcNotEnoughShares {
                obtained: shares.len(),
                required,
                failures,
            });
        }
        debug!(obtained = shares.len(), "shares recovered, combining");
        Ok(combine(&shares)?)
    }

    /// Grants `address` recovery rights on at least `k + m` nodes.
    pub async fn add_address(&self, id: &Uuid, address: TaggedAddress) -> Result<(), RecoveryError> {
        let request = AddAddressRequest { address, timestamp: now_ms() };
        let signature = self.sign_request(&request.to_typed_data(&self.config.contract_address)).await?;
        self.write_fan_out(id, Method::POST, "/addresses", &request, &signature).await
    }

    /// Revokes `address`'s recovery rights on at least `k + m` nodes.
    pub async fn remove_address(
        &self,
        id: &Uuid,
        address: TaggedAddress,
    ) -> Result<(), RecoveryError> {
        let request = RemoveAddressRequest { address, timestamp: now_ms() };
        let signature = self.sign_request(&request.to_typed_data(&self.config.contract_address)).await?;
        self.write_fan_out(id, Method::PATCH, "/addresses", &request, &signature).await
    }

    /// Replaces the recovery address set on at least `k + m` nodes.
    pub async fn update_wallets(
        &self,
        id: &Uuid,
        recovering_addresses: Vec<TaggedAddress>,
    ) -> Result<(), RecoveryError> {
        let request = UpdateWalletsRequest { recovering_addresses, timestamp: now_ms() };
        let signature = self.sign_request(&request.to_typed_data(&self.config.contract_address)).await?;
        self.write_fan_out(id, Method::PATCH, "/wallets", &request, &signature).await
    }

    async fn write_fan_out<B: Serialize + Sync>(
        &self,
        id: &Uuid,
        method: Method,
        suffix: &str,
        body: &B,
        signature: &str,
    ) -> Result<(), RecoveryError> {
        let nodes = self.nodes().await?;
        let outcomes = join_all(nodes.iter().map(|node| {
            let url = format!("{}{}", self.share_url(node, id), suffix);
            let method = method.clone();
            async move {
                let response = self
                    .http
                    .request(method, &url)
                    .header(AUTHORIZATION, signature)
                    .json(body)
                    .send()
                    .await
                    .map_err(|err| err.to_string())?;
                if response.status().is_success() {
                    Ok(())
                } else {
                    Err(format!("unexpected status {}", response.status()))
                }
            }
        }))
        .await;

        let (success, failures) = tally(outcomes.into_iter());
        let required = self.config.write_quorum();
        if success < required {
            return Err(RecoveryError::MpcUploadFailed { success, required, failures });
        }
        Ok(())
    }
}

fn decrypt_share(
    node_index: usize,
    body: &DownloadResponse,
    ephemeral_secret: &[u8; 32],
) -> Result<Share, String> {
    let nonce = decode_hex_field("nonce", &body.nonce)?;
    let ciphertext = decode_hex_field("encrypted_share", &body.encrypted_share)?;
    let node_public: [u8; 32] = decode_hex_field("public_key", &body.public_key)?
        .try_into()
        .map_err(|_| "node public key is not 32 bytes".to_owned())?;

    let mut sealed = nonce;
    sealed.extend_from_slice(&ciphertext);
    let blinded =
        open(&sealed, &node_public, ephemeral_secret).map_err(|err| err.to_string())?;
    if blinded.len() < BLINDING_LEN {
        return Err("share shorter than its blinding".to_owned());
    }
    Ok(Share {
        index: (node_index + 1) as u8,
        data: blinded[..blinded.len() - BLINDING_LEN].to_vec(),
    })
}

fn decode_hex_field(field: &str, value: &str) -> Result<Vec<u8>, String> {
    hex::decode(value.strip_prefix("0x").unwrap_or(value))
        .map_err(|err| format!("non-hex {field}: {err}"))
}

fn tally(outcomes: impl Iterator<Item = Result<(), String>>) -> (usize, Vec<NodeFailure>) {
    let mut success = 0;
    let mut failures = Vec::new();
    for (node_index, outcome) in outcomes.enumerate() {
        match outcome {
            Ok(()) => success += 1,
            Err(error) => failures.push(NodeFailure { node_index, error }),
        }
    }
    (success, failures)
}

fn partition<T>(outcomes: impl Iterator<Item = Result<T, String>>) -> (Vec<T>, Vec<NodeFailure>) {
    let mut values = Vec::new();
    let mut failures = Vec::new();
    for (node_index, outcome) in outcomes.enumerate() {
        match outcome {
            Ok(value) => values.push(value),
            Err(error) => failures.push(NodeFailure { node_index, error }),
        }
    }
    (values, failures)
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}
