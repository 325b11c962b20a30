use crate::RecoveryError;
use idos_core::utils::{keccak256, read_exact, read_len};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// A secret-store node as registered on-chain: a 21-byte address and its
/// HTTP endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeInfo {
    pub address: [u8; 21],
    pub url: String,
}

/// Decodes the contract's node registry blob:
///
/// ```text
/// count(4 LE) || { address(21) || len(4 LE) || utf8(len) } x count
/// ```
pub fn decode_node_registry(data: &[u8]) -> Result<Vec<NodeInfo>, RecoveryError> {
    let mut pos = 0;
    let count = read_len(data, &mut pos)
        .map_err(|_| RecoveryError::InvalidResponse("truncated node registry".to_owned()))?
        .ok_or_else(|| RecoveryError::InvalidResponse("null node registry".to_owned()))?;

    let mut nodes = Vec::with_capacity(count);
    for _ in 0..count {
        let mut address = [0u8; 21];
        address.copy_from_slice(
            read_exact(data, &mut pos, 21)
                .map_err(|_| RecoveryError::InvalidResponse("truncated node address".to_owned()))?,
        );
        let len = read_len(data, &mut pos)
            .map_err(|_| RecoveryError::InvalidResponse("truncated node url".to_owned()))?
            .ok_or_else(|| RecoveryError::InvalidResponse("null node url".to_owned()))?;
        let url = std::str::from_utf8(
            read_exact(data, &mut pos, len)
                .map_err(|_| RecoveryError::InvalidResponse("truncated node url".to_owned()))?,
        )
        .map_err(|_| RecoveryError::InvalidResponse("node url is not utf-8".to_owned()))?;
        nodes.push(NodeInfo { address, url: url.to_owned() });
    }
    if pos != data.len() {
        return Err(RecoveryError::InvalidResponse("trailing bytes in node registry".to_owned()));
    }
    Ok(nodes)
}

/// Fetches the node registry from the chain. Discovery is performed fresh
/// per operation; there is no long-lived pool.
pub async fn discover_nodes(
    http: &reqwest::Client,
    rpc_url: &str,
    contract_address: &str,
) -> Result<Vec<NodeInfo>, RecoveryError> {
    #[derive(Deserialize)]
    struct RpcResponse {
        result: Option<String>,
        error: Option<serde_json::Value>,
    }

    let selector = &keccak256(b"getNodes()")[..4];
    let contract = contract_address.strip_prefix("0x").unwrap_or(contract_address);
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "eth_call",
        "params": [
            {"to": format!("0x{contract}"), "data": format!("0x{}", hex::encode(selector))},
            "latest",
        ],
    });

    let response: RpcResponse =
        http.post(rpc_url).json(&request).send().await?.json().await?;
    if let Some(error) = response.error {
        return Err(RecoveryError::InvalidResponse(format!("chain rpc error: {error}")));
    }
    let result = response
        .result
        .ok_or_else(|| RecoveryError::InvalidResponse("empty eth_call result".to_owned()))?;
    let raw = hex::decode(result.strip_prefix("0x").unwrap_or(&result))
        .map_err(|err| RecoveryError::InvalidResponse(format!("non-hex eth_call result: {err}")))?;

    let nodes = decode_node_registry(&raw)?;
    debug!(count = nodes.len(), "discovered secret-store nodes");
    Ok(nodes)
}
