//! Minimal HTTP JSON-RPC 2.0 client with a cookie jar.
//!
//! The gateway issues its session as a cookie during authentication, so
//! the underlying `reqwest` client is built with its cookie store enabled
//! and shared across every call.

use super::common::{Request, Response, ResponseError};
use crate::{JsonRpcClient, JsonRpcError, ProviderError, RpcError};
use async_trait::async_trait;
use reqwest::{Client, Error as ReqwestError};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;
use url::Url;

/// An HTTP transport speaking JSON-RPC 2.0 against `<base_url>/rpc/v1`.
#[derive(Debug)]
pub struct Http {
    id: AtomicU64,
    client: Client,
    url: Url,
}

/// Error thrown by the HTTP transport.
#[derive(Error, Debug)]
pub enum HttpClientError {
    #[error(transparent)]
    ReqwestError(#[from] ReqwestError),
    #[error(transparent)]
    JsonRpcError(#[from] JsonRpcError),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error("response carries neither result nor error")]
    MissingResult,
}

impl RpcError for HttpClientError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            HttpClientError::JsonRpcError(err) => Some(err),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            HttpClientError::SerdeJson(err) => Some(err),
            _ => None,
        }
    }
}

impl From<HttpClientError> for ProviderError {
    fn from(src: HttpClientError) -> Self {
        match src {
            HttpClientError::JsonRpcError(err) => ProviderError::JsonRpcError(err),
            _ => ProviderError::JsonRpcClientError(Box::new(src)),
        }
    }
}

#[async_trait]
impl JsonRpcClient for Http {
    type Error = HttpClientError;

    /// Sends a POST request with the provided method and the params
    /// serialized as JSON over HTTP.
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, HttpClientError>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        let next_id = self.id.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = Request::new(next_id, method, params);

        let res = self.client.post(self.url.as_ref()).json(&payload).send().await?;
        let text = res.text().await?;
        let res: Response<R> = serde_json::from_str(&text)?;

        res.into_result().map_err(|err| match err {
            ResponseError::JsonRpc(err) => HttpClientError::JsonRpcError(err),
            ResponseError::MissingResult => HttpClientError::MissingResult,
        })
    }
}

impl Http {
    /// Initializes a new HTTP client against the node's RPC endpoint. The
    /// cookie store is enabled so the gateway session survives across
    /// calls.
    pub fn new(url: impl Into<Url>) -> Self {
        let client =
            Client::builder().cookie_store(true).build().expect("failed to build reqwest client");
        Self::new_with_client(url, client)
    }

    /// Initializes a new HTTP client with a caller-supplied `reqwest`
    /// client. The client should have its cookie store enabled, otherwise
    /// gateway authentication will not stick.
    pub fn new_with_client(url: impl Into<Url>, client: Client) -> Self {
        Self { id: AtomicU64::new(0), client, url: url.into() }
    }

    /// The RPC endpoint this transport posts to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The shared HTTP client (and with it, the cookie jar).
    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl FromStr for Http {
    type Err = url::ParseError;

    /// Parses a base URL, appending the `/rpc/v1` endpoint path.
    fn from_str(base: &str) -> Result<Self, Self::Err> {
        let base = Url::parse(base)?;
        let url = base.join("rpc/v1")?;
        Ok(Self::new(url))
    }
}

impl Clone for Http {
    fn clone(&self) -> Self {
        Self { id: AtomicU64::new(0), client: self.client.clone(), url: self.url.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_appends_endpoint() {
        let http: Http = "https://nodes.idos.network/".parse().unwrap();
        assert_eq!(http.url().as_str(), "https://nodes.idos.network/rpc/v1");
    }
}
