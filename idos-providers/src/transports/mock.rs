use crate::{JsonRpcClient, JsonRpcError, ProviderError, RpcError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};
use thiserror::Error;

/// Helper response type for [`MockTransport`], allowing custom JSON-RPC
/// errors to be provided. `Value` for successful responses, `Error` for
/// JSON-RPC errors.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Successful response with a `serde_json::Value`.
    Value(Value),

    /// Error response with a [`JsonRpcError`].
    Error(JsonRpcError),
}

/// Mock transport used in test environments.
///
/// Responses are popped in FIFO order; requests are recorded with their
/// method and params for later assertion.
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    requests: Arc<Mutex<VecDeque<(String, Value)>>>,
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
}

#[derive(Error, Debug)]
pub enum MockError {
    #[error(transparent)]
    JsonRpcError(#[from] JsonRpcError),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),

    #[error("empty responses queue")]
    EmptyResponses,

    #[error("empty requests queue")]
    EmptyRequests,
}

impl RpcError for MockError {
    fn as_error_response(&self) -> Option<&JsonRpcError> {
        match self {
            MockError::JsonRpcError(err) => Some(err),
            _ => None,
        }
    }

    fn as_serde_error(&self) -> Option<&serde_json::Error> {
        match self {
            MockError::JsonError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MockError> for ProviderError {
    fn from(src: MockError) -> Self {
        match src {
            MockError::JsonRpcError(err) => ProviderError::JsonRpcError(err),
            _ => ProviderError::JsonRpcClientError(Box::new(src)),
        }
    }
}

#[async_trait]
impl JsonRpcClient for MockTransport {
    type Error = MockError;

    /// Pushes `(method, params)` to the back of the `requests` queue,
    /// pops the next response from the front of the `responses` queue.
    async fn request<T, R>(&self, method: &str, params: T) -> Result<R, MockError>
    where
        T: Serialize + Send + Sync,
        R: DeserializeOwned,
    {
        self.requests
            .lock()
            .unwrap()
            .push_back((method.to_owned(), serde_json::to_value(params)?));
        let response = self.responses.lock().unwrap().pop_front().ok_or(MockError::EmptyResponses)?;
        match response {
            MockResponse::Value(value) => Ok(serde_json::from_value(value)?),
            MockResponse::Error(error) => Err(MockError::JsonRpcError(error)),
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response.
    pub fn push<T: Serialize>(&self, data: T) -> Result<(), MockError> {
        self.responses.lock().unwrap().push_back(MockResponse::Value(serde_json::to_value(data)?));
        Ok(())
    }

    /// Queues a JSON-RPC error response.
    pub fn push_error(&self, error: JsonRpcError) {
        self.responses.lock().unwrap().push_back(MockResponse::Error(error));
    }

    /// Pops the oldest recorded request, asserting its method.
    pub fn assert_request(&self, method: &str) -> Result<Value, MockError> {
        let (m, params) =
            self.requests.lock().unwrap().pop_front().ok_or(MockError::EmptyRequests)?;
        assert_eq!(m, method);
        Ok(params)
    }

    /// Number of requests the transport has seen and not yet asserted.
    pub fn pending_requests(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}
