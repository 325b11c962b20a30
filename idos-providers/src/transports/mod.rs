mod common;
pub use common::{JsonRpcError, Request, Response};

mod http;
pub use self::http::{Http, HttpClientError};

mod mock;
pub use mock::{MockError, MockResponse, MockTransport};
