//! Transport seam between [`ExtractionClient`](crate::ExtractionClient) and the network.

use std::future::Future;
use std::pin::Pin;

/// Future returned by [`Transport::execute`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send + 'a>>;

/// Sends a fully built request and yields the raw response.
///
/// The client performs exactly one `execute` per operation and never retries.
/// Timeouts, connection pooling and TLS are the implementor's concern.
pub trait Transport: Send + Sync {
    fn execute<'a>(&'a self, request: reqwest::Request) -> TransportFuture<'a>;
}

impl Transport for reqwest::Client {
    fn execute<'a>(&'a self, request: reqwest::Request) -> TransportFuture<'a> {
        Box::pin(reqwest::Client::execute(self, request))
    }
}
