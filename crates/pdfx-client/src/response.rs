//! Successful service responses and JSON decoding.

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;

use crate::{DecodedJson, ExtractError};

/// Body of a successful `/extract` call.
///
/// The body is not buffered: it is read from the network as the caller
/// consumes it, and can only be consumed once. Every consuming method takes
/// `self`; dropping the value releases the connection.
#[derive(Debug)]
pub struct ExtractionResult {
    response: reqwest::Response,
}

impl ExtractionResult {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self { response }
    }

    /// `Content-Type` reported by the service.
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Body length, when the service sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Next chunk of the body, or `None` once it is exhausted.
    pub async fn chunk(&mut self) -> Result<Option<Bytes>, ExtractError> {
        Ok(self.response.chunk().await?)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes, ExtractError>> + Send {
        self.response.bytes_stream().map_err(ExtractError::from)
    }

    /// Adapt the body to [`AsyncRead`], e.g. for `tokio::io::copy`.
    pub fn into_reader(self) -> impl AsyncRead + Send + Unpin {
        StreamReader::new(
            self.response
                .bytes_stream()
                .map_err(std::io::Error::other),
        )
    }

    /// Read the whole body into memory.
    pub async fn bytes(self) -> Result<Bytes, ExtractError> {
        Ok(self.response.bytes().await?)
    }

    /// Read the whole body as text (`Format::Text` output).
    pub async fn text(self) -> Result<String, ExtractError> {
        Ok(self.response.text().await?)
    }

    /// Decode a `Format::Json` body.
    ///
    /// The body is buffered first, so a connection failure surfaces as
    /// [`ExtractError::Request`] and only malformed content as
    /// [`ExtractError::JsonDecode`].
    pub async fn json(self) -> Result<DecodedJson, ExtractError> {
        let bytes = self.response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Read `reader` to the end and parse it strictly as JSON.
///
/// Malformed input, including an empty stream, fails with
/// [`ExtractError::JsonDecode`]. The `meta`/`pages` shape is not checked.
///
/// The reader is consumed: passing a reader that was already drained yields
/// empty input and therefore a decode error, not the earlier content.
pub async fn process_json_response<R>(mut reader: R) -> Result<DecodedJson, ExtractError>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(serde_json::from_slice(&buf)?)
}
