//! The PDF being submitted, in whichever form the caller has it.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use reqwest::Body;
use reqwest::multipart::Part;
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;

use crate::ExtractError;

const FILE_NAME: &str = "file.pdf";
const PDF_MIME: &str = "application/pdf";

/// Source of the PDF bytes for [`ExtractionClient::extract`](crate::ExtractionClient::extract).
pub enum Payload {
    /// An open async reader; streamed without buffering.
    Reader(Box<dyn AsyncRead + Send + Sync + Unpin>),
    /// A PDF already held in memory.
    Bytes(Bytes),
    /// A local file, opened by the client right before sending.
    Path(PathBuf),
}

impl Payload {
    pub fn reader(reader: impl AsyncRead + Send + Sync + Unpin + 'static) -> Self {
        Payload::Reader(Box::new(reader))
    }

    pub fn path(path: impl AsRef<Path>) -> Self {
        Payload::Path(path.as_ref().to_path_buf())
    }

    /// Turn the payload into the `file` part of the multipart body.
    ///
    /// For [`Payload::Path`] this is where the file gets opened, so a missing
    /// or unreadable file fails here, before any request is built.
    pub(crate) async fn into_part(self) -> Result<Part, ExtractError> {
        let part = match self {
            Payload::Reader(reader) => Part::stream(Body::wrap_stream(ReaderStream::new(reader))),
            Payload::Bytes(bytes) => {
                let len = bytes.len() as u64;
                Part::stream_with_length(Body::from(bytes), len)
            }
            Payload::Path(path) => {
                let (file, len) = open_pdf(&path).await?;
                Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), len)
            }
        };
        Ok(part.file_name(FILE_NAME).mime_str(PDF_MIME)?)
    }
}

async fn open_pdf(path: &Path) -> Result<(tokio::fs::File, u64), ExtractError> {
    let local_err = |source| ExtractError::LocalFile {
        path: path.to_path_buf(),
        source,
    };
    let file = tokio::fs::File::open(path).await.map_err(local_err)?;
    let metadata = file.metadata().await.map_err(local_err)?;
    if !metadata.is_file() {
        return Err(local_err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok((file, metadata.len()))
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Reader(_) => f.write_str("Payload::Reader(..)"),
            Payload::Bytes(b) => write!(f, "Payload::Bytes({} bytes)", b.len()),
            Payload::Path(p) => write!(f, "Payload::Path({})", p.display()),
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(Bytes::from(bytes))
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<&'static [u8]> for Payload {
    fn from(bytes: &'static [u8]) -> Self {
        Payload::Bytes(Bytes::from_static(bytes))
    }
}

impl From<PathBuf> for Payload {
    fn from(path: PathBuf) -> Self {
        Payload::Path(path)
    }
}

impl From<&Path> for Payload {
    fn from(path: &Path) -> Self {
        Payload::Path(path.to_path_buf())
    }
}
