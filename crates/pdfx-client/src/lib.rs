//! Client for a remote PDF extraction service.
//!
//! The service accepts a PDF over a multipart `POST /extract` and answers with
//! either plain text or a JSON document (`meta` plus per-page `pages`). This
//! crate owns the request/response contract: building the multipart body from
//! [`ConvertOptions`], interpreting the service's status codes, and handing the
//! response body back as a single-consumption stream ([`ExtractionResult`]).
//!
//! ```no_run
//! # async fn run() -> Result<(), pdfx_client::ExtractError> {
//! use pdfx_client::{ConvertOptions, ExtractionClient, Format};
//!
//! let client = ExtractionClient::new("http://localhost:3000");
//! let options = ConvertOptions::default().with_format(Format::Json);
//! let doc = client.extract_file("paper.pdf", &options).await?.json().await?;
//! println!("{} pages", doc["pages"].as_array().map_or(0, |p| p.len()));
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub mod client;
pub mod config_file;
pub mod options;
pub mod payload;
pub mod response;
pub mod transport;
pub mod url;

#[cfg(test)]
mod mock;

// Re-export for convenience
pub use client::ExtractionClient;
pub use options::{ConvertOptions, Format};
pub use payload::Payload;
pub use response::{ExtractionResult, process_json_response};
pub use transport::Transport;
pub use url::join_url;

/// Decoded JSON output of the service. Expected to carry `meta` and `pages`,
/// but the shape is not validated.
pub type DecodedJson = serde_json::Value;

/// Base URL used when neither the caller nor a config file provides one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot open local file {}: {source}", .path.display())]
    LocalFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("extraction service returned HTTP {status}: {body}")]
    Response { status: u16, body: String },
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),
    #[error("invalid options: {0}")]
    InvalidOptions(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// HTTP status carried by a [`ExtractError::Response`], if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ExtractError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Settings for the default `reqwest` transport.
///
/// The client itself never enforces a timeout; these values only configure
/// the HTTP client built by [`ExtractionClient::from_config`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            connect_timeout: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Build a config from the `[service]` table of a config file, falling back
    /// to defaults for anything unset.
    pub fn from_file(file: &config_file::ConfigFile) -> Self {
        let defaults = Self::default();
        let Some(service) = file.service.as_ref() else {
            return defaults;
        };
        Self {
            base_url: service.base_url.clone().unwrap_or(defaults.base_url),
            timeout: service.timeout_secs.map(Duration::from_secs),
            connect_timeout: service.connect_timeout_secs.map(Duration::from_secs),
            user_agent: service.user_agent.clone(),
        }
    }

    /// User agent sent by the default transport.
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("pdfx/{}", env!("CARGO_PKG_VERSION")))
    }
}
