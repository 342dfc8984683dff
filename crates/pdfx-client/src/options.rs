//! Conversion options sent alongside the PDF.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ExtractError;

/// Output format requested from the service.
///
/// Serializes to the lowercase wire value; parsing (from strings, flags or
/// config files) ignores case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl Format {
    /// The value sent in the `format` multipart field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Text => "text",
            Format::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format '{}' (expected text or json)", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Format {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How the service should convert a document.
///
/// Values are fixed once built; use the `with_*` methods to derive a new set
/// of options from an existing one.
#[derive(Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    first_page: NonZeroU32,
    last_page: Option<NonZeroU32>,
    password: Option<String>,
    normalize_whitespace: bool,
    format: Format,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            first_page: NonZeroU32::MIN,
            last_page: None,
            password: None,
            normalize_whitespace: true,
            format: Format::Text,
        }
    }
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("first_page", &self.first_page)
            .field("last_page", &self.last_page)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("normalize_whitespace", &self.normalize_whitespace)
            .field("format", &self.format)
            .finish()
    }
}

impl ConvertOptions {
    pub fn with_first_page(mut self, page: NonZeroU32) -> Self {
        self.first_page = page;
        self
    }

    /// Stop at `page` (inclusive). Without it the service converts to the end.
    pub fn with_last_page(mut self, page: NonZeroU32) -> Self {
        self.last_page = Some(page);
        self
    }

    /// Password for encrypted PDFs.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_normalize_whitespace(mut self, normalize: bool) -> Self {
        self.normalize_whitespace = normalize;
        self
    }

    pub fn with_format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    pub fn first_page(&self) -> NonZeroU32 {
        self.first_page
    }

    pub fn last_page(&self) -> Option<NonZeroU32> {
        self.last_page
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn normalize_whitespace(&self) -> bool {
        self.normalize_whitespace
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Check the page range. `last_page` must not precede `first_page`.
    pub fn validate(&self) -> Result<(), ExtractError> {
        match self.last_page {
            Some(last) if last < self.first_page => Err(ExtractError::InvalidOptions(format!(
                "last page {} is before first page {}",
                last, self.first_page
            ))),
            _ => Ok(()),
        }
    }

    /// Scalar multipart fields in the order they are sent.
    ///
    /// `lastPage` and `password` only appear when set.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("firstPage", self.first_page.to_string()),
            ("normalizeWhitespace", self.normalize_whitespace.to_string()),
            ("format", self.format.as_str().to_string()),
        ];
        if let Some(last) = self.last_page {
            fields.push(("lastPage", last.to_string()));
        }
        if let Some(ref password) = self.password {
            fields.push(("password", password.clone()));
        }
        fields
    }
}
