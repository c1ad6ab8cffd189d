//! Image references passed to the vision API.
//!
//! The API accepts either a remote `http(s)` URL or an inline
//! `data:image/<subtype>;base64,<payload>` URI. Surrounding whitespace is
//! stripped; the rest of the string is kept and forwarded verbatim.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::path::Path;
use url::Url;

use crate::{Error, ErrorContext, Result};

static DATA_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^data:(image/[a-z0-9.+-]+);base64,").expect("static data URI pattern")
});

const PREVIEW_CHARS: usize = 50;

/// Where the image bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote,
    Embedded {
        mime: String,
        /// Byte offset of the base64 payload within the raw string.
        payload_start: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    raw: String,
    source: ImageSource,
}

impl ImageReference {
    /// Parse and validate a reference supplied by a caller or a model.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("image reference must not be empty", None));
        }

        if let Some(caps) = DATA_URI.captures(trimmed) {
            let header = caps.get(0).map(|m| m.end()).unwrap_or(0);
            if header >= trimmed.len() {
                return Err(invalid("data URI has an empty payload", None));
            }
            let mime = caps
                .get(1)
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            return Ok(Self {
                raw: trimmed.to_string(),
                source: ImageSource::Embedded {
                    mime,
                    payload_start: header,
                },
            });
        }

        if trimmed
            .get(..5)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("data:"))
        {
            return Err(invalid(
                "data URI must be a base64 encoded image",
                Some("expected data:image/<type>;base64,<payload>"),
            ));
        }

        let url = Url::parse(trimmed).map_err(|e| invalid("not a valid URL", Some(&e.to_string())))?;
        match url.scheme() {
            "http" | "https" => Ok(Self {
                raw: trimmed.to_string(),
                source: ImageSource::Remote,
            }),
            other => Err(invalid(
                "unsupported URL scheme",
                Some(&format!("{} (expected http or https)", other)),
            )),
        }
    }

    /// Build an inline data URI from raw bytes.
    pub fn from_bytes(bytes: &[u8], mime: &str) -> Self {
        let header = format!("data:{};base64,", mime);
        let payload_start = header.len();
        Self {
            raw: format!("{}{}", header, STANDARD.encode(bytes)),
            source: ImageSource::Embedded {
                mime: mime.to_ascii_lowercase(),
                payload_start,
            },
        }
    }

    /// Read a local image file into an inline data URI.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime = mime_for_path(path).ok_or_else(|| {
            Error::validation_with_context(
                "unsupported image file extension",
                ErrorContext::new()
                    .with_field_path("imageUrl")
                    .with_details(path.display().to_string()),
            )
        })?;
        let bytes = std::fs::read(path)?;
        Ok(Self::from_bytes(&bytes, mime))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.source, ImageSource::Remote)
    }

    pub fn mime(&self) -> Option<&str> {
        match &self.source {
            ImageSource::Embedded { mime, .. } => Some(mime),
            ImageSource::Remote => None,
        }
    }

    /// Decode the inline payload. Remote references have no local bytes.
    pub fn decode_embedded(&self) -> Option<Result<Vec<u8>>> {
        match &self.source {
            ImageSource::Embedded { payload_start, .. } => Some(
                STANDARD
                    .decode(&self.raw[*payload_start..])
                    .map_err(|e| invalid("data URI payload is not valid base64", Some(&e.to_string()))),
            ),
            ImageSource::Remote => None,
        }
    }

    /// Short form for logs; data URIs can be megabytes long.
    pub fn preview(&self) -> String {
        match self.raw.char_indices().nth(PREVIEW_CHARS) {
            Some((idx, _)) => format!("{}...", &self.raw[..idx]),
            None => self.raw.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preview())
    }
}

fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        _ => None,
    }
}

fn invalid(message: &str, details: Option<&str>) -> Error {
    let mut ctx = ErrorContext::new().with_field_path("imageUrl");
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    Error::validation_with_context(message, ctx)
}
