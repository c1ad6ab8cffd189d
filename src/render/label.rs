use ab_glyph::{FontArc, PxScale};
use imageproc::drawing::text_size;
use std::fmt;
use std::path::Path;

use crate::{Error, ErrorContext, Result};

/// Average advance of a proportional sans-serif glyph, as a fraction of the font size.
const FALLBACK_ADVANCE: f32 = 0.6;

/// Font used to measure and draw label text.
///
/// Without a font, chip widths are estimated from the character count and
/// no glyphs are drawn.
#[derive(Clone, Default)]
pub struct LabelFont {
    font: Option<FontArc>,
}

impl LabelFont {
    pub fn none() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font = FontArc::try_from_vec(data).map_err(|e| {
            Error::configuration_with_context(
                "invalid font data",
                ErrorContext::new().with_details(e.to_string()),
            )
        })?;
        Ok(Self { font: Some(font) })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    pub fn font(&self) -> Option<&FontArc> {
        self.font.as_ref()
    }

    /// Rendered `(width, height)` of `text` at `px`.
    pub fn measure(&self, text: &str, px: f32) -> (u32, u32) {
        match &self.font {
            Some(font) => text_size(PxScale::from(px), font, text),
            None => {
                let chars = text.chars().count() as f32;
                ((chars * px * FALLBACK_ADVANCE).ceil() as u32, px.ceil() as u32)
            }
        }
    }
}

impl fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabelFont")
            .field("loaded", &self.font.is_some())
            .finish()
    }
}
