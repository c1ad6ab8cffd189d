//! Image-plus-overlay component.
//!
//! Mirrors the lifecycle of an `<img>` with a canvas on top: nothing is drawn
//! until the image reports loaded, and every later change (annotations,
//! label, layout, source) recomputes the overlay from scratch.

use image::{DynamicImage, RgbaImage};
use tracing::debug;

use super::canvas::{compose, OverlaySurface};
use super::geometry::{AnnotationOverlay, AnnotationSet, DisplaySize, Layout};
use super::label::LabelFont;
use crate::image_ref::ImageReference;
use crate::transport::TransportError;
use crate::{Error, Result};

pub struct AnnotatedImage {
    source: ImageReference,
    annotations: AnnotationSet,
    font: LabelFont,
    layout: Layout,
    image: Option<DynamicImage>,
    overlay: Option<AnnotationOverlay>,
    surface: OverlaySurface,
}

impl AnnotatedImage {
    pub fn new(source: ImageReference, annotations: AnnotationSet) -> Self {
        Self {
            source,
            annotations,
            font: LabelFont::none(),
            layout: Layout::default(),
            image: None,
            overlay: None,
            surface: OverlaySurface::new(DisplaySize::new(0, 0)),
        }
    }

    pub fn with_font(mut self, font: LabelFont) -> Self {
        self.font = font;
        self.redraw();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self.redraw();
        self
    }

    pub fn source(&self) -> &ImageReference {
        &self.source
    }

    pub fn annotations(&self) -> &AnnotationSet {
        &self.annotations
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Displayed size, once the image is loaded.
    pub fn display_size(&self) -> Option<DisplaySize> {
        self.image
            .as_ref()
            .map(|img| DisplaySize::fit((img.width(), img.height()), self.layout))
    }

    pub fn overlay(&self) -> Option<&AnnotationOverlay> {
        self.overlay.as_ref()
    }

    pub fn surface(&self) -> &OverlaySurface {
        &self.surface
    }

    /// Fetch (remote) or decode (embedded) the image, then draw.
    pub async fn load(&mut self, http: &reqwest::Client) -> Result<()> {
        let bytes = match self.source.decode_embedded() {
            Some(decoded) => decoded?,
            None => {
                let response = http
                    .get(self.source.as_str())
                    .send()
                    .await
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::transport("Image load", TransportError::Http(e)))?;
                response
                    .bytes()
                    .await
                    .map_err(|e| Error::transport("Image load", TransportError::Http(e)))?
                    .to_vec()
            }
        };
        self.load_from_bytes(&bytes)
    }

    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let image = image::load_from_memory(bytes)?;
        self.image_loaded(image);
        Ok(())
    }

    /// The load event.
    pub fn image_loaded(&mut self, image: DynamicImage) {
        debug!(
            width = image.width(),
            height = image.height(),
            source = %self.source,
            "image loaded"
        );
        self.image = Some(image);
        self.redraw();
    }

    /// Point at a different image. The overlay stays blank until it loads.
    pub fn set_source(&mut self, source: ImageReference) {
        if source == self.source {
            return;
        }
        self.source = source;
        self.image = None;
        self.redraw();
    }

    pub fn set_annotations(&mut self, annotations: AnnotationSet) {
        self.annotations = annotations;
        self.redraw();
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.annotations.label = label.into();
        self.redraw();
    }

    /// Layout change (container resize).
    pub fn relayout(&mut self, layout: Layout) {
        self.layout = layout;
        self.redraw();
    }

    /// Image scaled to its displayed size with the overlay on top.
    pub fn compose(&self) -> Option<RgbaImage> {
        self.image.as_ref().map(|img| compose(img, &self.surface))
    }

    fn redraw(&mut self) {
        let Some(size) = self.display_size() else {
            self.overlay = None;
            self.surface.clear(DisplaySize::new(0, 0));
            return;
        };
        let overlay = AnnotationOverlay::compute(&self.annotations, size, &self.font);
        self.surface.draw(&overlay, &self.font);
        debug!(
            width = size.width,
            height = size.height,
            boxes = overlay.box_count(),
            points = overlay.point_count(),
            "overlay redrawn"
        );
        self.overlay = Some(overlay);
    }
}
