//! Annotation renderer.
//!
//! Turns normalized detect/point results into a pixel overlay aligned to the
//! image's displayed size:
//!
//! - [`geometry`]: normalized → displayed pixel mapping and overlay layout
//! - [`canvas`]: rasterization onto a transparent RGBA surface
//! - [`annotated`]: the image + overlay component with its redraw triggers
//!
//! ```rust
//! use senpai_vision::render::{AnnotationOverlay, AnnotationSet, DisplaySize, LabelFont, OverlaySurface};
//! use senpai_vision::vision::NormalizedBox;
//!
//! let set = AnnotationSet::new("cat").with_boxes(vec![NormalizedBox::new(0.25, 0.25, 0.75, 0.75)]);
//! let size = DisplaySize::new(400, 200);
//! let font = LabelFont::none();
//! let overlay = AnnotationOverlay::compute(&set, size, &font);
//! let mut surface = OverlaySurface::new(size);
//! surface.draw(&overlay, &font);
//! assert_eq!(overlay.box_count(), 1);
//! ```

pub mod annotated;
pub mod canvas;
pub mod geometry;
mod label;
pub mod style;

pub use annotated::AnnotatedImage;
pub use canvas::{compose, OverlaySurface};
pub use geometry::{
    map_box, map_point, AnnotationOverlay, AnnotationSet, DisplaySize, LabelChip, Layout,
    OverlayShape, PixelPoint, PixelRect, DEFAULT_LABEL,
};
pub use label::LabelFont;
