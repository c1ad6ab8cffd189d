//! Overlay geometry: normalized annotations mapped onto the displayed image.
//!
//! Everything here is pure data. Coordinates are in displayed pixels, i.e.
//! the size the image is shown at, not its intrinsic resolution.

use serde::{Deserialize, Serialize};

use super::label::LabelFont;
use super::style;
use crate::vision::{NormalizedBox, NormalizedPoint, VisionResult};

pub const DEFAULT_LABEL: &str = "object";

/// On-screen size of the image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySize {
    pub width: u32,
    pub height: u32,
}

impl DisplaySize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale `intrinsic` down (never up) to fit the layout bounds, keeping aspect ratio.
    pub fn fit(intrinsic: (u32, u32), layout: Layout) -> Self {
        let (w, h) = intrinsic;
        if w == 0 || h == 0 {
            return Self::new(0, 0);
        }
        let mut scale = 1.0f64;
        if let Some(max_w) = layout.max_width {
            scale = scale.min(max_w as f64 / w as f64);
        }
        if let Some(max_h) = layout.max_height {
            scale = scale.min(max_h as f64 / h as f64);
        }
        Self::new(
            ((w as f64 * scale).round() as u32).max(1),
            ((h as f64 * scale).round() as u32).max(1),
        )
    }
}

/// Layout bounds the image is displayed within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
}

impl Layout {
    pub fn unbounded() -> Self {
        Self {
            max_width: None,
            max_height: None,
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            max_width: None,
            max_height: Some(style::MAX_DISPLAY_HEIGHT),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PixelRect {
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Normalized box to displayed pixels. `None` for malformed boxes.
pub fn map_box(b: &NormalizedBox, size: DisplaySize) -> Option<PixelRect> {
    if !b.is_well_formed() {
        return None;
    }
    let (w, h) = (size.width as f64, size.height as f64);
    Some(PixelRect {
        left: (b.x_min * w) as f32,
        top: (b.y_min * h) as f32,
        right: (b.x_max * w) as f32,
        bottom: (b.y_max * h) as f32,
    })
}

/// Normalized point to displayed pixels. `None` for malformed points.
pub fn map_point(p: &NormalizedPoint, size: DisplaySize) -> Option<PixelPoint> {
    if !p.is_well_formed() {
        return None;
    }
    Some(PixelPoint {
        x: (p.x * size.width as f64) as f32,
        y: (p.y * size.height as f64) as f32,
    })
}

/// What to draw: boxes, points, and the label prefix.
///
/// Serialized as `{boundingBoxes?, points?, objectLabel?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSet {
    #[serde(rename = "boundingBoxes")]
    pub boxes: Vec<NormalizedBox>,
    pub points: Vec<NormalizedPoint>,
    #[serde(rename = "objectLabel")]
    pub label: String,
}

impl Default for AnnotationSet {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            points: Vec::new(),
            label: DEFAULT_LABEL.to_string(),
        }
    }
}

impl AnnotationSet {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_boxes(mut self, boxes: Vec<NormalizedBox>) -> Self {
        self.boxes = boxes;
        self
    }

    pub fn with_points(mut self, points: Vec<NormalizedPoint>) -> Self {
        self.points = points;
        self
    }

    /// Annotations carried by a detect or point result, labelled with the searched object.
    pub fn from_result(result: &VisionResult) -> Option<Self> {
        match result {
            VisionResult::Detect(d) => Some(Self::new(label_or_default(&d.object)).with_boxes(d.objects.clone())),
            VisionResult::Point(p) => Some(Self::new(label_or_default(&p.object)).with_points(p.points.clone())),
            VisionResult::Query(_) | VisionResult::Caption(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty() && self.points.is_empty()
    }
}

fn label_or_default(object: &str) -> &str {
    if object.trim().is_empty() {
        DEFAULT_LABEL
    } else {
        object
    }
}

/// Filled text chip next to a shape.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelChip {
    pub text: String,
    pub rect: PixelRect,
    /// Top-left of the text inside the chip.
    pub text_origin: PixelPoint,
    pub font_px: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayShape {
    Box {
        ordinal: usize,
        rect: PixelRect,
        chip: LabelChip,
    },
    Point {
        ordinal: usize,
        center: PixelPoint,
        chip: LabelChip,
    },
}

/// Render-time overlay, recomputed from scratch on every trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationOverlay {
    pub size: DisplaySize,
    pub shapes: Vec<OverlayShape>,
}

impl AnnotationOverlay {
    pub fn compute(annotations: &AnnotationSet, size: DisplaySize, font: &LabelFont) -> Self {
        let mut shapes = Vec::with_capacity(annotations.boxes.len() + annotations.points.len());
        if size.is_empty() {
            return Self { size, shapes };
        }

        for (index, b) in annotations.boxes.iter().enumerate() {
            let Some(rect) = map_box(b, size) else {
                continue;
            };
            let ordinal = index + 1;
            let text = format!("{} {}", annotations.label, ordinal);
            let (text_w, text_h) = font.measure(&text, style::BOX_FONT_PX);
            let chip_rect = PixelRect {
                left: rect.left,
                top: rect.top - style::BOX_CHIP_HEIGHT,
                right: rect.left + text_w as f32 + style::CHIP_PADDING,
                bottom: rect.top,
            };
            shapes.push(OverlayShape::Box {
                ordinal,
                rect,
                chip: LabelChip {
                    text,
                    text_origin: PixelPoint {
                        x: chip_rect.left + style::CHIP_PADDING / 2.0,
                        y: chip_rect.top + (style::BOX_CHIP_HEIGHT - text_h as f32).max(0.0) / 2.0,
                    },
                    rect: chip_rect,
                    font_px: style::BOX_FONT_PX,
                },
            });
        }

        for (index, p) in annotations.points.iter().enumerate() {
            let Some(center) = map_point(p, size) else {
                continue;
            };
            let ordinal = index + 1;
            let text = format!("{} {}", annotations.label, ordinal);
            let (text_w, text_h) = font.measure(&text, style::POINT_FONT_PX);
            let left = center.x + style::POINT_CHIP_OFFSET_X;
            let top = center.y - style::POINT_CHIP_OFFSET_Y;
            let chip_rect = PixelRect {
                left,
                top,
                right: left + text_w as f32 + style::CHIP_PADDING,
                bottom: top + style::POINT_CHIP_HEIGHT,
            };
            shapes.push(OverlayShape::Point {
                ordinal,
                center,
                chip: LabelChip {
                    text,
                    text_origin: PixelPoint {
                        x: left + style::CHIP_PADDING / 2.0,
                        y: top + (style::POINT_CHIP_HEIGHT - text_h as f32).max(0.0) / 2.0,
                    },
                    rect: chip_rect,
                    font_px: style::POINT_FONT_PX,
                },
            });
        }

        Self { size, shapes }
    }

    pub fn box_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, OverlayShape::Box { .. }))
            .count()
    }

    pub fn point_count(&self) -> usize {
        self.shapes
            .iter()
            .filter(|s| matches!(s, OverlayShape::Point { .. }))
            .count()
    }
}
