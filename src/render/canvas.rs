//! Rasterization of an [`AnnotationOverlay`] onto a transparent RGBA surface.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_circle_mut, draw_hollow_rect_mut,
    draw_text_mut,
};
use imageproc::rect::Rect;

use super::geometry::{AnnotationOverlay, DisplaySize, LabelChip, OverlayShape, PixelPoint, PixelRect};
use super::label::LabelFont;
use super::style;

/// Transparent drawing surface sized to the displayed image.
#[derive(Debug, Clone)]
pub struct OverlaySurface {
    pixels: RgbaImage,
}

impl OverlaySurface {
    pub fn new(size: DisplaySize) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(size.width, size.height, style::TRANSPARENT),
        }
    }

    pub fn size(&self) -> DisplaySize {
        DisplaySize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Resize to `size` and wipe every pixel.
    pub fn clear(&mut self, size: DisplaySize) {
        if self.size() == size {
            for p in self.pixels.pixels_mut() {
                *p = style::TRANSPARENT;
            }
        } else {
            self.pixels = RgbaImage::from_pixel(size.width, size.height, style::TRANSPARENT);
        }
    }

    /// Clear, then draw every shape of `overlay`.
    pub fn draw(&mut self, overlay: &AnnotationOverlay, font: &LabelFont) {
        self.clear(overlay.size);
        if overlay.size.is_empty() {
            return;
        }
        for shape in &overlay.shapes {
            match shape {
                OverlayShape::Box { rect, chip, .. } => {
                    stroke_rect(&mut self.pixels, rect, style::BOX_COLOR, style::BOX_STROKE_WIDTH);
                    draw_chip(&mut self.pixels, chip, style::BOX_COLOR, font);
                }
                OverlayShape::Point { center, chip, .. } => {
                    draw_marker(&mut self.pixels, center);
                    draw_chip(&mut self.pixels, chip, style::POINT_COLOR, font);
                }
            }
        }
    }
}

/// Scale `base` to the surface size and lay the overlay on top.
pub fn compose(base: &DynamicImage, surface: &OverlaySurface) -> RgbaImage {
    let size = surface.size();
    let mut out = if (base.width(), base.height()) == (size.width, size.height) {
        base.to_rgba8()
    } else {
        imageops::resize(&base.to_rgba8(), size.width, size.height, FilterType::Triangle)
    };
    for (x, y, p) in surface.pixels().enumerate_pixels() {
        match p.0[3] {
            0 => {}
            255 => out.put_pixel(x, y, *p),
            _ => out.get_pixel_mut(x, y).blend(p),
        }
    }
    out
}

fn rect_from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Option<Rect> {
    if right > left && bottom > top {
        Some(Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32))
    } else {
        None
    }
}

/// Stroke centered on the rectangle edges, `width` pixels thick.
fn stroke_rect(img: &mut RgbaImage, rect: &PixelRect, color: Rgba<u8>, width: u32) {
    let (l, t) = (rect.left.round() as i32, rect.top.round() as i32);
    let (r, b) = (rect.right.round() as i32, rect.bottom.round() as i32);
    let width = width.max(1) as i32;
    let inner = -(width / 2);
    for inset in inner..inner + width {
        if let Some(ring) = rect_from_edges(l - inset, t - inset, r + inset, b + inset) {
            draw_hollow_rect_mut(img, ring, color);
        }
    }
}

fn draw_chip(img: &mut RgbaImage, chip: &LabelChip, fill: Rgba<u8>, font: &LabelFont) {
    let r = &chip.rect;
    if let Some(area) = rect_from_edges(
        r.left.round() as i32,
        r.top.round() as i32,
        r.right.round() as i32,
        r.bottom.round() as i32,
    ) {
        draw_filled_rect_mut(img, area, fill);
    }
    if let Some(font) = font.font() {
        draw_text_mut(
            img,
            style::TEXT_COLOR,
            chip.text_origin.x.round() as i32,
            chip.text_origin.y.round() as i32,
            chip.font_px,
            font,
            &chip.text,
        );
    }
}

fn draw_marker(img: &mut RgbaImage, center: &PixelPoint) {
    let c = (center.x.round() as i32, center.y.round() as i32);
    draw_filled_circle_mut(img, c, style::POINT_RADIUS, style::POINT_COLOR);
    for offset in 0..style::POINT_RING_WIDTH {
        draw_hollow_circle_mut(img, c, style::POINT_RADIUS + offset, style::RING_COLOR);
    }
    draw_filled_circle_mut(img, c, style::POINT_DOT_RADIUS, style::RING_COLOR);
}
