//! Overlay colors and metrics.

use image::Rgba;

pub const BOX_COLOR: Rgba<u8> = Rgba([0x10, 0xb9, 0x81, 0xff]);
pub const POINT_COLOR: Rgba<u8> = Rgba([0xef, 0x44, 0x44, 0xff]);
pub const TEXT_COLOR: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
pub const RING_COLOR: Rgba<u8> = Rgba([0xff, 0xff, 0xff, 0xff]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

pub const BOX_STROKE_WIDTH: u32 = 3;
pub const BOX_FONT_PX: f32 = 14.0;
pub const BOX_CHIP_HEIGHT: f32 = 20.0;

pub const POINT_RADIUS: i32 = 8;
pub const POINT_RING_WIDTH: i32 = 2;
pub const POINT_DOT_RADIUS: i32 = 3;
pub const POINT_FONT_PX: f32 = 12.0;
pub const POINT_CHIP_HEIGHT: f32 = 18.0;
pub const POINT_CHIP_OFFSET_X: f32 = 12.0;
pub const POINT_CHIP_OFFSET_Y: f32 = 10.0;

/// Horizontal padding inside a chip, split evenly left and right.
pub const CHIP_PADDING: f32 = 8.0;

pub const MAX_DISPLAY_HEIGHT: u32 = 500;
