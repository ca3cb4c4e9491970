// Shared value types for region addressing, alignment and text treatment

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

/// Canvas type used by every drawing operation (H x W x 3, 8-bit)
pub type Canvas = RgbImage;

/// RGB color triple
pub type Color = Rgb<u8>;

pub const BLACK: Color = Rgb([0, 0, 0]);
pub const WHITE: Color = Rgb([255, 255, 255]);

/// Axis-aligned rectangle in pixel coordinates.
///
/// Nothing forces `right >= left` or `bottom >= top`; consumers must treat
/// inverted and out-of-bounds regions as valid input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Region {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Region {
    pub const fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Region covering a whole canvas of the given size
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, width as i32, 0, height as i32)
    }

    /// Region of `width` x `height` whose top-left corner is (x, y)
    pub fn from_origin(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, x.saturating_add(width), y, y.saturating_add(height))
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn x_center(&self) -> i32 {
        midpoint(self.left, self.right)
    }

    pub fn y_center(&self) -> i32 {
        midpoint(self.top, self.bottom)
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x_center(), self.y_center())
    }

    /// True when the region covers no pixels
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Grow (or shrink, for negative `pad`) by `pad` pixels on every side
    pub fn padded(&self, pad: i32) -> Self {
        Self::new(
            self.left.saturating_sub(pad),
            self.right.saturating_add(pad),
            self.top.saturating_sub(pad),
            self.bottom.saturating_add(pad),
        )
    }
}

/// Rounds toward zero like `(a + b) / 2`, without overflowing
fn midpoint(a: i32, b: i32) -> i32 {
    ((a as i64 + b as i64) / 2) as i32
}

/// Horizontal alignment tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical alignment tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// How a text background (or, for overlay, the glyphs themselves) is put
/// onto the canvas
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    /// Solid fill, replaces what is underneath
    #[default]
    Opaque,
    /// Background fill blended with the canvas at the given opacity
    Semi(f32),
    /// No background box; glyph pixels are blended at the given opacity
    Overlay(f32),
}

impl BlendMode {
    /// Opacity applied to the background fill, `None` when no fill is drawn
    pub fn background_opacity(&self) -> Option<f32> {
        match *self {
            BlendMode::Opaque => Some(1.0),
            BlendMode::Semi(opacity) => Some(opacity.clamp(0.0, 1.0)),
            BlendMode::Overlay(_) => None,
        }
    }

    /// Opacity applied to the glyph pixels
    pub fn text_opacity(&self) -> f32 {
        match *self {
            BlendMode::Overlay(opacity) => opacity.clamp(0.0, 1.0),
            _ => 1.0,
        }
    }
}
