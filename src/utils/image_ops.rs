//! Bounds-safe pixel helpers shared by the text and compositing services.
//!
//! Extraction and implanting clip each axis independently: the part of a
//! region that lies on the canvas is copied, everything else is padded with
//! black (extract) or dropped (implant). Nothing here panics on regions that
//! are inverted, empty or entirely off-canvas.

use image::{imageops, Rgb, RgbImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use crate::core::types::Region;

/// Clipped span of one axis of a region against `[0, bound)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeBounds {
    pub safe_near: i32,
    pub safe_far: i32,
    /// How far `near` sticks out before 0
    pub near_excess: i32,
    /// How far `far` sticks out past `bound`
    pub far_excess: i32,
}

impl SafeBounds {
    pub fn new(near: i32, far: i32, bound: u32) -> Self {
        let bound = bound.min(i32::MAX as u32) as i32;
        let safe_near = near.max(0);
        let safe_far = far.min(bound);
        Self {
            safe_near,
            safe_far,
            near_excess: safe_near.saturating_sub(near),
            far_excess: far.saturating_sub(safe_far),
        }
    }

    /// Length of the in-bounds span, zero when there is none
    pub fn span(&self) -> u32 {
        self.safe_far.saturating_sub(self.safe_near).max(0) as u32
    }
}

/// Copy `region` out of `canvas` into a new buffer of the region's size.
///
/// Off-canvas parts of the region come back black. Degenerate regions give a
/// zero-area image.
pub fn safe_extract(canvas: &RgbImage, region: Region) -> RgbImage {
    let out_w = region.width().max(0) as u32;
    let out_h = region.height().max(0) as u32;
    let mut output = RgbImage::new(out_w, out_h);
    if out_w == 0 || out_h == 0 {
        return output;
    }

    let xb = SafeBounds::new(region.left, region.right, canvas.width());
    let yb = SafeBounds::new(region.top, region.bottom, canvas.height());
    if xb.span() == 0 || yb.span() == 0 {
        return output;
    }

    let valid = imageops::crop_imm(
        canvas,
        xb.safe_near as u32,
        yb.safe_near as u32,
        xb.span(),
        yb.span(),
    )
    .to_image();
    imageops::replace(
        &mut output,
        &valid,
        xb.near_excess as i64,
        yb.near_excess as i64,
    );
    output
}

/// Write `src` into `dst` at `region`, in place.
///
/// `src` is expected to be the region's size (normally it came from
/// [`safe_extract`] with the same region). Pixels that would land outside
/// `dst` are skipped.
pub fn safe_implant(dst: &mut RgbImage, src: &RgbImage, region: Region) {
    let xb = SafeBounds::new(region.left, region.right, dst.width());
    let yb = SafeBounds::new(region.top, region.bottom, dst.height());
    if xb.span() == 0 || yb.span() == 0 {
        return;
    }

    let valid = imageops::crop_imm(
        src,
        xb.near_excess as u32,
        yb.near_excess as u32,
        xb.span(),
        yb.span(),
    )
    .to_image();
    imageops::replace(dst, &valid, xb.safe_near as i64, yb.safe_near as i64);
}

pub fn safe_extract_coords(canvas: &RgbImage, left: i32, right: i32, top: i32, bottom: i32) -> RgbImage {
    safe_extract(canvas, Region::new(left, right, top, bottom))
}

pub fn safe_implant_coords(
    dst: &mut RgbImage,
    src: &RgbImage,
    left: i32,
    right: i32,
    top: i32,
    bottom: i32,
) {
    safe_implant(dst, src, Region::new(left, right, top, bottom))
}

/// Linear interpolation `over * opacity + under * (1 - opacity)` per channel
pub fn blend_pixel(under: Rgb<u8>, over: Rgb<u8>, opacity: f32) -> Rgb<u8> {
    let opacity = opacity.clamp(0.0, 1.0);
    let inv = 1.0 - opacity;
    Rgb([
        (over[0] as f32 * opacity + under[0] as f32 * inv).round() as u8,
        (over[1] as f32 * opacity + under[1] as f32 * inv).round() as u8,
        (over[2] as f32 * opacity + under[2] as f32 * inv).round() as u8,
    ])
}

/// Fill `region` with `color` at `opacity`, in place, clipped to the canvas
pub fn fill_region(canvas: &mut RgbImage, region: Region, color: Rgb<u8>, opacity: f32) {
    if region.is_degenerate() || opacity <= 0.0 {
        return;
    }

    if opacity >= 1.0 {
        let rect = Rect::at(region.left, region.top)
            .of_size(region.width() as u32, region.height() as u32);
        draw_filled_rect_mut(canvas, rect, color);
        return;
    }

    let xb = SafeBounds::new(region.left, region.right, canvas.width());
    let yb = SafeBounds::new(region.top, region.bottom, canvas.height());
    for y in yb.safe_near..yb.safe_far {
        for x in xb.safe_near..xb.safe_far {
            let pixel = canvas.get_pixel_mut(x as u32, y as u32);
            *pixel = blend_pixel(*pixel, color, opacity);
        }
    }
}

/// Stroke a 1px outline along the inside of `region`, in place
pub fn stroke_region(canvas: &mut RgbImage, region: Region, color: Rgb<u8>) {
    if region.is_degenerate() {
        return;
    }
    let rect = Rect::at(region.left, region.top)
        .of_size(region.width() as u32, region.height() as u32);
    draw_hollow_rect_mut(canvas, rect, color);
}

/// Blend an RGBA layer onto `base` (same size), scaling layer alpha by
/// `strength`. Pixels with zero alpha leave `base` untouched.
pub fn blend_layer(base: &mut RgbImage, layer: &RgbaImage, strength: f32) {
    let strength = strength.clamp(0.0, 1.0);
    for (x, y, over) in layer.enumerate_pixels() {
        let alpha = over[3] as f32 / 255.0 * strength;
        if alpha <= 0.0 || x >= base.width() || y >= base.height() {
            continue;
        }
        let pixel = base.get_pixel_mut(x, y);
        *pixel = blend_pixel(*pixel, Rgb([over[0], over[1], over[2]]), alpha);
    }
}

/// Weighted mix of two equal-sized buffers: `base * (1 - strength) + other * strength`
pub fn blend_weighted(base: &RgbImage, other: &RgbImage, strength: f32) -> RgbImage {
    let mut output = base.clone();
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        if x < other.width() && y < other.height() {
            *pixel = blend_pixel(*pixel, *other.get_pixel(x, y), strength);
        }
    }
    output
}

/// Transparent scratch layer matching `canvas`
pub fn transparent_layer(canvas: &RgbImage) -> RgbaImage {
    RgbaImage::from_pixel(canvas.width(), canvas.height(), Rgba([0, 0, 0, 0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 500x500 canvas where every pixel encodes its own position
    fn gradient_canvas() -> RgbImage {
        RgbImage::from_fn(500, 500, |x, y| Rgb([(x % 251) as u8 + 1, (y % 251) as u8 + 1, 200]))
    }

    #[test]
    fn test_safe_bounds_per_axis() {
        let inside = SafeBounds::new(10, 20, 100);
        assert_eq!(inside, SafeBounds { safe_near: 10, safe_far: 20, near_excess: 0, far_excess: 0 });

        let overhang = SafeBounds::new(-10, 110, 100);
        assert_eq!(overhang.safe_near, 0);
        assert_eq!(overhang.safe_far, 100);
        assert_eq!(overhang.near_excess, 10);
        assert_eq!(overhang.far_excess, 10);
        assert_eq!(overhang.span(), 100);

        assert_eq!(SafeBounds::new(150, 200, 100).span(), 0);
        assert_eq!(SafeBounds::new(-50, -10, 100).span(), 0);
    }

    #[test]
    fn test_round_trip_inside_region_is_identity() {
        let original = gradient_canvas();
        let region = Region::new(50, 100, 50, 100);

        let extracted = safe_extract(&original, region);
        assert_eq!(extracted.dimensions(), (50, 50));
        assert_eq!(extracted.get_pixel(0, 0), original.get_pixel(50, 50));

        let mut copy = original.clone();
        safe_implant(&mut copy, &extracted, region);
        assert_eq!(copy, original);
    }

    #[test]
    fn test_implant_leaves_outside_pixels_alone() {
        let mut canvas = gradient_canvas();
        let region = Region::new(10, 20, 10, 20);
        let patch = RgbImage::from_pixel(10, 10, Rgb([9, 9, 9]));
        let before = canvas.clone();

        safe_implant(&mut canvas, &patch, region);

        for (x, y, pixel) in canvas.enumerate_pixels() {
            let inside = (10..20).contains(&x) && (10..20).contains(&y);
            if inside {
                assert_eq!(*pixel, Rgb([9, 9, 9]));
            } else {
                assert_eq!(pixel, before.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_fully_outside_region() {
        let canvas = gradient_canvas();
        let region = Region::new(600, 650, -80, -40);

        let extracted = safe_extract(&canvas, region);
        assert_eq!(extracted.dimensions(), (50, 40));
        assert!(extracted.pixels().all(|p| *p == Rgb([0, 0, 0])));

        let mut copy = canvas.clone();
        safe_implant(&mut copy, &RgbImage::from_pixel(50, 40, Rgb([255, 0, 0])), region);
        assert_eq!(copy, canvas);
    }

    #[test]
    fn test_partial_overlap_top_left_corner() {
        let canvas = gradient_canvas();
        let extracted = safe_extract(&canvas, Region::new(-10, 10, -10, 10));
        assert_eq!(extracted.dimensions(), (20, 20));

        for (x, y, pixel) in extracted.enumerate_pixels() {
            if x < 10 || y < 10 {
                assert_eq!(*pixel, Rgb([0, 0, 0]), "padding at ({x}, {y})");
            } else {
                assert_eq!(pixel, canvas.get_pixel(x - 10, y - 10));
            }
        }
    }

    #[test]
    fn test_partial_overlap_implant_clips_at_edge() {
        let mut canvas = RgbImage::new(100, 100);
        let patch = RgbImage::from_pixel(20, 20, Rgb([7, 8, 9]));
        safe_implant(&mut canvas, &patch, Region::new(90, 110, 90, 110));

        assert_eq!(*canvas.get_pixel(99, 99), Rgb([7, 8, 9]));
        assert_eq!(*canvas.get_pixel(90, 90), Rgb([7, 8, 9]));
        assert_eq!(*canvas.get_pixel(89, 89), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_degenerate_regions_are_zero_area() {
        let canvas = gradient_canvas();
        assert_eq!(safe_extract(&canvas, Region::new(20, 10, 0, 10)).dimensions(), (0, 10));
        assert_eq!(safe_extract(&canvas, Region::new(0, 10, 5, 5)).dimensions(), (10, 0));

        let mut copy = canvas.clone();
        safe_implant(&mut copy, &RgbImage::new(0, 0), Region::new(20, 10, 30, 10));
        assert_eq!(copy, canvas);
    }

    #[test]
    fn test_extreme_inverted_regions_do_not_panic() {
        let canvas = RgbImage::new(10, 10);
        assert_eq!(safe_extract(&canvas, Region::new(5, i32::MIN, 0, 5)).dimensions(), (0, 5));
        assert_eq!(safe_extract(&canvas, Region::new(0, 5, i32::MAX, i32::MIN)).dimensions(), (5, 0));

        let far_left = safe_extract(&canvas, Region::new(i32::MIN, i32::MIN + 10, 0, 5));
        assert_eq!(far_left.dimensions(), (10, 5));
        assert!(far_left.pixels().all(|p| *p == Rgb([0, 0, 0])));

        let bounds = SafeBounds::new(i32::MIN, 0, 10);
        assert_eq!(bounds.near_excess, i32::MAX);
        assert_eq!(bounds.span(), 0);
        assert_eq!(SafeBounds::new(i32::MAX, i32::MIN, 10).span(), 0);

        let mut copy = canvas.clone();
        safe_implant(&mut copy, &RgbImage::new(4, 5), Region::new(i32::MIN, 0, 0, 5));
        safe_implant(&mut copy, &RgbImage::new(4, 5), Region::new(5, i32::MIN, 0, 5));
        assert_eq!(copy, canvas);
    }

    #[test]
    fn test_region_covering_more_than_canvas() {
        let canvas = gradient_canvas();
        let region = Region::new(-10, 510, -10, 510);
        let extracted = safe_extract_coords(&canvas, -10, 510, -10, 510);
        assert_eq!(extracted.dimensions(), (520, 520));
        assert_eq!(extracted.get_pixel(10, 10), canvas.get_pixel(0, 0));
        assert_eq!(*extracted.get_pixel(519, 519), Rgb([0, 0, 0]));

        let mut copy = RgbImage::new(500, 500);
        safe_implant(&mut copy, &extracted, region);
        assert_eq!(copy, canvas);
    }

    #[test]
    fn test_blend_pixel_interpolates() {
        let under = Rgb([0, 100, 200]);
        let over = Rgb([200, 100, 0]);
        assert_eq!(blend_pixel(under, over, 0.0), under);
        assert_eq!(blend_pixel(under, over, 1.0), over);
        assert_eq!(blend_pixel(under, over, 0.5), Rgb([100, 100, 100]));
    }

    #[test]
    fn test_fill_region_semi_transparent() {
        let mut canvas = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        fill_region(&mut canvas, Region::new(-5, 5, -5, 5), Rgb([200, 200, 200]), 0.5);
        assert_eq!(*canvas.get_pixel(0, 0), Rgb([100, 100, 100]));
        assert_eq!(*canvas.get_pixel(4, 4), Rgb([100, 100, 100]));
        assert_eq!(*canvas.get_pixel(5, 5), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_stroke_region_only_touches_border() {
        let mut canvas = RgbImage::new(20, 20);
        stroke_region(&mut canvas, Region::new(2, 12, 2, 12), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(2, 2), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(11, 7), Rgb([255, 255, 255]));
        assert_eq!(*canvas.get_pixel(6, 6), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(12, 12), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_blend_layer_skips_transparent_pixels() {
        let mut base = RgbImage::from_pixel(4, 4, Rgb([10, 10, 10]));
        let mut layer = transparent_layer(&base);
        layer.put_pixel(1, 1, Rgba([210, 210, 210, 255]));

        blend_layer(&mut base, &layer, 0.5);
        assert_eq!(*base.get_pixel(1, 1), Rgb([110, 110, 110]));
        assert_eq!(*base.get_pixel(0, 0), Rgb([10, 10, 10]));
    }
}
