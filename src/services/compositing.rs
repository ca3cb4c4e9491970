//! Region-level drawing: outlines, pixelation, masks, progress bars, grids
//! and color palettes.
//!
//! `draw_*` and `pixelate_region` mutate the canvas they are given;
//! `draw_region_mask` and `grid` leave their inputs alone and return a new
//! buffer.

use image::imageops::{self, FilterType};
use image::{Rgb, Rgba};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::core::errors::{RenderingError, RenderingResult};
use crate::core::types::{Canvas, Color, Region, WHITE};
use crate::utils::image_ops::{
    blend_layer, blend_weighted, fill_region, safe_extract, safe_implant, transparent_layer,
};

/// Fraction of brightness removed by a full-strength mask
const MASK_FADE: f32 = 0.7;

// ============================================================================
// Color Tools
// ============================================================================

/// Parameters for [`generate_colors`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteOptions {
    pub saturation: f32,
    pub brightness: f32,
    pub hue_offset: f32,
    pub hue_range: f32,
}

impl Default for PaletteOptions {
    fn default() -> Self {
        Self {
            saturation: 1.0,
            brightness: 1.0,
            hue_offset: 0.0,
            hue_range: 1.0,
        }
    }
}

/// `n` colors spread evenly over `hue_range` of the HSV hue circle,
/// starting at `hue_offset`
pub fn generate_colors(n: usize, opts: &PaletteOptions) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let hue = opts.hue_offset + opts.hue_range * (i as f32 / n as f32);
            let (r, g, b) = hsv_to_rgb(hue, opts.saturation, opts.brightness);
            Rgb([to_channel(r), to_channel(g), to_channel(b)])
        })
        .collect()
}

fn to_channel(value: f32) -> u8 {
    (value * 255.0).clamp(0.0, 255.0) as u8
}

/// HSV to RGB, all components in [0, 1]; hue wraps around
fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

// ============================================================================
// Region Drawing Tools
// ============================================================================

/// Stroke each region's border, in place.
///
/// With `overlay`, strokes go onto a transparent scratch layer that is then
/// alpha-blended onto the canvas at `strength`. Otherwise the strokes are
/// drawn on a copy and the copy is mixed with the original at `strength`.
pub fn draw_regions(
    canvas: &mut Canvas,
    regions: &[Region],
    color: Color,
    thickness: u32,
    overlay: bool,
    strength: f32,
) {
    if overlay {
        let mut layer = transparent_layer(canvas);
        let ink = Rgba([color[0], color[1], color[2], 255]);
        for region in regions {
            stroke_thick(&mut layer, *region, ink, thickness);
        }
        blend_layer(canvas, &layer, strength);
    } else {
        let mut strokes = canvas.clone();
        for region in regions {
            stroke_thick(&mut strokes, *region, color, thickness);
        }
        *canvas = blend_weighted(canvas, &strokes, strength);
    }
}

/// Border of `thickness` pixels centred on the region's edges
fn stroke_thick<P>(image: &mut image::ImageBuffer<P, Vec<u8>>, region: Region, color: P, thickness: u32)
where
    P: image::Pixel<Subpixel = u8>,
{
    let thickness = thickness.max(1) as i32;
    let start = -(thickness / 2);
    for offset in start..start + thickness {
        let ring = region.padded(offset);
        if ring.is_degenerate() {
            continue;
        }
        let rect = Rect::at(ring.left, ring.top).of_size(ring.width() as u32, ring.height() as u32);
        draw_hollow_rect_mut(image, rect, color);
    }
}

/// Re-sample each region through a `blur_factor`-scaled thumbnail with
/// nearest-neighbor filtering, in place. Later regions win where they
/// overlap.
pub fn pixelate_region(canvas: &mut Canvas, regions: &[Region], blur_factor: f32) {
    for region in regions {
        if region.is_degenerate() {
            continue;
        }
        let target = safe_extract(canvas, *region);
        let (w, h) = target.dimensions();

        let pixel_w = ((w as f32 * blur_factor) as u32).max(1);
        let pixel_h = ((h as f32 * blur_factor) as u32).max(1);

        let small = imageops::resize(&target, pixel_w, pixel_h, FilterType::Nearest);
        let restored = imageops::resize(&small, w, h, FilterType::Nearest);
        safe_implant(canvas, &restored, *region);
    }
}

/// Darken a copy of the whole canvas and cut the original pixels of each
/// region back in (spotlight effect). Returns a new buffer.
pub fn draw_region_mask(canvas: &Canvas, regions: &[Region], strength: f32) -> Canvas {
    let fade = 1.0 - MASK_FADE * strength.clamp(0.0, 1.0);
    let mut dark = canvas.clone();
    for pixel in dark.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = (*channel as f32 * fade) as u8;
        }
    }

    for region in regions {
        let original = safe_extract(canvas, *region);
        safe_implant(&mut dark, &original, *region);
    }
    dark
}

// ============================================================================
// Progress (or custom) Bars
// ============================================================================

/// Draw a bar frame across the full track, then the `progress` fill, in place
#[allow(clippy::too_many_arguments)]
pub fn draw_bar(
    canvas: &mut Canvas,
    progress: f32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    frame_color: Color,
    bar_color: Color,
) {
    draw_bar_segment(canvas, 0.0, 1.0, x, y, width, height, frame_color);
    draw_bar_segment(canvas, 0.0, progress, x, y, width, height, bar_color);
}

/// Fill the `[start, end]` fraction of a `width`-wide track whose top-left
/// corner is (x, y), in place. Zero-width segments draw nothing.
#[allow(clippy::too_many_arguments)]
pub fn draw_bar_segment(
    canvas: &mut Canvas,
    start: f32,
    end: f32,
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    color: Color,
) {
    let fraction = (end - start).max(0.0);
    let segment_width = (width as f32 * fraction).round() as i32;
    if segment_width <= 0 || height <= 0 {
        return;
    }
    let segment_x = x + (start * width as f32) as i32;
    fill_region(canvas, Region::from_origin(segment_x, y, segment_width, height), color, 1.0);
}

// ============================================================================
// Image Arrangement
// ============================================================================

/// Parameters for [`grid`]
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub n_columns: Option<u32>,
    pub n_rows: Option<u32>,
    /// Cell (width, height); defaults to the first image's size
    pub image_size: Option<(u32, u32)>,
    pub bg_color: Color,
    pub inner_x_pad: u32,
    pub inner_y_pad: u32,
    pub outer_pad: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            n_columns: None,
            n_rows: None,
            image_size: None,
            bg_color: WHITE,
            inner_x_pad: 5,
            inner_y_pad: 5,
            outer_pad: 15,
        }
    }
}

/// (columns, rows) for `count` images given optional hints
pub fn grid_shape(count: usize, n_columns: Option<u32>, n_rows: Option<u32>) -> (u32, u32) {
    let count = count as u32;
    let n_columns = n_columns.filter(|c| *c > 0);
    let n_rows = n_rows.filter(|r| *r > 0);
    match (n_columns, n_rows) {
        (Some(columns), Some(rows)) => (columns, rows),
        (Some(columns), None) => (columns, count.div_ceil(columns)),
        (None, Some(rows)) => (count.div_ceil(rows), rows),
        (None, None) => {
            let side = (count as f64).sqrt().ceil() as u32;
            (side, side)
        }
    }
}

/// Tile `images` into a new canvas, stretching each to the cell size.
/// Images beyond `rows * columns` are dropped.
pub fn grid(images: &[Canvas], opts: &GridOptions) -> RenderingResult<Canvas> {
    let first = images.first().ok_or(RenderingError::EmptyGrid)?;
    let (cell_w, cell_h) = opts.image_size.unwrap_or_else(|| first.dimensions());
    if cell_w == 0 || cell_h == 0 {
        return Err(RenderingError::InvalidCellSize {
            width: cell_w,
            height: cell_h,
        });
    }

    let (columns, rows) = grid_shape(images.len(), opts.n_columns, opts.n_rows);
    let width = 2 * opts.outer_pad + columns * (cell_w + opts.inner_x_pad) - opts.inner_x_pad;
    let height = 2 * opts.outer_pad + rows * (cell_h + opts.inner_y_pad) - opts.inner_y_pad;
    debug!("Grid {}x{} cells of {}x{} -> {}x{}", columns, rows, cell_w, cell_h, width, height);

    let mut output = Canvas::from_pixel(width, height, opts.bg_color);
    let capacity = (columns * rows) as usize;
    if images.len() > capacity {
        debug!("Grid holds {} images, dropping {}", capacity, images.len() - capacity);
    }

    for (i, image) in images.iter().take(capacity).enumerate() {
        let row = i as u32 / columns;
        let col = i as u32 % columns;

        let resized = if image.dimensions() == (cell_w, cell_h) {
            image.clone()
        } else {
            imageops::resize(image, cell_w, cell_h, FilterType::Triangle)
        };
        let x = col * (cell_w + opts.inner_x_pad) + opts.outer_pad;
        let y = row * (cell_h + opts.inner_y_pad) + opts.outer_pad;
        imageops::replace(&mut output, &resized, x as i64, y as i64);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK_PX: Color = Rgb([0, 0, 0]);
    const ORANGE: Color = Rgb([0, 150, 255]);

    fn canvas_and_regions() -> (Canvas, Vec<Region>) {
        let canvas = Canvas::from_fn(500, 500, |x, y| Rgb([(x % 200) as u8 + 20, (y % 200) as u8 + 20, 120]));
        let regions = vec![
            Region::new(50, 100, 50, 100),
            Region::new(-10, 10, -10, 10),
            Region::new(450, 550, 50, 100),
            Region::new(50, 100, 450, 550),
            Region::new(-10, 510, -10, 510),
        ];
        (canvas, regions)
    }

    #[test]
    fn test_generate_colors_count() {
        for n in [5, 10, 500] {
            assert_eq!(generate_colors(n, &PaletteOptions::default()).len(), n);
        }
        assert!(generate_colors(0, &PaletteOptions::default()).is_empty());
    }

    #[test]
    fn test_generate_colors_parameters() {
        let control = generate_colors(5, &PaletteOptions::default());
        let normal = generate_colors(5, &PaletteOptions::default());
        let faded = generate_colors(5, &PaletteOptions { saturation: 0.5, ..Default::default() });
        let dark = generate_colors(5, &PaletteOptions { brightness: 0.5, ..Default::default() });
        let range = generate_colors(5, &PaletteOptions { hue_range: 0.3, ..Default::default() });
        let range_offset = generate_colors(5, &PaletteOptions { hue_range: 0.3, hue_offset: 0.2, ..Default::default() });

        assert_eq!(control, normal);
        assert_ne!(control, faded);
        assert_ne!(control, dark);
        assert_ne!(control, range);
        assert_ne!(range, range_offset);
    }

    #[test]
    fn test_generate_colors_hues() {
        let colors = generate_colors(3, &PaletteOptions::default());
        assert_eq!(colors[0], Rgb([255, 0, 0]));
        assert_eq!(colors[1], Rgb([0, 255, 0]));
        assert_eq!(colors[2], Rgb([0, 0, 255]));
    }

    #[test]
    fn test_draw_regions_direct_and_overlay() {
        let (canvas, regions) = canvas_and_regions();

        let mut direct = canvas.clone();
        draw_regions(&mut direct, &regions, WHITE, 2, false, 1.0);
        assert_eq!(*direct.get_pixel(50, 75), WHITE);
        assert_eq!(direct.get_pixel(75, 75), canvas.get_pixel(75, 75));

        let mut overlaid = canvas.clone();
        draw_regions(&mut overlaid, &regions, Rgb([255, 0, 0]), 2, true, 1.0);
        assert_eq!(*overlaid.get_pixel(50, 75), Rgb([255, 0, 0]));
        assert_eq!(overlaid.get_pixel(75, 75), canvas.get_pixel(75, 75));
    }

    #[test]
    fn test_draw_regions_strength_blends() {
        let mut canvas = Canvas::from_pixel(100, 100, Rgb([0, 0, 0]));
        draw_regions(&mut canvas, &[Region::new(10, 50, 10, 50)], Rgb([200, 200, 200]), 1, true, 0.5);
        assert_eq!(*canvas.get_pixel(10, 30), Rgb([100, 100, 100]));

        let mut canvas = Canvas::from_pixel(100, 100, Rgb([0, 0, 0]));
        draw_regions(&mut canvas, &[Region::new(10, 50, 10, 50)], Rgb([200, 200, 200]), 1, false, 0.0);
        assert!(canvas.pixels().all(|p| *p == BLACK_PX));
    }

    #[test]
    fn test_pixelate_region_makes_blocks() {
        let (mut canvas, regions) = canvas_and_regions();
        let original = canvas.clone();
        pixelate_region(&mut canvas, &regions[..1], 0.1);

        // 50px region at factor 0.1 -> 5x5 thumbnail -> 10px blocks
        let block = *canvas.get_pixel(50, 50);
        assert!((50..60).all(|x| *canvas.get_pixel(x, 55) == block));
        assert_ne!(canvas, original);
        assert_eq!(canvas.get_pixel(150, 150), original.get_pixel(150, 150));
    }

    #[test]
    fn test_pixelate_handles_odd_regions() {
        let (mut canvas, regions) = canvas_and_regions();
        pixelate_region(&mut canvas, &regions, 0.1);
        pixelate_region(&mut canvas, &[Region::new(30, 10, 0, 5)], 0.1);
        assert_eq!(canvas.dimensions(), (500, 500));
    }

    #[test]
    fn test_region_mask_keeps_regions_bright() {
        let (canvas, regions) = canvas_and_regions();
        let masked = draw_region_mask(&canvas, &regions[..1], 1.0);

        assert_eq!(masked.get_pixel(75, 75), canvas.get_pixel(75, 75));
        let original = canvas.get_pixel(200, 200);
        let darkened = masked.get_pixel(200, 200);
        assert_eq!(darkened[0], (original[0] as f32 * (1.0 - MASK_FADE)) as u8);
        // input is untouched
        assert_eq!(canvas, canvas_and_regions().0);
    }

    #[test]
    fn test_region_mask_with_all_regions() {
        let (canvas, regions) = canvas_and_regions();
        // the last region covers everything, so nothing stays dark
        assert_eq!(draw_region_mask(&canvas, &regions, 1.0), canvas);
    }

    #[test]
    fn test_bar_segment_zero_width_draws_nothing() {
        let mut canvas = Canvas::new(200, 50);
        draw_bar_segment(&mut canvas, 0.0, 0.0, 10, 10, 100, 20, ORANGE);
        assert!(canvas.pixels().all(|p| *p == BLACK_PX));

        draw_bar_segment(&mut canvas, 0.6, 0.4, 10, 10, 100, 20, ORANGE);
        assert!(canvas.pixels().all(|p| *p == BLACK_PX));
    }

    #[test]
    fn test_bar_segment_full_track() {
        let mut canvas = Canvas::new(200, 50);
        draw_bar_segment(&mut canvas, 0.0, 1.0, 10, 10, 100, 20, ORANGE);
        assert_eq!(*canvas.get_pixel(10, 10), ORANGE);
        assert_eq!(*canvas.get_pixel(109, 29), ORANGE);
        assert_eq!(*canvas.get_pixel(110, 10), BLACK_PX);
        assert_eq!(*canvas.get_pixel(9, 10), BLACK_PX);
    }

    #[test]
    fn test_bar_segment_partial() {
        let mut canvas = Canvas::new(200, 50);
        draw_bar_segment(&mut canvas, 0.25, 0.75, 0, 0, 100, 10, ORANGE);
        assert_eq!(*canvas.get_pixel(24, 5), BLACK_PX);
        assert_eq!(*canvas.get_pixel(25, 5), ORANGE);
        assert_eq!(*canvas.get_pixel(74, 5), ORANGE);
        assert_eq!(*canvas.get_pixel(75, 5), BLACK_PX);
    }

    #[test]
    fn test_draw_bar_frame_and_progress() {
        let frame = Rgb([10, 10, 10]);
        let mut canvas = Canvas::new(200, 200);
        draw_bar(&mut canvas, 0.5, 10, 100, 100, 20, frame, ORANGE);
        assert_eq!(*canvas.get_pixel(20, 110), ORANGE);
        assert_eq!(*canvas.get_pixel(80, 110), frame);

        let mut empty = Canvas::new(200, 200);
        draw_bar(&mut empty, 0.0, 10, 100, 100, 20, frame, ORANGE);
        assert_eq!(*empty.get_pixel(20, 110), frame);
    }

    fn colored_tiles(n: usize) -> Vec<Canvas> {
        generate_colors(n, &PaletteOptions::default())
            .into_iter()
            .map(|color| Canvas::from_pixel(50, 50, color))
            .collect()
    }

    #[test]
    fn test_grid_shape_hints() {
        assert_eq!(grid_shape(16, None, None), (4, 4));
        assert_eq!(grid_shape(16, None, Some(2)), (8, 2));
        assert_eq!(grid_shape(16, Some(3), None), (3, 6));
        assert_eq!(grid_shape(16, Some(2), Some(2)), (2, 2));
        assert_eq!(grid_shape(17, None, None), (5, 5));
    }

    #[test]
    fn test_grid_default_square() {
        let tiles = colored_tiles(16);
        let output = grid(&tiles, &GridOptions::default()).unwrap();

        // 2*15 + 4*(50+5) - 5
        assert_eq!(output.dimensions(), (245, 245));
        assert_eq!(output.get_pixel(15, 15), tiles[0].get_pixel(0, 0));
        assert_eq!(output.get_pixel(15 + 3 * 55, 15 + 3 * 55), tiles[15].get_pixel(0, 0));
        assert_eq!(*output.get_pixel(67, 20), WHITE);
    }

    #[test]
    fn test_grid_two_rows() {
        let tiles = colored_tiles(16);
        let output = grid(&tiles, &GridOptions { n_rows: Some(2), ..Default::default() }).unwrap();
        assert_eq!(output.dimensions(), (2 * 15 + 8 * 55 - 5, 2 * 15 + 2 * 55 - 5));
    }

    #[test]
    fn test_grid_truncates_overflow() {
        let tiles = colored_tiles(16);
        let opts = GridOptions {
            n_rows: Some(2),
            n_columns: Some(2),
            ..Default::default()
        };
        let output = grid(&tiles, &opts).unwrap();
        assert_eq!(output.dimensions(), (135, 135));
        assert_eq!(output.get_pixel(70, 70), tiles[3].get_pixel(0, 0));
    }

    #[test]
    fn test_grid_resizes_to_cell() {
        let tiles = colored_tiles(16);
        let opts = GridOptions {
            image_size: Some((15, 15)),
            inner_x_pad: 10,
            inner_y_pad: 0,
            outer_pad: 15,
            bg_color: Rgb([30, 30, 30]),
            ..Default::default()
        };
        let output = grid(&tiles, &opts).unwrap();
        assert_eq!(output.dimensions(), (30 + 4 * 25 - 10, 30 + 4 * 15));
        assert_eq!(output.get_pixel(15, 15), tiles[0].get_pixel(0, 0));
        assert_eq!(*output.get_pixel(32, 15), Rgb([30, 30, 30]));
    }

    #[test]
    fn test_grid_rejects_empty_input() {
        assert!(matches!(grid(&[], &GridOptions::default()), Err(RenderingError::EmptyGrid)));
    }
}
