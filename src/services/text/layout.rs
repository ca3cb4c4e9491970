//! Text placement math.
//!
//! Everything here is a pure function of its inputs plus font metrics read
//! through the [`FontManager`]; nothing touches a canvas.

use tracing::{debug, warn};

use crate::core::errors::FontResult;
use crate::core::types::{HAlign, Region, VAlign};
use crate::services::font_manager::{FontFace, FontHandle, FontManager, FONT_ICON};

/// Bounding box (width, height) of `text` for `font`
pub fn measure(text: &str, font: &dyn FontFace) -> (u32, u32) {
    font.measure(text)
}

/// Top-left origin for a box of `size` aligned against the point (x, y).
///
/// Left/Top push the box `pad` pixels away from the point, Right/Bottom pull
/// its far edge `pad` pixels short of it. Center ignores `pad` on that axis.
pub fn anchor_at_point(
    size: (u32, u32),
    x: i32,
    y: i32,
    h_align: HAlign,
    v_align: VAlign,
    pad: i32,
) -> (i32, i32) {
    let (width, height) = (size.0 as i32, size.1 as i32);

    let origin_x = match h_align {
        HAlign::Left => x + pad,
        HAlign::Center => x - width / 2,
        HAlign::Right => x - pad - width,
    };
    let origin_y = match v_align {
        VAlign::Top => y + pad,
        VAlign::Center => y - height / 2,
        VAlign::Bottom => y - pad - height,
    };
    (origin_x, origin_y)
}

/// Point on `region` that a box aligned with `h_align`/`v_align` is anchored to
pub fn region_anchor(region: Region, h_align: HAlign, v_align: VAlign) -> (i32, i32) {
    let x = match h_align {
        HAlign::Left => region.left,
        HAlign::Center => region.x_center(),
        HAlign::Right => region.right,
    };
    let y = match v_align {
        VAlign::Top => region.top,
        VAlign::Center => region.y_center(),
        VAlign::Bottom => region.bottom,
    };
    (x, y)
}

/// Box covering `size` at `origin` grown by `pad`, or the whole `region`
/// when one is supplied (region-with-background mode)
pub fn background_rect(origin: (i32, i32), size: (u32, u32), pad: i32, region: Option<Region>) -> Region {
    match region {
        Some(region) => region,
        None => Region::from_origin(origin.0, origin.1, size.0 as i32, size.1 as i32).padded(pad),
    }
}

/// Top-left corner of a label box of `size` attached to `region`.
///
/// The label is flush with the region's left edge and sits just above the
/// top edge; `inside` tucks it under the top edge instead, and
/// `show_at_bottom` mirrors both placements onto the bottom edge.
pub fn label_origin(region: Region, size: (u32, u32), inside: bool, show_at_bottom: bool) -> (i32, i32) {
    let height = size.1 as i32;
    let y = match (show_at_bottom, inside) {
        (false, false) => region.top - height,
        (false, true) => region.top,
        (true, false) => region.bottom,
        (true, true) => region.bottom - height,
    };
    (region.left, y)
}

/// Parameters for [`fit_into_region`]
#[derive(Debug, Clone)]
pub struct FitOptions<'a> {
    pub family: &'a str,
    pub h_align: HAlign,
    /// Region writes centre vertically; corner anchoring picks Top/Bottom
    pub v_align: VAlign,
    pub pad: i32,
    pub max_font_size: u32,
    pub min_font_size: u32,
    /// Icon glyph drawn inline before the text
    pub icon: Option<&'a str>,
    /// Gap between the inline icon and the text
    pub icon_pad: i32,
}

/// A placed icon glyph
#[derive(Clone)]
pub struct PlacedGlyph {
    pub font: FontHandle,
    pub origin: (i32, i32),
    pub size: (u32, u32),
}

/// Outcome of fitting a line (and optional inline icon) into a region
#[derive(Clone)]
pub struct FittedText {
    pub font: FontHandle,
    pub origin: (i32, i32),
    pub size: (u32, u32),
    pub icon: Option<PlacedGlyph>,
    /// Top-left of the icon + text block
    pub block_origin: (i32, i32),
    pub block_size: (u32, u32),
    /// False when even the minimum size overflows the region
    pub fits: bool,
}

impl FittedText {
    pub fn font_size(&self) -> u32 {
        self.font.size()
    }
}

/// Measured pieces of the icon + text block at one font size
struct BlockMetrics {
    font: FontHandle,
    text_size: (u32, u32),
    icon: Option<(FontHandle, (u32, u32))>,
    icon_pad: i32,
}

impl BlockMetrics {
    fn measure(manager: &FontManager, text: &str, size: u32, opts: &FitOptions<'_>) -> FontResult<Self> {
        let font = manager.get_font(opts.family, size)?;
        let text_size = measure(text, font.as_ref());
        let icon = match opts.icon {
            Some(glyph) => {
                let icon_font = manager.get_font(FONT_ICON, size)?;
                let icon_size = measure(glyph, icon_font.as_ref());
                Some((icon_font, icon_size))
            }
            None => None,
        };

        Ok(Self {
            font,
            text_size,
            icon,
            icon_pad: opts.icon_pad,
        })
    }

    fn width(&self) -> i32 {
        let icon_width = self
            .icon
            .as_ref()
            .map(|(_, (w, _))| *w as i32 + self.icon_pad)
            .unwrap_or(0);
        icon_width + self.text_size.0 as i32
    }

    fn height(&self) -> u32 {
        let icon_height = self.icon.as_ref().map(|(_, (_, h))| *h).unwrap_or(0);
        self.text_size.1.max(icon_height)
    }
}

/// Pick the largest font size in `[min, max]` whose block fits `available`
/// pixels, by binary search over integer sizes. Measured width is assumed
/// monotonic in size. Returns the minimum size (overflowing) when nothing
/// fits.
fn search_font_size(
    manager: &FontManager,
    text: &str,
    available: i32,
    opts: &FitOptions<'_>,
) -> FontResult<(BlockMetrics, bool)> {
    let max_size = opts.max_font_size.max(1);
    let min_size = opts.min_font_size.clamp(1, max_size);

    let largest = BlockMetrics::measure(manager, text, max_size, opts)?;
    if largest.width() <= available {
        return Ok((largest, true));
    }

    let smallest = BlockMetrics::measure(manager, text, min_size, opts)?;
    if smallest.width() > available {
        warn!(
            "Text overflows region even at minimum size {}px (needs {}px, has {}px) - best effort fit",
            min_size,
            smallest.width(),
            available
        );
        return Ok((smallest, false));
    }

    // Invariant: `low` fits, `high` does not
    let mut low = min_size;
    let mut high = max_size;
    let mut best = smallest;
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        let probe = BlockMetrics::measure(manager, text, mid, opts)?;
        if probe.width() <= available {
            low = mid;
            best = probe;
        } else {
            high = mid;
        }
    }

    debug!("Shrink-to-fit chose {}px (max {}px) for {}px", low, max_size, available);
    Ok((best, true))
}

/// Choose a font size for `text` that fits `region` horizontally and place
/// the text (and inline icon) inside it.
///
/// Never fails on geometry: degenerate regions or overlong text fall back to
/// the minimum size and overflow. Only font lookups can fail.
pub fn fit_into_region(
    manager: &FontManager,
    text: &str,
    region: Region,
    opts: &FitOptions<'_>,
) -> FontResult<FittedText> {
    let available = region.width() - 2 * opts.pad;
    let (block, fits) = search_font_size(manager, text, available, opts)?;

    let block_size = (block.width().max(0) as u32, block.height());
    let (anchor_x, anchor_y) = region_anchor(region, opts.h_align, opts.v_align);
    let block_origin = anchor_at_point(block_size, anchor_x, anchor_y, opts.h_align, opts.v_align, opts.pad);

    let (text_x, icon) = match block.icon {
        Some((icon_font, icon_size)) => {
            let icon_y = block_origin.1 + (block_size.1 as i32 - icon_size.1 as i32) / 2;
            let placed = PlacedGlyph {
                font: icon_font,
                origin: (block_origin.0, icon_y),
                size: icon_size,
            };
            (block_origin.0 + icon_size.0 as i32 + opts.icon_pad, Some(placed))
        }
        None => (block_origin.0, None),
    };
    let text_y = block_origin.1 + (block_size.1 as i32 - block.text_size.1 as i32) / 2;

    Ok(FittedText {
        font: block.font,
        origin: (text_x, text_y),
        size: block.text_size,
        icon,
        block_origin,
        block_size,
        fits,
    })
}
