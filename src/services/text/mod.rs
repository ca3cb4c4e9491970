//! Text and icon writing on top of the layout math in [`layout`].
//!
//! Every operation here mutates the canvas in place and returns
//! `RenderingResult<()>`; the only failure mode is a font lookup.

pub mod layout;

use std::sync::Arc;
use tracing::debug;

use crate::core::config::{Config, TextConfig};
use crate::core::errors::RenderingResult;
use crate::core::types::{BlendMode, Canvas, Color, HAlign, Region, VAlign, BLACK, WHITE};
use crate::services::font_manager::{FontHandle, FontManager, FONT_DEFAULT, FONT_ICON};
use crate::utils::image_ops::{fill_region, stroke_region};

pub use layout::{
    anchor_at_point, background_rect, fit_into_region, label_origin, measure, FitOptions,
    FittedText, PlacedGlyph,
};

/// How a single line of text looks
#[derive(Debug, Clone)]
pub struct TextStyle {
    /// Font family id registered with the [`FontManager`]
    pub family: String,
    /// Nominal size; the upper bound when shrinking text into a region
    pub font_size: u32,
    pub color: Color,
    /// Background fill color, `None` for no background
    pub background: Option<Color>,
    pub blend: BlendMode,
    pub pad: i32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::from_config(&TextConfig::default())
    }
}

impl TextStyle {
    pub fn from_config(config: &TextConfig) -> Self {
        Self {
            family: FONT_DEFAULT.to_string(),
            font_size: config.default_font_size,
            color: WHITE,
            background: None,
            blend: BlendMode::Opaque,
            pad: config.text_pad,
        }
    }

    pub fn with_size(mut self, font_size: u32) -> Self {
        self.font_size = font_size;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_background(mut self, background: Color, blend: BlendMode) -> Self {
        self.background = Some(background);
        self.blend = blend;
        self
    }

    pub fn with_pad(mut self, pad: i32) -> Self {
        self.pad = pad;
        self
    }
}

/// Options for [`TextWriter::write_into_region`] and friends
#[derive(Debug, Clone)]
pub struct RegionTextOptions {
    pub style: TextStyle,
    pub h_align: HAlign,
    /// Icon glyph drawn inline, left of the text
    pub icon: Option<String>,
    /// Background covers the whole region rather than the text box
    pub fill_region: bool,
    /// Stroke a 1px border around the region
    pub show_region_outline: bool,
    pub outline_color: Color,
}

impl Default for RegionTextOptions {
    fn default() -> Self {
        Self {
            style: TextStyle::default(),
            h_align: HAlign::Center,
            icon: None,
            fill_region: false,
            show_region_outline: false,
            outline_color: WHITE,
        }
    }
}

/// Options for [`TextWriter::label_region`]
#[derive(Debug, Clone)]
pub struct LabelOptions {
    pub style: TextStyle,
    /// Place the label just inside the region edge instead of outside it
    pub inside: bool,
    /// Attach to the bottom edge instead of the top
    pub show_at_bottom: bool,
    /// Icon glyph drawn inside the label, left of the text
    pub icon: Option<String>,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            style: TextStyle::default().with_background(BLACK, BlendMode::Opaque),
            inside: false,
            show_at_bottom: false,
            icon: None,
        }
    }
}

/// Writes text and icons onto canvases using fonts from a shared manager
#[derive(Clone)]
pub struct TextWriter {
    fonts: Arc<FontManager>,
    config: TextConfig,
}

impl TextWriter {
    pub fn new(fonts: Arc<FontManager>, config: TextConfig) -> Self {
        Self { fonts, config }
    }

    /// Writer backed by cosmic-text with the fonts named in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(FontManager::from_config(config)), config.text.clone())
    }

    pub fn fonts(&self) -> &Arc<FontManager> {
        &self.fonts
    }

    /// Default style from this writer's config
    pub fn style(&self) -> TextStyle {
        TextStyle::from_config(&self.config)
    }

    /// Default region options from this writer's config
    pub fn region_options(&self) -> RegionTextOptions {
        RegionTextOptions {
            style: self.style(),
            ..RegionTextOptions::default()
        }
    }

    /// Default label options from this writer's config
    pub fn label_options(&self) -> LabelOptions {
        LabelOptions {
            style: self.style().with_background(BLACK, BlendMode::Opaque),
            ..LabelOptions::default()
        }
    }

    /// Draw `text` with its top-left exactly at (x, y). No background.
    pub fn raw_text(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, style: &TextStyle) -> RenderingResult<()> {
        let font = self.fonts.get_font(&style.family, style.font_size)?;
        font.draw(canvas, text, x, y, style.color, style.blend.text_opacity());
        Ok(())
    }

    /// Draw an icon glyph with its top-left exactly at (x, y)
    pub fn raw_icon(&self, canvas: &mut Canvas, icon: &str, x: i32, y: i32, style: &TextStyle) -> RenderingResult<()> {
        let font = self.fonts.get_font(FONT_ICON, style.font_size)?;
        font.draw(canvas, icon, x, y, style.color, style.blend.text_opacity());
        Ok(())
    }

    /// Draw an icon glyph centred on (x, y), with the style's background
    pub fn write_icon(&self, canvas: &mut Canvas, icon: &str, x: i32, y: i32, style: &TextStyle) -> RenderingResult<()> {
        let font = self.fonts.get_font(FONT_ICON, style.font_size)?;
        self.write_at_point(canvas, &font, icon, x, y, HAlign::Center, VAlign::Center, style);
        Ok(())
    }

    /// Draw `text` centred on (x, y)
    pub fn center_at_position(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, style: &TextStyle) -> RenderingResult<()> {
        let font = self.fonts.get_font(&style.family, style.font_size)?;
        self.write_at_point(canvas, &font, text, x, y, HAlign::Center, VAlign::Center, style);
        Ok(())
    }

    /// Draw `text` starting `pad` pixels right of x, vertically centred on y
    pub fn left_at_position(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, style: &TextStyle) -> RenderingResult<()> {
        let font = self.fonts.get_font(&style.family, style.font_size)?;
        self.write_at_point(canvas, &font, text, x, y, HAlign::Left, VAlign::Center, style);
        Ok(())
    }

    /// Shrink `text` to fit `region` and draw it, centred vertically
    pub fn write_into_region(
        &self,
        canvas: &mut Canvas,
        text: &str,
        region: Region,
        opts: &RegionTextOptions,
    ) -> RenderingResult<()> {
        let fit = self.fit_options(opts, opts.h_align, VAlign::Center);
        let fitted = fit_into_region(&self.fonts, text, region, &fit)?;
        self.paint_fitted(canvas, text, region, &fitted, opts);
        Ok(())
    }

    /// Write into a `width`-wide strip starting at (x, y), one line tall
    pub fn write_at_position(
        &self,
        canvas: &mut Canvas,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        opts: &RegionTextOptions,
    ) -> RenderingResult<()> {
        let pad = opts.style.pad;
        let line_height = self.fonts.glyph_height(&opts.style.family, opts.style.font_size)? as i32;
        let region = Region::from_origin(x, y, width, line_height + 2 * pad);
        self.write_into_region(canvas, text, region, opts)
    }

    /// Write into a corner, edge or the centre of the canvas, inset by `pad`
    pub fn write_anchored(
        &self,
        canvas: &mut Canvas,
        text: &str,
        h_anchor: HAlign,
        v_anchor: VAlign,
        opts: &RegionTextOptions,
    ) -> RenderingResult<()> {
        let region = Region::from_size(canvas.width(), canvas.height()).padded(-opts.style.pad);
        let fit = self.fit_options(opts, h_anchor, v_anchor);
        let fitted = fit_into_region(&self.fonts, text, region, &fit)?;
        self.paint_fitted(canvas, text, region, &fitted, opts);
        Ok(())
    }

    /// Tag `region` with `text` on its top (or bottom) edge, flush left
    pub fn label_region(&self, canvas: &mut Canvas, text: &str, region: Region, opts: &LabelOptions) -> RenderingResult<()> {
        let style = &opts.style;
        let font = self.fonts.get_font(&style.family, style.font_size)?;
        let (width, height) = measure(text, font.as_ref());

        let icon = match opts.icon.as_deref() {
            Some(glyph) => {
                let icon_font = self.fonts.get_font(FONT_ICON, style.font_size)?;
                let icon_size = measure(glyph, icon_font.as_ref());
                Some((icon_font, glyph, icon_size))
            }
            None => None,
        };
        let icon_advance = icon
            .as_ref()
            .map(|(_, _, (w, _))| *w as i32 + self.config.icon_pad)
            .unwrap_or(0);
        let content_height = icon
            .as_ref()
            .map(|(_, _, (_, h))| height.max(*h))
            .unwrap_or(height) as i32;

        let box_size = (
            (icon_advance + width as i32 + 2 * style.pad).max(0) as u32,
            (content_height + 2 * style.pad).max(0) as u32,
        );
        let (box_x, box_y) = label_origin(region, box_size, opts.inside, opts.show_at_bottom);
        let label_box = Region::from_origin(box_x, box_y, box_size.0 as i32, box_size.1 as i32);
        let (content_x, content_y) = (box_x + style.pad, box_y + style.pad);

        paint_background(canvas, label_box, style);
        let opacity = style.blend.text_opacity();
        if let Some((icon_font, glyph, (_, icon_height))) = &icon {
            let icon_y = content_y + (content_height - *icon_height as i32) / 2;
            icon_font.draw(canvas, glyph, content_x, icon_y, style.color, opacity);
        }
        let text_y = content_y + (content_height - height as i32) / 2;
        font.draw(canvas, text, content_x + icon_advance, text_y, style.color, opacity);
        Ok(())
    }

    fn fit_options<'a>(&self, opts: &'a RegionTextOptions, h_align: HAlign, v_align: VAlign) -> FitOptions<'a> {
        FitOptions {
            family: &opts.style.family,
            h_align,
            v_align,
            pad: opts.style.pad,
            max_font_size: opts.style.font_size,
            min_font_size: self.config.min_font_size,
            icon: opts.icon.as_deref(),
            icon_pad: self.config.icon_pad,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_at_point(
        &self,
        canvas: &mut Canvas,
        font: &FontHandle,
        text: &str,
        x: i32,
        y: i32,
        h_align: HAlign,
        v_align: VAlign,
        style: &TextStyle,
    ) {
        let size = measure(text, font.as_ref());
        let origin = anchor_at_point(size, x, y, h_align, v_align, style.pad);
        paint_background(canvas, background_rect(origin, size, style.pad, None), style);
        font.draw(canvas, text, origin.0, origin.1, style.color, style.blend.text_opacity());
    }

    fn paint_fitted(
        &self,
        canvas: &mut Canvas,
        text: &str,
        region: Region,
        fitted: &FittedText,
        opts: &RegionTextOptions,
    ) {
        let style = &opts.style;
        let background = if opts.fill_region {
            background_rect(fitted.block_origin, fitted.block_size, style.pad, Some(region))
        } else {
            background_rect(fitted.block_origin, fitted.block_size, style.pad, None)
        };
        paint_background(canvas, background, style);

        let opacity = style.blend.text_opacity();
        if let (Some(icon), Some(glyph)) = (&fitted.icon, opts.icon.as_deref()) {
            icon.font.draw(canvas, glyph, icon.origin.0, icon.origin.1, style.color, opacity);
        }
        fitted.font.draw(canvas, text, fitted.origin.0, fitted.origin.1, style.color, opacity);

        if opts.show_region_outline {
            stroke_region(canvas, region, opts.outline_color);
        }

        debug!(
            "Wrote '{}' at {:?} ({}px, fits={})",
            text,
            fitted.origin,
            fitted.font_size(),
            fitted.fits
        );
    }
}

/// Fill the background box for `style`, if it has one and its blend mode
/// draws a box at all
fn paint_background(canvas: &mut Canvas, rect: Region, style: &TextStyle) {
    if let (Some(color), Some(opacity)) = (style.background, style.blend.background_opacity()) {
        fill_region(canvas, rect, color, opacity);
    }
}
