use cosmic_text::{
    fontdb, Attrs, Buffer, Color as CosmicColor, Family, FontSystem, Metrics, Shaping, SwashCache,
    Wrap,
};
use image::Rgb;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::errors::{FontError, FontResult};
use crate::core::types::{Canvas, Color};
use crate::services::font_manager::{FontAsset, FontBackend, FontFace, FontHandle};
use crate::utils::image_ops::blend_pixel;

/// Font backend using cosmic-text for shaping and swash for rasterization.
///
/// Only the font files handed in through [`FontAsset`]s are loaded; the
/// system font directories are never scanned.
pub struct CosmicFontBackend {
    font_system: Arc<Mutex<FontSystem>>,
    swash_cache: Arc<Mutex<SwashCache>>,
    registered: Mutex<HashSet<PathBuf>>,
}

impl CosmicFontBackend {
    pub fn new() -> Self {
        // Empty database: fonts come exclusively from registered assets
        let db = fontdb::Database::new();
        let font_system = FontSystem::new_with_locale_and_db("en-US".to_string(), db);

        Self {
            font_system: Arc::new(Mutex::new(font_system)),
            swash_cache: Arc::new(Mutex::new(SwashCache::new())),
            registered: Mutex::new(HashSet::new()),
        }
    }

    /// Read the asset's font file into the database once per path
    fn register(&self, asset: &FontAsset) -> FontResult<()> {
        let mut registered = self.registered.lock();
        if registered.contains(&asset.path) {
            return Ok(());
        }

        if !asset.path.exists() {
            return Err(FontError::AssetMissing {
                family: asset.family.clone(),
                path: asset.path.display().to_string(),
            });
        }

        let font_data = std::fs::read(&asset.path).map_err(|e| FontError::LoadFailed {
            family: asset.family.clone(),
            reason: e.to_string(),
        })?;

        self.font_system.lock().db_mut().load_font_data(font_data);
        registered.insert(asset.path.clone());
        info!("✓ Font: {} from {}", asset.face_name, asset.path.display());
        Ok(())
    }
}

impl Default for CosmicFontBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FontBackend for CosmicFontBackend {
    fn load(&self, asset: &FontAsset, size: u32) -> FontResult<FontHandle> {
        self.register(asset)?;

        Ok(Arc::new(CosmicFace {
            family: asset.family.clone(),
            face_name: asset.face_name.clone(),
            size,
            line_height: asset.glyph_height(size) as f32,
            font_system: self.font_system.clone(),
            swash_cache: self.swash_cache.clone(),
        }))
    }
}

/// One font family at one size, sharing the backend's font system
pub struct CosmicFace {
    family: String,
    face_name: String,
    size: u32,
    /// Calibrated glyph height; used as the line box so that a single line
    /// measures exactly one glyph height
    line_height: f32,
    font_system: Arc<Mutex<FontSystem>>,
    swash_cache: Arc<Mutex<SwashCache>>,
}

impl CosmicFace {
    /// Shape `text` as a single unwrapped line
    fn shape(&self, font_system: &mut FontSystem, text: &str) -> Buffer {
        let metrics = Metrics::new(self.size as f32, self.line_height);
        let mut buffer = Buffer::new(font_system, metrics);

        buffer.set_wrap(font_system, Wrap::None);
        buffer.set_size(font_system, None, None);

        let attrs = Attrs::new().family(Family::Name(&self.face_name));
        buffer.set_text(font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(font_system, false);
        buffer
    }
}

impl FontFace for CosmicFace {
    fn family(&self) -> &str {
        &self.family
    }

    fn size(&self) -> u32 {
        self.size
    }

    fn measure(&self, text: &str) -> (u32, u32) {
        if text.is_empty() {
            return (0, 0);
        }

        let mut font_system = self.font_system.lock();
        let buffer = self.shape(&mut font_system, text);

        let mut width = 0.0f32;
        let mut lines = 0u32;
        for run in buffer.layout_runs() {
            lines += 1;
            let run_right = run
                .glyphs
                .iter()
                .map(|g| g.x + g.w)
                .fold(run.line_w, f32::max);
            width = width.max(run_right);
        }

        let height = lines.max(1) as f32 * self.line_height;
        (width.ceil() as u32, height.ceil() as u32)
    }

    fn draw(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, color: Color, opacity: f32) {
        if text.is_empty() || opacity <= 0.0 {
            return;
        }

        let mut font_system = self.font_system.lock();
        let mut swash_cache = self.swash_cache.lock();
        let buffer = self.shape(&mut font_system, text);

        let (width, height) = (canvas.width() as i32, canvas.height() as i32);
        let ink = CosmicColor::rgb(color[0], color[1], color[2]);
        let mut written = 0usize;

        buffer.draw(&mut font_system, &mut swash_cache, ink, |px, py, w, h, pixel_color| {
            let alpha = pixel_color.a() as f32 / 255.0 * opacity;
            if alpha <= 0.0 {
                return;
            }
            let over = Rgb([pixel_color.r(), pixel_color.g(), pixel_color.b()]);

            for dy in 0..h as i32 {
                for dx in 0..w as i32 {
                    let img_x = x + px + dx;
                    let img_y = y + py + dy;
                    if img_x < 0 || img_y < 0 || img_x >= width || img_y >= height {
                        continue;
                    }
                    let existing = canvas.get_pixel_mut(img_x as u32, img_y as u32);
                    *existing = blend_pixel(*existing, over, alpha);
                    written += 1;
                }
            }
        });

        debug!("Rasterized '{}' ({}px, {}) with {} pixels", text, self.size, self.family, written);
    }
}
