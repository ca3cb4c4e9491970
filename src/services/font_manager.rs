// Font Manager - loads bundled fonts once per (family, size) and caches them

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::config::Config;
use crate::core::errors::{FontError, FontResult};
use crate::core::types::{Canvas, Color};
use crate::services::rendering::CosmicFontBackend;

/// Family id of the regular text font
pub const FONT_DEFAULT: &str = "default";
/// Family id of the icon font
pub const FONT_ICON: &str = "icon";

/// Process-wide manager, installed at most once
static GLOBAL_MANAGER: OnceCell<Arc<FontManager>> = OnceCell::new();

/// A rasterizer for one (family, pixel size) pair
pub trait FontFace: Send + Sync {
    fn family(&self) -> &str;

    /// Nominal pixel size this face was loaded at
    fn size(&self) -> u32;

    /// Bounding box (width, height) of `text` in pixels
    fn measure(&self, text: &str) -> (u32, u32);

    /// Rasterize `text` with its bounding box's top-left at (x, y).
    /// Glyph pixels are blended at `opacity`; off-canvas pixels are skipped.
    fn draw(&self, canvas: &mut Canvas, text: &str, x: i32, y: i32, color: Color, opacity: f32);
}

/// Shared handle to a cached face
pub type FontHandle = Arc<dyn FontFace>;

/// Loads faces from font assets
pub trait FontBackend: Send + Sync {
    fn load(&self, asset: &FontAsset, size: u32) -> FontResult<FontHandle>;
}

/// A bundled font file registered under a family id
#[derive(Debug, Clone)]
pub struct FontAsset {
    /// Id callers use, e.g. [`FONT_DEFAULT`]
    pub family: String,
    pub path: PathBuf,
    /// Family name embedded in the font file
    pub face_name: String,
    /// Nominal size divided by this gives the effective glyph height
    pub divisor: f32,
}

impl FontAsset {
    pub fn new(family: impl Into<String>, path: impl Into<PathBuf>, face_name: impl Into<String>, divisor: f32) -> Self {
        Self {
            family: family.into(),
            path: path.into(),
            face_name: face_name.into(),
            divisor,
        }
    }

    /// Effective glyph height for a nominal size
    pub fn glyph_height(&self, size: u32) -> u32 {
        (size as f32 / self.divisor).round().max(1.0) as u32
    }
}

/// Font Manager - caches one face per (family, size), never evicting
pub struct FontManager {
    assets: HashMap<String, FontAsset>,
    backend: Arc<dyn FontBackend>,
    cache: Mutex<HashMap<(String, u32), FontHandle>>,
}

impl FontManager {
    pub fn new(assets: Vec<FontAsset>, backend: Arc<dyn FontBackend>) -> Self {
        let assets = assets
            .into_iter()
            .map(|asset| (asset.family.clone(), asset))
            .collect();

        Self {
            assets,
            backend,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Manager with the default and icon fonts from `config`, rasterized by cosmic-text
    pub fn from_config(config: &Config) -> Self {
        let fonts = &config.fonts;
        let assets = vec![
            FontAsset::new(
                FONT_DEFAULT,
                fonts.default_font_path(),
                fonts.default_font_name.clone(),
                fonts.default_divisor,
            ),
            FontAsset::new(
                FONT_ICON,
                fonts.icon_font_path(),
                fonts.icon_font_name.clone(),
                fonts.icon_divisor,
            ),
        ];

        info!("Font Manager initialized (fonts: {})", fonts.font_dir.display());
        Self::new(assets, Arc::new(CosmicFontBackend::new()))
    }

    /// Install the process-wide manager. Only the first call wins; later
    /// calls hand their manager back as the error value.
    pub fn install_global(manager: Arc<FontManager>) -> Result<(), Arc<FontManager>> {
        GLOBAL_MANAGER.set(manager)
    }

    /// The manager installed by [`FontManager::install_global`], if any
    pub fn global() -> Option<Arc<FontManager>> {
        GLOBAL_MANAGER.get().cloned()
    }

    /// Get the face for `family` at `size`, loading it on first use.
    ///
    /// The load runs under the cache lock, so concurrent callers asking for
    /// the same key never load it twice.
    pub fn get_font(&self, family: &str, size: u32) -> FontResult<FontHandle> {
        if size == 0 {
            return Err(FontError::InvalidSize(size));
        }
        let asset = self.asset(family)?;

        let mut cache = self.cache.lock();
        if let Some(handle) = cache.get(&(family.to_string(), size)) {
            debug!("Font '{}' @ {}px found in cache", family, size);
            return Ok(handle.clone());
        }

        let handle = self.backend.load(asset, size)?;
        info!("Loaded font '{}' @ {}px from {}", family, size, asset.path.display());
        cache.insert((family.to_string(), size), handle.clone());
        Ok(handle)
    }

    /// Calibrated glyph-height divisor for `family`
    pub fn get_font_divisor(&self, family: &str) -> FontResult<f32> {
        Ok(self.asset(family)?.divisor)
    }

    /// Glyph height for `family` at nominal `size`
    pub fn glyph_height(&self, family: &str, size: u32) -> FontResult<u32> {
        Ok(self.asset(family)?.glyph_height(size))
    }

    /// Registered family ids, sorted
    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self.assets.keys().cloned().collect();
        families.sort();
        families
    }

    /// Number of cached faces
    pub fn cache_len(&self) -> usize {
        self.cache.lock().len()
    }

    fn asset(&self, family: &str) -> FontResult<&FontAsset> {
        self.assets.get(family).ok_or_else(|| FontError::UnknownFamily {
            family: family.to_string(),
            registered: self.families(),
        })
    }
}
