// Library exports for region annotation: safe pixel access, cached fonts,
// fitted text and region compositing

// Core modules
pub mod core;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{ConfigError, FontError, RenderingError},
    types::{BlendMode, Canvas, Color, HAlign, Region, VAlign, BLACK, WHITE},
};

pub use services::{
    draw_bar, draw_bar_segment, draw_region_mask, draw_regions, generate_colors, grid,
    pixelate_region, FontManager, GridOptions, LabelOptions, PaletteOptions,
    RegionTextOptions, TextStyle, TextWriter, FONT_DEFAULT, FONT_ICON,
};

pub use utils::{safe_extract, safe_implant};
