pub mod compositing;
pub mod font_manager;
pub mod rendering;
pub mod text;

// Re-export commonly used services
pub use compositing::{
    draw_bar, draw_bar_segment, draw_region_mask, draw_regions, generate_colors, grid,
    grid_shape, pixelate_region, GridOptions, PaletteOptions,
};
pub use font_manager::{FontAsset, FontBackend, FontFace, FontHandle, FontManager, FONT_DEFAULT, FONT_ICON};
pub use rendering::CosmicFontBackend;
pub use text::{LabelOptions, RegionTextOptions, TextStyle, TextWriter};
