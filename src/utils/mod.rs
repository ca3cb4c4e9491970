pub mod image_ops;

// Re-export commonly used items
pub use image_ops::{
    blend_pixel,
    fill_region,
    safe_extract,
    safe_extract_coords,
    safe_implant,
    safe_implant_coords,
    stroke_region,
    SafeBounds,
};
