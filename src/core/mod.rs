pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::{Config, FontConfig, LoggingConfig, TextConfig};
pub use errors::{
    ConfigError, ConfigResult, FontError, FontResult, RenderingError, RenderingResult,
};
pub use types::{BlendMode, Canvas, Color, HAlign, Region, VAlign, BLACK, WHITE};
