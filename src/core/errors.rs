// Custom error types for the annotation library
//
// Using thiserror for ergonomic error definitions with:
// - Type-safe error matching
// - Automatic Display/Error trait implementations
// - Source error chaining

use thiserror::Error;

/// Font resource errors
#[derive(Debug, Error)]
pub enum FontError {
    #[error("Unknown font family '{family}' (registered: {registered:?})")]
    UnknownFamily {
        family: String,
        registered: Vec<String>,
    },

    #[error("Font asset for '{family}' not found at {path}")]
    AssetMissing { family: String, path: String },

    #[error("Font loading failed for '{family}': {reason}")]
    LoadFailed { family: String, reason: String },

    #[error("Invalid font size {0} (must be > 0)")]
    InvalidSize(u32),
}

/// Rendering and compositing errors
#[derive(Debug, Error)]
pub enum RenderingError {
    #[error("Font error: {0}")]
    Font(#[from] FontError),

    #[error("Image processing failed: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Grid requires at least one image")]
    EmptyGrid,

    #[error("Invalid cell size {width}x{height}")]
    InvalidCellSize { width: u32, height: u32 },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Font divisor for '{family}' must be > 0, got {divisor}")]
    InvalidDivisor { family: String, divisor: f32 },

    #[error("Invalid font size config: {0}")]
    InvalidFontSize(String),

    #[error("Padding must be >= 0, got {0}")]
    InvalidPadding(i32),

    #[error("Environment variable parsing failed: {0}")]
    EnvVarError(String),
}

// Convenience type aliases for Results
pub type FontResult<T> = Result<T, FontError>;
pub type RenderingResult<T> = Result<T, RenderingError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
