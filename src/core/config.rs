use crate::core::errors::{ConfigError, ConfigResult};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

/// Font asset configuration
#[derive(Debug, Clone)]
pub struct FontConfig {
    pub font_dir: PathBuf,
    pub default_font_file: String,
    /// Family name the default font file registers under
    pub default_font_name: String,
    pub default_divisor: f32,
    pub icon_font_file: String,
    pub icon_font_name: String,
    pub icon_divisor: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_dir: PathBuf::from("fonts"),
            default_font_file: "Roboto-Regular.ttf".to_string(),
            default_font_name: "Roboto".to_string(),
            // Empirically determined glyph height ratios
            default_divisor: 1.36,
            icon_font_file: "fa-solid-900.ttf".to_string(),
            icon_font_name: "Font Awesome 5 Free".to_string(),
            icon_divisor: 1.15,
        }
    }
}

impl FontConfig {
    pub fn default_font_path(&self) -> PathBuf {
        self.font_dir.join(&self.default_font_file)
    }

    pub fn icon_font_path(&self) -> PathBuf {
        self.font_dir.join(&self.icon_font_file)
    }
}

/// Text layout defaults
#[derive(Debug, Clone)]
pub struct TextConfig {
    /// Nominal font size used when a caller does not pick one
    pub default_font_size: u32,
    /// Lower bound of the shrink-to-fit search
    pub min_font_size: u32,
    /// Padding between text and its region or background edge
    pub text_pad: i32,
    /// Gap between an inline icon and the text that follows it
    pub icon_pad: i32,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            default_font_size: 22,
            min_font_size: 8,
            text_pad: 6,
            icon_pad: 6,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub log_level: Level,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
        }
    }
}

/// Main library configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub fonts: FontConfig,
    pub text: TextConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        let font_defaults = FontConfig::default();
        let text_defaults = TextConfig::default();

        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        Ok(Self {
            fonts: FontConfig {
                font_dir: env::var("ANNOTATE_FONT_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(font_defaults.font_dir),
                default_font_file: env::var("ANNOTATE_DEFAULT_FONT_FILE")
                    .unwrap_or(font_defaults.default_font_file),
                default_font_name: env::var("ANNOTATE_DEFAULT_FONT_NAME")
                    .unwrap_or(font_defaults.default_font_name),
                default_divisor: parse_env(
                    "ANNOTATE_DEFAULT_FONT_DIVISOR",
                    font_defaults.default_divisor,
                )?,
                icon_font_file: env::var("ANNOTATE_ICON_FONT_FILE")
                    .unwrap_or(font_defaults.icon_font_file),
                icon_font_name: env::var("ANNOTATE_ICON_FONT_NAME")
                    .unwrap_or(font_defaults.icon_font_name),
                icon_divisor: parse_env("ANNOTATE_ICON_FONT_DIVISOR", font_defaults.icon_divisor)?,
            },
            text: TextConfig {
                default_font_size: parse_env("ANNOTATE_FONT_SIZE", text_defaults.default_font_size)?,
                min_font_size: parse_env("ANNOTATE_MIN_FONT_SIZE", text_defaults.min_font_size)?,
                text_pad: parse_env("ANNOTATE_TEXT_PAD", text_defaults.text_pad)?,
                icon_pad: parse_env("ANNOTATE_ICON_PAD", text_defaults.icon_pad)?,
            },
            logging: LoggingConfig { log_level },
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.fonts.default_divisor > 0.0) {
            return Err(ConfigError::InvalidDivisor {
                family: self.fonts.default_font_name.clone(),
                divisor: self.fonts.default_divisor,
            });
        }
        if !(self.fonts.icon_divisor > 0.0) {
            return Err(ConfigError::InvalidDivisor {
                family: self.fonts.icon_font_name.clone(),
                divisor: self.fonts.icon_divisor,
            });
        }

        if self.text.min_font_size == 0 {
            return Err(ConfigError::InvalidFontSize(
                "min_font_size must be > 0".to_string(),
            ));
        }
        if self.text.min_font_size > self.text.default_font_size {
            return Err(ConfigError::InvalidFontSize(format!(
                "min_font_size ({}) exceeds default_font_size ({})",
                self.text.min_font_size, self.text.default_font_size
            )));
        }

        if self.text.text_pad < 0 {
            return Err(ConfigError::InvalidPadding(self.text.text_pad));
        }
        if self.text.icon_pad < 0 {
            return Err(ConfigError::InvalidPadding(self.text.icon_pad));
        }

        Ok(())
    }

    pub fn log_level(&self) -> Level {
        self.logging.log_level
    }

    pub fn default_font_size(&self) -> u32 {
        self.text.default_font_size
    }

    pub fn min_font_size(&self) -> u32 {
        self.text.min_font_size
    }
}

/// Read and parse an env var, keeping `default` when it is unset
fn parse_env<T: FromStr>(key: &str, default: T) -> ConfigResult<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::EnvVarError(format!("{key}={raw:?} could not be parsed"))),
        Err(_) => Ok(default),
    }
}
