//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$PEEKDOC_CONFIG` (environment variable)
//! 2. `~/.config/peekdoc/config.toml` (Linux/macOS)
//!    `%APPDATA%\peekdoc\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PreviewError, Result};
use crate::parser::MhtmlOptions;
use crate::preview::render::RenderOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Input guards.
    pub limits: LimitsConfig,
    /// MHTML post-processing.
    pub mhtml: MhtmlConfig,
    /// Renderer defaults.
    pub render: RenderConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override cache directory for logs.
    pub cache_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
}

/// Input guards applied before decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest input accepted for preview, in bytes (default: 67108864 = 64 MB).
    pub max_input_size: usize,
}

/// MHTML post-processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MhtmlConfig {
    /// Rewrite root-relative `href`/`src` to absolute URLs.
    pub rewrite_root_relative: bool,
    /// Origin such as `https://example.com` used when the archive has no location.
    pub fallback_origin: Option<String>,
}

/// Renderer defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Workbook sheet shown first.
    pub default_sheet: usize,
    /// Row limit for CSV and sheet tables (0 = unlimited).
    pub max_table_rows: usize,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_input_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Default for MhtmlConfig {
    fn default() -> Self {
        Self {
            rewrite_root_relative: true,
            fallback_origin: None,
        }
    }
}

impl PreviewConfig {
    /// MHTML pipeline options derived from `[mhtml]`.
    pub fn mhtml_options(&self) -> MhtmlOptions {
        MhtmlOptions {
            rewrite_root_relative: self.mhtml.rewrite_root_relative,
            fallback_origin: self.mhtml.fallback_origin.clone(),
        }
    }

    /// Renderer options derived from `[mhtml]` and `[render]`.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            mhtml: self.mhtml_options(),
            default_sheet: self.render.default_sheet,
            max_table_rows: self.render.max_table_rows,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> PreviewConfig {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded config");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to load config, using defaults"
                    );
                }
            }
        }
    }
    PreviewConfig::default()
}

/// Read and parse one config file.
pub fn load_config_from(path: &Path) -> Result<PreviewConfig> {
    let contents = std::fs::read_to_string(path).map_err(|e| PreviewError::io(path, e))?;
    toml::from_str(&contents).map_err(|e| PreviewError::Config(e.to_string()))
}

/// Save configuration to the standard location.
pub fn save_config(config: &PreviewConfig) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    save_config_to(config, &path)
}

/// Save configuration to `path`, creating parent directories.
pub fn save_config_to(config: &PreviewConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("PEEKDOC_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    // 2. Standard config directory
    dirs::config_dir().map(|d| d.join("peekdoc").join("config.toml"))
}

/// Return the cache directory for logs.
pub fn cache_dir(config: &PreviewConfig) -> PathBuf {
    if let Some(ref dir) = config.general.cache_dir {
        return dir.clone();
    }
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("peekdoc")
}

/// Return the log file path.
pub fn log_file_path(config: &PreviewConfig) -> PathBuf {
    cache_dir(config).join("peekdoc.log")
}
