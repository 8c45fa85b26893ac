//! Preset configuration module.
//!
//! Handles loading, validating, and merging the `pwa-assets.toml` preset
//! file. Stock defaults are the base layer; a user file overrides only the
//! keys it names. Unknown keys are rejected to catch typos early.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_path = "/"           # URL prefix for generated assets
//! markup = "html"           # Link rendering: "html" or "xhtml"
//! link_ids = false          # Emit stable id attributes on head links
//!
//! [icons]
//! favicon = [48]            # Square favicon sizes
//! transparent = [64, 192, 512]
//! maskable = [512]
//! apple_touch = [180]
//! windows_tile = [[70, 70], [150, 150], [310, 150], [310, 310]]
//!
//! [icons.padding]
//! transparent = 0.05        # Fraction of the shorter canvas dimension
//! maskable = 0.3
//! apple_touch = 0.3
//!
//! [splash]
//! enabled = true
//! dark = false              # Also render dark-scheme splash screens
//! # padding = 0.3
//!
//! # [splash.resize]         # Preset-level light resize layer
//! # fit = "contain"
//! # background = "#ffffff"
//!
//! # [splash.dark_resize]    # Preset-level dark resize layer
//! # background = "#000000"
//!
//! # [[splash.sizes]]        # Custom device sizes (omit for built-in table)
//! # width = 640
//! # height = 1136
//! # scale_factor = 2
//!
//! [png]
//! # compression = "default" # fast | default | best
//! # filter = "adaptive"     # none | sub | up | average | paeth | adaptive
//!
//! [generate]
//! overwrite = false         # Regenerate assets that already exist
//! continue_on_error = false # Keep going past individual asset failures
//!
//! [processing]
//! # max_workers = 4         # Omit for auto = CPU cores
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse — override just the values you want:
//!
//! ```toml
//! # Only enable dark splash screens
//! [splash]
//! dark = true
//! ```

use crate::markup::MarkupStyle;
use crate::options::{PngOptions, ResizeOptions};
use crate::preset::{IconPadding, SizeDescriptor, windows_tiles};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Preset configuration loaded from `pwa-assets.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetConfig {
    /// URL prefix for every generated asset; must end with `/`.
    pub base_path: String,
    /// Head-link rendering mode.
    pub markup: MarkupStyle,
    /// Emit stable `id` attributes on head links.
    pub link_ids: bool,
    /// Icon category sizes and padding.
    pub icons: IconsConfig,
    /// Splash-screen settings.
    pub splash: SplashConfig,
    /// PNG encoding settings (preset-level cascade layer).
    pub png: PngOptions,
    /// Generation driver settings.
    pub generate: GenerateConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            markup: MarkupStyle::default(),
            link_ids: false,
            icons: IconsConfig::default(),
            splash: SplashConfig::default(),
            png: PngOptions::default(),
            generate: GenerateConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl AssetConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_path.ends_with('/') {
            return Err(ConfigError::Validation(
                "base_path must end with '/'".into(),
            ));
        }
        let padding = &self.icons.padding;
        for (name, value) in [
            ("icons.padding.transparent", padding.transparent),
            ("icons.padding.maskable", padding.maskable),
            ("icons.padding.apple_touch", padding.apple_touch),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation(format!("{name} must be 0..=1")));
            }
        }
        if let Some(p) = self.splash.padding
            && !(0.0..=1.0).contains(&p)
        {
            return Err(ConfigError::Validation("splash.padding must be 0..=1".into()));
        }
        for sizes in [
            &self.icons.favicon,
            &self.icons.transparent,
            &self.icons.maskable,
            &self.icons.apple_touch,
        ] {
            if sizes.iter().any(|&s| s == 0) {
                return Err(ConfigError::Validation(
                    "icon sizes must be non-zero".into(),
                ));
            }
        }
        if self.icons.windows_tile.iter().any(|&[w, h]| w == 0 || h == 0) {
            return Err(ConfigError::Validation(
                "icons.windows_tile sizes must be non-zero".into(),
            ));
        }
        for d in &self.splash.sizes {
            if d.width == 0 || d.height == 0 {
                return Err(ConfigError::Validation(
                    "splash.sizes dimensions must be non-zero".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Icon category sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconsConfig {
    pub favicon: Vec<u32>,
    pub transparent: Vec<u32>,
    pub maskable: Vec<u32>,
    pub apple_touch: Vec<u32>,
    /// `[width, height]` pairs for msapplication tiles.
    pub windows_tile: Vec<[u32; 2]>,
    pub padding: IconPadding,
}

impl Default for IconsConfig {
    fn default() -> Self {
        Self {
            favicon: vec![48],
            transparent: vec![64, 192, 512],
            maskable: vec![512],
            apple_touch: vec![180],
            windows_tile: windows_tiles().into_iter().map(|(w, h)| [w, h]).collect(),
            padding: IconPadding::default(),
        }
    }
}

/// Splash-screen settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplashConfig {
    pub enabled: bool,
    /// Also render dark-scheme variants (scheme defaults apply when no
    /// `dark_resize` layer is given).
    pub dark: bool,
    pub padding: Option<f32>,
    pub resize: Option<ResizeOptions>,
    pub dark_resize: Option<ResizeOptions>,
    /// Custom device sizes; empty means the built-in Apple table.
    pub sizes: Vec<SizeDescriptor>,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dark: false,
            padding: None,
            resize: None,
            dark_resize: None,
            sizes: Vec::new(),
        }
    }
}

/// Generation driver settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    pub overwrite: bool,
    pub continue_on_error: bool,
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_workers: Option<usize>,
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_workers(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_workers.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(AssetConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AssetConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AssetConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file path.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<AssetConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pwa-assets.toml` with all keys and
/// explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pwa-assets Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Each key only needs to appear when you want to override it.
# Unknown keys will cause an error.

# URL prefix for every generated asset reference. Must end with '/'.
base_path = "/"

# Head-link rendering: "html" for <link ...>, "xhtml" for <link ... />.
markup = "html"

# Emit stable id attributes on head links (the file name without extension).
link_ids = false

# ---------------------------------------------------------------------------
# Icon categories
# ---------------------------------------------------------------------------
[icons]
# Square favicon sizes, referenced from <link rel="icon">.
favicon = [48]

# Transparent manifest icons (also linked from the page head).
transparent = [64, 192, 512]

# Maskable manifest icons: centered on a safe-area-padded opaque canvas.
maskable = [512]

# Apple touch icon sizes.
apple_touch = [180]

# Windows tile sizes as [width, height] pairs.
windows_tile = [[70, 70], [150, 150], [310, 150], [310, 310]]

# Padding per icon category, as a fraction of the shorter canvas dimension.
# Favicons and Windows tiles never pad.
[icons.padding]
transparent = 0.05
maskable = 0.3
apple_touch = 0.3

# ---------------------------------------------------------------------------
# Apple splash screens
# ---------------------------------------------------------------------------
[splash]
enabled = true

# Also render dark-scheme variants (black canvas unless overridden below).
dark = false

# Padding as a fraction of the shorter canvas dimension.
# padding = 0.3

# Preset-level resize layer for light variants.
# [splash.resize]
# fit = "contain"          # contain | cover
# background = "#ffffff"

# Preset-level resize layer for dark variants. Presence enables dark output.
# [splash.dark_resize]
# background = "#000000"

# Custom device sizes. Omit entirely to use the built-in Apple device table.
# [[splash.sizes]]
# width = 640
# height = 1136
# scale_factor = 2
# padding = 0.2

# ---------------------------------------------------------------------------
# PNG encoding
# ---------------------------------------------------------------------------
[png]
# compression = "default"  # fast | default | best
# filter = "adaptive"      # none | sub | up | average | paeth | adaptive

# ---------------------------------------------------------------------------
# Generation
# ---------------------------------------------------------------------------
[generate]
# Regenerate assets whose target file already exists.
overwrite = false

# Keep generating other assets when one fails.
continue_on_error = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_workers = 4
"##
}
