//! Preset assembly: which asset categories and sizes to produce.
//!
//! A preset is pure data. The built-in tables here cover the common PWA
//! surface — favicon, transparent and maskable manifest icons, the Apple
//! touch icon, Apple splash screens for current devices, and Windows tiles.
//! User configuration overrides any of them; see [`Preset::from_config`].

use crate::config::AssetConfig;
use crate::options::{PngOptions, ResizeOptions};
use serde::{Deserialize, Serialize};

/// One canonical asset dimension requested by configuration.
///
/// Width and height are the portrait-orientation pixel dimensions of the
/// rendered asset. `scale_factor` is the device pixel ratio and only
/// influences splash-screen media queries, never pixel output. Descriptors
/// are immutable once resolution begins; the cascade builds new resolved
/// records instead of back-filling fields here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeDescriptor {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub scale_factor: Option<u32>,
    #[serde(default)]
    pub resize: Option<ResizeOptions>,
    #[serde(default)]
    pub dark_resize: Option<ResizeOptions>,
    #[serde(default)]
    pub padding: Option<f32>,
    #[serde(default)]
    pub png: Option<PngOptions>,
}

impl SizeDescriptor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: None,
            resize: None,
            dark_resize: None,
            padding: None,
            png: None,
        }
    }

    fn device(width: u32, height: u32, scale_factor: u32) -> Self {
        Self {
            scale_factor: Some(scale_factor),
            ..Self::new(width, height)
        }
    }
}

/// Splash screens for current Apple devices, portrait pixel dimensions with
/// device pixel ratio. Several devices share dimensions at different scale
/// factors; the variant expander deduplicates those.
pub fn apple_splash_screens() -> Vec<SizeDescriptor> {
    vec![
        SizeDescriptor::device(2048, 2732, 2), // 12.9" iPad Pro
        SizeDescriptor::device(1668, 2388, 2), // 11" iPad Pro
        SizeDescriptor::device(1536, 2048, 2), // 9.7" iPad
        SizeDescriptor::device(1668, 2224, 2), // 10.5" iPad Air
        SizeDescriptor::device(1620, 2160, 2), // 10.2" iPad
        SizeDescriptor::device(1290, 2796, 3), // iPhone 14 Pro Max
        SizeDescriptor::device(1179, 2556, 3), // iPhone 14 Pro
        SizeDescriptor::device(1284, 2778, 3), // iPhone 13 Pro Max
        SizeDescriptor::device(1170, 2532, 3), // iPhone 13 / 13 Pro
        SizeDescriptor::device(1125, 2436, 3), // iPhone X / XS
        SizeDescriptor::device(1242, 2688, 3), // iPhone XS Max
        SizeDescriptor::device(828, 1792, 2),  // iPhone XR
        SizeDescriptor::device(1242, 2208, 3), // iPhone 8 Plus
        SizeDescriptor::device(750, 1334, 2),  // iPhone 8
        SizeDescriptor::device(640, 1136, 2),  // iPhone SE
    ]
}

/// msapplication tile sizes: small, medium, wide, large.
pub fn windows_tiles() -> Vec<(u32, u32)> {
    vec![(70, 70), (150, 150), (310, 150), (310, 310)]
}

/// Per-category icon padding fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconPadding {
    pub transparent: f32,
    pub maskable: f32,
    pub apple_touch: f32,
}

impl Default for IconPadding {
    fn default() -> Self {
        Self {
            transparent: 0.05,
            maskable: 0.3,
            apple_touch: 0.3,
        }
    }
}

/// A fully assembled preset: every category's sizes plus the preset-level
/// option layers the cascade falls back to.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub favicon: Vec<u32>,
    pub transparent: Vec<u32>,
    pub maskable: Vec<u32>,
    pub apple_touch: Vec<u32>,
    pub windows_tile: Vec<(u32, u32)>,
    pub icon_padding: IconPadding,
    pub splash: Vec<SizeDescriptor>,
    /// Preset-level resize layer for light splash variants.
    pub splash_resize: Option<ResizeOptions>,
    /// Preset-level resize layer for dark splash variants. `Some` enables
    /// dark variant production for every descriptor without its own
    /// `dark_resize` override.
    pub splash_dark_resize: Option<ResizeOptions>,
    pub splash_padding: Option<f32>,
    pub png: Option<PngOptions>,
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            favicon: vec![48],
            transparent: vec![64, 192, 512],
            maskable: vec![512],
            apple_touch: vec![180],
            windows_tile: windows_tiles(),
            icon_padding: IconPadding::default(),
            splash: apple_splash_screens(),
            splash_resize: None,
            splash_dark_resize: None,
            splash_padding: None,
            png: None,
        }
    }
}

impl Preset {
    /// Build a preset from loaded configuration.
    ///
    /// Empty splash size lists fall back to the built-in Apple device table.
    /// Dark variants are enabled by `splash.dark = true` (empty dark layer,
    /// scheme defaults apply) or by a `[splash.dark_resize]` section.
    pub fn from_config(config: &AssetConfig) -> Self {
        let splash = if !config.splash.enabled {
            Vec::new()
        } else if config.splash.sizes.is_empty() {
            apple_splash_screens()
        } else {
            config.splash.sizes.clone()
        };
        let splash_dark_resize = config
            .splash
            .dark_resize
            .clone()
            .or_else(|| config.splash.dark.then(ResizeOptions::default));
        Self {
            favicon: config.icons.favicon.clone(),
            transparent: config.icons.transparent.clone(),
            maskable: config.icons.maskable.clone(),
            apple_touch: config.icons.apple_touch.clone(),
            windows_tile: config.icons.windows_tile.iter().map(|&[w, h]| (w, h)).collect(),
            icon_padding: config.icons.padding,
            splash,
            splash_resize: config.splash.resize.clone(),
            splash_dark_resize,
            splash_padding: config.splash.padding,
            png: Some(config.png.clone()),
        }
    }
}
