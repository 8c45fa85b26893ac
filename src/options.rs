//! Layered option resolution.
//!
//! Every tunable that influences pixel output — resize behavior, PNG
//! compression, padding — can be set at three levels:
//!
//! ```text
//! built-in defaults  →  preset level  →  per-size level
//! ```
//!
//! The cascade is **field-wise**, not record-wise: a per-size resize record
//! that only sets `width` still inherits `height`, `fit`, and `background`
//! from the preset layer (and from the built-in defaults below that). This
//! mirrors how partial `config.toml` sections merge elsewhere in the crate.
//!
//! Partial layers are the `*Options` types (every field optional, straight
//! from configuration). Cascading produces the `*Settings` types, which the
//! rest of the pipeline consumes without further `Option` handling.
//!
//! All built-in hard defaults live in one [`Defaults`] table that callers
//! pass explicitly. There is no module-level mutable state.

use serde::{Deserialize, Serialize};

/// How the source image is fitted into its content box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to fit entirely within the box, preserving aspect ratio.
    #[default]
    Contain,
    /// Scale to cover the box entirely, cropping overflow.
    Cover,
}

/// Partial resize options, as written in configuration.
///
/// `width`/`height`, when set, pin the rendered content to exact pixel
/// dimensions instead of the padding-derived content box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Option<Fit>,
    /// Canvas fill color (`"white"`, `"black"`, `"transparent"`, or hex).
    /// When absent, splash screens fall back to the scheme default.
    pub background: Option<String>,
}

/// Fully cascaded resize settings.
///
/// `width`/`height` stay optional by nature: `None` means "use the
/// padding-derived content box". `background: None` means "scheme default"
/// and is resolved by the entry builder, which knows the color scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSettings {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Fit,
    pub background: Option<String>,
}

impl ResizeSettings {
    /// Swap the `width`/`height` fields, for landscape transposition.
    pub fn transposed(mut self) -> Self {
        std::mem::swap(&mut self.width, &mut self.height);
        self
    }
}

/// PNG compression effort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    Fast,
    #[default]
    Default,
    Best,
}

/// PNG scanline filter strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngFilter {
    None,
    Sub,
    Up,
    Average,
    Paeth,
    #[default]
    Adaptive,
}

/// Partial PNG options, as written in configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PngOptions {
    pub compression: Option<PngCompression>,
    pub filter: Option<PngFilter>,
}

/// Fully cascaded PNG settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PngSettings {
    pub compression: PngCompression,
    pub filter: PngFilter,
}

/// The single table of built-in hard defaults.
///
/// Passed explicitly into every cascade call and into the entry builders.
/// These values are the bottom layer of every cascade chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    /// Splash-screen padding as a fraction of the shorter canvas dimension.
    pub padding: f32,
    /// Canvas fill for light splash variants without an explicit background.
    pub light_background: String,
    /// Canvas fill for dark splash variants without an explicit background.
    pub dark_background: String,
    /// URL prefix for every generated asset.
    pub base_path: String,
    pub fit: Fit,
    pub png: PngSettings,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            padding: 0.3,
            light_background: "white".to_string(),
            dark_background: "black".to_string(),
            base_path: "/".to_string(),
            fit: Fit::Contain,
            png: PngSettings::default(),
        }
    }
}

/// Cascade resize options field by field: per-size > preset > defaults.
pub fn cascade_resize(
    per_size: Option<&ResizeOptions>,
    preset: Option<&ResizeOptions>,
    defaults: &Defaults,
) -> ResizeSettings {
    let field = |get: fn(&ResizeOptions) -> Option<u32>| {
        per_size.and_then(get).or_else(|| preset.and_then(get))
    };
    ResizeSettings {
        width: field(|o| o.width),
        height: field(|o| o.height),
        fit: per_size
            .and_then(|o| o.fit)
            .or_else(|| preset.and_then(|o| o.fit))
            .unwrap_or(defaults.fit),
        background: per_size
            .and_then(|o| o.background.clone())
            .or_else(|| preset.and_then(|o| o.background.clone())),
    }
}

/// Cascade PNG options field by field: per-size > preset > defaults.
pub fn cascade_png(
    per_size: Option<&PngOptions>,
    preset: Option<&PngOptions>,
    defaults: &Defaults,
) -> PngSettings {
    PngSettings {
        compression: per_size
            .and_then(|o| o.compression)
            .or_else(|| preset.and_then(|o| o.compression))
            .unwrap_or(defaults.png.compression),
        filter: per_size
            .and_then(|o| o.filter)
            .or_else(|| preset.and_then(|o| o.filter))
            .unwrap_or(defaults.png.filter),
    }
}

/// Cascade padding: per-size > preset > defaults.
pub fn cascade_padding(per_size: Option<f32>, preset: Option<f32>, defaults: &Defaults) -> f32 {
    per_size.or(preset).unwrap_or(defaults.padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_table_values() {
        let d = Defaults::default();
        assert_eq!(d.padding, 0.3);
        assert_eq!(d.light_background, "white");
        assert_eq!(d.dark_background, "black");
        assert_eq!(d.base_path, "/");
        assert_eq!(d.fit, Fit::Contain);
        assert_eq!(d.png.compression, PngCompression::Default);
        assert_eq!(d.png.filter, PngFilter::Adaptive);
    }

    #[test]
    fn cascade_resize_falls_through_to_defaults() {
        let settings = cascade_resize(None, None, &Defaults::default());
        assert_eq!(settings.width, None);
        assert_eq!(settings.height, None);
        assert_eq!(settings.fit, Fit::Contain);
        assert_eq!(settings.background, None);
    }

    #[test]
    fn cascade_resize_is_field_wise_not_record_wise() {
        // Per-size sets only width; height must come from the preset layer.
        let per_size = ResizeOptions {
            width: Some(100),
            ..Default::default()
        };
        let preset = ResizeOptions {
            width: Some(50),
            height: Some(80),
            fit: Some(Fit::Cover),
            background: Some("#202020".to_string()),
        };
        let settings = cascade_resize(Some(&per_size), Some(&preset), &Defaults::default());

        assert_eq!(settings.width, Some(100));
        assert_eq!(settings.height, Some(80));
        assert_eq!(settings.fit, Fit::Cover);
        assert_eq!(settings.background.as_deref(), Some("#202020"));
    }

    #[test]
    fn cascade_resize_per_size_wins_over_preset() {
        let per_size = ResizeOptions {
            background: Some("white".to_string()),
            ..Default::default()
        };
        let preset = ResizeOptions {
            background: Some("black".to_string()),
            ..Default::default()
        };
        let settings = cascade_resize(Some(&per_size), Some(&preset), &Defaults::default());
        assert_eq!(settings.background.as_deref(), Some("white"));
    }

    #[test]
    fn cascade_png_mixes_layers() {
        let per_size = PngOptions {
            compression: Some(PngCompression::Best),
            filter: None,
        };
        let preset = PngOptions {
            compression: Some(PngCompression::Fast),
            filter: Some(PngFilter::Paeth),
        };
        let settings = cascade_png(Some(&per_size), Some(&preset), &Defaults::default());
        assert_eq!(settings.compression, PngCompression::Best);
        assert_eq!(settings.filter, PngFilter::Paeth);
    }

    #[test]
    fn cascade_padding_prefers_innermost_layer() {
        let defaults = Defaults::default();
        assert_eq!(cascade_padding(Some(0.1), Some(0.2), &defaults), 0.1);
        assert_eq!(cascade_padding(None, Some(0.2), &defaults), 0.2);
        assert_eq!(cascade_padding(None, None, &defaults), 0.3);
    }

    #[test]
    fn transposed_swaps_width_and_height() {
        let settings = ResizeSettings {
            width: Some(320),
            height: Some(480),
            fit: Fit::Contain,
            background: None,
        };
        let swapped = settings.transposed();
        assert_eq!(swapped.width, Some(480));
        assert_eq!(swapped.height, Some(320));
    }

    #[test]
    fn resize_options_parse_from_toml() {
        let opts: ResizeOptions = toml::from_str(
            r##"
fit = "cover"
background = "#1f1f1f"
"##,
        )
        .unwrap();
        assert_eq!(opts.fit, Some(Fit::Cover));
        assert_eq!(opts.background.as_deref(), Some("#1f1f1f"));
        assert_eq!(opts.width, None);
    }
}
