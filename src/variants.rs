//! Splash-screen variant expansion.
//!
//! Each [`SizeDescriptor`] expands into up to four rendering variants:
//! portrait-light, landscape-light, and — when a dark-mode resize layer
//! exists — portrait-dark, landscape-dark, in exactly that order. Landscape
//! is a dimension transposition, not a crop: the canvas and the explicit
//! resize-option width/height both swap.
//!
//! The emission order per descriptor, and descriptors in input order, is an
//! observable contract: head links render in this order on every run.
//!
//! Duplicate descriptors are dropped by [`DedupPolicy`]. The stock policy
//! keys on the declared portrait `(width, height)` pair alone, so the first
//! descriptor with a given dimension wins and later ones are skipped wholesale
//! — portrait, landscape, and dark variants together — even when their scale
//! factor or options differ. Whether that discard is intended product
//! behavior is an open question upstream; the policy is therefore a named,
//! swappable value rather than inlined control flow.

use crate::options::{
    Defaults, PngOptions, PngSettings, ResizeOptions, ResizeSettings, cascade_padding,
    cascade_png, cascade_resize,
};
use crate::preset::SizeDescriptor;
use std::collections::HashSet;

/// One concrete orientation × color-scheme rendering of a descriptor.
///
/// `dark` is `None` when the descriptor has no dark-mode layer (no dark
/// variant exists at all), `Some(false)` for the light variant of a
/// descriptor that also renders dark, `Some(true)` for the dark variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedVariant {
    pub canonical_width: u32,
    pub canonical_height: u32,
    pub scale_factor: u32,
    pub render_width: u32,
    pub render_height: u32,
    pub landscape: bool,
    pub dark: Option<bool>,
    pub resize: ResizeSettings,
    pub padding: f32,
    pub png: PngSettings,
}

/// Preset-level option layers the per-descriptor cascade falls back to.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplashLayer<'a> {
    pub resize: Option<&'a ResizeOptions>,
    pub dark_resize: Option<&'a ResizeOptions>,
    pub padding: Option<f32>,
    pub png: Option<&'a PngOptions>,
}

/// How duplicate descriptors are recognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Key on the declared portrait `(width, height)` pair only. First
    /// descriptor wins; later ones are dropped even when scale factor,
    /// padding, or resize options differ.
    #[default]
    ByDeclaredDimensions,
    /// Key on the full descriptor identity; only exact repeats are dropped.
    ByFullIdentity,
}

impl DedupPolicy {
    fn key(self, descriptor: &SizeDescriptor) -> String {
        match self {
            DedupPolicy::ByDeclaredDimensions => {
                format!("{}x{}", descriptor.width, descriptor.height)
            }
            // Descriptor field order is stable, so the serialized form is a
            // usable identity key.
            DedupPolicy::ByFullIdentity => {
                serde_json::to_string(descriptor).unwrap_or_default()
            }
        }
    }
}

/// Expand descriptors into the ordered variant sequence.
pub fn expand(
    descriptors: &[SizeDescriptor],
    layer: SplashLayer<'_>,
    defaults: &Defaults,
    policy: DedupPolicy,
) -> Vec<ResolvedVariant> {
    let mut seen = HashSet::new();
    let mut variants = Vec::new();

    for descriptor in descriptors {
        if !seen.insert(policy.key(descriptor)) {
            continue;
        }

        let has_dark =
            descriptor.dark_resize.is_some() || layer.dark_resize.is_some();
        let padding = cascade_padding(descriptor.padding, layer.padding, defaults);
        let png = cascade_png(descriptor.png.as_ref(), layer.png, defaults);
        let scale_factor = descriptor.scale_factor.unwrap_or(1);

        let light = cascade_resize(descriptor.resize.as_ref(), layer.resize, defaults);
        let schemes: Vec<(Option<bool>, ResizeSettings)> = if has_dark {
            let dark = cascade_resize(
                descriptor.dark_resize.as_ref(),
                layer.dark_resize,
                defaults,
            );
            vec![(Some(false), light), (Some(true), dark)]
        } else {
            vec![(None, light)]
        };

        for (dark, resize) in &schemes {
            for landscape in [false, true] {
                let (render_width, render_height) = if landscape {
                    (descriptor.height, descriptor.width)
                } else {
                    (descriptor.width, descriptor.height)
                };
                let resize = if landscape {
                    resize.clone().transposed()
                } else {
                    resize.clone()
                };
                variants.push(ResolvedVariant {
                    canonical_width: descriptor.width,
                    canonical_height: descriptor.height,
                    scale_factor,
                    render_width,
                    render_height,
                    landscape,
                    dark: *dark,
                    resize,
                    padding,
                    png,
                });
            }
        }
    }

    variants
}
