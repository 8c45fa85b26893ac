//! Instruction resolution: preset + source image → instruction set.
//!
//! Resolution is pure and synchronous apart from one suspension point — the
//! source image is read and decoded exactly once, up front, and shared
//! across every entry. No compositor call and no filesystem write happens
//! here; the result is an inspectable description of all assets to produce.
//!
//! Each source image resolves independently; callers may resolve many in
//! parallel. Categories resolve independently of each other — there is no
//! cross-category dedup.

use crate::entry::{AssetEntry, AssetKind, IconSpec, ResolveOptions, icon_entry, splash_entry};
use crate::markup::HeadLink;
use crate::options::{Defaults, cascade_png};
use crate::preset::Preset;
use crate::variants::{DedupPolicy, SplashLayer, expand};
use image::DynamicImage;
use maud::{Markup, PreEscaped};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("failed to read source image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode source image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("invalid size descriptor {width}x{height}: {reason}")]
    InvalidDescriptor {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// The resolved, pre-generation description of all assets for one source
/// image: per category, insertion-ordered entries with unique URLs.
#[derive(Debug)]
pub struct InstructionSet {
    pub source: PathBuf,
    entries: BTreeMap<AssetKind, Vec<AssetEntry>>,
}

impl InstructionSet {
    fn new(source: PathBuf) -> Self {
        Self {
            source,
            entries: BTreeMap::new(),
        }
    }

    fn push(&mut self, entry: AssetEntry) {
        let bucket = self.entries.entry(entry.kind).or_default();
        debug_assert!(
            bucket.iter().all(|e| e.url != entry.url),
            "duplicate url {} in category {}",
            entry.url,
            entry.kind
        );
        bucket.push(entry);
    }

    /// Entries of one category, in insertion order.
    pub fn entries(&self, kind: AssetKind) -> &[AssetEntry] {
        self.entries.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All entries: categories in declared order, insertion order within.
    pub fn iter(&self) -> impl Iterator<Item = &AssetEntry> {
        self.entries.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up an entry by URL within a category.
    pub fn get(&self, kind: AssetKind, url: &str) -> Option<&AssetEntry> {
        self.entries(kind).iter().find(|e| e.url == url)
    }

    /// Ordered head-link strings, one per entry that declares a link.
    pub fn head_links(&self) -> Vec<String> {
        self.iter().filter_map(|e| e.link_html.clone()).collect()
    }

    /// The structured counterparts of [`head_links`](Self::head_links), in
    /// the same order.
    pub fn head_link_objects(&self) -> Vec<&HeadLink> {
        self.iter().filter_map(|e| e.link.as_ref()).collect()
    }

    /// All head links concatenated as maud markup, for embedding in
    /// templates.
    pub fn head_markup(&self) -> Markup {
        PreEscaped(self.head_links().join("\n"))
    }
}

fn validate_preset(preset: &Preset) -> Result<(), ResolveError> {
    for d in &preset.splash {
        if d.width == 0 || d.height == 0 {
            return Err(ResolveError::InvalidDescriptor {
                width: d.width,
                height: d.height,
                reason: "dimensions must be non-zero".to_string(),
            });
        }
        if let Some(p) = d.padding
            && !(0.0..=1.0).contains(&p)
        {
            return Err(ResolveError::InvalidDescriptor {
                width: d.width,
                height: d.height,
                reason: format!("padding {p} outside 0..=1"),
            });
        }
    }
    Ok(())
}

/// Resolve the full instruction set for one source image on disk.
///
/// This is the only point during resolution that touches storage: the image
/// is read and decoded once, then shared by every entry's pending producer.
pub fn resolve(
    source: &Path,
    preset: &Preset,
    options: &ResolveOptions,
    defaults: &Defaults,
) -> Result<InstructionSet, ResolveError> {
    let bytes = std::fs::read(source).map_err(|e| ResolveError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|e| ResolveError::Decode {
        path: source.to_path_buf(),
        source: e,
    })?;
    resolve_image(source.to_path_buf(), image, preset, options, defaults)
}

/// Resolve from an already decoded image. Used by [`resolve`] and directly
/// by tests.
pub fn resolve_image(
    source: PathBuf,
    image: DynamicImage,
    preset: &Preset,
    options: &ResolveOptions,
    defaults: &Defaults,
) -> Result<InstructionSet, ResolveError> {
    validate_preset(preset)?;

    let shared = Arc::new(image);
    let png = cascade_png(None, preset.png.as_ref(), defaults);
    let mut set = InstructionSet::new(source);

    for &size in &preset.favicon {
        set.push(icon_entry(
            &shared,
            IconSpec {
                kind: AssetKind::Favicon,
                name: format!("favicon-{size}x{size}.png"),
                width: size,
                height: size,
                padding: 0.0,
                background: None,
                rel: Some("icon"),
            },
            png,
            options,
            defaults,
        ));
    }

    for &size in &preset.transparent {
        set.push(icon_entry(
            &shared,
            IconSpec {
                kind: AssetKind::Transparent,
                name: format!("pwa-{size}x{size}.png"),
                width: size,
                height: size,
                padding: preset.icon_padding.transparent,
                background: None,
                rel: Some("icon"),
            },
            png,
            options,
            defaults,
        ));
    }

    for &size in &preset.maskable {
        set.push(icon_entry(
            &shared,
            IconSpec {
                kind: AssetKind::Maskable,
                name: format!("maskable-icon-{size}x{size}.png"),
                width: size,
                height: size,
                padding: preset.icon_padding.maskable,
                background: Some(defaults.light_background.clone()),
                rel: None,
            },
            png,
            options,
            defaults,
        ));
    }

    for &size in &preset.apple_touch {
        set.push(icon_entry(
            &shared,
            IconSpec {
                kind: AssetKind::AppleTouch,
                name: format!("apple-touch-icon-{size}x{size}.png"),
                width: size,
                height: size,
                padding: preset.icon_padding.apple_touch,
                background: Some(defaults.light_background.clone()),
                rel: Some("apple-touch-icon"),
            },
            png,
            options,
            defaults,
        ));
    }

    let layer = SplashLayer {
        resize: preset.splash_resize.as_ref(),
        dark_resize: preset.splash_dark_resize.as_ref(),
        padding: preset.splash_padding,
        png: preset.png.as_ref(),
    };
    for variant in expand(&preset.splash, layer, defaults, DedupPolicy::default()) {
        set.push(splash_entry(&shared, &variant, options, defaults));
    }

    for &(width, height) in &preset.windows_tile {
        set.push(icon_entry(
            &shared,
            IconSpec {
                kind: AssetKind::WindowsTile,
                name: format!("mstile-{width}x{height}.png"),
                width,
                height,
                padding: 0.0,
                background: None,
                rel: None,
            },
            png,
            options,
            defaults,
        ));
    }

    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ResizeOptions;
    use crate::preset::SizeDescriptor;
    use crate::test_helpers::{small_preset, test_image};

    fn resolve_small() -> InstructionSet {
        resolve_image(
            PathBuf::from("logo.png"),
            test_image(64, 64),
            &small_preset(),
            &ResolveOptions::default(),
            &Defaults::default(),
        )
        .unwrap()
    }

    #[test]
    fn categories_come_out_in_declared_order() {
        let set = resolve_small();
        let kinds: Vec<AssetKind> = {
            let mut seen = Vec::new();
            for entry in set.iter() {
                if seen.last() != Some(&entry.kind) {
                    seen.push(entry.kind);
                }
            }
            seen
        };
        assert_eq!(
            kinds,
            vec![
                AssetKind::Favicon,
                AssetKind::Transparent,
                AssetKind::Maskable,
                AssetKind::AppleTouch,
                AssetKind::AppleSplash,
                AssetKind::WindowsTile,
            ]
        );
    }

    #[test]
    fn urls_are_unique_per_category() {
        let set = resolve_small();
        for kind in AssetKind::ALL {
            let urls: Vec<&str> = set.entries(kind).iter().map(|e| e.url.as_str()).collect();
            let mut deduped = urls.clone();
            deduped.sort_unstable();
            deduped.dedup();
            assert_eq!(urls.len(), deduped.len(), "duplicate url in {kind}");
        }
    }

    #[test]
    fn resolution_is_structurally_idempotent() {
        let a = resolve_small();
        let b = resolve_small();
        assert_eq!(a.len(), b.len());
        for kind in AssetKind::ALL {
            let left: Vec<_> = a
                .entries(kind)
                .iter()
                .map(|e| (&e.url, e.width, e.height, &e.link_html))
                .collect();
            let right: Vec<_> = b
                .entries(kind)
                .iter()
                .map(|e| (&e.url, e.width, e.height, &e.link_html))
                .collect();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn head_links_match_link_objects() {
        let set = resolve_small();
        let strings = set.head_links();
        let objects = set.head_link_objects();
        assert_eq!(strings.len(), objects.len());
        for (rendered, object) in strings.iter().zip(&objects) {
            assert_eq!(rendered, &object.render(crate::markup::MarkupStyle::Html));
        }
        // Maskable and Windows entries are manifest-only.
        let linkless = set.len() - strings.len();
        assert_eq!(
            linkless,
            set.entries(AssetKind::Maskable).len() + set.entries(AssetKind::WindowsTile).len()
        );
    }

    #[test]
    fn splash_scenario_without_dark_yields_two_entries() {
        let mut preset = small_preset();
        preset.splash = vec![SizeDescriptor::new(640, 1136)];
        let set = resolve_image(
            PathBuf::from("logo.png"),
            test_image(64, 64),
            &preset,
            &ResolveOptions::default(),
            &Defaults::default(),
        )
        .unwrap();

        let splash = set.entries(AssetKind::AppleSplash);
        assert_eq!(splash.len(), 2);
        assert_eq!((splash[0].width, splash[0].height), (640, 1136));
        assert_eq!((splash[1].width, splash[1].height), (1136, 640));
        for entry in splash {
            assert_eq!(entry.image.background.as_deref(), Some("white"));
        }
    }

    #[test]
    fn splash_scenario_with_dark_yields_four_entries() {
        let mut preset = small_preset();
        preset.splash = vec![SizeDescriptor {
            dark_resize: Some(ResizeOptions::default()),
            ..SizeDescriptor::new(640, 1136)
        }];
        let set = resolve_image(
            PathBuf::from("logo.png"),
            test_image(64, 64),
            &preset,
            &ResolveOptions::default(),
            &Defaults::default(),
        )
        .unwrap();

        let splash = set.entries(AssetKind::AppleSplash);
        assert_eq!(splash.len(), 4);
        assert_eq!(splash[2].image.background.as_deref(), Some("black"));
        assert_eq!(splash[3].image.background.as_deref(), Some("black"));
    }

    #[test]
    fn zero_dimension_descriptor_fails_resolution() {
        let mut preset = small_preset();
        preset.splash = vec![SizeDescriptor::new(0, 1136)];
        let result = resolve_image(
            PathBuf::from("logo.png"),
            test_image(64, 64),
            &preset,
            &ResolveOptions::default(),
            &Defaults::default(),
        );
        assert!(matches!(
            result,
            Err(ResolveError::InvalidDescriptor { width: 0, .. })
        ));
    }

    #[test]
    fn out_of_range_padding_fails_resolution() {
        let mut preset = small_preset();
        preset.splash = vec![SizeDescriptor {
            padding: Some(1.5),
            ..SizeDescriptor::new(640, 1136)
        }];
        assert!(
            resolve_image(
                PathBuf::from("logo.png"),
                test_image(64, 64),
                &preset,
                &ResolveOptions::default(),
                &Defaults::default(),
            )
            .is_err()
        );
    }

    #[test]
    fn missing_source_surfaces_read_error() {
        let result = resolve(
            Path::new("/nonexistent/logo.png"),
            &small_preset(),
            &ResolveOptions::default(),
            &Defaults::default(),
        );
        assert!(matches!(result, Err(ResolveError::Read { .. })));
    }
}
