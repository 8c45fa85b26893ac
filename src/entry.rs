//! Asset entries and their deferred image producers.
//!
//! An [`AssetEntry`] is the unit of output: name, URL, dimensions, the
//! pre-rendered HTML link (when the category has one), and a
//! [`PendingImage`]. The pending image is a plain description of compositor
//! inputs — not a capturing closure — so generation is auditable and
//! re-invocation is trivially safe: [`PendingImage::produce`] recomputes
//! from the same inputs every time and performs no caching.
//!
//! Builders here compute *what* to render; the compositor decides *how*.
//! Nothing in this module touches pixels or the filesystem.

use crate::compositor::{Compositor, CompositorError};
use crate::config::AssetConfig;
use crate::markup::{HeadLink, MarkupStyle};
use crate::options::{Defaults, PngSettings, ResizeSettings};
use crate::variants::ResolvedVariant;
use image::DynamicImage;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub const PNG_MIME: &str = "image/png";

/// Asset categories, in the fixed order they render into markup and
/// manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Favicon,
    Transparent,
    Maskable,
    AppleTouch,
    AppleSplash,
    WindowsTile,
}

impl AssetKind {
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Favicon,
        AssetKind::Transparent,
        AssetKind::Maskable,
        AssetKind::AppleTouch,
        AssetKind::AppleSplash,
        AssetKind::WindowsTile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Favicon => "favicon",
            AssetKind::Transparent => "transparent icon",
            AssetKind::Maskable => "maskable icon",
            AssetKind::AppleTouch => "apple touch icon",
            AssetKind::AppleSplash => "apple splash screen",
            AssetKind::WindowsTile => "windows tile",
        }
    }

    /// Whether entries of this category feed the web-manifest `icons` array.
    pub fn in_manifest(self) -> bool {
        matches!(self, AssetKind::Transparent | AssetKind::Maskable)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Splash-screen naming function: `(landscape, canonical size, dark)` to a
/// file name. Injected so callers can impose their own conventions; must be
/// pure and deterministic — entry URLs derive from it.
pub type SplashNameFn = fn(landscape: bool, size: (u32, u32), dark: Option<bool>) -> String;

/// Stock naming: `apple-splash-{portrait|landscape}[-dark]-{W}x{H}.png`
/// over the canonical portrait dimensions.
pub fn default_splash_name(landscape: bool, size: (u32, u32), dark: Option<bool>) -> String {
    let orientation = if landscape { "landscape" } else { "portrait" };
    let scheme = if dark == Some(true) { "-dark" } else { "" };
    format!(
        "apple-splash-{orientation}{scheme}-{}x{}.png",
        size.0, size.1
    )
}

/// Caller-facing knobs for instruction resolution.
#[derive(Debug, Clone)]
pub struct ResolveOptions {
    /// URL prefix, must end with `/`.
    pub base_path: String,
    pub markup: MarkupStyle,
    /// Emit stable `id` attributes on head links.
    pub link_ids: bool,
    pub splash_name: SplashNameFn,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            base_path: Defaults::default().base_path,
            markup: MarkupStyle::default(),
            link_ids: false,
            splash_name: default_splash_name,
        }
    }
}

impl ResolveOptions {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            base_path: config.base_path.clone(),
            markup: config.markup,
            link_ids: config.link_ids,
            splash_name: default_splash_name,
        }
    }
}

/// A deferred compositor invocation: the description of one image to render.
///
/// Holds a shared handle to the decoded source; producing never re-reads
/// storage. Safe to call any number of times.
#[derive(Clone)]
pub struct PendingImage {
    source: Arc<DynamicImage>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub content_width: u32,
    pub content_height: u32,
    pub resize: ResizeSettings,
    pub background: Option<String>,
    pub png: PngSettings,
}

impl PendingImage {
    /// Invoke the compositor: resize into the content box, composite onto
    /// the canvas, encode. Recomputes on every call.
    pub fn produce(&self, compositor: &impl Compositor) -> Result<Vec<u8>, CompositorError> {
        let content = compositor.resize(
            &self.source,
            self.content_width,
            self.content_height,
            &self.resize,
        )?;
        let canvas = compositor.composite(
            &content,
            self.canvas_width,
            self.canvas_height,
            self.background.as_deref(),
        )?;
        compositor.encode(&canvas, &self.png)
    }
}

impl fmt::Debug for PendingImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingImage")
            .field("canvas", &(self.canvas_width, self.canvas_height))
            .field("content", &(self.content_width, self.content_height))
            .field("resize", &self.resize)
            .field("background", &self.background)
            .field("png", &self.png)
            .finish()
    }
}

/// One resolved output asset.
#[derive(Debug, Clone)]
pub struct AssetEntry {
    pub kind: AssetKind,
    pub name: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
    /// Structured head link; `None` for manifest-only categories.
    pub link: Option<HeadLink>,
    /// The same link pre-rendered with the configured markup style.
    pub link_html: Option<String>,
    pub image: PendingImage,
}

/// The content box an image is scaled into before compositing: the canvas
/// minus the padding fraction of the shorter canvas dimension, split evenly
/// around the content. Explicit resize width/height override the box.
fn content_box(
    canvas_width: u32,
    canvas_height: u32,
    padding: f32,
    resize: &ResizeSettings,
) -> (u32, u32) {
    let inset = (padding * canvas_width.min(canvas_height) as f32).round() as u32;
    let width = resize
        .width
        .unwrap_or_else(|| canvas_width.saturating_sub(inset).max(1));
    let height = resize
        .height
        .unwrap_or_else(|| canvas_height.saturating_sub(inset).max(1));
    (width, height)
}

/// `id` attribute value for a link: the asset name without its extension.
fn link_id(name: &str) -> String {
    name.strip_suffix(".png").unwrap_or(name).to_string()
}

/// Media query for a splash variant. Device dimensions are CSS pixels
/// derived from the canonical portrait size in both orientations, matching
/// how `apple-touch-startup-image` queries are written in the wild.
fn splash_media(variant: &ResolvedVariant) -> String {
    let scale = variant.scale_factor.max(1);
    let device_width = variant.canonical_width / scale;
    let device_height = variant.canonical_height / scale;
    let orientation = if variant.landscape {
        "landscape"
    } else {
        "portrait"
    };
    let mut media = format!(
        "screen and (device-width: {device_width}px) and (device-height: {device_height}px) \
         and (-webkit-device-pixel-ratio: {scale}) and (orientation: {orientation})"
    );
    match variant.dark {
        Some(true) => media.push_str(" and (prefers-color-scheme: dark)"),
        Some(false) => media.push_str(" and (prefers-color-scheme: light)"),
        None => {}
    }
    media
}

/// Build the entry for one splash-screen variant.
pub fn splash_entry(
    source: &Arc<DynamicImage>,
    variant: &ResolvedVariant,
    options: &ResolveOptions,
    defaults: &Defaults,
) -> AssetEntry {
    let name = (options.splash_name)(
        variant.landscape,
        (variant.canonical_width, variant.canonical_height),
        variant.dark,
    );
    let url = format!("{}{}", options.base_path, name);

    let background = variant.resize.background.clone().unwrap_or_else(|| {
        if variant.dark == Some(true) {
            defaults.dark_background.clone()
        } else {
            defaults.light_background.clone()
        }
    });

    let (content_width, content_height) = content_box(
        variant.render_width,
        variant.render_height,
        variant.padding,
        &variant.resize,
    );

    let link = HeadLink {
        rel: "apple-touch-startup-image",
        href: url.clone(),
        id: options.link_ids.then(|| link_id(&name)),
        media: Some(splash_media(variant)),
        sizes: None,
        mime_type: None,
    };
    let link_html = link.render(options.markup);

    AssetEntry {
        kind: AssetKind::AppleSplash,
        name,
        url,
        width: variant.render_width,
        height: variant.render_height,
        mime_type: PNG_MIME,
        link: Some(link),
        link_html: Some(link_html),
        image: PendingImage {
            source: Arc::clone(source),
            canvas_width: variant.render_width,
            canvas_height: variant.render_height,
            content_width,
            content_height,
            resize: variant.resize.clone(),
            background: Some(background),
            png: variant.png,
        },
    }
}

/// Category-specific parameters for an icon entry.
#[derive(Debug, Clone)]
pub struct IconSpec {
    pub kind: AssetKind,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub padding: f32,
    /// `None` keeps the canvas transparent.
    pub background: Option<String>,
    /// `None` for manifest-only categories with no head link.
    pub rel: Option<&'static str>,
}

/// Build an icon-family entry (favicon, transparent, maskable, Apple touch,
/// Windows tile).
pub fn icon_entry(
    source: &Arc<DynamicImage>,
    spec: IconSpec,
    png: PngSettings,
    options: &ResolveOptions,
    defaults: &Defaults,
) -> AssetEntry {
    let url = format!("{}{}", options.base_path, spec.name);
    let resize = ResizeSettings {
        width: None,
        height: None,
        fit: defaults.fit,
        background: spec.background.clone(),
    };
    let (content_width, content_height) =
        content_box(spec.width, spec.height, spec.padding, &resize);

    let link = spec.rel.map(|rel| HeadLink {
        rel,
        href: url.clone(),
        id: options.link_ids.then(|| link_id(&spec.name)),
        media: None,
        sizes: Some(format!("{}x{}", spec.width, spec.height)),
        mime_type: Some(PNG_MIME),
    });
    let link_html = link.as_ref().map(|l| l.render(options.markup));

    AssetEntry {
        kind: spec.kind,
        name: spec.name.clone(),
        url,
        width: spec.width,
        height: spec.height,
        mime_type: PNG_MIME,
        link,
        link_html,
        image: PendingImage {
            source: Arc::clone(source),
            canvas_width: spec.width,
            canvas_height: spec.height,
            content_width,
            content_height,
            resize,
            background: spec.background,
            png,
        },
    }
}
