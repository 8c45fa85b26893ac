//! # pwa-assets
//!
//! Turn a source image plus a declarative preset into the full set of
//! platform PWA assets — icons, Apple splash screens, Windows tiles — along
//! with the `<link>` markup and web-manifest icon entries that reference
//! them. Built for build tooling and CLIs, not end users.
//!
//! # Architecture: Resolve, Then Generate
//!
//! The pipeline has two phases with a hard boundary between them:
//!
//! ```text
//! 1. Resolve    preset + image  →  InstructionSet   (pure, no pixel work)
//! 2. Generate   InstructionSet  →  files on disk    (compositor + writes)
//! ```
//!
//! Resolution expands the preset through three cascading option layers
//! (built-in defaults → preset → per-size), multiplies each splash size by
//! orientation and color scheme, deduplicates by rendered dimensions, and
//! attaches to every asset a *pending image* — a plain description of the
//! compositor work, not its result. This separation exists for three
//! reasons:
//!
//! - **Cheap introspection**: `links` and `manifest` never encode a pixel.
//! - **Testability**: the whole instruction graph is assertable data.
//! - **Skip-friendly generation**: assets that already exist are skipped
//!   before any compositor work happens.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `pwa-assets.toml` loading, merging over stock defaults, validation |
//! | [`preset`] | Size descriptors, built-in Apple device and icon tables, preset assembly |
//! | [`options`] | Field-wise option cascade (resize, PNG, padding) and the defaults table |
//! | [`variants`] | Orientation × color-scheme expansion with the named dedup policy |
//! | [`entry`] | Asset entries, deferred producers, per-category builders |
//! | [`instructions`] | Per-image resolution into an `InstructionSet` |
//! | [`markup`] | Structured head links and their HTML/XHTML string rendering |
//! | [`manifest`] | Web-manifest `icons` array rendering |
//! | [`compositor`] | Pixel backend trait + pure-Rust `image`-crate implementation |
//! | [`generate`] | Parallel generation with override policy and per-entry failure isolation |
//! | [`output`] | CLI output formatting — pure `format_*` + `print_*` wrappers |
//!
//! # Design Decisions
//!
//! ## Pure-Rust Imaging
//!
//! The [`compositor`] module uses the `image` crate (Lanczos3 resampling,
//! PNG encoding) — pure Rust, statically linked, no system dependencies.
//! The pixel backend sits behind the [`compositor::Compositor`] trait so
//! tests drive the pipeline with a recording mock.
//!
//! ## Dimension-Keyed Splash Dedup
//!
//! Several Apple devices share pixel dimensions at different scale factors.
//! The expander drops every descriptor whose declared dimensions were
//! already seen — including its landscape and dark variants. That discard
//! loses metadata (a later descriptor's scale factor never renders) and is
//! deliberately kept behind the named [`variants::DedupPolicy`] seam, where
//! a full-identity policy can be substituted in one place.
//!
//! ## Config Cascading
//!
//! Stock defaults, the preset file, and per-size descriptor fields merge
//! field by field, so a size that overrides only `width` still inherits
//! everything else. The same recursive merge drives partial
//! `pwa-assets.toml` files in [`config`].
//!
//! ## Deferred Producers As Data
//!
//! A pending image is a struct of compositor inputs with a `produce`
//! method, not a closure. Generation is auditable (tests assert on the
//! planned canvas, content box, background, and PNG settings), and
//! re-invocation is trivially safe because there is nothing to cache.

pub mod compositor;
pub mod config;
pub mod entry;
pub mod generate;
pub mod instructions;
pub mod manifest;
pub mod markup;
pub mod options;
pub mod output;
pub mod preset;
pub mod variants;

#[cfg(test)]
pub(crate) mod test_helpers;
