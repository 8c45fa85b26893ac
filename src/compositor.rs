//! Image compositing backend.
//!
//! The [`Compositor`] trait defines the three pixel operations the engine
//! orchestrates: resize, composite onto a canvas, and PNG encode. The rest
//! of the crate never touches pixels directly — it builds descriptions of
//! work ([`crate::entry::PendingImage`]) and hands them to a compositor.
//!
//! The production implementation is [`RustCompositor`] — pure Rust on the
//! `image` crate, statically linked, no system dependencies:
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Resize (contain) | `DynamicImage::resize` with `Lanczos3` |
//! | Resize (cover) | `DynamicImage::resize_to_fill` with `Lanczos3` |
//! | Composite | `RgbaImage::from_pixel` canvas + `imageops::overlay` |
//! | Encode | `codecs::png::PngEncoder::new_with_quality` |

use crate::options::{Fit, PngCompression, PngFilter, PngSettings, ResizeSettings};
use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompositorError {
    #[error("unrecognized color {0:?}")]
    InvalidColor(String),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Trait for image compositing backends.
///
/// Implementations must be `Sync`: the generation driver invokes them from
/// rayon worker threads.
pub trait Compositor: Sync {
    /// Scale `image` into a `width`×`height` box per the fit mode.
    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        settings: &ResizeSettings,
    ) -> Result<DynamicImage, CompositorError>;

    /// Center `content` on a `width`×`height` canvas filled with
    /// `background` (`None` = fully transparent).
    fn composite(
        &self,
        content: &DynamicImage,
        width: u32,
        height: u32,
        background: Option<&str>,
    ) -> Result<DynamicImage, CompositorError>;

    /// Encode as PNG bytes.
    fn encode(
        &self,
        image: &DynamicImage,
        png: &PngSettings,
    ) -> Result<Vec<u8>, CompositorError>;
}

/// Parse a canvas fill color: named `white`/`black`/`transparent` or hex
/// `#rgb`, `#rrggbb`, `#rrggbbaa`.
pub fn parse_color(value: &str) -> Result<Rgba<u8>, CompositorError> {
    match value {
        "white" => return Ok(Rgba([255, 255, 255, 255])),
        "black" => return Ok(Rgba([0, 0, 0, 255])),
        "transparent" => return Ok(Rgba([0, 0, 0, 0])),
        _ => {}
    }
    let hex = value
        .strip_prefix('#')
        .ok_or_else(|| CompositorError::InvalidColor(value.to_string()))?;
    let nibble = |c: u8| -> Result<u8, CompositorError> {
        (c as char)
            .to_digit(16)
            .map(|d| d as u8)
            .ok_or_else(|| CompositorError::InvalidColor(value.to_string()))
    };
    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, &c) in bytes.iter().enumerate() {
                let d = nibble(c)?;
                rgb[i] = d << 4 | d;
            }
            Ok(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 | 8 => {
            let mut channels = [0u8; 4];
            channels[3] = 255;
            for (i, pair) in bytes.chunks(2).enumerate() {
                channels[i] = nibble(pair[0])? << 4 | nibble(pair[1])?;
            }
            Ok(Rgba(channels))
        }
        _ => Err(CompositorError::InvalidColor(value.to_string())),
    }
}

/// Pure Rust compositor on the `image` crate.
pub struct RustCompositor;

impl RustCompositor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor for RustCompositor {
    fn resize(
        &self,
        image: &DynamicImage,
        width: u32,
        height: u32,
        settings: &ResizeSettings,
    ) -> Result<DynamicImage, CompositorError> {
        let resized = match settings.fit {
            Fit::Contain => image.resize(width, height, FilterType::Lanczos3),
            Fit::Cover => image.resize_to_fill(width, height, FilterType::Lanczos3),
        };
        Ok(resized)
    }

    fn composite(
        &self,
        content: &DynamicImage,
        width: u32,
        height: u32,
        background: Option<&str>,
    ) -> Result<DynamicImage, CompositorError> {
        let fill = match background {
            Some(color) => parse_color(color)?,
            None => Rgba([0, 0, 0, 0]),
        };
        let mut canvas = RgbaImage::from_pixel(width, height, fill);
        let x = (i64::from(width) - i64::from(content.width())) / 2;
        let y = (i64::from(height) - i64::from(content.height())) / 2;
        image::imageops::overlay(&mut canvas, &content.to_rgba8(), x, y);
        Ok(DynamicImage::ImageRgba8(canvas))
    }

    fn encode(
        &self,
        image: &DynamicImage,
        png: &PngSettings,
    ) -> Result<Vec<u8>, CompositorError> {
        let compression = match png.compression {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        };
        let filter = match png.filter {
            PngFilter::None => PngFilterType::NoFilter,
            PngFilter::Sub => PngFilterType::Sub,
            PngFilter::Up => PngFilterType::Up,
            PngFilter::Average => PngFilterType::Avg,
            PngFilter::Paeth => PngFilterType::Paeth,
            PngFilter::Adaptive => PngFilterType::Adaptive,
        };
        let rgba = image.to_rgba8();
        let mut bytes = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut bytes, compression, filter);
        encoder.write_image(
            rgba.as_raw(),
            rgba.width(),
            rgba.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(bytes)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mock compositor that records operations without touching pixels.
    /// Uses Mutex (not RefCell) so it is Sync and works under rayon.
    #[derive(Default)]
    pub struct MockCompositor {
        pub operations: Mutex<Vec<RecordedOp>>,
        /// Fail any resize targeting this width, for error-isolation tests.
        pub fail_resize_width: Option<u32>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Resize {
            width: u32,
            height: u32,
            fit: Fit,
        },
        Composite {
            width: u32,
            height: u32,
            background: Option<String>,
        },
        Encode {
            compression: PngCompression,
        },
    }

    impl MockCompositor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on_width(width: u32) -> Self {
            Self {
                fail_resize_width: Some(width),
                ..Self::default()
            }
        }

        pub fn operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Number of encode calls — one per completed producer invocation.
        pub fn encode_calls(&self) -> usize {
            self.operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Encode { .. }))
                .count()
        }
    }

    impl Compositor for MockCompositor {
        fn resize(
            &self,
            _image: &DynamicImage,
            width: u32,
            height: u32,
            settings: &ResizeSettings,
        ) -> Result<DynamicImage, CompositorError> {
            if self.fail_resize_width == Some(width) {
                return Err(CompositorError::InvalidColor(format!(
                    "mock failure at width {width}"
                )));
            }
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                width,
                height,
                fit: settings.fit,
            });
            Ok(DynamicImage::new_rgba8(width, height))
        }

        fn composite(
            &self,
            _content: &DynamicImage,
            width: u32,
            height: u32,
            background: Option<&str>,
        ) -> Result<DynamicImage, CompositorError> {
            self.operations.lock().unwrap().push(RecordedOp::Composite {
                width,
                height,
                background: background.map(str::to_string),
            });
            Ok(DynamicImage::new_rgba8(width, height))
        }

        fn encode(
            &self,
            image: &DynamicImage,
            png: &PngSettings,
        ) -> Result<Vec<u8>, CompositorError> {
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                compression: png.compression,
            });
            Ok(vec![0; (image.width() * image.height()) as usize])
        }
    }

    #[test]
    fn parse_named_colors() {
        assert_eq!(parse_color("white").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("black").unwrap(), Rgba([0, 0, 0, 255]));
        assert_eq!(parse_color("transparent").unwrap(), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn parse_hex_colors() {
        assert_eq!(parse_color("#fff").unwrap(), Rgba([255, 255, 255, 255]));
        assert_eq!(parse_color("#1a2b3c").unwrap(), Rgba([26, 43, 60, 255]));
        assert_eq!(parse_color("#1a2b3c80").unwrap(), Rgba([26, 43, 60, 128]));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_color("mauve").is_err());
        assert!(parse_color("#12345").is_err());
        assert!(parse_color("#xyz").is_err());
    }

    #[test]
    fn contain_resize_preserves_aspect() {
        let source = DynamicImage::new_rgba8(200, 100);
        let resized = RustCompositor::new()
            .resize(&source, 50, 50, &contain_settings())
            .unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 25));
    }

    #[test]
    fn cover_resize_fills_box() {
        let source = DynamicImage::new_rgba8(200, 100);
        let settings = ResizeSettings {
            fit: Fit::Cover,
            ..contain_settings()
        };
        let resized = RustCompositor::new()
            .resize(&source, 50, 50, &settings)
            .unwrap();
        assert_eq!((resized.width(), resized.height()), (50, 50));
    }

    #[test]
    fn composite_centers_on_filled_canvas() {
        let content = DynamicImage::new_rgba8(10, 10);
        let canvas = RustCompositor::new()
            .composite(&content, 100, 50, Some("white"))
            .unwrap();
        assert_eq!((canvas.width(), canvas.height()), (100, 50));
        let rgba = canvas.to_rgba8();
        // Corner keeps the fill; center is covered by the (transparent-over-
        // white, still white) content overlay.
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn composite_without_background_is_transparent() {
        let content = DynamicImage::new_rgba8(10, 10);
        let canvas = RustCompositor::new()
            .composite(&content, 64, 64, None)
            .unwrap();
        assert_eq!(canvas.to_rgba8().get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn encode_produces_png_magic() {
        let image = DynamicImage::new_rgba8(4, 4);
        let bytes = RustCompositor::new()
            .encode(&image, &PngSettings::default())
            .unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    fn contain_settings() -> ResizeSettings {
        ResizeSettings {
            width: None,
            height: None,
            fit: Fit::Contain,
            background: None,
        }
    }
}
