//! Shared test utilities for the pwa-assets test suite.
//!
//! Small fixture builders so unit tests across modules resolve against the
//! same compact preset instead of the full built-in device table.

use crate::preset::{Preset, SizeDescriptor};
use image::DynamicImage;

/// A blank RGBA source image of the given dimensions.
pub fn test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::new_rgba8(width, height)
}

/// A compact preset: one size per icon category, one splash descriptor,
/// one Windows tile.
pub fn small_preset() -> Preset {
    Preset {
        favicon: vec![48],
        transparent: vec![192],
        maskable: vec![512],
        apple_touch: vec![180],
        windows_tile: vec![(150, 150)],
        splash: vec![SizeDescriptor {
            scale_factor: Some(2),
            ..SizeDescriptor::new(640, 1136)
        }],
        ..Preset::default()
    }
}
