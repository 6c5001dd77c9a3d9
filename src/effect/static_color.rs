//! Static color fill effect
//!
//! Gives every mapped pixel its own fixed color.

use heapless::Vec;

use super::{Effect, FxContext, blend_at};
use crate::MAX_PIXELS;
use crate::color::{BlendMode, ColorHsl, ColorRgb};
use crate::error::FxError;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct StaticConfig {
    pub pixels: &'static [usize],
    /// One color per mapped pixel. Pixels past the end reuse the last color.
    pub colors: &'static [ColorHsl],
    pub blend: BlendMode,
}

/// Static color effect - colors are converted once at construction
#[derive(Debug, Clone)]
pub struct StaticEffect {
    pixels: &'static [usize],
    colors: Vec<ColorRgb, MAX_PIXELS>,
    blend: BlendMode,
}

impl StaticEffect {
    /// Fails with [`FxError::ResourceExhausted`] past [`MAX_PIXELS`] mapped pixels
    pub fn new(config: &StaticConfig) -> Result<Self, FxError> {
        if config.pixels.len() > MAX_PIXELS {
            return Err(FxError::ResourceExhausted);
        }

        let fallback = config.colors.last().copied().unwrap_or_default();
        let colors = config
            .pixels
            .iter()
            .enumerate()
            .map(|(i, _)| config.colors.get(i).copied().unwrap_or(fallback).to_rgb())
            .collect();

        Ok(Self {
            pixels: config.pixels,
            colors,
            blend: config.blend,
        })
    }
}

impl Effect for StaticEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], _ctx: &mut FxContext<'_>) {
        for (&index, &color) in self.pixels.iter().zip(self.colors.iter()) {
            blend_at(pixels, index, color, self.blend);
        }
    }
}
