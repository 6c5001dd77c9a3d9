//! Linear gradient laid along a rotated axis
//!
//! The palette repeats every `gradient_width` units along the axis. With a
//! non-zero duration the gradient scrolls one full width per duration.

use embassy_time::Duration;
use heapless::Vec;

use super::{Effect, FxContext, blend_at};
use crate::MAX_PALETTE;
use crate::color::{BlendMode, ColorHsl, ColorRgb, interpolate_hsl, interpolate_rgb};
use crate::math::frames_for;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct LinearGradientConfig {
    pub pixels: &'static [usize],
    pub colors: &'static [ColorHsl],
    pub blend: BlendMode,
    /// Axis rotation in degrees
    pub angle: u16,
    pub gradient_width: u16,
    /// Scroll period, zero for a still gradient
    pub duration: Duration,
    /// Interpolate in RGB instead of HSL
    pub rgb_interpolation: bool,
}

#[derive(Debug, Clone)]
pub struct LinearGradientEffect {
    pixels: &'static [usize],
    colors_hsl: &'static [ColorHsl],
    colors_rgb: Vec<ColorRgb, MAX_PALETTE>,
    blend: BlendMode,
    cos: f32,
    sin: f32,
    width: f32,
    rgb_interpolation: bool,
    offset_per_frame: f32,
    offset: f32,
}

impl LinearGradientEffect {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(config: &LinearGradientConfig) -> Self {
        let radians = f32::from(config.angle % 360).to_radians();
        let width = f32::from(config.gradient_width.max(1));
        let frames = frames_for(config.duration);

        Self {
            pixels: config.pixels,
            colors_hsl: config.colors,
            colors_rgb: config
                .colors
                .iter()
                .take(MAX_PALETTE)
                .map(|color| color.to_rgb())
                .collect(),
            blend: config.blend,
            cos: libm::cosf(radians),
            sin: libm::sinf(radians),
            width,
            rgb_interpolation: config.rgb_interpolation,
            offset_per_frame: if frames > 0 { width / frames as f32 } else { 0.0 },
            offset: 0.0,
        }
    }

    /// Current scroll offset along the axis
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn color_at(&self, pixel: &Pixel) -> ColorRgb {
        let num_colors = self.colors_rgb.len();
        let color_width = self.width / num_colors as f32;

        let x = f32::from(pixel.x()) * self.cos + f32::from(pixel.y()) * self.sin;
        let mut distance = libm::fmodf(self.width + x - self.offset, self.width);
        if distance < 0.0 {
            distance += self.width;
        }

        let from = ((distance / color_width) as usize).min(num_colors - 1);
        let to = (from + 1) % num_colors;
        let step = (distance - from as f32 * color_width) / color_width;

        if self.rgb_interpolation {
            interpolate_rgb(self.colors_rgb[from], self.colors_rgb[to], step)
        } else {
            interpolate_hsl(self.colors_hsl[from], self.colors_hsl[to], step).to_rgb()
        }
    }
}

impl Effect for LinearGradientEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        if self.colors_rgb.is_empty() {
            return;
        }

        for &index in self.pixels {
            let Some(pixel) = pixels.get(index) else {
                continue;
            };
            let color = self.color_at(pixel);
            blend_at(pixels, index, color, self.blend);
        }

        if self.offset_per_frame <= 0.0 {
            return;
        }

        self.offset += self.offset_per_frame;
        if self.offset >= self.width {
            self.offset -= self.width;
        }

        ctx.request_frames(1);
    }
}
