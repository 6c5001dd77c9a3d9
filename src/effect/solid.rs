//! Solid color effect cycling through a palette

use embassy_time::Duration;

use super::{Effect, FxContext, blend_at};
use crate::color::{BlendMode, ColorHsl, ColorRgb, interpolate_hsl};
use crate::math::frames_for;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct SolidConfig {
    pub pixels: &'static [usize],
    pub colors: &'static [ColorHsl],
    /// Time to cycle through the whole palette
    pub duration: Duration,
}

/// Fills its pixels with one color fading through the palette
///
/// Each palette entry takes `duration / colors` frames, interpolated in HSL
/// towards the next one. A single color is shown statically.
#[derive(Debug, Clone)]
pub struct SolidEffect {
    pixels: &'static [usize],
    colors: &'static [ColorHsl],
    duration: u32,
    transition: u32,
    counter: u32,
    current: ColorRgb,
}

impl SolidEffect {
    pub fn new(config: &SolidConfig) -> Self {
        let duration = frames_for(config.duration).max(1);
        let num_colors = u32::try_from(config.colors.len()).unwrap_or(u32::MAX).max(1);

        Self {
            pixels: config.pixels,
            colors: config.colors,
            duration,
            transition: (duration / num_colors).max(1),
            counter: 0,
            current: config
                .colors
                .first()
                .map_or(ColorRgb::BLACK, |color| color.to_rgb()),
        }
    }

    pub const fn current_color(&self) -> ColorRgb {
        self.current
    }

    #[allow(clippy::cast_precision_loss)]
    fn update_color(&mut self) {
        let from = (self.counter / self.transition) as usize % self.colors.len();
        let to = (from + 1) % self.colors.len();
        let step = (self.counter % self.transition) as f32 / self.transition as f32;

        self.current = interpolate_hsl(self.colors[from], self.colors[to], step).to_rgb();
        self.counter = (self.counter + 1) % self.duration;
    }
}

impl Effect for SolidEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        for &index in self.pixels {
            blend_at(pixels, index, self.current, BlendMode::Normal);
        }

        if self.colors.len() <= 1 {
            return;
        }

        if self.counter == 0 {
            ctx.request_frames(self.duration);
        }

        self.update_color();
    }
}
