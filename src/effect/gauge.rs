//! Fill-level gauges
//!
//! [`GaugeBar`] draws a bar filling its bounds along one axis, with a soft
//! gradient at the leading edge. [`GaugeEffect`] feeds it a live device value.

use embassy_time::Instant;

use super::{Effect, FxContext, blend_at};
use crate::color::{BlendMode, ColorHsl, ColorRgb, interpolate_hsl};
use crate::device::DeviceState;
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeAxis {
    Horizontal,
    Vertical,
}

/// Geometry of a gauge bar
///
/// The bar grows from `bounds_min` towards `bounds_max`. Bounds may be given in
/// either order to flip the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeBar {
    pub bounds_min: u8,
    pub bounds_max: u8,
    pub axis: GaugeAxis,
    /// Length of the fading edge, zero for a hard edge
    pub edge_width: u8,
}

impl GaugeBar {
    /// Blend a bar filled to `step` (`0.0..=1.0`) into the mapped pixels
    ///
    /// Pixels past the edge receive black, pixels at least `edge_width` inside
    /// it the full color, and the ones in between a linear fade.
    pub fn render(
        &self,
        pixels: &mut [Pixel],
        map: &[usize],
        step: f32,
        color: ColorRgb,
        mode: BlendMode,
    ) {
        let direction = if self.bounds_max > self.bounds_min {
            1.0
        } else {
            -1.0
        };
        let min = f32::from(self.bounds_min);
        let span = libm::fabsf(f32::from(self.bounds_max) - min);
        let edge_width = f32::from(self.edge_width);
        let edge = min + (span + edge_width) * step.clamp(0.0, 1.0) * direction;

        for &index in map {
            let Some(pixel) = pixels.get(index) else {
                continue;
            };
            let position = f32::from(match self.axis {
                GaugeAxis::Horizontal => pixel.x(),
                GaugeAxis::Vertical => pixel.y(),
            });

            let value = if direction * (position - edge) >= 0.0 {
                ColorRgb::BLACK
            } else if direction * (edge - position) >= edge_width {
                color
            } else {
                color.scale(libm::fabsf(position - edge) / edge_width)
            };

            blend_at(pixels, index, value, mode);
        }
    }
}

/// Color at `step` along the palette, interpolated in HSL
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub(crate) fn palette_color(colors: &[ColorHsl], step: f32) -> ColorRgb {
    match colors {
        [] => ColorRgb::BLACK,
        [color] => color.to_rgb(),
        _ => {
            let position = step.clamp(0.0, 1.0) * (colors.len() - 1) as f32;
            let from = (position as usize).min(colors.len() - 2);
            interpolate_hsl(colors[from], colors[from + 1], position - from as f32).to_rgb()
        }
    }
}

/// Device value shown by a gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeSource {
    /// Typing speed in words per minute, eased between computations
    Wpm,
    /// Battery state of charge in percent
    Battery,
}

impl GaugeSource {
    fn read(self, device: &DeviceState, now: Instant) -> f32 {
        match self {
            Self::Wpm => device.wpm.interpolated_wpm(now),
            Self::Battery => f32::from(device.battery_level()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GaugeConfig {
    pub pixels: &'static [usize],
    /// Palette from empty to full
    pub colors: &'static [ColorHsl],
    pub blend: BlendMode,
    pub bar: GaugeBar,
    pub source: GaugeSource,
    /// Value shown as an empty bar
    pub value_min: u8,
    /// Value shown as a full bar
    pub value_max: u8,
}

#[derive(Debug, Clone)]
pub struct GaugeEffect {
    config: GaugeConfig,
}

impl GaugeEffect {
    pub const fn new(config: GaugeConfig) -> Self {
        Self { config }
    }

    /// Fill level for `value`, `0.0..=1.0`
    pub fn step_for(&self, value: f32) -> f32 {
        let min = f32::from(self.config.value_min);
        let max = f32::from(self.config.value_max);
        if max <= min {
            return if value >= max { 1.0 } else { 0.0 };
        }

        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

impl Effect for GaugeEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        let value = self.config.source.read(ctx.device, ctx.now);
        let step = self.step_for(value);
        let color = palette_color(self.config.colors, step);

        self.config
            .bar
            .render(pixels, self.config.pixels, step, color, self.config.blend);

        if self.config.source == GaugeSource::Wpm && ctx.device.wpm.is_animating() {
            ctx.request_frames(1);
        }
    }
}
