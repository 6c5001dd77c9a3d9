//! Typing speed indicator

use super::gauge::{GaugeBar, GaugeConfig, GaugeEffect, GaugeSource};
use super::{Effect, FxContext};
use crate::color::{BlendMode, ColorHsl};
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct WpmIndicatorConfig {
    pub pixels: &'static [usize],
    /// One color, or the colors at zero and at `max_wpm`
    pub colors: &'static [ColorHsl],
    pub blend: BlendMode,
    pub bar: GaugeBar,
    /// Rate shown as a full bar
    pub max_wpm: u8,
}

/// Gauge showing the current typing speed
///
/// The rate is eased between two computations of the estimator, so the bar
/// moves smoothly while typing and keeps animating until it settles at zero.
#[derive(Debug, Clone)]
pub struct WpmIndicatorEffect {
    gauge: GaugeEffect,
}

impl WpmIndicatorEffect {
    pub const fn new(config: &WpmIndicatorConfig) -> Self {
        Self {
            gauge: GaugeEffect::new(GaugeConfig {
                pixels: config.pixels,
                colors: config.colors,
                blend: config.blend,
                bar: config.bar,
                source: GaugeSource::Wpm,
                value_min: 0,
                value_max: config.max_wpm,
            }),
        }
    }
}

impl Effect for WpmIndicatorEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        self.gauge.render_frame(pixels, ctx);
    }
}
