//! Battery level gauge

use heapless::Vec;

use super::gauge::GaugeBar;
use super::{Effect, FxContext};
use crate::MAX_PALETTE;
use crate::color::{BlendMode, ColorHsl, ColorRgb};
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct BatteryGaugeConfig {
    pub pixels: &'static [usize],
    /// Color per threshold, lowest first
    pub colors: &'static [ColorHsl],
    /// Ascending levels in percent, one per color
    pub thresholds: &'static [u8],
    pub blend: BlendMode,
    pub bar: GaugeBar,
}

/// Gauge filled to the battery level
///
/// The bar takes the color of the highest threshold below the current level,
/// or the first color when the level is at or under every threshold.
#[derive(Debug, Clone)]
pub struct BatteryGaugeEffect {
    pixels: &'static [usize],
    colors: Vec<ColorRgb, MAX_PALETTE>,
    thresholds: &'static [u8],
    blend: BlendMode,
    bar: GaugeBar,
}

impl BatteryGaugeEffect {
    pub fn new(config: &BatteryGaugeConfig) -> Self {
        Self {
            pixels: config.pixels,
            colors: config
                .colors
                .iter()
                .take(MAX_PALETTE)
                .map(|color| color.to_rgb())
                .collect(),
            thresholds: config.thresholds,
            blend: config.blend,
            bar: config.bar,
        }
    }

    /// Bar color for a battery `level`
    pub fn base_color(&self, level: u8) -> ColorRgb {
        let below = self
            .thresholds
            .iter()
            .take(self.colors.len())
            .take_while(|&&threshold| threshold < level)
            .count();

        self.colors
            .get(below.saturating_sub(1))
            .copied()
            .unwrap_or(ColorRgb::BLACK)
    }
}

impl Effect for BatteryGaugeEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        let level = ctx.device.battery_level();
        let color = self.base_color(level);

        self.bar.render(
            pixels,
            self.pixels,
            f32::from(level) / 100.0,
            color,
            self.blend,
        );
    }
}
