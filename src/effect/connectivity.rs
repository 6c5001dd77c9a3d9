//! Connection profile indicator

use super::{Effect, FxContext, blend_at};
use crate::color::{BlendMode, ColorHsl, ColorRgb};
use crate::pixel::Pixel;

#[derive(Debug, Clone, Copy)]
pub struct ConnectivityIndicatorConfig {
    /// Indicator pixels
    pub pixels: &'static [usize],
    /// Pixels filled with the backdrop color while the profile is selected
    pub backdrop_pixels: &'static [usize],
    pub profile_index: u8,
    pub connected: ColorHsl,
    pub pairing: ColorHsl,
    pub connecting: ColorHsl,
    pub backdrop: ColorHsl,
    pub blend: BlendMode,
    /// Keep the indicator lit instead of following the blink phase
    pub no_blink: bool,
}

/// Shows the state of one connection profile
///
/// Nothing is drawn unless wireless is the selected transport and this
/// indicator's profile is the selected one.
#[derive(Debug, Clone)]
pub struct ConnectivityIndicatorEffect {
    pixels: &'static [usize],
    backdrop_pixels: &'static [usize],
    profile_index: u8,
    connected: ColorRgb,
    pairing: ColorRgb,
    connecting: ColorRgb,
    backdrop: ColorRgb,
    blend: BlendMode,
    no_blink: bool,
}

impl ConnectivityIndicatorEffect {
    pub fn new(config: &ConnectivityIndicatorConfig) -> Self {
        Self {
            pixels: config.pixels,
            backdrop_pixels: config.backdrop_pixels,
            profile_index: config.profile_index,
            connected: config.connected.to_rgb(),
            pairing: config.pairing.to_rgb(),
            connecting: config.connecting.to_rgb(),
            backdrop: config.backdrop.to_rgb(),
            blend: config.blend,
            no_blink: config.no_blink,
        }
    }
}

impl Effect for ConnectivityIndicatorEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        let monitor = &ctx.device.connectivity;
        let status = monitor.status();

        if !status.active || status.profile_index != self.profile_index {
            return;
        }

        for &index in self.backdrop_pixels {
            blend_at(pixels, index, self.backdrop, self.blend);
        }

        if !self.no_blink && !monitor.indicator_on() {
            return;
        }

        let color = if status.connected {
            self.connected
        } else if status.bonded {
            self.connecting
        } else {
            self.pairing
        };

        for &index in self.pixels {
            blend_at(pixels, index, color, self.blend);
        }
    }
}
