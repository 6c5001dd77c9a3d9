use crate::color::Rgb;
use crate::math::lerp;

/// Linear RGB color with fractional channels
///
/// Channels are nominally `0.0..=1.0` but may leave that range while several
/// effects accumulate into the same pixel. Clamping only happens in
/// [`ColorRgb::to_led`], when the frame is flushed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ColorRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl ColorRgb {
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Multiply every channel by `factor`
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
        }
    }

    /// Apply `op` to each pair of channels
    #[must_use]
    pub fn zip_with(self, other: Self, op: impl Fn(f32, f32) -> f32) -> Self {
        Self {
            r: op(self.r, other.r),
            g: op(self.g, other.g),
            b: op(self.b, other.b),
        }
    }

    /// Clamp into display range and quantize to 8 bits per channel
    pub fn to_led(self) -> Rgb {
        Rgb {
            r: quantize(self.r),
            g: quantize(self.g),
            b: quantize(self.b),
        }
    }
}

#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quantize(channel: f32) -> u8 {
    if channel.is_nan() {
        return 0;
    }
    libm::roundf(channel.clamp(0.0, 1.0) * 255.0) as u8
}

/// Linear per-channel interpolation, `step` is clamped to `0.0..=1.0`
pub fn interpolate_rgb(from: ColorRgb, to: ColorRgb, step: f32) -> ColorRgb {
    let step = step.clamp(0.0, 1.0);
    from.zip_with(to, |a, b| lerp(a, b, step))
}
