use crate::color::ColorRgb;
use crate::math::lerp;

/// HSL color, the authoring format for palettes
///
/// Hue is in degrees (`0..360`), saturation and lightness in percent (`0..=100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorHsl {
    pub h: u16,
    pub s: u8,
    pub l: u8,
}

impl ColorHsl {
    pub const fn new(h: u16, s: u8, l: u8) -> Self {
        Self { h, s, l }
    }

    /// Decode the packed binding form `h | s << 16 | l << 24`
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_packed(value: u32) -> Self {
        Self {
            h: (value & 0xFFFF) as u16,
            s: ((value >> 16) & 0xFF) as u8,
            l: (value >> 24) as u8,
        }
    }

    #[allow(clippy::cast_lossless)]
    pub const fn to_packed(self) -> u32 {
        self.h as u32 | (self.s as u32) << 16 | (self.l as u32) << 24
    }

    pub fn to_rgb(self) -> ColorRgb {
        hsl_to_rgb(self)
    }
}

/// Convert HSL to linear RGB
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn hsl_to_rgb(color: ColorHsl) -> ColorRgb {
    let s = f32::from(color.s.min(100)) / 100.0;
    let l = f32::from(color.l.min(100)) / 100.0;

    let chroma = (1.0 - libm::fabsf(2.0 * l - 1.0)) * s;
    let sector = f32::from(color.h % 360) / 60.0;
    let x = chroma * (1.0 - libm::fabsf(libm::fmodf(sector, 2.0) - 1.0));
    let m = l - chroma / 2.0;

    let (r, g, b) = match sector as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    ColorRgb::new(r + m, g + m, b + m)
}

/// Linear per-channel interpolation in HSL space
///
/// Hue takes the naive path between the two values, without wrapping around
/// the color wheel.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn interpolate_hsl(from: ColorHsl, to: ColorHsl, step: f32) -> ColorHsl {
    let step = step.clamp(0.0, 1.0);
    let channel = |a: f32, b: f32| libm::roundf(lerp(a, b, step));

    ColorHsl {
        h: channel(f32::from(from.h), f32::from(to.h)) as u16,
        s: channel(f32::from(from.s), f32::from(to.s)) as u8,
        l: channel(f32::from(from.l), f32::from(to.l)) as u8,
    }
}
