use crate::color::ColorRgb;

const BLEND_NORMAL: u8 = 0;
const BLEND_MULTIPLY: u8 = 1;
const BLEND_LIGHTEN: u8 = 2;
const BLEND_DARKEN: u8 = 3;
const BLEND_SCREEN: u8 = 4;
const BLEND_SUBTRACT: u8 = 5;

/// Operator combining a pixel's accumulated color with a new contribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum BlendMode {
    /// Replace the existing color
    #[default]
    Normal = BLEND_NORMAL,
    Multiply = BLEND_MULTIPLY,
    Lighten = BLEND_LIGHTEN,
    Darken = BLEND_DARKEN,
    Screen = BLEND_SCREEN,
    Subtract = BLEND_SUBTRACT,
}

impl BlendMode {
    pub const fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            BLEND_NORMAL => Self::Normal,
            BLEND_MULTIPLY => Self::Multiply,
            BLEND_LIGHTEN => Self::Lighten,
            BLEND_DARKEN => Self::Darken,
            BLEND_SCREEN => Self::Screen,
            BLEND_SUBTRACT => Self::Subtract,
            _ => return None,
        })
    }

    /// Combine `existing` with `incoming`
    ///
    /// Results are not clamped, so contributions can accumulate across effects.
    pub fn apply(self, existing: ColorRgb, incoming: ColorRgb) -> ColorRgb {
        match self {
            Self::Normal => incoming,
            Self::Multiply => existing.zip_with(incoming, |a, b| a * b),
            Self::Lighten => existing.zip_with(incoming, f32::max),
            Self::Darken => existing.zip_with(incoming, f32::min),
            Self::Screen => existing.zip_with(incoming, |a, b| 1.0 - (1.0 - a) * (1.0 - b)),
            Self::Subtract => existing.zip_with(incoming, |a, b| (a - b).max(0.0)),
        }
    }
}

/// Blend `incoming` over `existing` using `mode`
#[inline]
pub fn blend(existing: ColorRgb, incoming: ColorRgb, mode: BlendMode) -> ColorRgb {
    mode.apply(existing, incoming)
}
