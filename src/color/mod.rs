mod blend;
mod hsl;
mod rgb;

pub use blend::{BlendMode, blend};
pub use hsl::{ColorHsl, hsl_to_rgb, interpolate_hsl};
pub use rgb::{ColorRgb, interpolate_rgb};

/// Finalized color as pushed to the pixel sink
pub type Rgb = smart_leds::RGB8;
