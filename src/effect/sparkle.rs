//! Randomized per-pixel twinkling

use embassy_time::Duration;
use heapless::Vec;

use super::{Effect, FxContext, blend_at};
use crate::MAX_PIXELS;
use crate::color::{BlendMode, ColorHsl, ColorRgb, interpolate_hsl};
use crate::error::FxError;
use crate::math::{SplitMix, frames_for};
use crate::pixel::Pixel;

/// Shortest twinkle, one frame up and one down
const MIN_LIFETIME: u32 = 2;

/// Lifetimes are `duration / (1 + rand % LIFETIME_DIVISORS)`
const LIFETIME_DIVISORS: u32 = 16;

#[derive(Debug, Clone, Copy)]
pub struct SparkleConfig {
    pub pixels: &'static [usize],
    /// One color, or two colors mixed at random per twinkle
    pub colors: &'static [ColorHsl],
    pub blend: BlendMode,
    /// Longest twinkle
    pub duration: Duration,
    pub seed: u64,
}

/// Lifecycle of one pixel's twinkle
///
/// Intensity follows a triangle over `lifetime` frames: zero at both ends,
/// one at the middle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Twinkle {
    pub color: ColorRgb,
    lifetime: u32,
    remaining: u32,
    step: f32,
}

impl Twinkle {
    #[allow(clippy::cast_precision_loss)]
    pub fn new(color: ColorRgb, lifetime: u32) -> Self {
        let lifetime = lifetime.max(MIN_LIFETIME);
        Self {
            color,
            lifetime,
            remaining: lifetime,
            step: 2.0 / lifetime as f32,
        }
    }

    /// Start part way through, with `remaining` frames left
    #[must_use]
    pub fn with_phase(mut self, remaining: u32) -> Self {
        self.remaining = remaining.clamp(1, self.lifetime);
        self
    }

    pub const fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn intensity(&self) -> f32 {
        let elapsed = self.lifetime - self.remaining;
        self.step * elapsed.min(self.remaining) as f32
    }

    /// Move one frame forward and return the new intensity
    pub fn advance(&mut self) -> f32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.intensity()
    }

    pub const fn is_finished(&self) -> bool {
        self.remaining == 0
    }
}

#[derive(Debug, Clone)]
pub struct SparkleEffect {
    pixels: &'static [usize],
    colors: &'static [ColorHsl],
    blend: BlendMode,
    frames: u32,
    rng: SplitMix,
    twinkles: Vec<Twinkle, MAX_PIXELS>,
}

impl SparkleEffect {
    /// Fails with [`FxError::ResourceExhausted`] past [`MAX_PIXELS`] mapped pixels
    pub fn new(config: &SparkleConfig) -> Result<Self, FxError> {
        if config.pixels.len() > MAX_PIXELS {
            return Err(FxError::ResourceExhausted);
        }

        let frames = frames_for(config.duration).max(MIN_LIFETIME);
        let mut rng = SplitMix::new(config.seed);
        let mut twinkles = Vec::new();

        for _ in config.pixels {
            let twinkle = Self::generate(&mut rng, config.colors, frames);
            let phase = 1 + rng.below(twinkle.lifetime());
            let _ = twinkles.push(twinkle.with_phase(phase));
        }

        Ok(Self {
            pixels: config.pixels,
            colors: config.colors,
            blend: config.blend,
            frames,
            rng,
            twinkles,
        })
    }

    /// Per-pixel state, in pixel map order
    pub fn twinkles(&self) -> &[Twinkle] {
        &self.twinkles
    }

    #[allow(clippy::cast_precision_loss)]
    fn generate(rng: &mut SplitMix, colors: &[ColorHsl], frames: u32) -> Twinkle {
        let color = match colors {
            [] => ColorRgb::BLACK,
            [color] => color.to_rgb(),
            [first, second, ..] => {
                let mix = rng.below(100) as f32 / 100.0;
                interpolate_hsl(*first, *second, mix).to_rgb()
            }
        };
        let lifetime = frames / (1 + rng.below(LIFETIME_DIVISORS));

        Twinkle::new(color, lifetime)
    }
}

impl Effect for SparkleEffect {
    fn render_frame(&mut self, pixels: &mut [Pixel], ctx: &mut FxContext<'_>) {
        for (twinkle, &index) in self.twinkles.iter_mut().zip(self.pixels) {
            let intensity = twinkle.advance();
            blend_at(pixels, index, twinkle.color.scale(intensity), self.blend);

            if twinkle.is_finished() {
                *twinkle = Self::generate(&mut self.rng, self.colors, self.frames);
            }
        }

        ctx.request_frames(1);
    }
}
