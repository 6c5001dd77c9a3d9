//! Pixel frame buffer
//!
//! Holds the accumulated color of every pixel during a render pass and
//! partitions the finalized frame across the configured output segments.

use heapless::Vec;

use crate::{MAX_SEGMENTS, PixelSink};
use crate::color::{BlendMode, ColorRgb, Rgb};

/// Pixel with a fixed position and an accumulating color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pixel {
    x: u8,
    y: u8,
    /// Accumulated color, not yet clamped to display range
    pub value: ColorRgb,
}

impl Pixel {
    pub const fn new(x: u8, y: u8) -> Self {
        Self {
            x,
            y,
            value: ColorRgb::BLACK,
        }
    }

    pub const fn x(&self) -> u8 {
        self.x
    }

    pub const fn y(&self) -> u8 {
        self.y
    }

    /// Blend `color` into the accumulated value
    #[inline]
    pub fn blend(&mut self, color: ColorRgb, mode: BlendMode) {
        self.value = mode.apply(self.value, color);
    }
}

/// Distance between two pixels, normalized so the diagonal of a 255x255 grid fits in `u8`
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn pixel_distance(a: &Pixel, b: &Pixel) -> u8 {
    let dx = f32::from(a.x) - f32::from(b.x);
    let dy = f32::from(a.y) - f32::from(b.y);
    let distance = libm::sqrtf(dx * dx + dy * dy) * 255.0 / 360.0;

    distance.min(255.0) as u8
}

/// Static board layout
#[derive(Debug, Clone, Copy)]
pub struct PixelLayout {
    /// `(x, y)` position of every pixel, in buffer order
    pub positions: &'static [(u8, u8)],
    /// Pixel index for every key position
    pub key_pixels: &'static [usize],
    /// Number of pixels driven by each output segment, in buffer order
    pub segments: &'static [usize],
}

/// Fixed-size ordered sequence of pixels
///
/// `N` is the capacity. Layout positions beyond it are ignored.
#[derive(Debug)]
pub struct FrameBuffer<const N: usize> {
    pixels: Vec<Pixel, N>,
    output: Vec<Rgb, N>,
    key_pixels: &'static [usize],
    segments: &'static [usize],
}

impl<const N: usize> FrameBuffer<N> {
    pub fn new(layout: &PixelLayout) -> Self {
        debug_assert!(layout.positions.len() <= N, "layout exceeds frame buffer capacity");
        debug_assert!(layout.segments.len() <= MAX_SEGMENTS, "too many output segments");

        let mut pixels = Vec::new();
        let mut output = Vec::new();
        for &(x, y) in layout.positions.iter().take(N) {
            let _ = pixels.push(Pixel::new(x, y));
            let _ = output.push(Rgb::default());
        }

        Self {
            pixels,
            output,
            key_pixels: layout.key_pixels,
            segments: layout.segments,
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Last flushed frame
    pub fn output(&self) -> &[Rgb] {
        &self.output
    }

    /// Pixel index lit by the key at `position`, if any
    pub fn pixel_for_key(&self, position: usize) -> Option<usize> {
        self.key_pixels
            .get(position)
            .copied()
            .filter(|&index| index < self.pixels.len())
    }

    /// Reset every accumulated color to black
    pub fn reset(&mut self) {
        for pixel in &mut self.pixels {
            pixel.value = ColorRgb::BLACK;
        }
    }

    /// Clamp the accumulated colors and push them to the sink, one slice per segment
    ///
    /// Without configured segments the whole buffer goes to segment 0.
    pub fn flush<S: PixelSink>(&mut self, sink: &mut S) {
        for (out, pixel) in self.output.iter_mut().zip(self.pixels.iter()) {
            *out = pixel.value.to_led();
        }

        if self.segments.is_empty() {
            sink.update(0, &self.output);
            return;
        }

        let mut start = 0;
        for (segment, &length) in self.segments.iter().enumerate() {
            let end = (start + length).min(self.output.len());
            sink.update(segment, &self.output[start..end]);
            start = end;
        }
    }
}
