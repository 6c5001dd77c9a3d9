//! Key press ripples
//!
//! Every press on a mapped key spawns a ring that travels outwards from the
//! pressed pixel. Live rings are kept in a bounded FIFO; all of them share the
//! same lifetime, so the oldest always retires first.

use embassy_time::Duration;
use heapless::Deque;

use super::{Effect, FxContext, blend_at};
use crate::color::{BlendMode, ColorHsl, ColorRgb};
use crate::error::FxError;
use crate::pixel::{Pixel, pixel_distance};
use crate::{FPS, MAX_RIPPLE_EVENTS};

/// Distance a ring travels over its whole life
const MAX_DISTANCE: u64 = 255;

#[derive(Debug, Clone, Copy)]
pub struct RippleConfig {
    pub pixels: &'static [usize],
    pub color: ColorHsl,
    pub blend: BlendMode,
    /// Number of rings alive at once, at most [`MAX_RIPPLE_EVENTS`]
    pub buffer_size: usize,
    /// Time for a ring to travel across the board
    pub duration: Duration,
    /// Ring thickness in normalized distance units
    pub ripple_width: u8,
}

/// One travelling ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RippleEvent {
    /// Frame buffer index of the pressed pixel
    pub pixel: usize,
    pub distance: u16,
    /// Frames rendered since the press
    pub age: u16,
}

#[derive(Debug, Clone)]
pub struct RippleEffect {
    pixels: &'static [usize],
    color: ColorRgb,
    blend: BlendMode,
    capacity: usize,
    distance_per_frame: u16,
    ring_width: u16,
    lifetime: u16,
    events: Deque<RippleEvent, MAX_RIPPLE_EVENTS>,
    armed: bool,
}

impl RippleEffect {
    /// Fails with [`FxError::ResourceExhausted`] when `buffer_size` exceeds
    /// [`MAX_RIPPLE_EVENTS`]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(config: &RippleConfig) -> Result<Self, FxError> {
        if config.buffer_size > MAX_RIPPLE_EVENTS {
            return Err(FxError::ResourceExhausted);
        }

        let millis = config.duration.as_millis().max(1);
        let distance_per_frame =
            ((MAX_DISTANCE * 1000 / millis) / u64::from(FPS)).clamp(1, MAX_DISTANCE) as u16;

        Ok(Self {
            pixels: config.pixels,
            color: config.color.to_rgb(),
            blend: config.blend,
            capacity: config.buffer_size.max(1),
            distance_per_frame,
            ring_width: u16::from(config.ripple_width / 2).max(1),
            lifetime: MAX_DISTANCE as u16 / distance_per_frame,
            events: Deque::new(),
            armed: false,
        })
    }

    /// Live rings, oldest first
    pub fn events(&self) -> impl Iterator<Item = &RippleEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames a ring advances before it retires
    pub const fn lifetime(&self) -> u16 {
        self.lifetime
    }

    pub const fn distance_per_frame(&self) -> u16 {
        self.distance_per_frame
    }

    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Spawn a ring at `pixel`
    ///
    /// Presses are ignored while the effect is stopped. A full queue drops the
    /// press and reports [`FxError::ResourceExhausted`].
    pub fn on_key_press(&mut self, pixel: usize, ctx: &mut FxContext<'_>) -> Result<(), FxError> {
        if !self.armed {
            return Ok(());
        }

        if self.events.len() >= self.capacity {
            return Err(FxError::ResourceExhausted);
        }

        self.events
            .push_back(RippleEvent {
                pixel,
                distance: 0,
                age: 0,
            })
            .map_err(|_| FxError::ResourceExhausted)?;

        ctx.request_frames(u32::from(self.lifetime) + 1);
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn render_event(&self, event: &RippleEvent, pixels: &mut [Pixel]) {
        let Some(origin) = pixels.get(event.pixel).copied() else {
            return;
        };

        for &index in self.pixels {
            let Some(pixel) = pixels.get(index) else {
                continue;
            };

            let offset = u16::from(pixel_distance(&origin, pixel)).abs_diff(event.distance);
            if offset >= self.ring_width {
                continue;
            }

            let intensity = 1.0 - f32::from(offset) / f32::from(self.ring_width);
            blend_at(pixels, index, self.color.scale(intensity), self.blend);
        }
    }
}

impl Effect for RippleEffect {
    fn start(&mut self, _ctx: &mut FxContext<'_>) {
        self.armed = true;
    }

    fn stop(&mut self, _ctx: &mut FxContext<'_>) {
        self.armed = false;
        self.events.clear();
    }

    fn render_frame(&mut self, pixels: &mut [Pixel], _ctx: &mut FxContext<'_>) {
        let mut retired = 0;

        for event in self.events.iter() {
            self.render_event(event, pixels);
        }

        for event in self.events.iter_mut() {
            if event.age < self.lifetime {
                event.distance = event.distance.saturating_add(self.distance_per_frame);
                event.age += 1;
            } else {
                retired += 1;
            }
        }

        for _ in 0..retired {
            self.events.pop_front();
        }
    }
}
