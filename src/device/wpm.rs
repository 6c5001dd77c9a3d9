use embassy_time::{Duration, Instant};

use crate::frame_scheduler::FrameScheduler;
use crate::math::{lerp, progress};

/// Number of keystroke slots, covering the last 4.5 s at [`WPM_INTERVAL`]
pub const WPM_BUFFER_LENGTH: usize = 15;

/// Interval between two rate computations
pub const WPM_INTERVAL: Duration = Duration::from_millis(300);

const WPM_SIGMA: f32 = 15.0;
const STROKES_PER_WORD: f32 = 5.0;

/// Typing speed estimator
///
/// Keystrokes are counted into the current slot of a circular buffer. Every
/// [`WPM_INTERVAL`] a Gaussian-weighted average over the buffer (weights
/// decaying with the circular distance from the current slot) becomes the new
/// rate. The interval timer stops itself once the whole buffer holds zero
/// keystrokes and restarts on the next key press.
#[derive(Debug, Clone)]
pub struct WpmEstimator {
    keystrokes: [u8; WPM_BUFFER_LENGTH],
    cursor: usize,
    last_wpm: u8,
    current_wpm: u8,
    computed_at: Instant,
    next_computation: Option<Instant>,
}

impl Default for WpmEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl WpmEstimator {
    pub const fn new() -> Self {
        Self {
            keystrokes: [0; WPM_BUFFER_LENGTH],
            cursor: 0,
            last_wpm: 0,
            current_wpm: 0,
            computed_at: Instant::from_millis(0),
            next_computation: None,
        }
    }

    /// Count a key press and arm the interval timer if it is stopped
    pub fn on_key_press(&mut self, now: Instant) {
        self.keystrokes[self.cursor] = self.keystrokes[self.cursor].saturating_add(1);

        if self.next_computation.is_none() {
            self.next_computation = Some(now + WPM_INTERVAL);
        }
    }

    /// Run every computation that became due by `now`
    pub fn poll(&mut self, now: Instant, frames: &mut FrameScheduler) {
        while let Some(due) = self.next_computation {
            if now < due {
                break;
            }

            self.compute(due, frames);
            if self.next_computation.is_some() {
                self.next_computation = Some(due + WPM_INTERVAL);
            }
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn compute(&mut self, at: Instant, frames: &mut FrameScheduler) {
        let mut total_keystrokes: u32 = 0;
        let mut averages = 0.0;
        let mut weights = 0.0;

        for (slot, &count) in self.keystrokes.iter().enumerate() {
            let distance = ((self.cursor + WPM_BUFFER_LENGTH - slot) % WPM_BUFFER_LENGTH) as f32;
            let weight = libm::expf(-(distance * distance) / (2.0 * WPM_SIGMA));

            weights += weight;
            averages += weight * f32::from(count);
            total_keystrokes += u32::from(count);
        }

        let intervals_per_minute = 60_000.0 / WPM_INTERVAL.as_millis() as f32;
        let rate = (averages / weights) * intervals_per_minute / STROKES_PER_WORD;

        self.last_wpm = self.current_wpm;
        self.current_wpm = rate.clamp(0.0, 255.0) as u8;
        self.computed_at = at;

        if self.current_wpm > 0 {
            frames.request_frames(1);
        }

        self.cursor = (self.cursor + 1) % WPM_BUFFER_LENGTH;
        self.keystrokes[self.cursor] = 0;

        if total_keystrokes == 0 {
            self.next_computation = None;
        }
    }

    /// Latest computed rate
    pub const fn current_wpm(&self) -> u8 {
        self.current_wpm
    }

    /// Rate computed before the latest one
    pub const fn last_wpm(&self) -> u8 {
        self.last_wpm
    }

    /// Whether the interval timer is armed
    pub const fn is_running(&self) -> bool {
        self.next_computation.is_some()
    }

    /// Whether the displayed rate is still non-zero or moving
    pub const fn is_animating(&self) -> bool {
        self.last_wpm != 0 || self.current_wpm != 0
    }

    pub const fn deadline(&self) -> Option<Instant> {
        self.next_computation
    }

    /// Rate eased from the previous to the latest computation
    ///
    /// Progresses linearly over one interval after the latest computation and
    /// never overshoots the latest value.
    pub fn interpolated_wpm(&self, now: Instant) -> f32 {
        let elapsed = now
            .checked_duration_since(self.computed_at)
            .unwrap_or(Duration::from_millis(0));
        let delta = progress(elapsed, WPM_INTERVAL);

        lerp(f32::from(self.last_wpm), f32::from(self.current_wpm), delta)
    }
}
