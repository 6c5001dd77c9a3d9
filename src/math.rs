use embassy_time::Duration;

use crate::FPS;

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Progress of `elapsed` within `duration` as `0.0..=1.0`
#[allow(clippy::cast_precision_loss)]
#[inline]
pub fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.as_millis() == 0 {
        return 1.0;
    }
    if elapsed.as_millis() >= duration.as_millis() {
        return 1.0;
    }

    elapsed.as_millis() as f32 / duration.as_millis() as f32
}

/// Number of frames rendered at [`FPS`] over `duration`
#[allow(clippy::cast_possible_truncation)]
pub const fn frames_for(duration: Duration) -> u32 {
    let frames = duration.as_millis() * FPS as u64 / 1000;
    if frames > u32::MAX as u64 {
        u32::MAX
    } else {
        frames as u32
    }
}

/// Small `SplitMix64` pseudo random generator
///
/// Deterministic for a given seed, which keeps effects reproducible in tests.
#[derive(Debug, Clone)]
pub struct SplitMix {
    state: u64,
}

impl SplitMix {
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        #[allow(clippy::cast_possible_truncation)]
        {
            ((z ^ (z >> 31)) >> 32) as u32
        }
    }

    /// Uniform-ish value in `0..bound`, zero when `bound` is zero
    pub fn below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            return 0;
        }
        self.next_u32() % bound
    }
}
