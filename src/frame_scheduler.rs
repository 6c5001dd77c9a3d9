//! Frame request scheduling.
//!
//! Rendering only happens while frames are outstanding. Effects and event
//! handlers call [`FrameScheduler::request_frames`]; the engine asks the
//! scheduler each tick whether a frame is due. When the countdown runs out the
//! scheduler drops back to [`SchedulerState::Idle`] and no frame is rendered
//! until the next request.

use embassy_time::{Duration, Instant};
use log::debug;

use crate::FRAME_DURATION;

/// Whether the periodic frame tick is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No periodic tick, nothing is rendered
    Idle,
    /// Periodic tick active with outstanding frames
    Running,
}

/// Countdown of outstanding frames plus frame pacing
///
/// The scheduler never sleeps itself: the caller asks [`FrameScheduler::begin_frame`]
/// on every tick and waits until [`FrameScheduler::next_deadline`] in between.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    countdown: u32,
    state: SchedulerState,
    /// Deadline of the next frame. `None` right after leaving Idle, meaning
    /// the first frame is due on the next tick.
    next_frame: Option<Instant>,
    frame_duration: Duration,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    /// Create an idle scheduler pacing at [`FRAME_DURATION`].
    pub const fn new() -> Self {
        Self::with_frame_duration(FRAME_DURATION)
    }

    /// Create an idle scheduler with custom frame duration.
    pub const fn with_frame_duration(frame_duration: Duration) -> Self {
        Self {
            countdown: 0,
            state: SchedulerState::Idle,
            next_frame: None,
            frame_duration,
        }
    }

    pub const fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames still owed before going idle
    pub const fn countdown(&self) -> u32 {
        self.countdown
    }

    pub const fn frame_duration(&self) -> Duration {
        self.frame_duration
    }

    /// Make sure at least `frames` more frames are rendered
    ///
    /// Requests never lower the countdown. A request while idle starts the
    /// periodic tick.
    pub fn request_frames(&mut self, frames: u32) {
        if frames <= self.countdown {
            return;
        }

        if self.state == SchedulerState::Idle {
            debug!("frame scheduler running ({} frames)", frames);
            self.state = SchedulerState::Running;
            self.next_frame = None;
        }

        self.countdown = frames;
    }

    /// Check whether a frame is due at `now`
    ///
    /// When it is, one frame is taken off the countdown before rendering, so
    /// effects that request another frame from their render pass keep the
    /// scheduler running.
    pub fn begin_frame(&mut self, now: Instant) -> bool {
        if self.state == SchedulerState::Idle {
            return false;
        }

        let deadline = self.next_frame.unwrap_or(now);
        if now < deadline {
            return false;
        }

        // Skip the backlog instead of catching up after a long stall
        let max_drift = self.frame_duration + self.frame_duration;
        let deadline = if now > deadline + max_drift {
            now
        } else {
            deadline
        };

        self.countdown = self.countdown.saturating_sub(1);
        self.next_frame = Some(deadline + self.frame_duration);
        true
    }

    /// Finish the frame started by [`FrameScheduler::begin_frame`]
    pub fn end_frame(&mut self) {
        if self.countdown == 0 && self.state == SchedulerState::Running {
            debug!("frame scheduler idle");
            self.state = SchedulerState::Idle;
            self.next_frame = None;
        }
    }

    /// Force the scheduler idle and drop every outstanding frame
    pub fn stop(&mut self) {
        self.countdown = 0;
        self.state = SchedulerState::Idle;
        self.next_frame = None;
    }

    /// When the next frame is due, `None` while idle
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        match self.state {
            SchedulerState::Idle => None,
            SchedulerState::Running => Some(self.next_frame.unwrap_or(now)),
        }
    }
}
