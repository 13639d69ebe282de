//! Frame clock for the animation.
//!
//! Animation time advances by a fixed step per frame rather than by wall
//! clock, so the motion is paced by the display refresh exactly like a
//! browser animation-frame loop. Wall-clock time is only used to estimate
//! FPS for logging.
//!
//! # Example
//!
//! ```ignore
//! use morphfield::time::Time;
//!
//! let mut time = Time::new(0.018);
//!
//! // Once per frame:
//! let t = time.tick();
//! println!("t = {:.3}, frame {}", t, time.frame());
//! ```

use std::time::{Duration, Instant};

/// Fixed-step time accumulator with frame counting.
#[derive(Debug)]
pub struct Time {
    /// Animation time added per frame.
    step: f32,
    /// Accumulated animation time.
    elapsed: f32,
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    paused: bool,
    /// Time scale multiplier (1.0 = normal speed).
    time_scale: f32,
}

impl Time {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            elapsed: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: Instant::now(),
            fps_update_interval: Duration::from_millis(500),
            paused: false,
            time_scale: 1.0,
        }
    }

    /// Advance one frame. Returns the new animation time.
    ///
    /// While paused the animation time holds still but frames are still
    /// counted.
    pub fn tick(&mut self) -> f32 {
        if !self.paused {
            self.elapsed += self.step * self.time_scale;
        }
        self.frame_count += 1;

        let now = Instant::now();
        let since = now.duration_since(self.fps_update_time);
        if since >= self.fps_update_interval {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = frames as f32 / since.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.elapsed
    }

    /// Accumulated animation time.
    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Animation time added per unpaused frame at scale 1.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent frames-per-second estimate (0 until the first interval).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Set time scale multiplier. Negative values clamp to 0.
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(0.018)
    }
}
