//! Frame timer: delta time, framerate, runtime, and frame count
//!
//! When the device falls back to the software adapter the timer switches
//! to a fixed step so animation stays watchable at software speeds.

use std::time::Instant;

pub struct Timer {
    start: Instant,
    last: Instant,
    delta: f32,
    runtime: f32,
    frame_count: u64,
    framerate: f32,
    max_framerate: f32,
    // framerate is refreshed once per second
    fps_window_start: f32,
    fps_window_frames: u32,
    fixed_step: Option<f32>,
}

impl Timer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            delta: 0.0,
            runtime: 0.0,
            frame_count: 0,
            framerate: 0.0,
            max_framerate: 0.0,
            fps_window_start: 0.0,
            fps_window_frames: 0,
            fixed_step: None,
        }
    }

    /// Use a fixed time step per frame instead of wall-clock deltas
    pub fn set_fixed_step(&mut self, step: f32) {
        self.fixed_step = Some(step);
    }

    /// Advance the timer by one frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        match self.fixed_step {
            Some(step) => {
                self.delta = step;
                self.runtime += step;
            }
            None => {
                self.delta = now.duration_since(self.last).as_secs_f32();
                self.runtime = now.duration_since(self.start).as_secs_f32();
            }
        }
        self.last = now;
        self.frame_count += 1;

        self.fps_window_frames += 1;
        let window = self.runtime - self.fps_window_start;
        if window >= 1.0 {
            self.framerate = self.fps_window_frames as f32 / window;
            self.max_framerate = self.max_framerate.max(self.framerate);
            self.fps_window_start = self.runtime;
            self.fps_window_frames = 0;
        }
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn runtime(&self) -> f32 {
        self.runtime
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Framerate, updated once per second
    pub fn framerate(&self) -> f32 {
        self.framerate
    }

    /// Highest framerate observed; logged at shutdown
    pub fn max_framerate(&self) -> f32 {
        self.max_framerate
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
