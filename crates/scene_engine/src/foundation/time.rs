//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the average FPS since timer creation
    pub fn average_fps(&self) -> f32 {
        if self.total_time > 0.0 {
            self.frame_count as f32 / self.total_time
        } else {
            0.0
        }
    }
}

/// Fixed-timestep accumulator
///
/// Converts variable frame deltas into a whole number of simulation ticks so
/// that scene updates stay deterministic regardless of frame rate.
#[derive(Debug, Clone)]
pub struct FixedStep {
    step: f32,
    max_frame_delta: f32,
    accumulator: f32,
}

impl FixedStep {
    /// Create an accumulator producing ticks of `step` seconds
    ///
    /// Frame deltas larger than `max_frame_delta` are clamped so a long stall
    /// cannot queue an unbounded number of ticks.
    pub fn new(step: f32, max_frame_delta: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            max_frame_delta: max_frame_delta.max(step),
            accumulator: 0.0,
        }
    }

    /// Length of one tick in seconds
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Feed a frame delta and return how many ticks should run
    ///
    /// A NaN or infinite delta counts as zero.
    pub fn advance(&mut self, frame_delta: f32) -> u32 {
        let frame_delta = if frame_delta.is_finite() { frame_delta } else { 0.0 };
        self.accumulator += frame_delta.clamp(0.0, self.max_frame_delta);
        let mut ticks = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            ticks += 1;
        }
        ticks
    }

    /// Fraction of a tick left in the accumulator, in `[0, 1)`
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step_accumulates() {
        let mut fixed = FixedStep::new(0.5, 10.0);
        assert_eq!(fixed.advance(0.25), 0);
        assert_eq!(fixed.advance(0.25), 1);
        assert_eq!(fixed.advance(1.0), 2);
    }

    #[test]
    fn test_fixed_step_clamps_long_frames() {
        let mut fixed = FixedStep::new(0.25, 1.0);
        assert_eq!(fixed.advance(100.0), 4);
        assert!(fixed.alpha() < 1.0);
    }

    #[test]
    fn test_fixed_step_ignores_non_finite_frames() {
        let mut fixed = FixedStep::new(0.5, 10.0);
        assert_eq!(fixed.advance(f32::NAN), 0);
        assert_eq!(fixed.advance(f32::INFINITY), 0);
        assert_eq!(fixed.alpha(), 0.0);
        assert_eq!(fixed.advance(0.5), 1);
    }

    #[test]
    fn test_timer_counts_frames() {
        let mut timer = Timer::new();
        timer.update();
        timer.update();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.total_time() >= 0.0);
    }
}
