//! Frame timestamp sources
//!
//! The manager has a single `tick(time, ..)` entry point; a clock supplies
//! the timestamps. The host decides when frames happen (VSync, a fixed step
//! for headless runs) and stops the loop by returning `None`.

use std::time::Instant;

pub trait FrameClock {
    /// Timestamp in milliseconds for the next frame, `None` once the host
    /// stops issuing frames
    fn next_frame(&mut self) -> Option<f64>;
}

/// Real time since the clock was created. Never stops on its own.
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for WallClock {
    fn next_frame(&mut self) -> Option<f64> {
        Some(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Synthetic clock advancing a fixed step per frame, optionally for a
/// limited number of frames
pub struct FixedStepClock {
    step_ms: f64,
    now: f64,
    remaining: Option<u64>,
}

impl FixedStepClock {
    pub fn new(step_ms: f64) -> Self {
        Self {
            step_ms,
            now: 0.0,
            remaining: None,
        }
    }

    /// Stop after `frames` timestamps
    pub fn with_limit(step_ms: f64, frames: u64) -> Self {
        Self {
            remaining: Some(frames),
            ..Self::new(step_ms)
        }
    }

    /// 60 Hz display refresh
    pub fn sixty_hz() -> Self {
        Self::new(1000.0 / 60.0)
    }
}

impl FrameClock for FixedStepClock {
    fn next_frame(&mut self) -> Option<f64> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }
        let t = self.now;
        self.now += self.step_ms;
        Some(t)
    }
}
