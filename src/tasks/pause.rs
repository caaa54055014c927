use std::f32::consts::TAU;

use tracing::{info, warn};

use super::Elapsed;
use crate::display::{Color, Surface, SurfaceError};
use crate::geometry::Point;
use crate::state::{StateEvent, StateTask};

/// How much of the frozen frame shows through the veil
const DIM: f32 = 0.5;
const PULSE_HZ: f32 = 0.8;

/// Freezes the last frame, dims it and draws a pause sign until resumed
pub struct PauseTask {
    snapshot: Surface,
    veil: Surface,
    captured: bool,
    clock: Elapsed,
}

impl PauseTask {
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let mut veil = Surface::new(width, height)?;
        veil.fill(Color::BLACK);
        Ok(Self {
            snapshot: Surface::new(width, height)?,
            veil,
            captured: false,
            clock: Elapsed::default(),
        })
    }

    fn frame(&mut self, screen: &mut Surface) -> Result<(), SurfaceError> {
        if !self.captured {
            self.snapshot.copy_from(screen)?;
            self.captured = true;
        }
        screen.copy_from(&self.snapshot)?;

        if self.veil.width() != screen.width() || self.veil.height() != screen.height() {
            self.veil = Surface::new(screen.width(), screen.height())?;
            self.veil.fill(Color::BLACK);
        }
        let veil_rect = self.veil.bounds();
        screen.blend(Point::new(0, 0), &self.veil, veil_rect, DIM, None)?;

        let w = screen.width() as i32;
        let h = screen.height() as i32;
        let cx = w / 2;
        let cy = h / 2;
        let bar_h = (h / 6).max(3);
        let bar_w = (w / 40).max(2);
        let gap = bar_w;

        // Two upright bars
        for left in [cx - gap / 2 - bar_w, cx + (gap + 1) / 2] {
            for dx in 0..bar_w {
                screen.vline(
                    Point::new(left + dx, cy - bar_h / 2),
                    Point::new(left + dx, cy + bar_h / 2),
                    Color::WHITE,
                );
            }
        }

        // Underline
        let under_y = cy + bar_h / 2 + bar_w;
        screen.hline(
            Point::new(cx - gap / 2 - bar_w, under_y),
            Point::new(cx + (gap + 1) / 2 + bar_w - 1, under_y),
            Color::WHITE,
        );

        // Breathing ring around the sign
        let pulse = ((self.clock.seconds() * PULSE_HZ * TAU).sin() + 1.0) * 0.5;
        let base = bar_h as f32 * 0.9;
        let radius = (base + pulse * bar_h as f32 * 0.3) as i32;
        let ring = Color::rgb(
            (120.0 + 135.0 * pulse) as u8,
            (120.0 + 135.0 * pulse) as u8,
            255,
        );
        screen.circle(Point::new(cx, cy), radius, ring);

        Ok(())
    }
}

impl StateTask for PauseTask {
    fn name(&self) -> &str {
        "pause"
    }

    fn setup(&mut self) {
        info!("paused");
        self.captured = false;
        self.clock.reset();
    }

    fn cleanup(&mut self) {
        info!(paused_for = self.clock.seconds(), "resumed");
    }

    fn run(&mut self, time: f64, screen: &mut Surface) -> StateEvent {
        self.clock.advance(time);
        if let Err(e) = self.frame(screen) {
            warn!(error = %e, "pause overlay skipped");
        }
        StateEvent::Running
    }
}
