use tracing::{debug, warn};

use super::{Elapsed, SharedEffect};
use crate::display::Surface;
use crate::state::{StateEvent, StateTask};

/// Shows one effect for a fixed time, then asks to end
pub struct EffectTask {
    effect: SharedEffect,
    label: String,
    duration: f32,
    clock: Elapsed,
}

impl EffectTask {
    pub fn new(effect: SharedEffect, duration_secs: f32) -> Self {
        let label = effect.borrow().name().to_string();
        Self {
            effect,
            label,
            duration: duration_secs,
            clock: Elapsed::default(),
        }
    }

    /// Seconds shown since the last setup
    pub fn elapsed(&self) -> f32 {
        self.clock.seconds()
    }
}

impl StateTask for EffectTask {
    fn name(&self) -> &str {
        &self.label
    }

    fn setup(&mut self) {
        debug!(effect = %self.label, duration = self.duration, "effect on screen");
        self.clock.reset();
    }

    fn cleanup(&mut self) {
        debug!(effect = %self.label, shown = self.clock.seconds(), "effect off screen");
    }

    fn run(&mut self, time: f64, screen: &mut Surface) -> StateEvent {
        let dt = self.clock.advance(time);

        let mut effect = self.effect.borrow_mut();
        effect.update(dt, screen.width(), screen.height());
        if let Err(e) = effect.render(screen) {
            warn!(effect = %self.label, error = %e, "render failed, frame skipped");
        }

        if self.clock.seconds() >= self.duration {
            StateEvent::End
        } else {
            StateEvent::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Color, SurfaceError};
    use crate::effects::Effect;
    use crate::tasks::share;

    struct Solid {
        color: Color,
        fail: bool,
    }

    impl Effect for Solid {
        fn update(&mut self, _dt: f32, _width: u32, _height: u32) {}

        fn render(&self, surface: &mut Surface) -> Result<(), SurfaceError> {
            if self.fail {
                return Err(SurfaceError::Misaligned { cursor: 1 });
            }
            surface.fill(self.color);
            Ok(())
        }

        fn name(&self) -> &str {
            "solid"
        }
    }

    #[test]
    fn test_ends_after_duration() {
        let effect = share(Box::new(Solid {
            color: Color::RED,
            fail: false,
        }));
        let mut task = EffectTask::new(effect, 0.05);
        let mut screen = Surface::new(4, 4).unwrap();
        task.setup();

        let mut events = Vec::new();
        for frame in 0..5 {
            events.push(task.run(frame as f64 * 20.0, &mut screen));
        }
        assert_eq!(task.name(), "solid");
        assert_eq!(&events[..3], &[StateEvent::Running; 3]);
        assert_eq!(events[3], StateEvent::End);
        assert_eq!(screen.get_pixel(3, 3).unwrap(), Color::RED);
    }

    #[test]
    fn test_setup_restarts_duration() {
        let effect = share(Box::new(Solid {
            color: Color::BLUE,
            fail: false,
        }));
        let mut task = EffectTask::new(effect, 1.0);
        let mut screen = Surface::new(2, 2).unwrap();
        task.setup();
        task.run(0.0, &mut screen);
        task.run(50.0, &mut screen);
        assert!(task.elapsed() > 0.0);

        task.setup();
        assert_eq!(task.elapsed(), 0.0);
    }

    #[test]
    fn test_render_error_skips_frame() {
        let effect = share(Box::new(Solid {
            color: Color::RED,
            fail: true,
        }));
        let mut task = EffectTask::new(effect, 10.0);
        let mut screen = Surface::new(2, 2).unwrap();
        task.setup();
        assert_eq!(task.run(0.0, &mut screen), StateEvent::Running);
        assert_eq!(screen.get_pixel(0, 0).unwrap(), Color::TRANSPARENT);
    }
}
