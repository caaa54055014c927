//! Box wipe between two effects
//!
//! The outgoing effect keeps drawing to the screen while the incoming one
//! draws into a private buffer. A centred viewport grows over the transition
//! and the buffer is blended through it with rising opacity.

use tracing::{debug, warn};

use super::{Elapsed, SharedEffect};
use crate::display::{Surface, SurfaceError, Viewport};
use crate::geometry::Rect;
use crate::state::{StateEvent, StateTask};

pub struct WipeTask {
    label: String,
    outgoing: SharedEffect,
    incoming: SharedEffect,
    duration: f32,
    clock: Elapsed,
    buffer: Surface,
    viewport: Viewport,
}

impl WipeTask {
    pub fn new(
        outgoing: SharedEffect,
        incoming: SharedEffect,
        duration_secs: f32,
        width: u32,
        height: u32,
    ) -> Result<Self, SurfaceError> {
        let label = format!(
            "wipe {}->{}",
            outgoing.borrow().name(),
            incoming.borrow().name()
        );
        Ok(Self {
            label,
            outgoing,
            incoming,
            duration: duration_secs,
            clock: Elapsed::default(),
            buffer: Surface::new(width, height)?,
            viewport: Viewport::new(),
        })
    }

    /// 0 at the start of the wipe, 1 once the incoming effect covers the screen
    pub fn progress(&self) -> f32 {
        (self.clock.seconds() / self.duration).clamp(0.0, 1.0)
    }

    fn frame(&mut self, dt: f32, screen: &mut Surface) -> Result<(), SurfaceError> {
        let (width, height) = (screen.width(), screen.height());
        if self.buffer.width() != width || self.buffer.height() != height {
            self.buffer = Surface::new(width, height)?;
        }

        {
            let mut outgoing = self.outgoing.borrow_mut();
            outgoing.update(dt, width, height);
            outgoing.render(screen)?;
        }
        {
            let mut incoming = self.incoming.borrow_mut();
            incoming.update(dt, width, height);
            incoming.render(&mut self.buffer)?;
        }

        // Smoothstep
        let p = self.progress();
        let eased = p * p * (3.0 - 2.0 * p);

        let w = (width as f32 * eased).round() as i32;
        let h = (height as f32 * eased).round() as i32;
        self.viewport.set(Rect::new(
            (width as i32 - w) / 2,
            (height as i32 - h) / 2,
            w,
            h,
        ));

        screen.blend_viewport(&self.buffer, &self.viewport, eased, None)
    }
}

impl StateTask for WipeTask {
    fn name(&self) -> &str {
        &self.label
    }

    fn setup(&mut self) {
        debug!(wipe = %self.label, "transition started");
        self.clock.reset();
        self.viewport.reset();
    }

    fn cleanup(&mut self) {
        self.viewport.reset();
    }

    fn run(&mut self, time: f64, screen: &mut Surface) -> StateEvent {
        let dt = self.clock.advance(time);
        if let Err(e) = self.frame(dt, screen) {
            warn!(wipe = %self.label, error = %e, "transition frame skipped");
        }

        if self.progress() >= 1.0 {
            StateEvent::End
        } else {
            StateEvent::Running
        }
    }
}
