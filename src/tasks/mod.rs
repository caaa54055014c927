//! State tasks driving the gallery: effects, wipes between them and the
//! pause overlay.

mod effect;
mod pause;
mod wipe;

pub use effect::EffectTask;
pub use pause::PauseTask;
pub use wipe::WipeTask;

use std::cell::RefCell;
use std::rc::Rc;

use crate::effects::Effect;

/// An effect driven by more than one task (its own slot and the wipes on
/// either side of it)
pub type SharedEffect = Rc<RefCell<Box<dyn Effect>>>;

pub fn share(effect: Box<dyn Effect>) -> SharedEffect {
    Rc::new(RefCell::new(effect))
}

/// Longest gap between two frames that still counts as running time.
/// Anything longer (a pause, a stall) is treated as this long.
const MAX_FRAME_MS: f64 = 100.0;

/// Running time of a task, fed from frame timestamps
#[derive(Debug, Default, Clone, Copy)]
struct Elapsed {
    last: Option<f64>,
    total_ms: f64,
}

impl Elapsed {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Move to frame time `time` (ms) and return the delta in seconds.
    /// The first frame after a reset has a zero delta.
    fn advance(&mut self, time: f64) -> f32 {
        let dt = self
            .last
            .map_or(0.0, |last| (time - last).clamp(0.0, MAX_FRAME_MS));
        self.last = Some(time);
        self.total_ms += dt;
        (dt / 1000.0) as f32
    }

    fn seconds(&self) -> f32 {
        (self.total_ms / 1000.0) as f32
    }
}
