//! Wires the playlist into a state machine.
//!
//! ```text
//!   Begin ─▶ fx0 ─End─▶ wipe0 ─End─▶ fx1 ─End─▶ wipe1 ─End─▶ ... ─▶ fxN
//!                                                                    │
//!                        repeat: wipeN back to fx0, otherwise End ─▶ (empty)
//!
//!   any effect or wipe ─Pause─▶ pause ─Resume─▶ (back where it was)
//! ```

use std::rc::Rc;

use tracing::info;

use crate::config::GalleryConfig;
use crate::effects;
use crate::error::GalleryResult;
use crate::state::{StateEvent, StatesManager, TaskId, Transition};
use crate::tasks::{share, EffectTask, PauseTask, SharedEffect, WipeTask};

/// Built state machine plus the handles the host needs
pub struct Gallery {
    pub manager: StatesManager,
    /// One task per playlist entry, in order
    pub effects: Vec<TaskId>,
    pub wipes: Vec<TaskId>,
    pub pause: TaskId,
}

pub fn build(config: &GalleryConfig, width: u32, height: u32) -> GalleryResult<Gallery> {
    config.validate()?;

    let shared = config
        .playlist
        .iter()
        .map(|name| effects::create(name, width, height).map(share))
        .collect::<GalleryResult<Vec<SharedEffect>>>()?;

    let mut manager = StatesManager::new();
    let effect_ids: Vec<TaskId> = shared
        .iter()
        .map(|fx| {
            manager.add_task(Box::new(EffectTask::new(
                Rc::clone(fx),
                config.effect_seconds,
            )))
        })
        .collect();

    let count = effect_ids.len();
    let mut wipes = Vec::with_capacity(count);
    manager.add(Transition::begin(effect_ids[0]))?;

    for i in 0..count {
        let next = if i + 1 < count {
            Some(i + 1)
        } else if config.repeat {
            Some(0)
        } else {
            None
        };

        match next {
            None => manager.add(Transition::end(effect_ids[i], None))?,
            // Single entry on repeat: restart it without a wipe
            Some(j) if j == i => manager.add(Transition::end(effect_ids[i], Some(effect_ids[i])))?,
            Some(j) => {
                let wipe = WipeTask::new(
                    Rc::clone(&shared[i]),
                    Rc::clone(&shared[j]),
                    config.transition_seconds,
                    width,
                    height,
                )?;
                let wipe = manager.add_task(Box::new(wipe));
                manager.add(Transition::end(effect_ids[i], Some(wipe)))?;
                manager.add(Transition::end(wipe, Some(effect_ids[j])))?;
                wipes.push(wipe);
            },
        }
    }

    let pause = manager.add_task(Box::new(PauseTask::new(width, height)?));
    for &id in effect_ids.iter().chain(&wipes) {
        manager.add(Transition::pause(id, pause))?;
    }
    manager.add(Transition::resume(pause))?;

    info!(
        effects = count,
        wipes = wipes.len(),
        transitions = manager.transitions().len(),
        repeat = config.repeat,
        "gallery built"
    );

    Ok(Gallery {
        manager,
        effects: effect_ids,
        wipes,
        pause,
    })
}

impl Gallery {
    pub fn start(&mut self) -> GalleryResult<()> {
        self.manager.start()?;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.manager.top() == Some(self.pause)
    }

    /// Queue `Pause` or `Resume` depending on the current state
    pub fn toggle_pause(&mut self) {
        let event = if self.is_paused() {
            StateEvent::Resume
        } else {
            StateEvent::Pause
        };
        self.manager.post(event);
    }

    /// Cut the current effect or wipe short
    pub fn skip(&mut self) {
        if !self.is_paused() {
            self.manager.post(StateEvent::End);
        }
    }

    /// Name of the task on top of the stack
    pub fn current(&self) -> Option<&str> {
        self.manager.top().and_then(|id| self.manager.task_name(id))
    }
}
