//! Task sequencing
//!
//! Tasks are named units with `setup`/`cleanup` hooks and a per-frame `run`
//! that returns a [`StateEvent`]. The [`StatesManager`] keeps a stack of
//! active tasks and a flat table of `(event, from) -> to` transitions, and
//! rewrites the stack whenever a task asks for something other than
//! `Running`.

pub mod clock;
mod manager;
mod transition;

pub use clock::{FixedStepClock, FrameClock, WallClock};
pub use manager::StatesManager;
pub use transition::{Transition, TransitionTable};

use std::fmt;

use thiserror::Error;

use crate::display::Surface;

/// Events a task returns from `run` to request a stack change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    /// Push the target on top of whatever is there
    Begin,
    /// Clean up the current task and replace it with the target
    End,
    /// Keep going, never looked up
    Running,
    /// Push the target, leaving the current task suspended beneath it
    Pause,
    /// Clean up the current task and return to the one beneath
    Resume,
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Begin => "BEGIN",
            Self::End => "END",
            Self::Running => "RUNNING",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
        };
        f.write_str(name)
    }
}

/// Stable handle to a task registered with a [`StatesManager`].
/// Identity is the handle, never the task's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) usize);

impl TaskId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A schedulable unit driven once per frame while it is on top of the stack
pub trait StateTask {
    fn name(&self) -> &str;

    /// Called when the task is pushed
    fn setup(&mut self) {}

    /// Called when the task ends or is resumed away from
    fn cleanup(&mut self) {}

    /// False while the task is still getting ready. Inactive tasks keep their
    /// place on the stack but are not run.
    fn is_active(&self) -> bool {
        true
    }

    /// One update + render pass. `time` is the frame timestamp in milliseconds.
    fn run(&mut self, time: f64, screen: &mut Surface) -> StateEvent;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("no transition for {event} from {from}")]
    MissingTransition { event: StateEvent, from: String },

    #[error("duplicate transition for {event} from {from}")]
    DuplicateTransition { event: StateEvent, from: String },

    #[error("RUNNING is not a transition event")]
    RunningTransition,

    #[error("unknown task {0}")]
    UnknownTask(TaskId),

    #[error("transitions are fixed once the manager has started")]
    AlreadyStarted,
}
