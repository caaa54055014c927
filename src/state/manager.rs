use std::collections::VecDeque;

use tracing::{debug, error, info};

use super::transition::describe;
use super::{StateError, StateEvent, StateTask, TaskId, Transition, TransitionTable};
use crate::display::Surface;

/// Stack-based task runner.
///
/// Tasks live in an arena and are referred to by [`TaskId`]. The stack holds
/// ids; only the top task is run. Transitions are registered up front and
/// frozen by [`start`](Self::start).
pub struct StatesManager {
    tasks: Vec<Box<dyn StateTask>>,
    transitions: TransitionTable,
    stack: Vec<TaskId>,
    /// Events posted from outside the running task, applied on the next tick
    pending: VecDeque<StateEvent>,
    started: bool,
    frames: u64,
}

impl StatesManager {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            transitions: TransitionTable::new(),
            stack: Vec::new(),
            pending: VecDeque::new(),
            started: false,
            frames: 0,
        }
    }

    /// Register a task and get its handle
    pub fn add_task(&mut self, task: Box<dyn StateTask>) -> TaskId {
        let id = TaskId(self.tasks.len());
        debug!(task = task.name(), %id, "registered task");
        self.tasks.push(task);
        id
    }

    /// Register a transition. Only allowed before `start`.
    pub fn add(&mut self, transition: Transition) -> Result<(), StateError> {
        if self.started {
            return Err(StateError::AlreadyStarted);
        }
        for id in [transition.from, transition.to].into_iter().flatten() {
            if id.0 >= self.tasks.len() {
                return Err(StateError::UnknownTask(id));
            }
        }
        self.transitions.insert(transition)
    }

    pub fn find(&self, event: StateEvent, from: Option<TaskId>) -> Option<&Transition> {
        self.transitions.find(event, from)
    }

    /// Freeze the transition table and fire `Begin` against the empty stack
    pub fn start(&mut self) -> Result<(), StateError> {
        if self.started {
            return Err(StateError::AlreadyStarted);
        }
        self.started = true;
        info!(
            tasks = self.tasks.len(),
            transitions = self.transitions.len(),
            "state manager started"
        );
        self.apply(StateEvent::Begin)
    }

    /// Queue an event from outside the running task (keyboard, remote control).
    /// Queued events are applied in order at the start of the next tick.
    pub fn post(&mut self, event: StateEvent) {
        self.pending.push_back(event);
    }

    /// Rewrite the stack for `event`, as seen from the current top task.
    ///
    /// A missing transition is logged and leaves everything as it was.
    pub fn apply(&mut self, event: StateEvent) -> Result<(), StateError> {
        if event == StateEvent::Running {
            return Ok(());
        }

        let from = self.top();
        let Some(&Transition { to, .. }) = self.transitions.find(event, from) else {
            let from = self.label(from);
            error!(%event, %from, "no transition defined, staying put");
            return Err(StateError::MissingTransition { event, from });
        };

        debug!(%event, from = %self.label(from), to = %self.label(to), "transition");

        match event {
            StateEvent::Begin | StateEvent::Pause => {
                if let Some(to) = to {
                    self.push(to);
                }
            },
            StateEvent::End => {
                if from.is_some() {
                    self.pop();
                }
                if let Some(to) = to {
                    self.push(to);
                }
            },
            StateEvent::Resume => {
                // The revealed task keeps its state and is not set up again
                if from.is_some() {
                    self.pop();
                }
            },
            StateEvent::Running => {},
        }

        Ok(())
    }

    /// One frame: apply posted events, then run the top task and apply the
    /// event it returns.
    ///
    /// Returns the event the task produced, or `None` when nothing ran (not
    /// started, empty stack, or the top task is not active yet).
    pub fn tick(&mut self, time: f64, screen: &mut Surface) -> Option<StateEvent> {
        if !self.started {
            return None;
        }

        while let Some(event) = self.pending.pop_front() {
            // Failures are logged by apply; the loop keeps going regardless
            let _ = self.apply(event);
        }

        let top = self.top()?;
        let task = &mut self.tasks[top.0];
        if !task.is_active() {
            return None;
        }

        self.frames += 1;
        let event = task.run(time, screen);
        let _ = self.apply(event);
        Some(event)
    }

    fn push(&mut self, id: TaskId) {
        self.stack.push(id);
        self.tasks[id.0].setup();
    }

    fn pop(&mut self) {
        if let Some(id) = self.stack.pop() {
            self.tasks[id.0].cleanup();
        }
    }

    fn label(&self, id: Option<TaskId>) -> String {
        match id.and_then(|id| self.task_name(id).map(|name| (id, name))) {
            Some((id, name)) => format!("{}{}", name, id),
            None => describe(id),
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn top(&self) -> Option<TaskId> {
        self.stack.last().copied()
    }

    /// Bottom-to-top task ids
    pub fn stack(&self) -> &[TaskId] {
        &self.stack
    }

    pub fn task(&self, id: TaskId) -> Option<&dyn StateTask> {
        self.tasks.get(id.0).map(|t| t.as_ref())
    }

    pub fn task_name(&self, id: TaskId) -> Option<&str> {
        self.tasks.get(id.0).map(|t| t.name())
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Started and nothing left on the stack
    pub fn is_idle(&self) -> bool {
        self.started && self.stack.is_empty()
    }

    /// Number of frames a task was actually run for
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Default for StatesManager {
    fn default() -> Self {
        Self::new()
    }
}
