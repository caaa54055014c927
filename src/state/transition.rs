use super::{StateError, StateEvent, TaskId};

/// One `(event, from) -> to` edge. `from == None` matches an empty stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub event: StateEvent,
    pub from: Option<TaskId>,
    pub to: Option<TaskId>,
}

impl Transition {
    pub fn new(event: StateEvent, from: Option<TaskId>, to: Option<TaskId>) -> Self {
        Self { event, from, to }
    }

    /// Entry transition from the empty stack
    pub fn begin(to: TaskId) -> Self {
        Self::new(StateEvent::Begin, None, Some(to))
    }

    pub fn end(from: TaskId, to: Option<TaskId>) -> Self {
        Self::new(StateEvent::End, Some(from), to)
    }

    pub fn pause(from: TaskId, to: TaskId) -> Self {
        Self::new(StateEvent::Pause, Some(from), Some(to))
    }

    pub fn resume(from: TaskId) -> Self {
        Self::new(StateEvent::Resume, Some(from), None)
    }
}

/// Flat transition list with first-match lookup.
///
/// Tables hold tens of entries, a linear scan is fine. At most one entry may
/// exist per `(event, from)` pair.
#[derive(Debug, Clone, Default)]
pub struct TransitionTable {
    entries: Vec<Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, transition: Transition) -> Result<(), StateError> {
        if transition.event == StateEvent::Running {
            return Err(StateError::RunningTransition);
        }
        if self.find(transition.event, transition.from).is_some() {
            return Err(StateError::DuplicateTransition {
                event: transition.event,
                from: describe(transition.from),
            });
        }
        self.entries.push(transition);
        Ok(())
    }

    /// First entry matching `(event, from)`. `Running` never matches.
    pub fn find(&self, event: StateEvent, from: Option<TaskId>) -> Option<&Transition> {
        if event == StateEvent::Running {
            return None;
        }
        self.entries
            .iter()
            .find(|t| t.event == event && t.from == from)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter()
    }
}

pub(super) fn describe(task: Option<TaskId>) -> String {
    task.map_or_else(|| "<empty stack>".to_string(), |id| id.to_string())
}
