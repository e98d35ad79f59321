// Stack change notifications for toolbar and menu state

use crate::command::StackKind;
use std::sync::Arc;

/// Identifies a registered listener so it can be removed later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A stack length change, emitted after the stack was mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEvent {
    UndoStackChanged(usize),
    RedoStackChanged(usize),
}

impl StackEvent {
    pub fn changed(stack: StackKind, len: usize) -> Self {
        match stack {
            StackKind::Undo => StackEvent::UndoStackChanged(len),
            StackKind::Redo => StackEvent::RedoStackChanged(len),
        }
    }

    pub fn stack(&self) -> StackKind {
        match self {
            StackEvent::UndoStackChanged(_) => StackKind::Undo,
            StackEvent::RedoStackChanged(_) => StackKind::Redo,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StackEvent::UndoStackChanged(len) | StackEvent::RedoStackChanged(len) => *len,
        }
    }
}

pub type StackListener = Arc<dyn Fn(usize) + Send + Sync>;

/// Listeners for both stacks, in registration order
#[derive(Default)]
pub struct StackListeners {
    next_id: u64,
    undo: Vec<(ListenerId, StackListener)>,
    redo: Vec<(ListenerId, StackListener)>,
}

impl StackListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, stack: StackKind, listener: StackListener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.list_mut(stack).push((id, listener));
        id
    }

    /// Returns false if the listener was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.undo.len() + self.redo.len();
        self.undo.retain(|(listener_id, _)| *listener_id != id);
        self.redo.retain(|(listener_id, _)| *listener_id != id);
        before != self.undo.len() + self.redo.len()
    }

    /// Snapshot of the listeners interested in an event
    ///
    /// Callers invoke the returned listeners without holding any lock, so a
    /// listener may subscribe or query the invoker itself.
    pub fn listeners_for(&self, event: &StackEvent) -> Vec<StackListener> {
        self.list(event.stack())
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.undo.len() + self.redo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list(&self, stack: StackKind) -> &Vec<(ListenerId, StackListener)> {
        match stack {
            StackKind::Undo => &self.undo,
            StackKind::Redo => &self.redo,
        }
    }

    fn list_mut(&mut self, stack: StackKind) -> &mut Vec<(ListenerId, StackListener)> {
        match stack {
            StackKind::Undo => &mut self.undo,
            StackKind::Redo => &mut self.redo,
        }
    }
}

/// Fire an event on a snapshot of listeners
pub fn emit(listeners: &[StackListener], event: StackEvent) {
    for listener in listeners {
        listener(event.len());
    }
}
