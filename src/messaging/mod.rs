// Messaging between the invoker worker and its observers

pub mod notification;

pub use notification::{ListenerId, StackEvent, StackListener, StackListeners};
