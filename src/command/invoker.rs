// Invoker - FIFO execution of commands with undo/redo
//
// Every mutating call is turned into a Request and queued on an unbounded
// channel. A single worker task owns the history and drains the queue one
// request at a time, so operations complete in the order they were issued,
// even when a command suspends (e.g. while an image decodes).
//
// The request is queued when the method is called, not when the returned
// future is first polled. Dropping that future does not cancel the request.

use crate::command::factory::{Command, CommandFactory};
use crate::command::kind::CommandKind;
use crate::command::manager::CommandHistory;
use crate::command::outcome::Outcome;
use crate::command::trait_def::{CommandError, CommandResult, StackKind, UndoableCommand};
use crate::config::InvokerConfig;
use crate::graphics::GraphicsState;
use crate::messaging::notification::{self, ListenerId, StackEvent, StackListeners};
use futures_util::FutureExt;
use log::{debug, error, info, warn};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError};
use tokio::sync::{Mutex, mpsc, oneshot};

type Reply<T> = oneshot::Sender<CommandResult<T>>;

enum Request {
    Execute(CommandKind, Reply<Outcome>),
    Undo(Reply<Outcome>),
    Redo(Reply<Outcome>),
    Push(Command, Reply<()>),
    Clear(StackKind, Reply<()>),
}

/// Stack state as of the last completed operation
#[derive(Debug, Clone, Default)]
struct StackSnapshot {
    undo_len: usize,
    redo_len: usize,
    undo_description: Option<String>,
    redo_description: Option<String>,
}

/// State shared between the handles and the worker
#[derive(Default)]
struct Shared {
    snapshot: std::sync::Mutex<StackSnapshot>,
    listeners: std::sync::Mutex<StackListeners>,
}

impl Shared {
    fn snapshot(&self) -> StackSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, StackListeners> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Executes commands against a graphics state and keeps their history
///
/// `Invoker` is a cheap handle: clones share the same worker, history and
/// graphics state. The worker stops once every handle is dropped and the
/// queue is drained.
///
/// Listeners registered with [`Invoker::on_undo_stack_changed`] and
/// [`Invoker::on_redo_stack_changed`] are called on the worker after the
/// stacks changed and before the operation's future resolves.
pub struct Invoker<G: GraphicsState> {
    requests: mpsc::UnboundedSender<Request>,
    graphics: Arc<Mutex<G>>,
    shared: Arc<Shared>,
}

impl<G: GraphicsState> Clone for Invoker<G> {
    fn clone(&self) -> Self {
        Self {
            requests: self.requests.clone(),
            graphics: Arc::clone(&self.graphics),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<G: GraphicsState> Invoker<G> {
    /// Create an invoker with an unbounded history
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime, since it spawns the worker.
    pub fn new(graphics: G) -> Self {
        Self::with_config(graphics, InvokerConfig::default())
    }

    /// Create an invoker with the given configuration
    ///
    /// # Panics
    /// Must be called from within a Tokio runtime, since it spawns the worker.
    pub fn with_config(graphics: G, config: InvokerConfig) -> Self {
        if let Err(err) = config.validate() {
            warn!("{}; keeping at least one command", err);
        }
        let (requests, receiver) = mpsc::unbounded_channel();
        let graphics = Arc::new(Mutex::new(graphics));
        let shared = Arc::new(Shared::default());

        let worker = Worker {
            history: CommandHistory::with_limit(config.max_history),
            graphics: Arc::clone(&graphics),
            shared: Arc::clone(&shared),
            log_commands: config.log_commands,
        };
        tokio::spawn(worker.run(receiver));

        debug!("Invoker started (max_history: {:?})", config.max_history);

        Self {
            requests,
            graphics,
            shared,
        }
    }

    /// Execute a command and push it onto the undo stack
    ///
    /// Invalid arguments are rejected right away and nothing is queued.
    pub fn execute(
        &self,
        kind: CommandKind,
    ) -> impl Future<Output = CommandResult<Outcome>> + Send + 'static {
        let submitted = match kind.validate() {
            Ok(()) => Ok(self.submit(|reply| Request::Execute(kind, reply))),
            Err(err) => {
                warn!("Rejected {}: {}", kind.name(), err);
                Err(err)
            }
        };

        async move { wait(submitted?).await }
    }

    /// Undo the most recent command
    ///
    /// Fails with `EmptyStack(Undo)` when there is nothing to undo.
    pub fn undo(&self) -> impl Future<Output = CommandResult<Outcome>> + Send + 'static {
        wait(self.submit(Request::Undo))
    }

    /// Redo the most recently undone command
    ///
    /// Fails with `EmptyStack(Redo)` when there is nothing to redo.
    pub fn redo(&self) -> impl Future<Output = CommandResult<Outcome>> + Send + 'static {
        wait(self.submit(Request::Redo))
    }

    /// Record a command whose effect is already on the canvas
    ///
    /// The command is not executed. The redo stack is cleared.
    pub fn push_undo_stack(
        &self,
        command: Command,
    ) -> impl Future<Output = CommandResult<()>> + Send + 'static {
        wait(self.submit(|reply| Request::Push(command, reply)))
    }

    pub fn clear_undo_stack(&self) -> impl Future<Output = CommandResult<()>> + Send + 'static {
        wait(self.submit(|reply| Request::Clear(StackKind::Undo, reply)))
    }

    pub fn clear_redo_stack(&self) -> impl Future<Output = CommandResult<()>> + Send + 'static {
        wait(self.submit(|reply| Request::Clear(StackKind::Redo, reply)))
    }

    /// True if no completed operation left anything to undo
    pub fn is_empty_undo_stack(&self) -> bool {
        self.shared.snapshot().undo_len == 0
    }

    /// True if no completed operation left anything to redo
    pub fn is_empty_redo_stack(&self) -> bool {
        self.shared.snapshot().redo_len == 0
    }

    pub fn undo_count(&self) -> usize {
        self.shared.snapshot().undo_len
    }

    pub fn redo_count(&self) -> usize {
        self.shared.snapshot().redo_len
    }

    /// Description of the command the next undo would revert
    pub fn undo_description(&self) -> Option<String> {
        self.shared.snapshot().undo_description
    }

    /// Description of the command the next redo would re-apply
    pub fn redo_description(&self) -> Option<String> {
        self.shared.snapshot().redo_description
    }

    /// The graphics state commands run against
    ///
    /// Holding the lock stalls the queue.
    pub fn graphics(&self) -> Arc<Mutex<G>> {
        Arc::clone(&self.graphics)
    }

    /// Called with the new undo stack length after every change to it
    pub fn on_undo_stack_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.shared
            .listeners()
            .subscribe(StackKind::Undo, Arc::new(listener))
    }

    /// Called with the new redo stack length after every change to it
    pub fn on_redo_stack_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.shared
            .listeners()
            .subscribe(StackKind::Redo, Arc::new(listener))
    }

    /// Returns false if the listener was already removed
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.shared.listeners().unsubscribe(id)
    }

    fn submit<T>(
        &self,
        request: impl FnOnce(Reply<T>) -> Request,
    ) -> oneshot::Receiver<CommandResult<T>> {
        let (reply, receiver) = oneshot::channel();
        // On failure the request, and with it the reply sender, is dropped
        // and the receiver reports the invoker as closed.
        if self.requests.send(request(reply)).is_err() {
            warn!("Invoker worker is gone, request dropped");
        }
        receiver
    }
}

async fn wait<T>(receiver: oneshot::Receiver<CommandResult<T>>) -> CommandResult<T> {
    receiver.await.unwrap_or(Err(CommandError::InvokerClosed))
}

struct Worker<G: GraphicsState> {
    history: CommandHistory,
    graphics: Arc<Mutex<G>>,
    shared: Arc<Shared>,
    log_commands: bool,
}

impl<G: GraphicsState> Worker<G> {
    async fn run(mut self, mut receiver: mpsc::UnboundedReceiver<Request>) {
        while let Some(request) = receiver.recv().await {
            // A panicking command or listener drops only its own request
            if AssertUnwindSafe(self.handle(request))
                .catch_unwind()
                .await
                .is_err()
            {
                error!("Invoker request panicked; continuing with the next one");
                self.publish(&[]);
            }
        }
        debug!("Invoker worker stopped");
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Execute(kind, reply) => {
                let command = CommandFactory::create(kind);
                let description = Some(command.description());
                let result = {
                    let mut graphics = self.graphics.lock().await;
                    self.history.execute(command, &mut *graphics).await
                };
                self.finish("Execute", description, result, reply);
            }
            Request::Undo(reply) => {
                let description = self.history.undo_description();
                let result = {
                    let mut graphics = self.graphics.lock().await;
                    self.history.undo(&mut *graphics).await
                };
                self.finish("Undo", description, result, reply);
            }
            Request::Redo(reply) => {
                let description = self.history.redo_description();
                let result = {
                    let mut graphics = self.graphics.lock().await;
                    self.history.redo(&mut *graphics).await
                };
                self.finish("Redo", description, result, reply);
            }
            Request::Push(command, reply) => {
                if self.log_commands {
                    debug!("Pushed: {}", command.description());
                }
                self.history.push_executed(command);
                self.publish(&[StackKind::Undo, StackKind::Redo]);
                let _ = reply.send(Ok(()));
            }
            Request::Clear(stack, reply) => {
                match stack {
                    StackKind::Undo => self.history.clear_undo(),
                    StackKind::Redo => self.history.clear_redo(),
                }
                info!("{} stack cleared", stack);
                self.publish(&[stack]);
                let _ = reply.send(Ok(()));
            }
        }
    }

    /// Notify on success, then resolve the caller's future
    fn finish(
        &self,
        action: &str,
        description: Option<String>,
        result: CommandResult<Outcome>,
        reply: Reply<Outcome>,
    ) {
        let description = description.unwrap_or_default();
        match &result {
            Ok(_) => {
                if self.log_commands {
                    debug!("{}: {}", action, description);
                }
                self.publish(&[StackKind::Undo, StackKind::Redo]);
            }
            Err(err) if err.is_empty_stack() => debug!("{} ignored: {}", action, err),
            Err(err) => warn!("{} '{}' failed: {}", action, description, err),
        }

        // The caller may have dropped its future; the operation still happened
        let _ = reply.send(result);
    }

    /// Publish the new stack state, then fire one event per changed stack
    fn publish(&self, changed: &[StackKind]) {
        let snapshot = StackSnapshot {
            undo_len: self.history.undo_count(),
            redo_len: self.history.redo_count(),
            undo_description: self.history.undo_description(),
            redo_description: self.history.redo_description(),
        };

        let events: Vec<StackEvent> = changed
            .iter()
            .map(|stack| match stack {
                StackKind::Undo => StackEvent::changed(*stack, snapshot.undo_len),
                StackKind::Redo => StackEvent::changed(*stack, snapshot.redo_len),
            })
            .collect();

        *self
            .shared
            .snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;

        if self.shared.listeners().is_empty() {
            return;
        }
        for event in events {
            let listeners = self.shared.listeners().listeners_for(&event);
            notification::emit(&listeners, event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::kind::{FlipType, RotationType};
    use crate::graphics::{MemoryGraphics, Props, ShapeType};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn add_rect() -> CommandKind {
        CommandKind::AddShape {
            shape_type: ShapeType::Rect,
            options: Props::new(),
        }
    }

    fn record_events(invoker: &Invoker<MemoryGraphics>) -> Arc<StdMutex<Vec<StackEvent>>> {
        let events = Arc::new(StdMutex::new(Vec::new()));

        let undo_events = Arc::clone(&events);
        invoker.on_undo_stack_changed(move |len| {
            undo_events
                .lock()
                .unwrap()
                .push(StackEvent::UndoStackChanged(len))
        });

        let redo_events = Arc::clone(&events);
        invoker.on_redo_stack_changed(move |len| {
            redo_events
                .lock()
                .unwrap()
                .push(StackEvent::RedoStackChanged(len))
        });

        events
    }

    #[tokio::test]
    async fn test_execute_pushes_and_notifies() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let events = record_events(&invoker);

        let outcome = invoker.execute(add_rect()).await.unwrap();
        assert_eq!(outcome.object_id(), Some(1));
        assert!(!invoker.is_empty_undo_stack());
        assert!(invoker.is_empty_redo_stack());
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                StackEvent::UndoStackChanged(1),
                StackEvent::RedoStackChanged(0)
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_parameters_rejected_without_queueing() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let events = record_events(&invoker);

        let result = invoker
            .execute(CommandKind::LoadImage {
                name: String::new(),
                url: "a.png".into(),
            })
            .await;

        assert!(matches!(result, Err(CommandError::InvalidParameters(_))));
        assert!(invoker.is_empty_undo_stack());
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_empty_stack_fires_nothing() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let events = record_events(&invoker);

        assert_eq!(
            invoker.undo().await,
            Err(CommandError::EmptyStack(StackKind::Undo))
        );
        assert_eq!(
            invoker.redo().await,
            Err(CommandError::EmptyStack(StackKind::Redo))
        );
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_redo_notifications() {
        let invoker = Invoker::new(MemoryGraphics::default());
        invoker
            .execute(CommandKind::Flip(FlipType::FlipX))
            .await
            .unwrap();
        let events = record_events(&invoker);

        invoker.undo().await.unwrap();
        assert_eq!(invoker.undo_count(), 0);
        assert_eq!(invoker.redo_count(), 1);
        invoker.redo().await.unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                StackEvent::UndoStackChanged(0),
                StackEvent::RedoStackChanged(1),
                StackEvent::UndoStackChanged(1),
                StackEvent::RedoStackChanged(0),
            ]
        );
    }

    #[tokio::test]
    async fn test_operations_complete_in_call_order() {
        let graphics = MemoryGraphics::default()
            .with_image_source("slow.png", 640, 480)
            .with_load_delay(Duration::from_millis(30));
        let invoker = Invoker::new(graphics);

        // Issued without awaiting: the slow load must still land first
        let load = invoker.execute(CommandKind::LoadImage {
            name: "slow".into(),
            url: "slow.png".into(),
        });
        let rotate = invoker.execute(CommandKind::Rotate(RotationType::Rotate(90.0)));
        let undo = invoker.undo();

        let (load, rotate, undo) = tokio::join!(load, rotate, undo);
        assert!(load.is_ok());
        assert_eq!(rotate.unwrap().angle(), Some(90.0));
        assert_eq!(undo.unwrap().angle(), Some(0.0));

        assert_eq!(invoker.undo_description().as_deref(), Some("Load Image 'slow'"));
        assert_eq!(invoker.redo_description().as_deref(), Some("Rotate by 90°"));
    }

    #[tokio::test]
    async fn test_dropped_future_still_runs() {
        let invoker = Invoker::new(MemoryGraphics::default());

        drop(invoker.execute(add_rect()));
        invoker
            .execute(CommandKind::Flip(FlipType::FlipY))
            .await
            .unwrap();

        assert_eq!(invoker.undo_count(), 2);
        assert_eq!(invoker.graphics().lock().await.object_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_undo_keeps_command_on_top() {
        let invoker = Invoker::new(MemoryGraphics::default());
        invoker.execute(add_rect()).await.unwrap();
        let events = record_events(&invoker);

        // The shape is deleted outside the command path
        invoker.graphics().lock().await.remove_object(1).unwrap();

        let result = invoker.undo().await;
        assert!(matches!(result, Err(CommandError::ExecutionFailed(_))));
        assert_eq!(invoker.undo_count(), 1);
        assert!(invoker.is_empty_redo_stack());
        assert!(events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_undo_stack_does_not_execute() {
        let invoker = Invoker::new(MemoryGraphics::default());
        invoker
            .execute(CommandKind::Flip(FlipType::FlipX))
            .await
            .unwrap();
        invoker.undo().await.unwrap();

        let drawn = {
            let graphics = invoker.graphics();
            let mut graphics = graphics.lock().await;
            let id = graphics
                .add_object(crate::graphics::ObjectKind::Text, Props::new())
                .unwrap();
            graphics.object(id).cloned().unwrap()
        };
        invoker
            .push_undo_stack(Command::add_object(drawn))
            .await
            .unwrap();

        assert_eq!(invoker.undo_count(), 1);
        assert!(invoker.is_empty_redo_stack());

        invoker.undo().await.unwrap();
        assert_eq!(invoker.graphics().lock().await.object_count(), 0);
    }

    #[tokio::test]
    async fn test_clear_one_stack() {
        let invoker = Invoker::new(MemoryGraphics::default());
        invoker.execute(add_rect()).await.unwrap();
        invoker.execute(add_rect()).await.unwrap();
        invoker.undo().await.unwrap();
        let events = record_events(&invoker);

        invoker.clear_redo_stack().await.unwrap();
        assert!(invoker.is_empty_redo_stack());
        assert_eq!(invoker.undo_count(), 1);

        invoker.clear_undo_stack().await.unwrap();
        assert!(invoker.is_empty_undo_stack());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                StackEvent::RedoStackChanged(0),
                StackEvent::UndoStackChanged(0)
            ]
        );
    }

    #[tokio::test]
    async fn test_history_limit_from_config() {
        let config = InvokerConfig::default().with_max_history(2);
        let invoker = Invoker::with_config(MemoryGraphics::default(), config);

        for _ in 0..4 {
            invoker.execute(add_rect()).await.unwrap();
        }
        assert_eq!(invoker.undo_count(), 2);
    }

    #[tokio::test]
    async fn test_removed_listener_is_not_called() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let calls = Arc::new(StdMutex::new(0));

        let counter = Arc::clone(&calls);
        let id = invoker.on_undo_stack_changed(move |_| *counter.lock().unwrap() += 1);
        invoker.execute(add_rect()).await.unwrap();
        assert!(invoker.remove_listener(id));
        invoker.execute(add_rect()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_history() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let other = invoker.clone();

        invoker.execute(add_rect()).await.unwrap();
        assert_eq!(other.undo_count(), 1);
        other.undo().await.unwrap();
        assert!(invoker.is_empty_undo_stack());
    }

    #[tokio::test]
    async fn test_largest_object_id_keeps_worker_alive() {
        let invoker = Invoker::new(MemoryGraphics::default());
        let last = crate::graphics::GraphicsObject::new(
            crate::graphics::ObjectId::MAX,
            crate::graphics::ObjectKind::Text,
        );

        invoker.execute(CommandKind::AddObject(last)).await.unwrap();
        let exhausted = invoker.execute(add_rect()).await;
        assert!(matches!(exhausted, Err(CommandError::ExecutionFailed(_))));

        invoker
            .execute(CommandKind::Flip(FlipType::FlipX))
            .await
            .unwrap();
        assert_eq!(invoker.undo_count(), 2);
    }

    #[tokio::test]
    async fn test_panicking_listener_does_not_stop_worker() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let invoker = Invoker::new(MemoryGraphics::default());
        let armed = AtomicBool::new(true);
        invoker.on_redo_stack_changed(move |_| {
            if armed.swap(false, Ordering::SeqCst) {
                panic!("listener failure");
            }
        });

        let first = invoker.execute(add_rect()).await;
        assert_eq!(first, Err(CommandError::InvokerClosed));
        // The command itself ran before the listener blew up
        assert_eq!(invoker.undo_count(), 1);

        invoker.execute(add_rect()).await.unwrap();
        invoker.undo().await.unwrap();
        assert_eq!(invoker.undo_count(), 1);
        assert_eq!(invoker.redo_count(), 1);
    }

    #[tokio::test]
    async fn test_zero_history_limit_is_clamped() {
        let config = InvokerConfig::default().with_max_history(0);
        let invoker = Invoker::with_config(MemoryGraphics::default(), config);

        invoker.execute(add_rect()).await.unwrap();
        invoker.execute(add_rect()).await.unwrap();
        assert_eq!(invoker.undo_count(), 1);
        invoker.undo().await.unwrap();
        assert_eq!(invoker.graphics().lock().await.object_count(), 1);
    }
}
