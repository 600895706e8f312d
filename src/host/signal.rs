//! # Task controllers and signals.
//!
//! A controller combines a live priority value with a cancellation token. Tasks bound to
//! a controller carry its [`TaskSignal`]; the host reads the signal to learn the current
//! priority of the task and whether it was aborted.
//!
//! ```text
//! ControllerFactory::create(initial)
//!        └─► TaskController ──signal()──► TaskSignal { token, priority }
//!               ├─ set_priority(p)  ─► every clone of the signal observes p
//!               └─ abort()          ─► every clone of the signal is aborted
//! ```
//!
//! [`TokenController`] is the default implementation, backed by
//! [`CancellationToken`] and a `tokio::sync::watch` priority cell.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::priority::TaskPriority;

/// Read side of a controller, handed to the host with every attached submission.
#[derive(Clone)]
pub struct TaskSignal {
    token: CancellationToken,
    priority: watch::Receiver<TaskPriority>,
}

impl TaskSignal {
    /// Creates a signal from its parts.
    pub fn new(token: CancellationToken, priority: watch::Receiver<TaskPriority>) -> Self {
        Self { token, priority }
    }

    /// Current effective priority.
    pub fn priority(&self) -> TaskPriority {
        *self.priority.borrow()
    }

    /// Returns `true` once the controller was aborted.
    pub fn is_aborted(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the controller is aborted.
    pub async fn aborted(&self) {
        self.token.cancelled().await;
    }

    /// Resolves with the new priority on the next change.
    ///
    /// Returns `None` once the controller is gone.
    pub async fn priority_changed(&mut self) -> Option<TaskPriority> {
        self.priority.changed().await.ok()?;
        Some(*self.priority.borrow_and_update())
    }

    /// Underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl fmt::Debug for TaskSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskSignal")
            .field("priority", &self.priority())
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

/// Per-class priority and cancellation handle.
pub trait TaskController: Send + Sync + 'static {
    /// Signal bound to the tasks submitted through this controller.
    fn signal(&self) -> TaskSignal;

    /// Changes the effective priority of every bound task, pending ones included.
    fn set_priority(&self, priority: TaskPriority);

    /// Aborts every bound task.
    fn abort(&self);
}

/// Creates controllers for a session.
pub trait ControllerFactory: Send + Sync + 'static {
    /// Creates a controller starting at `initial`.
    fn create(&self, initial: TaskPriority) -> Arc<dyn TaskController>;
}

/// Default controller built on [`CancellationToken`].
#[derive(Debug)]
pub struct TokenController {
    token: CancellationToken,
    priority: watch::Sender<TaskPriority>,
}

impl TokenController {
    /// Creates a controller starting at `initial`.
    pub fn new(initial: TaskPriority) -> Self {
        Self::with_token(initial, CancellationToken::new())
    }

    /// Creates a controller whose token is `token` (e.g. a child of a wider token).
    pub fn with_token(initial: TaskPriority, token: CancellationToken) -> Self {
        let (priority, _rx) = watch::channel(initial);
        Self { token, priority }
    }
}

impl TaskController for TokenController {
    fn signal(&self) -> TaskSignal {
        TaskSignal::new(self.token.clone(), self.priority.subscribe())
    }

    fn set_priority(&self, priority: TaskPriority) {
        self.priority.send_replace(priority);
    }

    fn abort(&self) {
        self.token.cancel();
    }
}

/// Factory producing [`TokenController`]s.
#[derive(Debug, Default, Clone)]
pub struct TokenControllerFactory {
    parent: Option<CancellationToken>,
}

impl TokenControllerFactory {
    /// Creates a factory producing independent controllers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory whose controllers are also aborted when `parent` is cancelled.
    pub fn with_parent(parent: CancellationToken) -> Self {
        Self {
            parent: Some(parent),
        }
    }
}

impl ControllerFactory for TokenControllerFactory {
    fn create(&self, initial: TaskPriority) -> Arc<dyn TaskController> {
        let token = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        Arc::new(TokenController::with_token(initial, token))
    }
}
