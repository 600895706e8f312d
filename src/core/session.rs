//! # Session: one owner lifecycle of the scheduling coordinator.
//!
//! A [`Session`] owns the controller pool, the visibility reactor and the submitter for
//! as long as its owner lives. It is cheap to clone; clones share the same state.
//!
//! ## Architecture
//! ```text
//! SessionBuilder::build()
//!   ├─► Bus
//!   ├─► ControllerPool(factory)
//!   ├─► VisibilityReactor(watch rx) ─► visibility listener (until teardown)
//!   ├─► TaskSubmitter(host, pool, reactor)
//!   └─► subscriber listener: Bus ─► SubscriberSet (until teardown)
//!
//! Session::post_task(task, options) ─► TaskSubmitter::submit
//!
//! Session::teardown()  (also on last drop)
//!   ├─► pool.cancel_all()          abort every controller once
//!   ├─► Bus.publish(SessionClosed)
//!   └─► token.cancel()             listeners stop (visibility unsubscribed)
//! ```
//!
//! ## Example
//! ```rust
//! use priovisor::{PostTaskOptions, Session, SessionConfig, TaskError, TaskFn, TaskPriority};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let session = Session::new(SessionConfig::default());
//!     let task = TaskFn::arc("answer", || async { Ok::<_, TaskError>(42) });
//!
//!     let opts = PostTaskOptions::new().with_priority(TaskPriority::UserVisible);
//!     assert_eq!(session.post_task(task, opts).await, Ok(Some(42)));
//!     assert_eq!(session.controller_count(), 1);
//!
//!     assert_eq!(session.teardown(), 1);
//!     assert_eq!(session.teardown(), 0);
//! }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::core::builder::SessionBuilder;
use crate::core::config::SessionConfig;
use crate::core::options::PostTaskOptions;
use crate::core::pool::ControllerPool;
use crate::core::submitter::TaskSubmitter;
use crate::core::visibility::{VisibilityHandle, VisibilityReactor};
use crate::error::ScheduleError;
use crate::events::{Bus, Event, EventKind};
use crate::priority::TaskPriority;
use crate::tasks::TaskRef;

/// Handle to a scheduling session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

pub(crate) struct SessionInner {
    pub(crate) cfg: SessionConfig,
    pub(crate) bus: Bus,
    pub(crate) pool: Arc<ControllerPool>,
    pub(crate) reactor: Arc<VisibilityReactor>,
    pub(crate) submitter: TaskSubmitter,
    pub(crate) visibility: Option<VisibilityHandle>,
    pub(crate) token: CancellationToken,
    pub(crate) closed: AtomicBool,
}

impl Session {
    /// Returns a builder for a session using `cfg`.
    pub fn builder(cfg: SessionConfig) -> SessionBuilder {
        SessionBuilder::new(cfg)
    }

    /// Creates a session with the default collaborators.
    ///
    /// The host is a [`TokioScheduler`](crate::TokioScheduler), controllers are
    /// [`TokenController`](crate::TokenController)s and visibility is fed through
    /// [`Session::visibility`].
    pub fn new(cfg: SessionConfig) -> Self {
        SessionBuilder::new(cfg).build()
    }

    pub(crate) fn from_inner(inner: SessionInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Submits `task` and waits for its result.
    ///
    /// Returns `Ok(None)` when the task was cancelled by teardown and the submission
    /// does not ask for `throw_on_abort`.
    pub async fn post_task<T: Send + 'static>(
        &self,
        task: TaskRef<T>,
        options: PostTaskOptions,
    ) -> Result<Option<T>, ScheduleError> {
        self.inner.submitter.submit(task, options).await
    }

    /// Session-owned visibility source; `None` when the builder was given an
    /// external receiver.
    pub fn visibility(&self) -> Option<VisibilityHandle> {
        self.inner.visibility.clone()
    }

    /// Applies a pending visibility observation, if any.
    ///
    /// Submissions do this on their own; this is for callers that need the controllers
    /// reprioritized without submitting.
    pub fn sync_visibility(&self) -> bool {
        self.inner.reactor.react(&self.inner.pool)
    }

    /// Subscribes to the session's runtime events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.inner.bus.subscribe()
    }

    /// Aborts every live controller and stops the listeners.
    ///
    /// Returns the number of controllers aborted; repeated calls return 0.
    pub fn teardown(&self) -> usize {
        self.inner.teardown()
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Number of live controllers.
    pub fn controller_count(&self) -> usize {
        self.inner.pool.len()
    }

    /// Whether a live controller exists for `class`.
    pub fn has_controller(&self, class: TaskPriority) -> bool {
        self.inner.pool.contains(class)
    }

    /// `(class, effective priority)` of every live controller, in creation order.
    pub fn effective_priorities(&self) -> Vec<(TaskPriority, TaskPriority)> {
        self.inner.pool.effective_priorities()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.cfg
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("controllers", &self.effective_priorities())
            .field("torn_down", &self.is_torn_down())
            .finish()
    }
}

impl SessionInner {
    fn teardown(&self) -> usize {
        if self.closed.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let aborted = self.pool.cancel_all();
        tracing::debug!(aborted, "session torn down");
        self.bus.publish(Event::new(EventKind::SessionClosed));
        self.token.cancel();
        aborted
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.teardown();
    }
}
