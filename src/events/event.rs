//! # Runtime events emitted by sessions.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Controller events**: creation, re-prioritization and abort of per-class controllers
//! - **Submission events**: normalization, suppression and fallback while posting tasks
//! - **Subscriber events**: overflow and panic reports from the subscriber fan-out
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! priorities and reasons.
//!
//! ## Ordering
//! `seq` is drawn from one process-wide counter, so sorting by `seq` recovers
//! publication order across sessions and subscribers.
//!
//! ## Example
//! ```rust
//! use priovisor::{Event, EventKind, TaskPriority};
//!
//! let ev = Event::new(EventKind::PriorityChanged)
//!     .with_priority(TaskPriority::UserVisible)
//!     .with_effective(TaskPriority::Background);
//!
//! assert_eq!(ev.kind, EventKind::PriorityChanged);
//! assert_eq!(ev.effective, Some(TaskPriority::Background));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::priority::TaskPriority;

/// Process-wide event counter.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// A subscriber's `on_event` panicked.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic payload text
    SubscriberPanicked,

    /// An event could not be queued for a subscriber.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: `subscriber=<name> reason=full|closed`
    SubscriberOverflow,

    // === Controller events ===
    /// A controller was created for a priority class.
    ///
    /// Sets:
    /// - `priority`: class the controller belongs to
    /// - `effective`: initial effective priority
    ControllerCreated,

    /// A live controller received a new effective priority.
    ///
    /// Sets:
    /// - `priority`: class the controller belongs to
    /// - `effective`: new effective priority
    PriorityChanged,

    /// A controller was aborted at session teardown.
    ///
    /// Sets:
    /// - `priority`: class the controller belongs to
    ControllerAborted,

    /// A visibility observation was applied to the live controllers.
    ///
    /// Sets:
    /// - `visible`: observed visibility
    VisibilityChanged,

    /// The session was torn down.
    SessionClosed,

    // === Submission events ===
    /// A task was handed to the host scheduler.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `priority`: normalized priority
    /// - `detached`: whether the submission carries no controller
    TaskSubmitted,

    /// An invalid requested priority was replaced by the session default.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `priority`: the fallback used
    /// - `reason`: validation message naming the rejected value
    PriorityNormalized,

    /// A failure caused by an aborted controller was swallowed.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: cancellation cause
    AbortSuppressed,

    /// Scheduling failed unexpectedly; the task was run directly instead.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure message
    SchedulingFailed,
}

/// A session event.
///
/// Only `seq`, `at` and `kind` are always present; each [`EventKind`] documents which
/// of the optional fields it fills.
#[derive(Clone, Debug)]
pub struct Event {
    /// Position in the process-wide event order.
    pub seq: u64,
    /// When the event was created.
    pub at: SystemTime,
    /// Kind of event.
    pub kind: EventKind,

    /// Name of the task (or subscriber), if applicable.
    pub task: Option<Arc<str>>,
    /// Priority class the event refers to.
    pub priority: Option<TaskPriority>,
    /// Effective priority after the event.
    pub effective: Option<TaskPriority>,
    /// Observed visibility.
    pub visible: Option<bool>,
    /// Whether the submission was detached.
    pub detached: Option<bool>,
    /// Free-form detail: validation message, abort cause, panic text.
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates an event stamped with the next `seq` and the current time.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            priority: None,
            effective: None,
            visible: None,
            detached: None,
            reason: None,
        }
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches the priority class.
    #[inline]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Attaches the effective priority.
    #[inline]
    pub fn with_effective(mut self, effective: TaskPriority) -> Self {
        self.effective = Some(effective);
        self
    }

    /// Attaches the observed visibility.
    #[inline]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    /// Marks whether the submission was detached.
    #[inline]
    pub fn with_detached(mut self, detached: bool) -> Self {
        self.detached = Some(detached);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }
}
