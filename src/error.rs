//! Error types used by the priovisor runtime, host schedulers and tasks.
//!
//! This module defines:
//!
//! - [`TaskError`]: errors raised by individual task executions.
//! - [`HostError`]: errors reported by a [`HostScheduler`](crate::HostScheduler).
//! - [`ScheduleError`]: what [`Session::post_task`](crate::Session::post_task) surfaces.
//! - [`InvalidPriority`]: a priority name outside the fixed set (recovered, never surfaced).
//!
//! The enums provide `as_label` (stable snake_case labels for logs/metrics) and `as_message`.

use std::sync::Arc;

use thiserror::Error;

/// # Errors produced by task execution.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task observed cancellation and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use priovisor::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }
}

/// # Errors reported by a host scheduler.
///
/// Returned synchronously from [`HostScheduler::post_task`](crate::HostScheduler::post_task)
/// when the submission itself is refused, or from the outcome future once the
/// submission settles.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The task's signal was aborted before or while it ran.
    #[error("aborted: {reason}")]
    Aborted {
        /// Cancellation cause.
        reason: Arc<str>,
    },

    /// The host refused the submission (bad options, no runtime, ...).
    #[error("submission rejected: {reason}")]
    Rejected {
        /// Why the host refused.
        reason: String,
    },

    /// The host failed while running the task.
    #[error("host failure: {reason}")]
    Failed {
        /// The underlying error message.
        reason: String,
    },
}

impl HostError {
    /// Abort with the default cause.
    pub fn aborted() -> Self {
        HostError::Aborted {
            reason: Arc::from("signal is aborted without reason"),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            HostError::Aborted { .. } => "host_aborted",
            HostError::Rejected { .. } => "host_rejected",
            HostError::Failed { .. } => "host_failed",
        }
    }
}

/// # Errors surfaced by `post_task`.
///
/// Invalid priorities, a missing host and unexpected scheduling failures are
/// recovered internally and never show up here.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// The task ran and failed.
    #[error(transparent)]
    Task(#[from] TaskError),

    /// The task's controller was aborted and the caller asked for `throw_on_abort`.
    #[error("task aborted: {reason}")]
    Aborted {
        /// Cancellation cause.
        reason: Arc<str>,
    },

    /// The host failed for a reason other than cancellation.
    #[error(transparent)]
    Host(HostError),

    /// The host settled the submission without ever running the task.
    #[error("task `{task}` was dropped by the host without running")]
    Dropped {
        /// Name of the dropped task.
        task: String,
    },
}

impl ScheduleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use priovisor::{ScheduleError, TaskError};
    ///
    /// let err = ScheduleError::from(TaskError::Canceled);
    /// assert_eq!(err.as_label(), "task_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ScheduleError::Task(e) => e.as_label(),
            ScheduleError::Aborted { .. } => "schedule_aborted",
            ScheduleError::Host(e) => e.as_label(),
            ScheduleError::Dropped { .. } => "schedule_dropped",
        }
    }

    /// Returns `true` if the error reports a cancellation.
    pub fn is_abort(&self) -> bool {
        matches!(
            self,
            ScheduleError::Aborted { .. } | ScheduleError::Task(TaskError::Canceled)
        )
    }
}

/// A priority name outside the fixed set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid priority: {value}. 'priority' must be one of [{allowed}]")]
pub struct InvalidPriority {
    value: String,
    allowed: &'static str,
}

impl InvalidPriority {
    pub(crate) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            allowed: ALLOWED,
        }
    }

    /// The rejected value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

const ALLOWED: &str = "user-blocking,user-visible,background";
