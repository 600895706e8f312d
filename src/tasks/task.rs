//! # Task abstraction.
//!
//! A [`Task`] is a named, re-runnable unit of work. Each call to [`Task::spawn`]
//! produces a fresh future; nothing runs until that future is polled, so a task
//! handed to a host scheduler only starts when the host decides to run it.
//!
//! Tasks are shared as [`TaskRef`] so that the submitter can keep a handle and
//! still run the task directly when the host refuses the submission.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TaskError;

/// Boxed future returned by [`Task::spawn`].
pub type BoxTaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, TaskError>> + Send + 'static>>;

/// Shared handle to a task producing `T`.
pub type TaskRef<T> = Arc<dyn Task<Output = T>>;

/// # Named unit of work.
///
/// # Example
/// ```
/// use priovisor::{BoxTaskFuture, Task, TaskError};
///
/// struct Answer;
///
/// impl Task for Answer {
///     type Output = u32;
///
///     fn name(&self) -> &str { "answer" }
///
///     fn spawn(&self) -> BoxTaskFuture<u32> {
///         Box::pin(async { Ok::<_, TaskError>(42) })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Value produced on success.
    type Output: Send + 'static;

    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Creates a new future for one execution of the task.
    fn spawn(&self) -> BoxTaskFuture<Self::Output>;
}
