//! # Task abstractions.
//!
//! This module provides the task-related types:
//! - [`Task`] - trait for a named unit of work producing a value
//! - [`TaskFn`] - closure-backed task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task<Output = T>>`)

mod task;
mod task_fn;

pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
