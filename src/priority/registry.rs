//! Validation and normalization of requested priorities.

use super::{PriorityRequest, TaskPriority};

/// Returns `true` iff `value` names one of the fixed priority classes.
///
/// # Example
/// ```
/// assert!(priovisor::priority::is_valid("user-visible"));
/// assert!(!priovisor::priority::is_valid("not-a-priority"));
/// ```
pub fn is_valid(value: &str) -> bool {
    TaskPriority::ALL.iter().any(|p| p.as_str() == value)
}

/// Returns the requested class, or `fallback` when the request names no known class.
///
/// An invalid request is not an error: a warning naming the rejected value and the
/// allowed set is emitted and the fallback is used instead.
pub fn normalize(requested: &PriorityRequest, fallback: TaskPriority) -> TaskPriority {
    match requested.resolve() {
        Ok(p) => p,
        Err(err) => {
            tracing::warn!(
                requested = err.value(),
                allowed = ?TaskPriority::ALL.map(TaskPriority::as_str),
                fallback = %fallback,
                "{err}; {fallback} will be used"
            );
            fallback
        }
    }
}
