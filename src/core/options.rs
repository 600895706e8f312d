use std::time::Duration;

use serde_json::Value;

use crate::host::{ExtraOptions, HostTaskOptions};
use crate::priority::PriorityRequest;

/// Options of a single [`Session::post_task`](crate::Session::post_task) call.
///
/// ## Field semantics
/// - `priority`: requested class; `None` uses the session default
/// - `detached`: submit with a one-shot priority and no controller, so the task ignores
///   visibility changes and session teardown
/// - `throw_on_abort`: surface [`ScheduleError::Aborted`](crate::ScheduleError::Aborted)
///   instead of resolving with no value when the controller was aborted
/// - `extra`: forwarded to the host verbatim
///
/// ```
/// use std::time::Duration;
/// use priovisor::{PostTaskOptions, TaskPriority};
///
/// let opts = PostTaskOptions::new()
///     .with_priority(TaskPriority::Background)
///     .with_delay(Duration::from_millis(250))
///     .throw_on_abort();
///
/// assert!(!opts.detached);
/// assert!(opts.throw_on_abort);
/// assert_eq!(opts.extra["delay"], 250);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PostTaskOptions {
    pub priority: Option<PriorityRequest>,
    pub detached: bool,
    pub throw_on_abort: bool,
    pub extra: ExtraOptions,
}

impl PostTaskOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_priority(mut self, priority: impl Into<PriorityRequest>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn detached(mut self) -> Self {
        self.detached = true;
        self
    }

    pub fn throw_on_abort(mut self) -> Self {
        self.throw_on_abort = true;
        self
    }

    /// Sets the `delay` passthrough option, in whole milliseconds.
    pub fn with_delay(self, delay: Duration) -> Self {
        let ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.with_extra(HostTaskOptions::DELAY, ms)
    }

    /// Adds an arbitrary passthrough option.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}
