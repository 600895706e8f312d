//! # Host scheduler interface.
//!
//! The host is the priority-ordered, cooperative executor that actually runs tasks.
//! priovisor never implements one for real; it only submits work to it.
//!
//! ## Contract
//! ```text
//! post_task(task, options)
//!   ├─ Err(HostError)        submission refused synchronously (misuse, no runtime, ...)
//!   └─ Ok(outcome)           submission accepted
//!         outcome.await
//!           ├─ Ok(())        task ran (its own result travels inside the HostTask)
//!           └─ Err(e)        task was aborted (signal) or the host failed
//! ```
//!
//! - `options.signal` is set for attached submissions; the host must honour its abort and
//!   should follow its live priority.
//! - `options.priority` is set for detached submissions only (one-shot priority).
//! - `options.extra` carries caller options verbatim (e.g. `delay` in milliseconds).

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde_json::Value;

use crate::error::HostError;
use crate::host::signal::TaskSignal;
use crate::priority::TaskPriority;

/// Caller options forwarded to the host without interpretation.
pub type ExtraOptions = serde_json::Map<String, Value>;

/// Future settling a host submission.
pub type HostOutcome = BoxFuture<'static, Result<(), HostError>>;

/// A task as seen by the host: a name plus a lazy future.
///
/// Nothing runs until [`HostTask::run`] is awaited.
pub struct HostTask {
    name: Arc<str>,
    fut: BoxFuture<'static, ()>,
}

impl HostTask {
    /// Wraps a future for submission.
    pub fn new(name: impl Into<Arc<str>>, fut: BoxFuture<'static, ()>) -> Self {
        Self {
            name: name.into(),
            fut,
        }
    }

    /// Task name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the task to completion.
    pub async fn run(self) {
        self.fut.await
    }
}

impl fmt::Debug for HostTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostTask").field("name", &self.name).finish()
    }
}

/// Options accompanying a host submission.
#[derive(Clone, Debug, Default)]
pub struct HostTaskOptions {
    /// Controller signal (attached submissions only).
    pub signal: Option<TaskSignal>,
    /// One-shot priority (detached submissions only).
    pub priority: Option<TaskPriority>,
    /// Passthrough caller options.
    pub extra: ExtraOptions,
}

impl HostTaskOptions {
    /// Key of the scheduling delay passthrough option (milliseconds).
    pub const DELAY: &'static str = "delay";

    /// Priority the task should currently run at.
    ///
    /// Follows the signal when attached; falls back to the one-shot priority, then to
    /// the host default (`UserVisible`, as for the browser scheduling API).
    pub fn current_priority(&self) -> TaskPriority {
        match (&self.signal, self.priority) {
            (Some(signal), _) => signal.priority(),
            (None, Some(p)) => p,
            (None, None) => TaskPriority::UserVisible,
        }
    }

    /// Parses the `delay` passthrough option.
    ///
    /// Returns `Ok(None)` when absent, `Err` when present but not a non-negative number.
    pub fn delay(&self) -> Result<Option<Duration>, HostError> {
        let Some(value) = self.extra.get(Self::DELAY) else {
            return Ok(None);
        };
        match value.as_u64() {
            Some(ms) => Ok(Some(Duration::from_millis(ms))),
            None => match value.as_f64() {
                Some(ms) if ms.is_finite() && ms >= 0.0 => {
                    Ok(Some(Duration::from_secs_f64(ms / 1000.0)))
                }
                _ => Err(HostError::Rejected {
                    reason: format!("`delay` must be a non-negative number, got {value}"),
                }),
            },
        }
    }
}

/// The host scheduling primitive.
pub trait HostScheduler: Send + Sync + 'static {
    /// Whether the host can accept work in the current environment.
    fn is_available(&self) -> bool {
        true
    }

    /// Submits `task`; see the module docs for the contract.
    fn post_task(&self, task: HostTask, options: HostTaskOptions) -> Result<HostOutcome, HostError>;
}
