//! # Tokio-backed reference host.
//!
//! [`TokioScheduler`] runs each submission as a Tokio task. It is a reference host for
//! demos and tests, not a priority-ordered executor:
//!
//! ```text
//! post_task(task, options)
//!   ├─ no runtime / bad `delay`   ─► Err(Rejected)            (synchronous)
//!   └─ spawn:
//!        ├─ signal already aborted ─► Err(Aborted)
//!        ├─ sleep(delay)           (cancellable by the signal)
//!        ├─ yield index(priority) times, so lower classes start after higher ones
//!        └─ run task               (dropped if the signal aborts mid-flight)
//! ```

use std::time::Duration;

use tokio::runtime::Handle;
use tokio::{select, time};

use crate::error::HostError;
use crate::host::scheduler::{HostOutcome, HostScheduler, HostTask, HostTaskOptions};

/// Host scheduler spawning onto a Tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    handle: Option<Handle>,
}

impl TokioScheduler {
    /// Uses the runtime current at submission time.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always spawns onto `handle`.
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    fn runtime(&self) -> Option<Handle> {
        self.handle.clone().or_else(|| Handle::try_current().ok())
    }
}

impl HostScheduler for TokioScheduler {
    fn is_available(&self) -> bool {
        self.runtime().is_some()
    }

    fn post_task(&self, task: HostTask, options: HostTaskOptions) -> Result<HostOutcome, HostError> {
        let runtime = self.runtime().ok_or_else(|| HostError::Rejected {
            reason: "no tokio runtime available".to_string(),
        })?;
        let delay = options.delay()?;

        let join = runtime.spawn(run_task(task, options, delay));
        Ok(Box::pin(async move {
            match join.await {
                Ok(res) => res,
                Err(e) => Err(HostError::Failed {
                    reason: e.to_string(),
                }),
            }
        }))
    }
}

async fn run_task(
    task: HostTask,
    options: HostTaskOptions,
    delay: Option<Duration>,
) -> Result<(), HostError> {
    let signal = options.signal.clone();
    let aborted = async {
        match &signal {
            Some(s) => s.aborted().await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(aborted);

    if signal.as_ref().is_some_and(|s| s.is_aborted()) {
        return Err(HostError::aborted());
    }

    if let Some(delay) = delay.filter(|d| !d.is_zero()) {
        select! {
            _ = time::sleep(delay) => {}
            _ = &mut aborted => return Err(HostError::aborted()),
        }
    }

    for _ in 0..options.current_priority().index() {
        select! {
            _ = tokio::task::yield_now() => {}
            _ = &mut aborted => return Err(HostError::aborted()),
        }
    }

    tracing::trace!(task = task.name(), priority = %options.current_priority(), "host.run");
    select! {
        biased;
        _ = &mut aborted => Err(HostError::aborted()),
        _ = task.run() => Ok(()),
    }
}
