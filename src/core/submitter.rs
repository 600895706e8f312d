//! # Task submission.
//!
//! [`TaskSubmitter`] implements `post_task`:
//!
//! ```text
//! submit(task, options)
//!   ├─ no host / host unavailable ──────────────► run task directly
//!   ├─ guarded (collaborator panics caught):
//!   │    ├─ drain pending visibility observation
//!   │    ├─ normalize priority (invalid → default, warn)
//!   │    ├─ attached: reactor.resolve(pool, class)
//!   │    │     └─ pool closed ──────────────────► settle as aborted
//!   │    └─ host.post_task(HostTask, HostTaskOptions)
//!   │          └─ Err / panic ──────────────────► error!, SchedulingFailed, run directly
//!   └─ settle:
//!        outcome.await + task result
//!          ├─ Ok(v)                              → Ok(Some(v))
//!          ├─ Err while signal aborted           → Ok(None) | Err(Aborted) if throw_on_abort
//!          └─ Err otherwise                      → propagated
//! ```
//!
//! Everything before `settle` runs synchronously within the first poll.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::core::options::PostTaskOptions;
use crate::core::pool::ControllerPool;
use crate::core::visibility::VisibilityReactor;
use crate::error::{HostError, ScheduleError, TaskError};
use crate::events::{Bus, Event, EventKind};
use crate::host::{HostOutcome, HostScheduler, HostTask, HostTaskOptions, TaskSignal};
use crate::priority::{self, PriorityRequest, TaskPriority};
use crate::subscribers::panic_message;
use crate::tasks::TaskRef;

const TORN_DOWN: &str = "session is torn down";

/// Accepted host submission awaiting its outcome.
struct Submitted<T> {
    outcome: HostOutcome,
    result: oneshot::Receiver<Result<T, TaskError>>,
    signal: Option<TaskSignal>,
}

enum Prepared<T> {
    Submitted(Submitted<T>),
    /// The pool is closed; no controller can be bound.
    Closed,
}

pub(crate) struct TaskSubmitter {
    host: Option<Arc<dyn HostScheduler>>,
    pool: Arc<ControllerPool>,
    reactor: Arc<VisibilityReactor>,
    bus: Bus,
    default_priority: TaskPriority,
}

impl TaskSubmitter {
    pub fn new(
        host: Option<Arc<dyn HostScheduler>>,
        pool: Arc<ControllerPool>,
        reactor: Arc<VisibilityReactor>,
        bus: Bus,
        default_priority: TaskPriority,
    ) -> Self {
        Self {
            host,
            pool,
            reactor,
            bus,
            default_priority,
        }
    }

    pub async fn submit<T: Send + 'static>(
        &self,
        task: TaskRef<T>,
        options: PostTaskOptions,
    ) -> Result<Option<T>, ScheduleError> {
        let Some(host) = self.host.as_ref().filter(|h| h.is_available()) else {
            tracing::trace!(task = task.name(), "no host scheduler; running task directly");
            return run_direct(&task).await;
        };

        let prepared = catch_unwind(AssertUnwindSafe(|| {
            self.reactor.react(&self.pool);
            let priority = self.normalize(task.name(), options.priority.as_ref());
            self.prepare(host.as_ref(), &task, priority, &options)
        }));
        let reason = match prepared {
            Ok(Ok(Prepared::Submitted(submitted))) => {
                return self
                    .settle(task.name(), submitted, options.throw_on_abort)
                    .await;
            }
            Ok(Ok(Prepared::Closed)) => {
                return self.aborted(task.name(), Arc::from(TORN_DOWN), options.throw_on_abort);
            }
            Ok(Err(err)) => err.to_string(),
            Err(panic) => panic_message(&*panic),
        };

        tracing::error!(task = task.name(), %reason, "scheduling failed; running task directly");
        self.bus.publish(
            Event::new(EventKind::SchedulingFailed)
                .with_task(task.name())
                .with_reason(reason),
        );
        run_direct(&task).await
    }

    fn normalize(&self, task: &str, requested: Option<&PriorityRequest>) -> TaskPriority {
        let Some(requested) = requested else {
            return self.default_priority;
        };
        let priority = priority::normalize(requested, self.default_priority);
        if let Err(err) = requested.resolve() {
            self.bus.publish(
                Event::new(EventKind::PriorityNormalized)
                    .with_task(task)
                    .with_priority(priority)
                    .with_reason(err.to_string()),
            );
        }
        priority
    }

    /// Binds the controller and hands the task to the host.
    fn prepare<T: Send + 'static>(
        &self,
        host: &dyn HostScheduler,
        task: &TaskRef<T>,
        priority: TaskPriority,
        options: &PostTaskOptions,
    ) -> Result<Prepared<T>, HostError> {
        let signal = if options.detached {
            None
        } else {
            match self.reactor.resolve(&self.pool, priority) {
                Some(controller) => Some(controller.signal()),
                None => return Ok(Prepared::Closed),
            }
        };

        let (tx, result) = oneshot::channel();
        let job = Arc::clone(task);
        let host_task = HostTask::new(
            task.name(),
            Box::pin(async move {
                let _ = tx.send(job.spawn().await);
            }),
        );
        let host_options = HostTaskOptions {
            signal: signal.clone(),
            priority: options.detached.then_some(priority),
            extra: options.extra.clone(),
        };

        let outcome = host.post_task(host_task, host_options)?;
        tracing::trace!(task = task.name(), priority = %priority, detached = options.detached, "task submitted");
        self.bus.publish(
            Event::new(EventKind::TaskSubmitted)
                .with_task(task.name())
                .with_priority(priority)
                .with_detached(options.detached),
        );
        Ok(Prepared::Submitted(Submitted {
            outcome,
            result,
            signal,
        }))
    }

    async fn settle<T>(
        &self,
        name: &str,
        submitted: Submitted<T>,
        throw_on_abort: bool,
    ) -> Result<Option<T>, ScheduleError> {
        let Submitted {
            outcome,
            result,
            signal,
        } = submitted;

        let settled = match outcome.await {
            Ok(()) => match result.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(ScheduleError::Task(err)),
                Err(_) => Err(ScheduleError::Dropped {
                    task: name.to_string(),
                }),
            },
            Err(err) => Err(ScheduleError::Host(err)),
        };

        match settled {
            Ok(value) => Ok(Some(value)),
            Err(err) if signal.as_ref().is_some_and(TaskSignal::is_aborted) => {
                let reason = match err {
                    ScheduleError::Host(HostError::Aborted { reason }) => reason,
                    other => Arc::from(other.to_string()),
                };
                self.aborted(name, reason, throw_on_abort)
            }
            Err(err) => Err(err),
        }
    }

    fn aborted<T>(
        &self,
        name: &str,
        reason: Arc<str>,
        throw_on_abort: bool,
    ) -> Result<Option<T>, ScheduleError> {
        if throw_on_abort {
            return Err(ScheduleError::Aborted { reason });
        }
        tracing::trace!(task = name, %reason, "abort suppressed");
        self.bus.publish(
            Event::new(EventKind::AbortSuppressed)
                .with_task(name)
                .with_reason(reason),
        );
        Ok(None)
    }
}

async fn run_direct<T: Send + 'static>(task: &TaskRef<T>) -> Result<Option<T>, ScheduleError> {
    task.spawn().await.map(Some).map_err(ScheduleError::from)
}
