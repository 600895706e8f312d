#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use priovisor::{
    ControllerFactory, ExtraOptions, HostError, HostOutcome, HostScheduler, HostTask,
    HostTaskOptions, TaskController, TaskPriority, TaskSignal, TokenController,
};

/// One submission as seen by [`RecordingHost`].
#[derive(Debug, Clone)]
pub struct Submission {
    pub task: String,
    pub signal: Option<TaskSignal>,
    /// Priority of the bound signal when the host received the task.
    pub signal_priority: Option<TaskPriority>,
    pub priority: Option<TaskPriority>,
    pub extra: ExtraOptions,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostMode {
    /// Run every task when its outcome is awaited.
    #[default]
    Run,
    /// Attached tasks never run; their outcome fails once the signal aborts.
    /// Detached tasks run as in `Run`.
    HoldUntilAborted,
    /// Refuse every submission synchronously.
    Reject,
}

/// Host scheduler recording every submission.
#[derive(Default)]
pub struct RecordingHost {
    mode: HostMode,
    submissions: Mutex<Vec<Submission>>,
}

impl RecordingHost {
    pub fn new(mode: HostMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            submissions: Mutex::new(Vec::new()),
        })
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

impl HostScheduler for RecordingHost {
    fn post_task(&self, task: HostTask, options: HostTaskOptions) -> Result<HostOutcome, HostError> {
        self.submissions.lock().unwrap().push(Submission {
            task: task.name().to_string(),
            signal: options.signal.clone(),
            signal_priority: options.signal.as_ref().map(TaskSignal::priority),
            priority: options.priority,
            extra: options.extra.clone(),
        });

        match (self.mode, options.signal) {
            (HostMode::Reject, _) => Err(HostError::Rejected {
                reason: "host refused".to_string(),
            }),
            (HostMode::HoldUntilAborted, Some(signal)) => Ok(Box::pin(async move {
                signal.aborted().await;
                drop(task);
                Err(HostError::aborted())
            })),
            _ => Ok(Box::pin(async move {
                task.run().await;
                Ok(())
            })),
        }
    }
}

/// Host that exists but reports itself unavailable.
pub struct UnavailableHost;

impl HostScheduler for UnavailableHost {
    fn is_available(&self) -> bool {
        false
    }

    fn post_task(&self, _task: HostTask, _options: HostTaskOptions) -> Result<HostOutcome, HostError> {
        panic!("unavailable host received a submission");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCall {
    Create(TaskPriority),
    SetPriority(TaskPriority),
    /// Carries the effective priority at abort time.
    Abort(TaskPriority),
}

/// Controller factory recording every controller call in order.
#[derive(Default)]
pub struct RecordingFactory {
    calls: Arc<Mutex<Vec<ControllerCall>>>,
}

impl RecordingFactory {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<ControllerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn created(&self) -> Vec<TaskPriority> {
        self.filter(|c| match c {
            ControllerCall::Create(p) => Some(p),
            _ => None,
        })
    }

    pub fn set_priorities(&self) -> Vec<TaskPriority> {
        self.filter(|c| match c {
            ControllerCall::SetPriority(p) => Some(p),
            _ => None,
        })
    }

    pub fn aborts(&self) -> Vec<TaskPriority> {
        self.filter(|c| match c {
            ControllerCall::Abort(p) => Some(p),
            _ => None,
        })
    }

    fn filter(&self, f: impl Fn(ControllerCall) -> Option<TaskPriority>) -> Vec<TaskPriority> {
        self.calls().into_iter().filter_map(f).collect()
    }
}

struct RecordingController {
    inner: TokenController,
    calls: Arc<Mutex<Vec<ControllerCall>>>,
}

impl TaskController for RecordingController {
    fn signal(&self) -> TaskSignal {
        self.inner.signal()
    }

    fn set_priority(&self, priority: TaskPriority) {
        self.calls
            .lock()
            .unwrap()
            .push(ControllerCall::SetPriority(priority));
        self.inner.set_priority(priority);
    }

    fn abort(&self) {
        let current = self.inner.signal().priority();
        self.calls.lock().unwrap().push(ControllerCall::Abort(current));
        self.inner.abort();
    }
}

impl ControllerFactory for RecordingFactory {
    fn create(&self, initial: TaskPriority) -> Arc<dyn TaskController> {
        self.calls.lock().unwrap().push(ControllerCall::Create(initial));
        Arc::new(RecordingController {
            inner: TokenController::new(initial),
            calls: Arc::clone(&self.calls),
        })
    }
}

/// Factory that panics on every call.
pub struct PanickingFactory;

impl ControllerFactory for PanickingFactory {
    fn create(&self, _initial: TaskPriority) -> Arc<dyn TaskController> {
        panic!("factory exploded");
    }
}

/// Factory whose controllers panic when reprioritized.
pub struct PanickingPriorityFactory;

struct PanickingPriorityController(TokenController);

impl TaskController for PanickingPriorityController {
    fn signal(&self) -> TaskSignal {
        self.0.signal()
    }

    fn set_priority(&self, _priority: TaskPriority) {
        panic!("set_priority exploded");
    }

    fn abort(&self) {
        self.0.abort();
    }
}

impl ControllerFactory for PanickingPriorityFactory {
    fn create(&self, initial: TaskPriority) -> Arc<dyn TaskController> {
        Arc::new(PanickingPriorityController(TokenController::new(initial)))
    }
}
