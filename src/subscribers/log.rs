//! # LogWriter: event renderer
//!
//! A minimal subscriber that renders incoming [`Event`]s through `tracing`.
//! Use it for tests or demos; install a `tracing` subscriber to see the output.
//!
//! ## Example output
//! ```text
//! [controller-created] priority=user-visible effective=background
//! [priority-changed] priority=user-visible effective=user-visible
//! [visibility] visible=true
//! [normalized] task="refresh" fallback=user-blocking reason="invalid priority: ..."
//! [aborted] priority=user-visible
//! [session-closed]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::priority::TaskPriority;
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn p(priority: Option<TaskPriority>) -> &'static str {
    priority.map_or("-", TaskPriority::as_str)
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match e.kind {
            EventKind::ControllerCreated => {
                tracing::info!(
                    "[controller-created] priority={} effective={}",
                    p(e.priority),
                    p(e.effective)
                );
            }
            EventKind::PriorityChanged => {
                tracing::info!(
                    "[priority-changed] priority={} effective={}",
                    p(e.priority),
                    p(e.effective)
                );
            }
            EventKind::ControllerAborted => {
                tracing::info!("[aborted] priority={}", p(e.priority));
            }
            EventKind::VisibilityChanged => {
                tracing::info!("[visibility] visible={:?}", e.visible);
            }
            EventKind::SessionClosed => {
                tracing::info!("[session-closed]");
            }
            EventKind::TaskSubmitted => {
                tracing::debug!(
                    "[submitted] task={:?} priority={} detached={:?}",
                    e.task,
                    p(e.priority),
                    e.detached
                );
            }
            EventKind::PriorityNormalized => {
                tracing::warn!(
                    "[normalized] task={:?} fallback={} reason={:?}",
                    e.task,
                    p(e.priority),
                    e.reason
                );
            }
            EventKind::AbortSuppressed => {
                tracing::debug!("[abort-suppressed] task={:?} reason={:?}", e.task, e.reason);
            }
            EventKind::SchedulingFailed => {
                tracing::error!("[scheduling-failed] task={:?} err={:?}", e.task, e.reason);
            }
            EventKind::SubscriberOverflow => {
                tracing::warn!(
                    "[subscriber-overflow] subscriber={:?} reason={:?}",
                    e.task,
                    e.reason
                );
            }
            EventKind::SubscriberPanicked => {
                tracing::error!(
                    "[subscriber-panicked] subscriber={} info={}",
                    e.task.as_deref().unwrap_or("unknown"),
                    e.reason.as_deref().unwrap_or("unknown"),
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
