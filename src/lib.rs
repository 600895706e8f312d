//! # priovisor
//!
//! **Priovisor** is a visibility-aware priority coordinator for cooperative task schedulers.
//!
//! It accepts units of work tagged with a priority class, hands them to a host scheduler
//! bound to a per-class controller, and re-prioritizes outstanding and future work when
//! the owner of the session is hidden or shown again. Teardown aborts every controller
//! exactly once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  post_task   │   │  post_task   │   │  post_task   │
//!     │ (user-block) │   │ (background) │   │  (detached)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Session (one owner lifecycle)                                    │
//! │  - TaskSubmitter (normalize, bind, submit, fall back)             │
//! │  - ControllerPool (one TaskController per TaskPriority)           │
//! │  - VisibilityReactor (hidden → background, visible → own class)   │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        │ signal(UB)       │ signal(BG)       │ priority(BG)  │
//!        ▼                  ▼                  ▼               │
//! ┌───────────────────────────────────────────────────┐        │
//! │  HostScheduler::post_task(HostTask, options)      │        │
//! │  (TokioScheduler, or an injected host)            │        │
//! └───────────────────────────────────────────────────┘        │
//!                                                              ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │               (capacity: SessionConfig::bus_capacity)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │  subscriber_listener   │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                          ┌─────────┼─────────┐
//!                          ▼         ▼         ▼
//!                      sub1.on   sub2.on   subN.on
//!                      _event()  _event()  _event()
//! ```
//!
//! ### Submission
//! ```text
//! post_task(task, options)
//!   ├─► no host / unavailable      ─► run task directly
//!   ├─► normalize priority         (invalid → default + warning)
//!   ├─► resolve controller         (unless detached; starts demoted when hidden)
//!   ├─► host.post_task(...)        Err / panic ─► SchedulingFailed, run directly
//!   └─► await outcome
//!         ├─ Ok(v)                 ─► Ok(Some(v))
//!         ├─ aborted binding       ─► Ok(None) | Err(Aborted) with throw_on_abort
//!         └─ other failure         ─► Err(..)
//! ```
//!
//! ## Features
//! | Area              | Description                                                       | Key types / traits                         |
//! |-------------------|-------------------------------------------------------------------|--------------------------------------------|
//! | **Session**       | Owner lifecycle, submission, teardown.                            | [`Session`], [`SessionBuilder`]            |
//! | **Priorities**    | Fixed priority classes, validation and normalization.             | [`TaskPriority`], [`PriorityRequest`]      |
//! | **Visibility**    | Demote when hidden, restore when visible.                         | [`Visibility`], [`VisibilityHandle`]       |
//! | **Host**          | Pluggable scheduling primitive and controllers.                   | [`HostScheduler`], [`ControllerFactory`]   |
//! | **Subscriber API**| Hook into controller and submission events.                       | [`Subscribe`]                              |
//! | **Errors**        | Typed errors for tasks, hosts and submissions.                    | [`TaskError`], [`ScheduleError`]           |
//! | **Configuration** | Centralize session settings.                                      | [`SessionConfig`], [`PostTaskOptions`]     |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use priovisor::{PostTaskOptions, Session, SessionConfig, TaskError, TaskFn, TaskPriority};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn priovisor::Subscribe>> = vec![Arc::new(priovisor::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn priovisor::Subscribe>> = Vec::new();
//!
//!     let session = Session::builder(SessionConfig::default())
//!         .with_subscribers(subs)
//!         .build();
//!     let visibility = session.visibility().expect("session-owned visibility");
//!
//!     let render = TaskFn::arc("render", || async { Ok::<_, TaskError>("frame") });
//!     let frame = session
//!         .post_task(render.clone(), PostTaskOptions::new().with_priority(TaskPriority::UserVisible))
//!         .await?;
//!     assert_eq!(frame, Some("frame"));
//!
//!     // Hidden: every live controller runs at `background`.
//!     visibility.observe(false);
//!     assert_eq!(
//!         session.effective_priorities(),
//!         vec![(TaskPriority::UserVisible, TaskPriority::Background)]
//!     );
//!
//!     session.teardown();
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod host;
pub mod priority;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use crate::core::{PostTaskOptions, Session, SessionBuilder, SessionConfig, Visibility, VisibilityHandle};
pub use error::{HostError, InvalidPriority, ScheduleError, TaskError};
pub use events::{Event, EventKind};
pub use host::{
    ControllerFactory, ExtraOptions, HostOutcome, HostScheduler, HostTask, HostTaskOptions,
    TaskController, TaskSignal, TokenController, TokenControllerFactory, TokioScheduler,
};
pub use priority::{PriorityRequest, TaskPriority};
pub use subscribers::Subscribe;
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
