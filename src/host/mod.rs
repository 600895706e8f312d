//! # Host collaborators.
//!
//! The seams priovisor talks through:
//! - [`HostScheduler`] the cooperative executor that runs tasks
//! - [`ControllerFactory`] / [`TaskController`] per-class priority + cancellation handles
//! - [`TaskSignal`] the read side of a controller, handed to the host
//!
//! Reference implementations: [`TokioScheduler`], [`TokenController`],
//! [`TokenControllerFactory`].

mod runtime;
mod scheduler;
mod signal;

pub use runtime::TokioScheduler;
pub use scheduler::{ExtraOptions, HostOutcome, HostScheduler, HostTask, HostTaskOptions};
pub use signal::{ControllerFactory, TaskController, TaskSignal, TokenController, TokenControllerFactory};
