//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by a session.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ControllerPool`, `VisibilityReactor`, `TaskSubmitter`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the session's subscriber listener (fans out to `SubscriberSet`)
//!   and any receiver obtained from [`Session::subscribe`](crate::Session::subscribe).

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
