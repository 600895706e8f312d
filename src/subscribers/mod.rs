//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`] fan-out used by
//! a [`Session`](crate::Session) to deliver runtime events to user code.
//!
//! ## Architecture
//! ```text
//! ControllerPool / Reactor / Submitter ── publish(Event) ──► Bus
//!                                                             │
//!                                                  subscriber_listener
//!                                                             │
//!                                                        SubscriberSet
//!                                                   ┌─────────┼─────────┐
//!                                                   ▼         ▼         ▼
//!                                               LogWriter  Metrics   Custom
//! ```
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], which renders events through `tracing`.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
