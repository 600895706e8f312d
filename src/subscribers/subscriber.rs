//! # Event subscriber trait.
//!
//! Provides [`Subscribe`], an extension point for plugging custom event handlers into a session.
//!
//! Every subscriber is driven by its own worker over a bounded queue sized by
//! [`Subscribe::queue_capacity`]. A panic inside `on_event` is caught and republished
//! as `EventKind::SubscriberPanicked`; the worker keeps going.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use priovisor::{Event, EventKind, Subscribe};
//!
//! struct Demotions;
//!
//! #[async_trait]
//! impl Subscribe for Demotions {
//!     async fn on_event(&self, ev: &Event) {
//!         if matches!(ev.kind, EventKind::PriorityChanged) {
//!             // export a metric, etc.
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str { "demotions" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Receiver of session events.
///
/// A slow subscriber only fills its own queue; once full, further events for it are
/// dropped and reported as `SubscriberOverflow`. Do not block inside `on_event`.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles one event, in publication order for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Name reported in overflow and panic events (defaults to the type name).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Queue capacity for this subscriber, 1024 unless overridden (min 1).
    fn queue_capacity(&self) -> usize {
        1024
    }
}
