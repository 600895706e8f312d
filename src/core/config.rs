//! # Session configuration.
//!
//! Provides [`SessionConfig`], the settings shared by every component of a session.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus

use crate::priority::TaskPriority;

/// Configuration for one scheduling session.
///
/// ## Field semantics
/// - `default_priority`: Priority for submissions that do not name one, and the fallback
///   for submissions naming an invalid one.
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Default submission priority.
    pub default_priority: TaskPriority,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,
}

impl SessionConfig {
    /// Default configuration with a different default priority.
    pub fn with_default_priority(default_priority: TaskPriority) -> Self {
        Self {
            default_priority,
            ..Self::default()
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SessionConfig {
    /// Default configuration:
    ///
    /// - `default_priority = UserBlocking`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            default_priority: TaskPriority::UserBlocking,
            bus_capacity: 1024,
        }
    }
}
