//! # Priority classes.
//!
//! [`TaskPriority`] enumerates the three scheduling urgencies understood by the host,
//! ordered from most to least urgent:
//!
//! ```text
//! UserBlocking  >  UserVisible  >  Background
//! "user-blocking"  "user-visible"  "background"
//! ```
//!
//! When the owner of a session is hidden, every attached controller is demoted to
//! [`TaskPriority::Background`]; see [`TaskPriority::effective`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidPriority;

/// Scheduling urgency of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum TaskPriority {
    /// Work that blocks the user from interacting (default).
    #[default]
    UserBlocking,
    /// Work the user can see but that does not block interaction.
    UserVisible,
    /// Work the user does not observe directly.
    Background,
}

impl TaskPriority {
    /// All classes in ascending enumeration order.
    pub const ALL: [TaskPriority; 3] = [
        TaskPriority::UserBlocking,
        TaskPriority::UserVisible,
        TaskPriority::Background,
    ];

    /// Number of classes.
    pub const COUNT: usize = Self::ALL.len();

    /// Returns the canonical kebab-case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            TaskPriority::UserBlocking => "user-blocking",
            TaskPriority::UserVisible => "user-visible",
            TaskPriority::Background => "background",
        }
    }

    /// Ordinal of the class inside [`TaskPriority::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Priority a controller of this class should run at for the given visibility.
    ///
    /// Hidden owners demote everything to `Background`; visible owners restore the class.
    ///
    /// # Example
    /// ```
    /// use priovisor::TaskPriority;
    ///
    /// assert_eq!(TaskPriority::UserBlocking.effective(false), TaskPriority::Background);
    /// assert_eq!(TaskPriority::UserBlocking.effective(true), TaskPriority::UserBlocking);
    /// ```
    #[inline]
    pub const fn effective(self, visible: bool) -> TaskPriority {
        if visible {
            self
        } else {
            TaskPriority::Background
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskPriority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| InvalidPriority::new(s))
    }
}

/// Priority requested by a caller.
///
/// Callers usually pass a [`TaskPriority`], but names coming from configuration or
/// another process are accepted as-is and validated at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorityRequest {
    /// A known class.
    Class(TaskPriority),
    /// A raw class name, possibly invalid.
    Named(Cow<'static, str>),
}

impl PriorityRequest {
    /// Resolves the request to a known class.
    pub fn resolve(&self) -> Result<TaskPriority, InvalidPriority> {
        match self {
            PriorityRequest::Class(p) => Ok(*p),
            PriorityRequest::Named(name) => name.parse(),
        }
    }

    /// Returns the requested name, as the caller spelled it.
    pub fn as_str(&self) -> &str {
        match self {
            PriorityRequest::Class(p) => p.as_str(),
            PriorityRequest::Named(name) => name,
        }
    }
}

impl From<TaskPriority> for PriorityRequest {
    fn from(p: TaskPriority) -> Self {
        PriorityRequest::Class(p)
    }
}

impl From<&'static str> for PriorityRequest {
    fn from(s: &'static str) -> Self {
        PriorityRequest::Named(Cow::Borrowed(s))
    }
}

impl From<String> for PriorityRequest {
    fn from(s: String) -> Self {
        PriorityRequest::Named(Cow::Owned(s))
    }
}
