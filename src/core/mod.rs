//! Runtime core: controller lifecycle, visibility reaction and submission.
//!
//! The public API from this module is [`Session`] (built with [`SessionBuilder`]),
//! its [`SessionConfig`] and per-call [`PostTaskOptions`], plus the visibility types.
//!
//! Internal modules:
//! - [`pool`]: one controller per priority class, reprioritization and bulk abort;
//! - [`visibility`]: visibility signal, reactor and listener;
//! - [`submitter`]: the `post_task` algorithm with its fallbacks;
//! - [`session`]: owner lifecycle and teardown.

mod builder;
mod config;
mod options;
mod pool;
mod session;
mod submitter;
mod visibility;

pub use builder::SessionBuilder;
pub use config::SessionConfig;
pub use options::PostTaskOptions;
pub use session::Session;
pub use visibility::{Visibility, VisibilityHandle};
