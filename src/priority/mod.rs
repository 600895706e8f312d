//! Priority classes and request normalization.
//!
//! ## Contents
//! - [`TaskPriority`] the fixed, ordered set of scheduling urgencies
//! - [`PriorityRequest`] what a caller asked for (may name an unknown class)
//! - [`is_valid`] / [`normalize`] validation helpers used by the submitter
//!
//! ## Quick wiring
//! ```text
//! PostTaskOptions { priority: Option<PriorityRequest>, .. }
//!      └─► submitter: normalize(request, cfg.default_priority)
//!           ├─ known class   ─► TaskPriority
//!           └─ unknown name  ─► warn! + default priority
//! ```

mod class;
mod registry;

pub use class::{PriorityRequest, TaskPriority};
pub use registry::{is_valid, normalize};
