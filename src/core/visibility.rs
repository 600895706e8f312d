//! # Visibility signal and reactor.
//!
//! The visibility signal says whether the owner of a session is currently seen by the
//! user. Hidden sessions run every controller at `background`; visible sessions run
//! each controller at its own class.
//!
//! ```text
//! VisibilityHandle::observe(v) ──send──► watch<Visibility> ──changed()──► listener
//!            │                                  │                            │
//!            └──────────── react(pool) ◄────────┴── post_task drains ────────┘
//!                             │
//!                             └─► pool.reprioritize_all(v.visible)
//!                                 Bus.publish(VisibilityChanged)
//! ```
//!
//! - Nothing happens before the first observation (`has_signal == false`).
//! - Reactions are serialized; each one updates every live controller before returning.
//! - The listener stops when the session token is cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::pool::ControllerPool;
use crate::events::{Bus, Event, EventKind};
use crate::host::TaskController;
use crate::priority::TaskPriority;

/// Last known visibility of a session owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Visibility {
    /// Whether any observation has been made yet.
    pub has_signal: bool,
    /// Whether the owner is visible (meaningful only with `has_signal`).
    pub visible: bool,
}

impl Visibility {
    /// No observation yet.
    pub const UNKNOWN: Self = Self {
        has_signal: false,
        visible: true,
    };

    /// An observation of `visible`.
    pub const fn observed(visible: bool) -> Self {
        Self {
            has_signal: true,
            visible,
        }
    }

    /// Effective priority a new controller for `class` starts at.
    pub const fn initial_priority(self, class: TaskPriority) -> TaskPriority {
        if self.has_signal {
            class.effective(self.visible)
        } else {
            class
        }
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

struct ReactorState {
    rx: watch::Receiver<Visibility>,
    applied: Visibility,
}

/// Applies visibility observations to a [`ControllerPool`].
pub(crate) struct VisibilityReactor {
    state: Mutex<ReactorState>,
    bus: Bus,
}

impl VisibilityReactor {
    pub fn new(rx: watch::Receiver<Visibility>, bus: Bus) -> Self {
        let applied = *rx.borrow();
        Self {
            state: Mutex::new(ReactorState { rx, applied }),
            bus,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReactorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Resolves the controller for `class` against the latest observation.
    ///
    /// The reactor lock is held across the pool lookup, so a new controller either
    /// starts at the latest observation or is updated by the reaction applying it.
    pub fn resolve(
        &self,
        pool: &ControllerPool,
        class: TaskPriority,
    ) -> Option<Arc<dyn TaskController>> {
        let state = self.lock();
        let initial = state.rx.borrow().initial_priority(class);
        pool.resolve(class, initial)
    }

    /// Applies the pending observation, if any.
    ///
    /// Returns `true` when controllers were reprioritized.
    pub fn react(&self, pool: &ControllerPool) -> bool {
        let mut state = self.lock();
        let changed = match state.rx.has_changed() {
            Ok(changed) => changed,
            // Sender gone: the last value may still be unapplied.
            Err(_) => *state.rx.borrow() != state.applied,
        };
        if !changed || pool.is_closed() {
            return false;
        }

        let observed = *state.rx.borrow_and_update();
        state.applied = observed;
        if !observed.has_signal {
            return false;
        }

        let updated = pool.reprioritize_all(observed.visible);
        drop(state);

        tracing::debug!(visible = observed.visible, controllers = updated, "visibility changed");
        self.bus
            .publish(Event::new(EventKind::VisibilityChanged).with_visible(observed.visible));
        true
    }
}

/// Session-owned visibility source.
///
/// Cloning yields another handle to the same signal.
#[derive(Clone)]
pub struct VisibilityHandle {
    tx: Arc<watch::Sender<Visibility>>,
    reactor: Arc<VisibilityReactor>,
    pool: Arc<ControllerPool>,
}

impl VisibilityHandle {
    pub(crate) fn new(
        tx: Arc<watch::Sender<Visibility>>,
        reactor: Arc<VisibilityReactor>,
        pool: Arc<ControllerPool>,
    ) -> Self {
        Self { tx, reactor, pool }
    }

    /// Records an observation and reprioritizes live controllers before returning.
    pub fn observe(&self, visible: bool) {
        self.tx.send_replace(Visibility::observed(visible));
        self.reactor.react(&self.pool);
    }

    /// Latest observed visibility.
    pub fn current(&self) -> Visibility {
        *self.tx.borrow()
    }
}

impl std::fmt::Debug for VisibilityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityHandle")
            .field("current", &self.current())
            .finish()
    }
}

/// Spawns the task reacting to asynchronous visibility changes.
///
/// Returns `None` outside a Tokio runtime; observations are then applied by
/// [`VisibilityHandle::observe`] and on every submission.
pub(crate) fn spawn_listener(
    mut rx: watch::Receiver<Visibility>,
    reactor: Arc<VisibilityReactor>,
    pool: Arc<ControllerPool>,
    token: CancellationToken,
) -> Option<JoinHandle<()>> {
    let runtime = Handle::try_current().ok()?;
    Some(runtime.spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                res = rx.changed() => {
                    reactor.react(&pool);
                    if res.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::trace!("visibility listener stopped");
    }))
}
