//! # Controller pool.
//!
//! Owns at most one [`TaskController`] per [`TaskPriority`] for a session.
//!
//! ## Architecture
//! ```text
//! submitter ── resolve(class, initial) ──► slots[class.index()]
//!                                           ├─ Some(entry) → reuse
//!                                           └─ None        → factory.create(initial)
//! reactor   ── reprioritize_all(visible) ─► set_priority(class.effective(visible))
//!                                           (creation order)
//! teardown  ── cancel_all() ──────────────► abort() each, clear, close
//! ```
//!
//! ## Rules
//! - Slots are indexed by enum ordinal (no string keys)
//! - Resolve-or-create happens under a single lock (atomic per class)
//! - `cancel_all` is idempotent; once closed, `resolve` hands out nothing
//! - Teardown never calls `set_priority`

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::events::{Bus, Event, EventKind};
use crate::host::{ControllerFactory, TaskController};
use crate::priority::TaskPriority;

/// Live controller plus the effective priority last pushed to it.
struct Entry {
    controller: Arc<dyn TaskController>,
    effective: TaskPriority,
}

#[derive(Default)]
struct PoolState {
    slots: [Option<Entry>; TaskPriority::COUNT],
    /// Classes in controller creation order.
    order: Vec<TaskPriority>,
    closed: bool,
}

/// Per-session mapping from priority class to controller.
pub(crate) struct ControllerPool {
    factory: Arc<dyn ControllerFactory>,
    bus: Bus,
    state: Mutex<PoolState>,
}

impl ControllerPool {
    pub fn new(factory: Arc<dyn ControllerFactory>, bus: Bus) -> Self {
        Self {
            factory,
            bus,
            state: Mutex::new(PoolState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the controller for `class`, creating it at `initial` if absent.
    ///
    /// Returns `None` once the pool is closed.
    pub fn resolve(&self, class: TaskPriority, initial: TaskPriority) -> Option<Arc<dyn TaskController>> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        if let Some(entry) = &state.slots[class.index()] {
            return Some(Arc::clone(&entry.controller));
        }

        let controller = self.factory.create(initial);
        state.slots[class.index()] = Some(Entry {
            controller: Arc::clone(&controller),
            effective: initial,
        });
        state.order.push(class);
        drop(state);

        tracing::debug!(priority = %class, effective = %initial, "controller created");
        self.bus.publish(
            Event::new(EventKind::ControllerCreated)
                .with_priority(class)
                .with_effective(initial),
        );
        Some(controller)
    }

    /// Pushes the visibility-driven priority to every live controller.
    ///
    /// Returns the number of controllers updated.
    pub fn reprioritize_all(&self, visible: bool) -> usize {
        let mut changed = Vec::new();
        {
            let mut state = self.lock();
            let PoolState { slots, order, .. } = &mut *state;
            for &class in order.iter() {
                let Some(entry) = slots[class.index()].as_mut() else {
                    continue;
                };
                let effective = class.effective(visible);
                entry.controller.set_priority(effective);
                entry.effective = effective;
                changed.push((class, effective));
            }
        }

        for &(class, effective) in &changed {
            tracing::trace!(priority = %class, effective = %effective, "controller reprioritized");
            self.bus.publish(
                Event::new(EventKind::PriorityChanged)
                    .with_priority(class)
                    .with_effective(effective),
            );
        }
        changed.len()
    }

    /// Aborts and removes every live controller, then closes the pool.
    ///
    /// Returns the number of controllers aborted (0 on repeated calls).
    pub fn cancel_all(&self) -> usize {
        let entries: Vec<(TaskPriority, Entry)> = {
            let mut state = self.lock();
            if state.closed {
                return 0;
            }
            state.closed = true;
            let order = std::mem::take(&mut state.order);
            order
                .into_iter()
                .filter_map(|class| state.slots[class.index()].take().map(|e| (class, e)))
                .collect()
        };

        for (class, entry) in &entries {
            entry.controller.abort();
            tracing::debug!(priority = %class, "controller aborted");
            self.bus
                .publish(Event::new(EventKind::ControllerAborted).with_priority(*class));
        }
        entries.len()
    }

    /// `(class, effective priority)` for every live controller, in creation order.
    pub fn effective_priorities(&self) -> Vec<(TaskPriority, TaskPriority)> {
        let state = self.lock();
        state
            .order
            .iter()
            .filter_map(|&class| state.slots[class.index()].as_ref().map(|e| (class, e.effective)))
            .collect()
    }

    pub fn contains(&self, class: TaskPriority) -> bool {
        self.lock().slots[class.index()].is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().order.len()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }
}
