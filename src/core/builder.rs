use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        SessionConfig,
        pool::ControllerPool,
        session::{Session, SessionInner},
        submitter::TaskSubmitter,
        visibility::{self, Visibility, VisibilityHandle, VisibilityReactor},
    },
    events::{Bus, Event},
    host::{ControllerFactory, HostScheduler, TokenControllerFactory, TokioScheduler},
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`Session`] with custom collaborators.
pub struct SessionBuilder {
    cfg: SessionConfig,
    host: Option<Arc<dyn HostScheduler>>,
    controllers: Arc<dyn ControllerFactory>,
    visibility: Option<watch::Receiver<Visibility>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SessionBuilder {
    /// Creates a new builder with the given configuration.
    ///
    /// Defaults: [`TokioScheduler`] host, [`TokenControllerFactory`] controllers and a
    /// session-owned visibility source.
    pub fn new(cfg: SessionConfig) -> Self {
        Self {
            cfg,
            host: Some(Arc::new(TokioScheduler::new())),
            controllers: Arc::new(TokenControllerFactory::new()),
            visibility: None,
            subscribers: Vec::new(),
        }
    }

    /// Sets the host scheduler tasks are submitted to.
    pub fn with_host(mut self, host: Arc<dyn HostScheduler>) -> Self {
        self.host = Some(host);
        self
    }

    /// Runs every task directly, as if no host scheduler existed.
    pub fn without_host(mut self) -> Self {
        self.host = None;
        self
    }

    /// Sets the factory creating per-class controllers.
    pub fn with_controllers(mut self, factory: Arc<dyn ControllerFactory>) -> Self {
        self.controllers = factory;
        self
    }

    /// Follows an external visibility source instead of a session-owned one.
    ///
    /// [`Session::visibility`] returns `None` for such sessions.
    pub fn with_visibility(mut self, rx: watch::Receiver<Visibility>) -> Self {
        self.visibility = Some(rx);
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (controller lifecycle, fallbacks, etc.)
    /// through dedicated workers with bounded queues. They are ignored outside a
    /// Tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds and returns the Session.
    ///
    /// This consumes the builder and initializes all runtime components:
    /// - Event bus for broadcasting
    /// - Controller pool and visibility reactor
    /// - Visibility and subscriber listeners (when a runtime is available)
    pub fn build(self) -> Session {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let token = CancellationToken::new();

        if !self.subscribers.is_empty() {
            if Handle::try_current().is_ok() {
                let subs = SubscriberSet::new(self.subscribers, bus.clone());
                tracing::debug!(subscribers = subs.len(), "subscriber listener started");
                subscriber_listener(bus.subscribe(), subs, token.clone());
            } else {
                tracing::warn!(
                    subscribers = self.subscribers.len(),
                    "no tokio runtime; subscribers are ignored"
                );
            }
        }

        let pool = Arc::new(ControllerPool::new(self.controllers, bus.clone()));
        let (rx, tx) = match self.visibility {
            Some(rx) => (rx, None),
            None => {
                let (tx, rx) = watch::channel(Visibility::UNKNOWN);
                (rx, Some(Arc::new(tx)))
            }
        };
        let reactor = Arc::new(VisibilityReactor::new(rx.clone(), bus.clone()));
        let handle = tx.map(|tx| VisibilityHandle::new(tx, Arc::clone(&reactor), Arc::clone(&pool)));

        if visibility::spawn_listener(rx, Arc::clone(&reactor), Arc::clone(&pool), token.clone())
            .is_none()
        {
            tracing::debug!("no tokio runtime; visibility is applied on observe and submit");
        }

        let submitter = TaskSubmitter::new(
            self.host,
            Arc::clone(&pool),
            Arc::clone(&reactor),
            bus.clone(),
            self.cfg.default_priority,
        );

        Session::from_inner(SessionInner {
            cfg: self.cfg,
            bus,
            pool,
            reactor,
            submitter,
            visibility: handle,
            token,
            closed: AtomicBool::new(false),
        })
    }
}

/// Forwards bus events to the subscriber set until the session is torn down.
///
/// Events already buffered when the token fires are still delivered.
fn subscriber_listener(
    mut rx: broadcast::Receiver<Event>,
    set: SubscriberSet,
    token: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = token.cancelled() => break,
            }
        }
        set.shutdown().await;
    });
}
