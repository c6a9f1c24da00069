//! Application state shared across handlers.

use std::sync::Arc;

use latchkey_core::{
    AccessCodeProvider, BookingRepository, LatchkeyConfig, NotificationSink, Scheduler,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: LatchkeyConfig,
    scheduler: Scheduler,
    repository: Arc<dyn BookingRepository>,
}

impl AppState {
    /// Create new application state over the given collaborators.
    #[must_use]
    pub fn new(
        config: LatchkeyConfig,
        provider: Arc<dyn AccessCodeProvider>,
        repository: Arc<dyn BookingRepository>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let scheduler = Scheduler::new(
            provider,
            Arc::clone(&repository),
            sink,
            config.scheduling.clone(),
        );
        Self {
            inner: Arc::new(AppStateInner {
                config,
                scheduler,
                repository,
            }),
        }
    }

    /// The loaded configuration. Immutable after startup.
    #[must_use]
    pub fn config(&self) -> &LatchkeyConfig {
        &self.inner.config
    }

    /// The scheduling engine.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// The booking store.
    #[must_use]
    pub fn repository(&self) -> &Arc<dyn BookingRepository> {
        &self.inner.repository
    }
}
