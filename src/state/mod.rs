/// Cursor and level-sequence mutations.
pub mod sequencer;
/// Timer and level model.
pub mod timer;
/// Checks run before a timer is saved.
pub mod validation;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::timer_store::TimerStore, error::ServiceError, render::Renderer,
    services::audio::CueResolver,
};

/// Application state shared by every handler.
pub type SharedState = Arc<AppState>;

/// Central application state: the storage handle plus the request-independent collaborators.
///
/// No timer is cached here; every request loads its own copy from the store.
pub struct AppState {
    timer_store: RwLock<Option<Arc<dyn TimerStore>>>,
    degraded: watch::Sender<bool>,
    renderer: Renderer,
    cues: Arc<dyn CueResolver>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig, renderer: Renderer, cues: Arc<dyn CueResolver>) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            timer_store: RwLock::new(None),
            degraded: degraded_tx,
            renderer,
            cues,
            config,
        })
    }

    /// Obtain a handle to the current timer store, if one is installed.
    pub async fn timer_store(&self) -> Option<Arc<dyn TimerStore>> {
        let guard = self.timer_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a new timer store implementation and leave degraded mode.
    pub async fn install_timer_store(&self, store: Arc<dyn TimerStore>) {
        {
            let mut guard = self.timer_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current timer store and enter degraded mode.
    pub async fn clear_timer_store(&self) {
        {
            let mut guard = self.timer_store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Timer store usable right now, or [`ServiceError::Degraded`].
    pub async fn require_timer_store(&self) -> Result<Arc<dyn TimerStore>, ServiceError> {
        if self.is_degraded() {
            return Err(ServiceError::Degraded);
        }
        self.timer_store().await.ok_or(ServiceError::Degraded)
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Template renderer.
    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Resolver producing cue audio.
    pub fn cues(&self) -> &dyn CueResolver {
        self.cues.as_ref()
    }

    /// Configuration the server started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
